mod cli;
mod commands;
mod mcp;
mod outline;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use outline::AnalyzeOptions;
use pdf::ExtractOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries results and the MCP transport, so logs go to stderr.
    // lopdf warns for every font encoding it only partly resolves; decoding
    // falls back on its own, so those stay quiet unless asked for.
    let default_level = if cli.verbose { "debug" } else { "warn,lopdf=error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Outline {
            path,
            json,
            output,
            order,
            max_pages,
        } => {
            let options = commands::outline::OutlineOptions {
                extract: ExtractOptions {
                    max_pages,
                    ..Default::default()
                },
                analyze: AnalyzeOptions { order },
                json,
                output,
            };
            commands::outline::run(&path, &options)?;
        }
        Commands::Analyze { input, order } => {
            commands::analyze::run(&input, &AnalyzeOptions { order })?;
        }
        Commands::Fragments { path, max_pages } => {
            let options = ExtractOptions {
                max_pages,
                ..Default::default()
            };
            commands::fragments::run(&path, &options)?;
        }
        Commands::Explain {
            path,
            json,
            max_pages,
        } => {
            let options = ExtractOptions {
                max_pages,
                ..Default::default()
            };
            commands::explain::run(&path, &options, json)?;
        }
    }

    Ok(())
}
