use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::outline::OutlineOrder;
use crate::pdf::fragments::DEFAULT_MAX_PAGES;

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(about = "Infer a title and heading outline from PDF typography, with MCP server support")]
#[command(version)]
pub struct Cli {
    /// Log extraction and scoring decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Print the inferred title and outline of a PDF
    Outline {
        /// PDF file to analyze
        path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Outline order: "page-size" or "document"
        #[arg(long, default_value = "page-size")]
        order: OutlineOrder,

        /// Only read the first N pages
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: u32,
    },

    /// Analyze a JSON array of text fragments ("-" for stdin)
    Analyze {
        /// Fragments file
        input: PathBuf,

        /// Outline order: "page-size" or "document"
        #[arg(long, default_value = "page-size")]
        order: OutlineOrder,
    },

    /// Dump the styled text fragments extracted from a PDF as JSON
    Fragments {
        /// PDF file to read
        path: PathBuf,

        /// Only read the first N pages
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: u32,
    },

    /// Show how every fragment was scored as a heading
    Explain {
        /// PDF file to analyze
        path: PathBuf,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,

        /// Only read the first N pages
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_defaults() {
        let cli = Cli::try_parse_from(["pdfoutline", "outline", "report.pdf"]).unwrap();
        match cli.command {
            Commands::Outline {
                json,
                output,
                order,
                max_pages,
                ..
            } => {
                assert!(!json);
                assert!(output.is_none());
                assert_eq!(order, OutlineOrder::PageThenSize);
                assert_eq!(max_pages, 50);
            }
            _ => panic!("expected outline"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_verbose_and_order() {
        let cli = Cli::try_parse_from(["pdfoutline", "analyze", "-", "--order", "document", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Analyze {
                order: OutlineOrder::Document,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_order_rejected() {
        assert!(Cli::try_parse_from(["pdfoutline", "outline", "a.pdf", "--order", "size"]).is_err());
    }
}
