use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::Deserialize;

use crate::outline::{analyze, AnalyzeOptions, OutlineOrder};
use crate::pdf::fragments::DEFAULT_MAX_PAGES;
use crate::pdf::{extract_fragments_from_path, ExtractOptions};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfOutlineRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Outline order: 'page-size' (default) or 'document'")]
    #[serde(default)]
    pub order: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfFragmentsRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Only read the first N pages (default: 50)")]
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

#[derive(Debug, Clone)]
pub struct OutlineServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl OutlineServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for OutlineServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl OutlineServer {
    #[tool(description = "Infer the document title and a leveled heading outline (H1-H4 with page numbers) from a PDF's typography")]
    fn pdf_outline(&self, Parameters(req): Parameters<PdfOutlineRequest>) -> String {
        let order = match req.order.as_deref().map(str::parse::<OutlineOrder>) {
            None => OutlineOrder::default(),
            Some(Ok(order)) => order,
            Some(Err(e)) => return format!("Error: {}", e),
        };

        match extract_fragments_from_path(&req.path, &ExtractOptions::default()) {
            Ok(fragments) => {
                let result = analyze(&fragments, &AnalyzeOptions { order });
                result
                    .to_json_pretty()
                    .unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Extract the styled text fragments (text, font size, font, bold/italic flags, page, bounding box) the outline is inferred from")]
    fn pdf_fragments(&self, Parameters(req): Parameters<PdfFragmentsRequest>) -> String {
        let options = ExtractOptions {
            max_pages: req.max_pages,
            ..Default::default()
        };
        match extract_fragments_from_path(&req.path, &options) {
            Ok(fragments) => {
                serde_json::to_string_pretty(&fragments).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

impl ServerHandler for OutlineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF outline inference. Use pdf_outline to get a document's title and heading \
                 outline, and pdf_fragments to inspect the styled text it was inferred from."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = OutlineServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
