mod document;
mod error;
pub mod fragments;

pub use document::PdfDocument;
pub use error::ExtractError;
pub use fragments::{extract_fragments_from_path, ExtractOptions};
