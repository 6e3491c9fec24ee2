use crate::pdf::{extract_fragments_from_path, ExtractOptions};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<()> {
    let path = path.as_ref();
    let fragments = extract_fragments_from_path(path, options)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&fragments)?);

    Ok(())
}
