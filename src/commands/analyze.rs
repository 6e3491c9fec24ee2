use crate::outline::{analyze, AnalyzeOptions, TextFragment};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Run the outline analysis on a JSON array of fragments. `-` reads stdin.
pub fn run<P: AsRef<Path>>(input: P, options: &AnalyzeOptions) -> Result<()> {
    let input = input.as_ref();
    let json = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read fragments from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    let fragments = parse_fragments(&json)?;
    let result = analyze(&fragments, options);
    println!("{}", result.to_json_pretty()?);

    Ok(())
}

fn parse_fragments(json: &str) -> Result<Vec<TextFragment>> {
    serde_json::from_str(json).context("Expected a JSON array of text fragments")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragments() {
        let fragments = parse_fragments(
            r#"[{"text": "Scope of Work", "size": 14.0, "flags": 16, "page": 2, "bbox": [0, 0, 10, 10]}]"#,
        )
        .unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].is_bold());
        assert_eq!(fragments[0].page, 2);
    }

    #[test]
    fn test_parse_fragments_rejects_object() {
        assert!(parse_fragments(r#"{"text": "x"}"#).is_err());
    }
}
