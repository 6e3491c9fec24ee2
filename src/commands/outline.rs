use crate::outline::{analyze, AnalysisResult, AnalyzeOptions};
use crate::pdf::{extract_fragments_from_path, ExtractOptions};
use anyhow::{Context, Result};
use std::path::Path;

pub struct OutlineOptions {
    pub extract: ExtractOptions,
    pub analyze: AnalyzeOptions,
    pub json: bool,
    pub output: Option<std::path::PathBuf>,
}

pub fn run<P: AsRef<Path>>(path: P, options: &OutlineOptions) -> Result<()> {
    let path = path.as_ref();
    let fragments = extract_fragments_from_path(path, &options.extract)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;
    let result = analyze(&fragments, &options.analyze);

    if let Some(output) = &options.output {
        std::fs::write(output, result.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Wrote outline to {}", output.display());
        return Ok(());
    }

    if options.json {
        println!("{}", result.to_json_pretty()?);
    } else {
        print!("{}", render(&result));
    }

    Ok(())
}

fn render(result: &AnalysisResult) -> String {
    let mut out = format!("Title: {}\n", result.title);

    if result.outline.is_empty() {
        out.push_str("No headings found.\n");
        return out;
    }

    for entry in &result.outline {
        let indent = "  ".repeat(entry.level.depth());
        out.push_str(&format!(
            "{}{} (p. {}) [{}]\n",
            indent, entry.text, entry.page, entry.level
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{HeadingLevel, OutlineEntry};

    #[test]
    fn test_render_indents_by_level() {
        let result = AnalysisResult {
            title: "Annual Plan".to_string(),
            outline: vec![
                OutlineEntry {
                    level: HeadingLevel::H1,
                    text: "1. Goals".to_string(),
                    page: 1,
                },
                OutlineEntry {
                    level: HeadingLevel::H3,
                    text: "Budget Details".to_string(),
                    page: 4,
                },
            ],
        };
        assert_eq!(
            render(&result),
            "Title: Annual Plan\n1. Goals (p. 1) [H1]\n    Budget Details (p. 4) [H3]\n"
        );
    }

    #[test]
    fn test_render_without_headings() {
        let result = AnalysisResult {
            title: "Untitled Document".to_string(),
            outline: Vec::new(),
        };
        assert_eq!(render(&result), "Title: Untitled Document\nNo headings found.\n");
    }
}
