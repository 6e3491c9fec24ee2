use crate::outline::classify::Verdict;
use crate::outline::{explain, FragmentReport};
use crate::pdf::{extract_fragments_from_path, ExtractOptions};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, options: &ExtractOptions, json: bool) -> Result<()> {
    let path = path.as_ref();
    let fragments = extract_fragments_from_path(path, options)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;
    let reports = explain(&fragments);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No text found.");
        return Ok(());
    }

    for report in &reports {
        println!("{}", describe(report));
    }

    let headings = reports.iter().filter(|r| r.level.is_some()).count();
    println!("\n{} of {} fragment(s) scored as headings.", headings, reports.len());

    Ok(())
}

fn describe(report: &FragmentReport) -> String {
    let marker = if report.title_candidate { "T" } else { " " };
    let verdict = match &report.verdict {
        Verdict::Rejected { reason } => format!("rejected ({:?})", reason),
        Verdict::Scored(score) => {
            let signals: Vec<String> = score
                .signals
                .iter()
                .map(|s| format!("{:?}+{}", s, s.weight()))
                .collect();
            let level = report
                .level
                .map(|l| format!(" -> {}", l))
                .unwrap_or_default();
            format!("score {} [{}]{}", score.total, signals.join(" "), level)
        }
    };
    format!(
        "p{} {} {:>5.1} {:<40} {}",
        report.page,
        marker,
        report.size,
        truncate(&report.text, 40),
        verdict
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max - 3).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::classify::{Score, Signal};
    use crate::outline::HeadingLevel;

    #[test]
    fn test_describe_scored() {
        let report = FragmentReport {
            page: 2,
            size: 14.0,
            text: "Project Timeline".to_string(),
            title_candidate: false,
            verdict: Verdict::Scored(Score {
                signals: vec![Signal::Bold, Signal::Keyword],
                total: 4,
            }),
            level: Some(HeadingLevel::H2),
        };
        let line = describe(&report);
        assert!(line.starts_with("p2    14.0 Project Timeline"));
        assert!(line.ends_with("score 4 [Bold+2 Keyword+2] -> H2"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
