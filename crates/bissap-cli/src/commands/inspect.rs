//! Show annotation and candidate statistics for a study set.

use anyhow::{Context, Result};
use bissap_core::report::{element_reports, global_report, ElementReport, GlobalReport};
use colored::Colorize;
use serde::Serialize;

use crate::commands::candidate_filter;
use crate::config::Config;
use crate::input::Study;
use crate::StudyArgs;

#[derive(Serialize)]
struct Inspection {
    global: GlobalReport,
    elements: Vec<ElementReport>,
}

pub fn run(args: &StudyArgs, top: Option<usize>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let inspection = inspect(args, top.unwrap_or(config.report.top), &config)?;

    if json {
        let out =
            serde_json::to_string_pretty(&inspection).context("Failed to serialize reports")?;
        println!("{out}");
        return Ok(());
    }

    print_inspection(&inspection);
    Ok(())
}

fn inspect(args: &StudyArgs, top: usize, config: &Config) -> Result<Inspection> {
    let study = Study::load(&args.study, &args.graph, &args.annotations)?;
    let pool = study.pool(args.candidates.as_deref(), &candidate_filter(config, args))?;
    Ok(Inspection {
        global: global_report(&study.coverage, &pool, top),
        elements: element_reports(&study.coverage, &pool),
    })
}

fn print_inspection(inspection: &Inspection) {
    let global = &inspection.global;

    println!("{}", "BISSAP Study Set".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Annotations".blue().bold());
    println!(
        "  Annotated elements:  {}",
        global.elements.to_string().cyan()
    );
    println!(
        "  Direct terms:        {}",
        global.direct_terms.to_string().cyan()
    );
    println!(
        "  With ancestors:      {}",
        global.total_terms.to_string().cyan()
    );
    println!(
        "  Candidate terms:     {}",
        global.overrepresented.to_string().cyan()
    );
    println!();

    if !global.top_by_fdr.is_empty() {
        println!("{}", "Top candidates".blue().bold());
        for (i, row) in global.top_by_fdr.iter().enumerate() {
            let fdr = row
                .fdr
                .map(|f| format!("fdr {f:.2e}"))
                .unwrap_or_else(|| "fdr n/a".to_string());
            println!(
                "  {} {} {} {}",
                format!("{}.", i + 1).blue(),
                row.id.to_string().white().bold(),
                row.name.as_deref().unwrap_or(""),
                format!("({fdr}, {} elements)", row.covered).dimmed()
            );
        }
        println!();
    }

    println!("{}", "Elements".blue().bold());
    for report in &inspection.elements {
        println!(
            "  {} {} direct, {} total, {} candidates",
            report.element.to_string().white(),
            report.direct_count,
            report.total_count,
            report.overrepresented.len().to_string().cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reports_cover_every_annotated_element() {
        let dir = tempfile::tempdir().unwrap();
        let args = StudyArgs {
            study: write(dir.path(), "study.txt", "SOX2\nPAX6\n"),
            graph: write(
                dir.path(),
                "go.json",
                r#"[{"id": "GO:ROOT"}, {"id": "GO:A", "is_a": ["GO:ROOT"]}, {"id": "GO:B", "is_a": ["GO:A"]}]"#,
            ),
            annotations: write(
                dir.path(),
                "annotations.json",
                r#"{"SOX2": ["GO:A"], "PAX6": ["GO:B"]}"#,
            ),
            candidates: Some(write(
                dir.path(),
                "candidates.json",
                r#"[{"term": "GO:B", "fdr": 0.01}, {"term": "GO:A", "fdr": 0.001}]"#,
            )),
            fdr: None,
            min_coverage: None,
            namespace: None,
        };

        let inspection = inspect(&args, 1, &Config::default()).unwrap();
        assert_eq!(inspection.global.elements, 2);
        assert_eq!(inspection.global.direct_terms, 2);
        assert_eq!(inspection.global.total_terms, 3);
        assert_eq!(inspection.global.overrepresented, 2);
        assert_eq!(inspection.global.top_by_fdr.len(), 1);
        assert_eq!(inspection.global.top_by_fdr[0].id.as_str(), "GO:A");

        let pax6 = inspection
            .elements
            .iter()
            .find(|r| r.element.as_str() == "PAX6")
            .unwrap();
        assert_eq!(pax6.total_count, 3);
        assert_eq!(pax6.overrepresented.len(), 2);
    }
}
