//! Summarize the GO annotations of a study set.

use anyhow::{Context, Result};
use bissap_core::prune::PruneRule;
use bissap_core::report::top_by_coverage;
use bissap_core::summarize::{Summarizer, Summary, SummaryTerm};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::commands::candidate_filter;
use crate::config::Config;
use crate::input::{background_or_population, Study};
use crate::StudyArgs;

/// JSON shape of `bissap summarize --json`.
#[derive(Serialize)]
struct SummaryOutput<'a> {
    summary: &'a Summary,
    top_by_coverage: Vec<&'a SummaryTerm>,
}

impl<'a> SummaryOutput<'a> {
    fn new(summary: &'a Summary, top: usize) -> Self {
        Self {
            summary,
            top_by_coverage: top_by_coverage(summary, top),
        }
    }
}

pub fn run(args: &StudyArgs, background: Option<&Path>, no_prune: bool, json: bool) -> Result<()> {
    let config = Config::load()?;
    let summary = summarize_study(args, background, &config, no_prune)?;
    let output = SummaryOutput::new(&summary, config.report.top);

    if json {
        let out = serde_json::to_string_pretty(&output).context("Failed to serialize summary")?;
        println!("{out}");
        return Ok(());
    }

    print_summary(&output, config.report.show_elements);
    Ok(())
}

fn summarize_study(
    args: &StudyArgs,
    background: Option<&Path>,
    config: &Config,
    no_prune: bool,
) -> Result<Summary> {
    let study = Study::load(&args.study, &args.graph, &args.annotations)?;
    let filter = candidate_filter(config, args);
    let pool = study.pool(args.candidates.as_deref(), &filter)?;
    let model = background_or_population(background, &study.graph, &study.population)?;

    let summary = Summarizer::new(&pool, &study.elements_of_interest, &model)
        .with_pruning(config.summary.prune && !no_prune)
        .run()?;
    Ok(summary)
}

fn print_summary(output: &SummaryOutput<'_>, show_elements: bool) {
    let summary = output.summary;
    let total = summary.covered.len() + summary.uncovered.len();

    if summary.is_empty() {
        println!("{} No candidate term covers the study set", "•".yellow());
        return;
    }

    println!(
        "{} {} terms summarize {}/{} elements ({} iterations)",
        "→".blue(),
        summary.len().to_string().cyan().bold(),
        summary.covered.len(),
        total,
        summary.iterations.len()
    );
    println!();

    for (i, term) in summary.terms.iter().enumerate() {
        let rank = format!("{}.", i + 1);
        let label = term.name.as_deref().unwrap_or("");
        println!(
            "  {} {} {} {}",
            rank.blue(),
            term.id.to_string().white().bold(),
            label,
            format!("(score {:.3})", term.score).dimmed()
        );
        println!(
            "      IC: {:.3}  Coverage: {:.1}%",
            term.information_content,
            term.coverage * 100.0
        );
        if show_elements {
            let elements: Vec<&str> = term.elements.iter().map(|e| e.as_str()).collect();
            println!("      {}", elements.join(", ").dimmed());
        }
    }

    if !summary.pruned.is_empty() {
        println!();
        println!("{}", "Pruned".blue().bold());
        for pruned in &summary.pruned {
            let why = match pruned.rule {
                PruneRule::KeepDescendant => "ancestor",
                PruneRule::DropAncestor => "descendant",
            };
            println!(
                "  {} {} {}",
                "•".yellow(),
                pruned.id,
                format!("(redundant with {why} {})", pruned.paired_with).dimmed()
            );
        }
    }

    if !output.top_by_coverage.is_empty() {
        println!();
        println!(
            "{}",
            format!("Top by coverage (up to {})", output.top_by_coverage.len())
                .blue()
                .bold()
        );
        for term in &output.top_by_coverage {
            println!(
                "  {} {} {}",
                "•".blue(),
                term.id,
                format!("({} elements, {:.1}%)", term.elements.len(), term.coverage * 100.0)
                    .dimmed()
            );
        }
    }

    if !summary.uncovered.is_empty() {
        println!();
        let missing: Vec<&str> = summary.uncovered.iter().map(|e| e.as_str()).collect();
        println!("{} Not covered: {}", "•".yellow(), missing.join(", "));
    }
}
