// Colored terminal output for extraction results, stage summaries, and
// topics.
//
// main.rs display functions delegate here.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::extract::Extraction;
use super::truncate_chars;
use crate::interchange::EventsFile;
use crate::pipeline::scrape::ScrapeSummary;
use crate::topics::clustering::Topic;

/// Print a day's extraction: records as JSON, then structural warnings.
pub fn display_extraction(extraction: &Extraction) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&extraction.events)?);

    if !extraction.skipped.is_empty() {
        eprintln!(
            "\n{} {} malformed subtree(s) skipped:",
            "!".yellow().bold(),
            extraction.skipped.len()
        );
        for err in &extraction.skipped {
            eprintln!("  {}", err.to_string().dimmed());
        }
    }
    Ok(())
}

pub fn display_scrape_summary(summary: &ScrapeSummary) {
    println!("\n{}", "=== Scrape complete ===".bold());
    println!("  Days scraped:   {}", summary.days_scraped);
    println!("  Events stored:  {}", summary.events_stored);
    if summary.days_skipped > 0 {
        println!(
            "  Already done:   {}",
            summary.days_skipped.to_string().dimmed()
        );
    }
    if summary.days_empty > 0 {
        println!(
            "  {} {} day(s) had no events yet, left unmarked",
            "~".yellow(),
            summary.days_empty
        );
    }
    if summary.structural_skips > 0 {
        println!(
            "  {} {} malformed subtree(s) skipped",
            "~".yellow(),
            summary.structural_skips
        );
    }
    if summary.days_failed > 0 {
        println!(
            "  {} {} day(s) failed, rerun to retry",
            "!".red().bold(),
            summary.days_failed
        );
    }
}

pub fn display_export_summary(file: &EventsFile) {
    let degraded = file.events.iter().filter(|e| e.is_degraded()).count();
    println!(
        "{} Exported {} events",
        "✓".green(),
        file.events.len()
    );
    if degraded > 0 {
        println!(
            "  {} {} without entities (enrichment failed)",
            "!".yellow(),
            degraded
        );
        for event in file.events.iter().filter(|e| e.is_degraded()).take(5) {
            println!(
                "    {} {}",
                event.date.to_string().dimmed(),
                truncate_chars(&event.text, 60)
            );
        }
    }
}

/// Largest topics first, with their date span and heaviest centroid terms.
pub fn display_topics(topics: &[Topic], limit: usize) {
    if topics.is_empty() {
        println!("No topics. Is the events file empty?");
        return;
    }

    let mut ranked: Vec<(usize, &Topic)> = topics.iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

    println!(
        "\n{}",
        format!("=== Topics ({} total) ===", topics.len()).bold()
    );
    println!();

    for (idx, topic) in ranked.into_iter().take(limit) {
        let by_date = topic.entropy_by_date();
        let span = match (by_date.keys().next(), by_date.keys().next_back()) {
            (Some(first), Some(last)) if first != last => format!("{first} .. {last}"),
            (Some(first), _) => first.to_string(),
            _ => String::new(),
        };
        let terms: Vec<&str> = topic
            .centroid
            .top_terms(5)
            .into_iter()
            .map(|(t, _)| t)
            .collect();

        println!(
            "  #{:<5} {:>4} events  {:<24}  {}",
            idx,
            topic.len(),
            span.dimmed(),
            terms.join(", ").cyan()
        );
    }
    println!();
}

/// One line per topic size with a proportional bar.
pub fn display_histogram(histogram: &BTreeMap<usize, usize>) {
    let Some(&max) = histogram.values().max() else {
        return;
    };

    println!("{}", "Topic sizes:".bold());
    for (size, count) in histogram {
        let width = (count * 40).div_ceil(max);
        println!(
            "  {:>5}  {:>6}  {}",
            size,
            count,
            "#".repeat(width).green()
        );
    }
}
