//! Terminal output helpers for consistent CLI formatting

use sensorthings_client::entity::{record_id, record_name, EntityRecord};
use sensorthings_client::{EntityType, ReconciliationReport};

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Lines of an entity listing: a count header, then `id: name` per entity.
pub fn format_entity_list(resource: EntityType, entities: &[EntityRecord]) -> Vec<String> {
    let mut lines = Vec::with_capacity(entities.len() + 1);
    lines.push(format!("{} {}", entities.len(), resource.collection()));
    for entity in entities {
        lines.push(format!(
            "{:>4}: {}",
            record_id(entity).unwrap_or_default(),
            record_name(entity).unwrap_or_default()
        ));
    }
    lines
}

pub fn print_entity_list(resource: EntityType, entities: &[EntityRecord]) {
    for line in format_entity_list(resource, entities) {
        println!("{line}");
    }
}

/// Human-readable summary of a reconciliation run.
pub fn format_report(report: &ReconciliationReport) -> Vec<String> {
    let mut lines = Vec::new();

    let existing = report.created.len() - report.created_count();
    lines.push(format!(
        "{} entit{} created, {} already present ({} pass{})",
        report.created_count(),
        if report.created_count() == 1 { "y" } else { "ies" },
        existing,
        report.passes,
        if report.passes == 1 { "" } else { "es" }
    ));

    for failure in &report.source_failures {
        lines.push(format!("  ✗ {}: {}", failure.source, failure.error));
    }

    for failure in &report.failures {
        lines.push(format!(
            "  ✗ {} '{}' ({}, pass {}): {}",
            failure.resource.display_name(),
            failure.label,
            failure.source,
            failure.pass,
            failure.error
        ));
    }

    for source in &report.unresolved {
        if source.records.is_empty() {
            lines.push(format!("  … {}: not processed", source.source));
            continue;
        }
        lines.push(format!("  {} unresolved in {}:", source.records.len(), source.source));
        for record in &source.records {
            lines.push(format!(
                "    - {} '{}': {}",
                record.resource.display_name(),
                record.label,
                record.reference
            ));
        }
    }

    if report.cancelled {
        lines.push("Interrupted before all passes completed.".to_string());
    }

    lines
}

pub fn print_report(report: &ReconciliationReport) {
    let mut lines = format_report(report).into_iter();
    if let Some(headline) = lines.next() {
        if report.is_success() {
            print_success(&headline);
        } else {
            println!("{headline}");
        }
    }
    for line in lines {
        println!("{line}");
    }
}
