//! Markdown run summary
//!
//! A short human-readable report written after the final checkpoint: why the
//! run stopped, how much of each budget it used, and where the output went.

use crate::harvest::RunReport;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary for a finished run
///
/// # Arguments
///
/// * `report` - The run report returned by the harvester
/// * `config_hash` - SHA-256 of the configuration file used
/// * `output_path` - Path where the markdown file should be written
pub fn generate_run_summary(
    report: &RunReport,
    config_hash: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_run_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_run_summary(report: &RunReport, config_hash: &str) -> String {
    let mut md = String::new();

    md.push_str("# Harvest Run Summary\n\n");

    md.push_str("## Outcome\n\n");
    md.push_str(&format!("- **Stopped**: {}\n", report.phase));
    if let Some(failure) = &report.failure {
        md.push_str(&format!("- **Failure**: {}\n", failure));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    md.push_str("## Work\n\n");
    md.push_str(&format!("- **Queries**: {}\n", report.queries));
    md.push_str(&format!("- **Windows per query**: {}\n", report.windows));
    md.push_str(&format!(
        "- **Windows searched**: {}\n",
        report.windows_searched
    ));
    md.push_str(&format!("- **Rows written**: {}\n\n", report.rows_written));

    md.push_str("## Budgets\n\n");
    md.push_str("| Budget | Used | Limit |\n");
    md.push_str("|--------|------|-------|\n");
    md.push_str(&format!(
        "| Search calls | {} | {} |\n",
        report.calls_used,
        report
            .max_search_calls
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    ));
    md.push_str(&format!(
        "| Enriched videos | {} | {} |\n\n",
        report.total_enriched, report.max_total
    ));

    md.push_str(&format!(
        "Detail calls: {}. Approximate search quota: {} units.\n",
        report.detail_calls,
        report.search_quota_units()
    ));

    md
}
