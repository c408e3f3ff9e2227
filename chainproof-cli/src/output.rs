//! Terminal rendering of verification reports

use chainproof_core::{LedgerRecord, VerificationReport};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Render the report for a human reader
pub fn render_human(report: &VerificationReport) -> String {
    let mut out = String::new();

    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Class", "Count"]);
    summary.add_row(vec!["Verified".to_string(), report.verified.len().to_string()]);
    summary.add_row(vec!["Unnotarized (local only)".to_string(), report.unnotarized.len().to_string()]);
    summary.add_row(vec!["Missing (on-chain only)".to_string(), report.missing.len().to_string()]);
    out.push_str(&summary.to_string());
    out.push('\n');

    if !report.verified.is_empty() {
        out.push_str("\nVerified entries:\n");
        out.push_str(&record_table(&report.verified).to_string());
        out.push('\n');
    }

    if !report.unnotarized.is_empty() {
        out.push_str("\nLocal entries with no on-chain record:\n");
        for hash in &report.unnotarized {
            out.push_str(&format!("  {hash}\n"));
        }
    }

    if !report.missing.is_empty() {
        out.push_str("\nOn-chain records with no local entry:\n");
        out.push_str(&record_table(&report.missing).to_string());
        out.push('\n');
    }

    out.push('\n');
    if report.is_clean() {
        out.push_str(&format!(
            "OK: all {} local entries verified, nothing missing\n",
            report.local_count()
        ));
    } else {
        out.push_str("FAILED: local archive and ledger do not reconcile\n");
    }

    out
}

/// Render the report as JSON
pub fn render_json(report: &VerificationReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn record_table(records: &[LedgerRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Hash", "Date", "Block", "Confirmations", "Tx"]);

    for record in records {
        table.add_row(vec![
            short(&record.content_hash),
            record.notarized_date.clone(),
            record
                .block_height
                .map(|h| h.to_string())
                .unwrap_or_else(|| "pending".to_string()),
            record.confirmations.to_string(),
            short(&record.id),
        ]);
    }
    table
}

/// Truncate long identifiers for table display.
///
/// Counts characters, not bytes: tag values come from the gateway and are
/// arbitrary strings, so byte slicing could split a multi-byte character.
fn short(value: &str) -> String {
    if value.chars().count() > 16 {
        let prefix: String = value.chars().take(14).collect();
        format!("{prefix}..")
    } else {
        value.to_string()
    }
}
