//! Reconciliation engine
//!
//! Orchestrates the archive scanner, canonical hasher, and ledger client,
//! then classifies every hash into verified / unnotarized / missing. The
//! local and remote sides are independent and run concurrently; the only
//! mutation after they rejoin is the confirmations back-fill.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::archive;
use crate::canonical;
use crate::error::{VerifyError, VerifyResult};
use crate::ledger::{LedgerClient, LedgerRecord};
use crate::ticket::VerificationRequest;

/// Caller-supplied sink for human-readable status messages.
///
/// This engine is the only place status strings are constructed; the
/// sub-components report through plain callbacks that are formatted here.
pub type ProgressFn = dyn Fn(&str) + Send + Sync;

fn emit(sink: &ProgressFn, msg: &str) {
    sink(msg)
}

/// Outcome of one verification run
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    /// Local entries with a matching on-chain record (one element per local
    /// entry; duplicates with the same hash are counted individually)
    pub verified: Vec<LedgerRecord>,
    /// Local hashes with no on-chain counterpart
    pub unnotarized: Vec<String>,
    /// On-chain records with no local counterpart
    pub missing: Vec<LedgerRecord>,
}

impl VerificationReport {
    /// True when every local hash is notarized and every on-chain record has
    /// a local counterpart
    pub fn is_clean(&self) -> bool {
        self.unnotarized.is_empty() && self.missing.is_empty()
    }

    /// Number of local entries processed
    pub fn local_count(&self) -> usize {
        self.verified.len() + self.unnotarized.len()
    }
}

/// Verify a log archive against the ledger.
///
/// Each step is independently failable and surfaced as-is; there are no
/// internal retries and no partial results.
pub async fn reconcile(
    client: &LedgerClient,
    request: &VerificationRequest,
    archive_bytes: Vec<u8>,
    progress: Arc<ProgressFn>,
) -> VerifyResult<VerificationReport> {
    let dates = request.expand_dates();
    let (date_start, date_end) = request.date_bounds();
    emit(
        progress.as_ref(),
        &format!(
            "Verifying {} day(s) for owner {} in namespace {}",
            dates.len(),
            request.owner,
            request.namespace
        ),
    );

    // Local and remote sides are independent; scan+hash runs on the blocking
    // pool while the ledger pagination proceeds.
    let scan_progress = Arc::clone(&progress);
    let local_task = tokio::task::spawn_blocking(move || {
        let entries = archive::scan(&archive_bytes, &date_start, &date_end)?;
        emit(
            scan_progress.as_ref(),
            &format!("Archive: {} entries in range", entries.len()),
        );

        let mut hashes = Vec::with_capacity(entries.len());
        for entry in &entries {
            hashes.push(canonical::hash_content(&entry.content)?);
        }
        emit(
            scan_progress.as_ref(),
            &format!("Hashed {} local entries", hashes.len()),
        );
        Ok::<Vec<String>, VerifyError>(hashes)
    });

    let query_progress = Arc::clone(&progress);
    let remote_fut = client.query_records(&request.owner, &request.namespace, &dates, {
        move |page, total| {
            emit(
                query_progress.as_ref(),
                &format!("Ledger page {page}: {total} record(s) so far"),
            );
        }
    });

    let (local_result, remote_result) = tokio::join!(local_task, remote_fut);
    let local_hashes = local_result
        .map_err(|e| VerifyError::InvalidArchive(format!("archive task failed: {e}")))??;
    let mut records = remote_result?;

    // Confirmation back-fill: one independent height fetch, after pagination
    let height = client.current_height().await?;
    emit(progress.as_ref(), &format!("Chain height: {height}"));
    for record in &mut records {
        record.confirmations = match record.block_height {
            Some(block_height) => height.saturating_sub(block_height),
            None => 0,
        };
    }

    Ok(classify(local_hashes, records))
}

/// Partition local hashes and ledger records.
///
/// Every local hash lands in exactly one of verified/unnotarized; every
/// record whose hash has no local counterpart lands in missing. When several
/// records share a hash, the one from the highest block wins; unmined
/// records rank below any mined record.
fn classify(local_hashes: Vec<String>, records: Vec<LedgerRecord>) -> VerificationReport {
    let mut best: HashMap<&str, &LedgerRecord> = HashMap::new();
    for record in &records {
        best.entry(record.content_hash.as_str())
            .and_modify(|current| {
                if record.block_height > current.block_height {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut verified = Vec::new();
    let mut unnotarized = Vec::new();
    for hash in &local_hashes {
        match best.get(hash.as_str()) {
            Some(record) => verified.push((*record).clone()),
            None => unnotarized.push(hash.clone()),
        }
    }

    let local_set: HashSet<&str> = local_hashes.iter().map(String::as_str).collect();
    let missing = records
        .iter()
        .filter(|r| !local_set.contains(r.content_hash.as_str()))
        .cloned()
        .collect();

    VerificationReport {
        verified,
        unnotarized,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn record(id: &str, hash: &str, block_height: Option<u64>) -> LedgerRecord {
        LedgerRecord {
            id: id.to_string(),
            content_hash: hash.to_string(),
            notarized_at: String::new(),
            notarized_date: "2026-01-01".to_string(),
            session_id: "s-1".to_string(),
            sequence: 0,
            block_height,
            block_timestamp: None,
            confirmations: 0,
        }
    }

    #[test]
    fn test_partition_law() {
        let local = vec!["h1".to_string(), "h2".to_string(), "h3".to_string()];
        let records = vec![record("tx-1", "h1", Some(10)), record("tx-4", "h4", Some(11))];

        let report = classify(local, records);

        assert_eq!(report.verified.len(), 1);
        assert_eq!(report.unnotarized, vec!["h2", "h3"]);
        assert_eq!(report.local_count(), 3);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].id, "tx-4");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_local_duplicates_all_verified() {
        // Ten local duplicates of one remotely-notarized hash: all ten are
        // verified and the remote record is not missing
        let local = vec!["h1".to_string(); 10];
        let records = vec![record("tx-1", "h1", Some(10))];

        let report = classify(local, records);

        assert_eq!(report.verified.len(), 10);
        assert!(report.unnotarized.is_empty());
        assert!(report.missing.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_duplicate_remote_hash_highest_block_wins() {
        let local = vec!["h1".to_string()];
        let records = vec![
            record("tx-low", "h1", Some(5)),
            record("tx-high", "h1", Some(9)),
            record("tx-unmined", "h1", None),
        ];

        let report = classify(local, records);

        assert_eq!(report.verified.len(), 1);
        assert_eq!(report.verified[0].id, "tx-high");
        // None of the duplicates is missing: the hash has a local counterpart
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_every_unmatched_remote_record_is_missing() {
        let local = vec!["h1".to_string()];
        let records = vec![
            record("tx-1", "h1", Some(5)),
            record("tx-2", "h2", Some(6)),
            record("tx-3", "h2", Some(7)),
        ];

        let report = classify(local, records);
        assert_eq!(report.missing.len(), 2);
    }

    #[test]
    fn test_empty_both_sides_is_clean() {
        let report = classify(Vec::new(), Vec::new());
        assert!(report.is_clean());
        assert_eq!(report.local_count(), 0);
    }

    #[test]
    fn test_emit_through_shared_sink() {
        let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let collected = Arc::clone(&messages);
        let progress: Arc<ProgressFn> = Arc::new(move |msg: &str| {
            collected.lock().unwrap().push(msg.to_string());
        });

        emit(progress.as_ref(), "first");
        let cloned = Arc::clone(&progress);
        emit(cloned.as_ref(), "second");

        assert_eq!(*messages.lock().unwrap(), vec!["first", "second"]);
    }
}
