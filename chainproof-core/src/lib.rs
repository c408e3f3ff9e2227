//! Chainproof Core - ledger notarization verification engine
//!
//! Verifies that locally held JSON log files were notarized on a public
//! append-only ledger within a claimed time window, by a claimed identity.

pub mod archive;
pub mod canonical;
pub mod error;
pub mod ledger;
pub mod reconcile;
pub mod ticket;

pub use archive::{ArchiveEntry, scan};
pub use canonical::{canonicalize, hash_content};
pub use error::{VerifyError, VerifyResult};
pub use ledger::{LedgerClient, LedgerConfig, LedgerRecord};
pub use reconcile::{ProgressFn, VerificationReport, reconcile};
pub use ticket::{Ticket, VerificationRequest};
