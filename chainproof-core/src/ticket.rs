//! Verification ticket parsing and validation

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{VerifyError, VerifyResult};

/// Expected ticket discriminant
pub const TICKET_TYPE: &str = "arweave";

/// Wire form of a verification ticket
///
/// All fields are optional at the serde level so that validation can report
/// precise reasons instead of a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    #[serde(rename = "type", default)]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
}

impl Ticket {
    /// Parse a ticket from JSON text
    pub fn from_json(raw: &str) -> VerifyResult<Self> {
        serde_json::from_str(raw).map_err(|e| VerifyError::InvalidTicket(e.to_string()))
    }

    /// Validate the ticket into an immutable verification request
    pub fn validate(self) -> VerifyResult<VerificationRequest> {
        match self.ticket_type.as_deref() {
            Some(TICKET_TYPE) => {}
            Some(other) => {
                return Err(VerifyError::InvalidTicket(format!(
                    "unexpected ticket type \"{other}\", expected \"{TICKET_TYPE}\""
                )));
            }
            None => {
                return Err(VerifyError::InvalidTicket("missing ticket type".to_string()));
            }
        }

        let owner = require_non_empty(self.owner, "owner")?;
        let namespace = require_non_empty(self.namespace, "namespace")?;
        let date_start = require_non_empty(self.date_start, "date_start")?;
        let date_end = require_non_empty(self.date_end, "date_end")?;

        VerificationRequest::from_parts(owner, namespace, &date_start, &date_end)
    }
}

fn require_non_empty(value: Option<String>, field: &str) -> VerifyResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(VerifyError::InvalidTicket(format!("{field} is empty"))),
        None => Err(VerifyError::InvalidTicket(format!("missing {field}"))),
    }
}

/// Validated verification request — immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Notarizing identity (ledger wallet address)
    pub owner: String,
    /// Notarization namespace
    pub namespace: String,
    /// First day of the claimed window (inclusive)
    pub date_start: NaiveDate,
    /// Last day of the claimed window (inclusive)
    pub date_end: NaiveDate,
}

impl VerificationRequest {
    /// Build a request from string parts, validating dates and their order
    pub fn from_parts(
        owner: impl Into<String>,
        namespace: impl Into<String>,
        date_start: &str,
        date_end: &str,
    ) -> VerifyResult<Self> {
        let owner = owner.into();
        let namespace = namespace.into();
        if owner.is_empty() {
            return Err(VerifyError::InvalidTicket("owner is empty".to_string()));
        }
        if namespace.is_empty() {
            return Err(VerifyError::InvalidTicket("namespace is empty".to_string()));
        }

        let start = parse_date(date_start)?;
        let end = parse_date(date_end)?;
        if start > end {
            return Err(VerifyError::InvalidTicket(format!(
                "date_start {date_start} is after date_end {date_end}"
            )));
        }

        Ok(Self {
            owner,
            namespace,
            date_start: start,
            date_end: end,
        })
    }

    /// Expand the window into every calendar date it spans, inclusive both
    /// ends, as `YYYY-MM-DD` strings.
    pub fn expand_dates(&self) -> Vec<String> {
        self.date_start
            .iter_days()
            .take_while(|d| *d <= self.date_end)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Window bounds as `YYYY-MM-DD` strings
    pub fn date_bounds(&self) -> (String, String) {
        (
            self.date_start.format("%Y-%m-%d").to_string(),
            self.date_end.format("%Y-%m-%d").to_string(),
        )
    }
}

/// Parse a strict zero-padded `YYYY-MM-DD` date
fn parse_date(raw: &str) -> VerifyResult<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| VerifyError::InvalidTicket(format!("invalid date \"{raw}\", expected YYYY-MM-DD")))?;

    // chrono accepts unpadded components; the wire format is fixed-width
    if parsed.format("%Y-%m-%d").to_string() != raw {
        return Err(VerifyError::InvalidTicket(format!(
            "invalid date \"{raw}\", expected YYYY-MM-DD"
        )));
    }
    Ok(parsed)
}
