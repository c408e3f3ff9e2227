//! Verification request resolution
//!
//! The request comes from a ticket file, discrete flags, or interactive
//! prompts for whatever the flags left out — in that order of precedence.

use std::path::Path;

use anyhow::Context;
use chainproof_core::{Ticket, VerificationRequest};

/// Discrete request fields supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct RequestFlags {
    pub owner: Option<String>,
    pub namespace: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

/// Resolve the verification request.
///
/// A ticket file wins over discrete flags; any flag left out is filled by
/// `prompt` (label → value).
pub fn resolve(
    ticket_path: Option<&Path>,
    flags: RequestFlags,
    mut prompt: impl FnMut(&str) -> anyhow::Result<String>,
) -> anyhow::Result<VerificationRequest> {
    if let Some(path) = ticket_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ticket {}", path.display()))?;
        let request = Ticket::from_json(&raw)?.validate()?;
        return Ok(request);
    }

    let owner = fill(flags.owner, "Owner address", &mut prompt)?;
    let namespace = fill(flags.namespace, "Namespace", &mut prompt)?;
    let date_start = fill(flags.date_start, "Start date (YYYY-MM-DD)", &mut prompt)?;
    let date_end = fill(flags.date_end, "End date (YYYY-MM-DD)", &mut prompt)?;

    Ok(VerificationRequest::from_parts(
        owner,
        namespace,
        &date_start,
        &date_end,
    )?)
}

fn fill(
    value: Option<String>,
    label: &str,
    prompt: &mut impl FnMut(&str) -> anyhow::Result<String>,
) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

/// Prompt on stderr, read one trimmed line from stdin
pub fn stdin_prompt(label: &str) -> anyhow::Result<String> {
    use std::io::Write;

    eprint!("{label}: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
