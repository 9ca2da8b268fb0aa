//! # Script keys
//!
//! Derives the subject name and status-store key from the first non-blank
//! line of a generated monologue. Generated scripts open with
//! `Two Thoughts from <Name>.`; the name becomes a slug which, joined with
//! the run timestamp, addresses both the audio file and the status record.
//!
//! Derivation never fails: scripts without a usable subject line are keyed
//! by the timestamp alone.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use regex::Regex;

use crate::error::Error;

/// Subject name recorded when the opening line cannot be parsed
pub const UNKNOWN_SUBJECT: &str = "unknown";

const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static SUBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)two\s+thoughts\s+from\s+(.*)$").unwrap());

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Extracts the subject name following the marker phrase on the first
/// non-blank line. Leading blank lines are skipped; later lines never are.
pub fn parse_subject(script: &str) -> Result<String, Error> {
    let first_line = script
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(Error::ParseError("Script is empty"))?;

    let subject = SUBJECT_RE
        .captures(first_line)
        .and_then(|cap| cap.get(1))
        .ok_or(Error::ParseError(
            "First line does not contain the subject marker",
        ))?
        .as_str()
        .trim()
        .trim_end_matches('.')
        .trim_end();

    if subject.is_empty() {
        return Err(Error::ParseError("Subject name after marker is empty"));
    }

    Ok(subject.to_string())
}

/// Lowercase, `[a-z0-9_]` only, words joined by single underscores
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALNUM_RE
        .split(&lowered)
        .filter(|part| !part.is_empty())
        .join("_")
}

/// Status key and subject for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunKey {
    pub key: String,
    /// `None` when the key fell back to the bare timestamp
    pub subject: Option<String>,
}

impl RunKey {
    pub fn subject_or_unknown(&self) -> &str {
        self.subject.as_deref().unwrap_or(UNKNOWN_SUBJECT)
    }
}

pub fn derive_key(script: &str, started_at: DateTime<Utc>) -> RunKey {
    let timestamp = started_at.format(KEY_TIMESTAMP_FORMAT).to_string();

    let parsed = parse_subject(script).and_then(|subject| {
        let slug = slugify(&subject);
        if slug.is_empty() {
            Err(Error::ParseError("Subject name has no usable characters"))
        } else {
            Ok((subject, slug))
        }
    });

    match parsed {
        Ok((subject, slug)) => RunKey {
            key: format!("{slug}_{timestamp}"),
            subject: Some(subject),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to timestamp key");
            RunKey {
                key: timestamp,
                subject: None,
            }
        }
    }
}
