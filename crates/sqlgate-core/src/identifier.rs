//! Identifier sanitizer.
//!
//! SQLite PRAGMA commands take object names as literals, not bound
//! parameters, so every caller-supplied table name passes through here
//! before it is spliced into an introspection command.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::IdentifierError;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Return `identifier` unchanged if it is a plain SQL identifier.
pub fn validate(identifier: &str) -> Result<&str, IdentifierError> {
    if IDENTIFIER_RE.is_match(identifier) {
        Ok(identifier)
    } else {
        Err(IdentifierError::Invalid {
            identifier: identifier.to_string(),
        })
    }
}

/// Non-failing check, for callers that only need a yes/no.
pub fn is_valid(identifier: &str) -> bool {
    IDENTIFIER_RE.is_match(identifier)
}
