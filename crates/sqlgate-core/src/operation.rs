//! Operation classifier: leading-keyword extraction and the per-phase whitelist.
//!
//! Only the first keyword of a statement is ever inspected. Everything after it
//! is left to the store.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DOTTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\.\s*").unwrap());
static LEADING_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\w+)").unwrap());

/// Normalize a raw statement: collapse whitespace runs, trim, and glue
/// qualified names back together (`s . t` → `s.t`).
pub fn normalize(sql: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(sql, " ");
    DOTTED_RE.replace_all(collapsed.trim(), ".").into_owned()
}

/// Extract the uppercased leading keyword of a statement.
///
/// Returns an empty string for empty or whitespace-only input, and for input
/// that does not start with a word character.
pub fn classify(sql: &str) -> String {
    let normalized = normalize(sql);
    LEADING_WORD_RE
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_default()
}

/// A classified statement operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Insert,
    Update,
    Delete,
    Alter,
    Drop,
    Select,
    /// Anything else, including the empty token.
    Other(String),
}

impl Operation {
    /// The six DDL/DML operations a challenge phase can accept.
    pub const SUPPORTED: [Operation; 6] = [
        Operation::Create,
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
        Operation::Alter,
        Operation::Drop,
    ];

    /// Map an already-uppercased keyword to an operation.
    pub fn from_token(token: &str) -> Self {
        match token {
            "CREATE" => Operation::Create,
            "INSERT" => Operation::Insert,
            "UPDATE" => Operation::Update,
            "DELETE" => Operation::Delete,
            "ALTER" => Operation::Alter,
            "DROP" => Operation::Drop,
            "SELECT" => Operation::Select,
            other => Operation::Other(other.to_string()),
        }
    }

    /// Classify a raw statement.
    pub fn of_statement(sql: &str) -> Self {
        Self::from_token(&classify(sql))
    }

    /// The keyword as it appears in SQL.
    pub fn keyword(&self) -> &str {
        match self {
            Operation::Create => "CREATE",
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Alter => "ALTER",
            Operation::Drop => "DROP",
            Operation::Select => "SELECT",
            Operation::Other(token) => token,
        }
    }

    /// True for the six DDL/DML keywords.
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }

    /// True for CREATE/ALTER/DROP.
    pub fn is_ddl(&self) -> bool {
        matches!(self, Operation::Create | Operation::Alter | Operation::Drop)
    }

    /// Check this operation against a phase whitelist.
    ///
    /// SELECT is refused first, whatever the phase allows.
    pub fn authorize(self, allowed: Option<&Operation>) -> Result<Operation, RejectionReason> {
        if self == Operation::Select {
            return Err(RejectionReason::SelectNotSupported);
        }
        if let Some(allowed) = allowed {
            if !self.keyword().eq_ignore_ascii_case(allowed.keyword()) {
                return Err(RejectionReason::NotAllowed {
                    allowed: allowed.clone(),
                    found: self.keyword().to_string(),
                });
            }
        }
        if !self.is_supported() {
            return Err(RejectionReason::Unrecognized {
                token: self.keyword().to_string(),
            });
        }
        Ok(self)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parses a phase whitelist entry. Only the six supported keywords are accepted.
impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = Operation::from_token(&s.trim().to_uppercase());
        if op.is_supported() {
            Ok(op)
        } else {
            Err(format!("unsupported operation {s:?}"))
        }
    }
}

/// Why a statement was refused before any transaction began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    SelectNotSupported,
    Unrecognized { token: String },
    NotAllowed { allowed: Operation, found: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::SelectNotSupported => f.write_str("SELECT is not supported"),
            RejectionReason::Unrecognized { token } if token.is_empty() => {
                f.write_str("no leading keyword")
            }
            RejectionReason::Unrecognized { token } => write!(f, "unrecognized operation {token}"),
            RejectionReason::NotAllowed { allowed, found } => {
                write!(f, "{found} is not allowed, phase accepts {allowed}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_glues_qualified_names() {
        assert_eq!(normalize("  UPDATE  main . t\n SET x = 1 "), "UPDATE main.t SET x = 1");
    }

    #[test]
    fn leading_punctuation_yields_empty_token() {
        assert_eq!(classify("(SELECT 1)"), "");
        assert_eq!(classify(""), "");
        assert_eq!(classify(" \t\r\n "), "");
    }

    #[test]
    fn keyword_stops_at_punctuation() {
        assert_eq!(classify("drop;"), "DROP");
        assert_eq!(classify("insert(x)"), "INSERT");
    }

    #[test]
    fn ddl_covers_schema_changes_only() {
        let ddl: Vec<_> = Operation::SUPPORTED.iter().filter(|op| op.is_ddl()).collect();
        assert_eq!(ddl, [&Operation::Create, &Operation::Alter, &Operation::Drop]);
        assert!(!Operation::Select.is_ddl());
    }
}
