//! Validators and their dispatch.
//!
//! A phase supplies one of three validator shapes, picked when the session is
//! built. Dispatch forwards only the arguments that shape takes.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use sqlgate_core::errors::ValidatorError;
use sqlgate_storage::SchemaInspector;

/// What a validator returns: its verdict, or the reason it could not decide.
pub type ValidatorResult = Result<bool, Box<dyn std::error::Error + Send + Sync>>;

type WithSchemaFn = dyn Fn(&str, i64, &SchemaInspector<'_>) -> ValidatorResult + Send + Sync;
type BasicFn = dyn Fn(&str, i64) -> ValidatorResult + Send + Sync;
type CountOnlyFn = dyn Fn(i64) -> ValidatorResult + Send + Sync;

/// A phase's success predicate.
#[derive(Clone)]
pub enum Validator {
    /// `(statement, affected_rows, schema)`
    WithSchema(Arc<WithSchemaFn>),
    /// `(statement, affected_rows)`
    Basic(Arc<BasicFn>),
    /// `(affected_rows)`
    CountOnly(Arc<CountOnlyFn>),
}

impl Validator {
    pub fn with_schema<F>(f: F) -> Self
    where
        F: Fn(&str, i64, &SchemaInspector<'_>) -> ValidatorResult + Send + Sync + 'static,
    {
        Validator::WithSchema(Arc::new(f))
    }

    pub fn basic<F>(f: F) -> Self
    where
        F: Fn(&str, i64) -> ValidatorResult + Send + Sync + 'static,
    {
        Validator::Basic(Arc::new(f))
    }

    pub fn count_only<F>(f: F) -> Self
    where
        F: Fn(i64) -> ValidatorResult + Send + Sync + 'static,
    {
        Validator::CountOnly(Arc::new(f))
    }

    /// Passes when the statement touched exactly `n` rows.
    pub fn expect_affected(n: i64) -> Self {
        Validator::count_only(move |affected| Ok(affected == n))
    }

    /// Number of arguments this shape takes.
    pub fn arity(&self) -> usize {
        match self {
            Validator::WithSchema(_) => 3,
            Validator::Basic(_) => 2,
            Validator::CountOnly(_) => 1,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Validator::WithSchema(_) => "WithSchema",
            Validator::Basic(_) => "Basic",
            Validator::CountOnly(_) => "CountOnly",
        };
        write!(f, "Validator::{shape}")
    }
}

/// Invoke `validator` with the arguments its shape takes.
///
/// No validator means the phase is satisfied by any statement that executes.
/// An error returned by the validator, or a panic inside it, comes back as
/// `ValidatorError` so the caller can roll back.
pub fn dispatch(
    validator: Option<&Validator>,
    statement: &str,
    affected: i64,
    schema: &SchemaInspector<'_>,
) -> Result<bool, ValidatorError> {
    let Some(validator) = validator else {
        return Ok(true);
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| match validator {
        Validator::WithSchema(f) => f(statement, affected, schema),
        Validator::Basic(f) => f(statement, affected),
        Validator::CountOnly(f) => f(affected),
    }));

    match outcome {
        Ok(Ok(verdict)) => Ok(verdict),
        Ok(Err(e)) => Err(ValidatorError::Failed {
            message: e.to_string(),
        }),
        Err(payload) => Err(ValidatorError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
