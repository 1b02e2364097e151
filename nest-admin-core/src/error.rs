//! Outcome kernel for domain operations
//!
//! Every construction step in the domain returns an [`Outcome`] instead of
//! panicking. A failed outcome carries a [`Failure`]: one [`ErrorKind`] plus
//! an ordered, non-empty list of structured [`Error`]s.
//!
//! Chaining uses the standard combinators: `and_then` short-circuits on the
//! first failure and `map` transforms the success value. Independent
//! validations are merged with [`combine`] or the [`Combine`] trait so that
//! every failing field is reported at once.
//!
//! ```rust
//! use nest_admin_core::error::{Combine, ErrorKind, Failure, Outcome};
//!
//! let name: Outcome<&str> = Err(Failure::validation("Name.Empty", "name is required"));
//! let email: Outcome<&str> = Err(Failure::validation("Email.Invalid", "email is malformed"));
//!
//! let failure = (name, email).combine().unwrap_err();
//! assert_eq!(failure.kind(), ErrorKind::Validation);
//! assert_eq!(failure.errors().len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Class of a failure, mapped 1:1 onto a boundary status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Unexpected,
}

impl ErrorKind {
    /// Boundary status code for this class of failure
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Unexpected => 500,
        }
    }

    /// Get the error category for logging
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Unexpected => "unexpected",
        }
    }

    /// Whether the caller can fix the request and resubmit
    pub fn is_recoverable(self) -> bool {
        !matches!(self, ErrorKind::Unexpected)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// A single structured error entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Error {
    pub code: String,
    pub message: String,
}

impl Error {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Failed outcome: a kind and at least one error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} failure: {}", join_errors(.errors))]
pub struct Failure {
    kind: ErrorKind,
    errors: Vec<Error>,
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Failure {
    /// Create a failure carrying one error
    pub fn new(kind: ErrorKind, error: Error) -> Self {
        Self {
            kind,
            errors: vec![error],
        }
    }

    /// Create a failure from several errors.
    ///
    /// An empty list is replaced by a generic entry so the failure never
    /// ends up without errors.
    pub fn with_errors(kind: ErrorKind, errors: Vec<Error>) -> Self {
        if errors.is_empty() {
            return Self::new(
                kind,
                Error::new("Failure.Unspecified", "operation failed without detail"),
            );
        }
        Self { kind, errors }
    }

    pub fn validation<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(ErrorKind::Validation, Error::new(code, message))
    }

    pub fn not_found<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(ErrorKind::NotFound, Error::new(code, message))
    }

    pub fn conflict<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(ErrorKind::Conflict, Error::new(code, message))
    }

    pub fn unauthorized<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(ErrorKind::Unauthorized, Error::new(code, message))
    }

    pub fn unexpected<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::new(ErrorKind::Unexpected, Error::new(code, message))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// Check whether any error carries the given code
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Append another failure's errors, keeping this failure's kind
    pub fn merge(mut self, other: Failure) -> Self {
        self.errors.extend(other.errors);
        self
    }

    /// Boundary status code of this failure
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

/// Result of every domain operation
pub type Outcome<T> = std::result::Result<T, Failure>;

fn absorb(acc: Option<Failure>, failure: Failure) -> Option<Failure> {
    Some(match acc {
        Some(existing) => existing.merge(failure),
        None => failure,
    })
}

/// Merge independent outcomes into one.
///
/// Succeeds with every value in order when all inputs succeed. Otherwise the
/// failure holds the errors of every failing input, and its kind is that of
/// the first failing input.
pub fn combine<T, I>(outcomes: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = Outcome<T>>,
{
    let mut values = Vec::new();
    let mut failure = None;
    for outcome in outcomes {
        match outcome {
            Ok(value) => values.push(value),
            Err(f) => failure = absorb(failure, f),
        }
    }
    match failure {
        Some(f) => Err(f),
        None => Ok(values),
    }
}

/// Merge a tuple of independent outcomes of different types
pub trait Combine {
    type Output;

    fn combine(self) -> Outcome<Self::Output>;
}

macro_rules! impl_combine {
    ($($value:ident: $ty:ident),+) => {
        impl<$($ty),+> Combine for ($(Outcome<$ty>,)+) {
            type Output = ($($ty,)+);

            fn combine(self) -> Outcome<Self::Output> {
                let ($($value,)+) = self;
                let mut failure = None;
                $(
                    let $value = match $value {
                        Ok(v) => Some(v),
                        Err(f) => {
                            failure = absorb(failure, f);
                            None
                        }
                    };
                )+
                match ($($value,)+) {
                    ($(Some($value),)+) => Ok(($($value,)+)),
                    _ => Err(failure.unwrap_or_else(|| {
                        Failure::with_errors(ErrorKind::Unexpected, Vec::new())
                    })),
                }
            }
        }
    };
}

impl_combine!(a: A, b: B);
impl_combine!(a: A, b: B, c: C);
impl_combine!(a: A, b: B, c: C, d: D);
impl_combine!(a: A, b: B, c: C, d: D, e: E);
impl_combine!(a: A, b: B, c: C, d: D, e: E, f: F);

/// Accumulates field-level validation errors for a single value object
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<Error>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unless the condition holds
    pub fn ensure<C: Into<String>, M: Into<String>>(&mut self, condition: bool, code: C, message: M) {
        if !condition {
            self.errors.push(Error::new(code, message));
        }
    }

    /// Keep the value of a successful outcome, record the errors of a failed one
    pub fn add_result<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(failure) => {
                self.errors.extend(failure.into_errors());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finish validation, building the value only when nothing failed
    pub fn finish<T, F: FnOnce() -> T>(self, build: F) -> Outcome<T> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(Failure::with_errors(ErrorKind::Validation, self.errors))
        }
    }
}
