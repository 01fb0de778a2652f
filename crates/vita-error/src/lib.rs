//! Shared error type for the Vita workspace.
//!
//! Mirrors the shape of `radiate-error`: a `Cow`-backed error string, one
//! variant per error category, and a `with_context` chain so a caller can see
//! both what failed and why the caller cared. The core engine never panics
//! across this boundary except for programmer-error contracts (see
//! `spec.md` §7) -- everything recoverable comes back through `VitaResult`.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

pub type VitaResult<T> = Result<T, VitaError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidConfig,
    MalformedInput,
    MalformedProgram,
    Evaluation,
    Cache,
    Engine,
    Io,
    Serde,
    Multiple,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

/// The family of errors the Vita engine can surface across its public API.
///
/// Per `spec.md` §7, the core never throws across the API for recoverable
/// conditions -- malformed CSV rows are skipped with a warning, "no value"
/// results propagate as tagged values, and only genuinely invalid
/// configuration or corrupt program streams produce a `VitaError`.
#[derive(Debug)]
pub enum VitaError {
    /// `Problem::validate` rejected the environment (spec §4.1, §7):
    /// e.g. `enough_terminals() == false`, conflicting parameters.
    InvalidConfig { message: ErrString },
    /// A CSV/XRFF source produced zero surviving rows, or the format itself
    /// could not be recognized.
    MalformedInput { message: ErrString },
    /// Deserializing an individual failed: unknown opcode, arity mismatch,
    /// inconsistent categories.
    MalformedProgram { message: ErrString },
    /// The user-supplied fitness function panicked or returned an invalid
    /// score; the driver converts this into worst-fitness and logs it, but
    /// surfaces it here when the caller asked for the raw outcome.
    Evaluation { message: ErrString },
    /// Fitness cache corruption / capacity misconfiguration.
    Cache { message: ErrString },
    /// A generic engine-level failure (search misconfiguration, no runs
    /// requested, etc).
    Engine { message: ErrString },
    Io { source: std::io::Error },
    Serde { message: ErrString },
    Multiple(MultiDisplay),
    Context {
        context: ErrorContext,
        source: Box<VitaError>,
    },
}

impl VitaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::MalformedInput { .. } => ErrorCode::MalformedInput,
            Self::MalformedProgram { .. } => ErrorCode::MalformedProgram,
            Self::Evaluation { .. } => ErrorCode::Evaluation,
            Self::Cache { .. } => ErrorCode::Cache,
            Self::Engine { .. } => ErrorCode::Engine,
            Self::Io { .. } => ErrorCode::Io,
            Self::Serde { .. } => ErrorCode::Serde,
            Self::Multiple(_) => ErrorCode::Multiple,
            Self::Context { .. } => ErrorCode::Context,
        }
    }

    pub fn with_context(self, msg: impl Into<String>) -> Self {
        VitaError::Context {
            context: ErrorContext::new(msg),
            source: Box::new(self),
        }
    }
}

impl Display for VitaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { message } => write!(f, "invalid configuration: {message}"),
            Self::MalformedInput { message } => write!(f, "malformed input: {message}"),
            Self::MalformedProgram { message } => write!(f, "malformed program: {message}"),
            Self::Evaluation { message } => write!(f, "evaluation error: {message}"),
            Self::Cache { message } => write!(f, "cache error: {message}"),
            Self::Engine { message } => write!(f, "engine error: {message}"),
            Self::Io { source } => write!(f, "i/o error: {source}"),
            Self::Serde { message } => write!(f, "serialization error: {message}"),
            Self::Multiple(m) => write!(f, "multiple errors:\n{m}"),
            Self::Context { context, source } => write!(f, "{context}\ncaused by: {source}"),
        }
    }
}

impl std::error::Error for VitaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            Self::Context { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VitaError {
    fn from(source: std::io::Error) -> Self {
        VitaError::Io { source }
    }
}

#[derive(Debug)]
pub struct ErrorContext {
    message: String,
}

impl ErrorContext {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorContext {}

#[derive(Debug)]
pub struct MultiDisplay(Vec<VitaError>);

impl Display for MultiDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{i}] {e} (code: {:?})", e.code())?;
        }
        Ok(())
    }
}

impl From<Vec<VitaError>> for MultiDisplay {
    fn from(v: Vec<VitaError>) -> Self {
        Self(v)
    }
}

pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> VitaResult<T>;
    fn with_context<F: FnOnce() -> String>(self, f: F) -> VitaResult<T>;
}

impl<T, E: Into<VitaError>> ResultExt<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> VitaResult<T> {
        self.map_err(|e| e.into().with_context(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> VitaResult<T> {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[doc(hidden)]
pub mod __private {
    #[inline]
    #[cold]
    #[must_use]
    pub fn must_use<E>(e: E) -> E {
        e
    }
}

#[macro_export]
macro_rules! vita_err {
    (InvalidConfig: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::VitaError::InvalidConfig { message: format!($fmt, $($arg),*).into() })
    };
    (MalformedInput: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::VitaError::MalformedInput { message: format!($fmt, $($arg),*).into() })
    };
    (MalformedProgram: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::VitaError::MalformedProgram { message: format!($fmt, $($arg),*).into() })
    };
    (Evaluation: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::VitaError::Evaluation { message: format!($fmt, $($arg),*).into() })
    };
    (Cache: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::VitaError::Cache { message: format!($fmt, $($arg),*).into() })
    };
    (Engine: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::VitaError::Engine { message: format!($fmt, $($arg),*).into() })
    };
    ($variant:ident: $msg:expr $(,)?) => {{
        $crate::__private::must_use($crate::VitaError::Engine { message: $msg.into() })
    }};
}

#[macro_export]
macro_rules! vita_bail {
    ($($tt:tt)+) => { return Err($crate::vita_err!($($tt)+)) };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($tt:tt)+) => {
        if !$cond { $crate::vita_bail!($($tt)+); }
    };
}
