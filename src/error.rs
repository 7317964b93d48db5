//! Error types for routespec

use thiserror::Error;

use crate::templates::TemplateError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Canonical handler shape, shown in signature errors
pub const EXPECTED_SIGNATURE: &str = "fn(context, *record) -> (*record, error)";

/// routespec errors
#[derive(Error, Debug)]
pub enum Error {
    // --- input shape -----------------------------------------------------
    #[error("incorrect {target:?}: \"{got}\", required: \"{want}\"")]
    BadValue {
        target: String,
        got: String,
        want: String,
    },

    #[error("incorrect type: {got:?}, required: {want:?}")]
    BadType { got: String, want: String },

    #[error("invalid {target:?}: \"{got}\", allowed values are: {allowed:?}")]
    NotAllowed {
        target: String,
        got: String,
        allowed: String,
    },

    #[error("accepted characters: {want:?}, got: {got:?}")]
    BadFormat { got: String, want: String },

    #[error(
        "handlers must have the following signature:\n    expected: {}\n         got: {got}\n       error: {source}",
        EXPECTED_SIGNATURE
    )]
    Signature {
        got: String,
        #[source]
        source: Box<Error>,
    },

    #[error("function must not be anonymous: {0:?}")]
    AnonymousHandler(String),

    #[error("single pointer required, got: {0:?}")]
    SinglePointerRequired(String),

    #[error("floats aren't allowed, got: {0:?}")]
    FloatNotAllowed(String),

    #[error("failed {action:?}{}{}, err: ({source})", on_item(.item), wanting(.wanted))]
    Failed {
        action: String,
        item: Option<String>,
        wanted: Option<String>,
        #[source]
        source: Box<Error>,
    },

    // --- internal invariants ---------------------------------------------
    #[error("fatal error: invalid parameter passed: {got}, wanted: {want}")]
    InvalidParam { got: String, want: String },

    #[error("fatal error: function name is invalid: {0:?}")]
    InvalidFnName(String),

    #[error("fatal error: no symbol allocated for {0:?}")]
    MissingSymbol(String),

    #[error("fatal error: unreachable: {0}")]
    Unreachable(&'static str),

    // --- rendering / encoding / plumbing ---------------------------------
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

fn on_item(item: &Option<String>) -> String {
    item.as_ref()
        .map(|i| format!(", on {:?}", i))
        .unwrap_or_default()
}

fn wanting(wanted: &Option<String>) -> String {
    wanted
        .as_ref()
        .map(|w| format!(", wanted: {:?}", w))
        .unwrap_or_default()
}

/// Broad error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The route tree, a type description or a tag is malformed
    InputShape,
    /// A defect in routespec itself
    Internal,
    /// Template execution, document encoding, config or IO failure
    Rendering,
}

impl Error {
    /// Wrap with the action that failed
    pub fn failed(self, action: impl Into<String>) -> Self {
        Error::Failed {
            action: action.into(),
            item: None,
            wanted: None,
            source: Box::new(self),
        }
    }

    /// Wrap with the action that failed and the item it failed on
    pub fn failed_on(self, action: impl Into<String>, item: impl Into<String>) -> Self {
        Error::Failed {
            action: action.into(),
            item: Some(item.into()),
            wanted: None,
            source: Box::new(self),
        }
    }

    /// Wrap with action, item and the shape that was expected
    pub fn failed_on_wanting(
        self,
        action: impl Into<String>,
        item: impl Into<String>,
        wanted: impl Into<String>,
    ) -> Self {
        Error::Failed {
            action: action.into(),
            item: Some(item.into()),
            wanted: Some(wanted.into()),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through context wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Failed { source, .. } | Error::Signature { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Classify the error, looking through context wrappers
    pub fn category(&self) -> ErrorCategory {
        match self.root_cause() {
            Error::BadValue { .. }
            | Error::BadType { .. }
            | Error::NotAllowed { .. }
            | Error::BadFormat { .. }
            | Error::AnonymousHandler(_)
            | Error::SinglePointerRequired(_)
            | Error::FloatNotAllowed(_) => ErrorCategory::InputShape,
            Error::InvalidParam { .. }
            | Error::InvalidFnName(_)
            | Error::MissingSymbol(_)
            | Error::Unreachable(_) => ErrorCategory::Internal,
            Error::Template(_)
            | Error::Json(_)
            | Error::Yaml(_)
            | Error::Io(_)
            | Error::Config(_) => ErrorCategory::Rendering,
            // root_cause never stops on a wrapper
            Error::Failed { .. } | Error::Signature { .. } => ErrorCategory::Internal,
        }
    }

    /// True when the error wraps (at any depth) a handler signature mismatch
    pub fn is_signature_mismatch(&self) -> bool {
        match self {
            Error::Signature { .. } => true,
            Error::Failed { source, .. } => source.is_signature_mismatch(),
            _ => false,
        }
    }

    pub(crate) fn bad_value(
        target: impl Into<String>,
        got: impl ToString,
        want: impl ToString,
    ) -> Self {
        Error::BadValue {
            target: target.into(),
            got: got.to_string(),
            want: want.to_string(),
        }
    }

    pub(crate) fn bad_type(got: impl ToString, want: impl Into<String>) -> Self {
        Error::BadType {
            got: got.to_string(),
            want: want.into(),
        }
    }

    pub(crate) fn not_allowed<T: ToString>(
        target: impl Into<String>,
        got: impl ToString,
        allowed: &[T],
    ) -> Self {
        Error::NotAllowed {
            target: target.into(),
            got: got.to_string(),
            allowed: allowed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}
