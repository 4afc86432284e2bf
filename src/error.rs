//! Error types for the bindspec analysis core

use thiserror::Error;

/// Bindspec analysis errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Malformed input
    /// The document does not have the expected shape
    ///
    /// **Triggered by:** a root element that is not `registry`, a member or
    /// parameter without a `name`/`type` node, an unparseable enum literal
    #[error("Malformed input in {context}: {message}")]
    MalformedInput {
        /// Owning entity or document section
        context: String,
        /// Error description
        message: String,
    },

    /// A referenced name does not exist in the registry
    ///
    /// **Triggered by:** a member type, alias target, `structextends` base,
    /// enum alias member or extension name that was never declared
    #[error("Unknown {kind} '{name}' referenced from {context}")]
    UnknownReference {
        /// What kind of entity was looked up (type, member, extension, ...)
        kind: String,
        /// The name that failed to resolve
        name: String,
        /// Where the reference came from
        context: String,
    },

    /// An alias chain loops back on itself
    #[error("Alias cycle detected while resolving '{name}'")]
    AliasCycle {
        /// Canonical name where the cycle was detected
        name: String,
    },

    // Unrecognized constructs
    /// A construct has no rule in the fixed tables
    ///
    /// **Triggered by:** an enum member whose stripped name does not start
    /// with a letter and has no contextual rewrite, an unknown handle macro
    /// **Fix:** add the missing entry to the matching table in `GeneratorOptions`
    #[error("Unrecognized {construct} in {owner}")]
    UnrecognizedConstruct {
        /// Description of the construct
        construct: String,
        /// Canonical name of the owning entity
        owner: String,
    },

    /// A `*_t` basic type has no primitive mapping
    #[error("Mapping for the basic type {name} isn't supported")]
    UnmappedBasicType {
        /// Raw C type name
        name: String,
    },

    /// A rule table names an entity that does not exist (strict mode only)
    #[error("Stale entry '{entry}' in table {table}")]
    StaleTable {
        /// Table name
        table: String,
        /// Entry that matched nothing
        entry: String,
    },

    // Call-shape lowering
    /// Arguments passed to a call shape do not fit its public parameters
    #[error("Argument mismatch for {shape}: {reason}")]
    ArgumentMismatch {
        /// Public name of the call shape
        shape: String,
        /// Reason for the mismatch
        reason: String,
    },

    // Output
    /// The finished model could not be written out
    #[error("Failed to serialize {what}: {message}")]
    Serialization {
        /// What was being serialized
        what: String,
        /// Serializer message
        message: String,
    },

    // Native call failure
    /// A wrapped native call returned a non-success status code
    ///
    /// **Triggered by:** the status-code convention of a classified command
    #[error("{command} failed with status {code}{}", status_suffix(.status))]
    NativeStatus {
        /// Native command name
        command: String,
        /// Raw status code returned by the native call
        code: i64,
        /// Canonical status member name, if the code is known
        status: Option<String>,
    },
}

fn status_suffix(status: &Option<String>) -> String {
    status
        .as_ref()
        .map(|name| format!(" ({})", name))
        .unwrap_or_default()
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Aborts the whole run, no model is produced
    Fatal,
    /// Surfaced to the wrapper's caller, the caller may retry the native call
    Recoverable,
    /// Reported but does not prevent producing a model
    Warning,
}

impl Error {
    /// Create a malformed-input error
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedInput {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(what: impl Into<String>, err: serde_json::Error) -> Self {
        Error::Serialization {
            what: what.into(),
            message: err.to_string(),
        }
    }

    /// Create an unknown-reference error
    pub fn unknown(
        kind: impl Into<String>,
        name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Error::UnknownReference {
            kind: kind.into(),
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create an unrecognized-construct error
    pub fn unrecognized(construct: impl Into<String>, owner: impl Into<String>) -> Self {
        Error::UnrecognizedConstruct {
            construct: construct.into(),
            owner: owner.into(),
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::MalformedInput { .. } => ErrorSeverity::Fatal,
            Error::UnknownReference { .. } => ErrorSeverity::Fatal,
            Error::AliasCycle { .. } => ErrorSeverity::Fatal,
            Error::UnrecognizedConstruct { .. } => ErrorSeverity::Fatal,
            Error::UnmappedBasicType { .. } => ErrorSeverity::Fatal,
            Error::StaleTable { .. } => ErrorSeverity::Fatal,
            Error::Serialization { .. } => ErrorSeverity::Fatal,

            Error::NativeStatus { .. } => ErrorSeverity::Recoverable,

            Error::ArgumentMismatch { .. } => ErrorSeverity::Warning,
        }
    }

    /// Native status code carried by the error, if any
    pub fn native_status(&self) -> Option<i64> {
        match self {
            Error::NativeStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for bindspec operations
pub type Result<T> = std::result::Result<T, Error>;
