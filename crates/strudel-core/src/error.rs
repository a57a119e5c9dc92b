//! Error types for the rule engine.

use thiserror::Error;

/// Errors raised while configuring or evaluating queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrudelError {
	/// A builder operation needed a reaction but none had been declared yet.
	#[error("`{operation}` called before any reaction was declared")]
	NoReaction {
		/// The builder operation that was misused.
		operation: &'static str,
	},

	/// A selector that must resolve to an element matched nothing.
	#[error("No element matches selector: {selector}")]
	ElementNotFound {
		/// The selector that failed to resolve.
		selector: String,
	},

	/// The host rejected a selector as malformed.
	#[error("Invalid selector `{selector}`: {reason}")]
	InvalidSelector {
		/// The rejected selector.
		selector: String,
		/// Why it was rejected.
		reason: String,
	},

	/// An action kind string did not name `set`, `add` or `remove`.
	#[error("Unrecognized action type of {0}")]
	UnknownActionKind(String),

	/// A fallible condition function reported a failure.
	#[error("Condition failed: {0}")]
	Condition(String),

	/// The host document rejected an operation.
	#[error("Host error: {0}")]
	Host(String),

	/// Engine settings could not be loaded.
	#[error("Settings error: {0}")]
	Settings(String),
}

impl StrudelError {
	/// Shorthand for [`StrudelError::ElementNotFound`].
	pub fn not_found(selector: impl Into<String>) -> Self {
		Self::ElementNotFound {
			selector: selector.into(),
		}
	}

	/// Returns true for configuration misuse detected by the builder.
	pub fn is_configuration(&self) -> bool {
		matches!(self, Self::NoReaction { .. })
	}
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, StrudelError>;
