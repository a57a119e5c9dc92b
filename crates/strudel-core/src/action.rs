//! Attribute mutation instructions.

use std::fmt;
use std::str::FromStr;

use crate::error::StrudelError;

/// Value written by [`Action::Add`] when the attribute is absent.
pub const ADD_SENTINEL: &str = "true";

/// One attribute mutation applied by a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	/// Set the attribute to `value`, overwriting any previous value.
	Set {
		/// Target attribute name.
		attribute: String,
		/// New value.
		value: String,
	},
	/// Ensure the attribute exists.
	Add {
		/// Target attribute name.
		attribute: String,
	},
	/// Delete the attribute if present.
	Remove {
		/// Target attribute name.
		attribute: String,
	},
}

impl Action {
	/// Creates a `Set` action.
	pub fn set(attribute: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Set {
			attribute: attribute.into(),
			value: value.into(),
		}
	}

	/// Creates an `Add` action.
	pub fn add(attribute: impl Into<String>) -> Self {
		Self::Add {
			attribute: attribute.into(),
		}
	}

	/// Creates a `Remove` action.
	pub fn remove(attribute: impl Into<String>) -> Self {
		Self::Remove {
			attribute: attribute.into(),
		}
	}

	/// Returns the kind of this action.
	pub fn kind(&self) -> ActionKind {
		match self {
			Self::Set { .. } => ActionKind::Set,
			Self::Add { .. } => ActionKind::Add,
			Self::Remove { .. } => ActionKind::Remove,
		}
	}

	/// Returns the attribute this action targets.
	pub fn attribute(&self) -> &str {
		match self {
			Self::Set { attribute, .. } | Self::Add { attribute } | Self::Remove { attribute } => {
				attribute
			}
		}
	}

	/// Returns the value carried by a `Set` action.
	pub fn value(&self) -> Option<&str> {
		match self {
			Self::Set { value, .. } => Some(value),
			Self::Add { .. } | Self::Remove { .. } => None,
		}
	}
}

/// Discriminant of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
	/// See [`Action::Set`].
	Set,
	/// See [`Action::Add`].
	Add,
	/// See [`Action::Remove`].
	Remove,
}

impl ActionKind {
	/// Returns the lowercase name of the kind.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Set => "set",
			Self::Add => "add",
			Self::Remove => "remove",
		}
	}
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ActionKind {
	type Err = StrudelError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"set" => Ok(Self::Set),
			"add" => Ok(Self::Add),
			"remove" => Ok(Self::Remove),
			other => Err(StrudelError::UnknownActionKind(other.to_string())),
		}
	}
}
