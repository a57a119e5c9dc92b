//! Engine settings
//!
//! Settings can be built in code, parsed from TOML, or read from environment
//! variables prefixed with `STRUDEL_`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrudelError};

/// Tunables shared by every query created from one [`Strudel`](crate::Strudel).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
	/// Discard mutation records caused by a query's own writes.
	#[serde(default = "default_true")]
	pub reentrancy_guard: bool,

	/// Emit a `trace` event for every attribute write.
	#[serde(default)]
	pub trace_writes: bool,
}

fn default_true() -> bool {
	true
}

impl Default for EngineSettings {
	fn default() -> Self {
		Self {
			reentrancy_guard: true,
			trace_writes: false,
		}
	}
}

impl EngineSettings {
	/// Create new settings with defaults
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether self-triggered notifications are discarded.
	pub fn with_reentrancy_guard(mut self, enabled: bool) -> Self {
		self.reentrancy_guard = enabled;
		self
	}

	/// Sets whether every write is traced.
	pub fn with_trace_writes(mut self, enabled: bool) -> Self {
		self.trace_writes = enabled;
		self
	}

	/// Parses settings from a TOML document. Missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str(source).map_err(|e| StrudelError::Settings(e.to_string()))
	}

	/// Load settings from environment variables
	///
	/// Reads `STRUDEL_REENTRANCY_GUARD` and `STRUDEL_TRACE_WRITES`.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let mut settings = Self::default();

		if let Some(value) = lookup("STRUDEL_REENTRANCY_GUARD") {
			settings.reentrancy_guard = parse_flag("STRUDEL_REENTRANCY_GUARD", &value)?;
		}

		if let Some(value) = lookup("STRUDEL_TRACE_WRITES") {
			settings.trace_writes = parse_flag("STRUDEL_TRACE_WRITES", &value)?;
		}

		Ok(settings)
	}
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => Err(StrudelError::Settings(format!(
			"{key} must be a boolean, got `{other}`"
		))),
	}
}
