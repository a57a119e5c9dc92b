//! Integration tests for engine settings
//!
//! Settings loaded from TOML or the environment must reach every query
//! built by the service.

use rstest::*;
use serial_test::serial;
use strudel::{Document, EngineSettings, MemoryDocument, Strudel, StrudelError};

const GUARD_VAR: &str = "STRUDEL_REENTRANCY_GUARD";
const TRACE_VAR: &str = "STRUDEL_TRACE_WRITES";

/// Restores the environment variables touched by a test.
struct EnvGuard;

impl Drop for EnvGuard {
	fn drop(&mut self) {
		unsafe {
			std::env::remove_var(GUARD_VAR);
			std::env::remove_var(TRACE_VAR);
		}
	}
}

fn set_env(key: &str, value: &str) -> EnvGuard {
	unsafe { std::env::set_var(key, value) };
	EnvGuard
}

/// Runs a self-writing query once from an external mutation and returns its
/// evaluation count after `rounds` delivery rounds.
fn self_writing_evaluations(settings: EngineSettings, rounds: usize) -> u64 {
	let document = MemoryDocument::new();
	let el = document.append_element_with("div", &[("id", "status")]);
	let strudel = Strudel::with_settings(document, settings);
	let query = strudel
		.query(|| true)
		.reaction("#status")
		.set("data-state", "ready")
		.watch("#status", "data-state")
		.build()
		.unwrap();

	strudel.document().set_attribute(&el, "data-state", "pending").unwrap();
	strudel.document().settle(rounds);
	query.evaluations()
}

#[rstest]
fn test_toml_settings_reach_service() {
	// Arrange
	let settings = EngineSettings::from_toml_str(
		r#"
		reentrancy_guard = false
		trace_writes = true
		"#,
	)
	.unwrap();

	// Act
	let strudel = Strudel::with_settings(MemoryDocument::new(), settings.clone());

	// Assert
	assert_eq!(strudel.settings(), &settings);
	assert!(!strudel.settings().reentrancy_guard);
	assert!(strudel.settings().trace_writes);
}

#[rstest]
#[case(true, 1)]
#[case(false, 4)]
fn test_guard_setting_controls_feedback(#[case] guard: bool, #[case] expected: u64) {
	let settings = EngineSettings::new().with_reentrancy_guard(guard);

	assert_eq!(self_writing_evaluations(settings, 4), expected);
}

#[rstest]
fn test_trace_writes_does_not_change_results() {
	let traced = self_writing_evaluations(EngineSettings::new().with_trace_writes(true), 4);
	let quiet = self_writing_evaluations(EngineSettings::new(), 4);

	assert_eq!(traced, quiet);
}

#[rstest]
fn test_malformed_toml_is_a_settings_error() {
	let error = EngineSettings::from_toml_str("reentrancy_guard = \"sometimes\"").unwrap_err();

	assert!(matches!(error, StrudelError::Settings(_)));
}

#[rstest]
#[serial(strudel_env)]
fn test_env_settings_disable_guard() {
	// Arrange
	let _env = set_env(GUARD_VAR, "false");

	// Act
	let settings = EngineSettings::from_env().unwrap();

	// Assert
	assert!(!settings.reentrancy_guard);
	assert!(!settings.trace_writes);
	assert_eq!(self_writing_evaluations(settings, 3), 3);
}

#[rstest]
#[serial(strudel_env)]
fn test_env_without_variables_uses_defaults() {
	let _env = EnvGuard;
	unsafe {
		std::env::remove_var(GUARD_VAR);
		std::env::remove_var(TRACE_VAR);
	}

	let settings = EngineSettings::from_env().unwrap();

	assert_eq!(settings, EngineSettings::default());
}

#[rstest]
#[serial(strudel_env)]
fn test_env_rejects_invalid_flag() {
	let _env = set_env(TRACE_VAR, "maybe");

	let result = EngineSettings::from_env();

	assert!(matches!(result, Err(StrudelError::Settings(_))));
}
