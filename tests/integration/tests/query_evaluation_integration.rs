//! Integration tests for query evaluation
//!
//! These tests verify how `all_react` drives reactions:
//! 1. Branch selection from one condition evaluation
//! 2. Action ordering and element resolution
//! 3. Failure behaviour

use rstest::*;
use strudel::{Document, MemoryDocument, Strudel, StrudelError};
use strudel_integration_tests::Switch;

#[fixture]
fn service() -> Strudel<MemoryDocument> {
	Strudel::new(MemoryDocument::new())
}

#[rstest]
#[case(true)]
#[case(false)]
fn test_query_without_reactions_is_noop(service: Strudel<MemoryDocument>, #[case] value: bool) {
	// Arrange
	let el = service.document().append_element_with("div", &[("role", "note")]);
	let query = service.query(move || value).build().unwrap();

	// Act
	query.all_react().unwrap();

	// Assert
	assert_eq!(service.document().attribute(el, "role").as_deref(), Some("note"));
	assert_eq!(query.evaluations(), 1);
}

#[rstest]
fn test_true_condition_sets_role_on_every_match(service: Strudel<MemoryDocument>) {
	// Arrange
	let document = service.document();
	let a = document.append_element_with("span", &[("class", "fake-button")]);
	let b = document.append_element_with("span", &[("class", "fake-button")]);
	let other = document.append_element("span");
	let query = service
		.query(|| true)
		.reaction(".fake-button")
		.set("role", "button")
		.otherwise()
		.set("role", "presentation")
		.build()
		.unwrap();

	// Act
	query.all_react().unwrap();

	// Assert
	assert_eq!(document.attribute(a, "role").as_deref(), Some("button"));
	assert_eq!(document.attribute(b, "role").as_deref(), Some("button"));
	assert_eq!(document.attribute(other, "role"), None);
}

#[rstest]
fn test_false_condition_runs_negative_branch(service: Strudel<MemoryDocument>) {
	// Arrange
	let document = service.document();
	let a = document.append_element_with("section", &[("hidden", "true")]);
	let b = document.append_element_with("section", &[("hidden", "true")]);
	let query = service
		.query(|| false)
		.reaction("section")
		.set("aria-live", "polite")
		.otherwise()
		.remove("hidden")
		.build()
		.unwrap();

	// Act
	query.all_react().unwrap();

	// Assert
	for el in [a, b] {
		assert_eq!(document.attribute(el, "hidden"), None);
		assert_eq!(document.attribute(el, "aria-live"), None);
	}
}

#[rstest]
fn test_false_condition_without_negation_applies_nothing(service: Strudel<MemoryDocument>) {
	// Arrange
	let el = service.document().append_element_with("section", &[("hidden", "true")]);
	let query = service
		.query(|| false)
		.reaction("section")
		.remove("hidden")
		.build()
		.unwrap();

	// Act
	query.all_react().unwrap();

	// Assert
	assert_eq!(service.document().attribute(el, "hidden").as_deref(), Some("true"));
}

#[rstest]
fn test_add_then_set_last_write_wins(service: Strudel<MemoryDocument>) {
	let el = service.document().append_element("input");
	let query = service
		.query(|| true)
		.reaction("input")
		.add("aria-invalid")
		.set("aria-invalid", "x")
		.build()
		.unwrap();

	query.all_react().unwrap();

	assert_eq!(service.document().attribute(el, "aria-invalid").as_deref(), Some("x"));
}

#[rstest]
fn test_remove_missing_attribute_is_silent(service: Strudel<MemoryDocument>) {
	let el = service.document().append_element_with("p", &[("class", "intro")]);
	let query = service
		.query(|| true)
		.reaction("p")
		.remove("hidden")
		.build()
		.unwrap();

	assert!(query.all_react().is_ok());
	assert_eq!(service.document().attribute(el, "class").as_deref(), Some("intro"));
	assert_eq!(service.document().attribute(el, "hidden"), None);
}

#[rstest]
fn test_reaction_with_no_matches_does_not_block_others(service: Strudel<MemoryDocument>) {
	// Arrange
	let target = service.document().append_element_with("nav", &[("id", "main")]);
	let query = service
		.query(|| true)
		.reaction("#not-rendered")
		.set("aria-hidden", "true")
		.reaction("#main")
		.set("aria-label", "Main")
		.build()
		.unwrap();

	// Act
	let result = query.all_react();

	// Assert
	assert!(result.is_ok());
	assert_eq!(
		service.document().attribute(target, "aria-label").as_deref(),
		Some("Main")
	);
}

#[rstest]
fn test_condition_reads_facade_predicates(service: Strudel<MemoryDocument>) {
	// Arrange
	let document = service.document();
	let body = document.append_element_with("body", &[("class", "theme-dark")]);
	let logo = document.append_element_with("img", &[("class", "logo")]);
	let reader = service.clone();
	let query = service
		.try_query(move || reader.has_class("body", "theme-dark"))
		.reaction(".logo")
		.set("data-variant", "light")
		.otherwise()
		.set("data-variant", "dark")
		.build()
		.unwrap();

	// Act
	query.all_react().unwrap();
	let first = document.attribute(logo, "data-variant");
	document.set_attribute(&body, "class", "theme-light").unwrap();
	query.all_react().unwrap();

	// Assert
	assert_eq!(first.as_deref(), Some("light"));
	assert_eq!(document.attribute(logo, "data-variant").as_deref(), Some("dark"));
}

#[rstest]
fn test_predicate_failure_inside_condition_propagates(service: Strudel<MemoryDocument>) {
	let reader = service.clone();
	let query = service
		.try_query(move || reader.is_style("#sidebar", "display", "none"))
		.reaction("main")
		.set("data-wide", "true")
		.build()
		.unwrap();

	let result = query.all_react();

	assert_eq!(result, Err(StrudelError::not_found("#sidebar")));
}

#[rstest]
fn test_invalid_reaction_selector_stops_evaluation(service: Strudel<MemoryDocument>) {
	// Arrange
	let el = service.document().append_element("aside");
	let query = service
		.query(|| true)
		.reaction("aside")
		.set("role", "complementary")
		.reaction("aside >")
		.set("role", "ignored")
		.build()
		.unwrap();

	// Act
	let result = query.all_react();

	// Assert: earlier writes are not rolled back
	assert!(matches!(result, Err(StrudelError::InvalidSelector { .. })));
	assert_eq!(
		service.document().attribute(el, "role").as_deref(),
		Some("complementary")
	);
}

#[rstest]
fn test_switch_toggles_branches(service: Strudel<MemoryDocument>) {
	// Arrange
	let switch = Switch::new(true);
	let el = service.document().append_element("dialog");
	let query = service
		.query(switch.condition())
		.reaction("dialog")
		.set("open", "")
		.otherwise()
		.remove("open")
		.build()
		.unwrap();

	// Act & Assert
	query.all_react().unwrap();
	assert_eq!(service.document().attribute(el, "open").as_deref(), Some(""));

	switch.set(false);
	query.all_react().unwrap();
	assert_eq!(service.document().attribute(el, "open"), None);
	assert_eq!(switch.calls(), 2);
}
