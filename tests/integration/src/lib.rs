//! Integration test utilities for strudel
//!
//! Shared page fixtures built on [`MemoryDocument`].

use std::cell::Cell;
use std::rc::Rc;

use strudel::{ElementId, MemoryDocument, Strudel};

/// A disclosure widget: a toggle button and the panel it controls.
pub struct Disclosure {
	/// Service bound to the page.
	pub strudel: Strudel<MemoryDocument>,
	/// `<button id="toggle" aria-expanded="false">`
	pub toggle: ElementId,
	/// `<div class="panel" hidden="true">`
	pub panel: ElementId,
}

impl Disclosure {
	/// Builds the page.
	pub fn new() -> Self {
		let document = MemoryDocument::new();
		let toggle = document.append_element_with("button", &[("id", "toggle"), ("aria-expanded", "false")]);
		let panel = document.append_element_with("div", &[("class", "panel"), ("hidden", "true")]);
		Self {
			strudel: Strudel::new(document),
			toggle,
			panel,
		}
	}

	/// Shorthand for the shared document.
	pub fn document(&self) -> &MemoryDocument {
		self.strudel.document()
	}
}

impl Default for Disclosure {
	fn default() -> Self {
		Self::new()
	}
}

/// A condition whose value and call count are controlled by the test.
#[derive(Clone, Default)]
pub struct Switch {
	value: Rc<Cell<bool>>,
	calls: Rc<Cell<usize>>,
}

impl Switch {
	/// Creates a switch with the given initial value.
	pub fn new(value: bool) -> Self {
		let switch = Self::default();
		switch.set(value);
		switch
	}

	/// Changes the value returned by the condition.
	pub fn set(&self, value: bool) {
		self.value.set(value);
	}

	/// How many times the condition ran.
	pub fn calls(&self) -> usize {
		self.calls.get()
	}

	/// The condition closure.
	pub fn condition(&self) -> impl Fn() -> bool + 'static {
		let value = self.value.clone();
		let calls = self.calls.clone();
		move || {
			calls.set(calls.get() + 1);
			value.get()
		}
	}
}
