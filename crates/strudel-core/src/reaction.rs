//! Reactions: selector-scoped bundles of positive and negative actions.

use crate::action::{ADD_SENTINEL, Action};
use crate::document::Document;
use crate::error::Result;

/// An attribute write performed while executing a reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedWrite<E> {
	/// Element that was written.
	pub element: E,
	/// Attribute that changed.
	pub attribute: String,
}

/// Record of every write made during one evaluation.
///
/// Writes that never reach the host (an `add` on a present attribute, a
/// `remove` on an absent one) are not recorded.
#[derive(Debug)]
pub struct WriteLog<E> {
	writes: Vec<AppliedWrite<E>>,
	trace: bool,
}

impl<E> Default for WriteLog<E> {
	fn default() -> Self {
		Self::new(false)
	}
}

impl<E> WriteLog<E> {
	/// Creates an empty log. With `trace` set, every write emits a `trace` event.
	pub fn new(trace: bool) -> Self {
		Self {
			writes: Vec::new(),
			trace,
		}
	}

	fn record(&mut self, element: E, attribute: &str) {
		self.writes.push(AppliedWrite {
			element,
			attribute: attribute.to_string(),
		});
	}

	/// Number of writes recorded.
	pub fn len(&self) -> usize {
		self.writes.len()
	}

	/// Returns true if nothing was written.
	pub fn is_empty(&self) -> bool {
		self.writes.is_empty()
	}

	/// Iterates over the recorded writes in order.
	pub fn iter(&self) -> impl Iterator<Item = &AppliedWrite<E>> {
		self.writes.iter()
	}
}

/// A target selector bound to two ordered action lists.
///
/// The positive list runs when the owning query's condition is true, the
/// negative list when it is false and negation is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
	selector: String,
	positive: Vec<Action>,
	negative: Vec<Action>,
	negation_enabled: bool,
}

impl Reaction {
	/// Creates a reaction with empty action lists and negation disabled.
	pub fn new(selector: impl Into<String>) -> Self {
		Self {
			selector: selector.into(),
			positive: Vec::new(),
			negative: Vec::new(),
			negation_enabled: false,
		}
	}

	/// Selector resolved on every execution.
	pub fn selector(&self) -> &str {
		&self.selector
	}

	/// Actions applied when the condition holds.
	pub fn positive_actions(&self) -> &[Action] {
		&self.positive
	}

	/// Actions applied when the condition fails and negation is enabled.
	pub fn negative_actions(&self) -> &[Action] {
		&self.negative
	}

	/// Whether the negative branch runs on a false condition.
	pub fn negation_enabled(&self) -> bool {
		self.negation_enabled
	}

	/// Enables the negative branch. There is no way back.
	pub fn enable_negation(&mut self) {
		self.negation_enabled = true;
	}

	/// Appends to the positive list.
	pub fn add_positive(&mut self, action: Action) {
		self.positive.push(action);
	}

	/// Appends to the negative list.
	pub fn add_negative(&mut self, action: Action) {
		self.negative.push(action);
	}

	/// Appends to whichever list is currently being configured.
	pub(crate) fn push(&mut self, action: Action) {
		if self.negation_enabled {
			self.add_negative(action);
		} else {
			self.add_positive(action);
		}
	}

	/// Applies the positive actions to the elements currently matching the selector.
	pub fn execute_positive<D: Document>(
		&self,
		document: &D,
		writes: &mut WriteLog<D::Element>,
	) -> Result<()> {
		self.execute(document, &self.positive, writes)
	}

	/// Applies the negative actions to the elements currently matching the selector.
	pub fn execute_negative<D: Document>(
		&self,
		document: &D,
		writes: &mut WriteLog<D::Element>,
	) -> Result<()> {
		self.execute(document, &self.negative, writes)
	}

	fn execute<D: Document>(
		&self,
		document: &D,
		actions: &[Action],
		writes: &mut WriteLog<D::Element>,
	) -> Result<()> {
		if actions.is_empty() {
			return Ok(());
		}

		// Resolved on every call so elements added since configuration are picked up
		let elements = document.select_all(&self.selector)?;

		for action in actions {
			for element in &elements {
				let written = apply(document, element, action)?;
				if written {
					if writes.trace {
						tracing::trace!(
							target: "strudel",
							selector = %self.selector,
							kind = %action.kind(),
							attribute = action.attribute(),
							"applied action"
						);
					}
					writes.record(element.clone(), action.attribute());
				}
			}
		}

		Ok(())
	}
}

/// Applies one action to one element. Returns whether the host was written.
fn apply<D: Document>(document: &D, element: &D::Element, action: &Action) -> Result<bool> {
	match action {
		Action::Set { attribute, value } => {
			document.set_attribute(element, attribute, value)?;
			Ok(true)
		}
		Action::Add { attribute } => {
			if document.has_attribute(element, attribute) {
				return Ok(false);
			}
			document.set_attribute(element, attribute, ADD_SENTINEL)?;
			Ok(true)
		}
		Action::Remove { attribute } => {
			if !document.has_attribute(element, attribute) {
				return Ok(false);
			}
			document.remove_attribute(element, attribute)?;
			Ok(true)
		}
	}
}
