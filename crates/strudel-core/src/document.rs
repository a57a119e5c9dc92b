//! Host document capability.
//!
//! The engine never touches a concrete DOM. Everything it needs from the host
//! (selector resolution, attribute storage, computed style lookup and mutation
//! notification) goes through the [`Document`] trait, so the same rules run
//! against a browser document, an in-memory document, or a test fake.

use std::fmt;

use crate::error::{Result, StrudelError};

/// A single attribute change reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
	/// Name of the attribute that changed.
	pub attribute_name: String,
}

impl MutationRecord {
	/// Creates a record for the named attribute.
	pub fn new(attribute_name: impl Into<String>) -> Self {
		Self {
			attribute_name: attribute_name.into(),
		}
	}
}

/// Callback invoked with one batch of mutation records.
pub type MutationCallback = Box<dyn FnMut(&[MutationRecord]) + 'static>;

/// Capability set the engine requires from a host document.
///
/// Implementations deliver mutation batches asynchronously, after the
/// synchronous work that caused them has returned.
pub trait Document: 'static {
	/// Handle to one element. Equality means "same element".
	type Element: Clone + PartialEq + fmt::Debug + 'static;

	/// Live attribute subscription. Dropping it disconnects the subscription.
	type Observer: 'static;

	/// Resolves `selector` to every matching element in document order.
	fn select_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

	/// Resolves `selector` to its first match.
	///
	/// Fails with [`StrudelError::ElementNotFound`] when nothing matches.
	fn select_first(&self, selector: &str) -> Result<Self::Element> {
		self.select_all(selector)?
			.into_iter()
			.next()
			.ok_or_else(|| StrudelError::not_found(selector))
	}

	/// Returns the attribute value, if present.
	fn get_attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

	/// Returns true if the attribute is present.
	fn has_attribute(&self, element: &Self::Element, name: &str) -> bool {
		self.get_attribute(element, name).is_some()
	}

	/// Sets the attribute, overwriting any previous value.
	fn set_attribute(&self, element: &Self::Element, name: &str, value: &str) -> Result<()>;

	/// Removes the attribute. Removing an absent attribute is a no-op.
	fn remove_attribute(&self, element: &Self::Element, name: &str) -> Result<()>;

	/// Returns true if `class_name` is one of the element's classes.
	fn has_class(&self, element: &Self::Element, class_name: &str) -> bool {
		self.get_attribute(element, "class")
			.is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
	}

	/// Returns the computed value of a style property.
	///
	/// An unknown or unset property yields an empty string.
	fn computed_style(&self, element: &Self::Element, property: &str) -> Result<String>;

	/// Subscribes to changes of `attribute` on `element`.
	fn observe_attribute(
		&self,
		element: &Self::Element,
		attribute: &str,
		callback: MutationCallback,
	) -> Result<Self::Observer>;
}
