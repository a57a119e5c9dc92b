//! The [`Strudel`] service object.

use std::fmt;
use std::rc::Rc;

use crate::document::Document;
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::settings::EngineSettings;

/// Entry point bound to one host document.
///
/// Construct it once and hand clones to the code that declares rules.
/// Clones share the document and settings.
///
/// ## Example
///
/// ```ignore
/// use strudel_core::{MemoryDocument, Strudel};
///
/// let strudel = Strudel::new(MemoryDocument::new());
/// let reader = strudel.clone();
///
/// let query = strudel
///     .try_query(move || reader.has_class("body", "dark"))
///     .reaction("img")
///     .set("data-theme", "dark")
///     .build()?;
/// query.all_react()?;
/// ```
pub struct Strudel<D: Document> {
	document: Rc<D>,
	settings: EngineSettings,
}

impl<D: Document> Clone for Strudel<D> {
	fn clone(&self) -> Self {
		Self {
			document: Rc::clone(&self.document),
			settings: self.settings.clone(),
		}
	}
}

impl<D: Document + fmt::Debug> fmt::Debug for Strudel<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Strudel")
			.field("document", &self.document)
			.field("settings", &self.settings)
			.finish()
	}
}

impl<D: Document> Strudel<D> {
	/// Creates a service with default settings.
	pub fn new(document: D) -> Self {
		Self::with_settings(document, EngineSettings::default())
	}

	/// Creates a service with explicit settings.
	pub fn with_settings(document: D, settings: EngineSettings) -> Self {
		Self::from_shared(Rc::new(document), settings)
	}

	/// Creates a service over a document that is already shared.
	pub fn from_shared(document: Rc<D>, settings: EngineSettings) -> Self {
		Self { document, settings }
	}

	/// The host document.
	pub fn document(&self) -> &Rc<D> {
		&self.document
	}

	/// Settings applied to every query built from this service.
	pub fn settings(&self) -> &EngineSettings {
		&self.settings
	}

	/// Starts a query driven by an infallible condition.
	pub fn query<F>(&self, condition: F) -> QueryBuilder<D>
	where
		F: Fn() -> bool + 'static,
	{
		self.try_query(move || Ok(condition()))
	}

	/// Starts a query driven by a fallible condition.
	///
	/// An `Err` from the condition aborts that evaluation and is returned by
	/// [`Query::all_react`](crate::Query::all_react).
	pub fn try_query<F>(&self, condition: F) -> QueryBuilder<D>
	where
		F: Fn() -> Result<bool> + 'static,
	{
		QueryBuilder::new(
			Rc::clone(&self.document),
			self.settings.clone(),
			Box::new(condition),
		)
	}

	/// True if the first match of `selector` has `attribute` equal to `value`.
	pub fn is_attr(&self, selector: &str, attribute: &str, value: &str) -> Result<bool> {
		let element = self.document.select_first(selector)?;
		Ok(self.document.get_attribute(&element, attribute).as_deref() == Some(value))
	}

	/// True if the first match of `selector` has `attribute`.
	pub fn has_attr(&self, selector: &str, attribute: &str) -> Result<bool> {
		let element = self.document.select_first(selector)?;
		Ok(self.document.has_attribute(&element, attribute))
	}

	/// True if the first match of `selector` has class `class_name`.
	pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
		let element = self.document.select_first(selector)?;
		Ok(self.document.has_class(&element, class_name))
	}

	/// True if the computed `property` of the first match of `selector` equals `value`.
	///
	/// `property` may be a CSS name (`background-color`) or its camelCase form
	/// (`backgroundColor`) when the host supports both, as `WebDocument` does.
	pub fn is_style(&self, selector: &str, property: &str, value: &str) -> Result<bool> {
		let element = self.document.select_first(selector)?;
		Ok(self.document.computed_style(&element, property)? == value)
	}
}
