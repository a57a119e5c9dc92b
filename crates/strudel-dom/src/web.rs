use std::fmt;

use js_sys::Array;
use strudel_core::{Document, MutationCallback, MutationRecord, Result, StrudelError};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn host_error(value: JsValue) -> StrudelError {
	StrudelError::Host(describe(&value))
}

fn is_camel_case(property: &str) -> bool {
	!property.starts_with("--") && property.chars().any(|c| c.is_ascii_uppercase())
}

/// [`Document`] backed by the browser DOM.
#[derive(Clone)]
pub struct WebDocument {
	window: web_sys::Window,
	document: web_sys::Document,
}

impl fmt::Debug for WebDocument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebDocument").finish_non_exhaustive()
	}
}

impl WebDocument {
	/// Binds to the global `window` and its document.
	pub fn from_window() -> Result<Self> {
		let window =
			web_sys::window().ok_or_else(|| StrudelError::Host("window is not available".to_string()))?;
		let document = window
			.document()
			.ok_or_else(|| StrudelError::Host("document is not available".to_string()))?;
		Ok(Self::new(window, document))
	}

	/// Binds to an explicit window and document.
	pub fn new(window: web_sys::Window, document: web_sys::Document) -> Self {
		Self { window, document }
	}

	/// The underlying document.
	pub fn inner(&self) -> &web_sys::Document {
		&self.document
	}
}

/// A connected `MutationObserver`. Dropping it disconnects the observer.
pub struct WebObserver {
	observer: web_sys::MutationObserver,
	// Must outlive the observer's JS reference to it
	_closure: Closure<dyn FnMut(Array, web_sys::MutationObserver)>,
}

impl fmt::Debug for WebObserver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebObserver").finish_non_exhaustive()
	}
}

impl Drop for WebObserver {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

impl Document for WebDocument {
	type Element = web_sys::Element;
	type Observer = WebObserver;

	fn select_all(&self, selector: &str) -> Result<Vec<web_sys::Element>> {
		let nodes = self
			.document
			.query_selector_all(selector)
			.map_err(|e| StrudelError::InvalidSelector {
				selector: selector.to_string(),
				reason: describe(&e),
			})?;

		Ok((0..nodes.length())
			.filter_map(|index| nodes.get(index))
			.filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
			.collect())
	}

	fn get_attribute(&self, element: &web_sys::Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn has_attribute(&self, element: &web_sys::Element, name: &str) -> bool {
		element.has_attribute(name)
	}

	fn set_attribute(&self, element: &web_sys::Element, name: &str, value: &str) -> Result<()> {
		element.set_attribute(name, value).map_err(host_error)
	}

	fn remove_attribute(&self, element: &web_sys::Element, name: &str) -> Result<()> {
		element.remove_attribute(name).map_err(host_error)
	}

	fn has_class(&self, element: &web_sys::Element, class_name: &str) -> bool {
		element.class_list().contains(class_name)
	}

	fn computed_style(&self, element: &web_sys::Element, property: &str) -> Result<String> {
		let style = self
			.window
			.get_computed_style(element)
			.map_err(host_error)?
			.ok_or_else(|| StrudelError::Host("no computed style for element".to_string()))?;

		// `getPropertyValue` only understands CSS names; camelCase names are
		// read as properties of the declaration object. Custom properties keep
		// their case and always go through `getPropertyValue`.
		if is_camel_case(property) {
			let value = js_sys::Reflect::get(&style, &JsValue::from_str(property)).map_err(host_error)?;
			return Ok(value.as_string().unwrap_or_default());
		}
		style.get_property_value(property).map_err(host_error)
	}

	fn observe_attribute(
		&self,
		element: &web_sys::Element,
		attribute: &str,
		mut callback: MutationCallback,
	) -> Result<WebObserver> {
		let closure = Closure::wrap(Box::new(move |records: Array, _observer: web_sys::MutationObserver| {
			let batch: Vec<MutationRecord> = records
				.iter()
				.filter_map(|record| record.dyn_into::<web_sys::MutationRecord>().ok())
				.filter(|record| record.type_() == "attributes")
				.filter_map(|record| record.attribute_name())
				.map(MutationRecord::new)
				.collect();
			if !batch.is_empty() {
				callback(&batch);
			}
		}) as Box<dyn FnMut(Array, web_sys::MutationObserver)>);

		let observer =
			web_sys::MutationObserver::new(closure.as_ref().unchecked_ref()).map_err(host_error)?;

		let options = web_sys::MutationObserverInit::new();
		options.set_attributes(true);
		options.set_attribute_filter(&Array::of1(&JsValue::from_str(attribute)));
		observer
			.observe_with_options(element, &options)
			.map_err(host_error)?;

		tracing::trace!(target: "strudel", attribute, "mutation observer connected");

		Ok(WebObserver {
			observer,
			_closure: closure,
		})
	}
}
