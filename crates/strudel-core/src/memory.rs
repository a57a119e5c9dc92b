//! In-memory document
//!
//! [`MemoryDocument`] implements [`Document`] without a browser. It keeps a
//! flat list of elements in document order, a computed-style table per
//! element, and a queue of mutation records that is delivered only when
//! [`MemoryDocument::deliver_pending`] runs. That mirrors the batching of a
//! browser's `MutationObserver`: records pile up while synchronous code runs
//! and every observer receives them as one batch afterwards.
//!
//! ## Example
//!
//! ```ignore
//! use strudel_core::{Document, MemoryDocument};
//!
//! let document = MemoryDocument::new();
//! let button = document.append_element("button");
//! document.set_attribute(&button, "aria-expanded", "false")?;
//!
//! assert_eq!(document.select_all("button[aria-expanded=false]")?, vec![button]);
//! ```

mod selector;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::document::{Document, MutationCallback, MutationRecord};
use crate::error::{Result, StrudelError};

use self::selector::SelectorList;

/// Handle to an element of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "element#{}", self.0)
	}
}

#[derive(Debug)]
struct Node {
	tag: String,
	attributes: Vec<(String, String)>,
	styles: HashMap<String, String>,
	attached: bool,
}

impl Node {
	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.as_str())
	}
}

struct ObserverEntry {
	id: u64,
	element: ElementId,
	attribute: String,
	callback: Rc<RefCell<MutationCallback>>,
	pending: Vec<MutationRecord>,
}

#[derive(Default)]
struct Registry {
	next_id: u64,
	observers: Vec<ObserverEntry>,
}

impl Registry {
	fn is_live(&self, id: u64) -> bool {
		self.observers.iter().any(|o| o.id == id)
	}
}

/// Subscription handle returned by [`MemoryDocument::observe_attribute`].
///
/// Dropping it disconnects the observer and discards its undelivered records.
pub struct MemoryObserver {
	id: u64,
	registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for MemoryObserver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryObserver")
			.field("id", &self.id)
			.finish()
	}
}

impl Drop for MemoryObserver {
	fn drop(&mut self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.borrow_mut().observers.retain(|o| o.id != self.id);
		}
	}
}

/// Headless [`Document`] implementation.
#[derive(Default)]
pub struct MemoryDocument {
	nodes: RefCell<Vec<Node>>,
	registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for MemoryDocument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryDocument")
			.field("elements", &self.nodes.borrow().len())
			.field("observers", &self.observer_count())
			.finish()
	}
}

impl MemoryDocument {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a new element at the end of the document.
	pub fn append_element(&self, tag: impl Into<String>) -> ElementId {
		let mut nodes = self.nodes.borrow_mut();
		nodes.push(Node {
			tag: tag.into(),
			attributes: Vec::new(),
			styles: HashMap::new(),
			attached: true,
		});
		ElementId(nodes.len() - 1)
	}

	/// Appends a new element with initial attributes. No records are queued.
	pub fn append_element_with(&self, tag: impl Into<String>, attributes: &[(&str, &str)]) -> ElementId {
		let id = self.append_element(tag);
		let mut nodes = self.nodes.borrow_mut();
		let node = &mut nodes[id.0];
		for (name, value) in attributes {
			upsert(&mut node.attributes, name, value);
		}
		id
	}

	/// Removes an element from the document. Selectors no longer match it.
	pub fn detach(&self, element: ElementId) {
		if let Some(node) = self.nodes.borrow_mut().get_mut(element.0) {
			node.attached = false;
		}
	}

	/// Returns an attribute value.
	pub fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
		self.nodes
			.borrow()
			.get(element.0)
			.and_then(|node| node.attribute(name).map(str::to_string))
	}

	/// Sets the computed value of a style property.
	pub fn set_style(&self, element: ElementId, property: impl Into<String>, value: impl Into<String>) {
		if let Some(node) = self.nodes.borrow_mut().get_mut(element.0) {
			node.styles.insert(property.into(), value.into());
		}
	}

	/// Number of connected observers.
	pub fn observer_count(&self) -> usize {
		self.registry.borrow().observers.len()
	}

	/// Number of records queued but not yet delivered.
	pub fn pending_records(&self) -> usize {
		self.registry
			.borrow()
			.observers
			.iter()
			.map(|o| o.pending.len())
			.sum()
	}

	/// Delivers every queued batch once. Returns the number of batches delivered.
	///
	/// Records queued by the callbacks themselves wait for the next call.
	pub fn deliver_pending(&self) -> usize {
		let batches: Vec<_> = {
			let mut registry = self.registry.borrow_mut();
			registry
				.observers
				.iter_mut()
				.filter(|o| !o.pending.is_empty())
				.map(|o| (o.id, o.callback.clone(), std::mem::take(&mut o.pending)))
				.collect()
		};

		let mut delivered = 0;
		for (id, callback, records) in batches {
			// An earlier callback in this round may have disconnected this observer
			if !self.registry.borrow().is_live(id) {
				continue;
			}
			match callback.try_borrow_mut() {
				Ok(mut callback) => {
					(&mut *callback)(&records);
					delivered += 1;
				}
				Err(_) => {
					// Delivery from inside the same callback; keep the records for later
					if let Some(entry) = self
						.registry
						.borrow_mut()
						.observers
						.iter_mut()
						.find(|o| o.id == id)
					{
						let later = std::mem::replace(&mut entry.pending, records);
						entry.pending.extend(later);
					}
				}
			}
		}
		delivered
	}

	/// Delivers batches until the queue is empty or `max_rounds` is reached.
	///
	/// Returns the number of rounds that delivered at least one batch.
	pub fn settle(&self, max_rounds: usize) -> usize {
		let mut rounds = 0;
		while rounds < max_rounds && self.deliver_pending() > 0 {
			rounds += 1;
		}
		rounds
	}

	fn queue_record(&self, element: ElementId, attribute: &str) {
		let mut registry = self.registry.borrow_mut();
		for observer in registry
			.observers
			.iter_mut()
			.filter(|o| o.element == element && o.attribute == attribute)
		{
			observer.pending.push(MutationRecord::new(attribute));
		}
	}

	fn with_node_mut<T>(&self, element: ElementId, f: impl FnOnce(&mut Node) -> T) -> Result<T> {
		let mut nodes = self.nodes.borrow_mut();
		let node = nodes
			.get_mut(element.0)
			.ok_or_else(|| StrudelError::Host(format!("unknown {element}")))?;
		Ok(f(node))
	}
}

fn upsert(attributes: &mut Vec<(String, String)>, name: &str, value: &str) {
	match attributes.iter_mut().find(|(n, _)| n == name) {
		Some((_, existing)) => *existing = value.to_string(),
		None => attributes.push((name.to_string(), value.to_string())),
	}
}

impl Document for MemoryDocument {
	type Element = ElementId;
	type Observer = MemoryObserver;

	fn select_all(&self, selector: &str) -> Result<Vec<ElementId>> {
		let list = SelectorList::parse(selector)?;
		let nodes = self.nodes.borrow();
		Ok(nodes
			.iter()
			.enumerate()
			.filter(|(_, node)| node.attached && list.matches(&node.tag, |name| node.attribute(name)))
			.map(|(index, _)| ElementId(index))
			.collect())
	}

	fn get_attribute(&self, element: &ElementId, name: &str) -> Option<String> {
		self.attribute(*element, name)
	}

	fn set_attribute(&self, element: &ElementId, name: &str, value: &str) -> Result<()> {
		self.with_node_mut(*element, |node| upsert(&mut node.attributes, name, value))?;
		self.queue_record(*element, name);
		Ok(())
	}

	fn remove_attribute(&self, element: &ElementId, name: &str) -> Result<()> {
		let removed = self.with_node_mut(*element, |node| {
			let before = node.attributes.len();
			node.attributes.retain(|(n, _)| n != name);
			node.attributes.len() != before
		})?;
		if removed {
			self.queue_record(*element, name);
		}
		Ok(())
	}

	fn computed_style(&self, element: &ElementId, property: &str) -> Result<String> {
		let nodes = self.nodes.borrow();
		let node = nodes
			.get(element.0)
			.ok_or_else(|| StrudelError::Host(format!("unknown {element}")))?;
		Ok(node.styles.get(property).cloned().unwrap_or_default())
	}

	fn observe_attribute(
		&self,
		element: &ElementId,
		attribute: &str,
		callback: MutationCallback,
	) -> Result<MemoryObserver> {
		if self.nodes.borrow().get(element.0).is_none() {
			return Err(StrudelError::Host(format!("unknown {element}")));
		}

		let mut registry = self.registry.borrow_mut();
		registry.next_id += 1;
		let id = registry.next_id;
		registry.observers.push(ObserverEntry {
			id,
			element: *element,
			attribute: attribute.to_string(),
			callback: Rc::new(RefCell::new(callback)),
			pending: Vec::new(),
		});

		Ok(MemoryObserver {
			id,
			registry: Rc::downgrade(&self.registry),
		})
	}
}
