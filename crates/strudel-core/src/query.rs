//! Queries: a condition, the reactions it drives, and the attribute watches
//! that trigger re-evaluation.
//!
//! A query is configured through a [`QueryBuilder`] and finalised into an
//! immutable [`Query`]. Each call to [`Query::all_react`] evaluates the
//! condition exactly once and runs, for every reaction in declaration order,
//! either its positive actions (condition true) or its negative actions
//! (condition false and negation enabled).
//!
//! ## Example
//!
//! ```ignore
//! let strudel = Strudel::new(MemoryDocument::new());
//! let reader = strudel.clone();
//!
//! let query = strudel
//!     .try_query(move || reader.is_attr("#toggle", "aria-expanded", "true"))
//!     .reaction("#panel")
//!     .remove("hidden")
//!     .otherwise()
//!     .add("hidden")
//!     .watch("#toggle", "aria-expanded")
//!     .build()?;
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::action::Action;
use crate::document::{Document, MutationCallback, MutationRecord};
use crate::error::{Result, StrudelError};
use crate::reaction::{Reaction, WriteLog};
use crate::settings::EngineSettings;

/// Boxed condition function.
pub(crate) type ConditionFn = Box<dyn Fn() -> Result<bool> + 'static>;

struct Subscription<D: Document> {
	id: u64,
	element: D::Element,
	attribute: String,
	// Held for its Drop: disconnects the host observer
	_observer: D::Observer,
}

/// Outstanding self-caused records for one subscription.
///
/// Positive: writes made by an evaluation whose records have not arrived yet.
/// Negative: records that arrived while the evaluation was still running.
struct Echo {
	subscription: u64,
	count: i64,
}

struct QueryInner<D: Document> {
	document: Rc<D>,
	settings: EngineSettings,
	condition: ConditionFn,
	reactions: Vec<Reaction>,
	subscriptions: RefCell<Vec<Subscription<D>>>,
	echoes: RefCell<Vec<Echo>>,
	next_subscription: Cell<u64>,
	in_flight: Cell<bool>,
	evaluations: Cell<u64>,
}

/// Marks an evaluation as in flight until dropped, including on unwind.
struct InFlight<'a> {
	flag: &'a Cell<bool>,
	previous: bool,
}

impl<'a> InFlight<'a> {
	fn enter(flag: &'a Cell<bool>) -> Self {
		let previous = flag.replace(true);
		Self { flag, previous }
	}
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.flag.set(self.previous);
	}
}

impl<D: Document> QueryInner<D> {
	fn all_react(&self) -> Result<()> {
		if self.settings.reentrancy_guard && self.in_flight.get() {
			tracing::debug!(target: "strudel", "skipping nested evaluation");
			return Ok(());
		}
		let _in_flight = InFlight::enter(&self.in_flight);

		let condition = (self.condition)()?;
		self.evaluations.set(self.evaluations.get() + 1);
		tracing::debug!(
			target: "strudel",
			condition,
			reactions = self.reactions.len(),
			"evaluating query"
		);

		let mut writes = WriteLog::new(self.settings.trace_writes);
		let result = self.run_reactions(condition, &mut writes);

		// Writes made before a failure still produce records
		if self.settings.reentrancy_guard {
			self.expect_echoes(&writes);
		}

		result
	}

	fn run_reactions(&self, condition: bool, writes: &mut WriteLog<D::Element>) -> Result<()> {
		let document = &*self.document;
		for reaction in &self.reactions {
			if condition {
				reaction.execute_positive(document, writes)?;
			} else if reaction.negation_enabled() {
				reaction.execute_negative(document, writes)?;
			}
		}
		Ok(())
	}

	fn expect_echoes(&self, writes: &WriteLog<D::Element>) {
		let subscriptions = self.subscriptions.borrow();
		for write in writes.iter() {
			for subscription in subscriptions
				.iter()
				.filter(|s| s.attribute == write.attribute && s.element == write.element)
			{
				self.adjust_echo(subscription.id, 1);
			}
		}
	}

	fn adjust_echo(&self, subscription: u64, delta: i64) {
		let mut echoes = self.echoes.borrow_mut();
		match echoes.iter_mut().find(|e| e.subscription == subscription) {
			Some(echo) => echo.count += delta,
			None => echoes.push(Echo {
				subscription,
				count: delta,
			}),
		}
		echoes.retain(|e| e.count != 0);
	}

	/// Consumes up to `records` expected echoes. Returns how many records remain.
	fn consume_echoes(&self, subscription: u64, records: usize) -> usize {
		let mut echoes = self.echoes.borrow_mut();
		let Some(echo) = echoes
			.iter_mut()
			.find(|e| e.subscription == subscription && e.count > 0)
		else {
			return records;
		};

		let consumed = records.min(echo.count as usize);
		echo.count -= consumed as i64;
		echoes.retain(|e| e.count != 0);
		records - consumed
	}

	fn on_mutations(&self, subscription: u64, attribute: &str, records: &[MutationRecord]) {
		let relevant = records
			.iter()
			.filter(|r| r.attribute_name == attribute)
			.count();
		if relevant == 0 {
			return;
		}

		if self.settings.reentrancy_guard {
			if self.in_flight.get() {
				// Delivered synchronously by our own write
				self.adjust_echo(subscription, -(relevant as i64));
				return;
			}
			if self.consume_echoes(subscription, relevant) == 0 {
				tracing::debug!(
					target: "strudel",
					attribute,
					"ignoring self-triggered mutation"
				);
				return;
			}
		}

		if let Err(error) = self.all_react() {
			tracing::error!(
				target: "strudel",
				attribute,
				%error,
				"query evaluation failed"
			);
		}
	}

	fn remove_subscription(&self, id: u64) -> bool {
		let removed = {
			let mut subscriptions = self.subscriptions.borrow_mut();
			subscriptions
				.iter()
				.position(|s| s.id == id)
				.map(|index| subscriptions.remove(index))
		};
		self.echoes.borrow_mut().retain(|e| e.subscription != id);
		// Dropped outside the borrow: the host may run code on disconnect
		removed.is_some()
	}
}

fn mutation_callback<D: Document>(
	inner: &Rc<QueryInner<D>>,
	subscription: u64,
	attribute: &str,
) -> MutationCallback {
	let weak = Rc::downgrade(inner);
	let attribute = attribute.to_string();
	Box::new(move |records: &[MutationRecord]| {
		if let Some(inner) = weak.upgrade() {
			inner.on_mutations(subscription, &attribute, records);
		}
	})
}

/// A finalised rule: condition, reactions and active watches.
///
/// Dropping the query disconnects every watch it owns.
pub struct Query<D: Document> {
	inner: Rc<QueryInner<D>>,
}

impl<D: Document> fmt::Debug for Query<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Query")
			.field("reactions", &self.inner.reactions)
			.field("subscriptions", &self.subscription_count())
			.field("evaluations", &self.inner.evaluations.get())
			.finish()
	}
}

impl<D: Document> Query<D> {
	/// Evaluates the condition once and runs every reaction accordingly.
	///
	/// Not transactional: if a host write fails, earlier writes stay applied.
	pub fn all_react(&self) -> Result<()> {
		self.inner.all_react()
	}

	/// Re-evaluates this query whenever `attribute` changes on the first
	/// element matching `selector`.
	///
	/// The selector is resolved now and never again. The subscription lives
	/// until the query is dropped or the returned handle is cancelled.
	pub fn watch(&self, selector: &str, attribute: &str) -> Result<WatchHandle<D>> {
		let inner = &self.inner;
		let element = inner.document.select_first(selector)?;

		let id = inner.next_subscription.get() + 1;
		inner.next_subscription.set(id);

		let callback = mutation_callback(inner, id, attribute);
		let observer = inner
			.document
			.observe_attribute(&element, attribute, callback)?;

		inner.subscriptions.borrow_mut().push(Subscription {
			id,
			element,
			attribute: attribute.to_string(),
			_observer: observer,
		});
		tracing::debug!(target: "strudel", selector, attribute, "watching attribute");

		Ok(WatchHandle {
			id,
			query: Rc::downgrade(inner),
		})
	}

	/// Disconnects every watch.
	pub fn unwatch_all(&self) {
		let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
		self.inner.echoes.borrow_mut().clear();
		drop(subscriptions);
	}

	/// Reactions in declaration order.
	pub fn reactions(&self) -> &[Reaction] {
		&self.inner.reactions
	}

	/// Number of active watches.
	pub fn subscription_count(&self) -> usize {
		self.inner.subscriptions.borrow().len()
	}

	/// Number of times the condition has been evaluated.
	pub fn evaluations(&self) -> u64 {
		self.inner.evaluations.get()
	}
}

/// Handle to one watch created by [`Query::watch`].
///
/// Dropping the handle keeps the watch alive; call [`WatchHandle::cancel`]
/// to stop it.
pub struct WatchHandle<D: Document> {
	id: u64,
	query: Weak<QueryInner<D>>,
}

impl<D: Document> fmt::Debug for WatchHandle<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WatchHandle")
			.field("id", &self.id)
			.field("active", &self.is_active())
			.finish()
	}
}

impl<D: Document> WatchHandle<D> {
	/// Returns true while the watch is connected.
	pub fn is_active(&self) -> bool {
		self.query.upgrade().is_some_and(|inner| {
			inner
				.subscriptions
				.borrow()
				.iter()
				.any(|s| s.id == self.id)
		})
	}

	/// Disconnects the watch. Returns false if it was already gone.
	pub fn cancel(self) -> bool {
		match self.query.upgrade() {
			Some(inner) => inner.remove_subscription(self.id),
			None => false,
		}
	}
}

/// Fluent configuration for a [`Query`].
///
/// `set`, `add`, `remove` and `otherwise` act on the most recently declared
/// reaction. Using them before any [`reaction`](Self::reaction) logs a
/// warning at the offending call and is reported as an error by
/// [`build`](Self::build); later calls are ignored once an error is recorded.
pub struct QueryBuilder<D: Document> {
	document: Rc<D>,
	settings: EngineSettings,
	condition: ConditionFn,
	reactions: Vec<Reaction>,
	watches: Vec<(String, String)>,
	error: Option<StrudelError>,
}

impl<D: Document> fmt::Debug for QueryBuilder<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueryBuilder")
			.field("reactions", &self.reactions)
			.field("watches", &self.watches)
			.field("error", &self.error)
			.finish()
	}
}

impl<D: Document> QueryBuilder<D> {
	pub(crate) fn new(document: Rc<D>, settings: EngineSettings, condition: ConditionFn) -> Self {
		Self {
			document,
			settings,
			condition,
			reactions: Vec::new(),
			watches: Vec::new(),
			error: None,
		}
	}

	/// Starts a new reaction targeting `selector`.
	pub fn reaction(mut self, selector: impl Into<String>) -> Self {
		if self.error.is_none() {
			self.reactions.push(Reaction::new(selector));
		}
		self
	}

	/// Sets `attribute` to `value` on the current branch of the last reaction.
	pub fn set(self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
		self.push("set", Action::set(attribute, value))
	}

	/// Ensures `attribute` exists on the current branch of the last reaction.
	pub fn add(self, attribute: impl Into<String>) -> Self {
		self.push("add", Action::add(attribute))
	}

	/// Removes `attribute` on the current branch of the last reaction.
	pub fn remove(self, attribute: impl Into<String>) -> Self {
		self.push("remove", Action::remove(attribute))
	}

	/// Enables the negative branch of the last reaction. Subsequent actions
	/// go to that branch until the next [`reaction`](Self::reaction).
	pub fn otherwise(mut self) -> Self {
		if let Some(reaction) = self.last_reaction("else") {
			reaction.enable_negation();
		}
		self
	}

	/// Watches `attribute` on the first element matching `selector`.
	///
	/// The selector is resolved when [`build`](Self::build) runs.
	pub fn watch(mut self, selector: impl Into<String>, attribute: impl Into<String>) -> Self {
		if self.error.is_none() {
			self.watches.push((selector.into(), attribute.into()));
		}
		self
	}

	/// Finalises the query and connects its watches in declaration order.
	pub fn build(self) -> Result<Query<D>> {
		if let Some(error) = self.error {
			return Err(error);
		}

		let query = Query {
			inner: Rc::new(QueryInner {
				document: self.document,
				settings: self.settings,
				condition: self.condition,
				reactions: self.reactions,
				subscriptions: RefCell::new(Vec::new()),
				echoes: RefCell::new(Vec::new()),
				next_subscription: Cell::new(0),
				in_flight: Cell::new(false),
				evaluations: Cell::new(0),
			}),
		};

		for (selector, attribute) in &self.watches {
			query.watch(selector, attribute)?;
		}

		Ok(query)
	}

	fn push(mut self, operation: &'static str, action: Action) -> Self {
		if let Some(reaction) = self.last_reaction(operation) {
			reaction.push(action);
		}
		self
	}

	fn last_reaction(&mut self, operation: &'static str) -> Option<&mut Reaction> {
		if self.error.is_some() {
			return None;
		}
		if self.reactions.is_empty() {
			tracing::warn!(
				target: "strudel",
				operation,
				"builder operation used before any reaction; the query will fail to build"
			);
			self.error = Some(StrudelError::NoReaction { operation });
			return None;
		}
		self.reactions.last_mut()
	}
}
