//! Strudel Core - reactive attribute rules
//!
//! Declare "when a condition holds, apply these attribute changes to these
//! elements; otherwise apply those", and have the rule re-evaluated whenever a
//! watched attribute changes.
//!
//! ## Architecture
//!
//! - [`action`]: attribute mutation instructions (`set`, `add`, `remove`)
//! - [`reaction`]: a selector bound to positive and negative action lists
//! - [`query`]: condition, reactions and watches; [`QueryBuilder`] to configure
//! - [`facade`]: the [`Strudel`] service object and its predicates
//! - [`document`]: the host capability trait the engine reads and writes
//! - [`memory`]: a headless [`Document`] implementation
//! - [`settings`]: engine tunables
//!
//! ## Example
//!
//! ```ignore
//! use strudel_core::{Document, MemoryDocument, Strudel};
//!
//! let strudel = Strudel::new(MemoryDocument::new());
//! let toggle = strudel.document().append_element_with("button", &[("id", "toggle")]);
//! let panel = strudel.document().append_element_with("div", &[("id", "panel"), ("hidden", "true")]);
//!
//! let reader = strudel.clone();
//! let _query = strudel
//!     .try_query(move || reader.is_attr("#toggle", "aria-expanded", "true"))
//!     .reaction("#panel")
//!     .remove("hidden")
//!     .otherwise()
//!     .add("hidden")
//!     .watch("#toggle", "aria-expanded")
//!     .build()?;
//!
//! strudel.document().set_attribute(&toggle, "aria-expanded", "true")?;
//! strudel.document().deliver_pending();
//! assert_eq!(strudel.document().attribute(panel, "hidden"), None);
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod document;
pub mod error;
pub mod facade;
pub mod memory;
pub mod query;
pub mod reaction;
pub mod settings;

pub use action::{Action, ActionKind};
pub use document::{Document, MutationCallback, MutationRecord};
pub use error::{Result, StrudelError};
pub use facade::Strudel;
pub use memory::{ElementId, MemoryDocument, MemoryObserver};
pub use query::{Query, QueryBuilder, WatchHandle};
pub use reaction::{AppliedWrite, Reaction, WriteLog};
pub use settings::EngineSettings;
