//! # Strudel
//!
//! Reactive attribute rules for documents: "when this condition holds, apply
//! these attribute changes to these elements; otherwise apply those", with
//! re-evaluation whenever a watched attribute changes.
//!
//! ## Feature Flags
//!
//! - `web` - browser binding ([`dom::WebDocument`]) over `web-sys`, `wasm32` only
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use strudel::prelude::*;
//!
//! let strudel = Strudel::new(MemoryDocument::new());
//! strudel.document().append_element_with("button", &[("id", "toggle")]);
//! strudel.document().append_element_with("div", &[("class", "panel"), ("hidden", "true")]);
//!
//! let reader = strudel.clone();
//! let query = strudel
//!     .try_query(move || reader.is_attr("#toggle", "aria-expanded", "true"))
//!     .reaction(".panel")
//!     .remove("hidden")
//!     .otherwise()
//!     .add("hidden")
//!     .watch("#toggle", "aria-expanded")
//!     .build()?;
//! query.all_react()?;
//! ```

pub use strudel_core::*;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use strudel_dom as dom;

/// Commonly used types.
pub mod prelude {
	pub use strudel_core::{
		Action, Document, EngineSettings, MemoryDocument, Query, QueryBuilder, Strudel,
		StrudelError, WatchHandle,
	};

	#[cfg(all(feature = "web", target_arch = "wasm32"))]
	pub use strudel_dom::WebDocument;
}
