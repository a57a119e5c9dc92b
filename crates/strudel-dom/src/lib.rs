//! Strudel DOM - browser binding of the host document capability
//!
//! [`WebDocument`] implements [`strudel_core::Document`] on top of `web-sys`:
//!
//! - selector resolution uses `querySelectorAll`
//! - computed style uses `getComputedStyle`
//! - watches use a `MutationObserver` filtered to one attribute
//!
//! The binding only exists on `wasm32`; on other targets the crate is empty.
//!
//! ## Example
//!
//! ```ignore
//! use strudel_core::Strudel;
//! use strudel_dom::WebDocument;
//!
//! let strudel = Strudel::new(WebDocument::from_window()?);
//! let reader = strudel.clone();
//!
//! let query = strudel
//!     .try_query(move || reader.is_attr("#menu-button", "aria-expanded", "true"))
//!     .reaction("#menu")
//!     .remove("hidden")
//!     .otherwise()
//!     .add("hidden")
//!     .watch("#menu-button", "aria-expanded")
//!     .build()?;
//!
//! // Keep the query alive for as long as the rule should apply
//! std::mem::forget(query);
//! ```

#![warn(missing_docs)]

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebDocument, WebObserver};
