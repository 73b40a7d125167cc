#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Moodtune page interactions.
//! This crate holds the page controller that drives the server-rendered pages
//! (fade-in, flash dismissal, mood selection, playlist loader, theme toggle)
//! plus the wasm entrypoint that wires it to the browser.

pub mod config;
pub mod core;
pub mod error;
pub mod scenario;

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::run_page;

pub use crate::config::PageConfig;
pub use crate::core::controller::PageInteractionController;
pub use crate::core::theme::ThemeMode;
