//! Web Highlighter
//!
//! Persistent text highlights for web pages. A selection is turned into a
//! durable anchor (structural path plus quoted text), stored, and relocated
//! in a freshly parsed page on the next visit.
//!
//! # Modules
//!
//! - `dom`: arena document, ranges, text walker, sanitizer
//! - `anchor`: highlight records, structural paths, builder and resolver
//! - `render`: highlight containers and their removal or edit
//! - `normalize`: URL canonicalization for lookup keys
//! - `store`: persistence gateway and its backends
//! - `page`: per-page session driving restore, selection and commands
//! - `catalog`: management queries over stored highlights
//!
//! The HTTP server binary is in main.rs.

pub mod anchor;
pub mod catalog;
pub mod config;
pub mod dom;
pub mod error;
pub mod normalize;
pub mod page;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
