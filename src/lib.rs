//! Stampa turns published content items into print-ready PDF documents.
//!
//! The crate is split the same way the service is deployed: `domain` holds
//! the pure records and invariants, `application` the export flows and the
//! content-to-document pipeline, `infra` the adapters (HTTP surface, file
//! stores, the render engine CLI, zip archives, token issuing) and `config`
//! the layered deployment settings.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
