//! Catalog domain
//!
//! `ordering` holds the pure reconciliation logic for client-submitted
//! orderings; `service` orchestrates repositories, ordering, and the
//! best-effort peer propagation.

pub mod ordering;
pub mod service;

pub use service::CatalogService;
