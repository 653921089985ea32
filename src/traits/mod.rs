//! Trait definitions for Evergreen operations.
//!
//! Listing is handled by the pagination stream plus per-model endpoint
//! functions; fetching a single entity goes through [`Get`].

mod get;

pub use get::Get;
