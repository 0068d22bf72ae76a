//! Data models for the asset lifecycle.
//!
//! Nothing here is persisted: tickets are handed to the browser and forgotten,
//! and stored objects are referenced by URL from documents owned elsewhere.

pub mod policy;
pub mod ticket;
pub mod upload;
