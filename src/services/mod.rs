//! Asset lifecycle services: key naming, the admin gate, the object store
//! seam, and the service that composes them.

pub mod admin_gate;
pub mod asset_service;
pub mod object_keys;
pub mod object_store;
