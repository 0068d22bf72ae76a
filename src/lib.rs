//! Upload-asset lifecycle for the site's content areas: presigned uploads,
//! deletes, inline uploads and the per-area admin password gate, in front of
//! an S3-compatible object store.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
