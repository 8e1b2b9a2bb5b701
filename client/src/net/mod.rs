//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the HTTP seam, `api` layers typed endpoints and the
//! 401/403 policy on top of it, `error` classifies failures, and `types`
//! defines the shared wire schema.

pub mod api;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod transport;
pub mod types;
