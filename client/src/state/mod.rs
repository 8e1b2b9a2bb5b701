//! Client-side state containers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` holds the one session cell every guard, service and view shares.

pub mod auth;
