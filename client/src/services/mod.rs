//! Client services.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` is the only writer of the session store.

pub mod auth;
