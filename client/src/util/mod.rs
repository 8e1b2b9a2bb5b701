//! Utility helpers shared across views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Timer and paging math kept free of network and session concerns so views
//! can be tested with plain values.

pub mod debounce;
pub mod pagination;
