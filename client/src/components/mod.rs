//! Dialog controllers shared by pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each dialog owns its own transient state and talks to the backend through
//! the handles its page passes in.

pub mod add_item_modal;
pub mod delete_account_modal;
pub mod recommendation_modal;
