//! Client core for the movie and book companion app.
//!
//! This crate owns the session store, the authenticated REST transport, the
//! route guards and the view controllers a UI shell binds to. It carries no
//! rendering: the `cli` crate and any future shell drive it through [`app::App`].

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod router;
pub mod services;
pub mod state;
pub mod util;
