//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped state and orchestration. Rendering is left to
//! whatever shell binds to these controllers.

pub mod admin;
pub mod home;
pub mod welcome;
