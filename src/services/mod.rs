//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own auth reconciliation and the page state machines so
//! route handlers can stay focused on protocol translation and cookie
//! plumbing.

pub mod auth_state;
pub mod catalog;
pub mod chat;
pub mod employer;
pub mod fallback;
pub mod jobs;
pub mod profile;
pub mod session;
