//! Core business logic for newsdesk.

pub mod services;

pub use services::*;
