//! HTTP middleware.

pub mod hardening;

pub use hardening::{harden_response, ResponseHardening};
