//! Forge Gateway (C3): the only crate that talks to GitHub. Every other
//! component works with `scout_core::types` values; this crate is the
//! boundary that converts octocrab's models into them and classifies
//! every failure as transient-or-permanent for the dispatcher (spec §4
//! C3, §7).

pub mod client;
pub mod comments;
pub mod errors;
pub mod issues;
pub mod pulls;
pub mod repo;
pub mod retry;

pub use client::ForgeClient;
pub use errors::{ForgeError, Result};
