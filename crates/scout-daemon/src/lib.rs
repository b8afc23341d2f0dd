//! Wires the pure decision kernel (scout-scoring, scout-comment,
//! scout-antispam, scout-trust, scout-workflow) to its I/O collaborators
//! (scout-forge, scout-notify) into one runnable scheduler. This crate has
//! no binary of its own — `scout-cli`'s `start`/`find`/one-shot
//! subcommands own `main()` and drive `Scheduler` directly, the way
//! `at-cli` drives `at-daemon`'s `Daemon` rather than `at-daemon` shipping
//! its own entry point.

pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod pipeline;
pub mod scheduler;
pub mod shutdown;

pub use context::RuntimeContext;
pub use dispatcher::Dispatcher;
pub use errors::{DaemonError, Result};
pub use scheduler::{CycleReport, Scheduler};
pub use shutdown::ShutdownSignal;
