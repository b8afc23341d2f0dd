//! Observability primitives shared by the CLI and the daemon: structured
//! logging setup (`RUST_LOG`/`LOG_LEVEL`-aware) and a small set of
//! thread-safe counters for the per-cycle KPI snapshot (spec §11.2).
//!
//! Every component logs through `tracing`, never `println!` — see
//! `logging::init_logging`/`init_logging_json`.

pub mod counters;
pub mod logging;
