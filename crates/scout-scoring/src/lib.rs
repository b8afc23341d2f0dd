//! The decision kernel's pure half: the scoring engine (C5) and the
//! qualification filter (C6). Both are deterministic, I/O-free
//! transformations over an `Issue`/`Repo` pair — no network, no clock
//! beyond the caller-supplied `now` (spec §4.1 contract: "score(...) is
//! pure and deterministic given its inputs and a fixed weights config").

pub mod factors;
pub mod qualify;
pub mod scoring;

pub use qualify::qualify;
pub use scoring::score;
