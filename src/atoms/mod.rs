// ── Warren Atoms Layer ─────────────────────────────────────────────────────
// Pure types, constants, and error definitions — zero side effects, no I/O.
// Dependency rule: atoms may only depend on std and external pure crates.
// Nothing here may import from engine/ or lib.rs.

pub mod config;
pub mod constants;
pub mod error;
pub mod memory_types;
pub mod plan_types;
pub mod traits;
pub mod types;
