// Warren Mind Engine — per-agent cognitive runtime
// Weighted memory retrieval, threshold-triggered reflection, and a
// three-level time-indexed planner, driven by the external simulation tick.

pub mod mind;
pub mod providers;
