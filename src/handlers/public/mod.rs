// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service index and liveness probe.

pub mod root;
