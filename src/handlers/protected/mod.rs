// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects the
// caller's `AuthUser`. Ownership scoping happens in the services.
//
// Route Prefix: /api/v1/*

pub mod config;   // Per-user lookup lists
pub mod db_admin; // Read-only table inspection
pub mod entities; // Generic entity CRUD
pub mod reset;    // Chapter and admin data resets
