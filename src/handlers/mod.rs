// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (token required) → Admin (token plus admin role).
// Routing and the middleware for each tier live in routes.rs.

pub mod admin;
pub mod protected;
pub mod public;
