// handlers/mod.rs - Two handler tiers
//
// Public (no auth) → Protected (JWT access token required)
pub mod public;
pub mod protected;
