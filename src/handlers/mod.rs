// handlers/mod.rs - Handler tiers
//
// Public (no token) → Protected (bearer token, role table enforced by
// middleware::authorize before any handler runs)
pub mod protected;
pub mod public;
