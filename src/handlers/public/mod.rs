// handlers/public/mod.rs - Token acquisition endpoints under /api/auth
//
// Listed in the authorize middleware's public routes, so no token is required.
pub mod auth;
