// handlers/protected/mod.rs - Resource endpoints under /api
//
// Every route here sits behind middleware::authorize; the caller is available
// as an `AuthUser` extension and the x-user-* headers.
pub mod admin;
pub mod alerts;
pub mod orders;
pub mod projects;
pub mod readings;
pub mod stations;
pub mod tasks;
pub mod users;
pub mod whoami;
