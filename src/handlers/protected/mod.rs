// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: bearer JWT, resolved to an `Actor` by `jwt_auth_middleware`
// Route Prefix: /api/*

pub mod auth;
pub mod clubs;
pub mod courts;
pub mod events;
pub mod matches;
pub mod members;
pub mod users;
