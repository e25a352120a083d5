// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus the read-only club, court and event catalogue.
// Event reads run behind the optional auth middleware so PRIVATE events can
// still be served to members who send a token.

pub mod auth;
pub mod clubs;
pub mod events;
