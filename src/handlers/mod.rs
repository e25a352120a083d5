// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth, optional identity) → Protected (bearer JWT) → Elevated (SUPER_ADMIN)
//
// Handlers stay thin: extract, build a service over the shared state, wrap the
// result in the success envelope. Authorization and lifecycle rules live in the
// services.

pub mod elevated; // Tier 3: /api/root/*
pub mod protected; // Tier 2: /api/*
pub mod public; // Tier 1: /auth/*, public reads under /api/*
