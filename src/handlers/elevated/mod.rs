// handlers/elevated/mod.rs - Elevated handlers (SUPER_ADMIN required)
//
// Security Level: bearer JWT + `require_super_admin`
// Route Prefix: /api/root/*

pub mod root;
