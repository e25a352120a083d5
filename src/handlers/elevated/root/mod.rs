// handlers/elevated/root/mod.rs - Platform administration

pub mod users;
