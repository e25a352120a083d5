pub mod manager;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use pagination::{Page, PageInfo, PageParams, Pagination};
pub use postgres::PgStore;
pub use store::{
    ClubStore, CourtStore, EventStore, MatchStore, MembershipStore, Store, StoreResult, UserStore,
};
