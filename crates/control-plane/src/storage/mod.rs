// Storage layer for the Sportsboard control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// StorageBackend implements the core EventStore trait and carries the
// user and auth-session tables used by the auth service.

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::*;
