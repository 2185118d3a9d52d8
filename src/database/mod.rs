pub mod connection;
pub mod memory;
pub mod postgres;
pub mod schema;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgCredentialStore;
pub use store::CredentialStore;
