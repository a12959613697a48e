//! Email storage
//!
//! The trait-based design allows swapping between in-memory and persistent
//! storage implementations.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryEmailStore;
pub use sqlite::SqliteEmailStore;
pub use traits::EmailStore;
