//! Backend implementations

pub mod in_memory;
pub mod in_memory_auth;

pub use in_memory::InMemoryDocumentStore;
pub use in_memory_auth::InMemoryAuthProvider;
