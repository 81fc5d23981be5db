//! Course backend adapters.

mod in_memory;
mod rest;

pub use in_memory::InMemoryBackend;
pub use rest::RestBackend;
