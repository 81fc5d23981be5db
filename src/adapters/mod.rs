//! Adapters: implementations of the ports.
//!
//! `identity` talks to the external identity toolkit; `api` talks to the
//! course backend. Each ships a production HTTP implementation and an
//! in-memory implementation for tests.

pub mod api;
pub mod identity;
