//! LearnSphere - Client Core for the LearnSphere Course Marketplace
//!
//! This crate implements the client-side core consumed by the presentation
//! layer: session state, identity operations, route admission, and typed
//! clients for the external course backend.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
