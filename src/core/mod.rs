//! # Core Module
//!
//! Shared concurrency primitives.
//!
//! ## Key Components
//! - `MtResource`: thread-safe reference-counted resource with read-write locking, used to
//!   share scratch pools between mesh workers

pub mod mt_resource;

pub use mt_resource::MtResource;
