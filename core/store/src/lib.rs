//! Local vault store abstraction for gitvault.
//!
//! This module provides a trait-based interface over the local document
//! store (a directory of files) plus an in-memory implementation for
//! tests and development.
//!
//! # Design Principles
//! - Read-only capability: the sync engine never writes the vault
//! - Stable relative paths: enumeration order is reproducible across passes
//! - Exact bytes: no content normalization anywhere in this layer

pub mod fs;
pub mod memory;
pub mod store;

pub use fs::FsVaultStore;
pub use memory::MemoryVaultStore;
pub use store::{FileEntry, VaultStore};
