//! Remote repository client abstraction for gitvault.
//!
//! This module provides a trait-based interface over Git-forge HTTP APIs
//! (GitHub-style contents endpoints) and a provider registry for dynamic
//! client resolution.
//!
//! # Design Principles
//! - Forge isolation: no provider-specific logic leaks into the sync engine
//! - Tagged absence: a missing remote file is a state, not an error
//! - Opaque markers: version markers are compared, never interpreted
//! - Lossless transport: base64 encoding round-trips text and binary alike

pub mod github;
pub mod memory;
pub mod registry;
pub mod repository;

pub use github::GitHubClient;
pub use memory::{InjectedFailure, MemoryRemote};
pub use registry::{create_default_registry, RemoteFactory, RemoteRegistry};
pub use repository::{Account, Branch, RemoteFileState, RemoteRepository, Repository};
