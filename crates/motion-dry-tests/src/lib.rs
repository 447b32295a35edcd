// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for motion rebuild crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store for preference tests
//! - [`fixtures`] - Source graphs (with clip libraries) for rebuild scenarios
//! - [`host`] - Scripted progress/cancellation host
//! - [`store`] - Recording object store with failure injection

pub mod config;
pub mod fixtures;
pub mod host;
pub mod store;

pub use config::InMemoryConfigStore;
pub use fixtures::{dangling_clip, stored_clip, Fixture};
pub use host::ScriptedHost;
pub use store::{RecordingStore, StoreCall};
