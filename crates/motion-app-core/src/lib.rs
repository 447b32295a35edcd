// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for motion rebuild tools (config, prefs,
//! report summaries). Keeps CLI and editor adapters thin.

pub mod config;
pub mod prefs;
pub mod summary;
