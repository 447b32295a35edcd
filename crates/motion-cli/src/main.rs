// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CLI entry point for motion graph tooling.

use anyhow::Result;

fn main() -> Result<()> {
    motion_cli::entrypoint()
}
