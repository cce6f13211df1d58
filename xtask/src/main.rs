// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Build automation for the Kiln workspace.
// Run with: cargo xtask <command>

mod commands;
mod helpers;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "Kiln build automation", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Task>,
}

#[derive(Subcommand)]
enum Task {
    /// Build all crates in the workspace.
    Build,
    /// Run unit, integration and doc tests.
    Test,
    /// Run `cargo check` on all crates.
    Check,
    /// Format all code in the workspace.
    Format,
    /// Run clippy with warnings as errors.
    Clippy,
    /// Run the criterion benchmarks.
    Bench,
    /// Run every CI task (build, test, check, format, clippy).
    All,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            helpers::print_custom_help();
            Ok(())
        }
        Some(Task::Build) => commands::ci::build(),
        Some(Task::Test) => commands::ci::test(),
        Some(Task::Check) => commands::ci::check(),
        Some(Task::Format) => commands::ci::format(),
        Some(Task::Clippy) => commands::ci::clippy(),
        Some(Task::Bench) => commands::ci::bench(),
        Some(Task::All) => commands::ci::all(),
    }
}
