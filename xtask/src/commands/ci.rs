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

use crate::helpers::*;
use anyhow::Result;
use std::time::Instant;

pub fn build() -> Result<()> {
    print_task_start("Building All Crates", HAMMER, BLUE);
    print_info("Compiling all workspace crates in debug mode");
    cargo(&["build", "--workspace", "--exclude", "xtask"], "Build")
}

pub fn test() -> Result<()> {
    print_task_start("Running All Tests", TEST_TUBE, GREEN);
    print_info("Running unit tests, integration tests and doc tests");
    cargo(&["test", "--workspace"], "Tests")
}

pub fn check() -> Result<()> {
    print_task_start("Checking All Crates", MAGNIFIER, CYAN);
    print_info("Checking code for errors without building executables");
    cargo(&["check", "--workspace", "--all-targets"], "Check")
}

pub fn format() -> Result<()> {
    print_task_start("Formatting Code", BRUSH, MAGENTA);
    print_info("Formatting code using rustfmt with default settings");
    // `fmt` takes `--all`, not `--workspace`.
    cargo(&["fmt", "--all"], "Format")
}

pub fn clippy() -> Result<()> {
    print_task_start("Running Clippy", CLIPPY, YELLOW);
    print_info("Running Clippy linter with warnings as errors");
    cargo(
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        "Clippy",
    )
}

pub fn bench() -> Result<()> {
    print_task_start("Running Benchmarks", STOPWATCH, BLUE);
    print_info("Running criterion benchmarks in release mode");
    cargo(&["bench", "-p", "kiln-core"], "Bench")
}

pub fn all() -> Result<()> {
    println!("{BANNER}");
    println!("{BOLD}{CYAN}Starting full build pipeline...{RESET}");
    println!("{BOLD}💡 Pipeline:{RESET} build → test → check → format → clippy");

    let start_time = Instant::now();
    let tasks: [(&str, fn() -> Result<()>); 5] = [
        ("Build Phase", build),
        ("Test Phase", test),
        ("Check Phase", check),
        ("Format Phase", format),
        ("Clippy Phase", clippy),
    ];
    let total_tasks = tasks.len();
    let mut failed = Vec::new();

    for (i, (name, task_fn)) in tasks.iter().enumerate() {
        println!("\n{BOLD}{BLUE}[{}/{total_tasks}] {name}{RESET}", i + 1);
        if let Err(err) = task_fn() {
            failed.push(format!("{name}: {err}"));
        }
    }

    let seconds = start_time.elapsed().as_secs_f64();
    println!("\n{BOLD}{CYAN}╔═══════════════════════════════════════╗{RESET}");
    println!("{BOLD}{CYAN}║            PIPELINE SUMMARY           ║{RESET}");
    println!("{BOLD}{CYAN}╚═══════════════════════════════════════╝{RESET}");

    if failed.is_empty() {
        println!("{BOLD}{GREEN} {CHECK} All {total_tasks} tasks completed successfully! {FIRE}{RESET}");
    } else {
        for failure in &failed {
            print_error(failure);
        }
    }
    println!("{BOLD}{BLUE}Total time: {seconds:.2}s{RESET}");

    if !failed.is_empty() {
        anyhow::bail!(
            "Pipeline failed with {}/{total_tasks} successful tasks.",
            total_tasks - failed.len()
        );
    }
    Ok(())
}
