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

use anyhow::Result;
use std::process::Command;
use std::time::Instant;

// ANSI color codes
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const GREEN: &str = "\x1b[32m";
pub const RED: &str = "\x1b[31m";
pub const BLUE: &str = "\x1b[34m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

// Visual symbols
pub const CHECK: &str = "✓";
pub const CROSS: &str = "✗";
pub const FIRE: &str = "🔥";
pub const HAMMER: &str = "🔨";
pub const TEST_TUBE: &str = "🧪";
pub const MAGNIFIER: &str = "🔍";
pub const BRUSH: &str = "🎨";
pub const CLIPPY: &str = "📎";
pub const STOPWATCH: &str = "⏱";

pub const BANNER: &str = concat!(
    "\x1b[1m\x1b[36m",
    "╔═══════════════════════════════════════════════════════════╗\n",
    "║                        🔥 KILN 🔥                         ║\n",
    "║                   Build Automation Tool                   ║\n",
    "╚═══════════════════════════════════════════════════════════╝",
    "\x1b[0m"
);

/// One line of the help screen: symbol, color, command name, description.
const COMMANDS: [(&str, &str, &str, &str); 7] = [
    (HAMMER, BLUE, "build", "Build all crates in the workspace."),
    (TEST_TUBE, GREEN, "test", "Run all tests in the workspace."),
    (MAGNIFIER, CYAN, "check", "Run `cargo check` on all crates."),
    (BRUSH, MAGENTA, "format", "Format all code in the workspace."),
    (CLIPPY, YELLOW, "clippy", "Run clippy on all crates with warnings as errors."),
    (STOPWATCH, BLUE, "bench", "Run the event queue benchmarks."),
    (FIRE, RED, "all", "Run all CI tasks (build, test, check, format, clippy)."),
];

pub fn print_custom_help() {
    println!("{BANNER}");
    println!("\n{BOLD}{YELLOW}Usage:{RESET} cargo xtask <command>\n");
    println!("{BOLD}Available commands:{RESET}");
    for (symbol, color, name, description) in COMMANDS {
        println!("  {symbol} {color}{BOLD}{name:<7}{RESET} - {description}");
    }
}

pub fn print_task_start(task_name: &str, emoji: &str, color: &str) {
    println!("\n{BOLD}{color}━━━ {emoji} {task_name} {emoji}━━━{RESET}");
}

pub fn print_info(message: &str) {
    println!("{BOLD}💡 Info:{RESET} {message}");
}

pub fn print_success(message: &str) {
    println!("{BOLD}{GREEN} {CHECK} {message}{RESET}");
}

pub fn print_error(message: &str) {
    println!("{BOLD}{RED} {CROSS} {message}{RESET}");
}

/// Runs `cargo <args>` with inherited output and reports its duration.
pub fn cargo(args: &[&str], task_name: &str) -> Result<()> {
    let start_time = Instant::now();
    println!("{BOLD}{CYAN}📋 Command:{RESET} cargo {}", args.join(" "));

    let status = Command::new("cargo").args(args).status()?;
    let seconds = start_time.elapsed().as_secs_f64();

    if status.success() {
        print_success(&format!("{task_name} completed in {seconds:.2}s"));
        Ok(())
    } else {
        print_error(&format!("{task_name} failed after {seconds:.2}s"));
        anyhow::bail!("{task_name} failed with status: {status}");
    }
}
