//! Toolchain diagnostics.
//!
//! Verifies that the OpenGrm executables the training pipeline needs are installed.

use crate::defaults;
use crate::stage::Toolchain;
use owo_colors::OwoColorize;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed
    Ok,
    /// Tool is not found
    NotFound,
}

/// Check every pipeline tool, in pipeline order.
pub fn check_toolchain(toolchain: &Toolchain) -> Vec<(&'static str, CheckResult)> {
    defaults::TOOLCHAIN
        .iter()
        .map(|&tool| {
            let result = if toolchain.is_available(tool) {
                CheckResult::Ok
            } else {
                CheckResult::NotFound
            };
            (tool, result)
        })
        .collect()
}

/// Run all toolchain checks and print results.
///
/// Returns `true` when every tool was found.
pub fn print_toolchain_report(toolchain: &Toolchain) -> bool {
    println!("Checking OpenGrm toolchain...\n");

    let mut all_found = true;
    for (tool, result) in check_toolchain(toolchain) {
        match result {
            CheckResult::Ok => {
                println!("{:<20} {}", tool, "✓ OK".green());
            }
            CheckResult::NotFound => {
                all_found = false;
                println!("{:<20} {}", tool, "✗ NOT FOUND".red());
            }
        }
    }

    if !all_found {
        println!();
        println!("Install OpenGrm NGram (which brings in OpenFst), e.g.:");
        println!("  conda install -c conda-forge ngram");
        println!("or set toolchain.bin_dir / CORPUS_LM_BIN_DIR to their location.");
    }
    all_found
}
