//! Background removal CLI tool
//!
//! `bgremove <input_path> <output_path>`

use std::process::ExitCode;

fn main() -> ExitCode {
    bgremove::cli::main()
}
