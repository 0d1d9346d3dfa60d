//! Background Removal CLI Tool
//!
//! `bgremove <input_path> <output_path>`: reads one image, removes its
//! background and writes the result. Exit code 0 on success, 1 otherwise.

use crate::{
    config::RemovalConfig, processor::TractRemover, remover::BackgroundRemover,
    services::ImageIOService, tracing_config,
};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit code for a completed transformation
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for usage errors, missing input and failed transformations
pub const EXIT_FAILURE: u8 = 1;

/// Remove the background from a single image
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "bgremove", about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Image to read (PNG, JPEG, TIFF, WebP)
    #[arg(value_name = "input_path", allow_hyphen_values = true)]
    pub input_path: PathBuf,

    /// Destination file, created or truncated; always PNG encoded
    #[arg(value_name = "output_path", allow_hyphen_values = true)]
    pub output_path: PathBuf,
}

impl Cli {
    /// One-line usage message, e.g. `Usage: bgremove <input_path> <output_path>`
    #[must_use]
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}

/// Entry point of the `bgremove` binary
pub fn main() -> ExitCode {
    if tracing_config::init_cli_tracing().is_err() {
        // Malformed RUST_LOG: keep the default filter instead of failing the run
        let _ = tracing_config::TracingConfig::new().init();
    }

    let mut remover = TractRemover::tract(RemovalConfig::default());
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();

    let code = run(
        std::env::args_os(),
        &mut remover,
        &mut stdout.lock(),
        &mut stderr.lock(),
    );
    ExitCode::from(code)
}

/// Drive one invocation and return the process exit code
///
/// `args` includes the program name, like [`std::env::args_os`]. Messages go
/// to the given writers so the contract can be exercised without a process.
pub fn run<I, T>(
    args: I,
    remover: &mut dyn BackgroundRemover,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // Exactly two operands; counted before clap so flags never change the count
    let [program, input_path, output_path] = &args[..] else {
        debug!(operands = args.len().saturating_sub(1), "Wrong number of arguments");
        let _ = writeln!(stdout, "{}", Cli::usage());
        return EXIT_FAILURE;
    };

    // Operands go after an end-of-options marker, so `--` and hyphen-leading
    // tokens are taken as paths
    let operands = [
        program.clone(),
        OsString::from("--"),
        input_path.clone(),
        output_path.clone(),
    ];

    let cli = match Cli::try_parse_from(operands) {
        Ok(cli) => cli,
        Err(err) => {
            debug!(error = %err, "Argument parsing failed");
            let _ = writeln!(stdout, "{}", Cli::usage());
            return EXIT_FAILURE;
        },
    };

    if !cli.input_path.exists() {
        let _ = writeln!(
            stderr,
            "ERROR: Input file not found: {}",
            cli.input_path.display()
        );
        return EXIT_FAILURE;
    }

    if remove_background(&cli.input_path, &cli.output_path, remover, stdout, stderr) {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

/// Read `input_path`, remove its background and write `output_path`
///
/// Prints `SUCCESS: ...` to `stdout` or `ERROR: ...` to `stderr` and reports
/// whether the transformation completed. Never panics on I/O or collaborator
/// failures. A failed write may leave a truncated output file.
pub fn remove_background(
    input_path: &Path,
    output_path: &Path,
    remover: &mut dyn BackgroundRemover,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> bool {
    let _span = tracing_config::spans::transformation(input_path, output_path).entered();

    match transform(input_path, output_path, remover) {
        Ok(bytes_written) => {
            info!(bytes = bytes_written, "Background removed");
            let _ = writeln!(
                stdout,
                "SUCCESS: Background removed and saved to {}",
                output_path.display()
            );
            true
        },
        Err(err) => {
            debug!(error = %format!("{err:#}"), "Background removal failed");
            let _ = writeln!(stderr, "ERROR: {err:#}");
            false
        },
    }
}

fn transform(
    input_path: &Path,
    output_path: &Path,
    remover: &mut dyn BackgroundRemover,
) -> Result<usize> {
    let input = ImageIOService::read_bytes(input_path).context("Failed to read input")?;
    let output = remover
        .remove(&input)
        .context("Failed to remove background")?;
    ImageIOService::write_bytes(output_path, &output).context("Failed to write output")?;
    Ok(output.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BgRemovalError;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct Captured {
        code: u8,
        stdout: String,
        stderr: String,
    }

    fn run_captured(args: &[&str], remover: &mut dyn BackgroundRemover) -> Captured {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(args.iter().copied(), remover, &mut stdout, &mut stderr);
        Captured {
            code,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }

    #[test]
    fn test_usage_text() {
        assert_eq!(Cli::usage(), "Usage: bgremove <input_path> <output_path>");
    }

    #[test]
    fn test_wrong_argument_counts_print_usage() {
        let calls = Cell::new(0);
        let mut remover = |bytes: &[u8]| -> crate::Result<Vec<u8>> {
            calls.set(calls.get() + 1);
            Ok(bytes.to_vec())
        };

        for args in [
            vec!["bgremove"],
            vec!["bgremove", "only_input.png"],
            vec!["bgremove", "a.png", "b.png", "c.png"],
        ] {
            let result = run_captured(&args, &mut remover);
            assert_eq!(result.code, EXIT_FAILURE);
            assert!(result.stdout.starts_with("Usage: bgremove"));
            assert!(result.stderr.is_empty());
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_flags_are_treated_as_operands() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.png");
        let mut remover = |_: &[u8]| -> crate::Result<Vec<u8>> { Ok(vec![1]) };

        let result = run_captured(&["bgremove", "--help", output.to_str().unwrap()], &mut remover);

        assert_eq!(result.code, EXIT_FAILURE);
        assert_eq!(result.stderr, "ERROR: Input file not found: --help\n");
        assert!(!output.exists());
    }

    #[test]
    fn test_double_dash_is_an_operand() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.png");
        let calls = Cell::new(0);
        let mut remover = |bytes: &[u8]| -> crate::Result<Vec<u8>> {
            calls.set(calls.get() + 1);
            Ok(bytes.to_vec())
        };

        let result = run_captured(&["bgremove", "--", output.to_str().unwrap()], &mut remover);
        assert_eq!(result.code, EXIT_FAILURE);
        assert!(result.stdout.is_empty());
        assert_eq!(result.stderr, "ERROR: Input file not found: --\n");

        let result = run_captured(&["bgremove", "--", "--"], &mut remover);
        assert_eq!(result.code, EXIT_FAILURE);
        assert_eq!(result.stderr, "ERROR: Input file not found: --\n");

        assert_eq!(calls.get(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_double_dash_as_output_path() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.png");
        std::fs::write(&input, b"input bytes").unwrap();
        let mut remover = |_: &[u8]| -> crate::Result<Vec<u8>> {
            Err(BgRemovalError::processing("stop before writing"))
        };

        let result = run_captured(&["bgremove", input.to_str().unwrap(), "--"], &mut remover);

        assert_eq!(result.code, EXIT_FAILURE);
        assert!(result.stdout.is_empty());
        assert_eq!(
            result.stderr,
            "ERROR: Failed to remove background: Processing error: stop before writing\n"
        );
    }

    #[test]
    fn test_missing_input_skips_collaborator() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("missing.png");
        let output = temp_dir.path().join("out.png");
        let calls = Cell::new(0);
        let mut remover = |bytes: &[u8]| -> crate::Result<Vec<u8>> {
            calls.set(calls.get() + 1);
            Ok(bytes.to_vec())
        };

        let result = run_captured(
            &["bgremove", input.to_str().unwrap(), output.to_str().unwrap()],
            &mut remover,
        );

        assert_eq!(result.code, EXIT_FAILURE);
        assert_eq!(
            result.stderr,
            format!("ERROR: Input file not found: {}\n", input.display())
        );
        assert!(result.stdout.is_empty());
        assert_eq!(calls.get(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_success_writes_collaborator_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.png");
        let output = temp_dir.path().join("out.png");
        std::fs::write(&input, b"input bytes").unwrap();

        let mut remover = |bytes: &[u8]| -> crate::Result<Vec<u8>> {
            assert_eq!(bytes, b"input bytes");
            Ok(b"cut out".to_vec())
        };

        let result = run_captured(
            &["bgremove", input.to_str().unwrap(), output.to_str().unwrap()],
            &mut remover,
        );

        assert_eq!(result.code, EXIT_SUCCESS);
        assert_eq!(
            result.stdout,
            format!("SUCCESS: Background removed and saved to {}\n", output.display())
        );
        assert!(result.stderr.is_empty());
        assert_eq!(std::fs::read(&output).unwrap(), b"cut out");
    }

    #[test]
    fn test_collaborator_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.png");
        let output = temp_dir.path().join("out.png");
        std::fs::write(&input, b"input bytes").unwrap();

        let mut remover = |_: &[u8]| -> crate::Result<Vec<u8>> {
            Err(BgRemovalError::processing("unsupported image"))
        };

        let result = run_captured(
            &["bgremove", input.to_str().unwrap(), output.to_str().unwrap()],
            &mut remover,
        );

        assert_eq!(result.code, EXIT_FAILURE);
        assert!(result.stdout.is_empty());
        assert_eq!(
            result.stderr,
            "ERROR: Failed to remove background: Processing error: unsupported image\n"
        );
        assert!(!output.exists());
    }

    #[test]
    fn test_unreadable_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.png");
        let mut remover = |_: &[u8]| -> crate::Result<Vec<u8>> { Ok(vec![1]) };

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let ok = remove_background(temp_dir.path(), &output, &mut remover, &mut stdout, &mut stderr);

        assert!(!ok);
        assert!(stdout.is_empty());
        let stderr = String::from_utf8(stderr).unwrap();
        assert!(stderr.starts_with("ERROR: Failed to read input: "));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.png");
        let output = temp_dir.path().join("no_such_dir").join("out.png");
        std::fs::write(&input, b"input bytes").unwrap();
        let mut remover = |_: &[u8]| -> crate::Result<Vec<u8>> { Ok(vec![1, 2, 3]) };

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let ok = remove_background(&input, &output, &mut remover, &mut stdout, &mut stderr);

        assert!(!ok);
        assert!(stdout.is_empty());
        let stderr = String::from_utf8(stderr).unwrap();
        assert!(stderr.starts_with("ERROR: Failed to write output: "));
        assert!(stderr.contains("out.png"));
        assert_eq!(std::fs::read(&input).unwrap(), b"input bytes");
    }

    #[test]
    fn test_mock_remover_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.png");
        let output = temp_dir.path().join("out.png");
        image::RgbImage::from_pixel(100, 100, image::Rgb([90, 160, 30]))
            .save(&input)
            .unwrap();

        let mut remover = crate::processor::MockRemover::mock();
        let result = run_captured(
            &["bgremove", input.to_str().unwrap(), output.to_str().unwrap()],
            &mut remover,
        );

        assert_eq!(result.code, EXIT_SUCCESS);
        let cutout = image::open(&output).unwrap().to_rgba8();
        assert_eq!(cutout.dimensions(), (100, 100));
        assert_eq!(cutout.get_pixel(50, 50)[3], 255);
        assert_eq!(cutout.get_pixel(0, 0)[3], 0);
    }
}
