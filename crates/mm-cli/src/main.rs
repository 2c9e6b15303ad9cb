//! Command-line wrapper around `mm-gemm`.
//!
//! Fills two matrices with constants, multiplies them on the virtual
//! device, and reports the product summary and wall-clock timing. The
//! default scenario is a 32x48 matrix of 3.0 times a 48x16 matrix of 4.0
//! with tile width 16, so every product element is 576.0.

mod report;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mm_gemm::{multiply_timed, GemmConfig, Matrix};

use crate::report::TimingReport;

/// Tiled matrix multiplication on a virtual massively-parallel device.
#[derive(Parser, Debug)]
#[command(name = "mm")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Rows of A (and of the product)
    #[arg(long, default_value_t = 32)]
    rows: usize,

    /// Columns of A and rows of B (the shared dimension)
    #[arg(long, default_value_t = 48)]
    inner: usize,

    /// Columns of B (and of the product)
    #[arg(long, default_value_t = 16)]
    cols: usize,

    /// Fill value for every element of A
    #[arg(long, default_value_t = 3.0)]
    fill_a: f32,

    /// Fill value for every element of B
    #[arg(long, default_value_t = 4.0)]
    fill_b: f32,

    /// Tile width: side length of each square thread block
    #[arg(long, default_value_t = mm_gemm::DEFAULT_TILE_WIDTH)]
    tile_width: usize,

    /// Print the timing report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the timing report (JSON) to this file on success
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let a = Matrix::filled(cli.rows, cli.inner, cli.fill_a);
    let b = Matrix::filled(cli.inner, cli.cols, cli.fill_b);
    let config = GemmConfig::with_tile_width(cli.tile_width);

    let (product, elapsed) = multiply_timed(&a, &b, &config)?;
    let report = TimingReport::new(
        cli.rows,
        cli.inner,
        cli.cols,
        cli.tile_width,
        elapsed,
        "tiled",
    );

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("mm {}", env!("CARGO_PKG_VERSION"));
        println!(
            "A {a} @ B {b} -> C {product}, tile width {}",
            cli.tile_width
        );
        if let (Some(first), Some(last)) =
            (product.data().first(), product.data().last())
        {
            let checksum: f32 = product.data().iter().sum();
            println!("C[0,0] = {first}, C[{},{}] = {last}, checksum = {checksum}",
                product.rows().saturating_sub(1),
                product.cols().saturating_sub(1),
            );
        }
        println!("elapsed: {:.3} ms", report.elapsed_ms);
    }

    // Reached only on success; a failed multiplication writes no file.
    if let Some(path) = &cli.report {
        std::fs::write(path, report.to_json()?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_for(rows: usize, inner: usize, cols: usize) -> Cli {
        Cli {
            rows,
            inner,
            cols,
            fill_a: 3.0,
            fill_b: 4.0,
            tile_width: 4,
            json: false,
            report: None,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_default_like_scenario() {
        let cli = cli_for(8, 12, 4);
        assert!(run(&cli).is_ok());
    }

    #[test]
    fn test_report_file_written_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timing.json");
        let mut cli = cli_for(4, 4, 4);
        cli.report = Some(path.clone());

        run(&cli).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&contents).unwrap();
        assert_eq!(value["tile_width"], 4);
        assert_eq!(value["backend"], "tiled");
    }

    #[test]
    fn test_no_report_file_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timing.json");
        let mut cli = cli_for(4, 4, 4);
        cli.tile_width = 0; // rejected by the backend
        cli.report = Some(path.clone());

        assert!(run(&cli).is_err());
        assert!(!path.exists());
    }
}
