// src/main.rs

use clap::Parser;
use log::info;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use bode_bench::bench::{check_input_voltage, Bench};
use bode_bench::constants::DEFAULT_INPUT_VOLTAGE_V;
use bode_bench::crate_version;
use bode_bench::export::ExportDirs;
use bode_bench::plot_functions::plot_bode::PhaseDisplay;

/// Bode diagram generator for manually measured high/lowpass filters
#[derive(Parser)]
#[command(name = "bode-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory that receives saved_png/ and saved_csv/
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Initial input voltage in volts (0-24)
    #[arg(short, long, value_name = "VOLTS", default_value_t = DEFAULT_INPUT_VOLTAGE_V, value_parser = parse_input_voltage)]
    input_voltage: f64,

    /// Phase presentation: hidden, overlay or separate
    #[arg(short, long, default_value = "overlay", value_parser = parse_phase_display)]
    phase: PhaseDisplay,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_input_voltage(text: &str) -> Result<f64, String> {
    let v: f64 = text.parse().map_err(|e| format!("{}", e))?;
    check_input_voltage(v).map_err(|e| e.to_string())?;
    Ok(v)
}

fn parse_phase_display(text: &str) -> Result<PhaseDisplay, String> {
    PhaseDisplay::from_name(text)
        .ok_or_else(|| format!("unknown phase display '{}' (hidden, overlay, separate)", text))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let dirs = ExportDirs::under(&cli.output_dir);
    info!(
        "Exports go to {} and {}",
        dirs.png_dir.display(),
        dirs.csv_dir.display()
    );
    let mut bench = Bench::new(dirs, cli.input_voltage, cli.phase);

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Bode Diagram Generator for High/Lowpass Filter (v{})",
        crate_version()
    )?;
    writeln!(
        stdout,
        "Input voltage: {} V. Type 'help' for commands.",
        bench.input_voltage_v()
    )?;

    bench.run(io::stdin().lock(), &mut stdout)?;

    info!("Session ended with {} measurements", bench.session().len());
    Ok(())
}
