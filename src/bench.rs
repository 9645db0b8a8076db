// src/bench.rs

// The interactive measurement form: one command per line, results written to `out`.

use log::{debug, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::constants::{
    CUTOFF_OFFSET_DB, DEFAULT_CSV_NAME, DEFAULT_INPUT_VOLTAGE_V, DEFAULT_PLOT_NAME,
    FREQUENCY_MIN_HZ, INPUT_VOLTAGE_MAX_V, INPUT_VOLTAGE_MIN_V, OUTPUT_VOLTAGE_MAX_V,
    OUTPUT_VOLTAGE_MIN_V, PHASE_MAX_DEG, PHASE_MIN_DEG,
};
use crate::data_analysis::gain::gain_db;
use crate::data_analysis::response::{classify_response, compute_curve, estimate_cutoff};
use crate::data_input::csv_io::read_csv;
use crate::data_input::measurement::Measurement;
use crate::data_input::session::Session;
use crate::error::CommandError;
use crate::export::{save_csv, save_plot, ExportDirs};
use crate::plot_functions::plot_bode::PhaseDisplay;

pub const HELP_TEXT: &str = "\
Commands:
  vin <volts>                 set the input voltage (0-24 V)
  add <freq> <vout> [phase]   record a measurement (Hz, V, degrees)
  list                        show measurements, gains and the -3dB frequency
  remove <#>                  delete the measurement with index #
  reset                       delete all measurements
  phase <hidden|overlay|separate>
                              choose how the phase trace is plotted
  plot [name]                 save the Bode diagram as saved_png/<name>.png
  csv [name]                  save the measurements as saved_csv/<name>
  load <path>                 append the measurements of a CSV file
  help                        show this text
  quit                        leave";

/// One parsed line of the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetInputVoltage(f64),
    Add {
        frequency_hz: f64,
        output_voltage_v: f64,
        phase_shift_deg: Option<f64>,
    },
    List,
    Remove(usize),
    Reset,
    Phase(PhaseDisplay),
    SavePlot(String),
    SaveCsv(String),
    Load(PathBuf),
    Help,
    Quit,
}

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses a line and applies the form's input bounds.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = words.collect();

    match keyword.to_ascii_lowercase().as_str() {
        "vin" => match args.as_slice() {
            [v] => {
                let v = parse_number("input voltage", v)?;
                check_input_voltage(v)?;
                Ok(Command::SetInputVoltage(v))
            }
            _ => Err(CommandError::Usage("vin <volts>")),
        },
        "add" => {
            let (freq, vout, phase) = match args.as_slice() {
                [f, v] => (*f, *v, None),
                [f, v, p] => (*f, *v, Some(*p)),
                _ => return Err(CommandError::Usage("add <freq> <vout> [phase]")),
            };
            let frequency_hz = parse_number("frequency", freq)?;
            if frequency_hz < FREQUENCY_MIN_HZ {
                return Err(CommandError::BelowMinimum {
                    field: "frequency",
                    value: frequency_hz,
                    min: FREQUENCY_MIN_HZ,
                });
            }
            let output_voltage_v = parse_number("output voltage", vout)?;
            check_range(
                "output voltage",
                output_voltage_v,
                OUTPUT_VOLTAGE_MIN_V,
                OUTPUT_VOLTAGE_MAX_V,
            )?;
            let phase_shift_deg = match phase {
                Some(p) => {
                    let p = parse_number("phase shift", p)?;
                    check_range("phase shift", p, PHASE_MIN_DEG, PHASE_MAX_DEG)?;
                    Some(p)
                }
                None => None,
            };
            Ok(Command::Add {
                frequency_hz,
                output_voltage_v,
                phase_shift_deg,
            })
        }
        "list" | "ls" => Ok(Command::List),
        "remove" | "rm" => match args.as_slice() {
            [index] => index
                .parse::<usize>()
                .map(Command::Remove)
                .map_err(|_| CommandError::NotANumber {
                    field: "index",
                    value: index.to_string(),
                }),
            _ => Err(CommandError::Usage("remove <#>")),
        },
        "reset" => Ok(Command::Reset),
        "phase" => match args.as_slice() {
            [name] => PhaseDisplay::from_name(name)
                .map(Command::Phase)
                .ok_or_else(|| CommandError::UnknownPhaseDisplay(name.to_string())),
            _ => Err(CommandError::Usage("phase <hidden|overlay|separate>")),
        },
        "plot" => Ok(Command::SavePlot(
            args.first().unwrap_or(&DEFAULT_PLOT_NAME).to_string(),
        )),
        "csv" => Ok(Command::SaveCsv(
            args.first().unwrap_or(&DEFAULT_CSV_NAME).to_string(),
        )),
        "load" => match args.as_slice() {
            [path] => Ok(Command::Load(PathBuf::from(path))),
            _ => Err(CommandError::Usage("load <path>")),
        },
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Input voltage bounds of the form.
pub fn check_input_voltage(v: f64) -> Result<(), CommandError> {
    check_range("input voltage", v, INPUT_VOLTAGE_MIN_V, INPUT_VOLTAGE_MAX_V)
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, CommandError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::NotANumber {
            field,
            value: text.to_string(),
        })
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), CommandError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CommandError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// State behind the form: the session plus the settings every recomputation uses.
#[derive(Debug, Clone)]
pub struct Bench {
    session: Session,
    input_voltage_v: f64,
    phase_display: PhaseDisplay,
    dirs: ExportDirs,
}

impl Default for Bench {
    fn default() -> Self {
        Self::new(ExportDirs::default(), DEFAULT_INPUT_VOLTAGE_V, PhaseDisplay::default())
    }
}

impl Bench {
    pub fn new(dirs: ExportDirs, input_voltage_v: f64, phase_display: PhaseDisplay) -> Self {
        Self {
            session: Session::new(),
            input_voltage_v,
            phase_display,
            dirs,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input_voltage_v(&self) -> f64 {
        self.input_voltage_v
    }

    pub fn phase_display(&self) -> PhaseDisplay {
        self.phase_display
    }

    /// Reads commands from `input` until `quit` or end of input, prompting on `out`.
    ///
    /// A line that is not valid UTF-8 is reported and skipped; only I/O failures on
    /// `input` or `out` end the loop early.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping input line: {}", e);
                    writeln!(out, "Error: input line is not valid UTF-8 ({})", e)?;
                    continue;
                }
            };
            if self.handle_line(line, out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Parses and runs one line. Parse errors are reported to `out`; only write
    /// failures on `out` itself are returned as errors.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match parse_command(line) {
            Ok(command) => self.execute(command, out),
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Runs one command against the session. Every failure becomes a message on `out`;
    /// the session is never left half-modified.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        debug!("Executing {:?}", command);
        match command {
            Command::SetInputVoltage(v) => {
                self.input_voltage_v = v;
                writeln!(out, "Input voltage set to {} V", v)?;
                self.write_summary(out)?;
            }
            Command::Add {
                frequency_hz,
                output_voltage_v,
                phase_shift_deg,
            } => match Measurement::new(frequency_hz, output_voltage_v, phase_shift_deg) {
                Ok(measurement) => {
                    self.session.append(measurement);
                    writeln!(
                        out,
                        "Added measurement #{} ({} measurements)",
                        self.session.len() - 1,
                        self.session.len()
                    )?;
                    self.write_summary(out)?;
                }
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            Command::List => {
                self.write_table(out)?;
                self.write_summary(out)?;
            }
            Command::Remove(index) => match self.session.remove(index) {
                Some(removed) => {
                    writeln!(
                        out,
                        "Removed measurement #{} ({} Hz)",
                        index,
                        removed.frequency_hz()
                    )?;
                    self.write_summary(out)?;
                }
                None => writeln!(out, "Error: no measurement with index {}", index)?,
            },
            Command::Reset => {
                self.session.reset();
                writeln!(out, "All measurements cleared")?;
            }
            Command::Phase(display) => {
                self.phase_display = display;
                writeln!(out, "Phase display: {}", display.name())?;
            }
            Command::SavePlot(name) => {
                match save_plot(
                    &self.session,
                    self.input_voltage_v,
                    self.phase_display,
                    &self.dirs,
                    &name,
                ) {
                    Ok(path) => writeln!(out, "Plot saved as {}", path.display())?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            Command::SaveCsv(name) => {
                match save_csv(&self.session, self.input_voltage_v, &self.dirs, &name) {
                    Ok(path) => writeln!(out, "File saved as {}", path.display())?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            Command::Load(path) => match read_csv(&path) {
                Ok(measurements) => {
                    let count = measurements.len();
                    self.session.extend(measurements);
                    writeln!(out, "Loaded {} measurements from {}", count, path.display())?;
                    self.write_summary(out)?;
                }
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            Command::Help => writeln!(out, "{}", HELP_TEXT)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// The frequency-sorted measurement table with gains.
    pub fn write_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.session.is_empty() {
            return writeln!(out, "No measurements yet.");
        }

        writeln!(
            out,
            "{:>4}  {:>14}  {:>18}  {:>17}  {:>10}",
            "#", "Frequency (Hz)", "Output Voltage (V)", "Phase Shift (deg)", "Gain (dB)"
        )?;
        for (index, measurement) in self.session.sorted_with_index() {
            let phase = measurement
                .phase_shift_deg()
                .map_or_else(|| "-".to_string(), |p| format!("{:.1}", p));
            let gain = match gain_db(self.input_voltage_v, measurement.output_voltage_v()) {
                Ok(g) => format!("{:.2}", g),
                Err(_) => "invalid".to_string(),
            };
            writeln!(
                out,
                "{:>4}  {:>14.2}  {:>18.3}  {:>17}  {:>10}",
                index,
                measurement.frequency_hz(),
                measurement.output_voltage_v(),
                phase,
                gain
            )?;
        }
        Ok(())
    }

    /// Recomputes the curve from the current snapshot and reports the cutoff.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.session.is_empty() {
            return Ok(());
        }

        let curve = compute_curve(&self.session.all_sorted(), self.input_voltage_v);
        for row in &curve {
            if let Err(e) = &row.gain_db {
                writeln!(out, "Warning: {} Hz: {}", row.frequency_hz(), e)?;
            }
        }

        match estimate_cutoff(&curve) {
            Some(cutoff) => {
                writeln!(
                    out,
                    "The -{}dB frequency is approximately: {:.2} Hz (target gain {:.2} dB, {})",
                    CUTOFF_OFFSET_DB,
                    cutoff.frequency_hz,
                    cutoff.target_gain_db,
                    classify_response(&curve).name()
                )?;
            }
            None => {
                warn!("No valid gain among {} measurements", curve.len());
                writeln!(
                    out,
                    "Cannot estimate the -{}dB frequency: no valid gain values (check the input voltage)",
                    CUTOFF_OFFSET_DB
                )?;
            }
        }
        Ok(())
    }
}
