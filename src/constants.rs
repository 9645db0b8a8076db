// src/constants.rs

use plotters::style::colors::full_palette::{BLUE, GREEN_700, ORANGE, RED};
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;

// Font sizes (see font_config.rs).
pub const FONT_SIZE_MAIN_TITLE: i32 = 28;
pub const FONT_SIZE_CHART_TITLE: i32 = 22;
pub const FONT_SIZE_AXIS_LABEL: i32 = 16;
pub const FONT_SIZE_LEGEND: i32 = 14;

// The cutoff is where gain has dropped this far below the maximum observed gain.
pub const CUTOFF_OFFSET_DB: f64 = 3.0;

// Form input bounds (the interactive boundary enforces these before a Measurement is built).
pub const INPUT_VOLTAGE_MIN_V: f64 = 0.0;
pub const INPUT_VOLTAGE_MAX_V: f64 = 24.0;
pub const DEFAULT_INPUT_VOLTAGE_V: f64 = 1.0;
pub const OUTPUT_VOLTAGE_MIN_V: f64 = 0.0;
pub const OUTPUT_VOLTAGE_MAX_V: f64 = 24.0;
pub const FREQUENCY_MIN_HZ: f64 = 0.1;
pub const PHASE_MIN_DEG: f64 = -180.0;
pub const PHASE_MAX_DEG: f64 = 180.0;

// Export locations, relative to the output directory.
pub const PNG_DIR_NAME: &str = "saved_png";
pub const CSV_DIR_NAME: &str = "saved_csv";
pub const DEFAULT_PLOT_NAME: &str = "combined_plot";
pub const DEFAULT_CSV_NAME: &str = "measurements.csv";

// --- Plot Color Assignments ---
pub const COLOR_GAIN_CURVE: &RGBColor = &BLUE;
pub const COLOR_PHASE_CURVE: &RGBColor = &ORANGE;
pub const COLOR_CUTOFF_GAIN_LINE: &RGBColor = &RED;
pub const COLOR_CUTOFF_FREQ_LINE: &RGBColor = &GREEN_700;
pub const COLOR_GRID: RGBColor = RGBColor(200, 200, 200);

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_REFERENCE: u32 = 1;
pub const MARKER_RADIUS_PX: i32 = 4;

// Log-frequency axis padding factor applied on each side of the sampled range.
pub const LOG_AXIS_PADDING_FACTOR: f64 = 1.25;

// Gain axis padding (dB) above and below the sampled gain range.
pub const GAIN_AXIS_PADDING_DB: f64 = 3.0;

// src/constants.rs
