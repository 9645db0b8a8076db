// src/plot_functions/plot_bode.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Text};
use plotters::prelude::IntoLogRange;
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::{Color, IntoFont, RGBColor, ShapeStyle};
use std::error::Error;
use std::path::Path;

use crate::constants::{
    COLOR_CUTOFF_FREQ_LINE, COLOR_CUTOFF_GAIN_LINE, COLOR_GAIN_CURVE, COLOR_GRID,
    COLOR_PHASE_CURVE, GAIN_AXIS_PADDING_DB, LINE_WIDTH_PLOT, LINE_WIDTH_REFERENCE,
    LOG_AXIS_PADDING_FACTOR, MARKER_RADIUS_PX, PLOT_HEIGHT, PLOT_WIDTH,
};
use crate::data_analysis::response::{classify_response, CutoffEstimate, DerivedRow};
use crate::font_config::{
    FONT_TUPLE_AXIS_LABEL, FONT_TUPLE_CHART_TITLE, FONT_TUPLE_LEGEND, FONT_TUPLE_MAIN_TITLE,
};

const DASH_COUNT: usize = 40;
const LEGEND_LINE_PX: i32 = 20;

/// How the phase trace is presented alongside the gain curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseDisplay {
    /// Gain only.
    Hidden,
    /// Phase on a secondary y-axis sharing the frequency axis.
    #[default]
    Overlay,
    /// Phase in its own panel below the gain chart.
    Separate,
}

impl PhaseDisplay {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseDisplay::Hidden => "hidden",
            PhaseDisplay::Overlay => "overlay",
            PhaseDisplay::Separate => "separate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hidden" | "off" | "none" => Some(PhaseDisplay::Hidden),
            "overlay" | "combined" => Some(PhaseDisplay::Overlay),
            "separate" | "split" => Some(PhaseDisplay::Separate),
            _ => None,
        }
    }
}

/// Render the Bode diagram of `curve` to a PNG at `output_file`.
///
/// Draws the gain curve on a log-frequency axis with a horizontal line at the -3 dB target
/// and a vertical line at the estimated cutoff. Rows with an undefined gain are left out of
/// the trace. The phase trace uses only measurements that carry a phase; if none do, the
/// plot is gain-only regardless of `phase_display`.
pub fn plot_bode(
    output_file: &Path,
    curve: &[DerivedRow],
    cutoff: &CutoffEstimate,
    phase_display: PhaseDisplay,
) -> Result<(), Box<dyn Error>> {
    let gain_data: Vec<(f64, f64)> = curve
        .iter()
        .filter_map(|row| row.valid_gain_db().map(|g| (row.frequency_hz(), g)))
        .collect();
    if gain_data.is_empty() {
        return Err("No valid gain values to plot".into());
    }
    let phase_data: Vec<(f64, f64)> = curve
        .iter()
        .filter_map(|row| {
            row.measurement
                .phase_shift_deg()
                .map(|p| (row.frequency_hz(), p))
        })
        .collect();

    let freq_range = log_frequency_range(curve.iter().map(|row| row.frequency_hz()));

    let root = BitMapBackend::new(output_file, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    root.draw(&Text::new(
        format_title(curve, cutoff),
        (10, 10),
        FONT_TUPLE_MAIN_TITLE.into_font().color(&BLACK),
    ))?;
    let plot_area = root.margin(50, 5, 5, 5);

    match phase_display {
        PhaseDisplay::Overlay if !phase_data.is_empty() => {
            draw_combined_chart(&plot_area, &gain_data, &phase_data, cutoff, freq_range)?;
        }
        PhaseDisplay::Separate if !phase_data.is_empty() => {
            let areas = plot_area.split_evenly((2, 1));
            draw_gain_chart(&areas[0], &gain_data, cutoff, freq_range)?;
            draw_phase_chart(&areas[1], &phase_data, freq_range)?;
        }
        _ => draw_gain_chart(&plot_area, &gain_data, cutoff, freq_range)?,
    }

    root.present()?;
    Ok(())
}

/// Plot title with the response kind and cutoff.
fn format_title(curve: &[DerivedRow], cutoff: &CutoffEstimate) -> String {
    format!(
        "Bode Diagram - {} (-3dB at ~{:.2} Hz, max gain {:.2} dB)",
        classify_response(curve).name(),
        cutoff.frequency_hz,
        cutoff.max_gain_db
    )
}

/// Gain-only chart with the -3 dB reference lines.
fn draw_gain_chart(
    area: &DrawingArea<BitMapBackend, Shift>,
    gain_data: &[(f64, f64)],
    cutoff: &CutoffEstimate,
    (freq_min, freq_max): (f64, f64),
) -> Result<(), Box<dyn Error>> {
    let (gain_min, gain_max) = gain_axis_range(gain_data, cutoff);

    let mut chart = ChartBuilder::on(area)
        .caption("Gain", FONT_TUPLE_CHART_TITLE.into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((freq_min..freq_max).log_scale(), gain_min..gain_max)?;

    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("Gain (dB)")
        .x_label_style(FONT_TUPLE_AXIS_LABEL.into_font())
        .y_label_style(FONT_TUPLE_AXIS_LABEL.into_font())
        .light_line_style(ShapeStyle::from(&COLOR_GRID))
        .draw()?;

    let gain_color = *COLOR_GAIN_CURVE;
    chart
        .draw_series(LineSeries::new(
            gain_data.iter().copied(),
            ShapeStyle::from(&gain_color).stroke_width(LINE_WIDTH_PLOT),
        ))?
        .label("Gain (dB)")
        .legend(move |(x, y)| legend_line(x, y, gain_color));
    chart.draw_series(gain_data.iter().map(|&point| {
        Circle::new(point, MARKER_RADIUS_PX, ShapeStyle::from(&gain_color).filled())
    }))?;

    let target_color = *COLOR_CUTOFF_GAIN_LINE;
    let mut target_dashes = horizontal_dashes(freq_min, freq_max, cutoff.target_gain_db).into_iter();
    if let Some(first) = target_dashes.next() {
        chart
            .draw_series(LineSeries::new(
                first,
                ShapeStyle::from(&target_color).stroke_width(LINE_WIDTH_REFERENCE),
            ))?
            .label("-3dB")
            .legend(move |(x, y)| legend_line(x, y, target_color));
    }
    for dash in target_dashes {
        chart.draw_series(LineSeries::new(
            dash,
            ShapeStyle::from(&target_color).stroke_width(LINE_WIDTH_REFERENCE),
        ))?;
    }

    for dash in vertical_dashes(cutoff.frequency_hz, gain_min, gain_max) {
        chart.draw_series(LineSeries::new(
            dash,
            ShapeStyle::from(COLOR_CUTOFF_FREQ_LINE).stroke_width(LINE_WIDTH_REFERENCE),
        ))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(FONT_TUPLE_LEGEND)
        .draw()?;

    Ok(())
}

/// Phase-only panel, used below the gain chart.
fn draw_phase_chart(
    area: &DrawingArea<BitMapBackend, Shift>,
    phase_data: &[(f64, f64)],
    (freq_min, freq_max): (f64, f64),
) -> Result<(), Box<dyn Error>> {
    let (phase_min, phase_max) = phase_axis_range(phase_data);

    let mut chart = ChartBuilder::on(area)
        .caption("Phase", FONT_TUPLE_CHART_TITLE.into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((freq_min..freq_max).log_scale(), phase_min..phase_max)?;

    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("Phase Shift (degrees)")
        .x_label_style(FONT_TUPLE_AXIS_LABEL.into_font())
        .y_label_style(FONT_TUPLE_AXIS_LABEL.into_font())
        .light_line_style(ShapeStyle::from(&COLOR_GRID))
        .draw()?;

    chart.draw_series(LineSeries::new(
        phase_data.iter().copied(),
        ShapeStyle::from(COLOR_PHASE_CURVE).stroke_width(LINE_WIDTH_PLOT),
    ))?;
    chart.draw_series(phase_data.iter().map(|&point| {
        Circle::new(point, MARKER_RADIUS_PX, ShapeStyle::from(COLOR_PHASE_CURVE).filled())
    }))?;

    Ok(())
}

/// Gain and phase on one chart: gain on the left axis, phase on the right.
fn draw_combined_chart(
    area: &DrawingArea<BitMapBackend, Shift>,
    gain_data: &[(f64, f64)],
    phase_data: &[(f64, f64)],
    cutoff: &CutoffEstimate,
    (freq_min, freq_max): (f64, f64),
) -> Result<(), Box<dyn Error>> {
    let (gain_min, gain_max) = gain_axis_range(gain_data, cutoff);
    let (phase_min, phase_max) = phase_axis_range(phase_data);

    let mut chart = ChartBuilder::on(area)
        .caption("Gain and Phase", FONT_TUPLE_CHART_TITLE.into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d((freq_min..freq_max).log_scale(), gain_min..gain_max)?
        .set_secondary_coord((freq_min..freq_max).log_scale(), phase_min..phase_max);

    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("Gain (dB)")
        .x_label_style(FONT_TUPLE_AXIS_LABEL.into_font())
        .y_label_style(FONT_TUPLE_AXIS_LABEL.into_font().color(COLOR_GAIN_CURVE))
        .light_line_style(ShapeStyle::from(&COLOR_GRID))
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Phase Shift (degrees)")
        .label_style(FONT_TUPLE_AXIS_LABEL.into_font().color(COLOR_PHASE_CURVE))
        .draw()?;

    let gain_color = *COLOR_GAIN_CURVE;
    chart
        .draw_series(LineSeries::new(
            gain_data.iter().copied(),
            ShapeStyle::from(&gain_color).stroke_width(LINE_WIDTH_PLOT),
        ))?
        .label("Gain (dB)")
        .legend(move |(x, y)| legend_line(x, y, gain_color));

    let target_color = *COLOR_CUTOFF_GAIN_LINE;
    let mut target_dashes = horizontal_dashes(freq_min, freq_max, cutoff.target_gain_db).into_iter();
    if let Some(first) = target_dashes.next() {
        chart
            .draw_series(LineSeries::new(
                first,
                ShapeStyle::from(&target_color).stroke_width(LINE_WIDTH_REFERENCE),
            ))?
            .label("-3dB")
            .legend(move |(x, y)| legend_line(x, y, target_color));
    }
    for dash in target_dashes {
        chart.draw_series(LineSeries::new(
            dash,
            ShapeStyle::from(&target_color).stroke_width(LINE_WIDTH_REFERENCE),
        ))?;
    }
    for dash in vertical_dashes(cutoff.frequency_hz, gain_min, gain_max) {
        chart.draw_series(LineSeries::new(
            dash,
            ShapeStyle::from(COLOR_CUTOFF_FREQ_LINE).stroke_width(LINE_WIDTH_REFERENCE),
        ))?;
    }

    let phase_color = *COLOR_PHASE_CURVE;
    chart
        .draw_secondary_series(LineSeries::new(
            phase_data.iter().copied(),
            ShapeStyle::from(&phase_color).stroke_width(LINE_WIDTH_PLOT),
        ))?
        .label("Phase Shift (degrees)")
        .legend(move |(x, y)| legend_line(x, y, phase_color));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(FONT_TUPLE_LEGEND)
        .draw()?;

    Ok(())
}

fn legend_line(x: i32, y: i32, color: RGBColor) -> PathElement<(i32, i32)> {
    PathElement::new(
        vec![(x, y), (x + LEGEND_LINE_PX, y)],
        ShapeStyle::from(&color).stroke_width(LINE_WIDTH_PLOT),
    )
}

/// Log-axis frequency bounds covering every measurement, padded on both sides.
/// Always returns `min < max`, even for a single frequency.
pub fn log_frequency_range(frequencies: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = frequencies
        .filter(|f| f.is_finite() && *f > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
            (lo.min(f), hi.max(f))
        });
    if !min.is_finite() || !max.is_finite() {
        return (1.0, 10.0);
    }
    (min / LOG_AXIS_PADDING_FACTOR, max * LOG_AXIS_PADDING_FACTOR)
}

/// Gain axis bounds covering the samples and the -3 dB target line.
fn gain_axis_range(gain_data: &[(f64, f64)], cutoff: &CutoffEstimate) -> (f64, f64) {
    let (min, max) = gain_data
        .iter()
        .map(|&(_, g)| g)
        .chain(std::iter::once(cutoff.target_gain_db))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), g| {
            (lo.min(g), hi.max(g))
        });
    ((min - GAIN_AXIS_PADDING_DB).floor(), (max + GAIN_AXIS_PADDING_DB).ceil())
}

/// Phase axis bounds with padding, kept inside ±190° so the scale stays readable.
fn phase_axis_range(phase_data: &[(f64, f64)]) -> (f64, f64) {
    let (min, max) = phase_data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, p)| {
            (lo.min(p), hi.max(p))
        });
    let range = max - min;
    let padding = if range < 1e-6 { 10.0 } else { range * 0.15 };
    ((min - padding).max(-190.0), (max + padding).min(190.0))
}

/// Dash segments of a horizontal line at `y` across a log-scaled x range.
/// Dashes are spaced geometrically so they look even on the log axis.
fn horizontal_dashes(x_min: f64, x_max: f64, y: f64) -> Vec<Vec<(f64, f64)>> {
    let ratio = (x_max / x_min).powf(1.0 / (DASH_COUNT as f64 * 2.0));
    (0..DASH_COUNT)
        .map(|i| {
            let start = x_min * ratio.powi(2 * i as i32);
            vec![(start, y), (start * ratio, y)]
        })
        .collect()
}

/// Dash segments of a vertical line at `x` across a linear y range.
fn vertical_dashes(x: f64, y_min: f64, y_max: f64) -> Vec<Vec<(f64, f64)>> {
    let segment = (y_max - y_min) / (DASH_COUNT as f64 * 2.0);
    (0..DASH_COUNT)
        .map(|i| {
            let start = y_min + (i as f64 * 2.0) * segment;
            vec![(x, start), (x, start + segment)]
        })
        .collect()
}
