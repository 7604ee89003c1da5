//! SVG figures for training curves and confusion matrices.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confusion::ConfusionMatrix;
use crate::error::{AnalysisError, Result};

const HISTORY_SIZE: (u32, u32) = (1000, 400);
const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

/// A rendered SVG figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    svg: String,
}

impl Figure {
    /// The SVG document.
    pub fn as_svg(&self) -> &str {
        &self.svg
    }

    /// Consume the figure, returning the SVG document.
    pub fn into_svg(self) -> String {
        self.svg
    }

    /// Write the SVG document to `path`, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.svg)?;
        debug!(path = %path.display(), "Saved figure");
        Ok(())
    }
}

/// One named series of per-epoch values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Legend label.
    pub label: String,
    /// Value at each epoch, epoch 1 first.
    pub values: Vec<f64>,
}

impl Curve {
    /// Create a curve.
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

fn plot_err<E: std::fmt::Display>(err: E) -> AnalysisError {
    AnalysisError::Plot(err.to_string())
}

/// Two side-by-side panels: accuracy curves on the left, loss curves on
/// the right, each plotted against the epoch number.
pub fn training_history_figure(accuracy: &[Curve], loss: &[Curve]) -> Result<Figure> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, HISTORY_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let panels = root.split_evenly((1, 2));
        draw_curves(&panels[0], "Model accuracy", "accuracy", accuracy)?;
        draw_curves(&panels[1], "Model loss", "loss", loss)?;
        root.present().map_err(plot_err)?;
    }
    Ok(Figure { svg })
}

fn draw_curves(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    y_desc: &str,
    curves: &[Curve],
) -> Result<()> {
    let epochs = curves.iter().map(|c| c.values.len()).max().unwrap_or(0);
    let (lo, hi) = value_range(curves);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(1f64..(epochs as f64).max(2.0), lo..hi)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc(y_desc)
        .draw()
        .map_err(plot_err)?;

    for (i, curve) in curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                curve
                    .values
                    .iter()
                    .enumerate()
                    .map(|(epoch, &v)| ((epoch + 1) as f64, v)),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(curve.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if !curves.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }
    Ok(())
}

fn value_range(curves: &[Curve]) -> (f64, f64) {
    let mut values = curves
        .iter()
        .flat_map(|c| c.values.iter().copied())
        .filter(|v| v.is_finite())
        .peekable();
    if values.peek().is_none() {
        return (0.0, 1.0);
    }
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi - lo < 1e-9 {
        (lo - 0.5, hi + 0.5)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}

/// Heat map of a confusion matrix with the count in every cell.
///
/// True classes run down the vertical axis (first class at the top) and
/// predicted classes across the horizontal axis.
pub fn confusion_matrix_figure(cm: &ConfusionMatrix) -> Result<Figure> {
    let n = cm.n_classes.max(1) as i32;
    let side = (160 + 60 * cm.n_classes as u32).clamp(400, 1200);
    let max = cm.max_count().max(1) as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (side + 80, side)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Confusion matrix", ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(80)
            // integer ranges are inclusive, so `0..n - 1` yields n segments
            .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())
            .map_err(plot_err)?;

        // Row 0 is drawn at the top.
        let flip = |row: i32| n - 1 - row;
        let class_name = |v: &SegmentValue<i32>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) if (0..n).contains(i) => {
                Some(*i as usize)
            }
            _ => None,
        };
        let x_fmt = |v: &SegmentValue<i32>| class_name(v).map(|i| cm.label(i)).unwrap_or_default();
        let y_fmt = |v: &SegmentValue<i32>| {
            class_name(v)
                .map(|i| cm.label(flip(i as i32) as usize))
                .unwrap_or_default()
        };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(cm.n_classes)
            .y_labels(cm.n_classes)
            .x_desc("Predicted label")
            .y_desc("True label")
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .draw()
            .map_err(plot_err)?;

        let cells: Vec<(i32, i32, usize)> = cm
            .matrix
            .iter()
            .enumerate()
            .flat_map(|(row, counts)| {
                counts
                    .iter()
                    .enumerate()
                    .map(move |(col, &count)| (col as i32, row as i32, count))
            })
            .collect();

        chart
            .draw_series(cells.iter().map(|&(col, row, count)| {
                let y = flip(row);
                Rectangle::new(
                    [
                        (SegmentValue::Exact(col), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(col + 1), SegmentValue::Exact(y + 1)),
                    ],
                    heat_color(count as f64 / max).filled(),
                )
            }))
            .map_err(plot_err)?;

        chart
            .draw_series(cells.iter().map(|&(col, row, count)| {
                let color = if count as f64 / max > 0.5 { WHITE } else { BLACK };
                let style = ("sans-serif", 16)
                    .into_font()
                    .color(&color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                Text::new(
                    count.to_string(),
                    (SegmentValue::CenterOf(col), SegmentValue::CenterOf(flip(row))),
                    style,
                )
            }))
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }
    Ok(Figure { svg })
}

/// White to dark blue as `t` goes from 0 to 1.
fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |to: u8| (255.0 - t * (255.0 - f64::from(to))).round() as u8;
    RGBColor(lerp(8), lerp(48), lerp(107))
}
