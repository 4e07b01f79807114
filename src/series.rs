//! Chart input derived from the payload's per-period series.
//!
//! This layer only remaps structure and builds formatters. Values are copied
//! as-is: no aggregation, filtering or resampling. Smoothing affects the drawn
//! path only.

use ratatui::style::Color;

use crate::fmt::currency;
use crate::models::ChartSeries;

pub const CHART_TITLE: &str = "Sales and Purchases Overview";
pub const X_AXIS_TITLE: &str = "Month";
pub const Y_AXIS_TITLE: &str = "Amount ($)";

const SALES_COLOR: (u8, u8, u8) = (34, 197, 94);
const PURCHASES_COLOR: (u8, u8, u8) = (59, 130, 246);
const LINE_TENSION: f64 = 0.4;
/// Brightness of the area under a filled line, relative to the line color.
const FILL_SHADE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: (u8, u8, u8),
    pub fill: bool,
    pub tension: f64,
}

impl SeriesStyle {
    pub fn line_color(&self) -> Color {
        let (r, g, b) = self.color;
        Color::Rgb(r, g, b)
    }

    /// The line color darkened for the area under the line.
    pub fn fill_color(&self) -> Color {
        let (r, g, b) = self.color;
        let fade = |c: u8| (c as f64 * FILL_SHADE).round() as u8;
        Color::Rgb(fade(r), fade(g), fade(b))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySeries {
    pub label: &'static str,
    pub values: Vec<f64>,
    pub style: SeriesStyle,
}

impl DisplaySeries {
    fn new(label: &'static str, values: &[f64], color: (u8, u8, u8)) -> Self {
        Self {
            label,
            values: values.to_vec(),
            style: SeriesStyle {
                color,
                fill: true,
                tension: LINE_TENSION,
            },
        }
    }

    /// Points at integer x positions (one per period).
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect()
    }

    /// Points along the smoothed path, `steps` samples per segment, kept
    /// inside the chart's y range.
    pub fn smoothed_points(&self, steps: usize, y_bounds: [f64; 2]) -> Vec<(f64, f64)> {
        smooth(&self.points(), self.style.tension, steps, y_bounds)
    }

    pub fn tooltip(&self, index: usize) -> Option<String> {
        self.values
            .get(index)
            .map(|&v| tooltip_label(self.label, v))
    }
}

/// Everything the chart renderer needs: shared category labels plus the two
/// series, in legend order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInput {
    pub labels: Vec<String>,
    pub sales: DisplaySeries,
    pub purchases: DisplaySeries,
}

impl ChartInput {
    pub fn from_series(series: &ChartSeries) -> Self {
        Self {
            labels: series.labels().to_vec(),
            sales: DisplaySeries::new("Sales", series.sales(), SALES_COLOR),
            purchases: DisplaySeries::new("Purchases", series.purchases(), PURCHASES_COLOR),
        }
    }

    pub fn series(&self) -> [&DisplaySeries; 2] {
        [&self.sales, &self.purchases]
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Y range that always includes zero, widened to round values past the
    /// smallest and largest points.
    pub fn y_bounds(&self) -> [f64; 2] {
        let values = || self.series().into_iter().flat_map(|s| s.values.iter().copied());
        let max = values().fold(0.0_f64, f64::max);
        let min = values().fold(0.0_f64, f64::min);
        let lo = if min < 0.0 { -nice_ceiling(-min) } else { 0.0 };
        [lo, nice_ceiling(max)]
    }

    /// Evenly spaced tick values from zero to the top bound, inclusive.
    pub fn y_ticks(&self, count: usize) -> Vec<f64> {
        let [lo, hi] = self.y_bounds();
        if count < 2 {
            return vec![lo];
        }
        let step = (hi - lo) / (count - 1) as f64;
        (0..count).map(|i| lo + step * i as f64).collect()
    }

    /// Tooltip lines for one period across both series (index interaction).
    pub fn tooltip_at(&self, index: usize) -> Option<Vec<String>> {
        let title = self.labels.get(index)?.clone();
        let mut lines = vec![title];
        for s in self.series() {
            lines.extend(s.tooltip(index));
        }
        Some(lines)
    }
}

/// Axis tick text: dollar sign plus the locale-grouped value, no fixed decimals.
pub fn axis_tick(value: f64) -> String {
    currency(value)
}

pub fn tooltip_label(label: &str, value: f64) -> String {
    format!("{label}: {}", currency(value))
}

/// Round up to 1, 2, 2.5 or 5 times a power of ten.
fn nice_ceiling(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(max.log10().floor() as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&v| v >= max)
        .unwrap_or(max)
}

/// Cardinal spline through `points`. A tension of zero yields the polyline.
/// Data points are passed through exactly; overshoot between them is clamped
/// to `[lo, hi]` so the curve stays inside the plot area.
pub fn smooth(
    points: &[(f64, f64)],
    tension: f64,
    steps: usize,
    [lo, hi]: [f64; 2],
) -> Vec<(f64, f64)> {
    if points.len() < 3 || tension <= 0.0 || steps < 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity((points.len() - 1) * steps + 1);
    for i in 0..points.len() - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];

        let m1 = ((p2.0 - p0.0) * tension, (p2.1 - p0.1) * tension);
        let m2 = ((p3.0 - p1.0) * tension, (p3.1 - p1.1) * tension);

        for s in 0..steps {
            let t = s as f64 / steps as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let x = h00 * p1.0 + h10 * m1.0 + h01 * p2.0 + h11 * m2.0;
            let y = h00 * p1.1 + h10 * m1.1 + h01 * p2.1 + h11 * m2.1;
            out.push((x, y.clamp(lo, hi)));
        }
    }
    if let Some(&last) = points.last() {
        out.push(last);
    }
    out
}
