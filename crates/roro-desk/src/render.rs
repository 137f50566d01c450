use colored::{Color, Colorize};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use roro_data::{CapPoint, MacroReading};
use roro_models::Theme;

use crate::session::FetchedSeries;

pub const CHART_WIDTH: usize = 64;
pub const CHART_HEIGHT: usize = 12;

/// Terminal colors for the active theme.
pub struct Styles {
    pub accent: Color,
    pub dim: Color,
    pub user: Color,
    pub assistant: Color,
}

impl Styles {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Styles {
                accent: Color::Blue,
                dim: Color::BrightBlack,
                user: Color::Green,
                assistant: Color::Blue,
            },
            Theme::Dark => Styles {
                accent: Color::BrightCyan,
                dim: Color::BrightBlack,
                user: Color::BrightGreen,
                assistant: Color::BrightBlue,
            },
        }
    }
}

/// Compact dollar formatting for axis labels.
pub fn format_usd(value: Decimal) -> String {
    let v = value.to_f64().unwrap_or(0.0);
    let abs = v.abs();
    if abs >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("${:.2}K", v / 1e3)
    } else {
        format!("${v:.2}")
    }
}

/// Plot a capitalization series as fixed-height text rows with a labeled
/// dollar axis. Pure; callers color the result per theme.
pub fn chart_lines(points: &[CapPoint], width: usize, height: usize) -> Vec<String> {
    if points.is_empty() || height == 0 || width == 0 {
        return Vec::new();
    }

    let cols = width.min(points.len());
    let sample = |i: usize| -> &CapPoint {
        let idx = if cols == 1 {
            0
        } else {
            i * (points.len() - 1) / (cols - 1)
        };
        &points[idx]
    };

    let mut min_cap = sample(0).market_cap;
    let mut max_cap = min_cap;
    for i in 0..cols {
        let cap = sample(i).market_cap;
        min_cap = min_cap.min(cap);
        max_cap = max_cap.max(cap);
    }

    let min = min_cap.to_f64().unwrap_or(0.0);
    let max = max_cap.to_f64().unwrap_or(0.0);
    let span = max - min;

    let rows: Vec<usize> = (0..cols)
        .map(|i| {
            let v = sample(i).market_cap.to_f64().unwrap_or(0.0);
            if span <= f64::EPSILON {
                height / 2
            } else {
                (((v - min) / span) * (height - 1) as f64).round() as usize
            }
        })
        .collect();

    let mut lines = Vec::with_capacity(height + 1);
    for r in (0..height).rev() {
        let label = if r == height - 1 {
            format_usd(max_cap)
        } else if r == 0 {
            format_usd(min_cap)
        } else {
            String::new()
        };
        let mut row = String::with_capacity(cols);
        for &v in &rows {
            row.push(if v == r { '•' } else { ' ' });
        }
        lines.push(format!("{label:>12} │{row}"));
    }
    lines.push(format!("{:>12} └{}", "", "─".repeat(cols)));
    lines
}

/// The full capitalization chart panel for a fetched series.
pub fn render_chart(series: &FetchedSeries, theme: Theme) -> String {
    let styles = Styles::for_theme(theme);
    let title = format!(
        "{} Market Capitalization  {} → {}",
        series.symbol, series.start, series.end
    );

    let mut out = String::new();
    out.push_str(&title.color(styles.accent).bold().to_string());
    out.push('\n');
    for line in chart_lines(&series.points, CHART_WIDTH, CHART_HEIGHT) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(
        &format!("{} points", series.points.len())
            .color(styles.dim)
            .to_string(),
    );
    out
}

/// One-line macro indicator strip. Failed series render as a dash.
pub fn macro_strip_line(rows: &[(String, Option<MacroReading>)]) -> String {
    rows.iter()
        .map(|(label, reading)| match reading {
            Some(r) => format!("{label}: {:.2} ({})", r.value, r.observed_on),
            None => format!("{label}: —"),
        })
        .collect::<Vec<_>>()
        .join("  |  ")
}
