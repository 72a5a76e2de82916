//! Output rendering: SVG revenue chart, optimum summary, incomplete notice

use crate::types::{OptimalPoint, PredictionCurve};

/// Shown instead of a chart while a select box is still on the placeholder.
pub const INCOMPLETE_NOTICE: &str =
    "Please select values for Course Type, Sub-category, and Instructional Level to see the simulation.";

pub const CHART_TITLE: &str = "Revenue Simulation";

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 56.0;
const TICKS: usize = 5;

/// Format with two decimals and comma thousands separators: `1234567.891`
/// becomes `1,234,567.89`.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// One-line statement of the optimum.
pub fn optimum_summary(optimum: &OptimalPoint, currency: &str) -> String {
    format!(
        "Optimal Price Suggestion: {currency} {:.2}, expected revenue: {currency} {}",
        optimum.price,
        format_money(optimum.revenue)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Linear map from a data range onto a pixel range.
#[derive(Debug, Clone, Copy)]
struct Scale {
    lo: f64,
    hi: f64,
    px_lo: f64,
    px_hi: f64,
}

impl Scale {
    /// A flat data range is widened so the line sits mid-chart.
    fn new(lo: f64, hi: f64, px_lo: f64, px_hi: f64) -> Self {
        let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
            let pad = if lo.abs() > 1.0 { lo.abs() * 0.1 } else { 1.0 };
            (lo - pad, hi + pad)
        } else {
            (lo, hi)
        };
        Self { lo, hi, px_lo, px_hi }
    }

    fn map(&self, v: f64) -> f64 {
        self.px_lo + (v - self.lo) / (self.hi - self.lo) * (self.px_hi - self.px_lo)
    }

    #[allow(clippy::cast_precision_loss)]
    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=TICKS).map(move |i| self.lo + (self.hi - self.lo) * i as f64 / TICKS as f64)
    }
}

fn svg_open(out: &mut String) {
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<rect x="0" y="0" width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    ));
    out.push('\n');
}

/// Line chart of revenue against price with the optimum marked.
pub fn revenue_chart_svg(curve: &PredictionCurve, optimum: &OptimalPoint, currency: &str) -> String {
    let points = curve.points();
    let (min_x, max_x) = bounds(points.iter().map(|p| p.price));
    let (min_y, max_y) = bounds(points.iter().map(|p| p.revenue));

    let plot_left = MARGIN_LEFT;
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;
    let x = Scale::new(min_x, max_x, plot_left, plot_right);
    let y = Scale::new(min_y, max_y, plot_bottom, plot_top);

    let currency = escape_xml(currency);
    let mut svg = String::new();
    svg_open(&mut svg);

    svg.push_str(&format!(
        r#"<text x="{}" y="24" text-anchor="middle" font-size="16">{CHART_TITLE}</text>"#,
        WIDTH / 2.0
    ));
    svg.push('\n');

    // axes
    svg.push_str(&format!(
        r#"<line x1="{plot_left}" y1="{plot_bottom}" x2="{plot_right}" y2="{plot_bottom}" stroke="black"/>"#
    ));
    svg.push_str(&format!(
        r#"<line x1="{plot_left}" y1="{plot_top}" x2="{plot_left}" y2="{plot_bottom}" stroke="black"/>"#
    ));
    svg.push('\n');

    for t in x.ticks() {
        let px = x.map(t);
        svg.push_str(&format!(
            r#"<line x1="{px:.1}" y1="{plot_bottom}" x2="{px:.1}" y2="{:.1}" stroke="black"/><text x="{px:.1}" y="{:.1}" text-anchor="middle">{t:.0}</text>"#,
            plot_bottom + 5.0,
            plot_bottom + 18.0
        ));
        svg.push('\n');
    }
    for t in y.ticks() {
        let py = y.map(t);
        svg.push_str(&format!(
            r#"<line x1="{:.1}" y1="{py:.1}" x2="{plot_left}" y2="{py:.1}" stroke="black"/><text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            plot_left - 5.0,
            plot_left - 8.0,
            py + 4.0,
            format_money(t)
        ));
        svg.push('\n');
    }

    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Course Price ({currency})</text>"#,
        (plot_left + plot_right) / 2.0,
        HEIGHT - 14.0
    ));
    svg.push_str(&format!(
        r#"<text x="16" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">Predicted Revenue ({currency})</text>"#,
        (plot_top + plot_bottom) / 2.0,
        (plot_top + plot_bottom) / 2.0
    ));
    svg.push('\n');

    let polyline: Vec<String> = points
        .iter()
        .map(|p| format!("{:.2},{:.2}", x.map(p.price), y.map(p.revenue)))
        .collect();
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="steelblue" stroke-width="2" points="{}"/>"#,
        polyline.join(" ")
    ));
    svg.push('\n');

    let (ox, oy) = (x.map(optimum.price), y.map(optimum.revenue));
    svg.push_str(&format!(
        r#"<circle class="optimum" cx="{ox:.2}" cy="{oy:.2}" r="5" fill="crimson"/><text x="{:.2}" y="{:.2}" fill="crimson">{currency} {:.2}</text>"#,
        ox + 8.0,
        oy - 8.0,
        optimum.price
    ));
    svg.push_str("\n</svg>\n");
    svg
}

/// Placeholder graphic carrying [`INCOMPLETE_NOTICE`].
pub fn incomplete_notice_svg() -> String {
    let mut svg = String::new();
    svg_open(&mut svg);
    svg.push_str(&format!(
        r#"<text class="notice" x="{}" y="{}" text-anchor="middle" fill="darkorange">{}</text>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0,
        escape_xml(INCOMPLETE_NOTICE)
    ));
    svg.push_str("\n</svg>\n");
    svg
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}
