//! Server-side SVG for the three page charts.
//!
//! Element ids are stable (`bar-current-Residential`, `pct-Farm`, ...) so the
//! page script can update every element in place from a new snapshot.

use super::{ReportData, SectorRow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Spectral9, one colour per sector in declaration order
pub const SPECTRAL9: [&str; 9] = [
    "#3288bd", "#66c2a5", "#abdda4", "#e6f598", "#ffffbf", "#fee08b", "#fdae61", "#f46d43",
    "#d53e4f",
];

pub const REVENUE_TITLE: &str =
    "Tax Revenue (in Millions) by Sector and Year (vertical line is revenue required)";
pub const PERCENT_TITLE: &str = "% Change per Sector";

/// Indicator heading naming the tolerance, in thousands below $1M
pub fn indicator_title(tolerance: Decimal) -> String {
    let thousands = (tolerance * dec!(1000)).normalize();
    let amount = if thousands < dec!(1000) {
        format!("${}k", thousands)
    } else {
        format!("${}M", tolerance.normalize())
    };
    format!("Are revenue requirements met? (within {})", amount)
}

/// Upper end of the revenue axis: the largest total or requirement plus a
/// quarter, rounded up to a multiple of ten
pub fn revenue_axis_max<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    let largest = amounts.into_iter().fold(Decimal::ZERO, Decimal::max);
    let padded = (largest * dec!(1.25) / dec!(10)).ceil() * dec!(10);
    padded.max(dec!(10))
}

/// Geometry of the stacked revenue chart, shared with the page script
#[derive(Debug, Clone, Serialize)]
pub struct RevenueLayout {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub bar_height: f64,
    pub x_max: f64,
}

impl RevenueLayout {
    pub fn new(x_max: f64) -> Self {
        let (width, height) = (800.0, 350.0);
        let (left, top, right, bottom) = (60.0, 40.0, 150.0, 50.0);
        let plot_height: f64 = height - top - bottom;
        RevenueLayout {
            width,
            height,
            left,
            top,
            plot_width: width - left - right,
            plot_height,
            bar_height: plot_height / 2.0 * 0.9,
            x_max,
        }
    }

    pub fn x(&self, value: f64) -> f64 {
        self.left + value.clamp(0.0, self.x_max) / self.x_max * self.plot_width
    }

    /// Row 0 is the current period, row 1 the previous
    pub fn bar_y(&self, row: usize) -> f64 {
        let row_height = self.plot_height / 2.0;
        self.top + row as f64 * row_height + (row_height - self.bar_height) / 2.0
    }
}

/// Geometry of the percent change chart, shared with the page script
#[derive(Debug, Clone, Serialize)]
pub struct PercentLayout {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub band: f64,
    pub bar_width: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PercentLayout {
    pub fn new(sectors: usize) -> Self {
        let (width, height) = (800.0, 250.0);
        let (left, top, right, bottom) = (60.0, 30.0, 20.0, 60.0);
        let plot_width: f64 = width - left - right;
        let band = plot_width / sectors.max(1) as f64;
        PercentLayout {
            width,
            height,
            left,
            top,
            plot_width,
            plot_height: height - top - bottom,
            band,
            bar_width: band * 0.8,
            y_min: -50.0,
            y_max: 50.0,
        }
    }

    pub fn y(&self, value: f64) -> f64 {
        let v = value.clamp(self.y_min, self.y_max);
        self.top + (self.y_max - v) / (self.y_max - self.y_min) * self.plot_height
    }

    pub fn bar_x(&self, index: usize) -> f64 {
        self.left + index as f64 * self.band + (self.band - self.bar_width) / 2.0
    }
}

pub fn revenue_tooltip(label: &str, burden: f64) -> String {
    format!("{} Revenue: ${:.2}M", label, burden)
}

pub fn percent_tooltip(label: &str, change: Option<f64>) -> String {
    match change {
        Some(pct) => format!("{}: {:.1}%", label, pct),
        None => format!("{}: n/a", label),
    }
}

/// Stacked horizontal bars, current period on top
pub fn revenue_chart(data: &ReportData) -> String {
    let layout = &data.revenue_chart;
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg id="revenue-chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.width,
        h = layout.height
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <text x="{x}" y="20" font-size="14" font-weight="bold">{title}</text>"#,
        x = layout.left,
        title = html_escape(REVENUE_TITLE)
    ));
    svg.push('\n');

    svg.push_str(&revenue_axis(layout));

    let rows = [
        ("current", data.current.year.as_str(), burdens(data, |s| s.current_burden)),
        ("previous", data.previous.year.as_str(), burdens(data, |s| s.previous_burden)),
    ];
    for (row, (period, year, amounts)) in rows.iter().enumerate() {
        let y = layout.bar_y(row);
        svg.push_str(&format!(
            r#"  <text x="{x}" y="{y:.2}" font-size="12" text-anchor="end">{year}</text>"#,
            x = layout.left - 8.0,
            y = y + layout.bar_height / 2.0 + 4.0,
            year = html_escape(year)
        ));
        svg.push('\n');

        let mut offset = 0.0;
        for (sector, &amount) in data.sectors.iter().zip(amounts) {
            let x0 = layout.x(offset);
            let x1 = layout.x(offset + amount);
            svg.push_str(&format!(
                r#"  <rect id="bar-{period}-{key}" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}"><title id="tip-{period}-{key}">{tip}</title></rect>"#,
                period = period,
                key = sector.key,
                x = x0,
                y = y,
                w = x1 - x0,
                h = layout.bar_height,
                color = sector.color,
                tip = html_escape(&revenue_tooltip(&sector.label, amount))
            ));
            svg.push('\n');
            offset += amount;
        }
    }

    // reference lines span the whole plot
    for (period, required, stroke, stroke_width) in [
        ("previous", data.previous.required, "grey", 1),
        ("current", data.current.required, "black", 3),
    ] {
        let x = layout.x(required);
        svg.push_str(&format!(
            r#"  <line id="req-{period}" x1="{x:.2}" y1="{y1}" x2="{x:.2}" y2="{y2}" stroke="{stroke}" stroke-width="{stroke_width}" opacity="0.5"/>"#,
            period = period,
            x = x,
            y1 = layout.top,
            y2 = layout.top + layout.plot_height,
            stroke = stroke,
            stroke_width = stroke_width
        ));
        svg.push('\n');
    }

    svg.push_str(&legend(data));
    svg.push_str("</svg>");
    svg
}

fn burdens(data: &ReportData, pick: impl Fn(&SectorRow) -> f64) -> Vec<f64> {
    data.sectors.iter().map(pick).collect()
}

fn revenue_axis(layout: &RevenueLayout) -> String {
    let mut svg = String::new();
    let baseline = layout.top + layout.plot_height;
    svg.push_str(&format!(
        r##"  <line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="#444" stroke-width="1"/>"##,
        x1 = layout.left,
        x2 = layout.left + layout.plot_width,
        y = baseline
    ));
    svg.push('\n');
    for i in 0..=5 {
        let value = layout.x_max * i as f64 / 5.0;
        let x = layout.x(value);
        svg.push_str(&format!(
            r##"  <line x1="{x:.2}" y1="{y1}" x2="{x:.2}" y2="{y2}" stroke="#e5e7eb" stroke-width="1"/>"##,
            x = x,
            y1 = layout.top,
            y2 = baseline
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{x:.2}" y="{y}" font-size="11" text-anchor="middle">{label}</text>"#,
            x = x,
            y = baseline + 16.0,
            label = value
        ));
        svg.push('\n');
    }
    svg.push_str(&format!(
        r#"  <text x="{x}" y="{y}" font-size="12" text-anchor="middle">Tax Revenue (Millions of $)</text>"#,
        x = layout.left + layout.plot_width / 2.0,
        y = baseline + 38.0
    ));
    svg.push('\n');
    svg
}

fn legend(data: &ReportData) -> String {
    let layout = &data.revenue_chart;
    let x = layout.left + layout.plot_width + 16.0;
    let mut svg = String::new();
    for (i, sector) in data.sectors.iter().enumerate() {
        let y = layout.top + i as f64 * 18.0;
        svg.push_str(&format!(
            r#"  <rect x="{x}" y="{y}" width="12" height="12" fill="{color}"/>"#,
            x = x,
            y = y,
            color = sector.color
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{x}" y="{y}" font-size="11">{label}</text>"#,
            x = x + 18.0,
            y = y + 10.0,
            label = html_escape(&sector.label)
        ));
        svg.push('\n');
    }
    svg
}

/// One vertical bar per sector, clamped to the axis range
pub fn percent_chart(data: &ReportData) -> String {
    let layout = &data.percent_chart;
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg id="percent-chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.width,
        h = layout.height
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <text x="{x}" y="20" font-size="14" font-weight="bold">{title}</text>"#,
        x = layout.left,
        title = html_escape(PERCENT_TITLE)
    ));
    svg.push('\n');

    for tick in [-50, -25, 0, 25, 50] {
        let y = layout.y(tick as f64);
        let stroke = if tick == 0 { "#444" } else { "#e5e7eb" };
        svg.push_str(&format!(
            r#"  <line x1="{x1}" y1="{y:.2}" x2="{x2}" y2="{y:.2}" stroke="{stroke}" stroke-width="1"/>"#,
            x1 = layout.left,
            x2 = layout.left + layout.plot_width,
            y = y,
            stroke = stroke
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{x}" y="{y:.2}" font-size="11" text-anchor="end">{tick}%</text>"#,
            x = layout.left - 6.0,
            y = y + 4.0,
            tick = tick
        ));
        svg.push('\n');
    }

    let zero = layout.y(0.0);
    for (i, sector) in data.sectors.iter().enumerate() {
        let x = layout.bar_x(i);
        let top = sector
            .percent_change
            .map(|pct| layout.y(pct))
            .unwrap_or(zero);
        svg.push_str(&format!(
            r#"  <rect id="pct-{key}" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}"><title id="pct-tip-{key}">{tip}</title></rect>"#,
            key = sector.key,
            x = x,
            y = top.min(zero),
            w = layout.bar_width,
            h = (top - zero).abs(),
            color = sector.color,
            tip = html_escape(&percent_tooltip(&sector.label, sector.percent_change))
        ));
        svg.push('\n');
        let label_x = x + layout.bar_width / 2.0;
        let label_y = layout.top + layout.plot_height + 14.0;
        svg.push_str(&format!(
            r#"  <text x="{x:.2}" y="{y:.2}" font-size="10" text-anchor="end" transform="rotate(-25 {x:.2} {y:.2})">{label}</text>"#,
            x = label_x,
            y = label_y,
            label = html_escape(&sector.label)
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>");
    svg
}

/// Coloured box holding the verdict text
pub fn indicator(data: &ReportData) -> String {
    format!(
        r#"<svg id="indicator" width="300" height="100" viewBox="0 0 300 100">
  <rect id="indicator-box" x="0" y="0" width="300" height="100" rx="6" fill="{color}"/>
  <text id="indicator-text" x="150" y="58" font-size="22" font-weight="bold" fill="white" text-anchor="middle">{label}</text>
</svg>"#,
        color = data.compliance.color,
        label = html_escape(&data.compliance.label)
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_title_names_tolerance() {
        assert_eq!(
            indicator_title(dec!(0.01)),
            "Are revenue requirements met? (within $10k)"
        );
        assert_eq!(indicator_title(dec!(0.0025)), "Are revenue requirements met? (within $2.5k)");
        assert_eq!(indicator_title(dec!(1.5)), "Are revenue requirements met? (within $1.5M)");
    }

    #[test]
    fn axis_max_rounds_up_to_ten() {
        assert_eq!(
            revenue_axis_max([dec!(37.222681740772), dec!(37.22), dec!(34.165)]),
            dec!(50)
        );
        assert_eq!(revenue_axis_max([dec!(40)]), dec!(50));
        assert_eq!(revenue_axis_max([dec!(41)]), dec!(60));
        assert_eq!(revenue_axis_max(Vec::new()), dec!(10));
    }

    #[test]
    fn revenue_layout_scales_and_clamps() {
        let layout = RevenueLayout::new(50.0);
        assert_eq!(layout.x(0.0), layout.left);
        assert_eq!(layout.x(50.0), layout.left + layout.plot_width);
        assert_eq!(layout.x(80.0), layout.left + layout.plot_width);
        assert!(layout.bar_y(0) < layout.bar_y(1));
    }

    #[test]
    fn percent_layout_centres_zero() {
        let layout = PercentLayout::new(9);
        assert_eq!(layout.y(0.0), layout.top + layout.plot_height / 2.0);
        assert_eq!(layout.y(120.0), layout.top);
        assert_eq!(layout.y(-120.0), layout.top + layout.plot_height);
    }

    #[test]
    fn tooltips() {
        assert_eq!(
            revenue_tooltip("Residential", 23.465085922941),
            "Residential Revenue: $23.47M"
        );
        assert_eq!(percent_tooltip("Farm", Some(-7.3342)), "Farm: -7.3%");
        assert_eq!(percent_tooltip("Farm", None), "Farm: n/a");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
