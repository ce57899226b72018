//! Chart rasterization: `ChartSpec` -> SVG -> PNG bytes.
use crate::error::{ReportError, Result};
use crate::types::{ChartKind, ChartPalette, ChartSpec};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use std::f64::consts::PI;
use std::fmt::Write as _;

/// External rendering capability: turns a chart description into image bytes.
pub trait ChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>>;
}

const PIE_SIZE: (u32, u32) = (600, 600);
const BAR_SIZE: (u32, u32) = (600, 400);

const PASTEL: [&str; 10] = [
    "#A1C9F4", "#FFB482", "#8DE5A1", "#FF9F9B", "#D0BBFF", "#DEBB9B", "#FAB0E4", "#CFCFCF",
    "#FFFEA3", "#B9F2F0",
];
// Cool-to-warm ramp, used for the sentiment bars.
const COOLWARM: [&str; 3] = ["#6F92F3", "#DDDDDD", "#F08A6C"];

const FONT: &str = "font-family='DejaVu Sans, Arial, sans-serif'";

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

/// Renders charts by building an SVG document and rasterizing it with resvg.
pub struct SvgChartRenderer {
    options: Options<'static>,
}

impl SvgChartRenderer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        SvgChartRenderer { options }
    }
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let (svg, (w, h)) = match spec.kind {
            ChartKind::Pie => (pie_svg(spec), PIE_SIZE),
            ChartKind::Bar => (bar_svg(spec), BAR_SIZE),
        };
        svg_to_png(&svg, w, h, &self.options).map_err(|reason| ReportError::Render {
            title: spec.title.clone(),
            reason,
        })
    }
}

fn svg_header(svg: &mut String, w: u32, h: u32, title: &str) {
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>"
    );
    let _ = writeln!(svg, "  <rect width='{w}' height='{h}' fill='white'/>");
    let _ = writeln!(
        svg,
        "  <text x='{}' y='32' text-anchor='middle' {FONT} font-size='18'>{}</text>",
        w / 2,
        escape_text(title)
    );
}

/// Pie with percentage labels and a legend; an empty or all-zero pie shows
/// a "No data" placeholder.
pub fn pie_svg(spec: &ChartSpec) -> String {
    let (w, h) = PIE_SIZE;
    let mut svg = String::new();
    svg_header(&mut svg, w, h, &spec.title);

    let total = spec.total();
    let (cx, cy, r) = (300.0_f64, 300.0_f64, 200.0_f64);
    let slices: Vec<(usize, &(String, f64))> =
        spec.points.iter().enumerate().filter(|(_, (_, v))| *v > 0.0).collect();

    if total <= 0.0 || slices.is_empty() {
        let _ = writeln!(
            svg,
            "  <text x='{cx}' y='{cy}' text-anchor='middle' {FONT} font-size='16' fill='#777777'>No data</text>"
        );
        let _ = writeln!(svg, "</svg>");
        return svg;
    }

    // Start at 12 o'clock and go counter-clockwise.
    let mut angle = -PI / 2.0;
    for (i, (label, value)) in &slices {
        let color = PASTEL[i % PASTEL.len()];
        let frac = value / total;
        let sweep = frac * 2.0 * PI;
        if slices.len() == 1 {
            let _ = writeln!(svg, "  <circle cx='{cx}' cy='{cy}' r='{r}' fill='{color}' stroke='white'/>");
        } else {
            let end = angle - sweep;
            let (x1, y1) = (cx + r * angle.cos(), cy + r * angle.sin());
            let (x2, y2) = (cx + r * end.cos(), cy + r * end.sin());
            let large = if sweep > PI { 1 } else { 0 };
            let _ = writeln!(
                svg,
                "  <path d='M {cx} {cy} L {x1:.2} {y1:.2} A {r} {r} 0 {large} 0 {x2:.2} {y2:.2} Z' fill='{color}' stroke='white'/>"
            );
        }
        let mid = angle - sweep / 2.0;
        let (lx, ly) = (cx + r * 0.6 * mid.cos(), cy + r * 0.6 * mid.sin());
        let _ = writeln!(
            svg,
            "  <text x='{lx:.2}' y='{ly:.2}' text-anchor='middle' {FONT} font-size='13'>{:.1}%</text>",
            frac * 100.0
        );
        let (ox, oy) = (cx + r * 1.12 * mid.cos(), cy + r * 1.12 * mid.sin());
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        let _ = writeln!(
            svg,
            "  <text x='{ox:.2}' y='{oy:.2}' text-anchor='{anchor}' {FONT} font-size='13'>{}</text>",
            escape_text(label)
        );
        angle -= sweep;
    }
    let _ = writeln!(svg, "</svg>");
    svg
}

/// Vertical bars scaled to the largest value, with category and value labels.
pub fn bar_svg(spec: &ChartSpec) -> String {
    let (w, h) = BAR_SIZE;
    let mut svg = String::new();
    svg_header(&mut svg, w, h, &spec.title);

    let (left, right, top, bottom) = (70.0_f64, 20.0_f64, 56.0_f64, 60.0_f64);
    let plot_w = w as f64 - left - right;
    let plot_h = h as f64 - top - bottom;
    let base_y = top + plot_h;

    let _ = writeln!(
        svg,
        "  <line x1='{left}' y1='{base_y}' x2='{}' y2='{base_y}' stroke='#333333'/>",
        left + plot_w
    );
    let _ = writeln!(svg, "  <line x1='{left}' y1='{top}' x2='{left}' y2='{base_y}' stroke='#333333'/>");

    let max = spec.points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { plot_h / max } else { 0.0 };
    let n = spec.points.len().max(1) as f64;
    let slot = plot_w / n;
    let bar_w = slot * 0.6;
    let palette: &[&str] = match spec.palette {
        ChartPalette::Diverging => &COOLWARM,
        ChartPalette::Pastel => &PASTEL,
    };

    for (i, (label, value)) in spec.points.iter().enumerate() {
        let x = left + slot * i as f64 + (slot - bar_w) / 2.0;
        let bh = value * scale;
        let y = base_y - bh;
        let color = palette[i % palette.len()];
        let _ = writeln!(
            svg,
            "  <rect x='{x:.2}' y='{y:.2}' width='{bar_w:.2}' height='{bh:.2}' fill='{color}'/>"
        );
        let cx = x + bar_w / 2.0;
        let _ = writeln!(
            svg,
            "  <text x='{cx:.2}' y='{:.2}' text-anchor='middle' {FONT} font-size='12'>{value}</text>",
            y - 6.0
        );
        let _ = writeln!(
            svg,
            "  <text x='{cx:.2}' y='{:.2}' text-anchor='middle' {FONT} font-size='12'>{}</text>",
            base_y + 18.0,
            escape_text(label)
        );
    }

    let _ = writeln!(
        svg,
        "  <text x='{:.2}' y='{}' text-anchor='middle' {FONT} font-size='13'>{}</text>",
        left + plot_w / 2.0,
        h - 16,
        escape_text(&spec.category_label)
    );
    let _ = writeln!(
        svg,
        "  <text x='20' y='{:.2}' text-anchor='middle' {FONT} font-size='13' transform='rotate(-90 20 {:.2})'>{}</text>",
        top + plot_h / 2.0,
        top + plot_h / 2.0,
        escape_text(&spec.value_label)
    );
    let _ = writeln!(svg, "</svg>");
    svg
}

fn svg_to_png(svg: &str, width: u32, height: u32, options: &Options) -> std::result::Result<Vec<u8>, String> {
    use png::{BitDepth, ColorType, Encoder};

    let tree = Tree::from_data(svg.as_bytes(), options).map_err(|err| format!("SVG parse failed: {err}"))?;
    let mut pixmap = Pixmap::new(width, height).ok_or("Pixmap allocation failed")?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder
        .write_header()
        .map_err(|err| err.to_string())?
        .write_image_data(pixmap.data())
        .map_err(|err| err.to_string())?;
    Ok(out)
}
