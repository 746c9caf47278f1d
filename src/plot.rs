//! Figure rendering.
//!
//! Each figure is drawn by a backend-generic function so the same code writes
//! PNG (bitmap backend) and SVG files.

use crate::data::{
    self, FIXED_COST, PROVIDERS, REVENUE, USAGE_COST, UTILITIES, UTILITY_RANGE, UTILITY_SHIFTS,
    VM_ALLOCATION,
};
use crate::font::FAMILY;
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pixel size of every figure (8x6 inches at 100 dpi)
pub const FIGURE_SIZE: (u32, u32) = (800, 600);

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const SALMON: RGBColor = RGBColor(250, 128, 114);
const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const GRAY: RGBColor = RGBColor(128, 128, 128);
const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);

/// Line colors for the per-provider curves
const SERIES_COLORS: [RGBColor; 3] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
];

const BAR_WIDTH: f64 = 0.8;
const STACKED_BAR_WIDTH: f64 = 0.5;

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// The fixed set of figures, in generation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    VmAllocation,
    ProviderUtilities,
    CostBreakdown,
    UtilityCurves,
    PriceFunction,
}

impl Figure {
    pub const ALL: [Figure; 5] = [
        Figure::VmAllocation,
        Figure::ProviderUtilities,
        Figure::CostBreakdown,
        Figure::UtilityCurves,
        Figure::PriceFunction,
    ];

    /// Chart caption, also used as the file stem
    pub fn title(self) -> &'static str {
        match self {
            Figure::VmAllocation => "Nash Equilibrium VM Allocation",
            Figure::ProviderUtilities => "Provider Utilities at Nash Equilibrium",
            Figure::CostBreakdown => "Revenue and Cost Breakdown per Provider",
            Figure::UtilityCurves => "Utility vs VMs Allocated (Assuming Others Allocate 10)",
            Figure::PriceFunction => "Price Function",
        }
    }

    pub fn file_name(self, format: ImageFormat) -> String {
        format!("{}.{}", self.title(), format.extension())
    }

    fn draw<DB>(self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        match self {
            Figure::VmAllocation => plot_bars(
                root,
                &BarChart {
                    title: self.title(),
                    y_desc: "Allocated VMs",
                    values: &VM_ALLOCATION,
                    color: SKY_BLUE,
                    y_max: 22.0,
                    label_offset: 0.5,
                },
            ),
            Figure::ProviderUtilities => plot_bars(
                root,
                &BarChart {
                    title: self.title(),
                    y_desc: "Utility",
                    values: &UTILITIES,
                    color: LIGHT_GREEN,
                    y_max: 300.0,
                    label_offset: 5.0,
                },
            ),
            Figure::CostBreakdown => plot_cost_breakdown(root, self.title()),
            Figure::UtilityCurves => plot_utility_curves(root, self.title()),
            Figure::PriceFunction => plot_price_function(root, self.title()),
        }
    }
}

/// Render one figure to `path`
pub fn render(figure: Figure, path: &Path, format: ImageFormat) -> Result<()> {
    match format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
            figure.draw(&root)?;
            root.present()?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
            figure.draw(&root)?;
            root.present()?;
        }
    }
    Ok(())
}

/// Generate all figures into `output_dir`, creating it if needed.
///
/// Existing files with the same names are overwritten.
pub fn generate_all_plots<P: AsRef<Path>>(output_dir: P, format: ImageFormat) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut generated = Vec::with_capacity(Figure::ALL.len());
    for figure in Figure::ALL {
        let path = output_dir.join(figure.file_name(format));
        debug!(figure = figure.title(), "Rendering");
        render(figure, &path, format)
            .with_context(|| format!("Failed to write figure: {}", path.display()))?;
        info!(path = %path.display(), "Wrote figure");
        generated.push(path);
    }

    Ok(generated)
}

/// Literal data and styling of a single-series bar chart
struct BarChart<'a> {
    title: &'a str,
    y_desc: &'a str,
    values: &'a [u32],
    color: RGBColor,
    y_max: f64,
    /// Gap between a bar top and its value label, in data units
    label_offset: f64,
}

/// X axis with providers centered on 0, 1, 2
fn provider_axis() -> std::ops::Range<f64> {
    -0.6..(PROVIDERS.len() - 1) as f64 + 0.6
}

fn provider_label(x: &f64) -> String {
    let idx = x.round();
    if idx >= 0.0 && (idx as usize) < PROVIDERS.len() && (x - idx).abs() < 1e-9 {
        PROVIDERS[idx as usize].to_string()
    } else {
        String::new()
    }
}

/// Bar for provider `idx`, spanning `bottom..top`
fn bar(idx: usize, bottom: f64, top: f64, width: f64, style: ShapeStyle) -> Rectangle<(f64, f64)> {
    let x = idx as f64;
    Rectangle::new([(x - width / 2.0, bottom), (x + width / 2.0, top)], style)
}

/// Data range padded by 5% on both ends
fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Plot a bar chart with each value printed above its bar
fn plot_bars<DB>(root: &DrawingArea<DB, Shift>, bars: &BarChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(root)
        .caption(bars.title, (FAMILY, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(provider_axis(), 0f64..bars.y_max)?;

    // Horizontal grid only
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.25))
        .x_labels(PROVIDERS.len() + 1)
        .x_label_formatter(&provider_label)
        .x_desc("Provider")
        .y_desc(bars.y_desc)
        .axis_desc_style((FAMILY, 16))
        .label_style((FAMILY, 13))
        .draw()?;

    chart.draw_series(
        bars.values
            .iter()
            .enumerate()
            .map(|(i, &v)| bar(i, 0.0, v as f64, BAR_WIDTH, bars.color.filled())),
    )?;

    let value_style = TextStyle::from((FAMILY, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.values.iter().enumerate().map(|(i, &v)| {
        Text::new(v.to_string(), (i as f64, v as f64 + bars.label_offset), value_style.clone())
    }))?;

    Ok(())
}

/// Plot revenue, usage cost and fixed cost stacked per provider
fn plot_cost_breakdown<DB>(root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let layers = [
        ("Revenue", REVENUE, SALMON),
        ("Usage Cost", USAGE_COST, LIGHT_BLUE),
        ("Fixed Cost", FIXED_COST, GRAY),
    ];
    let offsets = data::stack_offsets(&[REVENUE, USAGE_COST, FIXED_COST]);

    let tallest = (0..PROVIDERS.len())
        .map(|i| layers.iter().map(|(_, values, _)| values[i]).sum::<f64>())
        .fold(0.0_f64, f64::max);
    // Leave headroom for the legend
    let y_max = tallest * 1.2;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FAMILY, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(provider_axis(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(PROVIDERS.len() + 1)
        .x_label_formatter(&provider_label)
        .x_desc("Provider")
        .y_desc("Value")
        .axis_desc_style((FAMILY, 16))
        .label_style((FAMILY, 13))
        .draw()?;

    for (&(label, values, color), bottoms) in layers.iter().zip(offsets.iter()) {
        chart
            .draw_series(
                values
                    .iter()
                    .zip(bottoms.iter())
                    .enumerate()
                    .map(|(i, (&v, &b))| bar(i, b, b + v, STACKED_BAR_WIDTH, color.filled())),
            )?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 18, y + 6)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FAMILY, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Plot each provider's utility as a function of its own allocation
fn plot_utility_curves<DB>(root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let curves: Vec<Vec<(f64, f64)>> = UTILITY_SHIFTS.iter().map(|&s| data::utility_curve(s)).collect();

    let (x_min, x_max) = padded_range([UTILITY_RANGE.0, UTILITY_RANGE.1]);
    let (y_min, y_max) = padded_range(curves.iter().flatten().map(|&(_, u)| u));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FAMILY, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("VMs Allocated by Provider")
        .y_desc("Utility")
        .axis_desc_style((FAMILY, 16))
        .label_style((FAMILY, 13))
        .draw()?;

    for (i, (points, &color)) in curves.iter().zip(SERIES_COLORS.iter()).enumerate() {
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(format!("Provider {}", i + 1))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font((FAMILY, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Plot price per VM against the total allocation
fn plot_price_function<DB>(root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points = data::price_curve();
    let (x_min, x_max) = padded_range(points.iter().map(|&(v, _)| v));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FAMILY, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 15f64..105f64)?;

    chart
        .configure_mesh()
        .x_desc("Total VMs Allocated")
        .y_desc("Price per VM")
        .axis_desc_style((FAMILY, 16))
        .label_style((FAMILY, 13))
        .draw()?;

    chart.draw_series(LineSeries::new(points, DARK_ORANGE.stroke_width(2)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font;
    use tempfile::TempDir;

    /// Register a system font, or report that this machine cannot render text
    fn have_font() -> bool {
        font::ensure_registered(None).is_ok()
    }

    fn sorted_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_file_names_are_literal_titles() {
        let names: Vec<String> = Figure::ALL.iter().map(|f| f.file_name(ImageFormat::Png)).collect();
        assert_eq!(
            names,
            vec![
                "Nash Equilibrium VM Allocation.png",
                "Provider Utilities at Nash Equilibrium.png",
                "Revenue and Cost Breakdown per Provider.png",
                "Utility vs VMs Allocated (Assuming Others Allocate 10).png",
                "Price Function.png",
            ]
        );
        assert_eq!(Figure::PriceFunction.file_name(ImageFormat::Svg), "Price Function.svg");
    }

    #[test]
    fn test_provider_labels_on_ticks_only() {
        assert_eq!(provider_label(&0.0), "P1");
        assert_eq!(provider_label(&1.0), "P2");
        assert_eq!(provider_label(&2.0), "P3");
        assert_eq!(provider_label(&0.5), "");
        assert_eq!(provider_label(&-1.0), "");
        assert_eq!(provider_label(&3.0), "");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([0.0, 20.0]), (-1.0, 21.0));
        assert_eq!(padded_range([5.0]), (4.0, 6.0));
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(padded_range([f64::NAN, 0.0, 10.0, f64::NEG_INFINITY]), (-0.5, 10.5));
    }

    #[test]
    fn test_generates_five_png_files_in_new_directory() {
        if !have_font() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("figures");
        assert!(!out.exists());

        let generated = generate_all_plots(&out, ImageFormat::Png).unwrap();
        assert!(out.is_dir());
        assert_eq!(generated.len(), 5);

        let expected: Vec<String> = {
            let mut v: Vec<String> = Figure::ALL.iter().map(|f| f.file_name(ImageFormat::Png)).collect();
            v.sort();
            v
        };
        assert_eq!(sorted_names(&out), expected);

        for path in &generated {
            let bytes = std::fs::read(path).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
        }
    }

    #[test]
    fn test_rerun_overwrites_existing_output() {
        if !have_font() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("figures");
        std::fs::create_dir_all(&out).unwrap();
        let stale = out.join(Figure::PriceFunction.file_name(ImageFormat::Svg));
        std::fs::write(&stale, "stale").unwrap();

        generate_all_plots(&out, ImageFormat::Svg).unwrap();
        let first = std::fs::read(&stale).unwrap();
        assert_ne!(first, b"stale");

        generate_all_plots(&out, ImageFormat::Svg).unwrap();
        assert_eq!(sorted_names(&out).len(), 5);
        assert_eq!(std::fs::read(&stale).unwrap(), first);
    }

    #[test]
    fn test_svg_output_is_reproducible() {
        if !have_font() {
            return;
        }
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let first = generate_all_plots(a.path(), ImageFormat::Svg).unwrap();
        let second = generate_all_plots(b.path(), ImageFormat::Svg).unwrap();

        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(std::fs::read(x).unwrap(), std::fs::read(y).unwrap());
        }
        let price = std::fs::read_to_string(a.path().join("Price Function.svg")).unwrap();
        assert!(price.contains("Price Function"));
        assert!(price.contains("Total VMs Allocated"));
    }
}
