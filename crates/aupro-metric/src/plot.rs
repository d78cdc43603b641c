//! Curve figures for metric reporting.
//!
//! Metrics describe what to draw with a [`CurvePlot`] and hand it to any
//! [`CurveRenderer`]. [`RasterCurveRenderer`] is a small renderer that draws into an
//! in-memory RGB image; labels and the title travel alongside the pixels in
//! [`RasterFigure`] for the caller's logger to attach.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut},
    rect::Rect,
};

use crate::error::{AuproError, AuproResult};

/// Curves with more points than this are thinned before drawing.
pub const DEFAULT_SAMPLE_POINTS: usize = 1000;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const CURVE: Rgb<u8> = Rgb([255, 140, 0]);

/// Corner of the axes holding the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendLocation {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl LegendLocation {
    /// The matplotlib-style name of the location, e.g. `"lower right"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpperLeft => "upper left",
            Self::UpperRight => "upper right",
            Self::LowerLeft => "lower left",
            Self::LowerRight => "lower right",
        }
    }
}

/// Everything needed to draw a single labelled curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePlot {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Area reported in the legend.
    pub auc: f64,
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
    pub xlabel: String,
    pub ylabel: String,
    pub legend_location: LegendLocation,
    pub title: String,
}

impl CurvePlot {
    /// Legend entry for the curve.
    pub fn legend_label(&self) -> String {
        format!("AUC: {:.2}", self.auc)
    }
}

/// Thins a curve by a whole-number stride of `len / max_points`, keeping the first and last
/// point.
pub fn downsample(x: &[f64], y: &[f64], max_points: usize) -> (Vec<f64>, Vec<f64>) {
    if max_points == 0 || x.len() <= max_points {
        return (x.to_vec(), y.to_vec());
    }

    let interval = x.len() / max_points;
    let mut indices: Vec<usize> = (0..x.len()).step_by(interval).collect();
    if indices.last() != Some(&(x.len() - 1)) {
        indices.push(x.len() - 1);
    }

    indices.iter().map(|&i| (x[i], y[i])).unzip()
}

/// Turns a [`CurvePlot`] into a figure.
pub trait CurveRenderer {
    /// The rendered figure type.
    type Figure;

    /// Renders one plot. Every call produces a new figure.
    fn render(&self, plot: &CurvePlot) -> AuproResult<Self::Figure>;
}

/// A rendered curve with its annotations.
#[derive(Debug, Clone)]
pub struct RasterFigure {
    pub image: RgbImage,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub legend: String,
}

impl RasterFigure {
    /// Writes the figure image; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AuproResult<()> {
        self.image.save(&path).map_err(|e| AuproError::Render {
            reason: format!("cannot write '{}': {e}", path.as_ref().display()),
        })
    }
}

/// Draws curves into an RGB image with `imageproc`.
#[derive(Debug, Clone)]
pub struct RasterCurveRenderer {
    width: u32,
    height: u32,
    margin: u32,
}

impl Default for RasterCurveRenderer {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl RasterCurveRenderer {
    /// Creates a renderer producing `width x height` images.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            margin: 40,
        }
    }

    /// Sets the blank border around the axes.
    #[must_use]
    pub const fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    fn plot_area(&self) -> AuproResult<(u32, u32)> {
        let plot_width = self.width.saturating_sub(2 * self.margin);
        let plot_height = self.height.saturating_sub(2 * self.margin);
        if plot_width < 2 || plot_height < 2 {
            return Err(AuproError::Render {
                reason: format!(
                    "canvas {}x{} leaves no room inside a {} px margin",
                    self.width, self.height, self.margin
                ),
            });
        }
        Ok((plot_width, plot_height))
    }

    fn draw_legend(
        &self,
        canvas: &mut RgbImage,
        location: LegendLocation,
        plot_width: u32,
        plot_height: u32,
    ) {
        let (box_width, box_height) = (plot_width.min(60), plot_height.min(16));
        let inset = 6;
        let left = match location {
            LegendLocation::UpperLeft | LegendLocation::LowerLeft => self.margin + inset,
            LegendLocation::UpperRight | LegendLocation::LowerRight => {
                (self.margin + plot_width).saturating_sub(box_width + inset)
            }
        };
        let top = match location {
            LegendLocation::UpperLeft | LegendLocation::UpperRight => self.margin + inset,
            LegendLocation::LowerLeft | LegendLocation::LowerRight => {
                (self.margin + plot_height).saturating_sub(box_height + inset)
            }
        };

        let frame =
            Rect::at(left as i32, top as i32).of_size(box_width.max(1), box_height.max(1));
        draw_filled_rect_mut(canvas, frame, BACKGROUND);
        draw_hollow_rect_mut(canvas, frame, AXIS);

        let swatch_y = top as f32 + box_height as f32 / 2.0;
        let swatch = (left as f32 + 4.0, left as f32 + box_width as f32 / 2.0);
        draw_line_segment_mut(canvas, (swatch.0, swatch_y), (swatch.1, swatch_y), CURVE);
        draw_line_segment_mut(
            canvas,
            (swatch.0, swatch_y + 1.0),
            (swatch.1, swatch_y + 1.0),
            CURVE,
        );
    }
}

impl CurveRenderer for RasterCurveRenderer {
    type Figure = RasterFigure;

    fn render(&self, plot: &CurvePlot) -> AuproResult<RasterFigure> {
        let (plot_width, plot_height) = self.plot_area()?;
        let x_span = plot.xlim.1 - plot.xlim.0;
        let y_span = plot.ylim.1 - plot.ylim.0;
        if x_span <= 0.0 || y_span <= 0.0 {
            return Err(AuproError::Render {
                reason: format!("empty axis range x={:?} y={:?}", plot.xlim, plot.ylim),
            });
        }

        let mut canvas = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let to_pixel = |x: f64, y: f64| {
            let px = self.margin as f64 + (x - plot.xlim.0) / x_span * plot_width as f64;
            let py = (self.margin + plot_height) as f64
                - (y - plot.ylim.0) / y_span * plot_height as f64;
            (px as f32, py as f32)
        };

        let (xs, ys) = downsample(&plot.x, &plot.y, DEFAULT_SAMPLE_POINTS);
        let points: Vec<(f32, f32)> = xs.iter().zip(&ys).map(|(&x, &y)| to_pixel(x, y)).collect();
        for segment in points.windows(2) {
            let (start, end) = (segment[0], segment[1]);
            // 2 px line width
            draw_line_segment_mut(&mut canvas, start, end, CURVE);
            draw_line_segment_mut(
                &mut canvas,
                (start.0, start.1 - 1.0),
                (end.0, end.1 - 1.0),
                CURVE,
            );
        }

        let axes =
            Rect::at(self.margin as i32, self.margin as i32).of_size(plot_width, plot_height);
        draw_hollow_rect_mut(&mut canvas, axes, AXIS);
        self.draw_legend(&mut canvas, plot.legend_location, plot_width, plot_height);

        Ok(RasterFigure {
            image: canvas,
            title: plot.title.clone(),
            xlabel: plot.xlabel.clone(),
            ylabel: plot.ylabel.clone(),
            legend: plot.legend_label(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal_plot() -> CurvePlot {
        CurvePlot {
            x: vec![0.0, 0.5, 1.0],
            y: vec![0.0, 0.5, 1.0],
            auc: 0.5,
            xlim: (0.0, 1.0),
            ylim: (0.0, 1.0),
            xlabel: "x".to_owned(),
            ylabel: "y".to_owned(),
            legend_location: LegendLocation::LowerRight,
            title: "diagonal".to_owned(),
        }
    }

    #[test]
    fn downsample_keeps_endpoints() {
        let x: Vec<f64> = (0..2500).map(f64::from).collect();
        let y = x.clone();

        let (xs, ys) = downsample(&x, &y, 1000);

        assert!(xs.len() < x.len());
        assert_eq!(xs.first().copied(), Some(0.0));
        assert_eq!(xs.last().copied(), Some(2499.0));
        assert_eq!(xs, ys);
    }

    #[test]
    fn downsample_leaves_short_curves_alone() {
        let (xs, _) = downsample(&[0.0, 1.0], &[0.0, 1.0], 1000);
        assert_eq!(xs, vec![0.0, 1.0]);
    }

    #[test]
    fn render_draws_curve_and_keeps_annotations() {
        let figure = RasterCurveRenderer::new(200, 120)
            .with_margin(10)
            .render(&diagonal_plot())
            .unwrap();

        assert_eq!(figure.image.dimensions(), (200, 120));
        assert_eq!(figure.title, "diagonal");
        assert_eq!(figure.legend, "AUC: 0.50");

        let curve_pixels = figure.image.pixels().filter(|&&p| p == CURVE).count();
        assert!(curve_pixels > 100);
    }

    #[test]
    fn render_rejects_tiny_canvas() {
        let result = RasterCurveRenderer::new(20, 20).render(&diagonal_plot());
        assert!(matches!(result, Err(AuproError::Render { .. })));
    }

    #[test]
    fn render_rejects_empty_axis_range() {
        let mut plot = diagonal_plot();
        plot.xlim = (0.3, 0.3);

        let result = RasterCurveRenderer::default().render(&plot);
        assert!(matches!(result, Err(AuproError::Render { .. })));
    }

    #[test]
    fn saved_figure_can_be_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.png");

        let figure = RasterCurveRenderer::default().render(&diagonal_plot()).unwrap();
        figure.save(&path).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.width(), 640);
        assert_eq!(reloaded.height(), 480);
    }

    #[test]
    fn legend_location_names_match_plotting_conventions() {
        assert_eq!(LegendLocation::LowerRight.as_str(), "lower right");
        assert_eq!(LegendLocation::UpperLeft.as_str(), "upper left");
    }
}
