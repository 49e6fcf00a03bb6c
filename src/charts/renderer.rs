//! Static Chart Renderer
//! Draws the dashboard charts as standalone SVG documents with plotters,
//! for embedding in the HTML report.
//!
//! Layout per chart:
//! 1. Caption centered at the top
//! 2. Trend charts: planned/actual lines with markers and a legend box
//! 3. Deviation chart: two box plots with the raw points overlaid
//! 4. Contribution charts: pie (production) or donut (quality) with percentages

use crate::charts::plotter::{arc_points, format_day, pie_slices, ChartData, ChartKind, TrendPoint};
use crate::charts::ChartPlotter;
use crate::stats::DeviationStats;
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

const PLANNED: RGBColor = RGBColor(52, 152, 219);
const ACTUAL: RGBColor = RGBColor(231, 76, 60);
const DEVIATION: [RGBColor; 2] = [RGBColor(155, 89, 182), RGBColor(26, 188, 156)];

pub const CHART_SIZE: (u32, u32) = (720, 420);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart in parallel, in `ChartKind::ALL` order.
    pub fn render_all(data: &ChartData) -> Vec<(ChartKind, Result<String, RenderError>)> {
        ChartKind::ALL
            .par_iter()
            .map(|&kind| (kind, Self::render_svg(kind, data, CHART_SIZE)))
            .collect()
    }

    /// Render one chart to an SVG string.
    pub fn render_svg(
        kind: ChartKind,
        data: &ChartData,
        size: (u32, u32),
    ) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            match kind {
                ChartKind::ProductionTrend => Self::draw_trend(
                    &root,
                    kind.title(),
                    &data.production,
                    ("Planned_Production", "Actual_Production"),
                )?,
                ChartKind::QualityTrend => Self::draw_trend(
                    &root,
                    kind.title(),
                    &data.quality,
                    ("Planned_Quality", "Actual_Quality"),
                )?,
                ChartKind::DeviationBoxes => Self::draw_deviations(&root, data)?,
                ChartKind::ProductionPie => {
                    Self::draw_pie(&root, kind.title(), data.production_totals, 0.0)?
                }
                ChartKind::QualityPie => {
                    Self::draw_pie(&root, kind.title(), data.quality_totals, 0.3)?
                }
            }

            root.present().map_err(draw_err)?;
        }
        Ok(svg)
    }

    fn draw_trend(
        root: &Area,
        title: &str,
        points: &[TrendPoint],
        names: (&str, &str),
    ) -> Result<(), RenderError> {
        let (x_min, x_max) = padded_range(points.iter().map(|p| p.x), 0.5);
        let (y_min, y_max) = padded_range(
            points.iter().flat_map(|p| [p.planned, p.actual]),
            0.1,
        );

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|x| format_day(x.round()))
            .x_desc("Date")
            .draw()
            .map_err(draw_err)?;

        for (name, color, pick) in [(names.0, PLANNED, true), (names.1, ACTUAL, false)] {
            let series: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (p.x, if pick { p.planned } else { p.actual }))
                .collect();

            chart
                .draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))
                .map_err(draw_err)?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart
                .draw_series(
                    series
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )
                .map_err(draw_err)?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_deviations(root: &Area, data: &ChartData) -> Result<(), RenderError> {
        let root = root
            .titled(ChartKind::DeviationBoxes.title(), ("sans-serif", 20))
            .map_err(draw_err)?;
        let panels = root.split_evenly((1, 2));

        let series = [
            (
                "Production Deviation",
                &data.production_deviations,
                &data.production_stats,
            ),
            (
                "Quality Deviation",
                &data.quality_deviations,
                &data.quality_stats,
            ),
        ];

        for (idx, (panel, (name, values, stats))) in panels.iter().zip(series).enumerate() {
            Self::draw_box(panel, name, values, stats, DEVIATION[idx])?;
        }
        Ok(())
    }

    fn draw_box(
        area: &Area,
        name: &str,
        values: &[f64],
        stats: &DeviationStats,
        color: RGBColor,
    ) -> Result<(), RenderError> {
        let (y_min, y_max) = padded_range(values.iter().copied(), 0.1);

        let mut chart = ChartBuilder::on(area)
            .caption(name, ("sans-serif", 15))
            .margin(10)
            .x_label_area_size(10)
            .y_label_area_size(55)
            .build_cartesian_2d(-1.0f64..1.0f64, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .draw()
            .map_err(draw_err)?;

        if stats.count == 0 {
            return Ok(());
        }

        let half = 0.25;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-half, stats.q1), (half, stats.q3)],
                color.mix(0.3).filled(),
            )))
            .map_err(draw_err)?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-half, stats.q1), (half, stats.q3)],
                color.stroke_width(2),
            )))
            .map_err(draw_err)?;

        let segments = [
            [(-half, stats.median), (half, stats.median)],
            [(0.0, stats.whisker_low), (0.0, stats.q1)],
            [(0.0, stats.q3), (0.0, stats.whisker_high)],
            [(-half / 2.0, stats.whisker_low), (half / 2.0, stats.whisker_low)],
            [(-half / 2.0, stats.whisker_high), (half / 2.0, stats.whisker_high)],
        ];
        chart
            .draw_series(
                segments
                    .iter()
                    .map(|seg| PathElement::new(seg.to_vec(), color.stroke_width(2))),
            )
            .map_err(draw_err)?;

        let xs = ChartPlotter::beeswarm_positions(values, 0.0, 0.35);
        chart
            .draw_series(
                xs.iter()
                    .zip(values)
                    .map(|(&x, &y)| Circle::new((x, y), 2, color.mix(0.7).filled())),
            )
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_pie(root: &Area, title: &str, totals: [f64; 2], hole: f64) -> Result<(), RenderError> {
        let root = root.titled(title, ("sans-serif", 20)).map_err(draw_err)?;
        let (width, height) = root.dim_in_pixel();
        let center = (width as f64 / 2.0, height as f64 / 2.0);
        let radius = (width.min(height) as f64 / 2.0 - 50.0).max(10.0);

        // Screen y grows downwards, so angles are mirrored.
        let to_px = |(x, y): (f64, f64)| (x.round() as i32, (2.0 * center.1 - y).round() as i32);

        for (slice, color) in pie_slices(totals).iter().zip([PLANNED, ACTUAL]) {
            let mut outline: Vec<(i32, i32)> = arc_points(center, radius, slice.start_angle, slice.end_angle)
                .into_iter()
                .map(to_px)
                .collect();
            let inner: Vec<(i32, i32)> = if hole > 0.0 {
                arc_points(center, radius * hole, slice.end_angle, slice.start_angle)
                    .into_iter()
                    .map(to_px)
                    .collect()
            } else {
                vec![to_px(center)]
            };
            outline.extend(inner);

            root.draw(&Polygon::new(outline.clone(), color.filled()))
                .map_err(draw_err)?;
            outline.push(outline[0]);
            root.draw(&PathElement::new(outline, WHITE.stroke_width(2)))
                .map_err(draw_err)?;

            let mid = slice.mid_angle();
            let label_at = to_px((
                center.0 + (radius + 18.0) * mid.cos(),
                center.1 + (radius + 18.0) * mid.sin(),
            ));
            let anchor_x = if mid.cos() < 0.0 { label_at.0 - 90 } else { label_at.0 };
            root.draw(&Text::new(
                format!("{} {:.1}%", slice.label, slice.fraction * 100.0),
                (anchor_x, label_at.1),
                ("sans-serif", 14).into_font().color(&BLACK),
            ))
            .map_err(draw_err)?;
        }

        for (idx, (label, color)) in [("Planned", PLANNED), ("Actual", ACTUAL)].iter().enumerate() {
            let y = 10 + idx as i32 * 20;
            root.draw(&Rectangle::new([(10, y), (24, y + 14)], color.filled()))
                .map_err(draw_err)?;
            root.draw(&Text::new(
                label.to_string(),
                (30, y),
                ("sans-serif", 13).into_font().color(&BLACK),
            ))
            .map_err(draw_err)?;
        }
        Ok(())
    }
}

/// Min/max of `values` widened by `pad` (a fraction of the span, or absolute
/// when all values are equal).
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span == 0.0 {
        let delta = if min == 0.0 { 1.0 } else { min.abs() * pad.max(0.1) };
        return (min - delta, max + delta);
    }
    (min - span * pad, max + span * pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range_spreads_span() {
        let (lo, hi) = padded_range([0.0, 10.0].into_iter(), 0.1);
        assert_eq!(lo, -1.0);
        assert_eq!(hi, 11.0);
    }

    #[test]
    fn test_padded_range_degenerate_inputs() {
        assert_eq!(padded_range(std::iter::empty(), 0.1), (0.0, 1.0));
        assert_eq!(padded_range([0.0].into_iter(), 0.1), (-1.0, 1.0));

        let (lo, hi) = padded_range([50.0, 50.0].into_iter(), 0.1);
        assert!(lo < 50.0 && hi > 50.0);

        assert_eq!(padded_range([f64::NAN, 2.0, 4.0].into_iter(), 0.0), (2.0, 4.0));
    }
}
