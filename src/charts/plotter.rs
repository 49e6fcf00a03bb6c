//! Chart Plotter Module
//! Chart data shared by both front ends, and the interactive egui_plot charts.

use crate::data::Record;
use crate::stats::{DeviationStats, Summary};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

pub const EMPTY_CHART_MESSAGE: &str = "No data to display.";

/// Planned series colour (blue).
pub const PLANNED_COLOR: Color32 = Color32::from_rgb(52, 152, 219);
/// Actual series colour (red).
pub const ACTUAL_COLOR: Color32 = Color32::from_rgb(231, 76, 60);
/// Deviation boxes.
pub const DEVIATION_COLORS: [Color32; 2] = [
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(26, 188, 156), // Teal
];

/// Degrees per pie segment when a slice is split into convex pieces.
const PIE_SEGMENT_DEG: f64 = 5.0;

/// The five dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    ProductionTrend,
    QualityTrend,
    DeviationBoxes,
    ProductionPie,
    QualityPie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::ProductionTrend,
        ChartKind::QualityTrend,
        ChartKind::DeviationBoxes,
        ChartKind::ProductionPie,
        ChartKind::QualityPie,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::ProductionTrend => "Planned vs Actual Production",
            ChartKind::QualityTrend => "Planned vs Actual Quality",
            ChartKind::DeviationBoxes => "Deviation Analysis",
            ChartKind::ProductionPie => "Production Contribution",
            ChartKind::QualityPie => "Quality Contribution",
        }
    }

    /// Stable identifier for HTML anchors and plot ids.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::ProductionTrend => "production-chart",
            ChartKind::QualityTrend => "quality-chart",
            ChartKind::DeviationBoxes => "deviation-chart",
            ChartKind::ProductionPie => "production-pie",
            ChartKind::QualityPie => "quality-pie",
        }
    }
}

/// One planned/actual pair on the time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    /// Days from the Common Era epoch.
    pub x: f64,
    pub planned: f64,
    pub actual: f64,
}

/// A pie slice, angles in radians measured counter-clockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub label: &'static str,
    pub value: f64,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// Everything the charts need for one view.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub production: Vec<TrendPoint>,
    pub quality: Vec<TrendPoint>,
    pub production_deviations: Vec<f64>,
    pub quality_deviations: Vec<f64>,
    pub production_stats: DeviationStats,
    pub quality_stats: DeviationStats,
    pub production_totals: [f64; 2],
    pub quality_totals: [f64; 2],
}

impl ChartData {
    /// Trend series are ordered oldest first regardless of input order.
    pub fn from_records(records: &[Record], summary: &Summary) -> Self {
        let mut ordered: Vec<&Record> = records.iter().collect();
        ordered.sort_by_key(|r| r.date);

        let production = ordered
            .iter()
            .map(|r| TrendPoint {
                x: day_number(r.date),
                planned: r.planned_production,
                actual: r.actual_production,
            })
            .collect();
        let quality = ordered
            .iter()
            .map(|r| TrendPoint {
                x: day_number(r.date),
                planned: r.planned_quality,
                actual: r.actual_quality,
            })
            .collect();

        Self {
            production,
            quality,
            production_deviations: ordered.iter().map(|r| r.production_deviation).collect(),
            quality_deviations: ordered.iter().map(|r| r.quality_deviation).collect(),
            production_stats: summary.production_deviation.clone(),
            quality_stats: summary.quality_deviation.clone(),
            production_totals: [
                summary.total_planned_production,
                summary.total_actual_production,
            ],
            quality_totals: [summary.total_planned_quality, summary.total_actual_quality],
        }
    }
}

/// Map a date onto the numeric x axis.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Axis label for an x value; empty for values between days.
pub fn format_day(x: f64) -> String {
    if (x - x.round()).abs() > 1e-6 {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Planned/actual slices starting at twelve o'clock, running clockwise.
pub fn pie_slices(totals: [f64; 2]) -> Vec<PieSlice> {
    let sum: f64 = totals.iter().map(|v| v.max(0.0)).sum();
    if sum <= 0.0 {
        return Vec::new();
    }

    let mut angle = FRAC_PI_2;
    ["Planned", "Actual"]
        .iter()
        .zip(totals)
        .map(|(&label, value)| {
            let fraction = value.max(0.0) / sum;
            let start_angle = angle;
            angle -= fraction * TAU;
            PieSlice {
                label,
                value,
                fraction,
                start_angle,
                end_angle: angle,
            }
        })
        .collect()
}

/// Points along an arc from `start` to `end` (radians), endpoints included.
pub fn arc_points(center: (f64, f64), radius: f64, start: f64, end: f64) -> Vec<(f64, f64)> {
    let steps = (((start - end).abs().to_degrees() / PIE_SEGMENT_DEG).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let t = start + (end - start) * i as f64 / steps as f64;
            (center.0 + radius * t.cos(), center.1 + radius * t.sin())
        })
        .collect()
}

/// Creates the interactive dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Calculate beeswarm positions for points with duplicate values.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];

        // Round values and find duplicates
        let precision = 1e6;
        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();

        for (i, &y) in y_values.iter().enumerate() {
            let key = (y * precision).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        // Spread duplicates symmetrically
        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    /// Placeholder shown instead of a chart when the range is empty.
    pub fn draw_empty(ui: &mut egui::Ui) {
        ui.label(RichText::new(EMPTY_CHART_MESSAGE).italics().color(Color32::GRAY));
    }

    /// Planned vs actual line chart with markers.
    pub fn draw_trend_chart(ui: &mut egui::Ui, kind: ChartKind, points: &[TrendPoint]) {
        let (planned_name, actual_name) = match kind {
            ChartKind::QualityTrend => ("Planned_Quality", "Actual_Quality"),
            _ => ("Planned_Production", "Actual_Production"),
        };

        Plot::new(kind.slug())
            .height(260.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .x_axis_formatter(|mark, _range| format_day(mark.value))
            .label_formatter(|name, value| {
                let day = format_day(value.x.round());
                if name.is_empty() {
                    day
                } else {
                    format!("{}\n{}: {:.2}", day, name, value.y)
                }
            })
            .show(ui, |plot_ui| {
                for (name, color, pick) in [
                    (planned_name, PLANNED_COLOR, true),
                    (actual_name, ACTUAL_COLOR, false),
                ] {
                    let series: Vec<[f64; 2]> = points
                        .iter()
                        .map(|p| [p.x, if pick { p.planned } else { p.actual }])
                        .collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(series.iter().copied()))
                            .color(color)
                            .width(1.5)
                            .name(name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(series.iter().copied()))
                            .radius(3.0)
                            .color(color)
                            .name(name),
                    );
                }
            });
    }

    /// Production and quality deviation box plots, side by side.
    pub fn draw_deviation_chart(ui: &mut egui::Ui, data: &ChartData) {
        let panels = [
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

        ui.columns(2, |columns| {
            for (idx, (name, values, stats)) in panels.into_iter().enumerate() {
                let ui = &mut columns[idx];
                let color = DEVIATION_COLORS[idx];
                ui.label(RichText::new(name).strong());

                Plot::new(format!("deviation_{}", idx))
                    .height(260.0)
                    .allow_scroll(false)
                    .show_x(false)
                    .x_axis_formatter(|_mark, _range| String::new())
                    .show(ui, |plot_ui| {
                        if stats.count == 0 {
                            return;
                        }

                        let box_elem = BoxElem::new(
                            0.0,
                            BoxSpread::new(
                                stats.whisker_low,
                                stats.q1,
                                stats.median,
                                stats.q3,
                                stats.whisker_high,
                            ),
                        )
                        .box_width(0.5)
                        .fill(color.gamma_multiply(0.3))
                        .stroke(egui::Stroke::new(1.5, color));
                        plot_ui.box_plot(BoxPlot::new(vec![box_elem]).name(name));

                        let x_positions = Self::beeswarm_positions(values, 0.0, 0.35);
                        let points: PlotPoints = x_positions
                            .iter()
                            .zip(values.iter())
                            .map(|(&x, &y)| [x, y])
                            .collect();
                        plot_ui.points(
                            Points::new(points)
                                .radius(2.5)
                                .color(color.gamma_multiply(0.7))
                                .name(format!("{} points", name)),
                        );
                    });
            }
        });
    }

    /// Planned vs actual contribution pie; `hole` > 0 draws a donut.
    pub fn draw_pie_chart(ui: &mut egui::Ui, kind: ChartKind, totals: [f64; 2], hole: f64) {
        let slices = pie_slices(totals);

        Plot::new(kind.slug())
            .height(260.0)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .include_x(-1.6)
            .include_x(1.6)
            .include_y(-1.3)
            .include_y(1.3)
            .show(ui, |plot_ui| {
                for (slice, color) in slices.iter().zip([PLANNED_COLOR, ACTUAL_COLOR]) {
                    // egui fills convex shapes only, so each slice is drawn in narrow pieces.
                    let outer = arc_points((0.0, 0.0), 1.0, slice.start_angle, slice.end_angle);
                    let inner = arc_points((0.0, 0.0), hole, slice.start_angle, slice.end_angle);
                    for i in 0..outer.len().saturating_sub(1) {
                        let piece = vec![
                            [inner[i].0, inner[i].1],
                            [outer[i].0, outer[i].1],
                            [outer[i + 1].0, outer[i + 1].1],
                            [inner[i + 1].0, inner[i + 1].1],
                        ];
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(piece))
                                .fill_color(color)
                                .stroke(egui::Stroke::new(0.5, color))
                                .name(slice.label),
                        );
                    }

                    let mid = slice.mid_angle();
                    plot_ui.text(Text::new(
                        PlotPoint::new(1.3 * mid.cos(), 1.15 * mid.sin()),
                        format!("{} {:.1}%", slice.label, slice.fraction * 100.0),
                    ));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsCalculator;

    #[test]
    fn test_day_number_round_trip_label() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format_day(day_number(date)), "2024-02-29");
        assert_eq!(format_day(day_number(date) + 0.5), "");
    }

    #[test]
    fn test_pie_slices_cover_full_circle() {
        let slices = pie_slices([30.0, 10.0]);
        assert_eq!(slices.len(), 2);
        assert!((slices[0].fraction - 0.75).abs() < 1e-12);
        assert!((slices[0].start_angle - FRAC_PI_2).abs() < 1e-12);
        assert!((slices[1].end_angle - (FRAC_PI_2 - TAU)).abs() < 1e-12);
        assert_eq!(slices[0].end_angle, slices[1].start_angle);
    }

    #[test]
    fn test_pie_slices_empty_when_nothing_to_show() {
        assert!(pie_slices([0.0, 0.0]).is_empty());
        assert!(pie_slices([-1.0, -2.0]).is_empty());
    }

    #[test]
    fn test_arc_points_endpoints() {
        let pts = arc_points((0.0, 0.0), 2.0, 0.0, FRAC_PI_2);
        let first = pts[0];
        let last = pts[pts.len() - 1];
        assert!((first.0 - 2.0).abs() < 1e-12 && first.1.abs() < 1e-12);
        assert!(last.0.abs() < 1e-12 && (last.1 - 2.0).abs() < 1e-12);
        assert_eq!(pts.len(), 19);
    }

    #[test]
    fn test_chart_data_orders_oldest_first() {
        let records = vec![
            Record::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 1.0, 2.0, 3.0, 4.0),
            Record::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 5.0, 4.0, 3.0, 2.0),
        ];
        let summary = StatsCalculator::summarize(&records).unwrap();
        let data = ChartData::from_records(&records, &summary);

        assert!(data.production[0].x < data.production[1].x);
        assert_eq!(data.production[0].planned, 5.0);
        assert_eq!(data.production_deviations, vec![-1.0, 1.0]);
        assert_eq!(data.production_totals, [6.0, 6.0]);
    }

    #[test]
    fn test_beeswarm_spreads_duplicates() {
        let positions = ChartPlotter::beeswarm_positions(&[1.0, 1.0, 2.0], 0.0, 0.4);
        assert_eq!(positions[2], 0.0);
        assert!((positions[0] + 0.2).abs() < 1e-12);
        assert!((positions[1] - 0.2).abs() < 1e-12);
    }
}
