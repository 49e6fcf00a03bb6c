//! Chart Viewer Widget
//! Central scrollable panel: recommendations, summary metrics, the five
//! interactive charts and the table slides.

use crate::charts::{ChartData, ChartKind, ChartPlotter};
use crate::report::TableSlide;
use crate::service::DashboardView;
use crate::stats::{Summary, Trend};
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
/// Width of one chart card; cards wrap to as many columns as fit.
const CHART_WIDTH: f32 = 640.0;

/// Displays the last completed request.
#[derive(Default)]
pub struct ChartViewer {
    view: Option<DashboardView>,
    chart_data: Option<ChartData>,
    slide_index: usize,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    /// Replace the displayed view; the slide carousel restarts.
    pub fn set_view(&mut self, view: DashboardView) {
        self.chart_data = view
            .summary
            .as_ref()
            .map(|summary| ChartData::from_records(&view.records, summary));
        self.view = Some(view);
        self.slide_index = 0;
    }

    pub fn clear(&mut self) {
        self.view = None;
        self.chart_data = None;
        self.slide_index = 0;
    }

    pub fn next_slide(&mut self) {
        let count = self.slide_count();
        if count > 0 {
            self.slide_index = (self.slide_index + 1) % count;
        }
    }

    pub fn previous_slide(&mut self) {
        let count = self.slide_count();
        if count > 0 {
            self.slide_index = (self.slide_index + count - 1) % count;
        }
    }

    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    fn slide_count(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.table_slides.len())
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(view) = self.view.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let mut step: i32 = 0;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_header(ui, view);
                ui.add_space(CHART_SPACING);
                Self::draw_recommendations(ui, &view.recommendations);
                if let Some(summary) = &view.summary {
                    ui.add_space(CHART_SPACING);
                    Self::draw_metrics(ui, summary);
                }
                ui.add_space(CHART_SPACING);
                Self::draw_charts(ui, self.chart_data.as_ref());
                ui.add_space(CHART_SPACING);
                step = Self::draw_slides(ui, &view.table_slides, self.slide_index);
            });

        match step {
            1 => self.next_slide(),
            -1 => self.previous_slide(),
            _ => {}
        }
    }

    fn draw_header(ui: &mut egui::Ui, view: &DashboardView) {
        ui.label(
            RichText::new("Production & Quality Dashboard")
                .size(22.0)
                .strong(),
        );
        ui.label(
            RichText::new(format!(
                "Range {} to {}  ·  dataset {} to {}  ·  {} records ({} of {} rows loaded)",
                view.start_date,
                view.end_date,
                view.min_date,
                view.max_date,
                view.records.len(),
                view.load.kept_rows,
                view.load.total_rows,
            ))
            .size(12.0)
            .color(Color32::GRAY),
        );
        if !view.range_applied {
            ui.label(
                RichText::new("⚠ Date range not recognised; showing the full dataset")
                    .size(12.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
        }
    }

    fn draw_recommendations(ui: &mut egui::Ui, recommendations: &[String]) {
        Self::card(ui, |ui| {
            ui.label(RichText::new("💡 Recommendations").size(16.0).strong());
            ui.add_space(5.0);
            for recommendation in recommendations {
                ui.label(format!("• {}", recommendation));
            }
        });
    }

    fn draw_metrics(ui: &mut egui::Ui, summary: &Summary) {
        Self::card(ui, |ui| {
            ui.label(RichText::new("Summary").size(16.0).strong());
            ui.add_space(5.0);
            egui::Grid::new("summary_metrics")
                .num_columns(4)
                .spacing([30.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    ui.label("");
                    ui.label(RichText::new("Planned").strong());
                    ui.label(RichText::new("Actual").strong());
                    ui.label(RichText::new("Avg Deviation").strong());
                    ui.end_row();

                    let rows = [
                        (
                            "Production",
                            summary.total_planned_production,
                            summary.total_actual_production,
                            summary.mean_production_deviation,
                            summary.production_trend,
                        ),
                        (
                            "Quality",
                            summary.total_planned_quality,
                            summary.total_actual_quality,
                            summary.mean_quality_deviation,
                            summary.quality_trend,
                        ),
                    ];
                    for (name, planned, actual, mean, trend) in rows {
                        ui.label(name);
                        ui.label(format!("{:.2}", planned));
                        ui.label(format!("{:.2}", actual));
                        ui.label(RichText::new(format!("{:+.2}", mean)).color(trend_color(trend)));
                        ui.end_row();
                    }
                });
        });
    }

    fn draw_charts(ui: &mut egui::Ui, data: Option<&ChartData>) {
        let avail_width = ui.available_width();
        let num_columns = ((avail_width / (CHART_WIDTH + CHART_SPACING)).floor() as usize).max(1);

        for row in ChartKind::ALL.chunks(num_columns) {
            ui.horizontal_top(|ui| {
                for &kind in row {
                    Self::card(ui, |ui| {
                        ui.set_width(CHART_WIDTH - 24.0);
                        ui.label(RichText::new(kind.title()).size(15.0).strong());
                        ui.add_space(5.0);
                        match data {
                            Some(data) => Self::draw_chart(ui, kind, data),
                            None => ChartPlotter::draw_empty(ui),
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
            ui.add_space(CHART_SPACING);
        }
    }

    fn draw_chart(ui: &mut egui::Ui, kind: ChartKind, data: &ChartData) {
        match kind {
            ChartKind::ProductionTrend => ChartPlotter::draw_trend_chart(ui, kind, &data.production),
            ChartKind::QualityTrend => ChartPlotter::draw_trend_chart(ui, kind, &data.quality),
            ChartKind::DeviationBoxes => ChartPlotter::draw_deviation_chart(ui, data),
            ChartKind::ProductionPie => {
                ChartPlotter::draw_pie_chart(ui, kind, data.production_totals, 0.0)
            }
            ChartKind::QualityPie => ChartPlotter::draw_pie_chart(ui, kind, data.quality_totals, 0.3),
        }
    }

    /// Returns -1/1 when a navigation button was clicked.
    fn draw_slides(ui: &mut egui::Ui, slides: &[TableSlide], index: usize) -> i32 {
        let mut step = 0;
        let Some(slide) = slides.get(index) else {
            return step;
        };

        Self::card(ui, |ui| {
            ui.horizontal(|ui| {
                if ui.button("◀").clicked() {
                    step = -1;
                }
                ui.label(format!("{} / {}", index + 1, slides.len()));
                if ui.button("▶").clicked() {
                    step = 1;
                }
                ui.add_space(10.0);
                ui.label(RichText::new(&slide.title).size(16.0).strong());
            });
            ui.add_space(8.0);

            if let Some(message) = &slide.message {
                ui.label(RichText::new(message).italics().color(Color32::GRAY));
                return;
            }

            egui::Grid::new(("table_slide", index))
                .striped(true)
                .spacing([24.0, 4.0])
                .show(ui, |ui| {
                    for header in &slide.headers {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();
                    for row in &slide.rows {
                        for cell in row {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
        });
        step
    }

    fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, add_contents);
    }
}

fn trend_color(trend: Trend) -> Color32 {
    match trend {
        Trend::AbovePlan => Color32::from_rgb(40, 167, 69),
        Trend::BelowPlan => Color32::from_rgb(220, 53, 69),
        Trend::OnPlan => Color32::GRAY,
    }
}
