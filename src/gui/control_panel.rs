//! Control Panel Widget
//! Left side panel with the data source, date range and export controls.

use crate::config::Theme;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Left side control panel with file selection and range controls.
pub struct ControlPanel {
    pub data_path: PathBuf,
    pub start_date: String,
    pub end_date: String,
    /// Dataset bounds from the last completed request.
    pub min_date: String,
    pub max_date: String,
    pub open_after_export: bool,
    pub theme: Theme,
    pub progress: f32,
    pub status: String,
    pub busy: bool,
    pub has_view: bool,
}

impl ControlPanel {
    pub fn new(data_path: PathBuf, theme: Theme) -> Self {
        Self {
            data_path,
            start_date: String::new(),
            end_date: String::new(),
            min_date: String::new(),
            max_date: String::new(),
            open_after_export: true,
            theme,
            progress: 0.0,
            status: "Ready".to_string(),
            busy: false,
            has_view: false,
        }
    }

    /// Record the bounds and applied range of a finished request.
    pub fn update_range(&mut self, min_date: &str, max_date: &str, start: &str, end: &str) {
        self.min_date = min_date.to_string();
        self.max_date = max_date.to_string();
        self.start_date = start.to_string();
        self.end_date = end.to_string();
        self.has_view = true;
    }

    /// Clear the typed boundaries so the next request covers everything.
    pub fn reset_range(&mut self) {
        self.start_date.clear();
        self.end_date.clear();
    }

    /// Typed boundary, `None` when the field is blank.
    pub fn start_request(&self) -> Option<String> {
        non_blank(&self.start_date)
    }

    pub fn end_request(&self) -> Option<String> {
        non_blank(&self.end_date)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Deviation Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Production & Quality")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = self
                        .data_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(name).size(12.0))
                        .on_hover_text(self.data_path.display().to_string());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(!self.busy, egui::Button::new("📂 Browse")).clicked() {
                            action = ControlPanelAction::BrowseData;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 80.0;
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start date:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.start_date)
                    .hint_text(self.min_date.as_str())
                    .desired_width(140.0),
            );
        });
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End date:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.end_date)
                    .hint_text(self.max_date.as_str())
                    .desired_width(140.0),
            );
        });

        if !self.min_date.is_empty() {
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!("Available: {} to {}", self.min_date, self.max_date))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                if ui.button("▶ Apply").clicked() {
                    action = ControlPanelAction::Apply;
                }
                if ui.button("↺ Full Range").clicked() {
                    action = ControlPanelAction::ResetRange;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.has_view && !self.busy, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export HTML").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportHtml;
                }
            });
            ui.checkbox(&mut self.open_after_export, "Open after export");

            ui.add_space(8.0);

            let label = match self.theme {
                Theme::Light => "🌙 Dark theme",
                Theme::Dark => "☀ Light theme",
            };
            if ui.button(label).clicked() {
                action = ControlPanelAction::ToggleTheme;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.busy),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.progress >= 100.0 {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseData,
    Apply,
    ResetRange,
    ExportHtml,
    ToggleTheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_request_full_range() {
        let mut panel = ControlPanel::new(PathBuf::from("datasets.xlsx"), Theme::Light);
        panel.start_date = "   ".to_string();
        panel.end_date = " 2024-01-31 ".to_string();

        assert_eq!(panel.start_request(), None);
        assert_eq!(panel.end_request().as_deref(), Some("2024-01-31"));
    }

    #[test]
    fn test_update_and_reset_range() {
        let mut panel = ControlPanel::new(PathBuf::from("datasets.xlsx"), Theme::Dark);
        assert!(!panel.has_view);

        panel.update_range("2024-01-01", "2024-01-31", "2024-01-05", "2024-01-10");
        assert!(panel.has_view);
        assert_eq!(panel.start_date, "2024-01-05");
        assert_eq!(panel.max_date, "2024-01-31");

        panel.reset_range();
        assert_eq!(panel.start_request(), None);
        assert_eq!(panel.end_request(), None);
        assert_eq!(panel.min_date, "2024-01-01");
    }
}
