//! Deviation Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::Theme;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::report::write_report;
use crate::service::{DashboardService, DashboardView, RangeRequest};
use egui::{SidePanel, Visuals};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info, warn};

/// Request result from background thread
enum RequestResult {
    Complete(Box<DashboardView>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    service: DashboardService,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async request
    request_rx: Option<Receiver<RequestResult>>,
    is_running: bool,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, service: DashboardService) -> Self {
        let theme = service.config().theme;
        apply_theme(&cc.egui_ctx, theme);

        let mut app = Self {
            control_panel: ControlPanel::new(service.data_path().to_path_buf(), theme),
            chart_viewer: ChartViewer::new(),
            service,
            request_rx: None,
            is_running: false,
        };
        app.start_request(RangeRequest::full());
        app
    }

    /// Run one request in a background thread
    fn start_request(&mut self, request: RangeRequest) {
        if self.is_running {
            return;
        }

        let (tx, rx) = channel();
        self.request_rx = Some(rx);
        self.is_running = true;
        self.control_panel.busy = true;
        self.control_panel.set_progress(10.0, "Loading data...");

        let service = self.service.clone();
        thread::spawn(move || {
            let result = match service.handle(&request) {
                Ok(view) => RequestResult::Complete(Box::new(view)),
                Err(e) => {
                    error!(path = %service.data_path().display(), error = %e, "request failed");
                    RequestResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for request results
    fn check_request_results(&mut self) {
        let rx = self.request_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    RequestResult::Complete(view) => {
                        self.control_panel.update_range(
                            &view.min_date,
                            &view.max_date,
                            &view.start_date,
                            &view.end_date,
                        );
                        let status = if view.range_applied {
                            format!("Complete! {} records in range", view.records.len())
                        } else {
                            "Complete! Date range not recognised, showing all records".to_string()
                        };
                        self.control_panel.set_progress(100.0, &status);
                        self.chart_viewer.set_view(*view);
                        self.finish_request();
                        should_keep_receiver = false;
                    }
                    RequestResult::Error(error) => {
                        self.chart_viewer.clear();
                        self.control_panel.has_view = false;
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.finish_request();
                        should_keep_receiver = false;
                    }
                }
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.request_rx = Some(rx);
            }
        }
    }

    fn finish_request(&mut self) {
        self.is_running = false;
        self.control_panel.busy = false;
    }

    /// Handle data file selection
    fn handle_browse_data(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "ods", "csv"])
            .pick_file()
        {
            info!(path = %path.display(), "data source selected");
            self.service.set_data_path(path.clone());
            self.control_panel.data_path = path;
            self.control_panel.reset_range();
            self.chart_viewer.clear();
            self.start_request(RangeRequest::full());
        }
    }

    fn handle_apply(&mut self) {
        let request = RangeRequest::new(
            self.control_panel.start_request(),
            self.control_panel.end_request(),
        );
        self.start_request(request);
    }

    fn handle_reset_range(&mut self) {
        self.control_panel.reset_range();
        self.start_request(RangeRequest::full());
    }

    /// Write the displayed view to a standalone HTML file
    fn handle_export_html(&mut self) {
        let Some(view) = self.chart_viewer.view() else {
            self.control_panel.set_progress(0.0, "Nothing to export");
            return;
        };

        let output_path: PathBuf = match rfd::FileDialog::new()
            .add_filter("HTML", &["html"])
            .set_file_name("dashboard_report.html")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        self.control_panel.set_progress(50.0, "Rendering report...");
        match write_report(view, &output_path, self.control_panel.theme) {
            Ok(()) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Report exported: {}", output_path.display()),
                );
                if self.control_panel.open_after_export {
                    if let Err(e) = open::that(&output_path) {
                        warn!(path = %output_path.display(), error = %e, "could not open report");
                    }
                }
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn handle_toggle_theme(&mut self, ctx: &egui::Context) {
        self.control_panel.theme = self.control_panel.theme.toggled();
        apply_theme(ctx, self.control_panel.theme);
    }
}

fn apply_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_visuals(match theme {
        Theme::Light => Visuals::light(),
        Theme::Dark => Visuals::dark(),
    });
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_request_results();

        // Request repaint while a request is running
        if self.is_running {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseData => self.handle_browse_data(),
                        ControlPanelAction::Apply => self.handle_apply(),
                        ControlPanelAction::ResetRange => self.handle_reset_range(),
                        ControlPanelAction::ExportHtml => self.handle_export_html(),
                        ControlPanelAction::ToggleTheme => self.handle_toggle_theme(ctx),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
