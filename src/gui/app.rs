//! Dashboard Main Application
//! Main window with control panel and dashboard page.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::dashboard::{DashboardSnapshot, SnapshotOptions};
use crate::data::{DataLoader, StudentDataset, TrackFilter};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use tracing::{info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        dataset: StudentDataset,
        path: PathBuf,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    /// Create the app and start loading the configured CSV.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self::with_config(config);
        let path = app.config.csv_path.clone();
        app.start_load(path);
        app
    }

    /// App state for `config` with nothing loaded yet.
    fn with_config(config: DashboardConfig) -> Self {
        let mut control_panel = ControlPanel::new();
        control_panel.settings.scope_details = config.scope_details_to_track;
        if let Some(track) = &config.default_track {
            control_panel.settings.track_filter = TrackFilter::from_label(track);
        }

        Self {
            loader: DataLoader::new(),
            control_panel,
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            config,
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Load a CSV in a background thread
    fn start_load(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }

        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = DataLoader::read_csv(&path).and_then(StudentDataset::from_frame);
            let message = match result {
                Ok(dataset) => LoadResult::Complete { dataset, path },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(message);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { dataset, path }) => {
                info!(path = %path.display(), records = dataset.len(), "dataset loaded");
                self.control_panel
                    .update_tracks(dataset.tracks().to_vec(), dataset.len());
                self.control_panel.set_status(&format!(
                    "Loaded {} records, {} tracks",
                    dataset.len(),
                    dataset.tracks().len()
                ));
                self.control_panel.settings.csv_path = Some(path.clone());
                self.loader.set_dataset(dataset, path);
                self.is_loading = false;
                self.recompute();
            }
            Ok(LoadResult::Error(error)) => {
                warn!(%error, "csv load failed");
                self.control_panel.set_error(&error);
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.control_panel.set_error("CSV loader stopped unexpectedly");
                self.is_loading = false;
            }
        }
    }

    /// Rebuild the whole dashboard for the current filter.
    fn recompute(&mut self) {
        let Some(dataset) = self.loader.dataset() else {
            self.chart_viewer.clear();
            return;
        };

        let settings = &self.control_panel.settings;
        let options = SnapshotOptions {
            scope_details_to_track: settings.scope_details,
            ..SnapshotOptions::from_config(&self.config)
        };

        match DashboardSnapshot::compute(dataset, &settings.track_filter, &options) {
            Ok(snapshot) => self.chart_viewer.set_snapshot(snapshot),
            Err(e) => {
                warn!(error = %e, "dashboard computation failed");
                self.control_panel.set_error(&e.to_string());
            }
        }
    }

    /// Render the current dashboard to PNG files in a chosen folder.
    fn handle_export_png(&mut self) {
        let Some(snapshot) = &self.chart_viewer.snapshot else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        let renderer = StaticChartRenderer::new(self.config.export_width, self.config.export_height);
        match renderer.export(snapshot, &dir) {
            Ok(files) => {
                self.control_panel.set_status(&format!(
                    "Exported {} images to {}",
                    files.len(),
                    dir.display()
                ));
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.control_panel.set_error(&e.to_string());
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
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
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::ReloadCsv => {
                            let path = self
                                .loader
                                .file_path()
                                .or(self.control_panel.settings.csv_path.as_ref())
                                .cloned();
                            if let Some(path) = path {
                                self.start_load(path);
                            }
                        }
                        ControlPanelAction::FilterChanged => self.recompute(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};

    fn wait_for_load(app: &mut DashboardApp) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while app.is_loading && Instant::now() < deadline {
            app.check_load_results();
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!app.is_loading, "load did not finish");
    }

    fn write_csv(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(
            &path,
            "track,graduated_flag,attendance_rate,exams_score,employment_status,freelancing_income_usd_total\n\
             Web,1,0.9,80,Freelancer,1200\n\
             Data,0,0.6,65,Intern,0\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_failed_load_keeps_previous_file() {
        let good = write_csv("iti_app_failed_load.csv");
        let mut app = DashboardApp::with_config(DashboardConfig::default());

        app.start_load(good.clone());
        wait_for_load(&mut app);
        assert_eq!(app.control_panel.settings.csv_path.as_ref(), Some(&good));
        assert!(app.chart_viewer.snapshot.is_some());

        app.start_load(PathBuf::from("/nonexistent/students.csv"));
        wait_for_load(&mut app);
        assert!(app.control_panel.is_error);
        assert_eq!(app.control_panel.settings.csv_path.as_ref(), Some(&good));
        assert_eq!(app.loader.file_path(), Some(&good));
        assert!(app.chart_viewer.snapshot.is_some());

        let _ = fs::remove_file(good);
    }

    #[test]
    fn test_load_applies_default_track() {
        let path = write_csv("iti_app_default_track.csv");
        let config = DashboardConfig {
            default_track: Some("Web".to_string()),
            ..DashboardConfig::default()
        };
        let mut app = DashboardApp::with_config(config);

        app.start_load(path.clone());
        wait_for_load(&mut app);
        let snapshot = app.chart_viewer.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.filter_label, "Web");
        assert_eq!(snapshot.summary.record_count, 1);

        let _ = fs::remove_file(path);
    }
}
