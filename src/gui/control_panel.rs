//! Control Panel Widget
//! Left side panel with the data source, track filter and export controls.

use crate::data::{TrackFilter, ALL_TRACKS_LABEL};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// User choices for the current session only.
#[derive(Default, Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub track_filter: TrackFilter,
    pub scope_details: bool,
}

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub tracks: Vec<String>,
    pub record_count: usize,
    pub status: String,
    pub is_error: bool,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            tracks: Vec::new(),
            record_count: 0,
            status: "Ready".to_string(),
            is_error: false,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the selectable tracks after a load. A selected track that no
    /// longer exists falls back to "All Tracks".
    pub fn update_tracks(&mut self, tracks: Vec<String>, record_count: usize) {
        if let TrackFilter::Track(name) = &self.settings.track_filter {
            if !tracks.contains(name) {
                self.settings.track_filter = TrackFilter::All;
            }
        }
        self.tracks = tracks;
        self.record_count = record_count;
        self.export_enabled = record_count > 0;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🎓 ITI KPI Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(0x00, 0xCD, 0xAC)),
            );
            ui.label(RichText::new("Student outcomes").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                        if ui
                            .add_enabled(self.settings.csv_path.is_some(), egui::Button::new("⟳"))
                            .on_hover_text("Reload")
                            .clicked()
                        {
                            action = ControlPanelAction::ReloadCsv;
                        }
                    });
                });
                ui.label(
                    RichText::new(format!("{} records", self.record_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔎 Filter").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new("Choose Track :"));
            ComboBox::from_id_salt("track_filter")
                .width(150.0)
                .selected_text(self.settings.track_filter.label())
                .show_ui(ui, |ui| {
                    let options = std::iter::once(ALL_TRACKS_LABEL.to_string())
                        .chain(self.tracks.iter().cloned());
                    for label in options {
                        let filter = TrackFilter::from_label(&label);
                        if ui
                            .selectable_label(self.settings.track_filter == filter, &label)
                            .clicked()
                            && self.settings.track_filter != filter
                        {
                            self.settings.track_filter = filter;
                            action = ControlPanelAction::FilterChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);
        if ui
            .checkbox(
                &mut self.settings.scope_details,
                "Apply track to detailed visuals",
            )
            .changed()
        {
            action = ControlPanelAction::FilterChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = false;
    }

    pub fn set_error(&mut self, error: &str) {
        self.status = format!("Error: {}", error);
        self.is_error = true;
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    ReloadCsv,
    FilterChanged,
    ExportPng,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_tracks_resets_stale_selection() {
        let mut panel = ControlPanel::new();
        panel.settings.track_filter = TrackFilter::Track("Mobile".to_string());
        panel.update_tracks(vec!["Data".to_string(), "Web".to_string()], 10);
        assert_eq!(panel.settings.track_filter, TrackFilter::All);
        assert!(panel.export_enabled);

        panel.settings.track_filter = TrackFilter::Track("Web".to_string());
        panel.update_tracks(vec!["Web".to_string()], 3);
        assert_eq!(
            panel.settings.track_filter,
            TrackFilter::Track("Web".to_string())
        );
    }

    #[test]
    fn test_status_and_error() {
        let mut panel = ControlPanel::new();
        panel.set_error("file not found");
        assert!(panel.is_error);
        assert_eq!(panel.status, "Error: file not found");
        panel.set_status("Loaded");
        assert!(!panel.is_error);
    }
}
