//! Chart Viewer Widget
//! Central scrollable page with KPI cards and the dashboard charts.

use crate::charts::palette;
use crate::charts::{to_color32, ChartPlotter};
use crate::dashboard::DashboardSnapshot;
use crate::stats::KpiCard;
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 110.0;

/// Scrollable dashboard page for the latest snapshot.
#[derive(Default)]
pub struct ChartViewer {
    pub snapshot: Option<DashboardSnapshot>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn set_snapshot(&mut self, snapshot: DashboardSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(snapshot) = &self.snapshot else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("ITI Students KPI Dashboard").size(28.0).strong());
                ui.label(
                    RichText::new(format!(
                        "{} · {} records",
                        snapshot.filter_label, snapshot.summary.record_count
                    ))
                    .color(Color32::GRAY),
                );
                ui.add_space(CARD_SPACING);

                // ===== KPIs Section =====
                let cards = snapshot.summary.cards();
                let (first_row, second_row) = cards.split_at(3);
                Self::draw_card_row(ui, first_row);
                ui.add_space(CARD_SPACING);
                Self::draw_card_row(ui, second_row);
                ui.add_space(CARD_SPACING * 2.0);

                Self::subheader(ui, "Average Freelance Income by Track");
                ChartPlotter::draw_income_bar(ui, "income_headline", &snapshot.income_by_track, false);

                ui.add_space(CARD_SPACING);
                ui.separator();
                ui.heading(RichText::new("Detailed Analysis & Visuals").size(22.0));
                ui.label(
                    RichText::new(format!("Computed over: {}", snapshot.details_label))
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(CARD_SPACING);

                Self::subheader(ui, "Exam Score Distribution");
                ChartPlotter::draw_exam_histogram(ui, &snapshot.exam_histogram);

                Self::subheader(ui, "Attendance vs Exam Score");
                ChartPlotter::draw_attendance_scatter(ui, &snapshot.attendance_vs_exam);

                Self::subheader(ui, "Employment Status Distribution by Track");
                ChartPlotter::draw_employment_bars(ui, &snapshot.employment_by_track);

                Self::subheader(ui, "Average Freelance Income per Track");
                ChartPlotter::draw_income_bar(
                    ui,
                    "income_detail",
                    &snapshot.detail_income_by_track,
                    true,
                );

                Self::subheader(ui, "Correlation Between Numeric Features");
                ChartPlotter::draw_correlation_heatmap(ui, &snapshot.correlation);

                ui.add_space(CARD_SPACING);
                ui.separator();
                ui.label(
                    RichText::new("Dashboard created using egui | egui_plot | plotters")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });
    }

    fn subheader(ui: &mut egui::Ui, text: &str) {
        ui.add_space(CARD_SPACING);
        ui.label(RichText::new(text).size(18.0).strong());
        ui.add_space(5.0);
    }

    /// Cards share the row width equally.
    fn draw_card_row(ui: &mut egui::Ui, cards: &[KpiCard]) {
        ui.columns(cards.len(), |columns| {
            for (col, card) in columns.iter_mut().zip(cards) {
                Self::draw_card(col, card);
            }
        });
    }

    fn draw_card(ui: &mut egui::Ui, card: &KpiCard) {
        egui::Frame::none()
            .fill(to_color32(palette::CARD_FILL))
            .stroke(egui::Stroke::new(2.0, to_color32(palette::CARD_BORDER)))
            .rounding(8.0)
            .inner_margin(20.0)
            .show(ui, |ui| {
                ui.set_min_height(CARD_HEIGHT - 40.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new(card.title)
                            .size(19.0)
                            .strong()
                            .color(to_color32(palette::LIGHT_TEXT)),
                    );
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new(card.display_value())
                            .size(24.0)
                            .strong()
                            .color(to_color32(palette::ACCENT)),
                    );
                });
            });
    }
}
