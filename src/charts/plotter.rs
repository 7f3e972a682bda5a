//! Chart Plotter Module
//! Creates interactive dashboard charts using egui_plot.

use crate::charts::palette::{self, Rgb};
use crate::stats::{CorrelationMatrix, EmploymentBreakdown, Histogram, ScatterSeries, TrackIncome};
use egui::{Align2, Color32, FontId, RichText, Sense};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, PlotPoints, Points, Text};

pub const CHART_HEIGHT: f32 = 400.0;

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Creates dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Grid marks on every category index so each gets a label.
    fn category_marks(count: usize) -> Vec<GridMark> {
        (0..count)
            .map(|i| GridMark {
                value: i as f64,
                step_size: 1.0,
            })
            .collect()
    }

    /// Category name at an integer axis position, empty elsewhere.
    pub fn category_label(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Average freelance income per track. With `value_labels`, each bar
    /// carries its value to two decimals and its own series color.
    pub fn draw_income_bar(
        ui: &mut egui::Ui,
        id: &str,
        income: &[TrackIncome],
        value_labels: bool,
    ) {
        if income.is_empty() {
            Self::draw_empty(ui, "No freelancer income for this selection");
            return;
        }

        let labels: Vec<String> = income.iter().map(|t| t.track.clone()).collect();
        let count = labels.len();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .allow_drag(false)
            .include_y(0.0)
            .x_axis_label("Track")
            .y_axis_label("Average Freelance Income (USD)")
            .x_grid_spacer(move |_input| Self::category_marks(count))
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = income
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        let color = if value_labels {
                            to_color32(palette::series_color(i))
                        } else {
                            to_color32(palette::ACCENT)
                        };
                        Bar::new(i as f64, t.avg_income)
                            .width(0.6)
                            .name(&t.track)
                            .fill(color)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name("Average income"));

                if value_labels {
                    for (i, t) in income.iter().enumerate() {
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(i as f64, t.avg_income),
                                RichText::new(format!("{:.2}", t.avg_income)).size(14.0),
                            )
                            .anchor(Align2::CENTER_BOTTOM),
                        );
                    }
                }
            });
    }

    /// Distribution of exam scores.
    pub fn draw_exam_histogram(ui: &mut egui::Ui, histogram: &Histogram) {
        if histogram.bins.is_empty() {
            Self::draw_empty(ui, "No exam scores");
            return;
        }

        Plot::new("exam_histogram")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Exam Score")
            .y_axis_label("Number of Students")
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = histogram
                    .bins
                    .iter()
                    .map(|bin| {
                        Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64)
                            .width((bin.upper - bin.lower) * 0.95)
                            .name(format!("{:.1} – {:.1}", bin.lower, bin.upper))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(to_color32(palette::ACCENT))
                        .name("Students"),
                );
            });
    }

    /// Attendance vs exam score, one colored series per track.
    pub fn draw_attendance_scatter(ui: &mut egui::Ui, series: &[ScatterSeries]) {
        if series.is_empty() {
            Self::draw_empty(ui, "No attendance/score pairs");
            return;
        }

        Plot::new("attendance_scatter")
            .height(CHART_HEIGHT + 50.0)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Attendance Rate (%)")
            .y_axis_label("Exam Score")
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    let points: PlotPoints = s.points.iter().copied().collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(4.0)
                            .color(to_color32(palette::series_color(i)).gamma_multiply(0.7))
                            .name(&s.track),
                    );
                }
            });
    }

    /// Stacked bars of employment status counts per track.
    pub fn draw_employment_bars(ui: &mut egui::Ui, breakdown: &EmploymentBreakdown) {
        if breakdown.tracks.is_empty() {
            Self::draw_empty(ui, "No employment data");
            return;
        }

        let labels = breakdown.tracks.clone();
        let count = labels.len();

        Plot::new("employment_by_track")
            .height(CHART_HEIGHT + 50.0)
            .allow_scroll(false)
            .allow_drag(false)
            .include_y(0.0)
            .legend(Legend::default())
            .x_axis_label("Track")
            .y_axis_label("Number of Students")
            .x_grid_spacer(move |_input| Self::category_marks(count))
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let mut stacked: Vec<BarChart> = Vec::new();

                for (s_idx, status) in breakdown.statuses.iter().enumerate() {
                    let bars: Vec<Bar> = breakdown
                        .counts
                        .iter()
                        .enumerate()
                        .map(|(t_idx, row)| {
                            Bar::new(t_idx as f64, row[s_idx] as f64)
                                .width(0.6)
                                .name(format!("{} / {}", breakdown.tracks[t_idx], status))
                        })
                        .collect();

                    let below: Vec<&BarChart> = stacked.iter().collect();
                    let chart = BarChart::new(bars)
                        .color(to_color32(palette::series_color(s_idx)))
                        .name(status)
                        .stack_on(&below);
                    stacked.push(chart);
                }

                for chart in stacked {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Correlation heatmap painted as a grid of labelled cells.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        if matrix.is_empty() {
            Self::draw_empty(ui, "No numeric columns");
            return;
        }

        let n = matrix.columns.len();
        let label_margin = 190.0;
        let bottom_margin = 24.0;
        let size = (ui.available_width() - label_margin).clamp(200.0, 600.0);
        let cell = size / n as f32;

        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(label_margin + size, size + bottom_margin),
            Sense::hover(),
        );
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();
        let origin = rect.min + egui::vec2(label_margin, 0.0);

        for row in 0..n {
            painter.text(
                egui::pos2(origin.x - 8.0, origin.y + (row as f32 + 0.5) * cell),
                Align2::RIGHT_CENTER,
                &matrix.columns[row],
                FontId::proportional(12.0),
                text_color,
            );

            for col in 0..n {
                let value = matrix.get(row, col);
                let fill = palette::heat_color(value);
                let cell_rect = egui::Rect::from_min_size(
                    origin + egui::vec2(col as f32 * cell, row as f32 * cell),
                    egui::vec2(cell, cell),
                );
                painter.rect_filled(cell_rect.shrink(1.0), 2.0, to_color32(fill));

                let label = value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v));
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    label,
                    FontId::proportional(11.0),
                    to_color32(palette::contrast_text(fill)),
                );
            }
        }

        // Column indices along the bottom; names are on the rows
        for col in 0..n {
            painter.text(
                egui::pos2(origin.x + (col as f32 + 0.5) * cell, origin.y + size + 4.0),
                Align2::CENTER_TOP,
                format!("{}", col + 1),
                FontId::proportional(11.0),
                text_color,
            );
        }

        if let Some(pos) = response.hover_pos() {
            let local = pos - origin;
            if local.x >= 0.0 && local.y >= 0.0 && local.x < size && local.y < size {
                let (row, col) = ((local.y / cell) as usize, (local.x / cell) as usize);
                if row < n && col < n {
                    let value = matrix
                        .get(row, col)
                        .map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v));
                    response.on_hover_text(format!(
                        "{} × {}: {}",
                        matrix.columns[row], matrix.columns[col], value
                    ));
                }
            }
        }
    }

    fn draw_empty(ui: &mut egui::Ui, message: &str) {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(message).size(14.0).color(Color32::GRAY));
        });
        ui.add_space(20.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        let labels = vec!["Data".to_string(), "Web".to_string()];
        assert_eq!(ChartPlotter::category_label(&labels, 0.0), "Data");
        assert_eq!(ChartPlotter::category_label(&labels, 1.0), "Web");
        assert_eq!(ChartPlotter::category_label(&labels, 0.5), "");
        assert_eq!(ChartPlotter::category_label(&labels, 2.0), "");
        assert_eq!(ChartPlotter::category_label(&labels, -1.0), "");
    }

    #[test]
    fn test_category_marks() {
        let marks = ChartPlotter::category_marks(3);
        let values: Vec<f64> = marks.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
    }
}
