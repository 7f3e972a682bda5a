//! Static Chart Renderer
//! Renders the dashboard to PNG images with plotters, then stitches them
//! into a single sheet with the image crate.
//!
//! Sheet layout:
//! 1. KPI card strip (full width)
//! 2. Income by track (filtered) | Exam score distribution
//! 3. Attendance vs exam score   | Employment status by track
//! 4. Income per track (details) | Correlation heatmap

use crate::charts::palette::{self, Rgb};
use crate::charts::ChartPlotter;
use crate::dashboard::DashboardSnapshot;
use crate::stats::{
    CorrelationMatrix, EmploymentBreakdown, Histogram, KpiSummary, ScatterSeries, TrackIncome,
};
use anyhow::{anyhow, Result};
use image::{imageops, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FONT: &str = "sans-serif";
const CARD_STRIP_HEIGHT: u32 = 260;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

pub struct StaticChartRenderer {
    width: u32,
    height: u32,
}

impl StaticChartRenderer {
    /// Renderer producing charts of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw into an in-memory RGB buffer and wrap it as an image.
    fn render<F>(&self, width: u32, height: u32, draw: F) -> Result<RgbImage>
    where
        F: FnOnce(&Area<'_>) -> Result<()>,
    {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| anyhow!("chart size {}x{} is too large", width, height))?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
        }
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| anyhow!("chart buffer does not match {}x{}", width, height))
    }

    fn chart<F>(&self, draw: F) -> Result<RgbImage>
    where
        F: FnOnce(&Area<'_>) -> Result<()>,
    {
        self.render(self.width, self.height, draw)
    }

    /// Render every chart of a snapshot, in sheet order with file stems.
    pub fn render_all(&self, snapshot: &DashboardSnapshot) -> Result<Vec<(&'static str, RgbImage)>> {
        let headline_title = format!("Average Freelance Income by Track ({})", snapshot.filter_label);
        let detail_scope = &snapshot.details_label;

        Ok(vec![
            (
                "kpi_cards",
                self.render(self.width * 2, CARD_STRIP_HEIGHT, |root| {
                    Self::draw_kpi_cards(root, &snapshot.summary, &snapshot.filter_label)
                })?,
            ),
            (
                "income_by_track",
                self.chart(|root| {
                    Self::draw_income_bar(root, &headline_title, &snapshot.income_by_track, false)
                })?,
            ),
            (
                "exam_distribution",
                self.chart(|root| {
                    Self::draw_exam_histogram(root, &snapshot.exam_histogram, detail_scope)
                })?,
            ),
            (
                "attendance_vs_exam",
                self.chart(|root| {
                    Self::draw_attendance_scatter(root, &snapshot.attendance_vs_exam, detail_scope)
                })?,
            ),
            (
                "employment_by_track",
                self.chart(|root| {
                    Self::draw_employment_bars(root, &snapshot.employment_by_track, detail_scope)
                })?,
            ),
            (
                "income_per_track",
                self.chart(|root| {
                    Self::draw_income_bar(
                        root,
                        &format!("Average Freelance Income per Track ({})", detail_scope),
                        &snapshot.detail_income_by_track,
                        true,
                    )
                })?,
            ),
            (
                "correlation_heatmap",
                self.chart(|root| Self::draw_heatmap(root, &snapshot.correlation, detail_scope))?,
            ),
        ])
    }

    /// Card strip on top, then the charts two per row.
    pub fn compose_sheet(&self, images: &[(&'static str, RgbImage)]) -> RgbImage {
        let chart_rows = images.len().saturating_sub(1).div_ceil(2) as u32;
        let mut sheet = RgbImage::from_pixel(
            self.width * 2,
            CARD_STRIP_HEIGHT + chart_rows * self.height,
            image::Rgb([255, 255, 255]),
        );

        let mut charts = images.iter();
        if let Some((_, cards)) = charts.next() {
            imageops::overlay(&mut sheet, cards, 0, 0);
        }
        for (idx, (_, chart)) in charts.enumerate() {
            let x = (idx % 2) as u32 * self.width;
            let y = CARD_STRIP_HEIGHT + (idx / 2) as u32 * self.height;
            imageops::overlay(&mut sheet, chart, x as i64, y as i64);
        }
        sheet
    }

    /// Write each chart plus `dashboard.png` into `out_dir`.
    pub fn export(&self, snapshot: &DashboardSnapshot, out_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;

        let images = self.render_all(snapshot)?;
        let mut written = Vec::with_capacity(images.len() + 1);

        for (stem, image) in &images {
            let path = out_dir.join(format!("{}.png", stem));
            image.save(&path)?;
            written.push(path);
        }

        let sheet_path = out_dir.join("dashboard.png");
        self.compose_sheet(&images).save(&sheet_path)?;
        written.push(sheet_path);

        info!(dir = %out_dir.display(), files = written.len(), "charts exported");
        Ok(written)
    }

    fn draw_message(root: &Area<'_>, title: &str, message: &str) -> Result<()> {
        let (w, h) = root.dim_in_pixel();
        let centered = Pos::new(HPos::Center, VPos::Center);
        root.draw(&Text::new(
            title.to_string(),
            (w as i32 / 2, 40),
            (FONT, 26).into_font().color(&BLACK).pos(centered),
        ))?;
        root.draw(&Text::new(
            message.to_string(),
            (w as i32 / 2, h as i32 / 2),
            (FONT, 20).into_font().color(&rgb(palette::CARD_FILL)).pos(centered),
        ))?;
        Ok(())
    }

    fn draw_kpi_cards(root: &Area<'_>, summary: &KpiSummary, filter_label: &str) -> Result<()> {
        let (w, _) = root.dim_in_pixel();
        let centered = Pos::new(HPos::Center, VPos::Center);

        root.draw(&Text::new(
            format!("ITI Students KPI Dashboard: {}", filter_label),
            (w as i32 / 2, 30),
            (FONT, 30).into_font().color(&BLACK).pos(centered),
        ))?;

        let cards = summary.cards();
        let gap = 20i32;
        let card_w = (w as i32 - gap * (cards.len() as i32 + 1)) / cards.len() as i32;
        let (top, card_h) = (70i32, 160i32);

        for (i, card) in cards.iter().enumerate() {
            let x0 = gap + i as i32 * (card_w + gap);
            let corners = [(x0, top), (x0 + card_w, top + card_h)];
            root.draw(&Rectangle::new(corners, rgb(palette::CARD_FILL).filled()))?;
            root.draw(&Rectangle::new(
                corners,
                rgb(palette::CARD_BORDER).stroke_width(3),
            ))?;

            let center_x = x0 + card_w / 2;
            root.draw(&Text::new(
                card.title.to_string(),
                (center_x, top + 50),
                (FONT, 22)
                    .into_font()
                    .color(&rgb(palette::LIGHT_TEXT))
                    .pos(centered),
            ))?;
            root.draw(&Text::new(
                card.display_value(),
                (center_x, top + 105),
                (FONT, 36).into_font().color(&rgb(palette::ACCENT)).pos(centered),
            ))?;
        }
        Ok(())
    }

    fn draw_income_bar(
        root: &Area<'_>,
        title: &str,
        income: &[TrackIncome],
        value_labels: bool,
    ) -> Result<()> {
        if income.is_empty() {
            return Self::draw_message(root, title, "No freelancer income for this selection");
        }

        let labels: Vec<String> = income.iter().map(|t| t.track.clone()).collect();
        let n = labels.len();
        let max = income.iter().map(|t| t.avg_income).fold(0.0, f64::max);
        let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| ChartPlotter::category_label(&labels, *x))
            .x_desc("Track")
            .y_desc("Average Freelance Income (USD)")
            .label_style((FONT, 14))
            .axis_desc_style((FONT, 16))
            .draw()?;

        chart.draw_series(income.iter().enumerate().map(|(i, t)| {
            let color = if value_labels {
                rgb(palette::series_color(i))
            } else {
                rgb(palette::ACCENT)
            };
            let x = i as f64;
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, t.avg_income)], color.filled())
        }))?;

        if value_labels {
            let style = (FONT, 16)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(income.iter().enumerate().map(|(i, t)| {
                Text::new(
                    format!("{:.2}", t.avg_income),
                    (i as f64, t.avg_income),
                    style.clone(),
                )
            }))?;
        }

        Ok(())
    }

    fn draw_exam_histogram(root: &Area<'_>, histogram: &Histogram, scope: &str) -> Result<()> {
        let title = format!("Distribution of Exam Scores ({})", scope);
        let (Some(first), Some(last)) = (histogram.bins.first(), histogram.bins.last()) else {
            return Self::draw_message(root, &title, "No exam scores");
        };

        let y_max = (histogram.max_count() as f64 * 1.1).max(1.0);
        let mut chart = ChartBuilder::on(root)
            .caption(&title, (FONT, 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(first.lower..last.upper, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Exam Score")
            .y_desc("Number of Students")
            .label_style((FONT, 14))
            .axis_desc_style((FONT, 16))
            .draw()?;

        let fill = rgb(palette::ACCENT).filled();
        chart.draw_series(histogram.bins.iter().map(|bin| {
            Rectangle::new([(bin.lower, 0.0), (bin.upper, bin.count as f64)], fill)
        }))?;
        chart.draw_series(histogram.bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                WHITE.stroke_width(1),
            )
        }))?;

        Ok(())
    }

    fn draw_attendance_scatter(
        root: &Area<'_>,
        series: &[ScatterSeries],
        scope: &str,
    ) -> Result<()> {
        let title = format!("Attendance vs Exam Score by Track ({})", scope);
        let points = series.iter().flat_map(|s| s.points.iter());
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for p in points {
            x_min = x_min.min(p[0]);
            x_max = x_max.max(p[0]);
            y_min = y_min.min(p[1]);
            y_max = y_max.max(p[1]);
        }
        if !x_min.is_finite() {
            return Self::draw_message(root, &title, "No attendance/score pairs");
        }

        let pad = |lo: f64, hi: f64| {
            let span = (hi - lo).max(1.0) * 0.05;
            (lo - span)..(hi + span)
        };

        let mut chart = ChartBuilder::on(root)
            .caption(&title, (FONT, 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(pad(x_min, x_max), pad(y_min, y_max))?;

        chart
            .configure_mesh()
            .x_desc("Attendance Rate (%)")
            .y_desc("Exam Score")
            .label_style((FONT, 14))
            .axis_desc_style((FONT, 16))
            .draw()?;

        for (i, s) in series.iter().enumerate() {
            let color = rgb(palette::series_color(i));
            chart
                .draw_series(
                    s.points
                        .iter()
                        .map(move |p| Circle::new((p[0], p[1]), 5, color.mix(0.7).filled())),
                )?
                .label(s.track.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 14))
            .draw()?;

        Ok(())
    }

    fn draw_employment_bars(
        root: &Area<'_>,
        breakdown: &EmploymentBreakdown,
        scope: &str,
    ) -> Result<()> {
        let title = format!("Employment Status Distribution by Track ({})", scope);
        if breakdown.tracks.is_empty() {
            return Self::draw_message(root, &title, "No employment data");
        }

        let n = breakdown.tracks.len();
        let y_max = (breakdown.max_track_total() as f64 * 1.1).max(1.0);

        let mut chart = ChartBuilder::on(root)
            .caption(&title, (FONT, 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| ChartPlotter::category_label(&breakdown.tracks, *x))
            .x_desc("Track")
            .y_desc("Number of Students")
            .label_style((FONT, 14))
            .axis_desc_style((FONT, 16))
            .draw()?;

        let mut base = vec![0usize; n];
        for (s_idx, status) in breakdown.statuses.iter().enumerate() {
            let color = rgb(palette::series_color(s_idx));
            let bars: Vec<Rectangle<(f64, f64)>> = breakdown
                .counts
                .iter()
                .enumerate()
                .map(|(t_idx, row)| {
                    let x = t_idx as f64;
                    let bottom = base[t_idx] as f64;
                    let top = (base[t_idx] + row[s_idx]) as f64;
                    Rectangle::new([(x - 0.3, bottom), (x + 0.3, top)], color.filled())
                })
                .collect();
            for (t_idx, row) in breakdown.counts.iter().enumerate() {
                base[t_idx] += row[s_idx];
            }

            chart
                .draw_series(bars)?
                .label(status.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 14))
            .draw()?;

        Ok(())
    }

    /// Heatmap drawn in pixel space: row names on the left, column
    /// numbers along the bottom, 2-decimal values in each cell.
    fn draw_heatmap(root: &Area<'_>, matrix: &CorrelationMatrix, scope: &str) -> Result<()> {
        let title = format!("Correlation Heatmap ({})", scope);
        if matrix.is_empty() {
            return Self::draw_message(root, &title, "No numeric columns");
        }

        let area = root.titled(&title, (FONT, 26))?;
        let (w, h) = area.dim_in_pixel();
        let n = matrix.columns.len() as i32;
        let (left, top) = (280i32, 10i32);
        let size = (w as i32 - left - 40).min(h as i32 - top - 50).max(n);
        let cell = size / n;

        let right_center = Pos::new(HPos::Right, VPos::Center);
        let centered = Pos::new(HPos::Center, VPos::Center);

        for row in 0..n {
            let y0 = top + row * cell;
            area.draw(&Text::new(
                matrix.columns[row as usize].clone(),
                (left - 10, y0 + cell / 2),
                (FONT, 15).into_font().color(&BLACK).pos(right_center),
            ))?;

            for col in 0..n {
                let x0 = left + col * cell;
                let value = matrix.get(row as usize, col as usize);
                let fill = palette::heat_color(value);
                area.draw(&Rectangle::new(
                    [(x0 + 1, y0 + 1), (x0 + cell - 1, y0 + cell - 1)],
                    rgb(fill).filled(),
                ))?;

                let label = value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v));
                area.draw(&Text::new(
                    label,
                    (x0 + cell / 2, y0 + cell / 2),
                    (FONT, 14)
                        .into_font()
                        .color(&rgb(palette::contrast_text(fill)))
                        .pos(centered),
                ))?;
            }
        }

        for col in 0..n {
            area.draw(&Text::new(
                format!("{}", col + 1),
                (left + col * cell + cell / 2, top + n * cell + 16),
                (FONT, 14).into_font().color(&BLACK).pos(centered),
            ))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, image::Rgb([10, 20, 30]))
    }

    #[test]
    fn test_oversized_render_is_an_error() {
        let renderer = StaticChartRenderer::new(100, 50);
        assert!(renderer.render(u32::MAX, u32::MAX, |_| Ok(())).is_err());
    }

    #[test]
    fn test_compose_sheet_layout() {
        let renderer = StaticChartRenderer::new(100, 50);
        let images: Vec<(&'static str, RgbImage)> = vec![
            ("kpi_cards", blank(200, CARD_STRIP_HEIGHT)),
            ("a", blank(100, 50)),
            ("b", blank(100, 50)),
            ("c", blank(100, 50)),
        ];
        let sheet = renderer.compose_sheet(&images);
        assert_eq!(sheet.width(), 200);
        assert_eq!(sheet.height(), CARD_STRIP_HEIGHT + 2 * 50);
        // Third chart starts the second row, its right neighbour stays blank
        assert_eq!(
            *sheet.get_pixel(10, CARD_STRIP_HEIGHT + 60),
            image::Rgb([10, 20, 30])
        );
        assert_eq!(
            *sheet.get_pixel(150, CARD_STRIP_HEIGHT + 60),
            image::Rgb([255, 255, 255])
        );
    }
}
