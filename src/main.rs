//! ITI KPI Dashboard - student outcomes from a CSV of student records
//!
//! Opens the interactive dashboard by default. `--summary` and `--export`
//! run headless and exit.

mod charts;
mod config;
mod dashboard;
mod data;
mod gui;
mod stats;

use anyhow::{anyhow, Context, Result};
use charts::StaticChartRenderer;
use clap::Parser;
use config::DashboardConfig;
use dashboard::{DashboardSnapshot, SnapshotOptions};
use data::{DataLoader, StudentDataset, TrackFilter};
use eframe::egui;
use gui::DashboardApp;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "iti-dashboard")]
#[command(about = "KPI dashboard for ITI student records", long_about = None)]
struct Cli {
    /// Student records CSV ("-" reads from stdin in headless mode)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track to filter on; omit for all tracks
    #[arg(long)]
    track: Option<String>,

    /// Compute the detailed visuals over the selected track only
    #[arg(long)]
    scope_details: bool,

    /// Print the KPI summary as JSON and exit
    #[arg(long)]
    summary: bool,

    /// Render the dashboard charts as PNG files into this directory and exit
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };

        if let Some(csv) = &self.csv {
            config.csv_path = csv.clone();
        }
        if let Some(track) = &self.track {
            config.default_track = Some(track.clone());
        }
        if self.scope_details {
            config.scope_details_to_track = true;
        }
        config.validate()?;
        Ok(config)
    }

    fn headless(&self) -> bool {
        self.summary || self.export.is_some()
    }
}

fn load_dataset(loader: &mut DataLoader, path: &Path) -> Result<()> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read CSV from stdin")?;
        let dataset = StudentDataset::from_frame(DataLoader::read_csv_bytes(&bytes)?)?;
        info!(records = dataset.len(), "dataset loaded from stdin");
        loader.set_dataset(dataset, path.to_path_buf());
    } else {
        loader
            .load_csv(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }
    Ok(())
}

/// The `--summary` document: data source, filter, KPIs and income by track.
fn summary_json(source: Option<&Path>, snapshot: &DashboardSnapshot) -> serde_json::Value {
    serde_json::json!({
        "source": source,
        "filter": snapshot.filter_label,
        "summary": snapshot.summary,
        "income_by_track": snapshot.income_by_track,
    })
}

fn run_headless(cli: &Cli, config: &DashboardConfig) -> Result<()> {
    let mut loader = DataLoader::new();
    load_dataset(&mut loader, &config.csv_path)?;
    let dataset = loader
        .dataset()
        .ok_or_else(|| anyhow!("No dataset loaded"))?;

    let filter = config
        .default_track
        .as_deref()
        .map(TrackFilter::from_label)
        .unwrap_or_default();
    if let TrackFilter::Track(name) = &filter {
        if !dataset.tracks().contains(name) {
            tracing::warn!(track = %name, "track not present in dataset");
        }
    }

    let options = SnapshotOptions::from_config(config);
    let snapshot = DashboardSnapshot::compute(dataset, &filter, &options)?;

    if cli.summary {
        let output = summary_json(loader.file_path().map(PathBuf::as_path), &snapshot);
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if let Some(dir) = &cli.export {
        let renderer = StaticChartRenderer::new(config.export_width, config.export_height);
        let files = renderer.export(&snapshot, dir)?;
        for file in &files {
            info!(path = %file.display(), "exported");
        }
        info!(count = files.len(), dir = %dir.display(), "export complete");
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.resolve_config()?;

    if cli.headless() {
        return run_headless(&cli, &config);
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("ITI KPI Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "ITI KPI Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("Failed to start the dashboard window: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "iti-dashboard",
            "--csv",
            "students.csv",
            "--track",
            "Web",
            "--scope-details",
            "--summary",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.csv_path, PathBuf::from("students.csv"));
        assert_eq!(config.default_track.as_deref(), Some("Web"));
        assert!(config.scope_details_to_track);
        assert!(cli.headless());
    }

    #[test]
    fn test_summary_json_shape() {
        let csv = "\
track,graduated_flag,attendance_rate,exams_score,employment_status,freelancing_income_usd_total
Web,1,0.9,80,Freelancer,1000
Web,0,0.7,60,Freelancer,3000
Data,1,0.8,70,Full-time,0
Data,1,,90,Unemployed,0
";
        let mut loader = DataLoader::new();
        let dataset = StudentDataset::from_frame(DataLoader::read_csv_bytes(csv.as_bytes()).unwrap())
            .unwrap();
        loader.set_dataset(dataset, PathBuf::from("students.csv"));

        let snapshot = DashboardSnapshot::compute(
            loader.dataset().unwrap(),
            &TrackFilter::All,
            &SnapshotOptions::default(),
        )
        .unwrap();
        let json = summary_json(loader.file_path().map(PathBuf::as_path), &snapshot);

        assert_eq!(json["source"], "students.csv");
        assert_eq!(json["filter"], "All Tracks");
        assert_eq!(json["summary"]["record_count"], 4);
        let graduation = json["summary"]["graduation_rate"].as_f64().unwrap();
        assert!((graduation - 75.0).abs() < 1e-9);
        assert_eq!(json["summary"]["employment_rate"], 75.0);
        assert_eq!(json["summary"]["freelancer_pct"], 50.0);
        let avg_exam = json["summary"]["avg_exam"].as_f64().unwrap();
        assert!((avg_exam - 75.0).abs() < 1e-9);
        assert_eq!(json["income_by_track"].as_array().unwrap().len(), 1);
        assert_eq!(json["income_by_track"][0]["track"], "Web");
        assert_eq!(json["income_by_track"][0]["avg_income"], 2000.0);
        assert_eq!(json["income_by_track"][0]["freelancers"], 2);
    }

    #[test]
    fn test_summary_json_empty_selection_is_null() {
        let frame = DataLoader::read_csv_bytes(
            b"track,graduated_flag,attendance_rate,exams_score,employment_status,freelancing_income_usd_total\nWeb,1,0.9,80,Intern,0\n",
        )
        .unwrap();
        let dataset = StudentDataset::from_frame(frame).unwrap();
        let snapshot = DashboardSnapshot::compute(
            &dataset,
            &TrackFilter::Track("Cloud".to_string()),
            &SnapshotOptions::default(),
        )
        .unwrap();
        let json = summary_json(None, &snapshot);

        assert!(json["source"].is_null());
        assert_eq!(json["filter"], "Cloud");
        assert_eq!(json["summary"]["record_count"], 0);
        assert!(json["summary"]["graduation_rate"].is_null());
        assert_eq!(json["income_by_track"], serde_json::json!([]));
    }

    #[test]
    fn test_cli_defaults_open_gui() {
        let cli = Cli::parse_from(["iti-dashboard"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert!(!cli.headless());
        assert_eq!(cli.log_level, "info");
    }
}
