//! Student Record Model
//! Typed view of one CSV row.

use serde::Serialize;

pub const TRACK_COL: &str = "track";
pub const GRADUATED_COL: &str = "graduated_flag";
pub const ATTENDANCE_COL: &str = "attendance_rate";
pub const EXAM_COL: &str = "exams_score";
pub const EMPLOYMENT_COL: &str = "employment_status";
pub const INCOME_COL: &str = "freelancing_income_usd_total";

/// Columns every dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    TRACK_COL,
    GRADUATED_COL,
    ATTENDANCE_COL,
    EXAM_COL,
    EMPLOYMENT_COL,
    INCOME_COL,
];

/// Employment outcome of a student.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EmploymentStatus {
    Intern,
    Freelancer,
    PartTime,
    FullTime,
    Other(String),
}

impl EmploymentStatus {
    /// The four statuses counted as employed unless configured otherwise.
    pub const DEFAULT_EMPLOYED: [EmploymentStatus; 4] = [
        EmploymentStatus::Intern,
        EmploymentStatus::Freelancer,
        EmploymentStatus::PartTime,
        EmploymentStatus::FullTime,
    ];

    /// Parse a CSV label. Matching is exact, as in the source data.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Intern" => EmploymentStatus::Intern,
            "Freelancer" => EmploymentStatus::Freelancer,
            "Part-time" => EmploymentStatus::PartTime,
            "Full-time" => EmploymentStatus::FullTime,
            other => EmploymentStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EmploymentStatus::Intern => "Intern",
            EmploymentStatus::Freelancer => "Freelancer",
            EmploymentStatus::PartTime => "Part-time",
            EmploymentStatus::FullTime => "Full-time",
            EmploymentStatus::Other(label) => label,
        }
    }
}

/// One student row. Empty CSV cells become `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentRecord {
    pub track: Option<String>,
    pub graduated: Option<bool>,
    pub attendance_rate: Option<f64>,
    pub exam_score: Option<f64>,
    pub employment_status: Option<EmploymentStatus>,
    pub freelancing_income_usd: Option<f64>,
}

impl StudentRecord {
    pub fn is_freelancer(&self) -> bool {
        self.employment_status == Some(EmploymentStatus::Freelancer)
    }

    pub fn in_track(&self, track: &str) -> bool {
        self.track.as_deref() == Some(track)
    }
}
