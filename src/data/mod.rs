//! Data module - CSV loading, student records and track filtering

mod dataset;
mod loader;
mod processor;
mod record;

pub use dataset::StudentDataset;
pub use loader::DataLoader;
pub use processor::{DataProcessor, ProcessorError, TrackFilter, ALL_TRACKS_LABEL};
pub use record::{EmploymentStatus, StudentRecord};
