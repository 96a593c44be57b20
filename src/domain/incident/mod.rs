pub mod envelope;
pub mod payloads;
pub mod value_objects;
pub mod workflow;

pub use envelope::{Envelope, EnvelopeError, Stage};
pub use payloads::{CityReport, FireResponse, ReportSummary, SafetyInspection, WeatherAlert};
pub use value_objects::{FireLevel, SafetyStatus};
pub use workflow::{resolve, Step};
