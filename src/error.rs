use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpiabmError` and maps other errors to
/// convert to an `EpiabmError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiabmError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    ConfigError(String),
    ReportError(String),
    SimulationError(String),
    /// A person's household can only be assigned once. Carries the household that is already set.
    HouseholdAlreadyAssigned {
        existing: usize,
    },
    EpiabmError(String),
}

impl From<io::Error> for EpiabmError {
    fn from(error: io::Error) -> Self {
        EpiabmError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiabmError {
    fn from(error: serde_json::Error) -> Self {
        EpiabmError::JsonError(error)
    }
}

impl From<csv::Error> for EpiabmError {
    fn from(error: csv::Error) -> Self {
        EpiabmError::CsvError(error)
    }
}

impl From<String> for EpiabmError {
    fn from(error: String) -> Self {
        EpiabmError::EpiabmError(error)
    }
}

impl From<&str> for EpiabmError {
    fn from(error: &str) -> Self {
        EpiabmError::EpiabmError(error.to_string())
    }
}

impl std::error::Error for EpiabmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiabmError::IoError(error) => Some(error),
            EpiabmError::JsonError(error) => Some(error),
            EpiabmError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpiabmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiabmError::IoError(error) => write!(f, "I/O error: {error}"),
            EpiabmError::JsonError(error) => write!(f, "JSON error: {error}"),
            EpiabmError::CsvError(error) => write!(f, "CSV error: {error}"),
            EpiabmError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            EpiabmError::ReportError(msg) => write!(f, "Report error: {msg}"),
            EpiabmError::SimulationError(msg) => write!(f, "Simulation error: {msg}"),
            EpiabmError::HouseholdAlreadyAssigned { existing } => {
                write!(f, "Person is already a member of household {existing}")
            }
            EpiabmError::EpiabmError(msg) => write!(f, "Error: {msg}"),
        }
    }
}
