use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimulationError` and maps other errors to
/// convert to a `SimulationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimulationError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    InvalidParameters(String),
    ReportError(String),
}

impl From<io::Error> for SimulationError {
    fn from(error: io::Error) -> Self {
        SimulationError::IoError(error)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::JsonError(error)
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::CsvError(error)
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::IoError(error) => Some(error),
            SimulationError::JsonError(error) => Some(error),
            SimulationError::CsvError(error) => Some(error),
            SimulationError::InvalidParameters(_) | SimulationError::ReportError(_) => None,
        }
    }
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::IoError(error) => write!(f, "I/O error: {error}"),
            SimulationError::JsonError(error) => write!(f, "invalid JSON: {error}"),
            SimulationError::CsvError(error) => write!(f, "CSV error: {error}"),
            SimulationError::InvalidParameters(message) => {
                write!(f, "invalid parameters: {message}")
            }
            SimulationError::ReportError(message) => write!(f, "report error: {message}"),
        }
    }
}
