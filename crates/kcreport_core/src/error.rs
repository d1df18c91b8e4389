use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportErrorCode {
    Io,
    Parse,
    Lookup,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportError {
    pub code: ReportErrorCode,
    pub message: String,
}

impl ReportError {
    pub fn new(code: ReportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for ReportError {}
