use std::io;
use thiserror::Error;

use crate::domain::DomainError;
use crate::report::ReportError;

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            AppError::InvalidArguments("no workers".to_string()).to_string(),
            "Invalid arguments: no workers"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err = AppError::from(io_err);

        match app_err {
            AppError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn domain_error_conversion() {
        let app_err = AppError::from(DomainError::Overflow);

        match app_err {
            AppError::Domain(DomainError::Overflow) => {}
            _ => panic!("Expected Domain error variant"),
        }
    }

    #[test]
    fn report_error_conversion() {
        let report_err = ReportError::from(io::Error::other("pipe closed"));
        let app_err = AppError::from(report_err);

        match app_err {
            AppError::Report(ReportError::Io(_)) => {}
            _ => panic!("Expected Report error variant"),
        }
    }
}
