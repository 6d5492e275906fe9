//! Input validation utilities
//!
//! Common validation for command-line parameters and file paths, with
//! structured errors from [`crate::errors`].

use std::path::Path;

use crate::errors::{Result, SeqpoolError};

/// Validate that a file exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description (e.g., "Input sequence file")
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use seqpool_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/reads.fa", "Input file");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SeqpoolError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that an integer parameter is at least one
///
/// # Errors
/// Returns [`SeqpoolError::InvalidParameter`] if `value` is zero
pub fn validate_at_least_one(parameter: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(SeqpoolError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
