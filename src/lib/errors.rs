//! Typed errors for seqpool operations.

use thiserror::Error;

/// Result type alias for seqpool operations
pub type Result<T> = std::result::Result<T, SeqpoolError>;

/// Error type for seqpool operations
#[derive(Error, Debug)]
pub enum SeqpoolError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// A job was submitted after submission was closed
    #[error("Job submitted after the queue was closed")]
    SubmitAfterClose,

    /// Shutdown was requested while jobs were still pending or in flight
    #[error("Pool shut down before draining; close submission and poll until drained")]
    ShutdownBeforeDrain,

    /// The worker threads were already started
    #[error("Worker threads already started")]
    PoolAlreadyStarted,

    /// The OS refused to create a worker thread
    #[error("Failed to spawn worker thread")]
    WorkerSpawn {
        /// The underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "FASTA", "FASTQ")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A calculator program contained an unknown token
    #[error("Calculator: don't understand '{token}'")]
    InvalidExpression {
        /// The offending token
        token: String,
    },

    /// A calculator operation ran out of operands
    #[error("Calculator: {operation}: stack empty")]
    StackUnderflow {
        /// The operation that failed
        operation: String,
    },

    /// The calculator stack exceeded its depth limit
    #[error("Calculator: stack overflow (depth limit {limit})")]
    StackOverflow {
        /// The stack depth limit
        limit: usize,
    },

    /// A sto/rcl index fell outside the calculator's memory
    #[error("Calculator: memory location {index} out of range (0..{limit})")]
    MemoryOutOfRange {
        /// The requested memory index
        index: i64,
        /// Number of memory locations
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter() {
        let error = SeqpoolError::InvalidParameter {
            parameter: "worker_count".to_string(),
            reason: "must be at least 1".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid parameter 'worker_count'"));
        assert!(msg.contains("must be at least 1"));
    }

    #[test]
    fn test_invalid_file_format() {
        let error = SeqpoolError::InvalidFileFormat {
            file_type: "FASTA".to_string(),
            path: "/path/to/reads.fa".to_string(),
            reason: "unrecognized first byte".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid FASTA file"));
        assert!(msg.contains("unrecognized first byte"));
    }

    #[test]
    fn test_calculator_errors() {
        let msg = SeqpoolError::InvalidExpression { token: "frob".to_string() }.to_string();
        assert!(msg.contains("don't understand 'frob'"));

        let msg = SeqpoolError::StackUnderflow { operation: "pow".to_string() }.to_string();
        assert!(msg.contains("pow: stack empty"));

        let msg = SeqpoolError::MemoryOutOfRange { index: 500, limit: 128 }.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("0..128"));
    }

    #[test]
    fn test_worker_spawn_preserves_source() {
        let error = SeqpoolError::WorkerSpawn {
            source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "EAGAIN"),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Failed to spawn worker thread"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
