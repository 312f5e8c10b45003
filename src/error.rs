use std::io;
use thiserror::Error;

/// The I/O step that failed, named in the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStep {
    Open,
    Read,
    Write,
    Echo,
}

impl std::fmt::Display for IoStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IoStep::Open => "open",
            IoStep::Read => "read",
            IoStep::Write => "write",
            IoStep::Echo => "echo",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StampError {
    #[error("failed to {step} version file: {source}")]
    Io {
        step: IoStep,
        #[source]
        source: io::Error,
    },
    #[error("malformed #define on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("version file would be {len} bytes, limit is {max}")]
    CapacityExceeded { len: usize, max: usize },
    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, StampError>;

impl StampError {
    pub fn io(step: IoStep, source: io::Error) -> Self {
        StampError::Io { step, source }
    }

    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        StampError::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_variant_names_the_step() {
        let err = StampError::io(IoStep::Write, io::Error::other("disk full"));
        assert_eq!(err.to_string(), "failed to write version file: disk full");
    }

    #[test]
    fn parse_variant_format() {
        let err = StampError::parse(3, "expected a name and a value");
        assert_eq!(
            err.to_string(),
            "malformed #define on line 3: expected a name and a value"
        );
    }

    #[test]
    fn capacity_variant_format() {
        let err = StampError::CapacityExceeded { len: 1001, max: 1000 };
        assert_eq!(
            err.to_string(),
            "version file would be 1001 bytes, limit is 1000"
        );
    }

    #[test]
    fn every_failure_exits_with_minus_one() {
        assert_eq!(StampError::Usage("no arguments".into()).exit_code(), -1);
        assert_eq!(StampError::parse(1, "x").exit_code(), -1);
    }
}
