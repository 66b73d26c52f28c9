// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Result discriminants for mutating operations.

use std::fmt;

use crate::error::Error;

/// Outcome of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    Success,
    Failed,
    /// The operation is still running and must be polled.
    Processing,
    /// The operation could not be attempted because its input was invalid.
    InfoError,
}

impl CommandStatus {
    /// Success and Failed are final; the others are not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Processing => "PROCESSING",
            Self::InfoError => "INFO_ERROR",
        };
        f.write_str(s)
    }
}

/// Status of a move, copy or delete together with what went wrong.
///
/// A `Failed` report always has a `cause`. Warnings describe problems that did
/// not change the status, such as a source that could not be removed after a
/// successful move, or a staging file that could not be deleted.
#[derive(Debug)]
pub struct OperationReport {
    pub status: CommandStatus,
    pub cause: Option<Error>,
    pub warnings: Vec<Error>,
}

impl OperationReport {
    pub fn success() -> Self {
        Self {
            status: CommandStatus::Success,
            cause: None,
            warnings: Vec::new(),
        }
    }

    pub fn failed(cause: Error) -> Self {
        Self {
            status: CommandStatus::Failed,
            cause: Some(cause),
            warnings: Vec::new(),
        }
    }

    pub fn info_error(cause: Error) -> Self {
        Self {
            status: CommandStatus::InfoError,
            cause: Some(cause),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: Error) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Converts the report into a `Result`, dropping warnings.
    pub fn into_result(self) -> crate::Result<()> {
        match self.cause {
            Some(cause) if !self.status.is_success() => Err(cause),
            _ => Ok(()),
        }
    }
}

impl From<crate::Result<()>> for OperationReport {
    fn from(result: crate::Result<()>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(CommandStatus::Success.is_terminal());
        assert!(CommandStatus::Failed.is_terminal());
        assert!(!CommandStatus::Processing.is_terminal());
        assert!(!CommandStatus::InfoError.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CommandStatus::Success.to_string(), "SUCCESS");
        assert_eq!(CommandStatus::InfoError.to_string(), "INFO_ERROR");
    }

    #[test]
    fn test_report_from_result() {
        let report: OperationReport = Ok(()).into();
        assert!(report.is_success());
        assert!(report.cause.is_none());

        let report: OperationReport = Err(Error::SourceNotFound("/x".into())).into();
        assert_eq!(report.status, CommandStatus::Failed);
        assert!(matches!(report.into_result(), Err(Error::SourceNotFound(_))));
    }

    #[test]
    fn test_warning_keeps_success() {
        let report = OperationReport::success().with_warning(Error::cleanup("/tmp/x", "busy"));
        assert!(report.is_success());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.into_result().is_ok());
    }
}
