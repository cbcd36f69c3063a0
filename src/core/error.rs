// Copyright 2025 Geosel Contributors
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

//! Error types for Geosel
//!
//! Only statistics *construction* can fail; estimation never does. The
//! selectivity entry points recover locally with documented fallback
//! constants instead of surfacing an error to the planner.

use thiserror::Error;

/// Result type alias for Geosel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for statistics construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No statistics can be built: the sample contained no valid
    /// (non-null, non-empty, finite) feature, or every feature was
    /// discarded as a hard deviant.
    #[error("no statistics available: {0}")]
    NoStatistics(&'static str),

    /// A long scan was cancelled by the caller's cancel flag.
    #[error("statistics collection cancelled")]
    Cancelled,

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a NoStatistics error for an empty (all null/empty/invalid)
    /// sample.
    pub fn empty_sample() -> Self {
        Error::NoStatistics("no valid features in sample")
    }

    /// Create a NoStatistics error for a sample whose every feature was
    /// trimmed as a deviant.
    pub fn all_deviant() -> Self {
        Error::NoStatistics("no features lie in the histogram extent")
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Check if this error means "not enough data", as opposed to a
    /// cancelled or broken run. Callers typically respond by leaving the
    /// column without statistics rather than retrying.
    pub fn is_no_statistics(&self) -> bool {
        matches!(self, Error::NoStatistics(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::empty_sample().to_string(),
            "no statistics available: no valid features in sample"
        );
        assert_eq!(
            Error::all_deviant().to_string(),
            "no statistics available: no features lie in the histogram extent"
        );
        assert_eq!(Error::Cancelled.to_string(), "statistics collection cancelled");
        assert_eq!(Error::internal("bad state").to_string(), "bad state");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::empty_sample().is_no_statistics());
        assert!(Error::all_deviant().is_no_statistics());
        assert!(!Error::Cancelled.is_no_statistics());
        assert!(!Error::internal("x").is_no_statistics());
    }
}
