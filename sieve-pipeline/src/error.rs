// Sieve Pipeline - Metric batch traversal
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for Sieve Pipeline

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Engine could not be built
    #[error("Sieve error: {0}")]
    Sieve(#[from] sieve::SieveError),

    /// Batch could not be parsed or rendered
    #[error("Invalid batch: {0}")]
    InvalidBatch(#[from] serde_json::Error),

    /// Batch file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
