//! Error types for kinematic extraction.

use thiserror::Error;

/// Reason a raw occurrence transform was rejected.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The rotation block is not orthonormal.
    #[error("rotation determinant {0:.6} deviates from 1 by more than 1e-3")]
    Determinant(f64),

    /// A rotation column collapsed to (near) zero length.
    #[error("rotation column {0} has near-zero magnitude")]
    DegenerateColumn(usize),
}

/// Fatal errors raised while extracting a kinematic tree.
///
/// These abort the pipeline before any output is produced. Non-fatal
/// findings are reported through [`crate::Diagnostic`] instead.
#[derive(Error, Debug)]
pub enum KinematicsError {
    /// An occurrence carried a malformed or non-rigid transform.
    #[error("invalid transform for occurrence {key}: {source}")]
    InvalidTransform {
        /// Key of the offending occurrence.
        key: String,
        /// What was wrong with the transform.
        source: TransformError,
    },

    /// A required occurrence (the root or a joint participant) is absent
    /// from the occurrence set.
    #[error("occurrence not found: {0}")]
    MissingOccurrence(String),
}
