//! Non-fatal diagnostics accumulated across the conversion pipeline.

use std::fmt;

/// A non-fatal finding recorded during classification or serialization.
///
/// Diagnostics never abort the pipeline; they accumulate and are reported
/// alongside successful output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A mate carried a type tag outside the supported set. No joint is
    /// emitted for it.
    UnknownMateKind {
        /// Display name of the mate.
        mate: String,
        /// The unrecognized vendor tag.
        tag: String,
    },

    /// A recognized mate kind that has no joint representation in the
    /// target format.
    UnsupportedMate {
        /// Display name of the mate.
        mate: String,
        /// The recognized but unsupported kind.
        kind: &'static str,
    },

    /// A part body had no entry in the mesh manifest; the body was
    /// emitted without a geometry reference.
    MissingGeometry {
        /// Name of the affected body.
        body: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownMateKind { mate, tag } => {
                write!(f, "mate '{mate}' has unknown type {tag}; no joint emitted")
            }
            Diagnostic::UnsupportedMate { mate, kind } => {
                write!(f, "mate '{mate}' of kind {kind} is not supported; no joint emitted")
            }
            Diagnostic::MissingGeometry { body } => {
                write!(f, "body '{body}' has no mesh manifest entry; emitted without geometry")
            }
        }
    }
}
