#![warn(missing_docs)]

//! Kinematic-tree extraction from CAD assembly graphs.
//!
//! This crate turns an assembly's structural graph — occurrences with
//! world-frame poses and typed mate constraints — into a rooted kinematic
//! tree with parent-relative poses, ready for serialization into a physics
//! engine's scene format.
//!
//! The pipeline is a single-pass, stateless transformation:
//!
//! 1. [`pose_from_flat`] decodes each occurrence's raw homogeneous
//!    transform into a position and a canonical unit quaternion.
//! 2. [`classify_mates`] maps mate records onto joint descriptors,
//!    accumulating non-fatal [`Diagnostic`]s for unsupported kinds.
//! 3. [`TreeBuilder`] assembles the parent-rooted body tree anchored at
//!    the fixed occurrence.
//!
//! # Example
//!
//! ```ignore
//! use mateforge_ir::AssemblyDocument;
//! use mateforge_kinematics::{classify_mates, TreeBuilder};
//!
//! let doc = AssemblyDocument::from_json(&json)?;
//! let (joints, diagnostics) = classify_mates(&doc.root_assembly.features);
//! let tree = TreeBuilder::new(&doc.root_assembly).build(&joints)?;
//! ```

pub mod diag;
pub mod error;
pub mod mate;
pub mod transform;
pub mod tree;

pub use diag::Diagnostic;
pub use error::{KinematicsError, TransformError};
pub use mate::{classify_mate, classify_mates, JointKind, JointSpec, MateKind};
pub use transform::{pose_from_flat, quaternion_from_matrix, Pose};
pub use tree::{sanitize_name, AttachSide, KinematicBody, KinematicTree, TreeBuilder};
