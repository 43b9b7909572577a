#![warn(missing_docs)]

//! MuJoCo MJCF serialization of mateforge kinematic trees.
//!
//! Walks a [`mateforge_kinematics::KinematicTree`] depth-first and emits
//! the declarative scene hierarchy: nested `<body>` elements with
//! parent-relative poses, one `<joint>` for the first body that carries
//! one, and one paired `<actuator>` motor referencing that joint.
//!
//! # Example
//!
//! ```ignore
//! use mateforge_mjcf::{write_mjcf, MjcfSettings};
//!
//! let doc = write_mjcf(&tree, &manifest, &MjcfSettings::default());
//! std::fs::write("robot.xml", doc.xml)?;
//! for diag in &doc.diagnostics {
//!     eprintln!("warning: {diag}");
//! }
//! ```

pub mod settings;
pub mod writer;

pub use settings::MjcfSettings;
pub use writer::{write_mjcf, MjcfDocument};
