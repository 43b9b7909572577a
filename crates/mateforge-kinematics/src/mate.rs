//! Mate classification: mapping mechanical constraints to joint descriptors.

use nalgebra::Vector3;

use mateforge_ir::MateFeature;

use crate::diag::Diagnostic;
use crate::tree::sanitize_name;

/// Passive damping applied to emitted joints, matching the target engine's
/// servo defaults.
pub const DEFAULT_JOINT_DAMPING: f64 = 0.01;

/// Closed set of mate kinds understood by the classifier.
///
/// The raw vendor tag is parsed once by [`MateKind::from_tag`]; everything
/// downstream dispatches on this enum, so an unhandled kind is a
/// compile-time gap rather than a silent runtime default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MateKind {
    /// Rigid weld; no degrees of freedom.
    Fastened,
    /// Single rotation about the connector axis.
    Revolute,
    /// Single translation along the connector axis.
    Slider,
    /// Combined rotation and translation about/along one axis.
    Cylindrical,
    /// Free 3-DOF rotation about the connector origin.
    Ball,
    /// Planar composite (two translations plus one rotation).
    Planar,
    /// Orientation-only constraint; no independent degree of freedom.
    Parallel,
    /// Anything else; the raw tag is carried for diagnostics.
    Unknown(String),
}

impl MateKind {
    /// Parse a raw vendor mate type tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "FASTENED" => Self::Fastened,
            "REVOLUTE" => Self::Revolute,
            "SLIDER" => Self::Slider,
            "CYLINDRICAL" => Self::Cylindrical,
            "BALL" => Self::Ball,
            "PLANAR" => Self::Planar,
            "PARALLEL" => Self::Parallel,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Degrees of freedom granted by a classified joint.
#[derive(Debug, Clone, PartialEq)]
pub enum JointKind {
    /// Single rotation about `axis` (parent-local frame).
    Hinge {
        /// Unit rotation axis.
        axis: Vector3<f64>,
    },
    /// Single translation along `axis` (parent-local frame).
    Slide {
        /// Unit translation axis.
        axis: Vector3<f64>,
    },
    /// Free 3-DOF rotation about the joint origin; no single axis.
    Ball,
}

impl JointKind {
    /// The target engine's type attribute for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            JointKind::Hinge { .. } => "hinge",
            JointKind::Slide { .. } => "slide",
            JointKind::Ball => "ball",
        }
    }
}

/// A joint descriptor extracted from one mate feature.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    /// Joint name, derived from the mate's display name.
    pub name: String,
    /// Degrees of freedom and axis.
    pub kind: JointKind,
    /// Joint origin offset from the moving participant's connector.
    pub origin: Vector3<f64>,
    /// Optional travel range (radians for hinges, metres for slides).
    pub range: Option<(f64, f64)>,
    /// Passive damping.
    pub damping: f64,
    /// Occurrence keys of the mated participants, moving side first.
    pub participants: Vec<String>,
}

/// Classify one mate feature into an optional joint descriptor.
///
/// Returns `None` for rigid, orientation-only, suppressed and unsupported
/// mates. Unrecognized type tags never abort classification; they are
/// appended to the returned diagnostics.
pub fn classify_mate(feature: &MateFeature) -> (Option<JointSpec>, Vec<Diagnostic>) {
    let data = &feature.feature_data;

    if feature.suppressed {
        log::debug!("mate '{}' is suppressed, skipping", data.name);
        return (None, Vec::new());
    }
    if let Some(kind) = feature.feature_type.as_deref() {
        if kind != "mate" {
            return (None, Vec::new());
        }
    }
    let Some(connector) = data.mated_entities.first().map(|e| &e.mated_cs) else {
        log::warn!("mate '{}' has no participants, skipping", data.name);
        return (None, Vec::new());
    };

    let axis = unit_axis(Vector3::from(connector.z_axis));
    let origin = Vector3::from(connector.origin);
    let participants: Vec<String> = data
        .mated_entities
        .iter()
        .filter_map(|e| e.key().map(str::to_string))
        .collect();
    let range = data.limits.map(|l| (l.min, l.max));

    let joint = |kind: JointKind| JointSpec {
        name: sanitize_name(&data.name),
        kind,
        origin,
        range,
        damping: DEFAULT_JOINT_DAMPING,
        participants: participants.clone(),
    };

    match MateKind::from_tag(&data.mate_type) {
        MateKind::Fastened | MateKind::Parallel => (None, Vec::new()),
        MateKind::Revolute => (Some(joint(JointKind::Hinge { axis })), Vec::new()),
        MateKind::Slider => (Some(joint(JointKind::Slide { axis })), Vec::new()),
        // The translational DOF of a cylindrical mate is not represented;
        // only the rotation is carried into the joint.
        MateKind::Cylindrical => (Some(joint(JointKind::Hinge { axis })), Vec::new()),
        MateKind::Ball => (Some(joint(JointKind::Ball)), Vec::new()),
        MateKind::Planar => {
            let diag = Diagnostic::UnsupportedMate {
                mate: data.name.clone(),
                kind: "PLANAR",
            };
            log::warn!("{diag}");
            (None, vec![diag])
        }
        MateKind::Unknown(tag) => {
            let diag = Diagnostic::UnknownMateKind {
                mate: data.name.clone(),
                tag,
            };
            log::warn!("{diag}");
            (None, vec![diag])
        }
    }
}

/// Classify every mate feature, collecting joints and diagnostics.
pub fn classify_mates(features: &[MateFeature]) -> (Vec<JointSpec>, Vec<Diagnostic>) {
    let mut joints = Vec::new();
    let mut diagnostics = Vec::new();
    for feature in features {
        let (joint, mut diags) = classify_mate(feature);
        joints.extend(joint);
        diagnostics.append(&mut diags);
    }
    (joints, diagnostics)
}

/// Normalize an axis, leaving exact unit inputs untouched.
fn unit_axis(axis: Vector3<f64>) -> Vector3<f64> {
    let norm = axis.norm();
    if norm > 0.0 && (norm - 1.0).abs() > 1e-12 {
        axis / norm
    } else {
        axis
    }
}
