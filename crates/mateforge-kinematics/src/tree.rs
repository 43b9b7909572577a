//! Kinematic tree assembly.
//!
//! Builds the parent-rooted body tree the target format nests its bodies
//! in: every node carries a pose relative to its parent, and the single
//! classified moving joint hangs off the mover body.

use std::collections::HashMap;

use nalgebra::{UnitQuaternion, Vector3};

use mateforge_ir::{Instance, InstanceKind, Occurrence, RootAssembly};

use crate::error::KinematicsError;
use crate::mate::JointSpec;
use crate::transform::{pose_from_flat, Pose};

/// Which side of the moving joint a static occurrence attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachSide {
    /// Rigidly attached to the root (anchor) body.
    Anchor,
    /// Rigidly attached to the moving body.
    Mover,
}

/// One node of the kinematic tree.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    /// Scene-safe body name derived from the instance's display name.
    pub name: String,
    /// Key of the occurrence this body was built from.
    pub instance_id: String,
    /// Whether the instance references exported part geometry.
    pub is_part: bool,
    /// Position relative to the parent body. The root keeps its world
    /// position. Computed as a straight difference of world positions;
    /// the parent's rotation is deliberately not composed in (the
    /// downstream format consumes the simplified form).
    pub local_position: Vector3<f64>,
    /// The occurrence's world orientation, kept as-is for the same reason.
    pub local_orientation: UnitQuaternion<f64>,
    /// Joint driving this body relative to its parent, if any.
    pub joint: Option<JointSpec>,
    /// Child bodies, in emission order.
    pub children: Vec<KinematicBody>,
}

/// A fully assembled kinematic tree.
#[derive(Debug, Clone)]
pub struct KinematicTree {
    /// The root body (the fixed occurrence).
    pub root: KinematicBody,
}

impl KinematicTree {
    /// All bodies in depth-first, root-first order.
    pub fn bodies(&self) -> Vec<&KinematicBody> {
        fn visit<'a>(body: &'a KinematicBody, out: &mut Vec<&'a KinematicBody>) {
            out.push(body);
            for child in &body.children {
                visit(child, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.root, &mut out);
        out
    }

    /// Number of bodies carrying a joint.
    pub fn joint_count(&self) -> usize {
        self.bodies().iter().filter(|b| b.joint.is_some()).count()
    }
}

/// Builder for [`KinematicTree`].
///
/// The caller can supply a fallback instance-name fragment for root
/// selection when no occurrence is marked fixed, and per-occurrence
/// attachment overrides for static parts. Occurrences without an override
/// attach to whichever of {root, mover} is nearer by world position.
pub struct TreeBuilder<'a> {
    assembly: &'a RootAssembly,
    root_name_hint: Option<String>,
    overrides: HashMap<String, AttachSide>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder over an assembly.
    pub fn new(assembly: &'a RootAssembly) -> Self {
        Self {
            assembly,
            root_name_hint: None,
            overrides: HashMap::new(),
        }
    }

    /// Case-insensitive instance-name fragment used to resolve the root
    /// when no occurrence carries the fixed flag.
    pub fn root_name_hint(mut self, hint: &str) -> Self {
        self.root_name_hint = Some(hint.to_lowercase());
        self
    }

    /// Force a static occurrence onto a specific side of the joint.
    pub fn attach_override(mut self, occurrence_key: &str, side: AttachSide) -> Self {
        self.overrides.insert(occurrence_key.to_string(), side);
        self
    }

    /// Assemble the tree from the classified joints.
    ///
    /// Only the first joint drives a body; with no joints at all, every
    /// occurrence attaches rigidly to the root.
    pub fn build(&self, joints: &[JointSpec]) -> Result<KinematicTree, KinematicsError> {
        let occurrences = self.occurrence_map();
        let instances = self.instance_map();

        let root_key = self.select_root(&occurrences)?;
        let root_pose = occurrence_pose(occurrences[root_key.as_str()])?;

        let joint = joints.first();
        let mover_key = match joint {
            Some(spec) => Some(self.resolve_mover(spec, &root_key, &occurrences)?),
            None => None,
        };
        let mover_pose = mover_key
            .as_deref()
            .map(|key| occurrence_pose(occurrences[key]))
            .transpose()?;

        // Partition the remaining occurrences onto the two sides.
        let mut anchor_side = Vec::new();
        let mut mover_side = Vec::new();
        for occ in &self.assembly.occurrences {
            let Some(key) = occ.key() else { continue };
            if occ.hidden || key == root_key || Some(key) == mover_key.as_deref() {
                continue;
            }
            let pose = occurrence_pose(occ)?;
            let side = self.overrides.get(key).copied().unwrap_or_else(|| {
                nearest_side(&pose.position, &root_pose.position, mover_pose.as_ref())
            });
            match side {
                AttachSide::Anchor => anchor_side.push((key.to_string(), pose)),
                AttachSide::Mover => mover_side.push((key.to_string(), pose)),
            }
        }

        // Root body keeps its world pose; children are parent-relative.
        let mut root_body = self.body_for(&root_key, &instances, &root_pose, Pose::identity());

        for (key, pose) in &anchor_side {
            root_body
                .children
                .push(self.body_for(key, &instances, pose, root_pose.clone()));
        }

        if let (Some(mover_key), Some(mover_pose), Some(spec)) =
            (mover_key.as_deref(), mover_pose.as_ref(), joint)
        {
            let mut mover_body =
                self.body_for(mover_key, &instances, mover_pose, root_pose.clone());
            mover_body.joint = Some(spec.clone());
            for (key, pose) in &mover_side {
                mover_body
                    .children
                    .push(self.body_for(key, &instances, pose, mover_pose.clone()));
            }
            root_body.children.push(mover_body);
        }

        Ok(KinematicTree { root: root_body })
    }

    fn occurrence_map(&self) -> HashMap<&str, &Occurrence> {
        let mut map = HashMap::new();
        for occ in &self.assembly.occurrences {
            if let Some(key) = occ.key() {
                map.insert(key, occ);
            }
        }
        map
    }

    fn instance_map(&self) -> HashMap<&str, &Instance> {
        self.assembly
            .instances
            .iter()
            .map(|i| (i.id.as_str(), i))
            .collect()
    }

    /// The fixed occurrence, or the name-hint fallback.
    fn select_root(
        &self,
        occurrences: &HashMap<&str, &Occurrence>,
    ) -> Result<String, KinematicsError> {
        let mut fixed = self.assembly.occurrences.iter().filter(|o| o.fixed);
        if let Some(occ) = fixed.next() {
            if fixed.next().is_some() {
                log::warn!("multiple fixed occurrences; using the first in document order");
            }
            if let Some(key) = occ.key() {
                return Ok(key.to_string());
            }
        }

        if let Some(hint) = &self.root_name_hint {
            let found = self
                .assembly
                .instances
                .iter()
                .find(|i| i.name.to_lowercase().contains(hint))
                .and_then(|i| occurrences.contains_key(i.id.as_str()).then(|| i.id.clone()));
            if let Some(key) = found {
                log::debug!("no fixed occurrence; root '{key}' resolved by name hint");
                return Ok(key);
            }
        }

        Err(KinematicsError::MissingOccurrence(
            "fixed root occurrence".to_string(),
        ))
    }

    /// Pick the mover among the joint's participants: whichever is not the
    /// root. If neither is, the moving side listed first wins.
    fn resolve_mover(
        &self,
        spec: &JointSpec,
        root_key: &str,
        occurrences: &HashMap<&str, &Occurrence>,
    ) -> Result<String, KinematicsError> {
        for key in &spec.participants {
            if !occurrences.contains_key(key.as_str()) {
                return Err(KinematicsError::MissingOccurrence(key.clone()));
            }
        }
        let mover = spec
            .participants
            .iter()
            .find(|key| key.as_str() != root_key)
            .ok_or_else(|| KinematicsError::MissingOccurrence(format!("mover of joint {}", spec.name)))?;
        Ok(mover.clone())
    }

    fn body_for(
        &self,
        key: &str,
        instances: &HashMap<&str, &Instance>,
        pose: &Pose,
        parent: Pose,
    ) -> KinematicBody {
        let instance = instances.get(key).copied();
        let name = instance
            .map(|i| sanitize_name(&i.name))
            .unwrap_or_else(|| sanitize_name(key));
        KinematicBody {
            name,
            instance_id: key.to_string(),
            is_part: instance.is_some_and(|i| i.kind == InstanceKind::Part),
            local_position: pose.position - parent.position,
            local_orientation: pose.orientation,
            joint: None,
            children: Vec::new(),
        }
    }
}

fn occurrence_pose(occ: &Occurrence) -> Result<Pose, KinematicsError> {
    pose_from_flat(&occ.transform).map_err(|source| KinematicsError::InvalidTransform {
        key: occ.key().unwrap_or_default().to_string(),
        source,
    })
}

fn nearest_side(
    position: &Vector3<f64>,
    root: &Vector3<f64>,
    mover: Option<&Pose>,
) -> AttachSide {
    match mover {
        Some(mover) if (position - mover.position).norm() < (position - root).norm() => {
            AttachSide::Mover
        }
        _ => AttachSide::Anchor,
    }
}

/// Derive a scene-safe name: lowercase alphanumerics, runs of anything
/// else collapsed to single underscores.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        "body".to_string()
    } else {
        out
    }
}
