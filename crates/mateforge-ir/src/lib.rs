//! Input document model for the mateforge assembly converter.
//!
//! This crate defines the read-only structures produced by the assembly-data
//! collaborator: the assembly definition (instances, occurrences, mate
//! features) and the mesh-export manifest. Field names mirror the vendor's
//! JSON, so the documents deserialize directly from the collaborator's
//! output files.
//!
//! Everything here is constructed once from JSON and never mutated; the
//! kinematics pipeline only borrows these documents.

use serde::{Deserialize, Serialize};

/// Top-level assembly definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyDocument {
    /// The root assembly: instances, occurrences, and mate features.
    pub root_assembly: RootAssembly,
}

impl AssemblyDocument {
    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The root assembly's structural graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootAssembly {
    /// Definitional entities (parts and sub-assemblies).
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// Placed instances carrying world-frame poses.
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    /// Mate features (mechanical constraints).
    #[serde(default)]
    pub features: Vec<MateFeature>,
}

impl RootAssembly {
    /// Look up an instance by id.
    pub fn instance(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    /// Look up an occurrence by its path key.
    pub fn occurrence(&self, key: &str) -> Option<&Occurrence> {
        self.occurrences.iter().find(|o| o.key() == Some(key))
    }
}

/// Type tag of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceKind {
    /// A part with exported geometry.
    Part,
    /// A sub-assembly.
    Assembly,
    /// Any other vendor type tag; carried but not converted.
    Other,
}

impl From<String> for InstanceKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Part" => Self::Part,
            "Assembly" => Self::Assembly,
            _ => Self::Other,
        }
    }
}

impl From<InstanceKind> for String {
    fn from(kind: InstanceKind) -> Self {
        match kind {
            InstanceKind::Part => "Part",
            InstanceKind::Assembly => "Assembly",
            InstanceKind::Other => "Other",
        }
        .to_string()
    }
}

/// A definitional part or sub-assembly, referenced by occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Unique instance id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Part vs. sub-assembly tag.
    #[serde(rename = "type")]
    pub kind: InstanceKind,
    /// Vendor part id, present when `kind` is [`InstanceKind::Part`].
    #[serde(default)]
    pub part_id: Option<String>,
}

/// A placed instance within the assembly, with a world-frame pose.
///
/// `path` is an ordered sequence of instance ids; the first element is the
/// occurrence's own instance id and serves as its unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Ordered instance-id path; `path[0]` is the unique key.
    pub path: Vec<String>,
    /// Flattened 4x4 homogeneous transform, row-major, translation at
    /// flat offsets 3, 7 and 11.
    pub transform: [f64; 16],
    /// Whether this occurrence is immovable (the kinematic root).
    #[serde(default)]
    pub fixed: bool,
    /// Whether this occurrence is hidden in the assembly.
    #[serde(default)]
    pub hidden: bool,
}

impl Occurrence {
    /// The occurrence's unique key (its own instance id).
    pub fn key(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// The local origin+axis frame a mate acts through on one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MateConnector {
    /// Connector origin in world coordinates.
    pub origin: [f64; 3],
    /// Principal (z) axis of the connector frame.
    pub z_axis: [f64; 3],
}

/// One participant of a mate feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatedEntity {
    /// Occurrence path of the participant; `[0]` is the occurrence key.
    pub mated_occurrence: Vec<String>,
    /// Connector frame on this participant.
    #[serde(rename = "matedCS")]
    pub mated_cs: MateConnector,
}

impl MatedEntity {
    /// The participant's occurrence key.
    pub fn key(&self) -> Option<&str> {
        self.mated_occurrence.first().map(String::as_str)
    }
}

/// Optional scalar travel limits of a mate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MateLimits {
    /// Lower limit (radians for rotational mates, metres for sliding ones).
    pub min: f64,
    /// Upper limit.
    pub max: f64,
}

/// A mate feature: a typed mechanical constraint between two or more
/// occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MateFeature {
    /// Vendor feature id.
    #[serde(default)]
    pub id: Option<String>,
    /// Vendor feature type (only `"mate"` features are classified).
    #[serde(default)]
    pub feature_type: Option<String>,
    /// Whether the feature is suppressed in the assembly.
    #[serde(default)]
    pub suppressed: bool,
    /// The mate payload.
    pub feature_data: MateData,
}

/// Payload of a mate feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MateData {
    /// Display name of the mate.
    pub name: String,
    /// Raw vendor mate type tag (e.g. `"REVOLUTE"`, `"CYLINDRICAL"`).
    pub mate_type: String,
    /// Participants, each with a connector frame. Two or more in valid
    /// input; the moving side is listed first.
    #[serde(default)]
    pub mated_entities: Vec<MatedEntity>,
    /// Optional travel limits.
    #[serde(default)]
    pub limits: Option<MateLimits>,
}

/// One mesh-export record: which file holds an instance's geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshEntry {
    /// Instance id the mesh belongs to.
    pub instance_id: String,
    /// Exported mesh filename, relative to the mesh directory.
    pub filename: String,
}

/// The mesh-export manifest: a list of `{instanceId, filename}` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshManifest {
    /// All exported mesh records.
    pub entries: Vec<MeshEntry>,
}

impl MeshManifest {
    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Filename exported for an instance, if any.
    pub fn filename_for(&self, instance_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.instance_id == instance_id)
            .map(|e| e.filename.as_str())
    }
}
