//! MJCF document writer.

use mateforge_ir::MeshManifest;
use mateforge_kinematics::{Diagnostic, JointKind, JointSpec, KinematicBody, KinematicTree};
use nalgebra::{UnitQuaternion, Vector3};

use crate::settings::MjcfSettings;

/// A serialized MJCF scene plus the findings recorded while emitting it.
#[derive(Debug, Clone)]
pub struct MjcfDocument {
    /// The complete scene description.
    pub xml: String,
    /// Non-fatal findings (missing geometry, skipped joints).
    pub diagnostics: Vec<Diagnostic>,
}

/// Serialize a kinematic tree into an MJCF scene.
///
/// Bodies emit depth-first with 6-decimal pose attributes. Exactly one
/// joint — the first encountered in tree order — is serialized, paired
/// with one actuator; further joints are skipped with a warning. A part
/// body without a mesh manifest entry is still emitted, minus its
/// geometry, and a [`Diagnostic::MissingGeometry`] is recorded.
pub fn write_mjcf(
    tree: &KinematicTree,
    manifest: &MeshManifest,
    settings: &MjcfSettings,
) -> MjcfDocument {
    let mut writer = Writer {
        out: String::new(),
        diagnostics: Vec::new(),
        emitted_joint: None,
        manifest,
        settings,
    };
    writer.document(tree);
    MjcfDocument {
        xml: writer.out,
        diagnostics: writer.diagnostics,
    }
}

struct Writer<'a> {
    out: String,
    diagnostics: Vec<Diagnostic>,
    emitted_joint: Option<String>,
    manifest: &'a MeshManifest,
    settings: &'a MjcfSettings,
}

impl Writer<'_> {
    fn document(&mut self, tree: &KinematicTree) {
        let s = self.settings;
        self.line(0, &format!("<mujoco model=\"{}\">", s.model_name));
        self.line(
            1,
            &format!(
                "<compiler angle=\"radian\" meshdir=\"{}\" autolimits=\"true\"/>",
                s.mesh_dir
            ),
        );
        let g = s.gravity;
        self.line(
            1,
            &format!(
                "<option gravity=\"{}\" timestep=\"{}\"/>",
                fmt3(g[0], g[1], g[2]),
                fmt(s.timestep)
            ),
        );
        self.line(1, "<visual>");
        self.line(2, "<global offwidth=\"1280\" offheight=\"720\"/>");
        self.line(1, "</visual>");

        self.assets(tree);

        self.line(1, "<worldbody>");
        if self.settings.ground_plane {
            self.line(
                2,
                "<geom name=\"ground\" type=\"plane\" size=\"1 1 0.1\" pos=\"0 0 0\" material=\"grid_mat\"/>",
            );
            self.line(
                2,
                "<light name=\"light\" pos=\"0.3 0.3 0.5\" dir=\"-0.3 -0.3 -0.5\"/>",
            );
        }
        self.body(&tree.root, 2);
        self.line(1, "</worldbody>");

        if let Some(joint_name) = self.emitted_joint.clone() {
            self.line(1, "<actuator>");
            self.line(
                2,
                &format!(
                    "<motor name=\"{joint_name}_motor\" joint=\"{joint_name}\" gear=\"100\" ctrllimited=\"true\" ctrlrange=\"-1 1\"/>"
                ),
            );
            self.line(1, "</actuator>");
        }
        self.line(0, "</mujoco>");
    }

    fn assets(&mut self, tree: &KinematicTree) {
        self.line(1, "<asset>");
        if self.settings.ground_plane {
            self.line(
                2,
                "<texture name=\"grid\" type=\"2d\" builtin=\"checker\" rgb1=\"0.1 0.2 0.3\" rgb2=\"0.2 0.3 0.4\" width=\"512\" height=\"512\"/>",
            );
            self.line(
                2,
                "<material name=\"grid_mat\" texture=\"grid\" texrepeat=\"5 5\" reflectance=\"0.2\"/>",
            );
        }
        for body in tree.bodies() {
            if !body.is_part {
                continue;
            }
            if let Some(filename) = self.manifest.filename_for(&body.instance_id) {
                self.line(
                    2,
                    &format!("<mesh name=\"{}\" file=\"{}\"/>", body.name, filename),
                );
            }
        }
        self.line(1, "</asset>");
    }

    fn body(&mut self, body: &KinematicBody, depth: usize) {
        self.line(
            depth,
            &format!(
                "<body name=\"{}\" pos=\"{}\" quat=\"{}\">",
                body.name,
                fmt_vec(&body.local_position),
                fmt_quat(&body.local_orientation)
            ),
        );
        self.line(
            depth + 1,
            "<inertial pos=\"0 0 0\" mass=\"0.010000\" diaginertia=\"0.000001 0.000001 0.000001\"/>",
        );

        if let Some(joint) = &body.joint {
            if self.emitted_joint.is_none() {
                self.joint(joint, depth + 1);
                self.emitted_joint = Some(joint.name.clone());
            } else {
                // Single-joint scope: the data model allows more, the
                // serializer does not yet.
                log::warn!("additional joint '{}' skipped", joint.name);
            }
        }

        self.geom(body, depth + 1);

        for child in &body.children {
            self.body(child, depth + 1);
        }
        self.line(depth, "</body>");
    }

    fn joint(&mut self, joint: &JointSpec, depth: usize) {
        let mut attrs = format!(
            "name=\"{}\" type=\"{}\"",
            joint.name,
            joint.kind.type_name()
        );
        match &joint.kind {
            JointKind::Hinge { axis } | JointKind::Slide { axis } => {
                attrs.push_str(&format!(" axis=\"{}\"", fmt_vec(axis)));
            }
            JointKind::Ball => {}
        }
        if let Some((min, max)) = joint.range {
            attrs.push_str(&format!(" range=\"{} {}\"", fmt(min), fmt(max)));
        }
        attrs.push_str(&format!(" damping=\"{}\"", fmt(joint.damping)));
        self.line(depth, &format!("<joint {attrs}/>"));
    }

    fn geom(&mut self, body: &KinematicBody, depth: usize) {
        if !body.is_part {
            return;
        }
        if self.manifest.filename_for(&body.instance_id).is_some() {
            self.line(
                depth,
                &format!("<geom type=\"mesh\" mesh=\"{}\"/>", body.name),
            );
        } else {
            let diag = Diagnostic::MissingGeometry {
                body: body.name.clone(),
            };
            log::warn!("{diag}");
            self.diagnostics.push(diag);
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn fmt(x: f64) -> String {
    format!("{x:.6}")
}

fn fmt3(x: f64, y: f64, z: f64) -> String {
    format!("{x:.6} {y:.6} {z:.6}")
}

fn fmt_vec(v: &Vector3<f64>) -> String {
    fmt3(v.x, v.y, v.z)
}

fn fmt_quat(q: &UnitQuaternion<f64>) -> String {
    format!("{:.6} {:.6} {:.6} {:.6}", q.w, q.i, q.j, q.k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mateforge_ir::{
        Instance, InstanceKind, MateConnector, MateData, MateFeature, MateLimits, MatedEntity,
        MeshEntry, Occurrence, RootAssembly,
    };
    use mateforge_kinematics::{classify_mates, TreeBuilder};

    fn identity_at(x: f64, y: f64, z: f64) -> [f64; 16] {
        [
            1.0, 0.0, 0.0, x, //
            0.0, 1.0, 0.0, y, //
            0.0, 0.0, 1.0, z, //
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    fn part(id: &str, name: &str) -> Instance {
        Instance {
            id: id.to_string(),
            name: name.to_string(),
            kind: InstanceKind::Part,
            part_id: Some(format!("P{id}")),
        }
    }

    fn occurrence(key: &str, pos: [f64; 3], fixed: bool) -> Occurrence {
        Occurrence {
            path: vec![key.to_string()],
            transform: identity_at(pos[0], pos[1], pos[2]),
            fixed,
            hidden: false,
        }
    }

    fn mate(name: &str, mate_type: &str, mover: &str, anchor: &str) -> MateFeature {
        let entity = |key: &str| MatedEntity {
            mated_occurrence: vec![key.to_string()],
            mated_cs: MateConnector {
                origin: [0.1, 0.0, 0.0],
                z_axis: [0.0, 1.0, 0.0],
            },
        };
        MateFeature {
            id: None,
            feature_type: Some("mate".to_string()),
            suppressed: false,
            feature_data: MateData {
                name: name.to_string(),
                mate_type: mate_type.to_string(),
                mated_entities: vec![entity(mover), entity(anchor)],
                limits: Some(MateLimits {
                    min: -1.5708,
                    max: 1.5708,
                }),
            },
        }
    }

    /// Root at the origin, mover at (0.1, 0, 0), one static part beside
    /// each, and a single cylindrical mate between root and mover.
    fn assembly(mate_type: &str) -> RootAssembly {
        RootAssembly {
            instances: vec![
                part("M1", "Motor"),
                part("H1", "Horn"),
                part("J1", "Joint #1"),
                part("J2", "Joint #2"),
            ],
            occurrences: vec![
                occurrence("M1", [0.0, 0.0, 0.0], true),
                occurrence("J2", [0.01, 0.0, 0.0], false),
                occurrence("H1", [0.1, 0.0, 0.0], false),
                occurrence("J1", [0.09, 0.0, 0.0], false),
            ],
            features: vec![mate("Servo rotation", mate_type, "H1", "M1")],
        }
    }

    fn manifest() -> MeshManifest {
        MeshManifest {
            entries: ["M1", "H1", "J1", "J2"]
                .iter()
                .map(|id| MeshEntry {
                    instance_id: id.to_string(),
                    filename: format!("{}.stl", id.to_lowercase()),
                })
                .collect(),
        }
    }

    fn convert(mate_type: &str, manifest: &MeshManifest) -> MjcfDocument {
        let assembly = assembly(mate_type);
        let (joints, diags) = classify_mates(&assembly.features);
        let tree = TreeBuilder::new(&assembly).build(&joints).expect("tree");
        let mut doc = write_mjcf(&tree, manifest, &MjcfSettings::default());
        doc.diagnostics.extend(diags);
        doc
    }

    #[test]
    fn end_to_end_cylindrical_assembly() {
        let doc = convert("CYLINDRICAL", &manifest());
        let xml = &doc.xml;

        assert!(doc.diagnostics.is_empty());
        // Mover body sits at its parent-relative offset.
        assert!(xml.contains("<body name=\"horn\" pos=\"0.100000 0.000000 0.000000\""));
        assert!(xml.contains("quat=\"1.000000 0.000000 0.000000 0.000000\""));
        // Exactly one joint/actuator pair.
        assert_eq!(xml.matches("<joint ").count(), 1);
        assert_eq!(xml.matches("<motor ").count(), 1);
        assert!(xml.contains(
            "<joint name=\"servo_rotation\" type=\"hinge\" axis=\"0.000000 1.000000 0.000000\" range=\"-1.570800 1.570800\" damping=\"0.010000\"/>"
        ));
        assert!(xml.contains("<motor name=\"servo_rotation_motor\" joint=\"servo_rotation\""));
        // Statics nest under their respective parents.
        let j2 = xml.find("<body name=\"joint_2\"").expect("joint_2 body");
        let horn = xml.find("<body name=\"horn\"").expect("horn body");
        let j1 = xml.find("<body name=\"joint_1\"").expect("joint_1 body");
        assert!(j2 < horn && horn < j1);
        // All four meshes referenced.
        assert_eq!(xml.matches("<mesh ").count(), 4);
        assert_eq!(xml.matches("type=\"mesh\"").count(), 4);
    }

    #[test]
    fn unknown_mate_completes_without_joints() {
        let doc = convert("SCREW", &manifest());

        assert_eq!(doc.xml.matches("<joint ").count(), 0);
        assert_eq!(doc.xml.matches("<motor ").count(), 0);
        assert!(!doc.xml.contains("<actuator>"));
        assert_eq!(
            doc.diagnostics,
            vec![Diagnostic::UnknownMateKind {
                mate: "Servo rotation".to_string(),
                tag: "SCREW".to_string(),
            }]
        );
        // All bodies still attach to the root.
        assert!(doc.xml.contains("<body name=\"horn\""));
    }

    #[test]
    fn missing_geometry_is_non_fatal() {
        let mut m = manifest();
        m.entries.retain(|e| e.instance_id != "J1");
        let doc = convert("CYLINDRICAL", &m);

        // The body is still present, just without a geom or asset.
        assert!(doc.xml.contains("<body name=\"joint_1\""));
        assert_eq!(doc.xml.matches("<mesh ").count(), 3);
        assert_eq!(doc.xml.matches("type=\"mesh\"").count(), 3);
        assert!(doc.diagnostics.contains(&Diagnostic::MissingGeometry {
            body: "joint_1".to_string(),
        }));
    }

    #[test]
    fn ball_joint_has_no_axis_attribute() {
        let doc = convert("BALL", &manifest());
        let joint_line = doc
            .xml
            .lines()
            .find(|l| l.contains("<joint "))
            .expect("joint element");
        assert!(joint_line.contains("type=\"ball\""));
        assert!(!joint_line.contains("axis="));
    }

    #[test]
    fn header_carries_settings() {
        let settings = MjcfSettings {
            model_name: "servo_rig".to_string(),
            mesh_dir: "output/meshes".to_string(),
            ground_plane: false,
            ..MjcfSettings::default()
        };
        let assembly = assembly("CYLINDRICAL");
        let (joints, _) = classify_mates(&assembly.features);
        let tree = TreeBuilder::new(&assembly).build(&joints).unwrap();
        let doc = write_mjcf(&tree, &manifest(), &settings);

        assert!(doc.xml.starts_with("<mujoco model=\"servo_rig\">"));
        assert!(doc.xml.contains("meshdir=\"output/meshes\""));
        assert!(doc.xml.contains("gravity=\"0.000000 0.000000 -9.810000\""));
        assert!(!doc.xml.contains("grid_mat"));
        assert!(doc.xml.trim_end().ends_with("</mujoco>"));
    }
}
