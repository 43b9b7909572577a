//! mateforge CLI — convert CAD assembly exports to MuJoCo MJCF scenes.
//!
//! Reads an assembly definition and a mesh-export manifest (both JSON,
//! produced by the assembly-data collaborator) and writes a single MJCF
//! file describing the kinematic tree.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use mateforge_ir::{AssemblyDocument, MeshManifest};
use mateforge_kinematics::{classify_mates, TreeBuilder};
use mateforge_mjcf::{write_mjcf, MjcfSettings};

#[derive(Parser)]
#[command(name = "mateforge")]
#[command(about = "Convert CAD assembly exports to MuJoCo MJCF scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an assembly definition and mesh manifest to an MJCF scene
    Convert(ConvertArgs),
    /// Display information about an assembly definition
    Info {
        /// Assembly definition JSON
        assembly: PathBuf,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Assembly definition JSON (instances, occurrences, mates)
    assembly: PathBuf,
    /// Mesh manifest JSON ({instanceId, filename} pairs)
    meshes: PathBuf,
    /// Output MJCF file
    #[arg(short, long, default_value = "robot.xml")]
    output: PathBuf,
    /// Model name written to the MJCF header
    #[arg(long)]
    model_name: Option<String>,
    /// Mesh directory referenced by the MJCF compiler element
    #[arg(long)]
    mesh_dir: Option<String>,
    /// Instance-name fragment used to pick the root when no occurrence
    /// is marked fixed
    #[arg(long)]
    root_hint: Option<String>,
    /// Omit the ground plane and light
    #[arg(long)]
    no_ground: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => convert(args),
        Commands::Info { assembly } => show_info(&assembly),
    }
}

fn convert(args: ConvertArgs) -> Result<()> {
    let json = fs::read_to_string(&args.assembly)
        .with_context(|| format!("reading {}", args.assembly.display()))?;
    let doc = AssemblyDocument::from_json(&json)
        .with_context(|| format!("parsing {}", args.assembly.display()))?;

    let json = fs::read_to_string(&args.meshes)
        .with_context(|| format!("reading {}", args.meshes.display()))?;
    let manifest = MeshManifest::from_json(&json)
        .with_context(|| format!("parsing {}", args.meshes.display()))?;

    let (joints, mut diagnostics) = classify_mates(&doc.root_assembly.features);

    let mut builder = TreeBuilder::new(&doc.root_assembly);
    if let Some(hint) = &args.root_hint {
        builder = builder.root_name_hint(hint);
    }
    let tree = builder.build(&joints)?;

    let mut settings = MjcfSettings {
        ground_plane: !args.no_ground,
        ..MjcfSettings::default()
    };
    if let Some(name) = args.model_name {
        settings.model_name = name;
    }
    if let Some(dir) = args.mesh_dir {
        settings.mesh_dir = dir;
    }

    let scene = write_mjcf(&tree, &manifest, &settings);
    diagnostics.extend(scene.diagnostics);

    // One complete write, only after the whole tree serialized.
    fs::write(&args.output, &scene.xml)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} ({} bodies, {} joint{})",
        args.output.display(),
        tree.bodies().len(),
        tree.joint_count(),
        if tree.joint_count() == 1 { "" } else { "s" }
    );
    for diag in &diagnostics {
        println!("  warning: {diag}");
    }

    Ok(())
}

fn show_info(assembly_path: &PathBuf) -> Result<()> {
    let json = fs::read_to_string(assembly_path)
        .with_context(|| format!("reading {}", assembly_path.display()))?;
    let doc = AssemblyDocument::from_json(&json)?;
    let root = &doc.root_assembly;

    println!("assembly: {}", assembly_path.display());
    println!("  Instances: {}", root.instances.len());
    println!("  Occurrences: {}", root.occurrences.len());
    println!("  Mate features: {}", root.features.len());

    let fixed: Vec<&str> = root
        .occurrences
        .iter()
        .filter(|o| o.fixed)
        .filter_map(|o| o.key())
        .collect();
    if fixed.is_empty() {
        println!("  Fixed occurrence: none");
    }
    for key in fixed {
        let name = root
            .instance(key)
            .map(|i| i.name.as_str())
            .unwrap_or("unnamed");
        println!("  Fixed occurrence: {name} ({key})");
    }

    for feature in &root.features {
        let data = &feature.feature_data;
        let suppressed = if feature.suppressed { " [SUPPRESSED]" } else { "" };
        println!("  - {} ({}){suppressed}", data.name, data.mate_type);
    }

    Ok(())
}
