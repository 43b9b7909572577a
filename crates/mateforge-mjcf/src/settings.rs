//! Serializer settings.

/// Settings for MJCF generation.
#[derive(Debug, Clone)]
pub struct MjcfSettings {
    /// Model name written on the `<mujoco>` element.
    pub model_name: String,
    /// Mesh directory referenced by the compiler element.
    pub mesh_dir: String,
    /// Gravity vector.
    pub gravity: [f64; 3],
    /// Simulation timestep in seconds.
    pub timestep: f64,
    /// Emit a checkered ground plane and a light.
    pub ground_plane: bool,
}

impl Default for MjcfSettings {
    fn default() -> Self {
        Self {
            model_name: "assembly".to_string(),
            mesh_dir: "meshes".to_string(),
            gravity: [0.0, 0.0, -9.81],
            timestep: 0.002,
            ground_plane: true,
        }
    }
}
