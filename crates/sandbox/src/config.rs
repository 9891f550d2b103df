//! Sandbox configuration (run length, terrain, tuning, player script).
//! Loaded from sandbox.ron at startup.

use locomotion::{GroundingPolicy, LocomotionConfig, ProbeWeighting, SurfaceMask};
use physics::walkable_surfaces;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Persistent sandbox settings. Every field is optional in the RON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Seed for terrain noise and drone wander.
    pub seed: u64,
    /// Simulated run length in seconds.
    pub duration_seconds: f32,
    /// Fixed physics rate in Hz.
    pub fixed_rate_hz: f64,
    /// Length of one simulated render frame in milliseconds.
    pub frame_ms: u64,
    /// Seconds between status log lines.
    pub report_interval_seconds: f32,
    pub drone_count: u32,
    /// Radius of the ring drones spawn on, and of the area they wander in.
    pub drone_ring_radius: f32,
    /// Player tuning. Fields left out keep the player preset.
    #[serde(deserialize_with = "player_tuning")]
    pub player: LocomotionConfig,
    /// Drone tuning. Fields left out keep the hover-drone preset.
    #[serde(deserialize_with = "drone_tuning")]
    pub drone: LocomotionConfig,
    pub terrain: TerrainSettings,
    pub player_script: Vec<ScriptPhase>,
}

/// Uneven terrain plus the fixed obstacles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Side length of the square heightfield (m).
    pub size: f32,
    /// Samples per side.
    pub resolution: usize,
    /// Peak-to-trough height of the noise (m). Zero gives a flat floor.
    pub height_scale: f32,
    /// Noise frequency (lower = smoother).
    pub frequency: f64,
    pub octaves: u32,
    /// Ramp center on the X axis.
    pub ramp_x: f32,
    pub ramp_angle_degrees: f32,
    /// Thin wall position on the X axis.
    pub wall_x: f32,
    /// Thin wall half thickness (m).
    pub wall_half_thickness: f32,
}

/// One segment of the scripted player input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPhase {
    /// Phase ends at this simulated time (s).
    pub until: f32,
    /// Facing; 0 looks down -Z, -90 looks down +X.
    pub yaw_degrees: f32,
    pub forward: f32,
    pub strafe: f32,
    pub sprint: bool,
    pub jump: bool,
    pub hover: bool,
}

impl Default for ScriptPhase {
    fn default() -> Self {
        Self {
            until: 0.0,
            yaw_degrees: 0.0,
            forward: 0.0,
            strafe: 0.0,
            sprint: false,
            jump: false,
            hover: true,
        }
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            size: 96.0,
            resolution: 65,
            height_scale: 1.5,
            frequency: 0.04,
            octaves: 3,
            ramp_x: 10.0,
            ramp_angle_degrees: 20.0,
            wall_x: 30.0,
            wall_half_thickness: 0.05,
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            duration_seconds: 12.0,
            fixed_rate_hz: 60.0,
            frame_ms: 16,
            report_interval_seconds: 1.0,
            drone_count: 4,
            drone_ring_radius: 8.0,
            player: default_player(),
            drone: default_drone(),
            terrain: TerrainSettings::default(),
            player_script: default_player_script(),
        }
    }
}

fn default_player() -> LocomotionConfig {
    LocomotionConfig {
        walkable_mask: walkable_surfaces(),
        ..LocomotionConfig::player()
    }
}

fn default_drone() -> LocomotionConfig {
    LocomotionConfig {
        walkable_mask: walkable_surfaces(),
        ..LocomotionConfig::hover_drone()
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

macro_rules! tuning_overrides {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// A tuning section as written in the file: only the fields it names.
        #[derive(Debug, Default, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        struct TuningOverrides {
            $(
                #[serde(deserialize_with = "present")]
                $field: Option<$ty>,
            )*
        }

        impl TuningOverrides {
            fn apply(self, mut base: LocomotionConfig) -> LocomotionConfig {
                $(
                    if let Some(value) = self.$field {
                        base.$field = value;
                    }
                )*
                base
            }
        }
    };
}

tuning_overrides! {
    max_speed: f32,
    sprint_speed: f32,
    sprint_requires_forward: bool,
    ground_acceleration: f32,
    air_acceleration: f32,
    ground_friction: f32,
    stop_speed: f32,
    jump_force: f32,
    jump_cooldown: f32,
    auto_bunny_hop: bool,
    hover_enabled: bool,
    hover_height: f32,
    hover_force: f32,
    hover_damping: f32,
    max_hover_correction: f32,
    ground_check_distance: f32,
    grid_ray_radius: f32,
    probe_weighting: ProbeWeighting,
    grounding_policy: GroundingPolicy,
    walkable_mask: SurfaceMask,
    slope_limit_degrees: f32,
    steep_slide_force: f32,
    steep_climb_damping: f32,
    landing_fall_threshold: f32,
    landing_recovery_force: f32,
    landing_recovery_epsilon: f32,
    gravity: f32,
    gravity_scale: f32,
    prediction_time: f32,
    prediction_radius: f32,
    wall_repulsion: f32,
    tunneling_min_speed: f32,
}

fn player_tuning<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LocomotionConfig, D::Error> {
    TuningOverrides::deserialize(deserializer).map(|section| section.apply(default_player()))
}

fn drone_tuning<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LocomotionConfig, D::Error> {
    TuningOverrides::deserialize(deserializer).map(|section| section.apply(default_drone()))
}

/// Settle, walk over the ramp, bunny-hop back, sprint into the thin wall, then drop and re-hover.
fn default_player_script() -> Vec<ScriptPhase> {
    let phase = ScriptPhase::default();
    vec![
        ScriptPhase { until: 1.0, ..phase },
        ScriptPhase {
            until: 3.5,
            yaw_degrees: -90.0,
            forward: 1.0,
            ..phase
        },
        ScriptPhase {
            until: 5.5,
            yaw_degrees: 90.0,
            forward: 1.0,
            sprint: true,
            jump: true,
            ..phase
        },
        ScriptPhase {
            until: 9.0,
            yaw_degrees: -90.0,
            forward: 1.0,
            sprint: true,
            ..phase
        },
        ScriptPhase {
            until: 10.0,
            hover: false,
            ..phase
        },
        ScriptPhase { until: f32::MAX, ..phase },
    ]
}

impl SandboxConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Save current config to `path`. Logs on error.
    pub fn save(&self, path: &Path) {
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Script phase active at simulated time `t`; the last phase holds forever.
    pub fn phase_at(&self, t: f32) -> ScriptPhase {
        self.player_script
            .iter()
            .find(|phase| t < phase.until)
            .or(self.player_script.last())
            .copied()
            .unwrap_or_default()
    }
}

/// `sandbox.ron` in the current directory.
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("sandbox.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let text = "(seed: 42, drone: (hover_height: 2.0), terrain: (height_scale: 0.0))";
        let config: SandboxConfig = ron::from_str(text).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.drone.hover_height, 2.0);
        assert_eq!(config.drone.max_speed, LocomotionConfig::hover_drone().max_speed);
        assert_eq!(config.player, SandboxConfig::default().player);
        assert_eq!(config.terrain.height_scale, 0.0);
        assert_eq!(config.terrain.resolution, TerrainSettings::default().resolution);
        assert_eq!(config.player_script.len(), default_player_script().len());
    }

    #[test]
    fn partial_sections_keep_their_own_preset() {
        let config: SandboxConfig =
            ron::from_str("(player: (max_speed: 9.0), drone: (max_speed: 6.0))").unwrap();
        let defaults = SandboxConfig::default();

        assert_eq!(config.drone.max_speed, 6.0);
        assert_eq!(
            config.drone,
            LocomotionConfig {
                max_speed: 6.0,
                ..defaults.drone
            }
        );
        assert!(matches!(
            config.drone.grounding_policy,
            GroundingPolicy::AngleAndProximity { .. }
        ));
        assert_eq!(config.drone.probe_weighting, ProbeWeighting::InverseDistance);
        assert_eq!(config.drone.walkable_mask, walkable_surfaces());

        assert_eq!(config.player.max_speed, 9.0);
        assert_eq!(config.player.walkable_mask, walkable_surfaces());
        assert_eq!(config.player.hover_height, defaults.player.hover_height);
    }

    #[test]
    fn full_tuning_section_overrides_every_field() {
        // The drone preset written out in full replaces the player preset entirely.
        let drone = default_drone();
        let section = ron::to_string(&drone).unwrap();
        let config: SandboxConfig = ron::from_str(&format!("(player: {section})")).unwrap();
        assert_eq!(config.player, drone);
    }

    #[test]
    fn unknown_tuning_field_is_rejected() {
        let parsed = ron::from_str::<SandboxConfig>("(drone: (max_sped: 6.0))");
        assert!(parsed.is_err());
    }

    #[test]
    fn shipped_file_matches_defaults() {
        let shipped: SandboxConfig = ron::from_str(include_str!("../../../sandbox.ron")).unwrap();
        let defaults = SandboxConfig::default();
        assert_eq!(shipped.player, defaults.player);
        assert_eq!(shipped.drone, defaults.drone);
        assert_eq!(shipped.seed, defaults.seed);
        assert_eq!(shipped.player_script, defaults.player_script);
    }

    #[test]
    fn default_drone_uses_proximity_grounding() {
        let config = SandboxConfig::default();
        assert!(matches!(
            config.drone.grounding_policy,
            GroundingPolicy::AngleAndProximity { .. }
        ));
        assert_eq!(config.player.walkable_mask, walkable_surfaces());
    }

    #[test]
    fn phase_lookup_follows_script() {
        let config = SandboxConfig::default();
        assert_eq!(config.phase_at(0.5).forward, 0.0);
        assert_eq!(config.phase_at(2.0).yaw_degrees, -90.0);
        assert!(config.phase_at(4.0).jump);
        assert!(!config.phase_at(9.5).hover);
        assert!(config.phase_at(500.0).hover);
    }

    #[test]
    fn empty_script_idles() {
        let config = SandboxConfig {
            player_script: Vec::new(),
            ..SandboxConfig::default()
        };
        assert_eq!(config.phase_at(3.0), ScriptPhase::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = SandboxConfig::load(Path::new("/nonexistent/sandbox.ron"));
        assert_eq!(config.seed, SandboxConfig::default().seed);
    }
}
