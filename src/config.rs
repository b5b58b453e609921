//! Options for the node network.
//!
//! [`NetworkConfig`] holds every tunable of the animation: graph growth,
//! particle traffic, rotation, colors and camera. Defaults reproduce the
//! classic look; JSON files use the camelCase option names
//! (`baseConnections`, `rotVelX`, ...).
//!
//! ```ignore
//! let config = NetworkConfig::default()
//!     .with_connections(3, 0)
//!     .with_sizes(5.0, 1.0, 0.7);
//! config.validate()?;
//! config.save("network.json")?;
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{HuePreset, Rgba};
use crate::error::ConfigError;

/// Complete animation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Radius of the world sphere nodes must stay inside.
    pub range: f64,
    /// Minimum children attempted per node.
    pub base_connections: u32,
    /// Extra children on top of `base_connections`, chosen uniformly in `[0, added)`.
    pub added_connections: u32,
    /// Size of the root node.
    pub base_size: f64,
    /// Nodes smaller than this do not branch.
    pub min_size: f64,
    /// Particle size relative to the nodes it travels between.
    pub data_to_connection_size: f64,
    /// Child size = parent size * multiplier.
    pub size_multiplier: f64,
    /// Minimum distance between any two nodes.
    pub allowed_dist: f64,
    /// Minimum parent-child distance.
    pub base_dist: f64,
    /// Random extra parent-child distance.
    pub added_dist: f64,
    /// Placement attempts per node.
    pub connection_attempts: u32,
    /// Particle population cap as a multiple of the node count.
    pub data_to_connections: f64,
    /// Minimum particle speed, in edge fractions per frame.
    pub base_speed: f64,
    /// Random extra particle speed.
    pub added_speed: f64,
    /// Rotation about X per frame, radians.
    pub rot_vel_x: f64,
    /// Rotation about Y per frame, radians.
    pub rot_vel_y: f64,
    /// Fill painted at the start of every frame.
    pub repaint_color: Rgba,
    /// Fill shown while the first network is being generated.
    pub loading_color: Rgba,
    pub connection_color: HuePreset,
    pub root_color: HuePreset,
    pub end_color: HuePreset,
    pub data_color: HuePreset,
    /// Stroke width of the edge wireframe.
    pub wireframe_width: f64,
    pub wireframe_color: Rgba,
    /// Camera distance from the rotation centre.
    pub depth: f64,
    pub focal_length: f64,
    /// Initial vanishing point in pixels. `None` centres it in the viewport.
    /// Resizing always recentres.
    pub vanish_point: Option<[f64; 2]>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            range: 4000.0,
            base_connections: 3,
            added_connections: 5,
            base_size: 5.0,
            min_size: 1.0,
            data_to_connection_size: 0.2,
            size_multiplier: 0.7,
            allowed_dist: 50.0,
            base_dist: 50.0,
            added_dist: 30.0,
            connection_attempts: 10,
            data_to_connections: 1.0,
            base_speed: 0.005,
            added_speed: 0.005,
            rot_vel_x: 0.00015,
            rot_vel_y: 0.000015,
            repaint_color: Rgba::opaque(0x11, 0x11, 0x11),
            loading_color: Rgba::opaque(0x22, 0x22, 0x22),
            connection_color: HuePreset::new(174.0, 63.0),
            root_color: HuePreset::new(214.0, 31.0),
            end_color: HuePreset::new(160.0, 20.0),
            data_color: HuePreset::new(80.0, 50.0),
            wireframe_width: 0.1,
            wireframe_color: Rgba::opaque(0x88, 0x88, 0xff),
            depth: 350.0,
            focal_length: 700.0,
            vanish_point: None,
        }
    }
}

impl NetworkConfig {
    /// Load a configuration from a JSON file. Missing options take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate configuration JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the branch count range `[base, base + added)`.
    pub fn with_connections(mut self, base: u32, added: u32) -> Self {
        self.base_connections = base;
        self.added_connections = added;
        self
    }

    /// Set root size, branching floor and per-level shrink factor.
    pub fn with_sizes(mut self, base: f64, min: f64, multiplier: f64) -> Self {
        self.base_size = base;
        self.min_size = min;
        self.size_multiplier = multiplier;
        self
    }

    /// Set parent-child distance range and minimum node spacing.
    pub fn with_spacing(mut self, base_dist: f64, added_dist: f64, allowed_dist: f64) -> Self {
        self.base_dist = base_dist;
        self.added_dist = added_dist;
        self.allowed_dist = allowed_dist;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn with_connection_attempts(mut self, attempts: u32) -> Self {
        self.connection_attempts = attempts;
        self
    }

    /// Set the particle population cap relative to the node count.
    pub fn with_density(mut self, data_to_connections: f64) -> Self {
        self.data_to_connections = data_to_connections;
        self
    }

    pub fn with_speed(mut self, base: f64, added: f64) -> Self {
        self.base_speed = base;
        self.added_speed = added;
        self
    }

    pub fn with_rotation(mut self, rot_vel_x: f64, rot_vel_y: f64) -> Self {
        self.rot_vel_x = rot_vel_x;
        self.rot_vel_y = rot_vel_y;
        self
    }

    pub fn with_camera(mut self, depth: f64, focal_length: f64) -> Self {
        self.depth = depth;
        self.focal_length = focal_length;
        self
    }

    #[inline]
    pub fn square_range(&self) -> f64 {
        self.range * self.range
    }

    #[inline]
    pub fn square_allowed(&self) -> f64 {
        self.allowed_dist * self.allowed_dist
    }

    /// Depth at which the fog reaches zero.
    #[inline]
    pub fn most_distant(&self) -> f64 {
        self.depth + self.range
    }

    /// Reject options that would stall generation or break the projection.
    ///
    /// A shrink factor in (0, 1) with a positive size floor is what bounds
    /// the depth of the generated tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason: "must be a positive number" })
            }
        }
        fn non_negative(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if v >= 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason: "must be zero or a positive number" })
            }
        }

        positive("range", self.range)?;
        positive("baseSize", self.base_size)?;
        positive("minSize", self.min_size)?;
        if !(self.size_multiplier > 0.0 && self.size_multiplier < 1.0) {
            return Err(ConfigError::Invalid {
                field: "sizeMultiplier",
                reason: "must be in (0, 1)",
            });
        }
        if self.connection_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "connectionAttempts",
                reason: "must be at least 1",
            });
        }
        non_negative("allowedDist", self.allowed_dist)?;
        non_negative("baseDist", self.base_dist)?;
        non_negative("addedDist", self.added_dist)?;
        non_negative("dataToConnections", self.data_to_connections)?;
        non_negative("dataToConnectionSize", self.data_to_connection_size)?;
        non_negative("baseSpeed", self.base_speed)?;
        non_negative("addedSpeed", self.added_speed)?;
        if self.base_speed + self.added_speed <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "baseSpeed",
                reason: "particles need a positive speed range",
            });
        }
        non_negative("wireframeWidth", self.wireframe_width)?;
        non_negative("depth", self.depth)?;
        positive("focalLength", self.focal_length)?;
        if !(self.rot_vel_x.is_finite() && self.rot_vel_y.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "rotVelX",
                reason: "rotation velocities must be finite",
            });
        }
        Ok(())
    }
}
