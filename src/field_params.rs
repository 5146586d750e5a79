use crate::error::Error;
use crate::field::FieldConfig;
use crate::particle::ParticleKind;
use serde::{Deserialize, Serialize};

// Parameters that define the particle host. These don't change at runtime.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FieldParams {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub fps: f64,

    // Smoke sprite. A soft puff is synthesized when this is unset.
    #[serde(default)]
    pub sprite_path: Option<String>,

    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,

    #[serde(default)]
    pub render: RenderParams,
}

/// One toggle button: a particle kind and quantity, kept exactly as written
/// so that bad values can fall through to an inert field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Preset {
    pub kind: String,
    pub quantity: i64,
}

impl Preset {
    pub fn new(kind: ParticleKind, quantity: i64) -> Self {
        Preset {
            kind: kind.name().to_string(),
            quantity,
        }
    }

    pub fn resolve(&self, frame_rate: f64) -> Result<FieldConfig, Error> {
        let kind = self.kind.parse::<ParticleKind>()?;
        if self.quantity <= 0 {
            return Err(Error::InvalidQuantity(self.quantity));
        }
        Ok(FieldConfig {
            kind,
            count: self.quantity as usize,
            frame_rate,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderParams {
    pub frames: u32,
    // Write a PNG every this many frames; 0 disables snapshots.
    pub snapshot_every: u32,
    pub output_dir: String,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            frames: 600,
            snapshot_every: 0,
            output_dir: "frames".to_string(),
        }
    }
}

fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new(ParticleKind::Mist, 2000),
        Preset::new(ParticleKind::Smoke, 60),
        Preset::new(ParticleKind::Scatter, 300),
    ]
}

impl std::str::FromStr for FieldParams {
    type Err = toml::de::Error;
    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let params = toml::from_str(serialized)?;
        Ok(params)
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        FieldParams {
            canvas_width: 800,
            canvas_height: 600,
            fps: 60.0,
            sprite_path: None,
            presets: default_presets(),
            render: RenderParams::default(),
        }
    }
}

pub fn get_config_from_default_file() -> FieldParams {
    let config_data = include_str!("../field_config.toml");
    match config_data.parse() {
        Ok(params) => params,
        Err(e) => {
            log::error!(
                "Failed to parse config file({}): {:?}",
                "../field_config.toml",
                e
            );
            FieldParams::default()
        }
    }
}
