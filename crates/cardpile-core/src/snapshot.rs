use bytemuck::{Pod, Zeroable};
use cardpile_platform::NodeTransform;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PileConfig, PileControls};

/// Evaluated state of a pile, for export or debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileSnapshot {
    pub config: PileConfig,
    pub controls: PileControls,
    pub nodes: Vec<NodeTransform>,
}

impl PileSnapshot {
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// GPU instance record for one card. Rotation is in radians here.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CardInstance {
    pub position: [f32; 2],
    pub rotation: f32,
    pub index: u32,
}

impl CardInstance {
    pub fn new(index: usize, node: &NodeTransform) -> Self {
        Self {
            position: node.position.to_array(),
            rotation: node.rotation.to_radians(),
            index: index as u32,
        }
    }
}

pub fn instance_bytes(instances: &[CardInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
