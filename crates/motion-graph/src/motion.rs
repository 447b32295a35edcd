// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Motion payloads: clip references and blend trees.

use std::sync::Arc;

use motion_cas::ClipHash;
use serde::{Deserialize, Serialize};

/// Reference to immutable clip content in a clip library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Clip {
    /// Content hash of the clip bytes.
    pub hash: ClipHash,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Blend tree interpolation mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlendType {
    /// One parameter, thresholds on a line.
    #[default]
    Simple1D,
    /// Two parameters, one motion per direction.
    SimpleDirectional2D,
    /// Two parameters, several motions per direction.
    FreeformDirectional2D,
    /// Two parameters, unrelated positions.
    FreeformCartesian2D,
    /// Each child weighted by its own parameter.
    Direct,
}

/// One weighted entry in a [`BlendTree`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlendChild {
    /// Child motion; `None` leaves the slot empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
    /// 1D threshold.
    #[serde(default)]
    pub threshold: f32,
    /// 2D position.
    #[serde(default)]
    pub position: [f32; 2],
    /// Playback speed multiplier.
    #[serde(default = "unit_time_scale")]
    pub time_scale: f32,
    /// Normalized cycle offset.
    #[serde(default)]
    pub cycle_offset: f32,
    /// Weight parameter for `Direct` trees.
    #[serde(default)]
    pub direct_blend_parameter: String,
    /// Mirror toggle.
    #[serde(default)]
    pub mirror: bool,
}

fn unit_time_scale() -> f32 {
    1.0
}

impl BlendChild {
    /// Child at `threshold` with default settings.
    #[must_use]
    pub fn new(motion: Option<Motion>, threshold: f32) -> Self {
        Self {
            motion,
            threshold,
            position: [0.0, 0.0],
            time_scale: 1.0,
            cycle_offset: 0.0,
            direct_blend_parameter: String::new(),
            mirror: false,
        }
    }
}

/// Composite motion; a tree without back-references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BlendTree {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Interpolation mode.
    #[serde(default)]
    pub blend_type: BlendType,
    /// Horizontal blend parameter.
    #[serde(default)]
    pub blend_parameter: String,
    /// Vertical blend parameter (2D modes).
    #[serde(default)]
    pub blend_parameter_y: String,
    /// Lower threshold bound.
    #[serde(default)]
    pub min_threshold: f32,
    /// Upper threshold bound.
    #[serde(default = "unit_time_scale")]
    pub max_threshold: f32,
    /// Thresholds are computed rather than authored.
    #[serde(default)]
    pub use_automatic_thresholds: bool,
    /// Children in authoring order.
    #[serde(default)]
    pub children: Vec<BlendChild>,
}

impl BlendTree {
    /// Number of clip references anywhere in this tree.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.children
            .iter()
            .filter_map(|c| c.motion.as_ref())
            .map(Motion::clip_count)
            .sum()
    }
}

/// Payload attached to a state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// Atomic, immutable clip reference; shared between graphs.
    Clip(Arc<Clip>),
    /// Composite blend tree; owned by exactly one state or parent tree.
    BlendTree(Box<BlendTree>),
}

impl Motion {
    /// Clip motion referencing `hash`.
    #[must_use]
    pub fn clip(hash: ClipHash, name: impl Into<String>) -> Self {
        Motion::Clip(Arc::new(Clip {
            hash,
            name: name.into(),
        }))
    }

    /// Clip view, if atomic.
    #[must_use]
    pub fn as_clip(&self) -> Option<&Arc<Clip>> {
        match self {
            Motion::Clip(c) => Some(c),
            Motion::BlendTree(_) => None,
        }
    }

    /// Blend tree view, if composite.
    #[must_use]
    pub fn as_blend_tree(&self) -> Option<&BlendTree> {
        match self {
            Motion::BlendTree(t) => Some(t),
            Motion::Clip(_) => None,
        }
    }

    /// Number of clip references in this motion.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        match self {
            Motion::Clip(_) => 1,
            Motion::BlendTree(t) => t.clip_count(),
        }
    }
}
