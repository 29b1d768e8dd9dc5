//! Core data for the EduAR Net viewer: the static model catalog and the
//! in-camera pan/scale transform shared between the interaction handlers,
//! the camera session and persistence.

use serde::{Deserialize, Serialize};

/// One entry of the static model catalog. The catalog is the source of truth
/// for the selection control; `src` doubles as the persistence key suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub src: &'static str,
}

pub const MODELS: &[ModelDescriptor] = &[
    ModelDescriptor { id: "pc", label: "PC", src: "assets/models/pc.glb" },
    ModelDescriptor { id: "hp", label: "Laptop", src: "assets/models/hp.glb" },
    ModelDescriptor { id: "router", label: "Router", src: "assets/models/router.glb" },
    ModelDescriptor { id: "wifi", label: "Access Point", src: "assets/models/wifi.glb" },
];

pub fn model_by_src(src: &str) -> Option<&'static ModelDescriptor> {
    MODELS.iter().find(|m| m.src == src)
}

pub fn model_index_by_src(src: &str) -> Option<usize> {
    MODELS.iter().position(|m| m.src == src)
}

pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 3.0;

/// Zoom sensitivity for wheel input (scale units per deltaY pixel).
pub const WHEEL_ZOOM_FACTOR: f64 = 0.001;

/// 2D pan offset (px) plus uniform scale applied to the viewer while it is
/// overlaid on the camera feed. Scale stays within [MIN_SCALE, MAX_SCALE]
/// through every mutator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, scale: 1.0 }
    }
}

impl Transform {
    /// CSS value: base centering translate, then pan, then scale.
    pub fn css(&self) -> String {
        format!(
            "translate(calc(-50% + {}px), calc(-50% + {}px)) scale({})",
            self.pan_x, self.pan_y, self.scale
        )
    }

    /// Pan-only translate, used while the entrance animation drives scale
    /// through its own keyframes.
    pub fn css_translate(&self) -> String {
        format!(
            "translate(calc(-50% + {}px), calc(-50% + {}px))",
            self.pan_x, self.pan_y
        )
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        self.set_scale(self.scale + -delta_y * WHEEL_ZOOM_FACTOR);
    }
}
