//! Request and response bodies of the printer host's command endpoints.

use serde::{Deserialize, Serialize};

/// Relative jog for `POST /api/move`.
///
/// Axes left as `None` are omitted from the body; the host treats them as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RelativeMove {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Extruder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<f64>,
}

impl RelativeMove {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, mm: f64) -> Self {
        self.x = Some(mm);
        self
    }

    pub fn y(mut self, mm: f64) -> Self {
        self.y = Some(mm);
        self
    }

    pub fn z(mut self, mm: f64) -> Self {
        self.z = Some(mm);
        self
    }

    pub fn e(mut self, mm: f64) -> Self {
        self.e = Some(mm);
        self
    }

    /// Returns true if no axis is set.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none() && self.e.is_none()
    }
}

/// Response of `GET /api/list_gcode`: paths relative to the host's data dir.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcodeFileList {
    pub files: Vec<String>,
}
