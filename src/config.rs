use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rank direction handed to the layered-layout provider.
///
/// Only top-to-bottom: the correction passes put partners along X and
/// generations along Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopBottom,
}

impl Direction {
    pub fn as_rankdir(self) -> &'static str {
        match self {
            Self::TopBottom => "tb",
        }
    }
}

/// Geometry shared with the rendering surface.
///
/// Node boxes are fixed-size; `partner_spacing` must leave at least
/// `min_node_gap` between partners or collision resolution will pull them
/// apart again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub partner_spacing: f32,
    pub min_node_gap: f32,
    pub row_tolerance: f32,
    pub direction: Direction,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 80.0,
            node_spacing: 60.0,
            rank_spacing: 120.0,
            partner_spacing: 250.0,
            min_node_gap: 40.0,
            row_tolerance: 10.0,
            direction: Direction::TopBottom,
        }
    }
}

impl LayoutConfig {
    /// Clamps values that would break the correction passes.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.node_width.is_finite() && self.node_width > 0.0) {
            self.node_width = defaults.node_width;
        }
        if !(self.node_height.is_finite() && self.node_height > 0.0) {
            self.node_height = defaults.node_height;
        }
        if !(self.row_tolerance.is_finite() && self.row_tolerance > 0.0) {
            self.row_tolerance = defaults.row_tolerance;
        }
        if !self.min_node_gap.is_finite() || self.min_node_gap < 0.0 {
            self.min_node_gap = defaults.min_node_gap;
        }
        if !self.partner_spacing.is_finite() {
            self.partner_spacing = defaults.partner_spacing;
        }
        self.partner_spacing = self
            .partner_spacing
            .max(self.node_width + self.min_node_gap);
        self.node_spacing = self.node_spacing.max(0.0);
        self.rank_spacing = self.rank_spacing.max(0.0);
        self
    }
}

/// Loads a layout config file. JSON is tried first, then JSON5 for
/// hand-written files with comments or trailing commas.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: LayoutConfig = match serde_json::from_str(&contents) {
        Ok(config) => config,
        Err(json_err) => json5::from_str(&contents).map_err(|json5_err| {
            anyhow::anyhow!(
                "invalid layout config {}: {json_err} (as JSON5: {json5_err})",
                path.display()
            )
        })?,
    };
    Ok(parsed.sanitized())
}
