//! Pipeline configuration
//!
//! A [`PipelineConfig`] is an immutable snapshot of every tunable parameter for
//! one action. It can only be obtained through [`PipelineConfigBuilder::build`],
//! which rejects out-of-range values, so components never see an invalid value.

use crate::error::{Error, Result};
use crate::modifier::SymmetryAxis;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

const UNIT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
const ANGLE_LIMIT_RANGE: RangeInclusive<f32> = 1.0..=89.0;

/// Parameters forwarded verbatim to the external UV unwrap routine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UvUnwrapParams {
    /// Degrees; lower values give more projection groups
    pub angle_limit: f32,
    pub island_margin: f32,
    pub area_weight: f32,
    pub correct_aspect: bool,
    pub stretch_to_uv_bounds: bool,
}

/// Validated, read-only configuration for one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PipelineConfigBuilder", into = "PipelineConfigBuilder")]
pub struct PipelineConfig {
    min_distance: f32,
    decimate_ratio: f32,
    decimate_triangulate: bool,
    decimate_symmetry: bool,
    decimate_symmetry_axis: SymmetryAxis,
    uv: UvUnwrapParams,
    delete_uv_maps: bool,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a JSON configuration file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_builder(path)?.build()
    }

    /// Load a JSON configuration file without validating it yet, so callers
    /// can layer overrides on top before building
    pub fn load_builder<P: AsRef<Path>>(path: P) -> Result<PipelineConfigBuilder> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Weld tolerance
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    pub fn decimate_ratio(&self) -> f32 {
        self.decimate_ratio
    }

    pub fn decimate_triangulate(&self) -> bool {
        self.decimate_triangulate
    }

    pub fn decimate_symmetry(&self) -> bool {
        self.decimate_symmetry
    }

    /// Configured axis; only meaningful when [`decimate_symmetry`](Self::decimate_symmetry) is set
    pub fn decimate_symmetry_axis(&self) -> SymmetryAxis {
        self.decimate_symmetry_axis
    }

    pub fn uv_unwrap(&self) -> &UvUnwrapParams {
        &self.uv
    }

    pub fn delete_uv_maps(&self) -> bool {
        self.delete_uv_maps
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_distance: 0.005,
            decimate_ratio: 0.1,
            decimate_triangulate: false,
            decimate_symmetry: false,
            decimate_symmetry_axis: SymmetryAxis::X,
            uv: UvUnwrapParams {
                angle_limit: 33.0,
                island_margin: 0.40,
                area_weight: 0.0,
                correct_aspect: true,
                stretch_to_uv_bounds: true,
            },
            delete_uv_maps: false,
        }
    }
}

/// Unvalidated configuration values, also the serialized form of [`PipelineConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfigBuilder {
    pub min_distance: f32,
    pub decimate_ratio: f32,
    pub decimate_triangulate: bool,
    pub decimate_symmetry: bool,
    pub decimate_symmetry_axis: SymmetryAxis,
    pub angle_limit: f32,
    pub island_margin: f32,
    pub area_weight: f32,
    pub correct_aspect: bool,
    pub stretch_to_uv_bounds: bool,
    pub delete_uv_maps: bool,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        PipelineConfig::default().into()
    }
}

impl PipelineConfigBuilder {
    pub fn min_distance(mut self, value: f32) -> Self {
        self.min_distance = value;
        self
    }

    pub fn decimate_ratio(mut self, value: f32) -> Self {
        self.decimate_ratio = value;
        self
    }

    pub fn decimate_triangulate(mut self, value: bool) -> Self {
        self.decimate_triangulate = value;
        self
    }

    pub fn decimate_symmetry(mut self, value: bool) -> Self {
        self.decimate_symmetry = value;
        self
    }

    pub fn decimate_symmetry_axis(mut self, value: SymmetryAxis) -> Self {
        self.decimate_symmetry_axis = value;
        self
    }

    pub fn angle_limit(mut self, value: f32) -> Self {
        self.angle_limit = value;
        self
    }

    pub fn island_margin(mut self, value: f32) -> Self {
        self.island_margin = value;
        self
    }

    pub fn area_weight(mut self, value: f32) -> Self {
        self.area_weight = value;
        self
    }

    pub fn correct_aspect(mut self, value: bool) -> Self {
        self.correct_aspect = value;
        self
    }

    pub fn stretch_to_uv_bounds(mut self, value: bool) -> Self {
        self.stretch_to_uv_bounds = value;
        self
    }

    pub fn delete_uv_maps(mut self, value: bool) -> Self {
        self.delete_uv_maps = value;
        self
    }

    /// Validate every value and freeze the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        check_range("min_distance", self.min_distance, &UNIT_RANGE)?;
        check_range("decimate_ratio", self.decimate_ratio, &UNIT_RANGE)?;
        check_range("angle_limit", self.angle_limit, &ANGLE_LIMIT_RANGE)?;
        check_range("island_margin", self.island_margin, &UNIT_RANGE)?;
        check_range("area_weight", self.area_weight, &UNIT_RANGE)?;

        Ok(PipelineConfig {
            min_distance: self.min_distance,
            decimate_ratio: self.decimate_ratio,
            decimate_triangulate: self.decimate_triangulate,
            decimate_symmetry: self.decimate_symmetry,
            decimate_symmetry_axis: self.decimate_symmetry_axis,
            uv: UvUnwrapParams {
                angle_limit: self.angle_limit,
                island_margin: self.island_margin,
                area_weight: self.area_weight,
                correct_aspect: self.correct_aspect,
                stretch_to_uv_bounds: self.stretch_to_uv_bounds,
            },
            delete_uv_maps: self.delete_uv_maps,
        })
    }
}

impl From<PipelineConfig> for PipelineConfigBuilder {
    fn from(config: PipelineConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            decimate_ratio: config.decimate_ratio,
            decimate_triangulate: config.decimate_triangulate,
            decimate_symmetry: config.decimate_symmetry,
            decimate_symmetry_axis: config.decimate_symmetry_axis,
            angle_limit: config.uv.angle_limit,
            island_margin: config.uv.island_margin,
            area_weight: config.uv.area_weight,
            correct_aspect: config.uv.correct_aspect,
            stretch_to_uv_bounds: config.uv.stretch_to_uv_bounds,
            delete_uv_maps: config.delete_uv_maps,
        }
    }
}

impl TryFrom<PipelineConfigBuilder> for PipelineConfig {
    type Error = Error;

    fn try_from(builder: PipelineConfigBuilder) -> Result<Self> {
        builder.build()
    }
}

fn check_range(name: &str, value: f32, range: &RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}
