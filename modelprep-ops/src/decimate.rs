//! Decimation planning
//!
//! Turns user-facing decimate parameters into the [`DecimateSettings`] stored
//! on a modifier. The symmetry flag gates the axis entirely: with symmetry
//! disabled no axis is recorded, whatever the configured axis is.

use modelprep_core::{
    DecimateAlgorithm, DecimateSettings, Error, PipelineConfig, Result, SymmetryAxis,
};

/// Raw decimate parameters as a host supplies them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimateRequest {
    pub ratio: f32,
    pub triangulate: bool,
    pub symmetry: bool,
    /// Index into the X/Y/Z axis table
    pub symmetry_axis_index: usize,
}

impl From<&PipelineConfig> for DecimateRequest {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            ratio: config.decimate_ratio(),
            triangulate: config.decimate_triangulate(),
            symmetry: config.decimate_symmetry(),
            symmetry_axis_index: config.decimate_symmetry_axis().index(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecimationPlanner;

impl DecimationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Look up an axis in the fixed X/Y/Z table
    pub fn resolve_axis(index: usize) -> Result<SymmetryAxis> {
        SymmetryAxis::from_index(index).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "symmetry axis index must be 0 (X), 1 (Y) or 2 (Z), got {}",
                index
            ))
        })
    }

    pub fn plan(&self, request: &DecimateRequest) -> Result<DecimateSettings> {
        let symmetry_axis = if request.symmetry {
            Some(Self::resolve_axis(request.symmetry_axis_index)?)
        } else {
            None
        };

        let settings = DecimateSettings {
            algorithm: DecimateAlgorithm::Collapse,
            ratio: request.ratio,
            triangulate: request.triangulate,
            use_symmetry: request.symmetry,
            symmetry_axis,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn plan_from_config(&self, config: &PipelineConfig) -> Result<DecimateSettings> {
        self.plan(&DecimateRequest::from(config))
    }
}
