// cli.rs - Command-line interface configuration
use clap::{Parser, Subcommand};
use modelprep_core::{PipelineConfig, PipelineConfigBuilder, Result, SymmetryAxis};
use modelprep_pipeline::BatchAction;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "modelprep")]
#[command(about = "Batch geometry preparation for 3D scenes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Scene file (JSON)
    #[arg(long, global = true, default_value = "scene.json")]
    pub scene: PathBuf,

    /// Pipeline configuration file (JSON); missing keys take their defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where to write the processed scene. Defaults to overwriting --scene.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Log debug output for every processed mesh
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Merge vertices closer than the weld tolerance in every mesh
    Weld,
    /// Give every mesh object exactly one decimate modifier
    Decimate,
    /// Remove every decimate modifier
    Undecimate,
    /// Report the mesh objects that need a UV unwrap
    UvSelect,
}

impl From<Command> for BatchAction {
    fn from(command: Command) -> Self {
        match command {
            Command::Weld => BatchAction::Weld,
            Command::Decimate => BatchAction::Decimate,
            Command::Undecimate => BatchAction::Undecimate,
            Command::UvSelect => BatchAction::UvSelect,
        }
    }
}

/// Values layered over the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Weld tolerance
    #[arg(long, global = true)]
    pub min_distance: Option<f32>,

    /// Fraction of triangles to keep, 0.0 to 1.0
    #[arg(long, global = true)]
    pub ratio: Option<f32>,

    #[arg(long, global = true, overrides_with = "no_triangulate")]
    pub triangulate: bool,

    #[arg(long, global = true, overrides_with = "triangulate")]
    pub no_triangulate: bool,

    /// Mirror decimation along --symmetry-axis
    #[arg(long, global = true, overrides_with = "no_symmetry")]
    pub symmetry: bool,

    #[arg(long, global = true, overrides_with = "symmetry")]
    pub no_symmetry: bool,

    #[arg(long, global = true, value_parser = parse_axis)]
    pub symmetry_axis: Option<SymmetryAxis>,

    /// Destroy existing UV maps and select every mesh
    #[arg(long, global = true, overrides_with = "keep_uv_maps")]
    pub delete_uv_maps: bool,

    /// Keep existing UV maps even if the configuration deletes them
    #[arg(long, global = true, overrides_with = "delete_uv_maps")]
    pub keep_uv_maps: bool,
}

/// Resolve an on/off flag pair; `None` leaves the configured value alone
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_axis(value: &str) -> std::result::Result<SymmetryAxis, String> {
    value.parse::<SymmetryAxis>().map_err(|e| e.to_string())
}

impl Overrides {
    pub fn apply(&self, mut builder: PipelineConfigBuilder) -> PipelineConfigBuilder {
        if let Some(min_distance) = self.min_distance {
            builder = builder.min_distance(min_distance);
        }
        if let Some(ratio) = self.ratio {
            builder = builder.decimate_ratio(ratio);
        }
        if let Some(triangulate) = switch(self.triangulate, self.no_triangulate) {
            builder = builder.decimate_triangulate(triangulate);
        }
        if let Some(symmetry) = switch(self.symmetry, self.no_symmetry) {
            builder = builder.decimate_symmetry(symmetry);
        }
        if let Some(axis) = self.symmetry_axis {
            builder = builder.decimate_symmetry_axis(axis);
        }
        if let Some(delete) = switch(self.delete_uv_maps, self.keep_uv_maps) {
            builder = builder.delete_uv_maps(delete);
        }
        builder
    }
}

impl Cli {
    /// Load the configuration file, if any, then apply command-line overrides
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let builder = match &self.config {
            Some(path) => PipelineConfig::load_builder(path)?,
            None => PipelineConfig::builder(),
        };
        self.overrides.apply(builder).build()
    }

    pub fn output_path(&self) -> &PathBuf {
        self.output.as_ref().unwrap_or(&self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelprep_core::Error;

    #[test]
    fn test_parse_decimate_overrides() {
        let cli = Cli::parse_from([
            "modelprep",
            "decimate",
            "--scene",
            "in.json",
            "--ratio",
            "0.25",
            "--symmetry",
            "--symmetry-axis",
            "z",
        ]);
        assert_eq!(cli.command, Command::Decimate);
        assert_eq!(cli.output_path(), &PathBuf::from("in.json"));

        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.decimate_ratio(), 0.25);
        assert!(config.decimate_symmetry());
        assert_eq!(config.decimate_symmetry_axis(), SymmetryAxis::Z);
    }

    #[test]
    fn test_out_of_range_override_is_rejected() {
        let cli = Cli::parse_from(["modelprep", "decimate", "--ratio", "1.5"]);
        assert!(matches!(
            cli.pipeline_config(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_axis_fails_to_parse() {
        let parsed = Cli::try_parse_from(["modelprep", "decimate", "--symmetry-axis", "W"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_flags_switch_file_values_off() {
        let file = PipelineConfig::builder()
            .decimate_triangulate(true)
            .decimate_symmetry(true)
            .delete_uv_maps(true);

        let cli = Cli::parse_from([
            "modelprep",
            "decimate",
            "--no-triangulate",
            "--no-symmetry",
            "--keep-uv-maps",
        ]);
        let config = cli.overrides.apply(file.clone()).build().unwrap();
        assert!(!config.decimate_triangulate());
        assert!(!config.decimate_symmetry());
        assert!(!config.delete_uv_maps());

        // Without flags the file values stand
        let cli = Cli::parse_from(["modelprep", "decimate"]);
        let config = cli.overrides.apply(file).build().unwrap();
        assert!(config.decimate_triangulate());
        assert!(config.decimate_symmetry());
        assert!(config.delete_uv_maps());
    }

    #[test]
    fn test_last_of_a_flag_pair_wins() {
        let cli = Cli::parse_from(["modelprep", "decimate", "--symmetry", "--no-symmetry"]);
        assert!(!cli.pipeline_config().unwrap().decimate_symmetry());
    }

    #[test]
    fn test_uv_select_maps_to_action() {
        let cli = Cli::parse_from(["modelprep", "uv-select", "--delete-uv-maps"]);
        assert_eq!(BatchAction::from(cli.command), BatchAction::UvSelect);
        assert!(cli.pipeline_config().unwrap().delete_uv_maps());
    }
}
