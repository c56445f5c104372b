mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use modelprep_core::{MemoryScene, Scene};
use modelprep_pipeline::{BatchAction, BatchOrchestrator};
use std::process::ExitCode;
use tracing::{error, info};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = cli.pipeline_config().context("invalid pipeline configuration")?;
    let mut scene = MemoryScene::load(&cli.scene)
        .with_context(|| format!("failed to load scene {}", cli.scene.display()))?;
    info!(
        meshes = scene.meshes.len(),
        objects = scene.objects.len(),
        "loaded {}",
        cli.scene.display()
    );

    let action = BatchAction::from(cli.command);
    let result = BatchOrchestrator::new(&mut scene, &config).run(action)?;
    println!("{}", result);

    if action == BatchAction::UvSelect {
        for id in &result.selected {
            println!("{}", scene.object(*id)?.name);
        }
    }

    // Completed items keep their changes even when the batch aborted
    let output = cli.output_path();
    scene
        .save(output)
        .with_context(|| format!("failed to write scene {}", output.display()))?;

    Ok(result.is_completed())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
