//! Batch orchestration over a whole scene
//!
//! The orchestrator enumerates the eligible items once per action and drives
//! the per-mesh components over them in collection order. The first host or
//! component error stops the batch: later items are never touched and earlier
//! ones keep their changes. Parameter errors are caught before the first item
//! is visited and returned as `Err`, so they never leave partial state.

use crate::result::{BatchAction, BatchResult, BatchState};
use crate::unwrap::UvUnwrapper;
use modelprep_core::{Error, MeshId, ObjectId, PipelineConfig, Result, Scene};
use modelprep_ops::{
    DecimationPlanner, ModifierManager, UvCandidateSelector, UvDecision, VertexWelder,
};
use tracing::{debug, info, warn};

/// Runs batch actions against a scene with one fixed configuration
pub struct BatchOrchestrator<'a, S: Scene + ?Sized> {
    scene: &'a mut S,
    config: &'a PipelineConfig,
    state: BatchState,
    modifiers: ModifierManager,
    planner: DecimationPlanner,
}

impl<'a, S: Scene + ?Sized> BatchOrchestrator<'a, S> {
    pub fn new(scene: &'a mut S, config: &'a PipelineConfig) -> Self {
        Self {
            scene,
            config,
            state: BatchState::Idle,
            modifiers: ModifierManager::new(),
            planner: DecimationPlanner::new(),
        }
    }

    /// State reached by the most recent action
    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        self.config
    }

    /// Enter `Running` for `action`; stays there if the action returns `Err`
    fn begin(&mut self, action: BatchAction) {
        debug!(%action, "batch starting");
        self.state = BatchState::Running;
    }

    /// Run one action. `UvSelect` only selects; see [`smart_uv_project`](Self::smart_uv_project).
    pub fn run(&mut self, action: BatchAction) -> Result<BatchResult> {
        match action {
            BatchAction::Weld => self.weld(),
            BatchAction::Decimate => self.decimate(),
            BatchAction::Undecimate => self.undecimate(),
            BatchAction::UvSelect => self.select_uv_candidates(),
        }
    }

    /// Weld every mesh datablock with the configured tolerance
    #[tracing::instrument(skip_all, fields(action = "weld"))]
    pub fn weld(&mut self) -> Result<BatchResult> {
        self.begin(BatchAction::Weld);
        let welder = VertexWelder::new(self.config.min_distance())?;
        let meshes = self.scene.mesh_ids();
        info!(meshes = meshes.len(), tolerance = welder.tolerance(), "removing doubles");

        let (state, result) = drive(
            &mut *self.scene,
            BatchAction::Weld,
            Ok(meshes),
            |scene, id: MeshId, result| {
                let mesh = scene.mesh_mut(id)?;
                let report = welder.weld(mesh).map_err(host_data_error)?;
                debug!(
                    mesh = %mesh.name,
                    "removed {} of {} verts",
                    report.removed(),
                    report.vertices_before
                );
                result.vertices_total += report.vertices_before;
                result.vertices_removed += report.removed();
                Ok(())
            },
        );
        self.state = state;
        Ok(result)
    }

    /// Give every mesh object exactly one decimate modifier
    #[tracing::instrument(skip_all, fields(action = "decimate"))]
    pub fn decimate(&mut self) -> Result<BatchResult> {
        self.begin(BatchAction::Decimate);
        let settings = self.planner.plan_from_config(self.config)?;
        let objects = self.scene.mesh_object_ids();
        info!(
            ratio = settings.ratio,
            symmetry = ?settings.symmetry_axis,
            "decimating meshes"
        );

        let modifiers = &self.modifiers;
        let (state, result) = drive(
            &mut *self.scene,
            BatchAction::Decimate,
            objects,
            |scene, id: ObjectId, _| {
                let stack = scene.modifiers_mut(id)?;
                modifiers.apply_decimate(stack, &settings)?;
                debug!(%id, "decimate modifier applied");
                Ok(())
            },
        );
        self.state = state;
        Ok(result)
    }

    /// Remove every decimate modifier from every mesh object
    #[tracing::instrument(skip_all, fields(action = "undecimate"))]
    pub fn undecimate(&mut self) -> Result<BatchResult> {
        self.begin(BatchAction::Undecimate);
        let objects = self.scene.mesh_object_ids();
        info!("removing decimate modifiers");

        let modifiers = &self.modifiers;
        let (state, result) = drive(
            &mut *self.scene,
            BatchAction::Undecimate,
            objects,
            |scene, id: ObjectId, result| {
                let stack = scene.modifiers_mut(id)?;
                result.modifiers_removed += modifiers.remove_all_decimate_modifiers(stack);
                Ok(())
            },
        );
        self.state = state;
        Ok(result)
    }

    /// Classify every mesh object, destroying UV layers first when configured
    #[tracing::instrument(skip_all, fields(action = "uv_select"))]
    pub fn select_uv_candidates(&mut self) -> Result<BatchResult> {
        self.begin(BatchAction::UvSelect);
        let selector = UvCandidateSelector::from_config(self.config);
        let objects = self.scene.mesh_object_ids();
        info!(delete_existing = selector.delete_existing, "selecting UV candidates");

        let (state, result) = drive(
            &mut *self.scene,
            BatchAction::UvSelect,
            objects,
            |scene, id: ObjectId, result| {
                let object = scene.object(id)?;
                let mesh_id = object.mesh.ok_or_else(|| {
                    Error::UnexpectedHostFailure(format!(
                        "mesh object '{}' has no mesh data",
                        object.name
                    ))
                })?;

                let decision = if selector.needs_mutation(scene.mesh(mesh_id)?) {
                    selector.prepare(scene.mesh_mut(mesh_id)?)
                } else {
                    selector.classify(scene.mesh(mesh_id)?)
                };

                match decision {
                    UvDecision::NeedsUnwrap { layers_removed } => {
                        result.uv_layers_removed += layers_removed;
                        result.selected.push(id);
                        debug!(%id, "selected for unwrap");
                    }
                    UvDecision::Skip => {
                        debug!(%id, "has existing UV layers, skipped");
                    }
                }
                Ok(())
            },
        );
        self.state = state;
        Ok(result)
    }

    /// Select UV candidates, then hand the whole selection to `unwrapper` at once
    #[tracing::instrument(skip_all, fields(action = "smart_uv_project"))]
    pub fn smart_uv_project<U>(&mut self, unwrapper: &mut U) -> Result<BatchResult>
    where
        U: UvUnwrapper<S> + ?Sized,
    {
        let mut result = self.select_uv_candidates()?;
        if result.is_aborted() {
            return Ok(result);
        }

        if result.selected.is_empty() {
            info!(
                "UV map found on every mesh; enable delete_uv_maps to remove existing UV maps"
            );
            return Ok(result);
        }

        info!(count = result.selected.len(), "running Smart UV Project");
        if let Err(error) =
            unwrapper.smart_project(&mut *self.scene, &result.selected, self.config.uv_unwrap())
        {
            warn!(%error, "UV unwrap failed");
            result.abort(error);
            self.state = BatchState::Aborted;
        } else {
            info!("{}", result);
        }
        Ok(result)
    }
}

/// Walk `items` in order, stopping at the first error
fn drive<S, T, F>(
    scene: &mut S,
    action: BatchAction,
    items: Result<Vec<T>>,
    mut step: F,
) -> (BatchState, BatchResult)
where
    S: Scene + ?Sized,
    F: FnMut(&mut S, T, &mut BatchResult) -> Result<()>,
{
    let items = match items {
        Ok(items) => items,
        Err(error) => {
            warn!(%error, "{} could not enumerate the scene", action);
            let mut result = BatchResult::new(action, 0);
            result.abort(error);
            return (BatchState::Aborted, result);
        }
    };

    let mut result = BatchResult::new(action, items.len());
    for item in items {
        if let Err(error) = step(scene, item, &mut result) {
            result.abort(error);
            warn!("{}", result);
            return (BatchState::Aborted, result);
        }
        result.processed += 1;
    }

    result.complete();
    info!("{}", result);
    (BatchState::Completed, result)
}

/// A mesh the host handed over in an inconsistent state is a host failure,
/// not a user parameter error
fn host_data_error(error: Error) -> Error {
    match error {
        Error::InvalidParameter(message) => Error::UnexpectedHostFailure(message),
        other => other,
    }
}
