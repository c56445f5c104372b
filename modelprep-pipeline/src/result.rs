//! Batch outcomes and their user-facing summaries

use modelprep_core::{Error, ObjectId};
use std::fmt;

/// The actions a batch can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchAction {
    /// Merge near-duplicate vertices of every mesh
    Weld,
    /// Attach exactly one decimate modifier to every mesh object
    Decimate,
    /// Remove every decimate modifier from every mesh object
    Undecimate,
    /// Select mesh objects that need a UV unwrap
    UvSelect,
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchAction::Weld => "Remove doubles",
            BatchAction::Decimate => "Decimate",
            BatchAction::Undecimate => "Undecimate",
            BatchAction::UvSelect => "Smart UV Project",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one batch: `Idle -> Running -> {Completed | Aborted}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Aggregate outcome of one batch action.
///
/// An aborted batch keeps the counts reached before the failing item, and
/// the mutations made to earlier items stay in place.
#[derive(Debug)]
pub struct BatchResult {
    pub action: BatchAction,
    pub state: BatchState,
    /// Items fully processed before completion or abort
    pub processed: usize,
    /// Items eligible for this action
    pub eligible: usize,
    /// Vertices in the welded meshes before welding
    pub vertices_total: usize,
    pub vertices_removed: usize,
    pub modifiers_removed: usize,
    pub uv_layers_removed: usize,
    /// Objects classified as needing a UV unwrap, in collection order
    pub selected: Vec<ObjectId>,
    pub error: Option<Error>,
}

impl BatchResult {
    pub fn new(action: BatchAction, eligible: usize) -> Self {
        Self {
            action,
            state: BatchState::Running,
            processed: 0,
            eligible,
            vertices_total: 0,
            vertices_removed: 0,
            modifiers_removed: 0,
            uv_layers_removed: 0,
            selected: Vec::new(),
            error: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == BatchState::Completed
    }

    pub fn is_aborted(&self) -> bool {
        self.state == BatchState::Aborted
    }

    pub(crate) fn complete(&mut self) {
        self.state = BatchState::Completed;
    }

    pub(crate) fn abort(&mut self, error: Error) {
        self.state = BatchState::Aborted;
        self.error = Some(error);
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            write!(
                f,
                "{} aborted after {} of {} meshes",
                self.action, self.processed, self.eligible
            )?;
            if self.action == BatchAction::Weld {
                write!(
                    f,
                    " (removed {} of {} verts)",
                    self.vertices_removed, self.vertices_total
                )?;
            }
            write!(f, ": {}", error)?;
            if matches!(error, Error::HostStateConflict(_)) {
                write!(f, " (are any objects in edit mode?)")?;
            }
            return Ok(());
        }

        match self.action {
            BatchAction::Weld => write!(
                f,
                "Finished {} meshes: removed {} of {} verts",
                self.processed, self.vertices_removed, self.vertices_total
            ),
            BatchAction::Decimate => write!(
                f,
                "Decimated {} of {} meshes",
                self.processed, self.eligible
            ),
            BatchAction::Undecimate => write!(
                f,
                "Undecimated {} of {} meshes ({} decimate modifiers removed)",
                self.processed, self.eligible, self.modifiers_removed
            ),
            BatchAction::UvSelect => write!(
                f,
                "{} selected {} of {} meshes",
                self.action,
                self.selected.len(),
                self.eligible
            ),
        }
    }
}
