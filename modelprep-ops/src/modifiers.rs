//! Decimate modifier lifecycle
//!
//! Keeps at most one decimate modifier on an object. Applying always removes
//! every existing decimate modifier first, so repeated applications converge
//! on exactly one.

use modelprep_core::{DecimateSettings, Modifier, ModifierStack, Result};
use tracing::debug;

/// Adds, replaces and removes decimate modifiers on a modifier stack
#[derive(Debug, Clone)]
pub struct ModifierManager {
    /// Name given to newly created modifiers
    pub modifier_name: String,
}

impl Default for ModifierManager {
    fn default() -> Self {
        Self {
            modifier_name: "Decimate".to_string(),
        }
    }
}

impl ModifierManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every decimate modifier, returning how many were removed
    pub fn remove_all_decimate_modifiers(&self, stack: &mut ModifierStack) -> usize {
        let removed = stack.remove_where(Modifier::is_decimate);
        if removed > 0 {
            debug!(removed, "removed decimate modifiers");
        }
        removed
    }

    /// Replace any decimate modifiers with a single one configured from `settings`.
    ///
    /// Settings are validated before the stack is touched.
    pub fn apply_decimate(
        &self,
        stack: &mut ModifierStack,
        settings: &DecimateSettings,
    ) -> Result<()> {
        settings.validate()?;
        self.remove_all_decimate_modifiers(stack);
        stack.push(Modifier::Decimate {
            name: self.modifier_name.clone(),
            settings: *settings,
        });
        Ok(())
    }
}
