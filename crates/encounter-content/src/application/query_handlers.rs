//! Read-only catalog queries for menus and tooling.

use std::sync::Arc;

use encounter_core::error::PipelineError;
use encounter_core::ids::{AnchorId, TriggerId};
use serde::Serialize;

use crate::application::catalog::TriggerCatalog;
use crate::domain::definitions::{AnimationMode, TriggerDefinition};

/// Menu-facing view of a trigger definition.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerSummaryView {
    /// Stable identifier.
    pub id: TriggerId,
    /// Name shown in menus.
    pub display_name: String,
    /// Actor arrangement.
    pub mode: AnimationMode,
    /// `"animation"` or `"cinematic"`.
    pub kind: &'static str,
    /// Whether a partner (live or substitute) is needed.
    pub requires_partner: bool,
    /// Whether a substitute may stand in.
    pub allows_substitute: bool,
}

impl From<&TriggerDefinition> for TriggerSummaryView {
    fn from(definition: &TriggerDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            display_name: definition.display_name.clone(),
            mode: definition.mode,
            kind: if definition.is_cinematic() {
                "cinematic"
            } else {
                "animation"
            },
            requires_partner: definition.requires_partner(),
            allows_substitute: definition.partner.allow_substitute,
        }
    }
}

/// Triggers offered at an anchor, in the anchor's configured order.
///
/// # Errors
///
/// Returns `PipelineError::AnchorNotFound` for unknown anchors.
pub fn available_triggers(
    catalog: &TriggerCatalog,
    anchor_id: &AnchorId,
) -> Result<Vec<Arc<TriggerDefinition>>, PipelineError> {
    let anchor = catalog
        .anchor(anchor_id)
        .ok_or_else(|| PipelineError::AnchorNotFound(anchor_id.clone()))?;
    Ok(anchor
        .triggers
        .iter()
        .filter_map(|id| catalog.trigger(id).cloned())
        .collect())
}

/// Menu summaries for the triggers offered at an anchor.
///
/// # Errors
///
/// Returns `PipelineError::AnchorNotFound` for unknown anchors.
pub fn trigger_summaries(
    catalog: &TriggerCatalog,
    anchor_id: &AnchorId,
) -> Result<Vec<TriggerSummaryView>, PipelineError> {
    Ok(available_triggers(catalog, anchor_id)?
        .iter()
        .map(|definition| TriggerSummaryView::from(definition.as_ref()))
        .collect())
}
