//! Loading and validating the static trigger catalog.
//!
//! The catalog is a single YAML document:
//!
//! ```yaml
//! tuning:            # optional, every field has a default
//!   positioning_duration: 0.5
//! anchors:
//!   - id: bench
//!     name: Park bench
//!     pose: { position: [0.0, 0.0, 0.0] }
//!     triggers: [wave]
//! triggers:
//!   - id: wave
//!     display_name: Wave
//!     mode: single_actor
//!     playback:
//!       animation: { clip: wave_clip, target_state: Interaction }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use encounter_core::ids::{AnchorId, TriggerId};
use serde::Deserialize;
use tracing::info;

use crate::domain::anchors::AnchorDefinition;
use crate::domain::definitions::{PlaybackSpec, TriggerDefinition};
use crate::domain::tuning::PipelineTuning;
use crate::error::CatalogError;

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    tuning: PipelineTuning,
    #[serde(default)]
    anchors: Vec<AnchorDefinition>,
    #[serde(default)]
    triggers: Vec<TriggerDefinition>,
}

/// Every trigger and anchor known to the pipeline, plus its tuning.
#[derive(Debug, Clone, Default)]
pub struct TriggerCatalog {
    tuning: PipelineTuning,
    anchors: HashMap<AnchorId, Arc<AnchorDefinition>>,
    anchor_order: Vec<AnchorId>,
    triggers: HashMap<TriggerId, Arc<TriggerDefinition>>,
}

impl TriggerCatalog {
    /// Parses and validates a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML and
    /// `CatalogError::Invalid` if validation fails.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_yaml::from_str(source)?;
        Self::from_parts(document.tuning, document.anchors, document.triggers)
    }

    /// Reads, parses and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise the
    /// errors of [`TriggerCatalog::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&source)?;
        info!(
            path = %path.display(),
            anchors = catalog.anchors.len(),
            triggers = catalog.triggers.len(),
            "trigger catalog loaded"
        );
        Ok(catalog)
    }

    /// Builds a catalog from already-constructed definitions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` on duplicate IDs, anchors offering
    /// unknown triggers, or out-of-range durations and thresholds.
    pub fn from_parts(
        tuning: PipelineTuning,
        anchors: Vec<AnchorDefinition>,
        triggers: Vec<TriggerDefinition>,
    ) -> Result<Self, CatalogError> {
        validate_tuning(&tuning)?;

        let mut trigger_map = HashMap::with_capacity(triggers.len());
        for trigger in triggers {
            validate_trigger(&trigger)?;
            let id = trigger.id.clone();
            if trigger_map.insert(id.clone(), Arc::new(trigger)).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate trigger id {id}")));
            }
        }

        let mut anchor_map = HashMap::with_capacity(anchors.len());
        let mut anchor_order = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            if let Some(unknown) = anchor.triggers.iter().find(|t| !trigger_map.contains_key(*t)) {
                return Err(CatalogError::Invalid(format!(
                    "anchor {} offers unknown trigger {unknown}",
                    anchor.id
                )));
            }
            if anchor.partner_search_radius < 0.0 {
                return Err(CatalogError::Invalid(format!(
                    "anchor {} has a negative partner search radius",
                    anchor.id
                )));
            }
            let id = anchor.id.clone();
            if anchor_map.insert(id.clone(), Arc::new(anchor)).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate anchor id {id}")));
            }
            anchor_order.push(id);
        }

        Ok(Self {
            tuning,
            anchors: anchor_map,
            anchor_order,
            triggers: trigger_map,
        })
    }

    /// Timing and threshold configuration.
    #[must_use]
    pub fn tuning(&self) -> &PipelineTuning {
        &self.tuning
    }

    /// Looks up a trigger definition.
    #[must_use]
    pub fn trigger(&self, id: &TriggerId) -> Option<&Arc<TriggerDefinition>> {
        self.triggers.get(id)
    }

    /// Looks up an anchor.
    #[must_use]
    pub fn anchor(&self, id: &AnchorId) -> Option<&Arc<AnchorDefinition>> {
        self.anchors.get(id)
    }

    /// Anchors in the order they were configured.
    pub fn anchors(&self) -> impl Iterator<Item = &Arc<AnchorDefinition>> {
        self.anchor_order.iter().filter_map(|id| self.anchors.get(id))
    }

    /// Number of loaded trigger definitions.
    #[must_use]
    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }
}

fn ensure_non_negative(value: f32, what: &str) -> Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::Invalid(format!(
            "{what} must be a non-negative number, got {value}"
        )))
    }
}

fn validate_tuning(tuning: &PipelineTuning) -> Result<(), CatalogError> {
    ensure_non_negative(tuning.positioning_duration, "positioning_duration")?;
    ensure_non_negative(tuning.camera_blend_duration, "camera_blend_duration")?;
    ensure_non_negative(tuning.ik_blend_duration, "ik_blend_duration")?;
    ensure_non_negative(tuning.timeout_margin, "timeout_margin")?;
    ensure_non_negative(tuning.min_animation_timeout, "min_animation_timeout")?;
    ensure_non_negative(tuning.max_cinematic_duration, "max_cinematic_duration")?;
    ensure_non_negative(tuning.reaction_delay, "reaction_delay")?;
    ensure_non_negative(tuning.stopping_distance, "stopping_distance")?;
    ensure_non_negative(tuning.rotate_duration, "rotate_duration")?;
    ensure_non_negative(tuning.arrival_timeout, "arrival_timeout")?;

    if tuning.max_animation_timeout < tuning.min_animation_timeout {
        return Err(CatalogError::Invalid(
            "max_animation_timeout must not be below min_animation_timeout".to_owned(),
        ));
    }
    if !(tuning.completion_threshold > 0.0 && tuning.completion_threshold <= 1.0) {
        return Err(CatalogError::Invalid(
            "completion_threshold must be in (0, 1]".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&tuning.ik_playback_weight) {
        return Err(CatalogError::Invalid(
            "ik_playback_weight must be in [0, 1]".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&tuning.gesture_probability) {
        return Err(CatalogError::Invalid(
            "gesture_probability must be in [0, 1]".to_owned(),
        ));
    }
    if tuning.idle_interval <= 0.0 {
        return Err(CatalogError::Invalid(
            "idle_interval must be positive".to_owned(),
        ));
    }
    Ok(())
}

fn validate_trigger(trigger: &TriggerDefinition) -> Result<(), CatalogError> {
    match &trigger.playback {
        PlaybackSpec::Animation(spec) => {
            ensure_non_negative(spec.transition_time, "transition_time")?;
            if spec.target_state.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "trigger {} has an empty target state",
                    trigger.id
                )));
            }
        }
        PlaybackSpec::Cinematic(spec) => {
            ensure_non_negative(spec.fallback_duration, "fallback_duration")?;
        }
    }
    if let Some(radius) = trigger.partner.search_radius {
        ensure_non_negative(radius, "search_radius")?;
    }
    Ok(())
}
