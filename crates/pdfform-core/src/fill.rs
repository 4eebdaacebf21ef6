//! Fill-then-flatten planning.
//!
//! The pipeline hands every `{name, value}` pair to a [`FormEngine`] in one
//! batch, then flattens the whole document. The engine does the PDF work;
//! this module owns batch construction, the flatten-candidate subset, and
//! the ordering and abort rules between the two engine calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Literal, case-sensitive prefix excluded from the flatten candidates.
pub const SIGNATURE_FILL_PREFIX: &str = "Esign_";

/// One entry of the fill batch: `{"name": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfFieldData {
    pub name: String,
    pub value: String,
}

impl PdfFieldData {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Appearance policy used when flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenPolicy {
    /// Always rebuild text-field appearances from the current value (default: true).
    pub regenerate_text_fields: bool,
    /// Only build appearances for non-text widgets that have none (default: true).
    pub only_if_missing: bool,
}

impl Default for FlattenPolicy {
    fn default() -> Self {
        Self {
            regenerate_text_fields: true,
            only_if_missing: true,
        }
    }
}

/// Pipeline progress. Only `Flattened` is ever handed back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    Unfilled,
    Filled,
    Flattened,
}

/// The batch and candidate subset derived from caller values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    /// Every caller pair, empty values included, in name order.
    pub batch: Vec<PdfFieldData>,
    /// Names with a non-empty value that do not start with [`SIGNATURE_FILL_PREFIX`].
    ///
    /// Not acted on yet: the pipeline always flattens the whole document.
    pub flatten_candidates: Vec<String>,
}

/// Build the fill batch and flatten-candidate subset.
pub fn plan_fill(values: &BTreeMap<String, String>) -> FillPlan {
    let batch = values
        .iter()
        .map(|(name, value)| PdfFieldData::new(name.as_str(), value.as_str()))
        .collect();
    let flatten_candidates = values
        .iter()
        .filter(|(name, value)| !value.is_empty() && !name.starts_with(SIGNATURE_FILL_PREFIX))
        .map(|(name, _)| name.clone())
        .collect();
    FillPlan {
        batch,
        flatten_candidates,
    }
}

/// Encode a batch as the JSON array `[{"name","value"}, ...]`.
pub fn encode_batch(batch: &[PdfFieldData]) -> Result<String, FormError> {
    Ok(serde_json::to_string(batch)?)
}

/// The document engine that performs the actual fill and flatten.
pub trait FormEngine {
    /// Engine-specific error, convertible into [`FormError`].
    type Error: std::error::Error + Into<FormError>;

    /// Set field values from the batch. Unknown names are the engine's call.
    fn fill(&mut self, batch: &[PdfFieldData]) -> Result<(), Self::Error>;

    /// Convert every form widget into static page content.
    fn flatten_fields(&mut self, policy: &FlattenPolicy) -> Result<(), Self::Error>;
}

/// Outcome of a successful [`run_fill`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
    /// Number of pairs handed to the engine.
    pub filled: usize,
    pub flatten_candidates: Vec<String>,
    pub state: FillState,
}

/// Fill the whole batch, then flatten the whole document.
///
/// A fill failure aborts before flattening. Any error leaves the engine's
/// document half-processed; callers must discard it.
pub fn run_fill<E: FormEngine>(
    engine: &mut E,
    values: &BTreeMap<String, String>,
    policy: &FlattenPolicy,
) -> Result<FillReport, FormError> {
    let plan = plan_fill(values);
    let mut state = FillState::Unfilled;

    engine.fill(&plan.batch).map_err(Into::into)?;
    state = advance(state);

    engine.flatten_fields(policy).map_err(Into::into)?;
    state = advance(state);

    Ok(FillReport {
        filled: plan.batch.len(),
        flatten_candidates: plan.flatten_candidates,
        state,
    })
}

fn advance(state: FillState) -> FillState {
    match state {
        FillState::Unfilled => FillState::Filled,
        FillState::Filled | FillState::Flattened => FillState::Flattened,
    }
}
