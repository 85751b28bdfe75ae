//! The repair pipeline: a strict ordered sequence of stages, each taking the
//! previous stage's snapshot. Order matters — later stages assume the
//! invariants restored by earlier ones (orphan items are only judged against
//! the already-cleaned page table, dish years against the already-cleaned
//! item table, and so on).

pub mod stages;

use serde::Serialize;

use crate::data::tables::Dataset;

/// What one stage did: rows fixed in place and rows removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: &'static str,
    pub repaired: usize,
    pub dropped: usize,
}

impl StageOutcome {
    pub(crate) fn new(stage: &'static str, repaired: usize, dropped: usize) -> Self {
        Self {
            stage,
            repaired,
            dropped,
        }
    }
}

/// The cleaned dataset together with the per-stage trace.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub dataset: Dataset,
    pub outcomes: Vec<StageOutcome>,
}

type Stage = fn(Dataset) -> (Dataset, StageOutcome);

const STAGES: &[Stage] = &[
    stages::fix_timestamp_order,
    stages::drop_orphan_pages,
    stages::drop_orphan_items,
    stages::recompute_dish_years,
    stages::repair_dish_prices,
    stages::repair_item_prices,
    stages::dedup_page_dish_pairs,
    stages::drop_invalid_dish_items,
];

/// Run every repair stage in order and return the cleaned dataset plus the
/// stage trace. Never fails; an empty dataset passes through unchanged.
pub fn run_pipeline(dataset: Dataset) -> PipelineRun {
    let mut dataset = dataset;
    let mut outcomes = Vec::with_capacity(STAGES.len());
    for stage in STAGES {
        let (next, outcome) = stage(dataset);
        dataset = next;
        outcomes.push(outcome);
    }
    PipelineRun { dataset, outcomes }
}
