//! Expedition orchestration and its outputs

pub mod orchestrator;
pub mod summary;

pub use orchestrator::Expedition;
pub use summary::{CharacterDelta, ExpeditionReport, ExpeditionStatus, ExpeditionSummary};
