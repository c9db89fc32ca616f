//! Chore assignment rotation and occurrence generation.
//!
//! This crate provides:
//! - Assignment modes (fixed, round-robin, mixed) and position-based rotation
//! - Occurrence lifecycle: pending, completed, skipped
//! - Reflow of pending assignees after roster edits and completions
//! - Rolling-horizon generation planning with stable sequence positions
//! - An in-memory ledger that serializes work per chore definition

pub mod assignment;
pub mod definition;
pub mod ledger;
pub mod occurrence;
pub mod planner;
pub mod reflow;

pub use assignment::{assignees_for_position, AssigneeSet, Assignment, AssignmentMode};
pub use definition::ChoreDefinition;
pub use ledger::OccurrenceLedger;
pub use occurrence::{next_status, Occurrence};
pub use planner::{
    generation_window, next_position, plan_generation, regenerate, retain_history,
    GenerationPlan, GenerationWindow, Regeneration,
};
pub use reflow::{reflow, AssignmentChange, ReflowFrom};
