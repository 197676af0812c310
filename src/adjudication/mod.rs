//! Turning a reviewer's per-day decisions into a request status and a
//! balance debit.

pub mod calendar;
pub mod ledger;
pub mod merge;
pub mod service;
pub mod status;

pub use calendar::{ExclusionPolicy, WeekOffs, resolve_exclusions};
pub use merge::{DayDecision, DecisionStatus, MergeOutcome, merge_decisions};
pub use service::{Action, AdjudicationCommand, Adjudicator, Reviewer, Settlement};
pub use status::classify;
