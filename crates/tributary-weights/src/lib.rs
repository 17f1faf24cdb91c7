//! # tributary-weights — Node reference weight model.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! Two layers, both pure:
//! - **Time priority**: earlier work outranks later work, decaying as
//!   `365 / (365 + age_days)` in ppb fixed point.
//! - **Reference weight**: `citations × time_priority × creativity`, the
//!   relative importance of an upstream node when a propagated pool is
//!   split among several cited nodes.

pub mod model;
pub mod priority;

pub use model::{reference_weight_ppb, ReferenceModel};
pub use priority::time_priority_ppb;
