//! Search specifications and the three-phase search over a lexicon.
//!
//! A [`SearchSpec`] is split by [`QueryPlan`] into graph, attribute and
//! post-filter phases, which [`SearchExecutor`] runs in order.

pub mod executor;
pub mod parser;
pub mod planner;
pub mod post;
pub mod spec;

pub use executor::SearchExecutor;
pub use parser::{parse_spec, ParseError};
pub use planner::{Phase, QueryPlan};
pub use spec::{Condition, ConditionKind, Range, SearchSet, SearchSpec};
