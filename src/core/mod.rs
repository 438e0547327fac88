// Core matching logic exports
pub mod evaluator;
pub mod fallback;
pub mod normalizer;
pub mod query;

pub use evaluator::matching_searches;
pub use fallback::{plan, should_broaden, finalize, QueryPlan, SearchOutcome, SIMILAR_LIMIT};
pub use normalizer::normalize;
pub use query::{rank, satisfies, RESULT_CAP};
