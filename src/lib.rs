//! Quadra Match - persistent search & match notification service for the
//! Quadra athlete marketplace.
//!
//! A requester describes a desired athlete in free text; the service
//! extracts structured criteria, answers with an immediate ranked result
//! list, and keeps the query alive as a standing search that every later
//! profile write is evaluated against, notifying at most once per
//! (standing search, candidate) pair.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, rank, satisfies, RESULT_CAP, SIMILAR_LIMIT};
pub use crate::models::{
    AvailabilityStatus, CandidateProfile, ChannelKind, Criteria, MatchKind, Position,
    RankedCandidate, RequesterKind, SearchStatus, StandingSearch,
};
