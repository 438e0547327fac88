// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AvailabilityStatus, CandidateProfile, ChannelKind, Criteria, MatchKind, MatchNotification,
    Position, RankedCandidate, RequesterKind, SearchStatus, StandingSearch,
};
pub use requests::{ProfileEventRequest, SetSearchStatusRequest, SubmitSearchRequest};
pub use responses::{
    ErrorResponse, EvaluationReport, HealthResponse, SearchResponse, SetSearchStatusResponse,
};
