use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The seven canonical handball playing positions.
///
/// Canonical display names are the Portuguese forms used across the
/// marketplace; parsing is case-insensitive and accepts the unaccented
/// spelling of "Pivô".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Goleiro")]
    Goleiro,
    #[serde(rename = "Ponta Esquerda")]
    PontaEsquerda,
    #[serde(rename = "Armador Esquerdo")]
    ArmadorEsquerdo,
    #[serde(rename = "Armador Central")]
    ArmadorCentral,
    #[serde(rename = "Armador Direito")]
    ArmadorDireito,
    #[serde(rename = "Ponta Direita")]
    PontaDireita,
    #[serde(rename = "Pivô")]
    Pivo,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goleiro => "Goleiro",
            Position::PontaEsquerda => "Ponta Esquerda",
            Position::ArmadorEsquerdo => "Armador Esquerdo",
            Position::ArmadorCentral => "Armador Central",
            Position::ArmadorDireito => "Armador Direito",
            Position::PontaDireita => "Ponta Direita",
            Position::Pivo => "Pivô",
        }
    }

    /// Case-insensitive parse against the canonical names.
    /// Returns None for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "goleiro" => Some(Position::Goleiro),
            "ponta esquerda" => Some(Position::PontaEsquerda),
            "armador esquerdo" => Some(Position::ArmadorEsquerdo),
            "armador central" => Some(Position::ArmadorCentral),
            "armador direito" => Some(Position::ArmadorDireito),
            "ponta direita" => Some(Position::PontaDireita),
            "pivô" | "pivo" => Some(Position::Pivo),
            _ => None,
        }
    }
}

/// Contract/availability status an athlete advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    SeekingClub,
    InNegotiation,
    UnderContract,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "Available",
            AvailabilityStatus::SeekingClub => "SeekingClub",
            AvailabilityStatus::InNegotiation => "InNegotiation",
            AvailabilityStatus::UnderContract => "UnderContract",
        }
    }

    /// Case-insensitive parse; also tolerates space/underscore/hyphen
    /// separators ("seeking club", "seeking_club").
    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        match compact.as_str() {
            "available" => Some(AvailabilityStatus::Available),
            "seekingclub" => Some(AvailabilityStatus::SeekingClub),
            "innegotiation" => Some(AvailabilityStatus::InNegotiation),
            "undercontract" => Some(AvailabilityStatus::UnderContract),
            _ => None,
        }
    }
}

/// Canonical structured search criteria. Every field is optional; an
/// empty value means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(rename = "heightMin", default, skip_serializing_if = "Option::is_none")]
    pub height_min: Option<u16>,
    #[serde(rename = "heightMax", default, skip_serializing_if = "Option::is_none")]
    pub height_max: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AvailabilityStatus>,
    #[serde(rename = "experienceMin", default, skip_serializing_if = "Option::is_none")]
    pub experience_min: Option<u8>,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.nationality.is_none()
            && self.height_min.is_none()
            && self.height_max.is_none()
            && self.status.is_none()
            && self.experience_min.is_none()
    }

    /// The implicit default applied when extraction yields nothing usable.
    pub fn available_only() -> Self {
        Criteria {
            status: Some(AvailabilityStatus::Available),
            ..Criteria::default()
        }
    }
}

/// Who registered the standing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequesterKind {
    Athlete,
    Coach,
    Club,
    Agent,
}

impl RequesterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequesterKind::Athlete => "athlete",
            RequesterKind::Coach => "coach",
            RequesterKind::Club => "club",
            RequesterKind::Agent => "agent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "athlete" => Some(RequesterKind::Athlete),
            "coach" => Some(RequesterKind::Coach),
            "club" => Some(RequesterKind::Club),
            "agent" => Some(RequesterKind::Agent),
            _ => None,
        }
    }
}

/// Lifecycle state of a standing search. Expired searches are kept but
/// never matched; the toggle never deletes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Active,
    Expired,
}

impl SearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Active => "active",
            SearchStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(SearchStatus::Active),
            "expired" => Some(SearchStatus::Expired),
            _ => None,
        }
    }
}

/// A persisted query that keeps matching future profile writes.
/// At most one exists per requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingSearch {
    pub id: Uuid,
    #[serde(rename = "requesterId")]
    pub requester_id: String,
    #[serde(rename = "requesterKind")]
    pub requester_kind: RequesterKind,
    #[serde(rename = "requesterContact")]
    pub requester_contact: String,
    #[serde(rename = "descriptionText")]
    pub description_text: String,
    pub criteria: Criteria,
    pub status: SearchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Athlete profile attributes evaluated against criteria, plus display
/// attributes irrelevant to matching. Owned by the external profile CRUD;
/// position and status arrive as free strings from that side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    pub name: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    pub position: String,
    pub nationality: String,
    #[serde(rename = "heightCm")]
    pub height_cm: u16,
    pub status: String,
    #[serde(rename = "experienceYears", default)]
    pub experience_years: u8,
    #[serde(rename = "contactEmail", default)]
    pub contact_email: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A candidate in a result list, carrying its presentation rank and score.
/// The score is a display artifact; inclusion is decided by the criteria
/// predicate alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub name: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    pub position: String,
    pub nationality: String,
    #[serde(rename = "heightCm")]
    pub height_cm: u16,
    pub status: String,
    #[serde(rename = "experienceYears")]
    pub experience_years: u8,
    /// Masked at render time by the paywall gate, never at match time.
    pub contact: Option<String>,
    pub rank: usize,
    pub score: f64,
}

/// How a result list was produced. Anything other than `Matched` tells
/// the UI to label the list accordingly instead of presenting it as an
/// exact answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    /// Candidates satisfying every present criteria field.
    Matched,
    /// Extraction produced nothing usable; implicit `{status: Available}`.
    DefaultAvailable,
    /// Position-constrained query came back empty; broadened once.
    Similar,
    /// True empty state.
    Empty,
}

/// Delivery channel for a match notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Inbox,
    Email,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Inbox => "inbox",
            ChannelKind::Email => "email",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "inbox" => Some(ChannelKind::Inbox),
            "email" => Some(ChannelKind::Email),
            _ => None,
        }
    }
}

/// Record of a delivered (or partially delivered) match notification.
/// The (standing_search_id, candidate_profile_id) pair is unique; the row
/// is never mutated except to extend `channels` after a channel retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchNotification {
    pub id: Uuid,
    #[serde(rename = "standingSearchId")]
    pub standing_search_id: Uuid,
    #[serde(rename = "candidateProfileId")]
    pub candidate_profile_id: String,
    pub channels: Vec<ChannelKind>,
    #[serde(rename = "sentAt")]
    pub sent_at: chrono::DateTime<chrono::Utc>,
}
