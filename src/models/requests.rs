use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to submit (or re-submit) a search description
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitSearchRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "requesterId", alias = "requester_id")]
    pub requester_id: String,
    #[serde(rename = "requesterKind", alias = "requester_kind")]
    pub requester_kind: String,
    #[validate(length(min = 1))]
    #[serde(rename = "requesterContact", alias = "requester_contact")]
    pub requester_contact: String,
    #[validate(length(min = 1))]
    #[serde(rename = "description", alias = "descriptionText")]
    pub description: String,
    /// Whether the requester's entitlement allows rendering contact data.
    /// Decided by the external paywall gate; affects display only.
    #[serde(default, rename = "contactVisible", alias = "contact_visible")]
    pub contact_visible: bool,
}

/// Request to toggle a standing search between active and expired
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetSearchStatusRequest {
    #[serde(rename = "searchId", alias = "search_id")]
    pub search_id: uuid::Uuid,
    #[validate(length(min = 1))]
    pub status: String,
}

/// Profile create/update event from the profile-write feed.
/// Carries the full new attribute values; delivered at least once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileEventRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "profileId", alias = "profile_id")]
    pub profile_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, rename = "avatarUrl", alias = "avatar_url")]
    pub avatar_url: Option<String>,
    pub position: String,
    pub nationality: String,
    #[serde(rename = "heightCm", alias = "height_cm")]
    pub height_cm: u16,
    pub status: String,
    #[serde(default, rename = "experienceYears", alias = "experience_years")]
    pub experience_years: u8,
    #[serde(default, rename = "contactEmail", alias = "contact_email")]
    pub contact_email: Option<String>,
}

impl ProfileEventRequest {
    pub fn into_profile(self) -> crate::models::CandidateProfile {
        crate::models::CandidateProfile {
            id: self.profile_id,
            name: self.name,
            avatar_url: self.avatar_url,
            position: self.position,
            nationality: self.nationality,
            height_cm: self.height_cm,
            status: self.status,
            experience_years: self.experience_years,
            contact_email: self.contact_email,
            updated_at: Some(chrono::Utc::now()),
        }
    }
}
