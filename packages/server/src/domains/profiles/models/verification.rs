use serde::{Deserialize, Serialize};

use super::{Profile, ProfileUpdate};
use crate::common::ValidationErrors;

/// Where a profile stands in seller review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    /// Seller has not submitted business details yet
    AwaitingDetails,
    /// Details submitted, waiting for an admin
    Pending,
    Verified,
}

impl VerificationState {
    pub fn of(profile: &Profile) -> Self {
        if profile.is_verified {
            Self::Verified
        } else if profile.has_business_name() {
            Self::Pending
        } else {
            Self::AwaitingDetails
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingDetails => "awaiting_details",
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }
}

/// Business details a seller submits for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDetails {
    pub business_name: String,
    pub full_name: String,
    pub phone_number: String,
    pub address: String,
}

impl VerificationDetails {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .min_chars("business_name", &self.business_name, 2, "Business name is required")
            .min_chars("full_name", &self.full_name, 2, "Full name is required")
            .phone("phone_number", &self.phone_number)
            .min_chars("address", &self.address, 5, "Business address is required");
        errors.into_result()
    }

    /// Submitting (or resubmitting) details always puts the seller back into
    /// review.
    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            business_name: Some(self.business_name),
            full_name: Some(self.full_name),
            phone_number: Some(self.phone_number),
            address: Some(self.address),
            is_verified: Some(false),
        }
    }
}
