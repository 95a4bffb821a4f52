use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use crate::common::{ProfileId, UserId};

/// Marketplace role, fixed when the profile is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }

    /// Buyers can trade immediately; sellers wait for review.
    pub fn initially_verified(&self) -> bool {
        matches!(self, Role::Buyer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            other => anyhow::bail!("Unknown role: {}", other),
        }
    }
}

/// Profile - the role/verification record attached to an auth principal
///
/// One per user. `role` never changes after insert; `is_verified` starts true
/// for buyers and false for sellers until an admin approves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub role: Role,
    pub is_verified: bool,
    pub full_name: Option<String>,
    pub business_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether the seller has submitted verification details. An empty string
    /// counts as not submitted.
    pub fn has_business_name(&self) -> bool {
        self.business_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    /// Build the row a store would return for `new` (used by non-SQL stores).
    pub fn from_new(new: NewProfile) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::new(),
            user_id: new.user_id,
            role: new.role,
            is_verified: new.is_verified,
            full_name: None,
            business_name: None,
            phone_number: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub fn fixture(user_id: UserId, role: Role, is_verified: bool) -> Self {
        let mut profile = Self::from_new(NewProfile::for_role(user_id, role));
        profile.is_verified = is_verified;
        profile
    }
}

/// Insert payload. The initial verification flag is derived from the role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: UserId,
    pub role: Role,
    pub is_verified: bool,
}

impl NewProfile {
    pub fn for_role(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            is_verified: role.initially_verified(),
        }
    }
}

/// Partial update. `None` leaves the column untouched; there is deliberately
/// no way to change `role`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub business_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub is_verified: Option<bool>,
}

impl ProfileUpdate {
    pub fn verified(is_verified: bool) -> Self {
        Self {
            is_verified: Some(is_verified),
            ..Default::default()
        }
    }

    /// Apply in memory, mirroring the SQL `COALESCE` update.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(v) = &self.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = &self.business_name {
            profile.business_name = Some(v.clone());
        }
        if let Some(v) = &self.phone_number {
            profile.phone_number = Some(v.clone());
        }
        if let Some(v) = &self.address {
            profile.address = Some(v.clone());
        }
        if let Some(v) = self.is_verified {
            profile.is_verified = v;
        }
        profile.updated_at = Utc::now();
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Profile {
    pub async fn find_by_user_id(user_id: UserId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new profile. Fails with a unique violation if the user already
    /// has one.
    pub async fn insert(new: &NewProfile, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO profiles (user_id, role, is_verified)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.role)
        .bind(new.is_verified)
        .fetch_one(pool)
        .await
    }

    /// Apply a partial update. Returns `None` if the user has no profile.
    pub async fn update(
        user_id: UserId,
        update: &ProfileUpdate,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                business_name = COALESCE($3, business_name),
                phone_number = COALESCE($4, phone_number),
                address = COALESCE($5, address),
                is_verified = COALESCE($6, is_verified),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.full_name)
        .bind(&update.business_name)
        .bind(&update.phone_number)
        .bind(&update.address)
        .bind(update.is_verified)
        .fetch_optional(pool)
        .await
    }
}
