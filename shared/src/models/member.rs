//! Member Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered alumnus, as persisted
///
/// Only `email` is constrained by the database (unique). Every other column
/// is nullable; the registration handler is where required fields are enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    pub name_bengali: Option<String>,
    pub name_english: Option<String>,
    pub ssc_batch: Option<String>,
    pub address_present: Option<String>,
    pub address_permanent: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub membership_category: Option<String>,
    /// Base64 data URI or image-host URL; empty when no photo was supplied
    pub image: String,
    pub created_at: i64,
}

/// Create member payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCreate {
    pub name_bengali: Option<String>,
    pub name_english: Option<String>,
    pub ssc_batch: Option<String>,
    pub address_present: Option<String>,
    pub address_permanent: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub occupation: Option<String>,
    pub marital_status: Option<MaritalStatus>,
    pub membership_category: Option<MembershipCategory>,
    pub image: String,
}

/// Membership category offered on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipCategory {
    #[serde(rename = "Life Member")]
    Life,
    #[serde(rename = "Executive Member")]
    Executive,
    #[serde(rename = "General Member")]
    General,
}

impl MembershipCategory {
    /// All categories, in form display order
    pub const ALL: [MembershipCategory; 3] = [
        MembershipCategory::Life,
        MembershipCategory::Executive,
        MembershipCategory::General,
    ];

    /// Label as submitted by the form and stored in the database
    pub const fn as_str(&self) -> &'static str {
        match self {
            MembershipCategory::Life => "Life Member",
            MembershipCategory::Executive => "Executive Member",
            MembershipCategory::General => "General Member",
        }
    }

    /// Registration fee in Taka. Display only, never charged.
    pub const fn fee(&self) -> u32 {
        match self {
            MembershipCategory::Life => 1000,
            MembershipCategory::Executive => 500,
            MembershipCategory::General => 200,
        }
    }
}

impl fmt::Display for MembershipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Marital status radio values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Married,
    Unmarried,
}

impl MaritalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Married => "married",
            MaritalStatus::Unmarried => "unmarried",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaritalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "married" => Ok(MaritalStatus::Married),
            "unmarried" => Ok(MaritalStatus::Unmarried),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Value did not match any known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);
