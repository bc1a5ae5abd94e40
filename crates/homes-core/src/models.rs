//! Data models for Homes
//!
//! Defines the listing record, its home type, and the write payload used
//! for inserts and partial updates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub i64);

impl ListingId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ListingId {
    fn from(id: i64) -> Self {
        ListingId(id)
    }
}

impl FromStr for ListingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ListingId)
    }
}

/// Kind of home a listing describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeType {
    #[default]
    Unknown,
    Single,
    Multi,
}

impl HomeType {
    pub const ALL: [HomeType; 3] = [HomeType::Unknown, HomeType::Single, HomeType::Multi];

    /// Stored integer code
    pub fn code(self) -> i64 {
        match self {
            HomeType::Unknown => 0,
            HomeType::Single => 1,
            HomeType::Multi => 2,
        }
    }

    /// Map a stored integer code back to a type; `None` for anything else
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(HomeType::Unknown),
            1 => Some(HomeType::Single),
            2 => Some(HomeType::Multi),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HomeType::Unknown => "Unknown",
            HomeType::Single => "Single",
            HomeType::Multi => "Multi",
        }
    }
}

impl fmt::Display for HomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub address: String,
    /// Stored exactly as given; empty or absent means "unknown" to a presenter
    pub county: Option<String>,
    #[serde(rename = "type")]
    pub home_type: HomeType,
    /// Monthly income, never negative
    pub income: i64,
}

/// Field set submitted for an insert or update
///
/// Every field is optional so that an update can carry only the fields it
/// changes. `home_type` holds the raw integer code so that out-of-range
/// values reach validation instead of being lost at the call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingValues {
    pub address: Option<String>,
    /// Outer `Option` is "supplied", inner is the nullable column value
    pub county: Option<Option<String>>,
    pub home_type: Option<i64>,
    pub income: Option<i64>,
}

impl ListingValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(Some(county.into()));
        self
    }

    /// Supply a null county
    pub fn clear_county(mut self) -> Self {
        self.county = Some(None);
        self
    }

    pub fn home_type(mut self, home_type: HomeType) -> Self {
        self.home_type = Some(home_type.code());
        self
    }

    /// Supply a raw type code, valid or not
    pub fn type_code(mut self, code: i64) -> Self {
        self.home_type = Some(code);
        self
    }

    pub fn income(mut self, income: i64) -> Self {
        self.income = Some(income);
        self
    }

    /// True when no field has been supplied
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.county.is_none()
            && self.home_type.is_none()
            && self.income.is_none()
    }
}

impl From<&Listing> for ListingValues {
    fn from(listing: &Listing) -> Self {
        Self {
            address: Some(listing.address.clone()),
            county: Some(listing.county.clone()),
            home_type: Some(listing.home_type.code()),
            income: Some(listing.income),
        }
    }
}
