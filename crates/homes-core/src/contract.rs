//! Resource keys and media types
//!
//! The store is addressed like a small REST collection:
//!
//! - `listings`: every listing
//! - `listings/<id>`: one listing
//!
//! Keys may also be written fully qualified as
//! `content://<authority>/listings[/<id>]`. A [`KeyResolver`] turns key
//! strings into a [`ResourceKey`] once, at the boundary, so store
//! operations match on the variant instead of on strings.

use std::fmt;

use crate::error::{Operation, StoreError, StoreResult};
use crate::models::ListingId;

/// Default authority for fully qualified keys
pub const DEFAULT_AUTHORITY: &str = "com.example.homes";

/// Path segment of the listings collection
pub const PATH_LISTINGS: &str = "listings";

const SCHEME: &str = "content://";

/// A resolved key: the collection or a single listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Collection,
    Item(ListingId),
}

impl ResourceKey {
    pub fn item(id: i64) -> Self {
        ResourceKey::Item(ListingId(id))
    }

    /// Canonical short form (`listings` or `listings/<id>`)
    pub fn to_key(&self) -> String {
        self.to_string()
    }

    pub fn id(&self) -> Option<ListingId> {
        match self {
            ResourceKey::Collection => None,
            ResourceKey::Item(id) => Some(*id),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Collection => f.write_str(PATH_LISTINGS),
            ResourceKey::Item(id) => write!(f, "{}/{}", PATH_LISTINGS, id),
        }
    }
}

/// Shape marker returned by `get_type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    List(String),
    Item(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::List(s) | MediaType::Item(s) => s,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, MediaType::List(_))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless key resolution for one authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResolver {
    authority: String,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORITY)
    }
}

impl KeyResolver {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Resolve a key string into a [`ResourceKey`]
    ///
    /// Unrecognised keys are an error rather than a silent no-op.
    pub fn resolve(&self, key: &str) -> StoreResult<ResourceKey> {
        let unsupported = || StoreError::unsupported(Operation::Resolve, key);

        let path = match key.strip_prefix(SCHEME) {
            Some(rest) => {
                let (authority, path) = rest.split_once('/').ok_or_else(unsupported)?;
                if authority != self.authority {
                    return Err(unsupported());
                }
                path
            }
            None => key,
        };

        let path = path.strip_suffix('/').unwrap_or(path);
        let mut segments = path.split('/');

        if segments.next() != Some(PATH_LISTINGS) {
            return Err(unsupported());
        }

        match (segments.next(), segments.next()) {
            (None, _) => Ok(ResourceKey::Collection),
            (Some(id), None) if is_decimal(id) => id
                .parse::<i64>()
                .map(|id| ResourceKey::Item(ListingId(id)))
                .map_err(|_| unsupported()),
            _ => Err(unsupported()),
        }
    }

    /// Fully qualified form of a key
    pub fn qualify(&self, key: &ResourceKey) -> String {
        format!("{}{}/{}", SCHEME, self.authority, key)
    }

    /// Media type describing the shape of a response for `key`
    pub fn media_type(&self, key: &ResourceKey) -> MediaType {
        match key {
            ResourceKey::Collection => MediaType::List(format!(
                "vnd.homes.dir/{}/{}",
                self.authority, PATH_LISTINGS
            )),
            ResourceKey::Item(_) => MediaType::Item(format!(
                "vnd.homes.item/{}/{}",
                self.authority, PATH_LISTINGS
            )),
        }
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
