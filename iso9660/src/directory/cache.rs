//! Directory cache
//!
//! Decoded listings are kept per directory, keyed by the lowercase path
//! relative to the root without leading or trailing `/` (the root itself is
//! the empty key). The cache only grows while mounted; the owning
//! [`crate::Iso9660Fs`] is its single writer.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::DirectoryListing;

/// Listings of already decoded directories
#[derive(Debug, Default)]
pub struct DirectoryCache {
    listings: BTreeMap<String, DirectoryListing>,
}

impl DirectoryCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing cached under `key`
    pub fn get(&self, key: &str) -> Option<&DirectoryListing> {
        self.listings.get(key)
    }

    /// Is `key` cached?
    pub fn contains(&self, key: &str) -> bool {
        self.listings.contains_key(key)
    }

    /// Cache a listing; an existing listing for `key` is kept
    pub fn insert(&mut self, key: String, listing: DirectoryListing) -> &DirectoryListing {
        self.listings.entry(key).or_insert(listing)
    }

    /// Drop every listing
    pub fn clear(&mut self) {
        self.listings.clear();
    }

    /// Number of cached directories
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Cache key for a caller path
///
/// Empty components are dropped, so `a//b/` and `a/b` share a key.
pub fn cache_key(path: &str) -> String {
    path.split('/')
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase()
}
