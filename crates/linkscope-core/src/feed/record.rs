use thiserror::Error;

use crate::variant::{UrlVariant, VariantKind};

/// Why a [`PostRecord`] could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("post record has no assets")]
    NoAssets,
    #[error("{0} is not a post")]
    NotAPost(String),
    #[error("{0} is not an asset")]
    NotAnAsset(String),
}

/// A discovered post ready for registration.
#[derive(Debug, Clone)]
pub struct PostRecord {
    post: UrlVariant,
    assets: Vec<UrlVariant>,
    created_at: i64,
    score: i64,
}

impl PostRecord {
    /// `post` must be a post (or gallery) variant and `assets` a non-empty,
    /// ordered list of asset variants. `created_at` is unix seconds.
    pub fn new(
        post: UrlVariant,
        assets: Vec<UrlVariant>,
        created_at: i64,
        score: i64,
    ) -> Result<Self, RecordError> {
        if !matches!(post.kind(), VariantKind::Post | VariantKind::Gallery) {
            return Err(RecordError::NotAPost(post.normalize()));
        }
        if assets.is_empty() {
            return Err(RecordError::NoAssets);
        }
        if let Some(bad) = assets.iter().find(|a| !a.kind().is_asset()) {
            return Err(RecordError::NotAnAsset(bad.normalize()));
        }
        Ok(Self {
            post,
            assets,
            created_at,
            score,
        })
    }

    pub fn post(&self) -> &UrlVariant {
        &self.post
    }

    pub fn assets(&self) -> &[UrlVariant] {
        &self.assets
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Canonical URL of the post; the dedup key for feeds and sinks.
    pub fn normalized_post(&self) -> String {
        self.post.normalize()
    }
}
