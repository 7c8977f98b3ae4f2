use super::UrlVariant;
use crate::context::Context;
use crate::dispatch::Classification;
use crate::session::SessionError;

/// What a site resolver extracted, before related URLs are classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRelations {
    pub primary_names: Vec<String>,
    pub secondary_names: Vec<String>,
    pub related_urls: Vec<String>,
}

/// Resolved relations of a variant.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    /// Display names (e.g. the artist's current name).
    pub primary_names: Vec<String>,
    /// Handles, former names and other aliases.
    pub secondary_names: Vec<String>,
    /// Other variants this one links to, in discovery order.
    pub related: Vec<UrlVariant>,
}

pub(super) fn resolve(variant: &UrlVariant, ctx: &Context) -> Result<Relations, SessionError> {
    let Some(resolver) = variant.behavior.resolver else {
        return Ok(Relations::default());
    };
    tracing::debug!(site = variant.site, url = %variant, "resolving relations");
    let raw = resolver(variant, ctx)?;

    let mut related: Vec<UrlVariant> = Vec::new();
    for url in &raw.related_urls {
        match ctx.dispatcher().classify(url) {
            Ok(Classification::Variant(found)) => {
                if found != *variant && !related.contains(&found) {
                    related.push(found);
                }
            }
            Ok(other) => {
                tracing::debug!(url = %url, outcome = ?other, "dropping related url");
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "dropping malformed related url");
            }
        }
    }

    Ok(Relations {
        primary_names: clean_names(raw.primary_names),
        secondary_names: clean_names(raw.secondary_names),
        related,
    })
}

/// Trims names, drops empty ones and duplicates, keeps first-seen order.
fn clean_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}
