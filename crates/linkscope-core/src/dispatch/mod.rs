//! Domain registry and dispatch.
//!
//! Site adapters register for the registrable domains they handle. To
//! classify a URL the dispatcher decomposes it, looks up the adapters routed
//! for its domain and asks each in registration order; the first adapter
//! that recognizes the URL (as a variant or as affirmatively unparsable)
//! decides. Classification performs no I/O.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::decompose::{DecomposeError, DecomposedUrl, Decomposer};
use crate::variant::UrlVariant;

/// Errors that reject a single URL before any adapter sees it.
pub type ClassifyError = DecomposeError;

/// A site plug-in: recognizes URLs on its domains. Must be pure.
pub trait SiteAdapter: Send + Sync {
    /// Site name; becomes part of every variant's identity.
    fn name(&self) -> &'static str;

    /// Registrable domains (`example.com`) this adapter is routed for.
    fn domains(&self) -> Vec<&'static str>;

    fn match_url(&self, url: &DecomposedUrl) -> MatchOutcome;
}

/// An adapter's answer for one URL.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    Variant(UrlVariant),
    /// Recognized as this site's, but deliberately not representable.
    Unparsable(String),
    /// Not recognized; the next adapter for the domain is asked.
    NoMatch,
}

/// Result of classifying one URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Variant(UrlVariant),
    /// An adapter recognized the URL and declared it unparsable. Expected.
    Unparsable { site: &'static str, reason: String },
    /// No adapter recognized the URL: a missing rule or an unregistered domain.
    Unknown { domain: String },
}

impl Classification {
    pub fn variant(&self) -> Option<&UrlVariant> {
        match self {
            Classification::Variant(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_variant(self) -> Option<UrlVariant> {
        match self {
            Classification::Variant(v) => Some(v),
            _ => None,
        }
    }
}

/// Domain → adapters routing table plus a shared decomposition cache.
#[derive(Default)]
pub struct Dispatcher {
    decomposer: Decomposer,
    adapters: Vec<Arc<dyn SiteAdapter>>,
    routes: HashMap<String, Vec<usize>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.adapters.iter().map(|a| a.name()).collect();
        f.debug_struct("Dispatcher")
            .field("adapters", &names)
            .field("domains", &self.routes.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` for every domain it reports. Adapters registered
    /// earlier are asked first.
    pub fn register<A: SiteAdapter + 'static>(&mut self, adapter: A) {
        self.register_arc(Arc::new(adapter));
    }

    pub fn register_arc(&mut self, adapter: Arc<dyn SiteAdapter>) {
        let index = self.adapters.len();
        for domain in adapter.domains() {
            self.route(domain, index);
        }
        tracing::debug!(site = adapter.name(), "registered adapter");
        self.adapters.push(adapter);
    }

    /// Routes `domain` to the already registered adapter named `adapter`,
    /// e.g. a mirror or CDN domain serving another site's content.
    pub fn alias(&mut self, domain: &str, adapter: &str) -> Result<()> {
        let Some(index) = self.adapters.iter().position(|a| a.name() == adapter) else {
            bail!("cannot alias {domain}: no adapter named {adapter:?}");
        };
        self.route(domain, index);
        Ok(())
    }

    fn route(&mut self, domain: &str, index: usize) {
        let entry = self.routes.entry(domain.to_ascii_lowercase()).or_default();
        if !entry.contains(&index) {
            entry.push(index);
        }
    }

    /// Classifies one raw URL string.
    pub fn classify(&self, raw: &str) -> Result<Classification, ClassifyError> {
        let url = self.decomposer.decompose(raw)?;
        let classification = self.dispatch(&url);
        match &classification {
            Classification::Variant(v) => {
                tracing::debug!(url = raw, site = v.site(), kind = %v.kind(), "classified");
            }
            Classification::Unparsable { site, reason } => {
                tracing::debug!(url = raw, site, reason = %reason, "unparsable");
            }
            Classification::Unknown { domain } => {
                tracing::warn!(url = raw, domain = %domain, "no adapter recognized url");
            }
        }
        Ok(classification)
    }

    fn dispatch(&self, url: &DecomposedUrl) -> Classification {
        let candidates = self.routes.get(&url.domain).map(Vec::as_slice).unwrap_or(&[]);
        for &index in candidates {
            let adapter = &self.adapters[index];
            match adapter.match_url(url) {
                MatchOutcome::Variant(v) => return Classification::Variant(v),
                MatchOutcome::Unparsable(reason) => {
                    return Classification::Unparsable {
                        site: adapter.name(),
                        reason,
                    }
                }
                MatchOutcome::NoMatch => {}
            }
        }
        Classification::Unknown {
            domain: url.domain.clone(),
        }
    }

    /// Classifies a batch; each input gets its own result.
    pub fn classify_all<I, S>(&self, raws: I) -> Vec<(String, Result<Classification, ClassifyError>)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raws.into_iter()
            .map(|raw| {
                let raw = raw.as_ref();
                (raw.to_string(), self.classify(raw))
            })
            .collect()
    }

    /// Registered domains (sorted) with the names of their adapters in
    /// dispatch order.
    pub fn domains(&self) -> Vec<(&str, Vec<&'static str>)> {
        let mut out: Vec<(&str, Vec<&'static str>)> = self
            .routes
            .iter()
            .map(|(domain, indices)| {
                let names = indices.iter().map(|&i| self.adapters[i].name()).collect();
                (domain.as_str(), names)
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn adapter(&self, name: &str) -> Option<&dyn SiteAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    pub fn decomposer(&self) -> &Decomposer {
        &self.decomposer
    }
}
