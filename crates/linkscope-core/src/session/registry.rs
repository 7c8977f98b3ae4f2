//! Site name → lazily created, shared session.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Fetched, Session, SessionError};
use crate::memo::{Memo, OnceFill};

/// Builds a site's session. Runs at most once per successful initialization.
pub type SessionFactory = Box<dyn Fn() -> Result<Arc<dyn Session>, SessionError> + Send + Sync>;

struct Slot {
    factory: SessionFactory,
    session: OnceFill<Arc<dyn Session>>,
}

/// Registry of per-site sessions.
///
/// Factories are registered up front; [`SessionRegistry::session`] runs a
/// site's factory on first use and shares the result. Concurrent first
/// callers for the same site block until the one initialization finishes.
/// A failed initialization is not stored, so the next caller retries it.
#[derive(Default)]
pub struct SessionRegistry {
    slots: HashMap<String, Slot>,
    responses: Memo<(String, String), Fetched>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sites: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        sites.sort_unstable();
        f.debug_struct("SessionRegistry")
            .field("sites", &sites)
            .field("cached_responses", &self.responses.len())
            .finish()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the factory for `site`.
    pub fn register<F>(&mut self, site: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Session>, SessionError> + Send + Sync + 'static,
    {
        self.slots.insert(
            site.into(),
            Slot {
                factory: Box::new(factory),
                session: OnceFill::new(),
            },
        );
    }

    /// Registers an already built session for its own site.
    pub fn register_session(&mut self, session: Arc<dyn Session>) {
        let site = session.site().to_string();
        self.register(site, move || Ok(Arc::clone(&session)));
    }

    /// The shared session for `site`, initializing it on first use.
    pub fn session(&self, site: &str) -> Result<Arc<dyn Session>, SessionError> {
        let slot = self
            .slots
            .get(site)
            .ok_or_else(|| SessionError::Unconfigured(site.to_string()))?;
        let session = slot.session.get_or_try_fill(|| {
            tracing::debug!(site, "initializing session");
            let session = (slot.factory)();
            if let Err(e) = &session {
                tracing::warn!(site, error = %e, "session initialization failed");
            }
            session
        })?;
        Ok(Arc::clone(session))
    }

    /// Fetches `url` through `site`'s session without caching.
    pub fn fetch(&self, site: &str, url: &str) -> Result<Fetched, SessionError> {
        self.session(site)?.fetch(url)
    }

    /// Fetches `url` through `site`'s session once; later calls for the same
    /// (site, url) return the stored response. Failures are not stored.
    pub fn fetch_cached(&self, site: &str, url: &str) -> Result<Fetched, SessionError> {
        let key = (site.to_string(), url.to_string());
        self.responses.get_or_try_fill(&key, || self.fetch(site, url))
    }

    /// True once `site`'s session has been created.
    pub fn is_initialized(&self, site: &str) -> bool {
        self.slots
            .get(site)
            .is_some_and(|slot| slot.session.get().is_some())
    }

    /// Registered site names, sorted.
    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        sites.sort_unstable();
        sites
    }
}
