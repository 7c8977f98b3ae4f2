//! Shared handles passed to relation resolvers and probes.

use std::sync::Arc;

use anyhow::Result;

use crate::config::LinkscopeConfig;
use crate::dispatch::{Classification, ClassifyError, Dispatcher};
use crate::session::SessionRegistry;
use crate::sites;

/// Dispatcher plus session registry. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Context {
    dispatcher: Arc<Dispatcher>,
    sessions: Arc<SessionRegistry>,
}

impl Context {
    pub fn new(dispatcher: Dispatcher, sessions: SessionRegistry) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            sessions: Arc::new(sessions),
        }
    }

    /// The built-in site adapters with curl sessions configured from `config`.
    pub fn builtin(config: &LinkscopeConfig) -> Result<Self> {
        let dispatcher = sites::builtin_dispatcher()?;
        let mut sessions = SessionRegistry::new();
        sites::register_sessions(&mut sessions, config);
        Ok(Self::new(dispatcher, sessions))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn classify(&self, raw: &str) -> Result<Classification, ClassifyError> {
        self.dispatcher.classify(raw)
    }
}
