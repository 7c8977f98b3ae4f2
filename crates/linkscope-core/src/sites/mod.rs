//! Built-in site adapters.
//!
//! Each site is a [`RuleAdapter`](crate::rules::RuleAdapter) table. New sites
//! add a module here and a line in [`builtin_dispatcher`].

pub mod defunct;
pub mod pixiv;
pub mod twitter;

use std::sync::Arc;

use anyhow::Result;

use crate::config::LinkscopeConfig;
use crate::dispatch::Dispatcher;
use crate::session::{HttpSession, Session, SessionRegistry};

/// Dispatcher with every built-in adapter and its domain aliases.
pub fn builtin_dispatcher() -> Result<Dispatcher> {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(pixiv::adapter());
    dispatcher.register(twitter::adapter());
    dispatcher.register(defunct::adapter());

    dispatcher.alias("pximg.net", pixiv::SITE)?;
    dispatcher.alias("x.com", twitter::SITE)?;
    dispatcher.alias("fxtwitter.com", twitter::SITE)?;
    dispatcher.alias("vxtwitter.com", twitter::SITE)?;
    Ok(dispatcher)
}

/// Registers anonymous curl sessions for the sites that resolve relations
/// or probe liveness over HTTP.
pub fn register_sessions(registry: &mut SessionRegistry, config: &LinkscopeConfig) {
    let cfg = config.clone();
    registry.register(pixiv::SITE, move || {
        let session = HttpSession::new(pixiv::SITE, &cfg).with_header("Referer", "https://www.pixiv.net/");
        Ok(Arc::new(session) as Arc<dyn Session>)
    });
    let cfg = config.clone();
    registry.register(twitter::SITE, move || {
        Ok(Arc::new(HttpSession::new(twitter::SITE, &cfg)) as Arc<dyn Session>)
    });
}
