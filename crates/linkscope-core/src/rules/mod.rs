//! Declarative per-site rule tables.
//!
//! A [`RuleAdapter`] owns a site's domains and an ordered list of [`Rule`]s.
//! Rules are evaluated top to bottom and the first match wins, so more
//! specific rows go first (e.g. `member_illust.php?illust_id=` before
//! `member.php?id=`).

mod matcher;
mod rule;

pub use matcher::{any, any_of, cap, cap_if, digits, lit, lowercase, HostMatch, Pred, Seg};
pub use rule::Rule;

use crate::decompose::DecomposedUrl;
use crate::dispatch::{MatchOutcome, SiteAdapter};

/// A [`SiteAdapter`] driven by a rule table.
#[derive(Debug, Clone)]
pub struct RuleAdapter {
    name: &'static str,
    domains: Vec<&'static str>,
    rules: Vec<Rule>,
}

impl RuleAdapter {
    pub fn new(name: &'static str, domains: &[&'static str]) -> Self {
        Self {
            name,
            domains: domains.to_vec(),
            rules: Vec::new(),
        }
    }

    /// Appends a rule; it is tried after every rule added before it.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl SiteAdapter for RuleAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn domains(&self) -> Vec<&'static str> {
        self.domains.clone()
    }

    fn match_url(&self, url: &DecomposedUrl) -> MatchOutcome {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(self.name, url))
            .unwrap_or(MatchOutcome::NoMatch)
    }
}
