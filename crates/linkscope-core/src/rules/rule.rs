use super::matcher::{HostMatch, Pred, Seg};
use crate::decompose::DecomposedUrl;
use crate::dispatch::MatchOutcome;
use crate::session::Fetched;
use crate::variant::{
    encode_path, Behavior, Identity, Liveness, Normalizer, Resolver, UrlVariant, VariantKind,
};

#[derive(Debug, Clone, Copy)]
struct ParamRule {
    key: &'static str,
    pred: Pred,
    field: Option<&'static str>,
    required: bool,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Build(VariantKind),
    Unparsable(&'static str),
}

/// One row of a site's rule table.
///
/// Built with the chained constructors below and evaluated by
/// [`RuleAdapter`](super::RuleAdapter) top to bottom.
#[derive(Debug, Clone)]
pub struct Rule {
    domain: Option<&'static str>,
    excluded: &'static [&'static str],
    host: HostMatch,
    segments: Vec<Seg>,
    trailing: bool,
    params: Vec<ParamRule>,
    host_field: Option<&'static str>,
    path_field: Option<&'static str>,
    derive: Option<fn(&mut Identity) -> bool>,
    outcome: Outcome,
    behavior: Behavior,
}

impl Rule {
    fn with_outcome(outcome: Outcome, behavior: Behavior) -> Self {
        Self {
            domain: None,
            excluded: &[],
            host: HostMatch::Any,
            segments: Vec::new(),
            trailing: false,
            params: Vec::new(),
            host_field: None,
            path_field: None,
            derive: None,
            outcome,
            behavior,
        }
    }

    /// A rule producing a `kind` variant normalized through `template`.
    pub fn new(kind: VariantKind, template: &'static str) -> Self {
        Self::with_outcome(Outcome::Build(kind), Behavior::template(template))
    }

    /// A rule declaring matching URLs unparsable for `reason`.
    pub fn unparsable(reason: &'static str) -> Self {
        Self::with_outcome(Outcome::Unparsable(reason), Behavior::template(""))
    }

    /// Only match URLs on this registrable domain (for adapters that own
    /// several domains).
    pub fn domain(mut self, domain: &'static str) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Never match URLs on these registrable domains. Lets a rule stay open
    /// to aliases while skipping another domain the adapter owns.
    pub fn except_domains(mut self, domains: &'static [&'static str]) -> Self {
        self.excluded = domains;
        self
    }

    pub fn host(mut self, host: HostMatch) -> Self {
        self.host = host;
        self
    }

    /// Path segments, matched exactly (see [`Rule::trailing`]).
    pub fn path<I: IntoIterator<Item = Seg>>(mut self, segments: I) -> Self {
        self.segments = segments.into_iter().collect();
        self
    }

    /// Accept extra segments after the listed ones.
    pub fn trailing(mut self) -> Self {
        self.trailing = true;
        self
    }

    /// Require query parameter `key` accepted by `pred`.
    pub fn param(mut self, key: &'static str, pred: Pred) -> Self {
        self.params.push(ParamRule {
            key,
            pred,
            field: None,
            required: true,
        });
        self
    }

    /// Require query parameter `key` and capture it into `field`.
    pub fn capture_param(mut self, key: &'static str, field: &'static str, pred: Pred) -> Self {
        self.params.push(ParamRule {
            key,
            pred,
            field: Some(field),
            required: true,
        });
        self
    }

    /// Capture `key` into `field` when present and accepted by `pred`;
    /// its absence does not prevent the match.
    pub fn capture_param_opt(mut self, key: &'static str, field: &'static str, pred: Pred) -> Self {
        self.params.push(ParamRule {
            key,
            pred,
            field: Some(field),
            required: false,
        });
        self
    }

    /// Capture the full hostname into `field`.
    pub fn capture_host(mut self, field: &'static str) -> Self {
        self.host_field = Some(field);
        self
    }

    /// Capture the whole path, segments re-encoded and joined by `/`, into
    /// `field` (for use in a `{+field}` placeholder).
    pub fn capture_path(mut self, field: &'static str) -> Self {
        self.path_field = Some(field);
        self
    }

    /// Post-process captured fields. Returning `false` rejects the match.
    pub fn derive(mut self, f: fn(&mut Identity) -> bool) -> Self {
        self.derive = Some(f);
        self
    }

    pub fn custom(mut self, f: fn(&UrlVariant) -> String) -> Self {
        self.behavior.normalizer = Normalizer::Custom(f);
        self
    }

    /// Variants built by this rule are always deleted.
    pub fn defunct(mut self) -> Self {
        self.behavior.liveness = Liveness::Defunct;
        self
    }

    /// Variants built by this rule are probed; `deleted` inspects the response.
    pub fn probe(mut self, deleted: fn(&Fetched) -> bool) -> Self {
        self.behavior.liveness = Liveness::Probe(deleted);
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.behavior.resolver = Some(resolver);
        self
    }

    /// Evaluates this rule against `url`; `None` when it does not match.
    pub fn apply(&self, site: &'static str, url: &DecomposedUrl) -> Option<MatchOutcome> {
        if self.domain.is_some_and(|d| d != url.domain)
            || self.excluded.contains(&url.domain.as_str())
        {
            return None;
        }
        let mut identity = Identity::new();
        if !self.host.test(url, &mut identity) {
            return None;
        }

        let n = self.segments.len();
        let count_ok = if self.trailing {
            url.path_segments.len() >= n
        } else {
            url.path_segments.len() == n
        };
        if !count_ok {
            return None;
        }
        for (seg, value) in self.segments.iter().zip(&url.path_segments) {
            if !seg.test(value, &mut identity) {
                return None;
            }
        }

        for p in &self.params {
            match url.param(p.key) {
                Some(value) if p.pred.test(value) => {
                    if let Some(field) = p.field {
                        identity.push(field, value);
                    }
                }
                _ if p.required => return None,
                // optional: a missing or unusable value is ignored
                _ => {}
            }
        }

        let kind = match self.outcome {
            Outcome::Unparsable(reason) => return Some(MatchOutcome::Unparsable(reason.to_string())),
            Outcome::Build(kind) => kind,
        };

        if let Some(field) = self.host_field {
            identity.push(field, url.hostname.as_str());
        }
        if let Some(field) = self.path_field {
            identity.push(field, encode_path(&url.path_segments));
        }
        if let Some(derive) = self.derive {
            if !derive(&mut identity) {
                return None;
            }
        }

        Some(MatchOutcome::Variant(UrlVariant::new(
            site,
            kind,
            identity,
            self.behavior,
        )))
    }
}
