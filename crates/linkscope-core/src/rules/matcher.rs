//! Host, segment and value matchers used by [`Rule`](super::Rule).

use crate::decompose::DecomposedUrl;
use crate::variant::Identity;

/// Which hosts under the adapter's domain a rule accepts.
#[derive(Debug, Clone, Copy)]
pub enum HostMatch {
    /// Any subdomain, including none.
    Any,
    /// One of these subdomains; `""` stands for the bare domain.
    Exact(&'static [&'static str]),
    /// Any non-empty subdomain, captured into the named field.
    Capture(&'static str),
}

impl HostMatch {
    pub(super) fn test(&self, url: &DecomposedUrl, identity: &mut Identity) -> bool {
        match self {
            HostMatch::Any => true,
            HostMatch::Exact(subs) => subs.iter().any(|s| *s == url.subdomain),
            HostMatch::Capture(field) => {
                if url.subdomain.is_empty() {
                    return false;
                }
                identity.push(*field, url.subdomain.as_str());
                true
            }
        }
    }
}

/// Predicate over a decoded segment or parameter value.
#[derive(Debug, Clone, Copy)]
pub enum Pred {
    /// Any non-empty value.
    Any,
    /// One or more ASCII digits.
    Digits,
    /// One of these values, compared case-insensitively.
    OneOf(&'static [&'static str]),
    Fn(fn(&str) -> bool),
}

impl Pred {
    pub fn test(&self, value: &str) -> bool {
        match self {
            Pred::Any => !value.is_empty(),
            Pred::Digits => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            Pred::OneOf(options) => options.iter().any(|o| o.eq_ignore_ascii_case(value)),
            Pred::Fn(f) => f(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SegKind {
    Lit(&'static str),
    Cap(&'static str, Pred),
    Wild(Pred),
}

/// One path segment of a rule.
#[derive(Debug, Clone, Copy)]
pub struct Seg {
    kind: SegKind,
    transform: Option<fn(&str) -> String>,
}

impl Seg {
    const fn of(kind: SegKind) -> Self {
        Self {
            kind,
            transform: None,
        }
    }

    /// Applies `f` to a captured value before it is stored.
    pub fn map(mut self, f: fn(&str) -> String) -> Self {
        self.transform = Some(f);
        self
    }

    pub(super) fn test(&self, segment: &str, identity: &mut Identity) -> bool {
        match self.kind {
            SegKind::Lit(lit) => lit.eq_ignore_ascii_case(segment),
            SegKind::Wild(pred) => pred.test(segment),
            SegKind::Cap(field, pred) => {
                if !pred.test(segment) {
                    return false;
                }
                let value = match self.transform {
                    Some(f) => f(segment),
                    None => segment.to_string(),
                };
                identity.push(field, value);
                true
            }
        }
    }
}

/// Literal segment, compared case-insensitively.
pub const fn lit(text: &'static str) -> Seg {
    Seg::of(SegKind::Lit(text))
}

/// Captures any non-empty segment.
pub const fn cap(field: &'static str) -> Seg {
    Seg::of(SegKind::Cap(field, Pred::Any))
}

/// Captures an all-digit segment.
pub const fn digits(field: &'static str) -> Seg {
    Seg::of(SegKind::Cap(field, Pred::Digits))
}

/// Captures a segment accepted by `pred`.
pub const fn cap_if(field: &'static str, pred: Pred) -> Seg {
    Seg::of(SegKind::Cap(field, pred))
}

/// Accepts one of `options` without capturing it.
pub const fn any_of(options: &'static [&'static str]) -> Seg {
    Seg::of(SegKind::Wild(Pred::OneOf(options)))
}

/// Accepts any non-empty segment without capturing it.
pub const fn any() -> Seg {
    Seg::of(SegKind::Wild(Pred::Any))
}

/// Lower-cases a captured value.
pub fn lowercase(value: &str) -> String {
    value.to_lowercase()
}
