//! Canonical URL rendering from identity fields.

use super::{Identity, UrlVariant};

/// How a variant renders its canonical URL.
#[derive(Debug, Clone, Copy)]
pub enum Normalizer {
    /// A fully qualified URL template. `{field}` is replaced by the
    /// percent-encoded identity field, `{+field}` by the raw value (for
    /// fields that already hold an encoded path or host).
    Template(&'static str),
    /// Site logic for canonical forms that a template cannot express. Must be
    /// a pure function of the variant's identity.
    Custom(fn(&UrlVariant) -> String),
}

impl Normalizer {
    pub(super) fn render(&self, variant: &UrlVariant) -> String {
        match self {
            Normalizer::Template(template) => render_template(template, variant.identity()),
            Normalizer::Custom(f) => f(variant),
        }
    }
}

/// Expands `{field}` / `{+field}` placeholders in `template`.
///
/// A placeholder naming a missing field expands to nothing and is logged;
/// rule tables are expected to capture every field their template names.
pub fn render_template(template: &str, identity: &Identity) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let placeholder = &after[..close];
        let (verbatim, name) = match placeholder.strip_prefix('+') {
            Some(name) => (true, name),
            None => (false, placeholder),
        };
        match identity.get(name) {
            Some(value) if verbatim => out.push_str(value),
            Some(value) => out.push_str(&urlencoding::encode(value)),
            None => {
                tracing::warn!(template, field = name, "template names a field the identity lacks");
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Percent-encodes each segment of a decoded path and joins them with `/`.
/// The result is suitable for a `{+field}` placeholder.
pub fn encode_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| urlencoding::encode(s.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
