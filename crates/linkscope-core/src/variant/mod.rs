//! Typed URL model.
//!
//! A [`UrlVariant`] is the classified form of a URL: which site owns it, what
//! kind of thing it points at, and the identity fields that pick out that
//! thing. Two variants are equal when site, kind and identity are equal;
//! the canonical URL is rendered from identity alone, so equal variants
//! normalize identically.
//!
//! Relationship accessors and the liveness probe may hit the network. Each
//! resolves at most once per instance (clones share the cached result).

mod normalize;
mod relations;

pub use normalize::{encode_path, render_template, Normalizer};
pub use relations::{RawRelations, Relations};

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::context::Context;
use crate::memo::OnceFill;
use crate::session::{Fetched, SessionError};

/// Closed set of things a URL can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantKind {
    /// A creator profile.
    Artist,
    /// A single post (which may hold several assets).
    Post,
    /// A media file belonging to a post.
    PostAsset,
    /// A media file belonging to a gallery.
    GalleryAsset,
    /// A gallery or info page grouping assets.
    Gallery,
    /// A short link or redirector whose target is only known after a fetch.
    Redirect,
    /// Recognized but deliberately not handled.
    Unsupported,
    /// Recognized and worthless (home pages, static chrome).
    Useless,
    /// A domain that no longer serves anything.
    DeadDomain,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Artist => "artist",
            VariantKind::Post => "post",
            VariantKind::PostAsset => "post_asset",
            VariantKind::GalleryAsset => "gallery_asset",
            VariantKind::Gallery => "gallery",
            VariantKind::Redirect => "redirect",
            VariantKind::Unsupported => "unsupported",
            VariantKind::Useless => "useless",
            VariantKind::DeadDomain => "dead_domain",
        }
    }

    pub fn is_asset(self) -> bool {
        matches!(self, VariantKind::PostAsset | VariantKind::GalleryAsset)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity fields (name → decoded value), keyed by name so capture order
/// never affects equality or hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Identity(BTreeMap<&'static str, String>);

impl Identity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing an earlier value.
    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether a variant's target still exists.
#[derive(Debug, Clone, Copy)]
pub enum Liveness {
    /// Never deleted; answered without I/O.
    Alive,
    /// Always deleted (dead domains); answered without I/O.
    Defunct,
    /// Fetch the canonical URL through the site session and ask the predicate
    /// whether the response means "deleted". A not-found response counts as
    /// deleted without consulting the predicate.
    Probe(fn(&Fetched) -> bool),
}

/// Fetches the raw relations of a variant through its site's session.
pub type Resolver = fn(&UrlVariant, &Context) -> Result<RawRelations, SessionError>;

/// Site-supplied behavior attached to a variant when it is built.
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    pub normalizer: Normalizer,
    pub liveness: Liveness,
    pub resolver: Option<Resolver>,
}

impl Behavior {
    pub fn template(template: &'static str) -> Self {
        Self {
            normalizer: Normalizer::Template(template),
            liveness: Liveness::Alive,
            resolver: None,
        }
    }
}

#[derive(Default)]
struct LazyState {
    relations: OnceFill<Relations>,
    deleted: OnceFill<bool>,
}

/// A classified URL.
#[derive(Clone)]
pub struct UrlVariant {
    site: &'static str,
    kind: VariantKind,
    identity: Identity,
    behavior: Behavior,
    lazy: Arc<LazyState>,
}

impl UrlVariant {
    pub fn new(site: &'static str, kind: VariantKind, identity: Identity, behavior: Behavior) -> Self {
        Self {
            site,
            kind,
            identity,
            behavior,
            lazy: Arc::new(LazyState::default()),
        }
    }

    pub fn site(&self) -> &'static str {
        self.site
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Identity field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.identity.get(name)
    }

    /// Canonical, fully qualified URL. A pure function of identity.
    pub fn normalize(&self) -> String {
        self.behavior.normalizer.render(self)
    }

    /// The liveness rule, without performing any I/O.
    pub fn deletion_rule(&self) -> Liveness {
        self.behavior.liveness
    }

    /// Resolves (once) and returns this variant's relations.
    ///
    /// Variants without a resolver yield empty relations without I/O. A
    /// failed resolution is returned to the caller and not cached.
    pub fn relations(&self, ctx: &Context) -> Result<&Relations, SessionError> {
        self.lazy
            .relations
            .get_or_try_fill(|| relations::resolve(self, ctx))
    }

    /// Relations if they were already resolved.
    pub fn cached_relations(&self) -> Option<&Relations> {
        self.lazy.relations.get()
    }

    pub fn primary_names(&self, ctx: &Context) -> Result<&[String], SessionError> {
        Ok(&self.relations(ctx)?.primary_names)
    }

    pub fn secondary_names(&self, ctx: &Context) -> Result<&[String], SessionError> {
        Ok(&self.relations(ctx)?.secondary_names)
    }

    pub fn related(&self, ctx: &Context) -> Result<&[UrlVariant], SessionError> {
        Ok(&self.relations(ctx)?.related)
    }

    /// Whether the target is gone. Static rules answer without I/O; probes
    /// fetch once and cache the answer.
    pub fn is_deleted(&self, ctx: &Context) -> Result<bool, SessionError> {
        let predicate = match self.behavior.liveness {
            Liveness::Alive => return Ok(false),
            Liveness::Defunct => return Ok(true),
            Liveness::Probe(predicate) => predicate,
        };
        let deleted = self.lazy.deleted.get_or_try_fill(|| {
            let url = self.normalize();
            match ctx.sessions().fetch_cached(self.site, &url) {
                Ok(fetched) => Ok(predicate(&fetched)),
                Err(SessionError::NotFound { .. }) => Ok(true),
                Err(e) => Err(e),
            }
        })?;
        Ok(*deleted)
    }
}

impl PartialEq for UrlVariant {
    fn eq(&self, other: &Self) -> bool {
        self.site == other.site && self.kind == other.kind && self.identity == other.identity
    }
}

impl Eq for UrlVariant {}

impl Hash for UrlVariant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.site.hash(state);
        self.kind.hash(state);
        self.identity.hash(state);
    }
}

impl fmt::Debug for UrlVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlVariant")
            .field("site", &self.site)
            .field("kind", &self.kind)
            .field("identity", &self.identity)
            .finish()
    }
}

impl fmt::Display for UrlVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn artist(site: &'static str, id: &str) -> UrlVariant {
        UrlVariant::new(
            site,
            VariantKind::Artist,
            Identity::new().with("id", id),
            Behavior::template("https://example.com/users/{id}"),
        )
    }

    #[test]
    fn identity_push_replaces_value() {
        let mut id = Identity::new().with("a", "1").with("b", "2");
        id.push("a", "3");
        let fields: Vec<_> = id.iter().collect();
        assert_eq!(fields, vec![("a", "3"), ("b", "2")]);
        assert_eq!(id.remove("a").as_deref(), Some("3"));
        assert_eq!(id.len(), 1);
    }

    #[test]
    fn equality_is_site_kind_identity() {
        let a = artist("alpha", "7");
        let b = artist("alpha", "7");
        assert_eq!(a, b);
        assert_ne!(a, artist("beta", "7"));
        assert_ne!(a, artist("alpha", "8"));

        let set: HashSet<UrlVariant> = [a.clone(), b, artist("alpha", "8")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn normalize_renders_template_and_display() {
        let a = artist("alpha", "a b");
        assert_eq!(a.normalize(), "https://example.com/users/a%20b");
        assert_eq!(a.to_string(), a.normalize());
    }

    #[test]
    fn custom_normalizer() {
        fn upper(v: &UrlVariant) -> String {
            format!("https://example.com/{}", v.field("id").unwrap_or("").to_uppercase())
        }
        let v = UrlVariant::new(
            "alpha",
            VariantKind::Post,
            Identity::new().with("id", "abc"),
            Behavior {
                normalizer: Normalizer::Custom(upper),
                ..Behavior::template("")
            },
        );
        assert_eq!(v.normalize(), "https://example.com/ABC");
    }

    #[test]
    fn kind_helpers() {
        assert!(VariantKind::PostAsset.is_asset());
        assert!(VariantKind::GalleryAsset.is_asset());
        assert!(!VariantKind::Post.is_asset());
        assert_eq!(VariantKind::DeadDomain.to_string(), "dead_domain");
    }
}
