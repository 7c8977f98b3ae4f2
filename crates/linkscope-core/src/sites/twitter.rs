//! Twitter / X: profiles, statuses and pbs.twimg.com media.

use crate::rules::{
    any, any_of, cap_if, digits, lit, lowercase, HostMatch, Pred, Rule, RuleAdapter, Seg,
};
use crate::variant::{Identity, UrlVariant, VariantKind};

pub const SITE: &str = "twitter";

/// Web hosts. Rules using this are not tied to a domain so that aliases
/// (`x.com`, mirrors) classify the same way; the media domain is excluded.
const WEB: HostMatch = HostMatch::Exact(&["", "www", "mobile", "m"]);
const NOT_WEB: &[&str] = &["twimg.com"];

/// Top-level paths that are app pages, not user handles.
const RESERVED: &[&str] = &[
    "home",
    "explore",
    "search",
    "notifications",
    "messages",
    "settings",
    "hashtag",
    "i",
    "intent",
    "share",
    "login",
    "signup",
    "logout",
    "tos",
    "privacy",
    "compose",
];

const PROFILE_TABS: &[&str] = &["media", "likes", "with_replies", "following", "followers"];

pub fn adapter() -> RuleAdapter {
    RuleAdapter::new(SITE, &["twitter.com", "twimg.com"])
        .rule(status().path([lit("i"), lit("web"), lit("status"), digits("id")]))
        .rule(
            status()
                .path([any(), any_of(&["status", "statuses"]), digits("id")])
                .trailing(),
        )
        .rule(
            profile()
                .path([lit("intent"), any_of(&["user", "follow"])])
                .capture_param("screen_name", "handle", Pred::Fn(is_handle))
                .derive(lowercase_handle),
        )
        .rule(
            Rule::unparsable("app page")
                .except_domains(NOT_WEB)
                .host(WEB)
                .path([any_of(RESERVED)])
                .trailing(),
        )
        .rule(profile().path([handle()]))
        .rule(profile().path([handle(), any_of(PROFILE_TABS)]))
        .rule(
            Rule::new(VariantKind::Useless, "https://twitter.com/")
                .except_domains(NOT_WEB)
                .host(WEB),
        )
        .rule(
            Rule::new(VariantKind::PostAsset, "https://pbs.twimg.com/media/{id}")
                .domain("twimg.com")
                .host(HostMatch::Exact(&["pbs"]))
                .path([lit("media"), cap_if("file", Pred::Any)])
                .capture_param_opt("format", "format", Pred::Fn(is_format))
                .derive(split_media_file)
                .custom(media_url),
        )
}

fn status() -> Rule {
    Rule::new(VariantKind::Post, "https://twitter.com/i/web/status/{id}")
        .except_domains(NOT_WEB)
        .host(WEB)
}

fn profile() -> Rule {
    Rule::new(VariantKind::Artist, "https://twitter.com/{handle}")
        .except_domains(NOT_WEB)
        .host(WEB)
}

fn handle() -> Seg {
    cap_if("handle", Pred::Fn(is_handle)).map(lowercase)
}

fn is_handle(s: &str) -> bool {
    (1..=15).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_format(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp")
}

fn lowercase_handle(identity: &mut Identity) -> bool {
    let Some(handle) = identity.get("handle").map(str::to_lowercase) else {
        return false;
    };
    identity.push("handle", handle);
    true
}

/// `media/{id}.{ext}` and `media/{id}?format={ext}` name the same image.
/// Replaces `file` with `id` plus an optional normalized `format`.
fn split_media_file(identity: &mut Identity) -> bool {
    let Some(file) = identity.remove("file") else {
        return false;
    };
    let param_format = identity.remove("format");
    let split = file
        .rsplit_once('.')
        .filter(|(_, ext)| is_format(ext))
        .map(|(id, ext)| (id.to_string(), ext.to_string()));
    let (id, ext) = match split {
        Some((id, ext)) => (id, Some(ext)),
        None => (file, None),
    };
    if id.is_empty() {
        return false;
    }
    let format = param_format.or(ext).map(|f| match f.to_ascii_lowercase().as_str() {
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    });
    let mut rebuilt = Identity::new().with("id", id);
    if let Some(format) = format {
        rebuilt.push("format", format);
    }
    *identity = rebuilt;
    true
}

fn media_url(variant: &UrlVariant) -> String {
    let id = urlencoding::encode(variant.field("id").unwrap_or_default());
    match variant.field("format") {
        Some(format) => format!("https://pbs.twimg.com/media/{id}?format={format}&name=orig"),
        None => format!("https://pbs.twimg.com/media/{id}?name=orig"),
    }
}
