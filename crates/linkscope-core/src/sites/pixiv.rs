//! pixiv: artists, artworks and original-size images on i.pximg.net.

use serde_json::Value;

use crate::context::Context;
use crate::rules::{any_of, cap_if, digits, lit, HostMatch, Pred, Rule, RuleAdapter};
use crate::session::{Fetched, SessionError};
use crate::variant::{Identity, RawRelations, UrlVariant, VariantKind};

pub const SITE: &str = "pixiv";

const WWW: HostMatch = HostMatch::Exact(&["", "www"]);
const LANGS: &[&str] = &["en", "ja", "ko", "zh", "zh-tw"];

const ARTIST: &str = "https://www.pixiv.net/users/{id}";
const ARTWORK: &str = "https://www.pixiv.net/artworks/{id}";

pub fn adapter() -> RuleAdapter {
    RuleAdapter::new(SITE, &["pixiv.net", "pixiv.me"])
        // pixiv.net/users/{id}, optionally language-prefixed
        .rule(artist().path([lit("users"), digits("id")]).trailing())
        .rule(artist().path([any_of(LANGS), lit("users"), digits("id")]).trailing())
        .rule(artwork().path([lit("artworks"), digits("id")]))
        .rule(artwork().path([any_of(LANGS), lit("artworks"), digits("id")]))
        // legacy php pages; illust_id must win over id on member_illust.php
        .rule(
            artwork()
                .path([lit("member_illust.php")])
                .capture_param("illust_id", "id", Pred::Digits),
        )
        .rule(
            artist()
                .path([lit("member_illust.php")])
                .capture_param("id", "id", Pred::Digits),
        )
        .rule(
            artist()
                .path([lit("member.php")])
                .capture_param("id", "id", Pred::Digits),
        )
        .rule(
            Rule::unparsable("listing page")
                .domain("pixiv.net")
                .host(WWW)
                .path([any_of(&["bookmark.php", "discovery", "ranking.php", "search.php", "tags"])])
                .trailing(),
        )
        .rule(
            Rule::new(VariantKind::Useless, "https://www.pixiv.net/")
                .domain("pixiv.net")
                .host(WWW),
        )
        .rule(
            Rule::new(VariantKind::Redirect, "https://pixiv.me/{handle}")
                .domain("pixiv.me")
                .host(HostMatch::Exact(&[""]))
                .path([cap_if("handle", Pred::Fn(is_handle))]),
        )
        .rule(
            Rule::new(VariantKind::PostAsset, "https://i.pximg.net/{+path}")
                .domain("pximg.net")
                .host(HostMatch::Exact(&["i"]))
                .path([any_of(&["img-original", "img-master"]), lit("img")])
                .trailing()
                .capture_path("path")
                .derive(asset_post_id)
                .resolver(asset_relations),
        )
}

fn artist() -> Rule {
    Rule::new(VariantKind::Artist, ARTIST)
        .domain("pixiv.net")
        .host(WWW)
        .resolver(artist_relations)
}

fn artwork() -> Rule {
    Rule::new(VariantKind::Post, ARTWORK)
        .domain("pixiv.net")
        .host(WWW)
        // only a 404 means deleted
        .probe(|_| false)
}

fn is_handle(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// `12345678_p0.png` / `12345678_p0_master1200.jpg` → post `12345678`, page `0`.
fn asset_post_id(identity: &mut Identity) -> bool {
    let Some(file) = identity.get("path").and_then(|p| p.rsplit('/').next()) else {
        return false;
    };
    let Some((post, rest)) = file.split_once("_p") else {
        return false;
    };
    let page: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if post.is_empty() || !post.bytes().all(|b| b.is_ascii_digit()) || page.is_empty() {
        return false;
    }
    let post = post.to_string();
    identity.push("post", post);
    identity.push("page", page);
    true
}

fn asset_relations(variant: &UrlVariant, _ctx: &Context) -> Result<RawRelations, SessionError> {
    let related_urls = variant
        .field("post")
        .map(|id| vec![format!("https://www.pixiv.net/artworks/{id}")])
        .unwrap_or_default();
    Ok(RawRelations {
        related_urls,
        ..RawRelations::default()
    })
}

fn artist_relations(variant: &UrlVariant, ctx: &Context) -> Result<RawRelations, SessionError> {
    let id = variant.field("id").unwrap_or_default();
    let url = format!("https://www.pixiv.net/ajax/user/{id}?full=1");
    let fetched = ctx.sessions().fetch_cached(SITE, &url)?;
    parse_user(&fetched)
}

/// Reads the `ajax/user` JSON: display name, webpage and social links.
pub(crate) fn parse_user(fetched: &Fetched) -> Result<RawRelations, SessionError> {
    let json = fetched.require_json()?;
    if json.get("error").and_then(Value::as_bool) == Some(true) {
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("error response")
            .to_string();
        return Err(SessionError::Decode {
            url: fetched.url.clone(),
            message,
        });
    }
    let Some(body) = json.get("body") else {
        return Ok(RawRelations::default());
    };

    let primary_names = body
        .get("name")
        .and_then(Value::as_str)
        .map(|n| vec![n.to_string()])
        .unwrap_or_default();

    let mut related_urls = Vec::new();
    if let Some(page) = body.get("webpage").and_then(Value::as_str) {
        related_urls.push(page.to_string());
    }
    if let Some(social) = body.get("social").and_then(Value::as_object) {
        for entry in social.values() {
            if let Some(url) = entry.get("url").and_then(Value::as_str) {
                related_urls.push(url.to_string());
            }
        }
    }

    Ok(RawRelations {
        primary_names,
        secondary_names: Vec::new(),
        related_urls,
    })
}
