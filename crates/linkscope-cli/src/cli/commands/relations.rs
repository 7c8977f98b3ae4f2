//! `linkscope relations <url>` – resolve names and related URLs over the network.

use anyhow::{bail, Context as _, Result};
use linkscope_core::config::LinkscopeConfig;
use linkscope_core::{Classification, Context};

pub async fn run_relations(cfg: &LinkscopeConfig, url: &str, liveness: bool) -> Result<()> {
    let ctx = Context::builtin(cfg)?;
    let variant = match ctx.classify(url)? {
        Classification::Variant(v) => v,
        Classification::Unparsable { site, reason } => {
            bail!("{url} is a {site} page with no identity ({reason})")
        }
        Classification::Unknown { domain } => bail!("no adapter handles {domain}"),
    };

    println!("{} {} {}", variant.site(), variant.kind(), variant.normalize());

    // Resolution blocks on curl.
    let report = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
        let relations = variant.relations(&ctx)?;
        let mut lines = Vec::new();
        for name in &relations.primary_names {
            lines.push(format!("name       {name}"));
        }
        for name in &relations.secondary_names {
            lines.push(format!("alias      {name}"));
        }
        for related in &relations.related {
            lines.push(format!("related    {} {}", related.kind(), related.normalize()));
        }
        if liveness {
            let deleted = variant.is_deleted(&ctx)?;
            lines.push(format!("deleted    {deleted}"));
        }
        Ok(lines)
    })
    .await
    .context("relation lookup task failed")??;

    for line in report {
        println!("{line}");
    }
    Ok(())
}
