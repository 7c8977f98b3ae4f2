//! `linkscope classify <url>...` – classify each URL independently.

use anyhow::Result;
use linkscope_core::sites;
use linkscope_core::Classification;
use serde_json::json;

pub fn run_classify(urls: &[String], as_json: bool) -> Result<()> {
    let dispatcher = sites::builtin_dispatcher()?;
    let mut failed = 0usize;

    for (raw, result) in dispatcher.classify_all(urls) {
        let row = match &result {
            Ok(Classification::Variant(v)) => json!({
                "url": raw,
                "status": "variant",
                "site": v.site(),
                "kind": v.kind().as_str(),
                "normalized": v.normalize(),
            }),
            Ok(Classification::Unparsable { site, reason }) => json!({
                "url": raw,
                "status": "unparsable",
                "site": site,
                "reason": reason,
            }),
            Ok(Classification::Unknown { domain }) => json!({
                "url": raw,
                "status": "unknown",
                "domain": domain,
            }),
            Err(e) => {
                failed += 1;
                json!({"url": raw, "status": "rejected", "error": e.to_string()})
            }
        };

        if as_json {
            println!("{row}");
            continue;
        }
        match result {
            Ok(Classification::Variant(v)) => {
                println!("{:<10} {:<12} {}", v.site(), v.kind().as_str(), v.normalize())
            }
            Ok(Classification::Unparsable { site, reason }) => {
                println!("{:<10} {:<12} {} ({})", site, "unparsable", raw, reason)
            }
            Ok(Classification::Unknown { domain }) => {
                println!("{:<10} {:<12} {} (no adapter for {})", "-", "unknown", raw, domain)
            }
            Err(e) => println!("{:<10} {:<12} {} ({})", "-", "rejected", raw, e),
        }
    }

    if failed > 0 {
        tracing::info!(failed, total = urls.len(), "some URLs were rejected");
    }
    Ok(())
}
