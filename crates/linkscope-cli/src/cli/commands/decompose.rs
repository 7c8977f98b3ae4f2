//! `linkscope decompose <url>` – print the URL components.

use anyhow::Result;
use linkscope_core::decompose::decompose;

pub fn run_decompose(url: &str) -> Result<()> {
    let parts = decompose(url)?;
    println!("scheme     {}", parts.scheme);
    println!("hostname   {}", parts.hostname);
    println!("subdomain  {}", parts.subdomain);
    println!("domain     {}", parts.domain);
    println!("tld        {}", parts.tld);
    for (i, segment) in parts.path_segments.iter().enumerate() {
        println!("path[{i}]    {segment}");
    }
    for (key, value) in &parts.query {
        println!("query      {key} = {value}");
    }
    Ok(())
}
