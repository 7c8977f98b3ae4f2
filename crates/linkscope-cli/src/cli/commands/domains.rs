//! `linkscope domains` – list registered domains.

use anyhow::Result;
use linkscope_core::sites;

pub fn run_domains() -> Result<()> {
    let dispatcher = sites::builtin_dispatcher()?;
    println!("{:<20} {}", "DOMAIN", "ADAPTER");
    for (domain, adapters) in dispatcher.domains() {
        println!("{:<20} {}", domain, adapters.join(", "));
    }
    Ok(())
}
