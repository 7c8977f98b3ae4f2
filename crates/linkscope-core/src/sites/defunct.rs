//! Hosting services that shut down. Every URL on them is a dead link.

use crate::rules::{Rule, RuleAdapter};
use crate::variant::VariantKind;

pub const SITE: &str = "defunct";

pub fn adapter() -> RuleAdapter {
    RuleAdapter::new(SITE, &["geocities.com", "geocities.jp"]).rule(
        Rule::new(VariantKind::DeadDomain, "http://{+host}/{+path}")
            .trailing()
            .capture_host("host")
            .capture_path("path")
            .defunct(),
    )
}
