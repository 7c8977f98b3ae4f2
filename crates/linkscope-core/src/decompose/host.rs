//! Hostname splitting into subdomain / registrable domain / tld.

/// Labels of a hostname split by the "last two labels" heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct HostParts {
    pub hostname: String,
    pub subdomain: String,
    pub domain: String,
    pub tld: String,
}

/// Strips userinfo and port from an authority, lower-cases it, and splits
/// it into labels.
///
/// The last two labels form the registrable domain; everything before them
/// is the subdomain. Multi-label public suffixes such as `co.uk` are not
/// special-cased: `www.example.co.uk` yields subdomain `www.example` and
/// domain `co.uk`. Site adapters are written against this split.
///
/// Returns `None` for fewer than two labels or an empty label.
pub(super) fn split_host(authority: &str) -> Option<HostParts> {
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return None;
    }

    let n = labels.len();
    let tld = labels[n - 1].to_string();
    let domain = format!("{}.{}", labels[n - 2], labels[n - 1]);
    let subdomain = labels[..n - 2].join(".");

    Some(HostParts {
        hostname: host,
        subdomain,
        domain,
        tld,
    })
}
