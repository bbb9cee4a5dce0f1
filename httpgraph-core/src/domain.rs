//! Hostname to registrable-domain classification.

/// Two-label public suffixes under which registrations happen one level
/// deeper, e.g. `example.co.uk`.
const MULTI_LABEL_SUFFIXES: [&str; 32] = [
    "co.uk", "com.au", "co.jp", "co.nz", "com.br", "co.kr", "co.in", "com.mx", "com.cn", "org.uk",
    "net.au", "ac.uk", "gov.uk", "com.sg", "com.hk", "co.za", "com.tw", "com.ar", "com.tr",
    "com.ua", "com.pk", "co.id", "com.my", "com.ng", "com.eg", "com.ph", "com.vn", "com.co",
    "com.pe", "co.th", "or.jp", "ne.jp",
];

/// Reduce a hostname to its registrable domain, suffixed with `.` so a domain
/// id can never collide with a host id of the same spelling.
///
/// This is a heuristic, not the Public Suffix List: only the curated
/// [`MULTI_LABEL_SUFFIXES`] are recognised, so hosts under other multi-label
/// suffixes (`city.kawasaki.jp`, `blogspot.com` style private suffixes) are
/// grouped under the last two labels.
///
/// ```
/// use httpgraph_core::domain::parse_domain;
/// assert_eq!(parse_domain("a.example.com"), "example.com.");
/// assert_eq!(parse_domain("www.bbc.co.uk"), "bbc.co.uk.");
/// assert_eq!(parse_domain("10.0.0.1"), "10.0.0.1.");
/// ```
pub fn parse_domain(hostname: &str) -> String {
    if is_ipv4_literal(hostname) {
        return format!("{}.", hostname);
    }

    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() <= 2 {
        return format!("{}.", hostname);
    }

    let last_two = labels[labels.len() - 2..].join(".");
    if MULTI_LABEL_SUFFIXES.contains(&last_two.as_str()) {
        return format!("{}.", labels[labels.len() - 3..].join("."));
    }

    format!("{}.", last_two)
}

fn is_ipv4_literal(hostname: &str) -> bool {
    let octets: Vec<&str> = hostname.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_detection_requires_four_numeric_octets() {
        assert!(is_ipv4_literal("192.168.1.20"));
        assert!(!is_ipv4_literal("192.168.1"));
        assert!(!is_ipv4_literal("192.168.1.x"));
        assert!(!is_ipv4_literal("1..2.3"));
    }
}
