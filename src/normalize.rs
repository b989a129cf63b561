/// Canonicalizes a raw domain string (bare host, URL, wildcard pattern) into
/// a bare lowercase hostname.
///
/// Step order matters: trim → strip a lowercase `http://`/`https://` scheme →
/// strip leading `*.`/`*`/`www.` runs → truncate at the first `/`, `:`, `?`
/// and `#` → drop a single trailing dot → lowercase.
///
/// Known limitation, kept for compatibility with existing artifacts: the
/// scheme match is case-sensitive and the colon truncation runs afterwards,
/// so `HTTPS://host` collapses to `https` and `user:pass@host` to `user`.
pub fn clean_domain(raw: &str) -> String {
    let mut s = raw.trim();

    s = s
        .strip_prefix("http://")
        .or_else(|| s.strip_prefix("https://"))
        .unwrap_or(s);

    loop {
        if let Some(rest) = s.strip_prefix("*.") {
            s = rest;
        } else if let Some(rest) = s.strip_prefix("www.") {
            s = rest;
        } else if let Some(rest) = s.strip_prefix('*') {
            s = rest;
        } else {
            break;
        }
    }

    for sep in ['/', ':', '?', '#'] {
        if let Some(idx) = s.find(sep) {
            s = &s[..idx];
        }
    }

    s = s.strip_suffix('.').unwrap_or(s);

    s.trim().to_lowercase()
}
