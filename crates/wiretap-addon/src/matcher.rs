//! URL and method matching for mock rules.

use crate::rules::UrlPatternType;
use regex::Regex;

/// Match a full URL against a rule pattern.
///
/// - `Exact`: byte-for-byte equality.
/// - `Wildcard`: shell-glob semantics over the whole URL (`*` matches any
///   run of characters including none, `?` matches exactly one).
/// - `Regex`: unanchored search; an invalid pattern is a non-match, never an
///   error — rule evaluation must continue past it.
/// - `Unknown`: non-match.
pub fn matches_url(pattern: &str, pattern_type: UrlPatternType, url: &str) -> bool {
    match pattern_type {
        UrlPatternType::Exact => url == pattern,
        UrlPatternType::Wildcard => wildcard_match(pattern, url),
        UrlPatternType::Regex => Regex::new(pattern)
            .map(|re| re.is_match(url))
            .unwrap_or(false),
        UrlPatternType::Unknown => false,
    }
}

/// Match the rule's method against the request method. The literal token
/// `"ANY"` matches everything; otherwise comparison ignores ASCII case.
pub fn matches_method(rule_method: &str, request_method: &str) -> bool {
    rule_method == "ANY" || rule_method.eq_ignore_ascii_case(request_method)
}

/// Anchored glob match with `*` and `?`, iterative two-pointer with
/// backtracking to the last `*`.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut star_t = 0usize;

    while t < txt.len() {
        if p < pat.len() && (pat[p] == '?' || pat[p] == txt[t]) {
            p += 1;
            t += 1;
        } else if p < pat.len() && pat[p] == '*' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(s) = star {
            // Retry: let the last * consume one more character.
            p = s + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}
