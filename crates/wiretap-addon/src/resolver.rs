//! First-match-wins rule selection.

use crate::matcher::{matches_method, matches_url};
use crate::rules::MockRule;

/// Walk the rule set in stored order and return the first enabled rule whose
/// URL pattern and method both match. No scoring, no priorities: given the
/// same rule sequence and request, the result is deterministic.
pub fn find_matching_rule<'a>(
    rules: &'a [MockRule],
    url: &str,
    method: &str,
) -> Option<&'a MockRule> {
    rules.iter().find(|rule| {
        rule.enabled
            && matches_url(&rule.url_pattern, rule.url_pattern_type, url)
            && matches_method(&rule.method, method)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(json: &str) -> MockRule {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            rule(r#"{"id": "r1", "urlPattern": "*/api/*", "statusCode": 201}"#),
            rule(r#"{"id": "r2", "urlPattern": "*/api/users*", "statusCode": 404}"#),
        ];

        let matched = find_matching_rule(&rules, "http://x/api/users/1", "GET").unwrap();
        assert_eq!(matched.id, "r1");
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let rules = vec![
            rule(r#"{"id": "r1", "enabled": false, "urlPattern": "*"}"#),
            rule(r#"{"id": "r2", "urlPattern": "*"}"#),
        ];

        let matched = find_matching_rule(&rules, "http://x/anything", "GET").unwrap();
        assert_eq!(matched.id, "r2");
    }

    #[test]
    fn test_method_narrows_selection() {
        let rules = vec![
            rule(r#"{"id": "r1", "urlPattern": "*", "method": "POST"}"#),
            rule(r#"{"id": "r2", "urlPattern": "*", "method": "GET"}"#),
        ];

        let matched = find_matching_rule(&rules, "http://x/", "GET").unwrap();
        assert_eq!(matched.id, "r2");
    }

    #[test]
    fn test_no_match_returns_none() {
        let rules = vec![rule(r#"{"id": "r1", "urlPattern": "*/api/*"}"#)];
        assert!(find_matching_rule(&rules, "http://x/other", "POST").is_none());
    }

    #[test]
    fn test_empty_rule_set() {
        assert!(find_matching_rule(&[], "http://x/", "GET").is_none());
    }
}
