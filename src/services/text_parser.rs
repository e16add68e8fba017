// src/services/text_parser.rs
// DOCUMENTATION: Hashtag and mention extraction for story bodies

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Matches #hashtag where the tag is alphanumeric/underscore
static HASHTAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([a-zA-Z0-9_]+)").expect("invalid hashtag regex"));

/// Matches @username where username can contain alphanumeric characters and underscores
static MENTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([a-zA-Z0-9_]+)").expect("invalid mention regex"));

/// Extract #hashtags from content text
///
/// Returns a deduplicated, lowercased list preserving first-occurrence order.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    dedup_captures(&HASHTAG_REGEX, content)
}

/// Extract @mentions from content text
///
/// Returns a deduplicated list of usernames mentioned (without the @ symbol),
/// lowercased so lookups are case-insensitive.
pub fn extract_mentions(content: &str) -> Vec<String> {
    dedup_captures(&MENTION_REGEX, content)
}

fn dedup_captures(re: &Regex, content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    re.captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_lowercase()))
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_hashtag() {
        assert_eq!(extract_hashtags("morning #meditation"), vec!["meditation"]);
    }

    #[test]
    fn test_extract_multiple_hashtags() {
        assert_eq!(
            extract_hashtags("#breathwork before bed #sleep"),
            vec!["breathwork", "sleep"]
        );
    }

    #[test]
    fn test_hashtags_deduplicated_case_insensitive() {
        assert_eq!(
            extract_hashtags("#Calm #CALM #calm #focus"),
            vec!["calm", "focus"]
        );
    }

    #[test]
    fn test_extract_no_hashtags() {
        assert!(extract_hashtags("just a plain sentence").is_empty());
    }

    #[test]
    fn test_extract_single_mention() {
        assert_eq!(extract_mentions("Hello @alice!"), vec!["alice"]);
    }

    #[test]
    fn test_extract_duplicate_mentions() {
        assert_eq!(
            extract_mentions("@alice said hi to @bob, then @alice replied"),
            vec!["alice", "bob"]
        );
    }

    #[test]
    fn test_extract_mentions_with_underscores() {
        assert_eq!(extract_mentions("Hello @user_name_123!"), vec!["user_name_123"]);
    }

    #[test]
    fn test_mixed_tokens_do_not_collide() {
        let body = "Great session with @zen_master today #gratitude #zen";
        assert_eq!(extract_mentions(body), vec!["zen_master"]);
        assert_eq!(extract_hashtags(body), vec!["gratitude", "zen"]);
    }

    #[test]
    fn test_extract_mentions_unicode_content() {
        assert_eq!(extract_mentions("你好 @alice 欢迎!"), vec!["alice"]);
    }
}
