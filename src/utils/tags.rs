use crate::error::{AppError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Compiles tag filters into case-insensitive containment patterns. Filter
/// text is escaped, so `c++` matches literally rather than as a regex.
pub fn compile_patterns<I, S>(filters: I) -> Result<Vec<Regex>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    filters
        .into_iter()
        .map(|filter| {
            RegexBuilder::new(&regex::escape(filter.as_ref().trim()))
                .case_insensitive(true)
                .build()
                .map_err(|e| AppError::Validation(format!("Invalid tag filter: {}", e)))
        })
        .collect()
}

/// A post matches when every pattern hits at least one of its tags
/// (AND across filters, containment per tag).
pub fn matches_all(tags: &[String], patterns: &[Regex]) -> bool {
    patterns
        .iter()
        .all(|pattern| tags.iter().any(|tag| pattern.is_match(tag)))
}

/// Splits a free-text tag query on whitespace into filter tokens.
pub fn query_tokens(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// The `limit` most frequent tags by occurrence count, descending; ties break
/// alphabetically so the ranking is stable.
pub fn top_tags<'a, I>(tag_lists: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a Vec<String>>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tags in tag_lists {
        for tag in tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn all_filters_must_match() {
        let post_tags = tags(&["go", "rust"]);

        let both = compile_patterns(["go", "rust"]).unwrap();
        assert!(matches_all(&post_tags, &both));

        let miss = compile_patterns(["go", "python"]).unwrap();
        assert!(!matches_all(&post_tags, &miss));
    }

    #[test]
    fn matching_is_case_insensitive_containment() {
        let post_tags = tags(&["WebDev", "Rustlang"]);

        let patterns = compile_patterns(["rust", "WEB"]).unwrap();
        assert!(matches_all(&post_tags, &patterns));
    }

    #[test]
    fn no_filters_matches_everything() {
        assert!(matches_all(&tags(&["anything"]), &[]));
    }

    #[test]
    fn filter_text_is_escaped() {
        let patterns = compile_patterns(["c++"]).unwrap();
        assert!(matches_all(&tags(&["c++"]), &patterns));
        assert!(!matches_all(&tags(&["cc"]), &patterns));
    }

    #[test]
    fn query_tokenization_collapses_whitespace() {
        assert_eq!(query_tokens("go rust"), vec!["go", "rust"]);
        assert_eq!(query_tokens("go  rust"), vec!["go", "rust"]);
        assert_eq!(query_tokens("  go\trust \n"), vec!["go", "rust"]);
        assert!(query_tokens("   ").is_empty());
    }

    #[test]
    fn top_tags_ranks_by_count_then_name() {
        let lists = vec![
            tags(&["go", "rust"]),
            tags(&["go", "web"]),
            tags(&["go", "rust"]),
        ];

        let ranked = top_tags(lists.iter(), 10);
        assert_eq!(
            ranked,
            vec![
                ("go".to_string(), 3),
                ("rust".to_string(), 2),
                ("web".to_string(), 1),
            ]
        );
    }

    #[test]
    fn top_tags_truncates_to_the_limit() {
        let lists: Vec<Vec<String>> = (0..15).map(|i| vec![format!("t{:02}", i)]).collect();
        let ranked = top_tags(lists.iter(), 10);
        assert_eq!(ranked.len(), 10);
    }
}
