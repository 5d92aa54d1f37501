//! Query parameter round-trip for the active search texts.
//!
//! Search texts persist as the repeatable `t` parameter. Parsing trims,
//! drops empties and duplicates; writing sorts the parameter list and
//! only rewrites when the result actually differs, so redundant history
//! entries are never produced.

use url::form_urlencoded;

/// Name of the repeatable search-text parameter.
pub const TEXT_PARAM: &str = "t";

/// Extract the search texts from a query string: trimmed, non-empty,
/// deduplicated preserving first occurrence.
pub fn parse_texts(query: &str) -> Vec<String> {
    let mut texts: Vec<String> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != TEXT_PARAM {
            continue;
        }
        let trimmed = value.trim();
        if trimmed.is_empty() || texts.iter().any(|t| t == trimmed) {
            continue;
        }
        texts.push(trimmed.to_string());
    }
    texts
}

/// Rewrite `current` so its `t` parameters equal `texts`, keeping any
/// other parameters and sorting the whole list. Returns `None` when the
/// current `t` set already matches (no rewrite needed).
pub fn sync_query(current: &str, texts: &[String]) -> Option<String> {
    let mut want: Vec<&str> = texts.iter().map(String::as_str).collect();
    want.sort_unstable();

    let mut have = parse_texts(current);
    have.sort_unstable();
    if have == want {
        return None;
    }

    // Keep non-`t` pairs, replace the `t` set, sort by key then value.
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(current.as_bytes())
        .filter(|(key, _)| key != TEXT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.extend(want.iter().map(|t| (TEXT_PARAM.to_string(), t.to_string())));
    pairs.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    Some(serializer.finish())
}

/// Encode `texts` as a sorted standalone query string.
pub fn encode_texts(texts: &[String]) -> String {
    sync_query("", texts).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn parse_trims_and_dedupes() {
        let texts = parse_texts("t=alpha&t=%20beta%20&t=alpha&t=%20&x=1");
        assert_eq!(texts, vec!["alpha", "beta"]);
    }

    #[test]
    fn sync_is_none_when_set_matches() {
        assert_eq!(sync_query("t=alpha&t=beta", &owned(&["alpha", "beta"])), None);
        // Order within the query does not matter, only the set.
        assert_eq!(sync_query("t=beta&t=alpha", &owned(&["alpha", "beta"])), None);
    }

    #[test]
    fn sync_rewrites_sorted() {
        let rewritten = sync_query("t=beta", &owned(&["gamma", "alpha", "beta"]));
        assert_eq!(rewritten.as_deref(), Some("t=alpha&t=beta&t=gamma"));
    }

    #[test]
    fn sync_preserves_other_params() {
        let rewritten = sync_query("sym=BTC&t=old", &owned(&["new"]));
        assert_eq!(rewritten.as_deref(), Some("sym=BTC&t=new"));
    }

    #[test]
    fn encode_round_trips() {
        let texts = owned(&["beta", "alpha"]);
        let query = encode_texts(&texts);
        assert_eq!(query, "t=alpha&t=beta");
        assert_eq!(parse_texts(&query), vec!["alpha", "beta"]);
    }
}
