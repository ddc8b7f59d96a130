//! Query-string codec
//!
//! Values are opaque tokens: [`parse`] never decodes, and [`serialize`] only
//! encodes what the browser's form encoder would, leaving existing `%XX`
//! escapes and `+` alone. A query that came out of a browser therefore
//! survives a parse/serialize round trip unchanged.

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Ordered key/value parameter mapping
pub type ParamMap = IndexMap<String, String>;

/// Bytes escaped by [`serialize`]. This is `encodeURIComponent`'s set minus
/// `%` and `+`, which already-encoded tokens carry.
const FORM_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'%')
    .remove(b'+');

/// Split an href into its path and query at the first `?`.
///
/// A `#fragment` is never part of either half. The query is `None` when
/// there is no `?` at all.
pub fn split_href(href: &str) -> (&str, Option<&str>) {
    let href = href.split_once('#').map_or(href, |(before, _)| before);
    match href.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (href, None),
    }
}

/// Parse a query string into a [`ParamMap`].
///
/// Segments split on the first `=`; a segment without one maps to `""`.
/// Empty segments are dropped and duplicate keys keep their last value.
/// Callers holding an href pass the query half of [`split_href`].
pub fn parse(query: &str) -> ParamMap {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}

/// Merge `overrides` over `base`.
///
/// Colliding keys take the override value but keep their position in `base`;
/// new keys follow in their own order.
pub fn merge(base: &ParamMap, overrides: &ParamMap) -> ParamMap {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Serialize a [`ParamMap`] as `k=v` pairs joined by `&`.
pub fn serialize(params: &ParamMap) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append `extra` to `href`, using `?` or `&` depending on whether `href`
/// already carries a query.
pub fn append_params(href: &str, extra: &ParamMap) -> String {
    if extra.is_empty() {
        return href.to_string();
    }
    let separator = if href.contains('?') { '&' } else { '?' };
    format!("{href}{separator}{}", serialize(extra))
}

/// Form-encode a single key or value.
pub fn encode_component(token: &str) -> String {
    token
        .split(' ')
        .map(|piece| utf8_percent_encode(piece, FORM_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let parsed = parse("a=1&b=x=y&flag");
        assert_eq!(parsed, params(&[("a", "1"), ("b", "x=y"), ("flag", "")]));
    }

    #[test]
    fn parse_treats_every_input_as_query() {
        assert_eq!(parse("results"), params(&[("results", "")]));
        assert_eq!(parse("v1.2"), params(&[("v1.2", "")]));
        assert!(parse("").is_empty());
        assert!(parse("&&").is_empty());
    }

    #[test]
    fn parse_does_not_decode() {
        assert_eq!(parse("q=a%20b+c"), params(&[("q", "a%20b+c")]));
    }

    #[test]
    fn merge_keeps_base_order_then_new_keys() {
        let base = params(&[("q", "old"), ("page", "1")]);
        let overrides = params(&[("sort", "asc"), ("q", "new")]);
        let merged = merge(&base, &overrides);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["q", "page", "sort"]);
        assert_eq!(merged["q"], "new");
    }

    #[test]
    fn serialize_uses_form_encoding() {
        let map = params(&[("q", "hello world"), ("tag", "a&b"), ("x", "é")]);
        assert_eq!(serialize(&map), "q=hello+world&tag=a%26b&x=%C3%A9");
    }

    #[test]
    fn serialize_leaves_encoded_tokens_alone() {
        let map = params(&[("q", "a%20b+c"), ("safe", "-_.!~*'()")]);
        assert_eq!(serialize(&map), "q=a%20b+c&safe=-_.!~*'()");
    }

    #[test]
    fn append_params_picks_separator() {
        let extra = params(&[("_context", "partial")]);
        assert_eq!(append_params("/page2", &extra), "/page2?_context=partial");
        assert_eq!(append_params("/page2?a=1", &extra), "/page2?a=1&_context=partial");
        assert_eq!(append_params("/page2", &ParamMap::new()), "/page2");
    }

    #[test]
    fn split_href_at_first_question_mark() {
        assert_eq!(split_href("/s?a=1?b"), ("/s", Some("a=1?b")));
        assert_eq!(split_href("/s"), ("/s", None));
        assert_eq!(split_href("results"), ("results", None));
        assert_eq!(split_href("/s?"), ("/s", Some("")));
    }

    #[test]
    fn split_href_drops_fragment() {
        assert_eq!(split_href("/s?q=rust#top"), ("/s", Some("q=rust")));
        assert_eq!(split_href("/s#top"), ("/s", None));
    }

    fn token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._~+%-]{1,8}"
    }

    proptest! {
        /// A browser-encoded query survives parse, empty merge and serialize.
        #[test]
        fn round_trip_preserves_param_set(
            pairs in proptest::collection::vec((token(), "[A-Za-z0-9._~+%-]{0,8}"), 0..6)
        ) {
            let query = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            let original = parse(&query);
            let reparsed = parse(&serialize(&merge(&original, &ParamMap::new())));
            prop_assert_eq!(reparsed, original);
        }

        /// The override always wins on a shared key.
        #[test]
        fn override_wins(key in token(), base_value in token(), override_value in token()) {
            let base = params(&[(key.as_str(), base_value.as_str())]);
            let overrides = params(&[(key.as_str(), override_value.as_str())]);
            prop_assert_eq!(&merge(&base, &overrides)[&key], &override_value);
        }
    }
}
