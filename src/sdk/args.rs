//! Request arguments and their wire encodings.
//!
//! Arguments travel either in the query string of a GET or in the
//! form-encoded body of a POST. The two use different escaping rules:
//! query components leave the RFC 3986 reserved characters alone, while
//! body data escapes everything outside the unreserved set.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use std::fmt::Display;

/// Characters escaped inside a URI query component.
///
/// Reserved delimiters pass through untouched, except `#`, which would
/// otherwise end the query, and `'`, which URL parsing escapes in the
/// query of http and https URLs.
pub const URI_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'\'')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in form data and path segments: everything except
/// the RFC 3986 unreserved set.
pub const DATA: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An ordered sequence of key/value request arguments.
///
/// Values are stringified when they are added. Duplicate keys are kept;
/// each occurrence is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSet {
    pairs: Vec<(String, String)>,
}

impl ArgumentSet {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, returning the set for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.push(key, value);
        self
    }

    /// Append a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Display) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for ArgumentSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.push(key, value);
        }
        set
    }
}

fn encode_pairs<'a, I>(argument_sets: I, escape: &'static AsciiSet) -> String
where
    I: IntoIterator<Item = &'a ArgumentSet>,
{
    argument_sets
        .into_iter()
        .flat_map(|args| args.iter())
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, escape),
                utf8_percent_encode(value, escape)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode argument sets as a URI query string, without the leading `?`.
pub fn encode_query<'a, I>(argument_sets: I) -> String
where
    I: IntoIterator<Item = &'a ArgumentSet>,
{
    encode_pairs(argument_sets, URI_COMPONENT)
}

/// Encode argument sets as an `application/x-www-form-urlencoded` body.
pub fn encode_form<'a, I>(argument_sets: I) -> String
where
    I: IntoIterator<Item = &'a ArgumentSet>,
{
    encode_pairs(argument_sets, DATA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_concatenates_sets_in_order() {
        let a = ArgumentSet::new().with("a", 1);
        let b = ArgumentSet::new().with("b", "2 c");
        assert_eq!(encode_query([&a, &b]), "a=1&b=2%20c");
    }

    #[test]
    fn test_query_keeps_reserved_characters() {
        let set = ArgumentSet::new().with("search", "index=main | head 10");
        assert_eq!(
            encode_query([&set]),
            "search=index=main%20%7C%20head%2010"
        );
    }

    #[test]
    fn test_form_escapes_reserved_characters() {
        let a = ArgumentSet::new().with("a", 1);
        let b = ArgumentSet::new().with("b", "x&y");
        assert_eq!(encode_form([&a, &b]), "a=1&b=x%26y");

        let c = ArgumentSet::new().with("name", "a=b/c d~e");
        assert_eq!(encode_form([&c]), "name=a%3Db%2Fc%20d~e");
    }

    #[test]
    fn test_duplicate_keys_are_all_sent() {
        let set = ArgumentSet::new().with("f", "title").with("f", "author");
        assert_eq!(set.len(), 2);
        assert_eq!(encode_query([&set]), "f=title&f=author");
    }

    #[test]
    fn test_empty_sets_produce_nothing() {
        let empty = ArgumentSet::new();
        assert!(empty.is_empty());
        assert_eq!(encode_query([&empty, &empty]), "");
        assert_eq!(encode_form(std::iter::empty::<&ArgumentSet>()), "");
    }

    #[test]
    fn test_absent_sets_are_skipped() {
        let a = ArgumentSet::new().with("count", 0);
        let sets: [Option<ArgumentSet>; 3] = [None, Some(a), None];
        assert_eq!(encode_query(sets.iter().flatten()), "count=0");
    }

    #[test]
    fn test_non_ascii_is_percent_encoded() {
        let set = ArgumentSet::new().with("owner", "jürgen");
        assert_eq!(encode_query([&set]), "owner=j%C3%BCrgen");
        assert_eq!(encode_form([&set]), "owner=j%C3%BCrgen");
    }

    #[test]
    fn test_collect_from_pairs() {
        let set: ArgumentSet = vec![("count", 10), ("offset", 20)].into_iter().collect();
        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs, vec![("count", "10"), ("offset", "20")]);
    }
}
