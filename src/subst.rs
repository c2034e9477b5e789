//! Ordered substitution of selectors in strings and byte buffers.
//!
//! A selector starting with `re:` is compiled as a regular expression and
//! every non-overlapping match is replaced; any other selector is a literal
//! substring. Entries are applied strictly in list order and the output of
//! one entry is not re-scanned by earlier entries.

use crate::engine::MapList;
use crate::error::Result;

/// The selector prefix that switches an entry to regex semantics. A bare
/// `re` selector (no colon) is still a literal.
const REGEX_PREFIX: &str = "re:";

pub fn apply_str(target: &str, mapping: &MapList) -> Result<String> {
    let mut out = target.to_string();
    for item in mapping {
        out = match item.key.strip_prefix(REGEX_PREFIX) {
            Some(expr) => regex::Regex::new(expr)?
                .replace_all(&out, item.value.as_str())
                .into_owned(),
            None => out.replace(&item.key, &item.value),
        };
    }
    Ok(out)
}

pub fn apply_bytes(content: &[u8], mapping: &MapList) -> Result<Vec<u8>> {
    let mut out = content.to_vec();
    for item in mapping {
        out = match item.key.strip_prefix(REGEX_PREFIX) {
            Some(expr) => regex::bytes::Regex::new(expr)?
                .replace_all(&out, item.value.as_bytes())
                .into_owned(),
            None => replace_literal(&out, item.key.as_bytes(), item.value.as_bytes()),
        };
    }
    Ok(out)
}

fn replace_literal(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::MapItem;

    fn list(entries: &[(&str, &str)]) -> MapList {
        entries
            .iter()
            .map(|(k, v)| MapItem {
                key: (*k).to_string(),
                value: (*v).to_string(),
            })
            .collect()
    }

    #[test]
    fn literal_replaces_all_occurrences() {
        let got = apply_str("a b a", &list(&[("a", "x")])).unwrap();
        assert_eq!(got, "x b x");
    }

    #[test]
    fn regex_selector_replaces_matches() {
        let got = apply_str("v1 v22 v333", &list(&[("re:v\\d+", "V")])).unwrap();
        assert_eq!(got, "V V V");
    }

    #[test]
    fn bare_re_selector_is_literal() {
        let got = apply_str("re re:", &list(&[("re", "X")])).unwrap();
        assert_eq!(got, "X X:");
    }

    #[test]
    fn empty_list_is_identity() {
        let content = b"unchanged \xff bytes".to_vec();
        assert_eq!(apply_bytes(&content, &MapList::new()).unwrap(), content);
        assert_eq!(apply_str("unchanged", &MapList::new()).unwrap(), "unchanged");
    }

    #[test]
    fn entries_apply_in_order_without_self_composition() {
        // The first entry's output contains the second entry's selector,
        // which is then rewritten by the second pass only.
        let got = apply_str("one", &list(&[("one", "two"), ("two", "three")])).unwrap();
        assert_eq!(got, "three");
        // But the reverse order leaves "two" alone.
        let got = apply_str("one", &list(&[("two", "three"), ("one", "two")])).unwrap();
        assert_eq!(got, "two");
    }

    #[test]
    fn malformed_regex_is_a_syntax_error() {
        let err = apply_str("x", &list(&[("re:(", "y")])).unwrap_err();
        assert!(matches!(err, crate::error::Error::RegexSyntax(_)));
    }

    #[test]
    fn bytes_literal_replacement() {
        let got = apply_bytes(b"hello project", &list(&[("project", "sombra")])).unwrap();
        assert_eq!(got, b"hello sombra".to_vec());
    }
}
