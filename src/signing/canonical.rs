//! Normalize and canonicalize steps.

use std::fmt::{self, Display};

/// A borrowed parameter: key plus optional value.
pub type Entry<'a> = (&'a str, Option<&'a str>);

/// Whitespace as partner implementations count it: Unicode space and
/// separator characters except the no-break spaces, plus the ASCII controls
/// `\t`..`\r` and the information separators U+001C..U+001F. Unlike
/// [`char::is_whitespace`], U+0085 is not whitespace.
pub fn is_whitespace(c: char) -> bool {
    match c {
        '\u{1c}'..='\u{1f}' => true,
        '\u{85}' | '\u{a0}' | '\u{2007}' | '\u{202f}' => false,
        _ => c.is_whitespace(),
    }
}

/// A string is blank when it is absent, empty, or whitespace only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.chars().all(is_whitespace))
}

/// Sorts entries by key, comparing bytes. Keys are unique so the order is total.
pub fn normalize(mut entries: Vec<Entry<'_>>) -> Vec<Entry<'_>> {
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Builds `k1=v1&k2=v2...` followed directly by the secret.
///
/// Returns an empty string when there are no entries or the secret is blank.
/// Entries with a blank key are skipped, and an absent value renders as `k=`.
pub fn canonicalize(sorted: &[Entry<'_>], secret: Option<&str>) -> String {
    let secret = match secret {
        Some(secret) if !sorted.is_empty() && !is_blank(Some(secret)) => secret,
        _ => return String::new(),
    };

    let mut joined = String::new();
    for (key, value) in sorted.iter().filter(|(key, _)| !is_blank(Some(*key))) {
        if !joined.is_empty() {
            joined.push('&');
        }
        joined.push_str(key);
        joined.push('=');
        joined.push_str(value.unwrap_or_default());
    }
    joined.push_str(secret);
    joined
}

/// Renders entries for diagnostics. Present values are quoted and absent
/// values print as `null`, so `""` and a missing value stay distinct.
pub struct Described<'e, 'a>(pub &'e [Entry<'a>]);

impl Display for Described<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{key:?}:{value:?}")?,
                None => write!(f, "{key:?}:null")?,
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::{canonicalize, is_blank, is_whitespace, normalize, Described, Entry};

    #[test]
    fn blank_covers_absent_empty_and_whitespace() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some(" \t\n")));
        assert!(!is_blank(Some(" a ")));
    }

    #[test]
    fn no_break_spaces_are_not_whitespace() {
        for c in ['\u{a0}', '\u{2007}', '\u{202f}', '\u{85}'] {
            assert!(!is_whitespace(c), "{c:?}");
        }
        assert!(!is_blank(Some("\u{a0}")));
        assert!(is_whitespace('\u{3000}'));
        assert!(is_whitespace('\u{2028}'));
    }

    #[test]
    fn information_separators_are_whitespace() {
        for c in ['\u{1c}', '\u{1d}', '\u{1e}', '\u{1f}'] {
            assert!(is_whitespace(c), "{c:?}");
        }
        assert!(is_blank(Some("\u{1f} \u{1c}")));
    }

    #[test]
    fn keeps_no_break_space_keys_and_drops_separator_keys() {
        let sorted: Vec<Entry> = normalize(vec![("\u{a0}", Some("x")), ("a", Some("1"))]);
        assert_eq!(canonicalize(&sorted, Some("k")), "a=1&\u{a0}=xk");

        let sorted: Vec<Entry> = normalize(vec![("\u{1f}", Some("x")), ("a", Some("1"))]);
        assert_eq!(canonicalize(&sorted, Some("k")), "a=1k");
    }

    #[test]
    fn separator_only_secret_is_blank() {
        let sorted: Vec<Entry> = vec![("a", Some("1"))];
        assert_eq!(canonicalize(&sorted, Some("\u{1e}")), "");
        assert_eq!(canonicalize(&sorted, Some("\u{a0}")), "a=1\u{a0}");
    }

    #[test]
    fn sorts_by_bytes_not_locale() {
        let sorted = normalize(vec![("b", None), ("B", None), ("a", None), ("_", None), ("小", None)]);
        let keys: Vec<&str> = sorted.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["B", "_", "a", "b", "小"]);
    }

    #[test]
    fn normalizes_empty_input() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn joins_sorted_pairs_and_appends_secret() {
        let sorted: Vec<Entry> = vec![("a", Some("1")), ("b", None), ("c", Some(""))];
        assert_eq!(canonicalize(&sorted, Some("key")), "a=1&b=&c=key");
    }

    #[test]
    fn blank_secret_or_no_entries_yields_empty() {
        let sorted: Vec<Entry> = vec![("a", Some("1"))];
        assert_eq!(canonicalize(&sorted, None), "");
        assert_eq!(canonicalize(&sorted, Some("")), "");
        assert_eq!(canonicalize(&sorted, Some("   ")), "");
        assert_eq!(canonicalize(&[], Some("key")), "");
    }

    #[test]
    fn drops_blank_keys_entirely() {
        let sorted: Vec<Entry> = normalize(vec![(" ", Some("x")), ("", Some("y")), ("a", Some("1"))]);
        assert_eq!(canonicalize(&sorted, Some("key")), "a=1key");
    }

    #[test]
    fn only_blank_keys_leaves_the_secret() {
        let sorted: Vec<Entry> = vec![("", Some("x")), ("\t", None)];
        assert_eq!(canonicalize(&sorted, Some("key")), "key");
    }

    #[test]
    fn describes_absent_and_empty_values_differently() {
        let entries: Vec<Entry> = vec![("a", Some("")), ("b", None)];
        assert_eq!(Described(&entries).to_string(), r#"{"a":"", "b":null}"#);
    }
}
