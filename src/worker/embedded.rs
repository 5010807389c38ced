//! Parser for the sentinel-delimited data blob in monitoring messages.
//!
//! One monitoring integration smuggles structured data through a free-text
//! alert message: a `key=value` CSV blob bounded by two occurrences of the
//! literal `[RUNNABLE_DATA]` marker, e.g.
//!
//! ```text
//! %%% disk almost full [RUNNABLE_DATA]type=disk_filled,host=10.4.1.1[RUNNABLE_DATA] %%%
//! ```
//!
//! Parsing is fail-fast: an entry without `=` poisons the whole parse rather
//! than being dropped, so a truncated or corrupted blob never produces a
//! partial record.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// The literal marker bounding the data segment.
pub const SENTINEL: &str = "[RUNNABLE_DATA]";

/// Error type for embedded-blob parsing failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbeddedError {
    /// The text does not contain two sentinel markers.
    #[error("no sentinel-delimited data segment found")]
    MissingSegment,

    /// An entry in the segment has no `=` separator.
    #[error("malformed entry (expected key=value): {0:?}")]
    MalformedEntry(String),
}

/// A flat string-to-string record parsed from the data segment.
///
/// Keys and values are plain strings; no type coercion is applied. The
/// record serializes as a JSON object, which is forwarded in full as the
/// downstream event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmbeddedRecord {
    entries: BTreeMap<String, String>,
}

impl EmbeddedRecord {
    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the segment between the first two sentinel markers of `text`.
///
/// The segment is split on `,`; each entry is split on its first `=` into a
/// key/value pair (so values may themselves contain `=`). Later duplicate
/// keys overwrite earlier ones.
///
/// # Errors
///
/// * [`EmbeddedError::MissingSegment`] if fewer than two markers are present
/// * [`EmbeddedError::MalformedEntry`] if any entry lacks an `=`
pub fn parse(text: &str) -> Result<EmbeddedRecord, EmbeddedError> {
    let mut parts = text.splitn(3, SENTINEL);

    // splitn always yields at least one part (the text before the first
    // marker, possibly empty); the segment is only valid if a closing
    // marker follows it.
    parts.next();
    let segment = parts.next().ok_or(EmbeddedError::MissingSegment)?;
    if parts.next().is_none() {
        return Err(EmbeddedError::MissingSegment);
    }

    let mut entries = BTreeMap::new();
    for entry in segment.split(',') {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| EmbeddedError::MalformedEntry(entry.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
    }

    Ok(EmbeddedRecord { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_segment_between_markers() {
        let record =
            parse("%%% text [RUNNABLE_DATA]type=disk_filled,test1=val[RUNNABLE_DATA] more %%%")
                .unwrap();

        assert_eq!(record.get("type"), Some("disk_filled"));
        assert_eq!(record.get("test1"), Some("val"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn serializes_as_flat_string_object() {
        let record = parse("[RUNNABLE_DATA]type=disk_filled,test1=val[RUNNABLE_DATA]").unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "type": "disk_filled", "test1": "val" })
        );
    }

    #[test]
    fn single_entry_segment() {
        let record = parse("[RUNNABLE_DATA]type=unresponsive[RUNNABLE_DATA]").unwrap();
        assert_eq!(record.get("type"), Some("unresponsive"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn value_may_contain_equals() {
        let record = parse("[RUNNABLE_DATA]type=x,query=a=b[RUNNABLE_DATA]").unwrap();
        assert_eq!(record.get("query"), Some("a=b"));
    }

    #[test]
    fn no_markers_fails() {
        assert_eq!(parse("type=disk_filled"), Err(EmbeddedError::MissingSegment));
    }

    #[test]
    fn single_marker_fails() {
        assert_eq!(
            parse("[RUNNABLE_DATA]type=disk_filled"),
            Err(EmbeddedError::MissingSegment)
        );
    }

    #[test]
    fn entry_without_equals_fails_the_whole_parse() {
        let result = parse("[RUNNABLE_DATA]type=x,oops,other=y[RUNNABLE_DATA]");
        assert_eq!(result, Err(EmbeddedError::MalformedEntry("oops".to_string())));
    }

    #[test]
    fn empty_segment_fails() {
        assert!(parse("[RUNNABLE_DATA][RUNNABLE_DATA]").is_err());
    }

    #[test]
    fn text_after_second_marker_is_ignored() {
        let record =
            parse("[RUNNABLE_DATA]type=x[RUNNABLE_DATA] trailing [RUNNABLE_DATA]junk").unwrap();
        assert_eq!(record.get("type"), Some("x"));
        assert_eq!(record.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_key() -> impl Strategy<Value = String> {
            "[a-zA-Z_][a-zA-Z0-9_]{0,15}".prop_map(String::from)
        }

        fn arb_value() -> impl Strategy<Value = String> {
            // Values must not contain the entry or segment separators.
            "[a-zA-Z0-9_. /:-]{0,20}".prop_map(String::from)
        }

        proptest! {
            /// Any well-formed blob parses back to the entries it was built
            /// from (modulo duplicate keys, which the generator avoids).
            #[test]
            fn well_formed_blob_roundtrips(
                entries in prop::collection::btree_map(arb_key(), arb_value(), 1..6)
            ) {
                let segment = entries
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                let text = format!("prefix {SENTINEL}{segment}{SENTINEL} suffix");

                let record = parse(&text).unwrap();
                prop_assert_eq!(record.len(), entries.len());
                for (key, value) in &entries {
                    prop_assert_eq!(record.get(key), Some(value.as_str()));
                }
            }

            /// Parsing is pure: the same input always yields the same result.
            #[test]
            fn parse_is_deterministic(text in ".{0,80}") {
                prop_assert_eq!(parse(&text), parse(&text));
            }
        }
    }
}
