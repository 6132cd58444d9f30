//! Aggregation of multi-status (207) purge responses.
//!
//! A purge request carries many URLs but gets a single HTTP response. Its body
//! is an array with one item per outcome, each tagged with its own status line:
//!
//! ```json
//! [
//!     {"status": "HTTP/1.1 201 CREATED", "details": "Purge request successfully created", "urls": ["..."]},
//!     {"status": "HTTP/1.1 403 FORBIDDEN", "details": "Unauthorized domain for your account", "urls": ["..."]}
//! ]
//! ```
//!
//! [`MultiStatus`] groups those items by numeric status code. The name of the
//! field holding the values (`urls` above) is supplied by the caller.

use crate::{Error, Result};
use http::StatusCode;
use serde_json::{Map, Value};
use std::collections::{btree_map, BTreeMap};

/// The only status code [`MultiStatus::succeeded`] reports.
pub const SUCCESS_STATUS: u16 = 201;

/// The outcome shared by every value reported under one status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// The item's `details` message.
    pub details: String,
    /// The values (URLs, cache keys, ...) listed under the caller's field.
    pub values: Vec<String>,
}

/// Items of a multi-status response, keyed by status code.
///
/// Each status code appears once. When several items share a code, the last
/// one wins.
///
/// # Examples
///
/// ```
/// use azion::MultiStatus;
/// use serde_json::json;
///
/// let items = vec![
///     json!({"status": "HTTP/1.1 201 CREATED", "details": "ok", "urls": ["a"]}),
///     json!({"status": "HTTP/1.1 403 FORBIDDEN", "details": "no", "urls": ["b"]}),
/// ];
///
/// let purge = MultiStatus::aggregate(&items, "urls").unwrap();
/// assert_eq!(purge.succeeded_values(), vec!["a"]);
/// assert_eq!(purge.failed_values(), vec!["b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiStatus {
    field: String,
    entries: BTreeMap<u16, StatusEntry>,
}

impl MultiStatus {
    /// Creates an empty result for the given value field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Groups multi-status items by their status code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] if any item is not an object, lacks
    /// `status`, `details` or `field`, or has an unparseable status line. No
    /// partial result is returned in that case.
    pub fn aggregate(items: &[Value], field: &str) -> Result<Self> {
        let mut result = Self::new(field);

        for (index, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| {
                Error::malformed(format!("multi-status item {}", index), "expected an object")
            })?;

            let status = parse_status_code(required_str(object, "status", index)?)?;
            let details = required_str(object, "details", index)?.to_string();
            let values = required_values(object, field, index)?;

            let previous = result.entries.insert(status, StatusEntry { details, values });
            if previous.is_some() {
                tracing::warn!(
                    status,
                    index,
                    field,
                    "Multi-status item overwrites an earlier item with the same status"
                );
            }
        }

        tracing::debug!(
            items = items.len(),
            statuses = result.entries.len(),
            "Aggregated multi-status response"
        );

        Ok(result)
    }

    /// Aggregates a decoded payload.
    ///
    /// An absent payload gives an empty result.
    pub fn from_payload(payload: Option<Value>, field: &str) -> Result<Self> {
        match payload {
            None | Some(Value::Null) => Ok(Self::new(field)),
            Some(Value::Array(items)) => Self::aggregate(&items, field),
            Some(_) => Err(Error::malformed(
                "multi-status response",
                "expected a JSON array of items",
            )),
        }
    }

    /// The name of the field the values were read from.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The entry reported under `status`, if any.
    pub fn get(&self, status: u16) -> Option<&StatusEntry> {
        self.entries.get(&status)
    }

    /// Returns `true` if some item reported `status`.
    pub fn contains(&self, status: u16) -> bool {
        self.entries.contains_key(&status)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in ascending status code order.
    pub fn iter(&self) -> Iter<'_> {
        self.entries.iter().map(copy_status as fn(_) -> _)
    }

    /// The entry reported as created ([`SUCCESS_STATUS`]), if any.
    ///
    /// Other 2xx codes are not counted.
    pub fn succeeded(&self) -> BTreeMap<u16, &StatusEntry> {
        self.entries
            .iter()
            .filter(|(status, _)| **status == SUCCESS_STATUS)
            .map(|(status, entry)| (*status, entry))
            .collect()
    }

    /// Every entry with a status code >= 400.
    pub fn failed(&self) -> BTreeMap<u16, &StatusEntry> {
        self.entries
            .range(400u16..)
            .map(|(status, entry)| (*status, entry))
            .collect()
    }

    /// Values of [`succeeded`](Self::succeeded), flattened.
    pub fn succeeded_values(&self) -> Vec<&str> {
        flatten(self.succeeded())
    }

    /// Values of [`failed`](Self::failed), flattened.
    pub fn failed_values(&self) -> Vec<&str> {
        flatten(self.failed())
    }

    /// Serializes the entries back into the item shape they were read from.
    pub fn to_items(&self) -> Vec<Value> {
        self.entries
            .iter()
            .map(|(status, entry)| {
                let mut item = Map::new();
                item.insert("status".to_string(), Value::String(status_line(*status)));
                item.insert("details".to_string(), Value::String(entry.details.clone()));
                item.insert(
                    self.field.clone(),
                    Value::Array(entry.values.iter().cloned().map(Value::String).collect()),
                );
                Value::Object(item)
            })
            .collect()
    }
}

/// Iterator over the entries of a [`MultiStatus`], see [`MultiStatus::iter`].
pub type Iter<'a> = std::iter::Map<
    btree_map::Iter<'a, u16, StatusEntry>,
    fn((&'a u16, &'a StatusEntry)) -> (u16, &'a StatusEntry),
>;

fn copy_status<'a>((status, entry): (&'a u16, &'a StatusEntry)) -> (u16, &'a StatusEntry) {
    (*status, entry)
}

impl<'a> IntoIterator for &'a MultiStatus {
    type Item = (u16, &'a StatusEntry);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses the code out of a status line such as `HTTP/1.1 201 CREATED`.
///
/// The line is split on whitespace and the second token must be an integer.
///
/// # Examples
///
/// ```
/// use azion::multi_status::parse_status_code;
///
/// assert_eq!(parse_status_code("HTTP/1.1 201 CREATED").unwrap(), 201);
/// assert!(parse_status_code("bogus").is_err());
/// ```
pub fn parse_status_code(line: &str) -> Result<u16> {
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::malformed(format!("status line {:?}", line), "missing status code"))?;

    token.parse().map_err(|e| {
        Error::malformed(
            format!("status line {:?}", line),
            format!("invalid status code {:?}: {}", token, e),
        )
    })
}

fn status_line(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("UNKNOWN");
    format!("HTTP/1.1 {} {}", status, reason.to_uppercase())
}

fn required_str<'a>(object: &'a Map<String, Value>, key: &str, index: usize) -> Result<&'a str> {
    object.get(key).and_then(Value::as_str).ok_or_else(|| {
        Error::malformed(
            format!("multi-status item {}", index),
            format!("missing string field `{}`", key),
        )
    })
}

fn required_values(object: &Map<String, Value>, field: &str, index: usize) -> Result<Vec<String>> {
    let malformed = || {
        Error::malformed(
            format!("multi-status item {}", index),
            format!("field `{}` must be a list of strings", field),
        )
    };

    object
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(malformed)?
        .iter()
        .map(|value| value.as_str().map(str::to_string).ok_or_else(malformed))
        .collect()
}

fn flatten(entries: BTreeMap<u16, &StatusEntry>) -> Vec<&str> {
    entries
        .into_values()
        .flat_map(|entry| entry.values.iter().map(String::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn documented_response() -> Vec<Value> {
        vec![
            json!({
                "status": "HTTP/1.1 201 CREATED",
                "urls": ["http://www.domain.com/", "http://www.domain.com/test.js"],
                "details": "Purge request successfully created"
            }),
            json!({
                "status": "HTTP/1.1 403 FORBIDDEN",
                "urls": ["http://static.mistaken-domain.com/image1.jpg"],
                "details": "Unauthorized domain for your account"
            }),
        ]
    }

    #[test]
    fn test_aggregate_documented_response() {
        let purge = MultiStatus::aggregate(&documented_response(), "urls").unwrap();

        assert_eq!(purge.len(), 2);
        assert_eq!(purge.field(), "urls");
        let created = purge.get(201).unwrap();
        assert_eq!(created.details, "Purge request successfully created");
        assert_eq!(
            created.values,
            vec!["http://www.domain.com/", "http://www.domain.com/test.js"]
        );

        let succeeded = purge.succeeded();
        assert_eq!(succeeded.keys().copied().collect::<Vec<_>>(), vec![201]);
        let failed = purge.failed();
        assert_eq!(failed.keys().copied().collect::<Vec<_>>(), vec![403]);
        assert_eq!(
            purge.failed_values(),
            vec!["http://static.mistaken-domain.com/image1.jpg"]
        );
    }

    #[test]
    fn test_only_201_counts_as_succeeded() {
        let items = vec![
            json!({"status": "HTTP/1.1 200 OK", "details": "ok", "urls": ["a"]}),
            json!({"status": "HTTP/1.1 202 ACCEPTED", "details": "queued", "urls": ["b"]}),
            json!({"status": "HTTP/1.1 400 BAD REQUEST", "details": "bad", "urls": ["c"]}),
        ];

        let purge = MultiStatus::aggregate(&items, "urls").unwrap();
        assert!(purge.succeeded().is_empty());
        assert!(purge.succeeded_values().is_empty());
        assert_eq!(purge.failed().len(), 1);
        assert!(purge.contains(200));
    }

    #[test]
    fn test_repeated_status_overwrites() {
        let items = vec![
            json!({"status": "HTTP/1.1 201 CREATED", "details": "first", "urls": ["a"]}),
            json!({"status": "HTTP/1.1 201 CREATED", "details": "second", "urls": ["b"]}),
        ];

        let purge = MultiStatus::aggregate(&items, "urls").unwrap();
        assert_eq!(purge.len(), 1);
        assert_eq!(purge.get(201).unwrap().details, "second");
        assert_eq!(purge.succeeded_values(), vec!["b"]);
    }

    #[test]
    fn test_malformed_status_line() {
        let items = vec![
            json!({"status": "HTTP/1.1 201 CREATED", "details": "ok", "urls": ["a"]}),
            json!({"status": "bogus", "details": "?", "urls": ["b"]}),
        ];

        match MultiStatus::aggregate(&items, "urls") {
            Err(Error::MalformedPayload { context, .. }) => {
                assert!(context.contains("bogus"));
            }
            other => panic!("Expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_status_code() {
        assert_eq!(parse_status_code("HTTP/1.1 207 MULTI-STATUS").unwrap(), 207);
        assert_eq!(parse_status_code("  HTTP/2   404  ").unwrap(), 404);
        assert!(parse_status_code("").is_err());
        assert!(parse_status_code("HTTP/1.1 CREATED 201").is_err());
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let missing_details = vec![json!({"status": "HTTP/1.1 201 CREATED", "urls": []})];
        assert!(MultiStatus::aggregate(&missing_details, "urls").is_err());

        let wrong_field = vec![json!({"status": "HTTP/1.1 201 CREATED", "details": "ok", "urls": []})];
        assert!(MultiStatus::aggregate(&wrong_field, "cache_keys").is_err());

        let not_strings = vec![json!({"status": "HTTP/1.1 201 CREATED", "details": "ok", "urls": [1]})];
        assert!(MultiStatus::aggregate(&not_strings, "urls").is_err());

        let not_object = vec![json!("HTTP/1.1 201 CREATED")];
        assert!(MultiStatus::aggregate(&not_object, "urls").is_err());
    }

    #[test]
    fn test_to_items_round_trip() {
        let purge = MultiStatus::aggregate(&documented_response(), "urls").unwrap();
        let items = purge.to_items();

        assert_eq!(items[0]["status"], "HTTP/1.1 201 CREATED");
        assert_eq!(items[1]["status"], "HTTP/1.1 403 FORBIDDEN");
        assert_eq!(MultiStatus::aggregate(&items, "urls").unwrap(), purge);
    }

    #[test]
    fn test_from_payload() {
        assert!(MultiStatus::from_payload(None, "urls").unwrap().is_empty());
        assert!(MultiStatus::from_payload(Some(json!({"status": "x"})), "urls").is_err());

        let purge = MultiStatus::from_payload(Some(Value::Array(documented_response())), "urls").unwrap();
        assert_eq!(purge.len(), 2);
    }

    #[test]
    fn test_iteration_shapes_agree() {
        let items = vec![
            json!({"status": "HTTP/1.1 403 FORBIDDEN", "details": "no", "urls": ["b"]}),
            json!({"status": "HTTP/1.1 201 CREATED", "details": "ok", "urls": ["a"]}),
        ];
        let purge = MultiStatus::aggregate(&items, "urls").unwrap();

        let mut statuses = Vec::new();
        for (status, entry) in &purge {
            assert_eq!(purge.get(status), Some(entry));
            statuses.push(status);
        }
        assert_eq!(statuses, vec![201, 403]);
        assert!(purge.iter().eq(&purge));
    }
}
