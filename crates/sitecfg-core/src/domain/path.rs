//! Dotted-path addressing into a configuration tree.
//!
//! The editor addresses fields with paths such as `hero.title` or
//! `collections.items.2.images.0.src`.  A segment made only of ASCII digits is
//! a list index; anything else is an object key.
//!
//! Writes create missing intermediate containers: a list when the following
//! segment is an index, an object otherwise.  An index may address an
//! existing list element or the position just past the end, which appends.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::baseline::baseline;

/// Error type for path parsing and path-based edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path `{0}` contains an empty segment")]
    EmptySegment(String),
    #[error("cannot descend into `{segment}` of `{path}`: parent is not an object or list")]
    NotAContainer { path: String, segment: String },
    #[error("`{0}` is not a list")]
    NotAList(String),
    #[error("the baseline has no item template for `{0}`")]
    NoTemplate(String),
    #[error("index {index} in `{path}` is out of range (list has {len} items)")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("`{0}` does not address a list element")]
    NotAnElement(String),
    #[error("`{0}` is not a project or collection item")]
    NotAGalleryItem(String),
}

/// One step of a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// A parsed dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<Segment>,
}

impl ConfigPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Empty`] for an empty string and
    /// [`PathError::EmptySegment`] for paths such as `a..b` or `a.`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                // Indices too large for usize are kept as plain keys.
                part.parse()
                    .map(Segment::Index)
                    .unwrap_or_else(|_| Segment::Key(part.to_string()))
            } else {
                Segment::Key(part.to_string())
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for ConfigPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

fn child<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get(key),
        (Segment::Index(idx), Value::Object(map)) => map.get(&idx.to_string()),
        (Segment::Index(idx), Value::Array(items)) => items.get(*idx),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get_mut(key),
        (Segment::Index(idx), Value::Object(map)) => map.get_mut(&idx.to_string()),
        (Segment::Index(idx), Value::Array(items)) => items.get_mut(*idx),
        _ => None,
    }
}

/// Returns the slot for `segment` inside `value`, creating it as `null` when
/// absent.
fn slot<'a>(
    value: &'a mut Value,
    segment: &Segment,
    path: &ConfigPath,
) -> Result<&'a mut Value, PathError> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => Ok(map.entry(key.clone()).or_insert(Value::Null)),
        (Segment::Index(idx), Value::Object(map)) => {
            Ok(map.entry(idx.to_string()).or_insert(Value::Null))
        }
        (Segment::Index(idx), Value::Array(items)) => {
            let len = items.len();
            if *idx > len {
                return Err(PathError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *idx,
                    len,
                });
            }
            if *idx == len {
                items.push(Value::Null);
            }
            Ok(&mut items[*idx])
        }
        _ => Err(PathError::NotAContainer {
            path: path.to_string(),
            segment: segment.to_string(),
        }),
    }
}

/// Reads the value at `path`.
pub fn get_path<'a>(root: &'a Value, path: &ConfigPath) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(root, |current, segment| child(current, segment))
}

/// Mutable counterpart of [`get_path`]; never creates anything.
pub fn get_path_mut<'a>(root: &'a mut Value, path: &ConfigPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in &path.segments {
        current = child_mut(current, segment)?;
    }
    Some(current)
}

/// Writes `value` at `path`, creating intermediate containers as needed.
///
/// # Errors
///
/// Returns [`PathError::NotAContainer`] when an existing intermediate value is
/// a scalar (a string, number or boolean) that cannot be descended into, and
/// [`PathError::IndexOutOfRange`] when an index lies beyond the end of a list.
/// Nothing is modified in either case until the failing segment is reached.
pub fn set_path(root: &mut Value, path: &ConfigPath, value: Value) -> Result<(), PathError> {
    let Some((last, parents)) = path.segments.split_last() else {
        return Err(PathError::Empty);
    };
    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        let next = slot(current, segment, path)?;
        if next.is_null() {
            *next = match path.segments[i + 1] {
                Segment::Index(_) => Value::Array(Vec::new()),
                Segment::Key(_) => Value::Object(Map::new()),
            };
        }
        current = next;
    }
    *slot(current, last, path)? = value;
    Ok(())
}

/// Returns a fresh copy of the first baseline element of the list at `list`.
///
/// This is the shape the editor uses for "add a new item".
pub fn template_item(list: &ConfigPath) -> Option<Value> {
    get_path(baseline(), list)?.as_array()?.first().cloned()
}

/// Appends a baseline-shaped item to the list at `list` and returns its index.
///
/// The list is created when the path does not exist yet.
///
/// # Errors
///
/// Returns [`PathError::NoTemplate`] if the baseline has no non-empty list at
/// `list`, and [`PathError::NotAList`] if `config` holds something other than
/// a list there.
pub fn append_item(config: &mut Value, list: &ConfigPath) -> Result<usize, PathError> {
    let template = template_item(list).ok_or_else(|| PathError::NoTemplate(list.to_string()))?;
    let missing = get_path(config, list).map_or(true, Value::is_null);
    if missing {
        set_path(config, list, Value::Array(Vec::new()))?;
    }
    let items = get_path_mut(config, list)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| PathError::NotAList(list.to_string()))?;
    items.push(template);
    Ok(items.len() - 1)
}

/// Removes the list element addressed by `item` (for example
/// `projects.items.2`) and returns it.
///
/// # Errors
///
/// Returns [`PathError::NotAnElement`] when the last segment is not an index
/// or the parent is not a list, and [`PathError::IndexOutOfRange`] when the
/// index does not exist.
pub fn remove_item(config: &mut Value, item: &ConfigPath) -> Result<Value, PathError> {
    let Some((Segment::Index(index), parents)) = item.segments.split_last() else {
        return Err(PathError::NotAnElement(item.to_string()));
    };
    if parents.is_empty() {
        return Err(PathError::NotAnElement(item.to_string()));
    }
    let list = ConfigPath {
        segments: parents.to_vec(),
    };
    let items = get_path_mut(config, &list)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| PathError::NotAnElement(item.to_string()))?;
    if *index >= items.len() {
        return Err(PathError::IndexOutOfRange {
            path: item.to_string(),
            index: *index,
            len: items.len(),
        });
    }
    Ok(items.remove(*index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::baseline::fresh_baseline;
    use serde_json::json;

    fn path(raw: &str) -> ConfigPath {
        ConfigPath::parse(raw).expect("valid path")
    }

    #[test]
    fn test_parse_splits_keys_and_indices() {
        let p = path("collections.items.2.title");
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("collections".into()),
                Segment::Key("items".into()),
                Segment::Index(2),
                Segment::Key("title".into()),
            ]
        );
        assert_eq!(p.to_string(), "collections.items.2.title");
    }

    #[test]
    fn test_parse_rejects_empty_and_empty_segments() {
        assert_eq!(ConfigPath::parse(""), Err(PathError::Empty));
        assert!(matches!(ConfigPath::parse("a..b"), Err(PathError::EmptySegment(_))));
        assert!(matches!(ConfigPath::parse("a."), Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn test_get_path_reads_nested_list_items() {
        let base = fresh_baseline();
        let value = get_path(&base, &path("services.1.title"));
        assert_eq!(value, Some(&json!("Peças sob medida")));
    }

    #[test]
    fn test_get_path_returns_none_for_missing_or_scalar_parents() {
        let base = fresh_baseline();
        assert!(get_path(&base, &path("hero.nope")).is_none());
        assert!(get_path(&base, &path("hero.title.deeper")).is_none());
        assert!(get_path(&base, &path("services.99")).is_none());
    }

    #[test]
    fn test_set_path_overwrites_existing_leaf() {
        let mut cfg = fresh_baseline();
        set_path(&mut cfg, &path("hero.title"), json!("Nova luz")).expect("set");
        assert_eq!(cfg["hero"]["title"], "Nova luz");
    }

    #[test]
    fn test_set_path_creates_objects_and_lists() {
        // Arrange
        let mut cfg = json!({});

        // Act
        set_path(&mut cfg, &path("gallery.items.0.src"), json!("b.png")).expect("set");

        // Assert
        assert_eq!(cfg, json!({ "gallery": { "items": [{ "src": "b.png" }] } }));
    }

    #[test]
    fn test_set_path_appends_at_end_of_list() {
        let mut cfg = fresh_baseline();
        let len = cfg["services"].as_array().map_or(0, Vec::len);
        set_path(&mut cfg, &path(&format!("services.{len}")), json!("x")).expect("set");
        assert_eq!(cfg["services"][len], "x");
    }

    #[test]
    fn test_set_path_rejects_index_beyond_end() {
        // Arrange
        let mut cfg = fresh_baseline();
        let before = cfg.clone();
        let len = cfg["services"].as_array().map_or(0, Vec::len);

        // Act
        let far = set_path(&mut cfg, &path("services.4000000000000"), json!("x"));
        let max = set_path(&mut cfg, &path(&format!("services.{}", usize::MAX)), json!("x"));
        let gap = set_path(&mut cfg, &path(&format!("services.{}", len + 1)), json!("x"));

        // Assert
        assert!(matches!(far, Err(PathError::IndexOutOfRange { index: 4_000_000_000_000, .. })));
        assert!(matches!(max, Err(PathError::IndexOutOfRange { index: usize::MAX, .. })));
        assert_eq!(
            gap,
            Err(PathError::IndexOutOfRange {
                path: format!("services.{}", len + 1),
                index: len + 1,
                len,
            })
        );
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_set_path_rejects_out_of_range_intermediate_index() {
        let mut cfg = json!({ "items": [] });
        let err = set_path(&mut cfg, &path("items.5.title"), json!("x")).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfRange { len: 0, .. }));
        assert_eq!(cfg, json!({ "items": [] }));
    }

    #[test]
    fn test_set_path_rejects_descending_into_scalar() {
        let mut cfg = json!({ "hero": { "title": "T" } });
        let err = set_path(&mut cfg, &path("hero.title.text"), json!("x")).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer { .. }));
        assert_eq!(cfg["hero"]["title"], "T");
    }

    #[test]
    fn test_numeric_segment_on_object_uses_string_key() {
        let mut cfg = json!({ "map": {} });
        set_path(&mut cfg, &path("map.7"), json!(true)).expect("set");
        assert_eq!(cfg["map"]["7"], true);
        assert_eq!(get_path(&cfg, &path("map.7")), Some(&json!(true)));
    }

    #[test]
    fn test_template_item_is_first_baseline_element() {
        let template = template_item(&path("media.items")).expect("template");
        assert_eq!(template, baseline()["media"]["items"][0]);
        assert!(template_item(&path("hero.title")).is_none());
    }

    #[test]
    fn test_append_item_pushes_template_and_returns_index() {
        // Arrange
        let mut cfg = fresh_baseline();

        // Act
        let idx = append_item(&mut cfg, &path("process.steps")).expect("append");

        // Assert
        assert_eq!(idx, 3);
        assert_eq!(cfg["process"]["steps"][3], baseline()["process"]["steps"][0]);
    }

    #[test]
    fn test_append_item_creates_missing_list() {
        let mut cfg = json!({});
        let idx = append_item(&mut cfg, &path("projects.items")).expect("append");
        assert_eq!(idx, 0);
        assert_eq!(cfg["projects"]["items"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_append_item_rejects_non_list_target() {
        let mut cfg = json!({ "services": "none" });
        assert_eq!(
            append_item(&mut cfg, &path("services")),
            Err(PathError::NotAList("services".to_string()))
        );
    }

    #[test]
    fn test_remove_item_returns_removed_element() {
        // Arrange
        let mut cfg = fresh_baseline();
        let expected = cfg["media"]["items"][0].clone();
        let len = cfg["media"]["items"].as_array().map_or(0, Vec::len);

        // Act
        let removed = remove_item(&mut cfg, &path("media.items.0")).expect("remove");

        // Assert
        assert_eq!(removed, expected);
        assert_eq!(cfg["media"]["items"].as_array().map(Vec::len), Some(len - 1));
    }

    #[test]
    fn test_remove_item_rejects_bad_targets() {
        let mut cfg = fresh_baseline();
        assert!(matches!(
            remove_item(&mut cfg, &path("media.items.999")),
            Err(PathError::IndexOutOfRange { index: 999, .. })
        ));
        assert_eq!(
            remove_item(&mut cfg, &path("hero.title")),
            Err(PathError::NotAnElement("hero.title".to_string()))
        );
        assert!(matches!(
            remove_item(&mut cfg, &path("hero.0")),
            Err(PathError::NotAnElement(_))
        ));
        assert_eq!(&cfg, baseline());
    }

    #[test]
    fn test_append_item_without_template_fails() {
        let mut cfg = json!({});
        assert!(matches!(
            append_item(&mut cfg, &path("footer")),
            Err(PathError::NoTemplate(_))
        ));
    }
}
