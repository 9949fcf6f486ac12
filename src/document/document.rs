//! Document implementation.

use super::error::DocumentError;
use crate::path::{resolve_index, Path, PathError, PathSegment, Separator};
use crate::value::{self, Map, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path as FsPath, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// ContentType selects the on-disk encoding of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Yaml,
    Json,
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yaml" | "yml" => Ok(ContentType::Yaml),
            "json" => Ok(ContentType::Json),
            other => Err(format!("unknown content type '{}'", other)),
        }
    }
}

/// Document is an owned value tree addressable through textual paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
    separator: Separator,
    filename: Option<PathBuf>,
    content_type: ContentType,
    backup: bool,
}

impl Default for Document {
    fn default() -> Self {
        Document::new(Value::Null)
    }
}

impl Document {
    /// Creates an in-memory document. A null root becomes an empty map.
    pub fn new(root: Value) -> Self {
        let root = if root.is_null() {
            Value::Map(Map::new())
        } else {
            root
        };
        Document {
            root,
            separator: Separator::default(),
            filename: None,
            content_type: ContentType::default(),
            backup: false,
        }
    }

    /// Parses a YAML string into a document.
    pub fn from_yaml(yaml: &str) -> Result<Self, DocumentError> {
        Ok(Document::new(value::from_yaml(yaml)?))
    }

    /// Parses a JSON string into a document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(Document::new(value::from_json(json)?))
    }

    /// Loads a document backed by a file. A missing or empty file yields an
    /// empty map that will be created on [`Document::write`].
    pub fn open(
        path: impl Into<PathBuf>,
        content_type: ContentType,
    ) -> Result<Self, DocumentError> {
        let filename = path.into();
        let root = match fs::read_to_string(&filename) {
            Ok(contents) if contents.trim().is_empty() => Value::Null,
            Ok(contents) => match content_type {
                ContentType::Yaml => value::from_yaml(&contents)?,
                ContentType::Json => value::from_json(&contents)?,
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Value::Null,
            Err(e) => return Err(DocumentError::io(filename, e)),
        };

        let mut doc = Document::new(root);
        doc.filename = Some(filename);
        doc.content_type = content_type;
        Ok(doc)
    }

    /// Sets the active path separator.
    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    /// Requests a `.orig` copy of the previous file contents on write.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Attaches a backing file without reading it.
    pub fn with_filename(
        mut self,
        filename: impl Into<PathBuf>,
        content_type: ContentType,
    ) -> Self {
        self.filename = Some(filename.into());
        self.content_type = content_type;
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn filename(&self) -> Option<&FsPath> {
        self.filename.as_deref()
    }

    /// Parses a path with this document's separator.
    pub fn parse_path(&self, path: &str) -> Result<Path, PathError> {
        Path::parse(path, self.separator)
    }

    /// Returns the value at `path`, or None if any segment does not resolve.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, DocumentError> {
        let parsed = self.parse_path(path)?;
        Ok(lookup(&self.root, parsed.as_slice()))
    }

    /// Sets `path` to `value`, creating intermediate maps as needed.
    ///
    /// The edit is applied to a copy of the tree which replaces the root only
    /// on success. Returns false when the value is already present or the path
    /// cannot be created.
    pub fn put(&mut self, path: &str, value: Value) -> Result<bool, DocumentError> {
        let parsed = self.parse_path(path)?;
        Ok(self.put_at(&parsed, value))
    }

    fn put_at(&mut self, path: &Path, value: Value) -> bool {
        if lookup(&self.root, path.as_slice()) == Some(&value) {
            return false;
        }

        let mut copy = self.root.clone();
        if !add_entry(&mut copy, path, value) {
            debug!(path = %path, "put could not resolve path");
            return false;
        }

        self.root = copy;
        true
    }

    /// Like [`Document::put`], but only while the backing file does not exist.
    pub fn create(&mut self, path: &str, value: Value) -> Result<bool, DocumentError> {
        if self.filename.as_deref().is_some_and(FsPath::exists) {
            return Ok(false);
        }
        self.put(path, value)
    }

    /// Removes the entry at `path`. The root path clears the whole container.
    pub fn remove(&mut self, path: &str) -> Result<bool, DocumentError> {
        let parsed = self.parse_path(path)?;

        let Some((last, parents)) = parsed.split_last() else {
            return Ok(match &mut self.root {
                Value::Map(map) => {
                    map.clear();
                    true
                }
                Value::List(list) => {
                    list.clear();
                    true
                }
                _ => false,
            });
        };

        let Some(parent) = lookup_mut(&mut self.root, parents) else {
            return Ok(false);
        };

        Ok(match (parent, last) {
            (Value::Map(map), PathSegment::Key(key)) => map.delete(key).is_some(),
            (Value::List(list), PathSegment::Index(i)) => match resolve_index(*i, list.len()) {
                Some(idx) => {
                    list.remove(idx);
                    true
                }
                None => false,
            },
            _ => false,
        })
    }

    /// Removes a key from the map at `path`, or the first equal element from
    /// the list at `path`.
    pub fn pop(&mut self, path: &str, key_or_item: &Value) -> Result<bool, DocumentError> {
        let parsed = self.parse_path(path)?;

        Ok(match lookup_mut(&mut self.root, parsed.as_slice()) {
            Some(Value::Map(map)) => key_or_item
                .as_str()
                .is_some_and(|key| map.delete(key).is_some()),
            Some(Value::List(list)) => match list.iter().position(|v| v == key_or_item) {
                Some(idx) => {
                    list.remove(idx);
                    true
                }
                None => false,
            },
            _ => false,
        })
    }

    /// Appends `value` to the list at `path`, creating an empty list first when
    /// nothing is there. No deduplication is done.
    pub fn append(&mut self, path: &str, value: Value) -> Result<bool, DocumentError> {
        let parsed = self.parse_path(path)?;

        if matches!(lookup(&self.root, parsed.as_slice()), None | Some(Value::Null)) {
            self.put_at(&parsed, Value::List(Vec::new()));
        }

        match lookup_mut(&mut self.root, parsed.as_slice()) {
            Some(Value::List(list)) => {
                list.push(value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Ensures `value` is present at `path`.
    ///
    /// A map target is shallow-merged with `value`, which must itself be a map.
    /// For a list target the element to replace is located by `curr_value`,
    /// then by `index`; failing both, `value` is appended unless an equal
    /// element is already there.
    pub fn update(
        &mut self,
        path: &str,
        value: Value,
        index: Option<i64>,
        curr_value: Option<&Value>,
    ) -> Result<bool, DocumentError> {
        let parsed = self.parse_path(path)?;

        let Some(entry) = lookup_mut(&mut self.root, parsed.as_slice()) else {
            return Ok(false);
        };

        match entry {
            Value::Map(map) => match value {
                Value::Map(incoming) => {
                    map.extend(incoming);
                    Ok(true)
                }
                other => Err(DocumentError::type_mismatch(path, "map", other.type_name())),
            },
            Value::List(list) => {
                let position = match (curr_value, index) {
                    (Some(current), _) => match list.iter().position(|v| v == current) {
                        Some(idx) => Some(idx),
                        None => return Ok(false),
                    },
                    (None, Some(i)) => Some(resolve_index(i, list.len()).ok_or_else(|| {
                        DocumentError::IndexOutOfRange {
                            path: path.to_string(),
                            index: i,
                            len: list.len(),
                        }
                    })?),
                    (None, None) => None,
                };

                if let Some(idx) = position {
                    if list[idx] != value {
                        list[idx] = value;
                        return Ok(true);
                    }
                }

                if list.contains(&value) {
                    Ok(false)
                } else {
                    list.push(value);
                    Ok(true)
                }
            }
            _ => Ok(false),
        }
    }

    /// Checks whether `value` is present at `path`.
    ///
    /// Lists test membership. Maps compare every entry of a map `value`
    /// against the target, or test key membership for a string `value`.
    /// Anything else is compared directly.
    pub fn exists(&self, path: &str, value: &Value) -> Result<bool, DocumentError> {
        let parsed = self.parse_path(path)?;

        Ok(match lookup(&self.root, parsed.as_slice()) {
            None => false,
            Some(Value::List(list)) => list.contains(value),
            Some(Value::Map(map)) => match value {
                Value::Map(wanted) => wanted.iter().all(|(k, v)| map.get(k) == Some(v)),
                Value::String(key) => map.has(key),
                _ => false,
            },
            Some(entry) => entry == value,
        })
    }

    /// Serializes the document in its content type.
    pub fn serialize(&self) -> Result<String, DocumentError> {
        match self.content_type {
            ContentType::Yaml => Ok(value::to_yaml(&self.root)?),
            ContentType::Json => Ok(serde_json::to_string_pretty(&self.root)?),
        }
    }

    /// Writes the document to its backing file.
    ///
    /// Contents go to a `.yedit` sibling first and are renamed over the target.
    pub fn write(&self) -> Result<(), DocumentError> {
        let filename = self.filename.as_deref().ok_or(DocumentError::MissingFilename)?;

        if self.backup && filename.exists() {
            let backup = with_suffix(filename, ".orig");
            fs::copy(filename, &backup).map_err(|e| DocumentError::io(&backup, e))?;
        }

        let contents = self.serialize()?;
        let tmp = with_suffix(filename, ".yedit");
        fs::write(&tmp, contents).map_err(|e| DocumentError::io(&tmp, e))?;
        fs::rename(&tmp, filename).map_err(|e| DocumentError::io(filename, e))?;
        Ok(())
    }
}

fn with_suffix(path: &FsPath, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Walks `segments` from `node` without modifying anything.
pub fn lookup<'a>(node: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    segments.iter().try_fold(node, |node, segment| match (node, segment) {
        (Value::Map(map), PathSegment::Key(key)) => map.get(key),
        (Value::List(list), PathSegment::Index(i)) => {
            resolve_index(*i, list.len()).and_then(|idx| list.get(idx))
        }
        _ => None,
    })
}

fn lookup_mut<'a>(mut node: &'a mut Value, segments: &[PathSegment]) -> Option<&'a mut Value> {
    for segment in segments {
        node = match (node, segment) {
            (Value::Map(map), PathSegment::Key(key)) => map.get_mut(key)?,
            (Value::List(list), PathSegment::Index(i)) => {
                let idx = resolve_index(*i, list.len())?;
                list.get_mut(idx)?
            }
            _ => return None,
        };
    }
    Some(node)
}

/// Steps into `segment`, turning a missing or null map entry into an empty map.
fn vivify<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Map(map), PathSegment::Key(key)) => {
            let entry = map.fields.entry(key.clone()).or_insert(Value::Null);
            if entry.is_null() {
                *entry = Value::Map(Map::new());
            }
            Some(entry)
        }
        (Value::List(list), PathSegment::Index(i)) => {
            let idx = resolve_index(*i, list.len())?;
            list.get_mut(idx)
        }
        _ => None,
    }
}

/// Stores `item` at `path` below `root`. Index segments never append.
fn add_entry(root: &mut Value, path: &Path, item: Value) -> bool {
    let Some((last, parents)) = path.split_last() else {
        *root = item;
        return true;
    };

    let mut node = root;
    for segment in parents {
        node = match vivify(node, segment) {
            Some(next) => next,
            None => return false,
        };
    }

    match (node, last) {
        (Value::Map(map), PathSegment::Key(key)) => {
            map.set(key.clone(), item);
            true
        }
        (Value::List(list), PathSegment::Index(i)) => match resolve_index(*i, list.len()) {
            Some(idx) => {
                list[idx] = item;
                true
            }
            None => false,
        },
        _ => false,
    }
}
