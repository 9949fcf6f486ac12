//! Path segments, separators and path grammar.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// PathError is returned when a path string does not match the path grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path '{path}' for separator '{separator}'")]
    Invalid { path: String, separator: char },

    #[error("unsupported path separator '{0}', expected one of . # | :")]
    UnsupportedSeparator(char),
}

/// Separator is the single reserved character splitting path segments.
///
/// The candidate separators that are not active are ordinary key characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Separator {
    #[default]
    Dot,
    Hash,
    Pipe,
    Colon,
}

impl Separator {
    pub const ALL: [Separator; 4] = [
        Separator::Dot,
        Separator::Hash,
        Separator::Pipe,
        Separator::Colon,
    ];

    pub fn as_char(self) -> char {
        match self {
            Separator::Dot => '.',
            Separator::Hash => '#',
            Separator::Pipe => '|',
            Separator::Colon => ':',
        }
    }

    fn grammar(self) -> &'static Grammar {
        match self {
            Separator::Dot => &DOT,
            Separator::Hash => &HASH,
            Separator::Pipe => &PIPE,
            Separator::Colon => &COLON,
        }
    }
}

impl TryFrom<char> for Separator {
    type Error = PathError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Separator::ALL
            .into_iter()
            .find(|s| s.as_char() == c)
            .ok_or(PathError::UnsupportedSeparator(c))
    }
}

impl FromStr for Separator {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Separator::try_from(c),
            (Some(c), Some(_)) => Err(PathError::UnsupportedSeparator(c)),
            (None, _) => Err(PathError::UnsupportedSeparator(' ')),
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Compiled grammar for one active separator.
struct Grammar {
    valid: Regex,
    segment: Regex,
}

impl Grammar {
    fn new(sep: Separator) -> Self {
        let literal: String = Separator::ALL
            .iter()
            .filter(|s| **s != sep)
            .map(|s| regex::escape(&s.as_char().to_string()))
            .collect();
        let key = format!(r"[0-9a-zA-Z{}/_%-]+", literal);
        let sep = regex::escape(&sep.as_char().to_string());

        Grammar {
            valid: Regex::new(&format!(r"^(?:(?:\[-?\d+\]|{}){}?)+$", key, sep))
                .expect("path grammar is a valid regex"),
            segment: Regex::new(&format!(r"\[(-?\d+)\]|({})", key))
                .expect("path segment grammar is a valid regex"),
        }
    }
}

static DOT: Lazy<Grammar> = Lazy::new(|| Grammar::new(Separator::Dot));
static HASH: Lazy<Grammar> = Lazy::new(|| Grammar::new(Separator::Hash));
static PIPE: Lazy<Grammar> = Lazy::new(|| Grammar::new(Separator::Pipe));
static COLON: Lazy<Grammar> = Lazy::new(|| Grammar::new(Separator::Colon));

/// PathSegment represents one level of path navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence position; negative values count from the end.
    Index(i64),
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    pub fn index(i: i64) -> Self {
        PathSegment::Index(i)
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(name) => Some(name),
            PathSegment::Index(_) => None,
        }
    }

    /// Resolves this index segment against a sequence of `len` elements.
    ///
    /// Returns None for key segments and out of range indices.
    pub fn resolve_index(&self, len: usize) -> Option<usize> {
        match self {
            PathSegment::Index(i) => resolve_index(*i, len),
            PathSegment::Key(_) => None,
        }
    }
}

/// Parses a grammar-valid index. Magnitudes beyond `i64` saturate, which
/// keeps them out of range for any sequence.
fn parse_index(digits: &str) -> i64 {
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Maps a possibly negative index onto `0..len`.
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(name) => write!(f, "{}", name),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Path is a parsed path. An empty path denotes the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Creates the root path.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Path { segments }
    }

    /// Parses `path` using the grammar of the given active separator.
    pub fn parse(path: &str, sep: Separator) -> Result<Self, PathError> {
        if path.is_empty() {
            return Ok(Path::root());
        }

        let grammar = sep.grammar();
        if !grammar.valid.is_match(path) {
            return Err(PathError::Invalid {
                path: path.to_string(),
                separator: sep.as_char(),
            });
        }

        let segments = grammar
            .segment
            .captures_iter(path)
            .map(|caps| match (caps.get(1), caps.get(2)) {
                (Some(index), _) => Ok(PathSegment::Index(parse_index(index.as_str()))),
                (None, Some(key)) => Ok(PathSegment::key(key.as_str())),
                (None, None) => Err(PathError::Invalid {
                    path: path.to_string(),
                    separator: sep.as_char(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Path { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Splits the path into its parent segments and the final segment.
    pub fn split_last(&self) -> Option<(&PathSegment, &[PathSegment])> {
        self.segments.split_last()
    }

    /// Creates a new path with the given segment appended.
    pub fn with(&self, segment: PathSegment) -> Self {
        let mut new_path = self.clone();
        new_path.push(segment);
        new_path
    }

    pub fn as_slice(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<T: IntoIterator<Item = PathSegment>>(iter: T) -> Self {
        Path {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl Path {
    /// The first separator that appears in none of the keys, so the
    /// displayed path parses back to the same segments.
    pub fn display_separator(&self) -> Separator {
        Separator::ALL
            .into_iter()
            .find(|sep| {
                !self
                    .segments
                    .iter()
                    .filter_map(PathSegment::as_key)
                    .any(|key| key.contains(sep.as_char()))
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = self.display_separator();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, PathSegment::Key(_)) {
                write!(f, "{}", sep)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
