//! Structural comparison under a skip-set.

use crate::path::{Path, PathSegment};
use crate::value::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// SkipKeys is the set of keys ignored at every level of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipKeys {
    keys: BTreeSet<String>,
}

impl SkipKeys {
    /// Creates an empty skip-set.
    pub fn new() -> Self {
        SkipKeys {
            keys: BTreeSet::new(),
        }
    }

    /// Keys populated by the cluster on every object: `metadata` and `status`.
    pub fn server_populated() -> Self {
        SkipKeys::new().with(["metadata", "status"])
    }

    /// Returns the set extended with `keys`.
    pub fn with<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.keys.iter()
    }

    fn retain<'a>(&self, map: &'a Map) -> BTreeSet<&'a str> {
        map.keys()
            .map(String::as_str)
            .filter(|k| !self.contains(k))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipKeys {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        SkipKeys::new().with(iter)
    }
}

/// Why two documents were found to differ.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    /// The desired document does not have the key.
    MissingKey,
    /// Both sides have the key with different value kinds.
    TypeMismatch {
        desired: &'static str,
        observed: &'static str,
    },
    /// Lists of different lengths.
    LengthMismatch { desired: usize, observed: usize },
    /// Nested maps whose non-skipped keys differ.
    KeySetMismatch {
        only_desired: Vec<String>,
        only_observed: Vec<String>,
    },
    /// Scalars or list elements that are not equal.
    ValueMismatch { desired: Value, observed: Value },
}

/// Mismatch is the first difference found by [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub path: Path,
    pub reason: MismatchReason,
}

impl Mismatch {
    fn new(path: Path, reason: MismatchReason) -> Self {
        Mismatch { path, reason }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.path.is_root() {
            "<root>".to_string()
        } else {
            self.path.to_string()
        };
        match &self.reason {
            MismatchReason::MissingKey => write!(f, "{}: missing from desired document", at),
            MismatchReason::TypeMismatch { desired, observed } => {
                write!(f, "{}: desired is {}, observed is {}", at, desired, observed)
            }
            MismatchReason::LengthMismatch { desired, observed } => write!(
                f,
                "{}: list lengths differ (desired {}, observed {})",
                at, desired, observed
            ),
            MismatchReason::KeySetMismatch {
                only_desired,
                only_observed,
            } => write!(
                f,
                "{}: keys differ (only desired: {:?}, only observed: {:?})",
                at, only_desired, only_observed
            ),
            MismatchReason::ValueMismatch { desired, observed } => {
                write!(f, "{}: {} != {}", at, desired, observed)
            }
        }
    }
}

/// Compares `desired` against `observed`, returning the first mismatch.
///
/// Only keys of `observed` are visited. Lists must agree in length and order;
/// map/map element pairs are compared recursively and other pairs must be
/// equal. Nested maps must have the same keys once skipped keys are removed.
/// Top-level keys that exist only in `desired` are not reported.
pub fn compare(desired: &Value, observed: &Value, skip: &SkipKeys) -> Result<(), Mismatch> {
    match (desired, observed) {
        (Value::Map(d), Value::Map(o)) => compare_maps(d, o, skip, &Path::root()),
        (_, Value::Map(_)) => Err(Mismatch::new(
            Path::root(),
            MismatchReason::TypeMismatch {
                desired: desired.type_name(),
                observed: observed.type_name(),
            },
        )),
        _ if desired == observed => Ok(()),
        _ => Err(Mismatch::new(
            Path::root(),
            MismatchReason::ValueMismatch {
                desired: desired.clone(),
                observed: observed.clone(),
            },
        )),
    }
}

/// Returns true when `desired` and `observed` agree outside of `skip`.
pub fn equal_under_skip(desired: &Value, observed: &Value, skip: &SkipKeys) -> bool {
    match compare(desired, observed, skip) {
        Ok(()) => true,
        Err(mismatch) => {
            debug!(%mismatch, "documents differ");
            false
        }
    }
}

fn compare_maps(
    desired: &Map,
    observed: &Map,
    skip: &SkipKeys,
    path: &Path,
) -> Result<(), Mismatch> {
    for (key, observed_value) in observed.iter() {
        if skip.contains(key) {
            continue;
        }

        let at = path.with(PathSegment::key(key.as_str()));
        let Some(desired_value) = desired.get(key) else {
            return Err(Mismatch::new(at, MismatchReason::MissingKey));
        };

        match (desired_value, observed_value) {
            (Value::List(d), Value::List(o)) => compare_lists(d, o, skip, &at)?,
            (Value::Map(d), Value::Map(o)) => {
                let desired_keys = skip.retain(d);
                let observed_keys = skip.retain(o);
                if desired_keys != observed_keys {
                    return Err(Mismatch::new(
                        at,
                        MismatchReason::KeySetMismatch {
                            only_desired: desired_keys
                                .difference(&observed_keys)
                                .map(|k| k.to_string())
                                .collect(),
                            only_observed: observed_keys
                                .difference(&desired_keys)
                                .map(|k| k.to_string())
                                .collect(),
                        },
                    ));
                }
                compare_maps(d, o, skip, &at)?;
            }
            (d, o @ (Value::List(_) | Value::Map(_))) => {
                return Err(Mismatch::new(
                    at,
                    MismatchReason::TypeMismatch {
                        desired: d.type_name(),
                        observed: o.type_name(),
                    },
                ));
            }
            (d, o) if d != o => {
                return Err(Mismatch::new(
                    at,
                    MismatchReason::ValueMismatch {
                        desired: d.clone(),
                        observed: o.clone(),
                    },
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn compare_lists(
    desired: &[Value],
    observed: &[Value],
    skip: &SkipKeys,
    path: &Path,
) -> Result<(), Mismatch> {
    if desired.len() != observed.len() {
        return Err(Mismatch::new(
            path.clone(),
            MismatchReason::LengthMismatch {
                desired: desired.len(),
                observed: observed.len(),
            },
        ));
    }

    for (i, (d, o)) in desired.iter().zip(observed).enumerate() {
        match (d, o) {
            (Value::Map(dm), Value::Map(om)) => {
                let at = path.with(PathSegment::index(i as i64));
                compare_maps(dm, om, skip, &at)?;
            }
            _ if d != o => {
                return Err(Mismatch::new(
                    path.with(PathSegment::index(i as i64)),
                    MismatchReason::ValueMismatch {
                        desired: d.clone(),
                        observed: o.clone(),
                    },
                ));
            }
            _ => {}
        }
    }
    Ok(())
}
