/*!
# Field Finder

Searches a [`Value`] for every object key whose *name* satisfies a
[`KeyPredicate`], reporting the path to each such key together with the value
stored under it.

The search is a depth-first pre-order walk: object keys are visited in
document order and array elements by ascending index. A matching key does not
stop the descent, so a matching parent and its matching descendants are all
reported. Array indices are never tested against the predicate, and scalars
cannot match on their own.

```
use xtream_probe::finder::{find_fields, PathSegment, Substrings};
use xtream_probe::value::Value;

let doc = Value::try_from(r#"{"list": [{"audio": "ac3"}]}"#).unwrap();
let matches = find_fields(&doc, &Substrings::language());
assert_eq!(matches.len(), 1);
assert_eq!(
    matches[0].path,
    vec![PathSegment::field("list"), PathSegment::Index(0), PathSegment::field("audio")]
);
assert_eq!(matches[0].value.as_str(), Some("ac3"));
```
*/
use log::trace;
use regex::Regex;
use std::fmt;

use crate::value::Value;

/// One step from a parent value to a child value.
#[derive(Hash, PartialEq, Eq, Debug, Clone)]
pub enum PathSegment {
    /// An object key, e.g., "foo.bar"
    Field(String),
    /// An array index, e.g., "foo\[3\]"
    Index(usize),
}

impl PathSegment {
    /// Helper for ergonomic construction of field segments
    pub fn field<T: Into<String>>(name: T) -> Self {
        Self::Field(name.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// A key whose name satisfied the predicate, located by its path from the
/// searched root.
#[derive(PartialEq, Debug, Clone)]
pub struct Match<'a> {
    /// The path to the matched key, e.g., \["list", 0, "audio"\]
    pub path: Vec<PathSegment>,
    /// A reference to the value stored under the matched key
    pub value: &'a Value,
}

/// Decides whether an object key is relevant.
///
/// Any `Fn(&str) -> bool` is a predicate, so ad-hoc closures work directly:
///
/// ```
/// use xtream_probe::finder::find_fields;
/// use xtream_probe::value::Value;
///
/// let doc = Value::try_from(r#"{"Audio": 1, "audio": 2}"#).unwrap();
/// let exact = |key: &str| key == "audio";
/// assert_eq!(find_fields(&doc, &exact).len(), 1);
/// ```
pub trait KeyPredicate {
    /// Returns `true` when `key` should be reported.
    fn matches(&self, key: &str) -> bool;
}

impl<F> KeyPredicate for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, key: &str) -> bool {
        self(key)
    }
}

/// Matches keys containing any of a set of substrings.
#[derive(Debug, Clone)]
pub struct Substrings {
    needles: Vec<String>,
    case_sensitive: bool,
}

impl Substrings {
    /// The needles used when looking for audio/language metadata.
    pub const LANGUAGE_NEEDLES: [&'static str; 2] = ["lang", "audio"];

    /// Case-insensitive match against any of `needles`.
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_case(needles, false)
    }

    /// Match against any of `needles`, optionally respecting case.
    pub fn with_case<I, S>(needles: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let needles = needles
            .into_iter()
            .map(Into::into)
            .map(|n: String| if case_sensitive { n } else { n.to_lowercase() })
            .collect();
        Self {
            needles,
            case_sensitive,
        }
    }

    /// Keys that look like they describe audio tracks or languages.
    #[must_use]
    pub fn language() -> Self {
        Self::new(Self::LANGUAGE_NEEDLES)
    }
}

impl KeyPredicate for Substrings {
    fn matches(&self, key: &str) -> bool {
        if self.case_sensitive {
            self.needles.iter().any(|n| key.contains(n.as_str()))
        } else {
            let key = key.to_lowercase();
            self.needles.iter().any(|n| key.contains(n.as_str()))
        }
    }
}

/// Matches keys in which a regular expression finds a match.
#[derive(Debug, Clone)]
pub struct KeyRegex(pub Regex);

impl KeyPredicate for KeyRegex {
    fn matches(&self, key: &str) -> bool {
        self.0.is_match(key)
    }
}

/// Finds every object key in `root` accepted by `predicate`.
///
/// Returns the matches in depth-first, document-key-order, ascending-index
/// order. A scalar root, `{}` and `[]` all yield an empty result.
pub fn find_fields<'a, P>(root: &'a Value, predicate: &P) -> Vec<Match<'a>>
where
    P: KeyPredicate + ?Sized,
{
    let mut results = Vec::new();
    let mut path = Vec::new();
    walk(root, predicate, &mut path, &mut results);
    trace!("field search found {} match(es)", results.len());
    results
}

fn walk<'a, P>(
    value: &'a Value,
    predicate: &P,
    path: &mut Vec<PathSegment>,
    results: &mut Vec<Match<'a>>,
) where
    P: KeyPredicate + ?Sized,
{
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter() {
                path.push(PathSegment::field(key));
                if predicate.matches(key) {
                    results.push(Match {
                        path: path.clone(),
                        value: val,
                    });
                }
                walk(val, predicate, path, results);
                path.pop();
            }
        }
        Value::Array(vals) => {
            for (idx, val) in vals.iter().enumerate() {
                path.push(PathSegment::Index(idx));
                walk(val, predicate, path, results);
                path.pop();
            }
        }
        // Leaf nodes: nothing to descend into, and no key to test
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}
