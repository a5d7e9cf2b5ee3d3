//! Typed dotted field paths into the draft.
//!
//! Paths are parsed once at the call boundary (`basicInfo.email`,
//! `professionalInfo.qualifications[0].degree`) into typed segments; all
//! draft reads and writes then walk segments, never raw strings.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A parsed dotted path, e.g. `personalInfo.address.city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("field path is empty")]
    Empty,
    #[error("field path must start with a section key")]
    MissingSection,
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated '[' segment")]
    UnterminatedIndex,
    #[error("invalid list index '{0}'")]
    InvalidIndex(String),
}

impl FieldPath {
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(PathParseError::Empty);
        }

        let chars: Vec<char> = raw.chars().collect();
        let mut idx = 0usize;
        let mut segments = Vec::new();

        while idx < chars.len() {
            match chars[idx] {
                '.' => {
                    if segments.is_empty() {
                        return Err(PathParseError::UnexpectedChar('.', idx));
                    }
                    idx += 1;
                    segments.push(PathSegment::Key(parse_key(&chars, &mut idx)?));
                }
                '[' => {
                    if segments.is_empty() {
                        return Err(PathParseError::MissingSection);
                    }
                    idx += 1;
                    let start = idx;
                    while idx < chars.len() && chars[idx] != ']' {
                        idx += 1;
                    }
                    if idx >= chars.len() {
                        return Err(PathParseError::UnterminatedIndex);
                    }
                    let digits: String = chars[start..idx].iter().collect();
                    idx += 1; // consume ']'
                    let index = digits
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| PathParseError::InvalidIndex(digits.clone()))?;
                    segments.push(PathSegment::Index(index));
                }
                ch if segments.is_empty() => {
                    if ch == ']' {
                        return Err(PathParseError::UnexpectedChar(ch, idx));
                    }
                    segments.push(PathSegment::Key(parse_key(&chars, &mut idx)?));
                }
                ch => return Err(PathParseError::UnexpectedChar(ch, idx)),
            }
        }

        // The first segment names the draft section and must be a key
        match segments.first() {
            Some(PathSegment::Key(_)) => Ok(Self { segments }),
            _ => Err(PathParseError::MissingSection),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The leading section key.
    pub fn section_key(&self) -> &str {
        match &self.segments[0] {
            PathSegment::Key(key) => key,
            PathSegment::Index(_) => unreachable!("parse rejects leading index"),
        }
    }

    /// Segments below the section key.
    pub fn within_section(&self) -> &[PathSegment] {
        &self.segments[1..]
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Read the value at `segments`, if present.
pub fn get_value<'a>(root: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match segment {
            PathSegment::Key(key) => current.as_object()?.get(key)?,
            PathSegment::Index(index) => current.as_array()?.get(*index)?,
        };
    }
    Some(current)
}

/// Set the value at `segments`, creating intermediate objects and lists.
///
/// A non-container value in the middle of the path is replaced by the
/// container the next segment needs; list writes past the end pad with null.
pub fn set_value(root: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for (idx, segment) in parents.iter().enumerate() {
        let next = segments.get(idx + 1);
        match segment {
            PathSegment::Key(key) => {
                if !current.is_object() {
                    *current = Value::Object(Map::new());
                }
                let map = current.as_object_mut().expect("object ensured above");
                current = map
                    .entry(key.clone())
                    .or_insert_with(|| container_for(next));
            }
            PathSegment::Index(index) => {
                if !current.is_array() {
                    *current = Value::Array(Vec::new());
                }
                let list = current.as_array_mut().expect("array ensured above");
                if list.len() <= *index {
                    list.resize(*index + 1, Value::Null);
                }
                if list[*index].is_null() {
                    list[*index] = container_for(next);
                }
                current = &mut list[*index];
            }
        }
    }

    match last {
        PathSegment::Key(key) => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            if let Some(map) = current.as_object_mut() {
                map.insert(key.clone(), value);
            }
        }
        PathSegment::Index(index) => {
            if !current.is_array() {
                *current = Value::Array(Vec::new());
            }
            if let Some(list) = current.as_array_mut() {
                if list.len() <= *index {
                    list.resize(*index + 1, Value::Null);
                }
                list[*index] = value;
            }
        }
    }
}

/// Remove the leaf at `segments` (drop the key from its parent object, or
/// null out a list slot). No-op when the path does not resolve.
pub fn remove_value(root: &mut Value, segments: &[PathSegment]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = match segment {
            PathSegment::Key(key) => match current.as_object_mut().and_then(|m| m.get_mut(key)) {
                Some(v) => v,
                None => return,
            },
            PathSegment::Index(index) => {
                match current.as_array_mut().and_then(|l| l.get_mut(*index)) {
                    Some(v) => v,
                    None => return,
                }
            }
        };
    }

    match last {
        PathSegment::Key(key) => {
            if let Some(map) = current.as_object_mut() {
                map.remove(key);
            }
        }
        PathSegment::Index(index) => {
            if let Some(slot) = current.as_array_mut().and_then(|l| l.get_mut(*index)) {
                *slot = Value::Null;
            }
        }
    }
}

/// Consume a key segment: characters up to the next `.` or `[`. A stray
/// `]` or an empty key is malformed.
fn parse_key(chars: &[char], idx: &mut usize) -> Result<String, PathParseError> {
    let start = *idx;
    while *idx < chars.len() && chars[*idx] != '.' && chars[*idx] != '[' {
        if chars[*idx] == ']' {
            return Err(PathParseError::UnexpectedChar(']', *idx));
        }
        *idx += 1;
    }
    if *idx == start {
        let ch = chars.get(*idx).copied().unwrap_or('.');
        return Err(PathParseError::UnexpectedChar(ch, *idx));
    }
    Ok(chars[start..*idx].iter().collect())
}

fn container_for(next: Option<&PathSegment>) -> Value {
    match next {
        Some(PathSegment::Index(_)) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}
