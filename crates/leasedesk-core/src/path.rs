use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// PathError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    #[error("empty field path")]
    Empty,

    #[error("empty segment in field path '{path}'")]
    EmptySegment { path: String },

    #[error("field path '{path}' must alternate names and row indices, ending in a name")]
    Shape { path: String },
}

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

///
/// FieldPath
///
/// Address of a field or group inside a record: `name`, `group.index.field`,
/// and so on through nested groups (`rooms.0.roommates.1.name`).
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment {
                        path: s.to_string(),
                    })
                } else if seg.bytes().all(|b| b.is_ascii_digit()) {
                    seg.parse::<usize>()
                        .map(PathSegment::Index)
                        .map_err(|_| PathError::Shape {
                            path: s.to_string(),
                        })
                } else {
                    Ok(PathSegment::Field(seg.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));

        Self { segments }
    }

    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(i));

        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split into `(group, row)` steps and the trailing name.
    pub(crate) fn steps(&self) -> Result<(Vec<(&str, usize)>, &str), PathError> {
        let shape_err = || PathError::Shape {
            path: self.to_string(),
        };

        let Some((PathSegment::Field(leaf), prefix)) = self.segments.split_last() else {
            return Err(if self.segments.is_empty() {
                PathError::Empty
            } else {
                shape_err()
            });
        };

        let mut steps = Vec::with_capacity(prefix.len() / 2);
        for pair in prefix.chunks(2) {
            match pair {
                [PathSegment::Field(group), PathSegment::Index(i)] => {
                    steps.push((group.as_str(), *i));
                }
                _ => return Err(shape_err()),
            }
        }

        Ok((steps, leaf.as_str()))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }

        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        Self::parse(&s).map_err(de::Error::custom)
    }
}

///
/// TESTS
///
