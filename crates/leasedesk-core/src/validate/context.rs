use crate::path::PathSegment;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

///
/// Issues
///
/// Messages grouped by rendered field path (`name`, `group.index.field`).
/// Ordered by path so reports are stable.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Issues(BTreeMap<String, Vec<String>>);

impl Issues {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of paths with at least one message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of messages across all paths.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> &[String] {
        self.0.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, messages)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{path}: {}", messages.join(", "))?;
        }

        Ok(())
    }
}

impl IntoIterator for Issues {
    type Item = (String, Vec<String>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

///
/// ValidateContext
///
/// Tracks the current path while walking a record (or schema) tree and
/// files messages under it. Walking never stops early; everything found is
/// returned by `finish`.
///

#[derive(Debug, Default)]
pub struct ValidateContext {
    path: Vec<PathSegment>,
    issues: Issues,
}

impl ValidateContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            path: Vec::new(),
            issues: Issues::new(),
        }
    }

    pub fn push(&mut self, seg: PathSegment) {
        self.path.push(seg);
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// File a message against the current path.
    pub fn issue(&mut self, message: impl Into<String>) {
        let key = render_path(&self.path, None);
        self.issues.add(key, message);
    }

    /// File a message against a named child of the current path.
    pub fn issue_at(&mut self, field: &str, message: impl Into<String>) {
        let key = render_path(&self.path, Some(field));
        self.issues.add(key, message);
    }

    #[must_use]
    pub fn finish(self) -> Issues {
        self.issues
    }
}

fn render_path(path: &[PathSegment], extra: Option<&str>) -> String {
    use std::fmt::Write;

    let mut out = String::new();

    for seg in path {
        if !out.is_empty() {
            out.push('.');
        }
        let _ = write!(out, "{seg}");
    }

    if let Some(field) = extra {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(field);
    }

    out
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_render_dotted_paths() {
        let mut ctx = ValidateContext::new();
        ctx.issue_at("firstName", "First Name is required");
        ctx.push(PathSegment::Field("tenantProperties".to_string()));
        ctx.push(PathSegment::Index(1));
        ctx.issue_at("filledRooms", "occupied cannot exceed total");
        ctx.pop();
        ctx.issue("group level");
        ctx.pop();

        let issues = ctx.finish();
        let paths: Vec<_> = issues.paths().collect();

        assert_eq!(
            paths,
            vec!["firstName", "tenantProperties", "tenantProperties.1.filledRooms"]
        );
        assert_eq!(issues.total(), 3);
    }

    #[test]
    fn messages_accumulate_per_path() {
        let mut issues = Issues::new();
        issues.add("email", "a");
        issues.add("email", "b");

        assert_eq!(issues.get("email"), ["a".to_string(), "b".to_string()]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.to_string(), "email: a, b");
    }
}
