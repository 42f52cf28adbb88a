use crate::{derive::Derivation, pattern::Pattern, value::Value};
use serde::{Deserialize, Serialize};

///
/// FieldKind
///
/// The shape of a field's value. `Digits` and `Count` hold numbers as text;
/// a `Count` field may drive the length of a sibling group.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[remain::sorted]
pub enum FieldKind {
    Attachment,
    Choice { options: Vec<String> },
    Count,
    Date,
    Digits,
    Flag,
    Text,
}

impl FieldKind {
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Count | Self::Digits)
    }

    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Attachment | Self::Choice { .. } | Self::Count | Self::Digits | Self::Text
        )
    }

    /// Whether a value of this shape may be stored in a field of this kind.
    #[must_use]
    pub const fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Empty => !matches!(self, Self::Flag),
            Value::Text(_) => self.is_textual(),
            Value::Flag(_) => matches!(self, Self::Flag),
            Value::Date(_) => matches!(self, Self::Date),
        }
    }

    /// Value a freshly created field starts with.
    #[must_use]
    pub const fn blank_value(&self) -> Value {
        match self {
            Self::Flag => Value::Flag(false),
            _ => Value::Empty,
        }
    }
}

///
/// Comparison
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
}

impl Comparison {
    #[must_use]
    pub fn holds<T: Ord>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::AtLeast => lhs >= rhs,
            Self::AtMost => lhs <= rhs,
        }
    }
}

///
/// Rule
///
/// A check applied to a field at submit time (and on change for live
/// fields). Rules other than `Required` only look at non-blank values.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
#[remain::sorted]
pub enum Rule {
    Compare {
        op: Comparison,
        sibling: String,
        message: String,
    },
    Min {
        value: i64,
        message: String,
    },
    Pattern {
        pattern: Pattern,
    },
    Required,
}

///
/// FieldSpec
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<Derivation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Evaluate rules on every change, not only at submit.
    #[serde(default)]
    pub live: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            rules: Vec::new(),
            derived: None,
            default: None,
            live: false,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    #[must_use]
    pub fn digits(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Digits)
    }

    #[must_use]
    pub fn count(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Count)
    }

    #[must_use]
    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    #[must_use]
    pub fn flag(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Flag)
    }

    #[must_use]
    pub fn attachment(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Attachment)
    }

    #[must_use]
    pub fn choice<I, S>(name: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();

        Self::new(name, label, FieldKind::Choice { options })
    }

    /// A read-only field computed from siblings in the same record.
    #[must_use]
    pub fn derived(
        name: impl Into<String>,
        label: impl Into<String>,
        derivation: Derivation,
    ) -> Self {
        let mut spec = Self::new(name, label, FieldKind::Digits);
        spec.derived = Some(derivation);

        spec
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.rules.push(Rule::Required);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.rules.push(Rule::Pattern { pattern });
        self
    }

    #[must_use]
    pub fn min(mut self, value: i64, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Min {
            value,
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub fn at_most(mut self, sibling: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Compare {
            op: Comparison::AtMost,
            sibling: sibling.into(),
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub fn at_least(mut self, sibling: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Compare {
            op: Comparison::AtLeast,
            sibling: sibling.into(),
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub const fn live(mut self) -> Self {
        self.live = true;
        self
    }

    #[must_use]
    pub const fn is_derived(&self) -> bool {
        self.derived.is_some()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required))
    }

    /// Initial value for a new record: the declared default, else the
    /// kind's blank value.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.blank_value())
    }
}
