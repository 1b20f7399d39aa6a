//! Field paths and accumulated validation errors.
//!
//! Validators never stop at the first problem. Each check returns an
//! [`ErrorList`] and callers merge the lists they receive, so a rejected
//! resource reports every violation at once, each pinned to the exact field
//! that caused it.

use std::fmt;

use serde_json::Value;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Key(String),
}

/// Location of a field inside a resource, e.g. `spec.webhooks[2].timeout`.
///
/// Paths are immutable; [`child`](FieldPath::child), [`index`](FieldPath::index)
/// and [`key`](FieldPath::key) return new paths and leave `self` untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Create a root path
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Field(root.into())],
        }
    }

    /// Path to a named field below this one
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(Segment::Field(name.into()))
    }

    /// Path to a list element
    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    /// Path to a map entry
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(Segment::Key(key.into()))
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Key(key) => write!(f, "[{}]", key)?,
            }
        }
        Ok(())
    }
}

/// Kind of validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The value fails a semantic constraint (range, format, policy)
    Invalid,
    /// The value is outside a fixed enumeration
    NotSupported,
    /// The value collides with another entry in the same list
    Duplicate,
    /// A mandatory field, or one-of group, is absent
    Required,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::Invalid => "Invalid value",
            ErrorType::NotSupported => "Unsupported value",
            ErrorType::Duplicate => "Duplicate value",
            ErrorType::Required => "Required value",
        };
        write!(f, "{}", s)
    }
}

/// A single violation.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: FieldPath,
    /// The offending value, `Null` when the field is absent
    pub bad_value: Value,
    pub detail: String,
}

impl FieldError {
    /// The value fails a semantic constraint
    pub fn invalid(field: FieldPath, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self {
            error_type: ErrorType::Invalid,
            field,
            bad_value: value.into(),
            detail: detail.into(),
        }
    }

    /// The value is not one of `supported`
    pub fn not_supported<S: AsRef<str>>(
        field: FieldPath,
        value: impl Into<Value>,
        supported: &[S],
    ) -> Self {
        let quoted: Vec<String> = supported
            .iter()
            .map(|s| format!("{:?}", s.as_ref()))
            .collect();
        Self {
            error_type: ErrorType::NotSupported,
            field,
            bad_value: value.into(),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }

    /// The value repeats an earlier entry
    pub fn duplicate(field: FieldPath, value: impl Into<Value>) -> Self {
        Self {
            error_type: ErrorType::Duplicate,
            field,
            bad_value: value.into(),
            detail: String::new(),
        }
    }

    /// The field is missing
    pub fn required(field: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            error_type: ErrorType::Required,
            field,
            bad_value: Value::Null,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_type)?;
        match self.error_type {
            ErrorType::Required => {}
            _ => write!(f, ": {}", self.bad_value)?,
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered, append-only collection of violations. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one violation
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Append every violation of `other`, keeping its order
    pub fn merge(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Violations of one kind
    pub fn of_type(&self, error_type: ErrorType) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |e| e.error_type == error_type)
    }

    /// Single-line message combining every violation, as shown to API clients
    pub fn to_aggregate_message(&self) -> String {
        match self.0.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            all => {
                let joined: Vec<String> = all.iter().map(ToString::to_string).collect();
                format!("[{}]", joined.join(", "))
            }
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_aggregate_message())
    }
}

impl From<FieldError> for ErrorList {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl Extend<FieldError> for ErrorList {
    fn extend<T: IntoIterator<Item = FieldError>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
