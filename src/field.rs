//! Field paths and field-level validation errors.
//!
//! Mirrors the way the Kubernetes API server reports validation failures:
//! every violation is bound to a dotted path (`spec.upgradeStrategy`,
//! `template.spec.containers[0].name`) and carries a kind, the offending value
//! when there is one, and a human-readable detail.

use std::fmt;

/// A path to a field inside an object, e.g. `template.spec.containers[1].image`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Segment {
    Field(String),
    Index(usize),
    Key(String),
}

impl FieldPath {
    /// Create a root path.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Field(name.into())],
        }
    }

    /// Return a new path with `name` appended as a child field.
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.push(Segment::Field(name.into()))
    }

    /// Return a new path indexing into a list.
    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    /// Return a new path keying into a map.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.push(Segment::Key(key.into()))
    }

    fn push(&self, segment: Segment) -> Self {
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

/// Kind of a field violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A required field was empty or missing.
    Required,
    /// The value is not one of a fixed set of supported values.
    NotSupported,
    /// The value is malformed or out of range.
    Invalid,
}

impl ErrorType {
    /// Human-readable prefix used when rendering an error.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Required => "Required value",
            ErrorType::NotSupported => "Unsupported value",
            ErrorType::Invalid => "Invalid value",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation at one field path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: FieldPath,
    pub kind: ErrorType,
    /// The offending value, already rendered.
    pub bad_value: Option<String>,
    /// Supported values, only set for [`ErrorType::NotSupported`].
    pub supported: Vec<String>,
    pub detail: String,
}

impl FieldError {
    pub fn required(path: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            path,
            kind: ErrorType::Required,
            bad_value: None,
            supported: Vec::new(),
            detail: detail.into(),
        }
    }

    pub fn not_supported<S: AsRef<str>>(
        path: FieldPath,
        bad_value: impl Into<String>,
        supported: &[S],
    ) -> Self {
        Self {
            path,
            kind: ErrorType::NotSupported,
            bad_value: Some(bad_value.into()),
            supported: supported.iter().map(|s| s.as_ref().to_string()).collect(),
            detail: String::new(),
        }
    }

    pub fn invalid(
        path: FieldPath,
        bad_value: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            path,
            kind: ErrorType::Invalid,
            bad_value: Some(bad_value.into()),
            supported: Vec::new(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)?;
        if let Some(value) = &self.bad_value {
            write!(f, ": {:?}", value)?;
        }
        if !self.supported.is_empty() {
            let quoted: Vec<String> = self.supported.iter().map(|s| format!("{:?}", s)).collect();
            write!(f, ": supported values: {}", quoted.join(", "))?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered list of field violations.
pub type ErrorList = Vec<FieldError>;

/// Render an error list as the API server does in an `Invalid` status message.
pub fn aggregate(errors: &[FieldError]) -> String {
    match errors {
        [] => String::new(),
        [single] => single.to_string(),
        many => {
            let rendered: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}
