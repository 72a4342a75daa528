use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Key under which `validator` stores schema-level (whole object) errors
const OBJECT_ERRORS_KEY: &str = "__all__";

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldValidationError {
    /// Offending field; `None` when the error applies to the whole input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Default message describing the failure
    pub message: String,
}

impl FieldValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn object(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn is_field_error(&self) -> bool {
        self.field.is_some()
    }

    /// `"<field>: <message>"` for field errors, the bare message otherwise
    pub fn client_message(&self) -> String {
        match &self.field {
            Some(field) => format!("{}: {}", field, self.message),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.client_message())
    }
}

/// Ordered list of validation failures for one bound input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationResult {
    pub errors: Vec<FieldValidationError>,
}

impl ValidationResult {
    pub fn new(errors: Vec<FieldValidationError>) -> Self {
        Self { errors }
    }

    pub fn first(&self) -> Option<&FieldValidationError> {
        self.errors.first()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.errors.iter();
        match iter.next() {
            Some(first) => write!(f, "{}", first)?,
            None => return f.write_str("validation failed"),
        }
        for err in iter {
            write!(f, "; {}", err)?;
        }
        Ok(())
    }
}

fn default_message(err: &validator::ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}

/// Walk `errors` in key order, naming nested fields `parent.child` and list
/// items `parent[i]`. Only the top-level `__all__` entries stay object errors.
fn collect(
    errors: &validator::ValidationErrors,
    prefix: Option<&str>,
    object_errors: &mut Vec<FieldValidationError>,
    field_errors: &mut Vec<FieldValidationError>,
) {
    let mut entries: Vec<(String, &validator::ValidationErrorsKind)> = errors
        .errors()
        .iter()
        .map(|(key, kind)| (key.to_string(), kind))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, kind) in entries {
        let path = match (prefix, key == OBJECT_ERRORS_KEY) {
            (None, true) => None,
            (Some(prefix), true) => Some(prefix.to_string()),
            (None, false) => Some(key),
            (Some(prefix), false) => Some(format!("{}.{}", prefix, key)),
        };

        match kind {
            validator::ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = default_message(err);
                    match &path {
                        Some(path) => field_errors.push(FieldValidationError::field(path, message)),
                        None => object_errors.push(FieldValidationError::object(message)),
                    }
                }
            }
            validator::ValidationErrorsKind::Struct(inner) => {
                collect(inner, path.as_deref(), object_errors, field_errors);
            }
            validator::ValidationErrorsKind::List(items) => {
                let base = path.unwrap_or_default();
                for (index, inner) in items {
                    let item_path = format!("{}[{}]", base, index);
                    collect(inner, Some(&item_path), object_errors, field_errors);
                }
            }
        }
    }
}

/// Object-level errors first, then field errors ordered by field path.
impl From<&validator::ValidationErrors> for ValidationResult {
    fn from(errors: &validator::ValidationErrors) -> Self {
        let mut object_errors = Vec::new();
        let mut field_errors = Vec::new();
        collect(errors, None, &mut object_errors, &mut field_errors);

        object_errors.extend(field_errors);
        Self::new(object_errors)
    }
}

impl From<validator::ValidationErrors> for ValidationResult {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::from(&errors)
    }
}
