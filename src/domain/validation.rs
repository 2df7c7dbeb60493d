use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    PageSizeOutOfRange {
        min: usize,
        max: usize,
        actual: usize,
    },
    InvalidPageSize {
        input: String,
    },
    MissingPathField {
        kind: &'static str,
        field: String,
    },
    InvalidPathField {
        kind: &'static str,
        field: String,
    },
    MissingEnvVar {
        name: &'static str,
    },
    InvalidUrl {
        input: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::PageSizeOutOfRange { min, max, actual } => {
                write!(f, "page size out of range: {actual} (expected {min}..={max})")
            }
            Self::InvalidPageSize { input } => {
                write!(f, "page size must be a positive integer, got {input}")
            }
            Self::MissingPathField { kind, field } => {
                write!(f, "{kind} path requires field `{field}`")
            }
            Self::InvalidPathField { kind, field } => {
                write!(
                    f,
                    "{kind} path field `{field}` must be a string or integer without '/', '?' or '#'"
                )
            }
            Self::MissingEnvVar { name } => {
                write!(f, "{name} environment variable is required")
            }
            Self::InvalidUrl { input } => write!(f, "invalid URL: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "api_key" };
        assert_eq!(err.to_string(), "api_key must not be empty");

        let err = ValidationError::PageSizeOutOfRange {
            min: 1,
            max: 200,
            actual: 500,
        };
        assert_eq!(
            err.to_string(),
            "page size out of range: 500 (expected 1..=200)"
        );

        let err = ValidationError::MissingPathField {
            kind: "contact",
            field: "project_id".to_owned(),
        };
        assert_eq!(err.to_string(), "contact path requires field `project_id`");

        let err = ValidationError::MissingEnvVar {
            name: "TELERIVET_API_KEY",
        };
        assert_eq!(
            err.to_string(),
            "TELERIVET_API_KEY environment variable is required"
        );
    }
}
