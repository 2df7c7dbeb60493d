use serde_json::{Map, Value};

use crate::domain::validation::ValidationError;

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page size the server accepts.
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Bracketed filter modifiers accepted by list endpoints (`field[min]=...`).
pub enum FilterOp {
    Min,
    Max,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    Prefix,
    NotPrefix,
    Exists,
}

impl FilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Ne => "ne",
            Self::Prefix => "prefix",
            Self::NotPrefix => "not_prefix",
            Self::Exists => "exists",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Filter, sort and page-size parameters for a list endpoint.
///
/// Filters are kept as a nested JSON object; the transport layer flattens
/// nested objects into bracketed keys when building the query string, so
/// `filter_op("time_created", FilterOp::Min, 1)` is sent as
/// `time_created[min]=1`.
pub struct Query {
    params: Map<String, Value>,
    page_size: Option<usize>,
}

impl Query {
    pub const SORT: &'static str = "sort";
    pub const SORT_DIR: &'static str = "sort_dir";
    pub const PAGE_SIZE: &'static str = "page_size";

    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match filter on `field`.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(field.into(), value.into());
        self
    }

    /// Modifier filter on `field`; several modifiers on one field are merged.
    pub fn filter_op(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        let entry = self
            .params
            .entry(field.into())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(ops) = entry {
            ops.insert(op.as_str().to_owned(), value.into());
        }
        self
    }

    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.params
            .insert(Self::SORT.to_owned(), Value::String(field.into()));
        self
    }

    pub fn sort_dir(mut self, dir: SortDir) -> Self {
        self.params.insert(
            Self::SORT_DIR.to_owned(),
            Value::String(dir.as_str().to_owned()),
        );
        self
    }

    /// Request `size` items per page.
    ///
    /// Invariant: `1..=MAX_PAGE_SIZE`.
    pub fn page_size(mut self, size: usize) -> Result<Self, ValidationError> {
        self.page_size = Some(validate_page_size(size)?);
        Ok(self)
    }

    /// Arbitrary parameter passed through verbatim.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Filter and sort parameters, without paging state.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

impl TryFrom<Map<String, Value>> for Query {
    type Error = ValidationError;

    /// Build a query from a raw parameter object.
    ///
    /// A `page_size` entry (integer or numeric string) is validated and lifted
    /// out of the filter set; any other value is rejected.
    fn try_from(mut params: Map<String, Value>) -> Result<Self, Self::Error> {
        let page_size = match params.remove(Self::PAGE_SIZE) {
            None | Some(Value::Null) => None,
            Some(value) => Some(validate_page_size(parse_page_size(&value)?)?),
        };
        Ok(Self { params, page_size })
    }
}

fn parse_page_size(value: &Value) -> Result<usize, ValidationError> {
    let parsed = match value {
        Value::Number(number) => number
            .as_u64()
            .map(|size| usize::try_from(size).unwrap_or(usize::MAX)),
        Value::String(text) => text.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::InvalidPageSize {
        input: value.to_string(),
    })
}

fn validate_page_size(size: usize) -> Result<usize, ValidationError> {
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(ValidationError::PageSizeOutOfRange {
            min: 1,
            max: MAX_PAGE_SIZE,
            actual: size,
        });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn filter_ops_merge_under_one_field() {
        let query = Query::new()
            .filter("direction", "incoming")
            .filter_op("time_created", FilterOp::Min, 100)
            .filter_op("time_created", FilterOp::Max, 200)
            .sort("time_created")
            .sort_dir(SortDir::Desc);

        assert_eq!(
            Value::Object(query.params().clone()),
            json!({
                "direction": "incoming",
                "time_created": {"min": 100, "max": 200},
                "sort": "time_created",
                "sort_dir": "desc"
            })
        );
    }

    #[test]
    fn filter_op_replaces_scalar_filter() {
        let query = Query::new()
            .filter("name", "Alice")
            .filter_op("name", FilterOp::Prefix, "Al");
        assert_eq!(query.params().get("name"), Some(&json!({"prefix": "Al"})));
    }

    #[test]
    fn page_size_range_is_enforced() {
        assert!(Query::new().page_size(0).is_err());
        assert!(Query::new().page_size(1).is_ok());
        assert!(Query::new().page_size(MAX_PAGE_SIZE).is_ok());
        assert!(matches!(
            Query::new().page_size(MAX_PAGE_SIZE + 1),
            Err(ValidationError::PageSizeOutOfRange { actual: 201, .. })
        ));
        assert_eq!(Query::new().effective_page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn raw_params_lift_page_size() {
        let raw = json!({"name": "x", "page_size": 10});
        let Value::Object(map) = raw else {
            unreachable!()
        };
        let query = Query::try_from(map).unwrap();
        assert_eq!(query.effective_page_size(), 10);
        assert!(!query.params().contains_key("page_size"));

        let raw = json!({"page_size": 1000});
        let Value::Object(map) = raw else {
            unreachable!()
        };
        assert!(Query::try_from(map).is_err());
    }

    #[test]
    fn raw_page_size_accepts_numeric_strings_only() {
        let raw = json!({"page_size": " 25 "});
        let Value::Object(map) = raw else {
            unreachable!()
        };
        assert_eq!(Query::try_from(map).unwrap().effective_page_size(), 25);

        for bad in [json!("ten"), json!(-5), json!(2.5), json!(true)] {
            let mut map = Map::new();
            map.insert("page_size".to_owned(), bad);
            assert!(matches!(
                Query::try_from(map),
                Err(ValidationError::InvalidPageSize { .. })
            ));
        }
    }
}
