//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod resource;
mod response;
mod validation;
mod value;

pub use request::{DEFAULT_PAGE_SIZE, FilterOp, MAX_PAGE_SIZE, Query, SortDir};
pub use resource::ResourceKind;
pub use response::{ApiErrorBody, Page};
pub use validation::ValidationError;
pub use value::{ApiErrorCode, ApiKey, HttpMethod, KnownApiErrorCode, ResourceId};
