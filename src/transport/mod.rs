//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod body;
mod page;
mod query;

pub use body::{
    TransportError, decode_error_body, decode_object, decode_success_body, encode_json_body,
};
pub use page::{decode_count, decode_page, encode_count_params, encode_page_params};
pub use query::encode_query;
