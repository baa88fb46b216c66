// Shared helpers for the tool modules
mod deserialize;
mod tool_result;

pub use deserialize::{deserialize_blank_as_none, deserialize_non_empty_string};
pub use tool_result::{json_result, text_result};
