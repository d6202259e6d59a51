//! Core data types: located values, submissions and statuses.

mod status;
mod submission;
mod value;

pub use status::{ContentStatus, SaveAction, Severity};
pub use submission::{
    SaveData, Submission, CATEGORY_KEY, CONTENT_TYPE_KEY, ID_KEY, MASK_PLACEHOLDER,
    ORIGINAL_STATUS_KEY, STATUS_KEY, TAG_TAXONOMY, TAX_INPUT_KEY,
};
pub use value::{value_as_id, value_is_truthy, FieldValue};
