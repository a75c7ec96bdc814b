//! Metadata record decoding and link inspection

pub mod records;
pub mod validator;

pub use records::{InfoRecord, FormatRecord};
pub use validator::LinkValidator;
