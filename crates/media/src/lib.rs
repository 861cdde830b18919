//! Everything about an uploaded file that doesn't need a store: whether it
//! may be uploaded at all, what kind of file it is, how its bytes are kept,
//! and how its size and age are shown to people.
//!
//! All functions here are pure; nothing touches the filesystem.

mod category;
pub mod consts;
mod content;
pub mod error;
pub mod format;
pub mod mime;
mod validate;

pub use crate::category::{Category, FilterBucket, type_label};
pub use crate::content::{DataUrl, Decoded};
pub use crate::format::{format_relative_date, format_size};
pub use crate::validate::{Candidate, Rejection, validate};
