//! The stateful half of sharehub: the persisted record list, the upload
//! flow feeding it, and the gallery browsing it.

pub mod error;
pub mod gallery;
mod record;
mod store;
pub mod upload;

pub use crate::gallery::{Filter, Gallery, GalleryView};
pub use crate::record::FileRecord;
pub use crate::store::{Records, Store};
pub use crate::upload::{Selection, UploadEvent, UploadTimings, Uploader};
