//! The raw data side of a MetaImage: element types, the
//! in-memory `Volume`, and the binary payload codec.

mod element;
mod raw;
mod volume;

pub use element::{Element, ElementType};
pub use volume::Volume;

pub(crate) use raw::{dump_volume, load_volume, store_array, store_volume};
