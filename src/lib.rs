//! # mhdio
//!
//! Reads and writes MetaImage volumes: a plain-text `.mhd` header
//! of `Key = Value` tags, paired with a `.raw` file of binary
//! samples.
//!
//! On disk, `DimSize` lists the fastest-varying axis first. In
//! memory, a `Volume` uses the reverse order (slowest-varying axis
//! first, like a C-ordered `ndarray`), with an extra trailing axis
//! when `ElementNumberOfChannels` is greater than 1.

use std::path::Path;

use ndarray::{ArrayBase, Data, Dimension};

mod data;
mod error;
mod header;
mod utils;

pub use data::{Element, ElementType, Volume};
pub use error::{MetaImageError, Result};
pub use header::{read_header, write_header, MetaHeader, Tag, TagKind, TagValue};

/// `load(filename)` reads a `.mhd` header and the raw data file
/// it points to, and returns the data alongside the parsed header.
///
/// ## Arguments
///
/// * `filename` - Path to the header file. A relative
/// `ElementDataFile` is resolved against its directory.
///
/// ## Example
///
/// ```rust, ignore
/// let (volume, header) = mhdio::load("scan.mhd")?;
/// let voxels = volume.as_array::<i16>().unwrap();
/// ```
///
/// ## Errors
///
/// Fails on an unreadable or malformed header, an unsupported
/// `ElementType`, compressed data, or a missing or truncated
/// data file.
pub fn load<P : AsRef<Path>>(filename : P) -> Result<(Volume, MetaHeader)> {
    let header = read_header(filename.as_ref())?;
    let volume = load_with_header(filename, &header)?;
    Ok((volume, header))
}

/// `load_with_header(filename, header)` loads the raw data for a
/// header that has already been read from `filename`.
pub fn load_with_header<P : AsRef<Path>>(filename : P, header : &MetaHeader) -> Result<Volume> {
    data::load_volume(filename.as_ref(), header)
}

/// `save(filename, volume, header)` writes `volume` to a `.mhd`
/// header at `filename` and a `.raw` data file beside it.
///
/// ## Arguments
///
/// * `filename` - Path of the header file, which must end in `.mhd`.
/// * `volume` - The data to write, in host byte order.
/// * `header` - Extra tags (spacing, offset, comments...). Tags
/// describing the data layout are filled in from `volume`. If
/// `ElementNumberOfChannels` is present, the last axis of `volume`
/// must be that many channels, even when the count is 1. A header
/// from `load` of a single-channel file keeps that tag but not the
/// axis, so remove the tag before saving it again.
///
/// ## Returns
///
/// The header as written.
///
/// ## Example
///
/// ```rust, ignore
/// let mut header = MetaHeader::new();
/// header.insert(Tag::ElementSpacing, vec![1.0f64, 0.5, 0.5])?;
/// mhdio::save("scan.mhd", &volume, header)?;
/// // Produces "scan.mhd" and "scan.raw"
/// ```
pub fn save<P : AsRef<Path>>(filename : P, volume : &Volume, header : MetaHeader)
    -> Result<MetaHeader> {
    data::store_volume(filename.as_ref(), volume, header)
}

/// `save_array(filename, array, header)` is `save` for any
/// `ndarray` array or view whose elements are a supported type.
///
/// ## Example
///
/// ```rust, ignore
/// let image = ndarray::Array3::<f32>::zeros((16, 32, 32));
/// mhdio::save_array("image.mhd", &image.view(), MetaHeader::new())?;
/// ```
pub fn save_array<P, T, S, D>(filename : P, array : &ArrayBase<S, D>, header : MetaHeader)
    -> Result<MetaHeader>
    where P : AsRef<Path>, T : Element, S : Data<Elem = T>, D : Dimension {
    data::store_array(filename.as_ref(), array, header)
}

/// `dump_raw_data(filename, volume)` writes only the raw data
/// file: every element of `volume` in row-major order, host byte
/// order, no header.
pub fn dump_raw_data<P : AsRef<Path>>(filename : P, volume : &Volume) -> Result<()> {
    data::dump_volume(filename.as_ref(), volume)
}
