//! The header codec: parses `.mhd` text into a typed
//! `MetaHeader` and renders one back into text.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::Result;

mod meta_header;
mod tags;

pub use meta_header::MetaHeader;
pub use tags::{Tag, TagKind, TagValue};

/// Reads and parses the header file at `path`.
pub fn read_header<P : AsRef<Path>>(path : P) -> Result<MetaHeader> {
    let path = path.as_ref();
    let header = MetaHeader::parse(&fs::read_to_string(path)?)?;
    debug!("Read {} tags from {:?}", header.len(), path);
    Ok(header)
}

/// Renders `header` and writes it to `path`, replacing any
/// existing file.
pub fn write_header<P : AsRef<Path>>(path : P, header : &MetaHeader) -> Result<()> {
    fs::write(path.as_ref(), header.render())?;
    Ok(())
}
