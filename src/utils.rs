//! Path and byte-order helpers shared by the header and
//! raw data codecs.

use std::path::{Path, PathBuf};

use binrw::Endian;

use crate::error::{MetaImageError, Result};

pub const HEADER_EXTENSION : &str = "mhd";
pub const RAW_EXTENSION : &str = "raw";

/// The byte order of the machine this is running on.
pub fn native_endian() -> Endian {
    if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    }
}

/// Resolves `data_file` against the directory containing
/// `header_path`, unless `data_file` is already absolute.
pub fn resolve_data_file(header_path : &Path, data_file : &str) -> PathBuf {
    let data_file = Path::new(data_file);
    if data_file.is_absolute() {
        return data_file.to_path_buf();
    }
    match header_path.parent() {
        Some(dir) => dir.join(data_file),
        None => data_file.to_path_buf(),
    }
}

/// Errors unless `header_path` ends in `.mhd`.
pub fn check_header_extension(header_path : &Path) -> Result<()> {
    match header_path.extension() {
        Some(ext) if ext == HEADER_EXTENSION => Ok(()),
        _ => Err(MetaImageError::WrongExtension(header_path.to_path_buf())),
    }
}

/// The `ElementDataFile` name paired with `header_path`:
/// its file name with `.mhd` swapped for `.raw`.
pub fn raw_file_name(header_path : &Path) -> Result<String> {
    header_path.with_extension(RAW_EXTENSION)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MetaImageError::WrongExtension(header_path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_data_file(Path::new("scans/brain.mhd"), "brain.raw"),
            PathBuf::from("scans/brain.raw")
        );
        assert_eq!(
            resolve_data_file(Path::new("brain.mhd"), "data/brain.raw"),
            PathBuf::from("data/brain.raw")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_data_file(Path::new("scans/brain.mhd"), "/mnt/data/brain.raw"),
            PathBuf::from("/mnt/data/brain.raw")
        );
    }

    #[test]
    fn test_header_extension() {
        assert!(check_header_extension(Path::new("a/b/volume.mhd")).is_ok());
        assert!(check_header_extension(Path::new("volume.mha")).is_err());
        assert!(check_header_extension(Path::new("volume")).is_err());
        assert!(check_header_extension(Path::new("volume.MHD")).is_err());
    }

    #[test]
    fn test_raw_file_name() {
        assert_eq!(raw_file_name(Path::new("/tmp/scans/ct.mhd")).unwrap(), "ct.raw");
        assert_eq!(raw_file_name(Path::new("ct.v2.mhd")).unwrap(), "ct.v2.raw");
    }

    #[test]
    fn test_native_endian() {
        assert_eq!(
            native_endian() == Endian::Big,
            u16::from_ne_bytes([0, 1]) == 1
        );
    }
}
