//! The raw data codec: reads and writes the binary payload
//! paired with a header, converting between the file's
//! fastest-axis-first `DimSize` and the array's
//! slowest-axis-first shape.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use binrw::Endian;
use log::debug;
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};

use crate::data::element::{Element, ElementType};
use crate::data::volume::{dispatch_volume, Volume};
use crate::error::{MetaImageError, Result};
use crate::header::{write_header, MetaHeader, Tag, TagValue};
use crate::utils::{
    check_header_extension,
    native_endian,
    raw_file_name,
    resolve_data_file,
};

/// In-memory shape for a file with the given `DimSize` and
/// channel count: `DimSize` reversed, plus a trailing channel
/// axis when there is more than one channel.
pub(crate) fn memory_shape(dim_size : &[usize], channels : usize) -> Vec<usize> {
    let mut shape : Vec<usize> = dim_size.iter().rev().copied().collect();
    if channels > 1 {
        shape.push(channels);
    }
    shape
}

/// Splits an array shape into its spatial axes (still in memory
/// order), given the `ElementNumberOfChannels` the caller declared.
///
/// Any declared count, including 1, must match the trailing axis,
/// which is then dropped. With no declaration every axis is spatial.
pub(crate) fn spatial_shape(shape : &[usize], declared_channels : Option<usize>)
    -> Result<Vec<usize>> {
    let mut dsize = shape.to_vec();
    match declared_channels {
        Some(0) => {
            return Err(MetaImageError::ShapeMismatch(
                "ElementNumberOfChannels must be at least 1".to_string()
            ));
        },
        Some(channels) => {
            let found = dsize.pop().unwrap_or(0);
            if found != channels {
                return Err(MetaImageError::ChannelMismatch { declared : channels, found });
            }
        },
        None => {},
    }
    if dsize.is_empty() {
        return Err(MetaImageError::ShapeMismatch(
            format!("array of shape {:?} has no spatial axes", shape)
        ));
    }
    Ok(dsize)
}

fn element_count(shape : &[usize]) -> Result<usize> {
    shape.iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| MetaImageError::ShapeMismatch(
            format!("shape {:?} has too many elements", shape)
        ))
}

fn read_array<T : Element, R : Read + Seek>(reader : &mut R, endian : Endian, shape : &[usize])
    -> Result<ArrayD<T>> {
    let data = T::read_elements(reader, endian, element_count(shape)?)?;
    ArrayD::from_shape_vec(IxDyn(shape), data)
        .map_err(|err| MetaImageError::ShapeMismatch(err.to_string()))
}

/// Loads the raw data described by `header`, whose file lives
/// at `header_path` (used only to resolve `ElementDataFile`).
///
/// Elements are decoded in the order declared by
/// `BinaryDataByteOrderMSB` (host order if absent), which
/// byte-swaps them whenever that differs from the host.
///
/// ## Errors
///
/// * `MissingTag` - `NDims`, `DimSize`, `ElementType` or
/// `ElementDataFile` is absent
/// * `UnsupportedElementType` - `ElementType` is not a known `MET_*` type
/// * `CompressedData` - the header declares `CompressedData = True`
/// * `ShapeMismatch` - `DimSize` does not have `NDims` entries
/// * `Io` - the data file is missing or shorter than the header implies
pub fn load_volume(header_path : &Path, header : &MetaHeader) -> Result<Volume> {
    let ndims = header.ndims()?;
    let channels = header.element_channels();
    let element_type = header.element_type()?;

    if header.is_compressed() {
        return Err(MetaImageError::CompressedData);
    }

    let dim_size = header.dim_size()?;
    if ndims == 0 || dim_size.len() != ndims {
        return Err(MetaImageError::ShapeMismatch(
            format!("NDims is {} but DimSize is {:?}", ndims, dim_size)
        ));
    }
    if channels == 0 {
        return Err(MetaImageError::ShapeMismatch(
            "ElementNumberOfChannels must be at least 1".to_string()
        ));
    }

    let data_path = resolve_data_file(header_path, header.element_data_file()?);
    let endian = header.byte_order().unwrap_or_else(native_endian);
    let shape = memory_shape(dim_size, channels);

    debug!(
        "Loading {:?} as {} {:?}, {:?} byte order (host {:?})",
        data_path, element_type, shape, endian, native_endian()
    );

    let mut reader = BufReader::new(File::open(&data_path)?);

    let volume = match element_type {
        ElementType::Float => Volume::from(read_array::<f32, _>(&mut reader, endian, &shape)?),
        ElementType::Double => Volume::from(read_array::<f64, _>(&mut reader, endian, &shape)?),
        ElementType::Char => Volume::from(read_array::<i8, _>(&mut reader, endian, &shape)?),
        ElementType::UChar => Volume::from(read_array::<u8, _>(&mut reader, endian, &shape)?),
        ElementType::Short => Volume::from(read_array::<i16, _>(&mut reader, endian, &shape)?),
        ElementType::UShort => Volume::from(read_array::<u16, _>(&mut reader, endian, &shape)?),
        ElementType::Int => Volume::from(read_array::<i32, _>(&mut reader, endian, &shape)?),
        ElementType::UInt => Volume::from(read_array::<u32, _>(&mut reader, endian, &shape)?),
    };
    Ok(volume)
}

/// Writes every element of `array` in logical (row-major) order
/// and host byte order.
fn write_elements<T, S, D, W>(writer : &mut W, array : &ArrayBase<S, D>) -> Result<()>
    where T : Element, S : Data<Elem = T>, D : Dimension, W : Write {
    let standard = array.as_standard_layout();
    match standard.as_slice() {
        Some(slice) => writer.write_all(bytemuck::cast_slice(slice))?,
        None => {
            for value in standard.iter() {
                writer.write_all(bytemuck::bytes_of(value))?;
            }
        },
    }
    Ok(())
}

fn write_raw_file<T, S, D>(data_path : &Path, array : &ArrayBase<S, D>) -> Result<()>
    where T : Element, S : Data<Elem = T>, D : Dimension {
    let mut writer = BufWriter::new(File::create(data_path)?);
    write_elements(&mut writer, array)?;
    writer.flush()?;
    Ok(())
}

/// Writes the elements of `volume` to `data_path` as a flat,
/// host-order binary sequence, with no header.
pub fn dump_volume(data_path : &Path, volume : &Volume) -> Result<()> {
    debug!("Dumping {} {:?} to {:?}", volume.element_type(), volume.shape(), data_path);
    dispatch_volume!(volume, array => write_raw_file(data_path, array))
}

/// Writes `array` as a `.mhd` header at `header_path` plus a
/// `.raw` file beside it, returning the header that was written.
///
/// Tags derived from the array (`ObjectType`, `NDims`,
/// `BinaryData`, `BinaryDataByteOrderMSB`, `DimSize`,
/// `ElementType`, `ElementDataFile`) overwrite whatever `header`
/// held; every other tag is written as given. The byte order is
/// always the host's.
///
/// ## Errors
///
/// * `WrongExtension` - `header_path` does not end in `.mhd`
/// * `ChannelMismatch` - a declared `ElementNumberOfChannels`
/// disagrees with the trailing axis
/// * `ShapeMismatch` - the array has no spatial axes
/// * `Io` - either file could not be written
///
/// Validation happens before either file is touched. If the data
/// write fails after the header was written, the header is left
/// in place.
pub fn store_array<T, S, D>(header_path : &Path, array : &ArrayBase<S, D>, mut header : MetaHeader)
    -> Result<MetaHeader>
    where T : Element, S : Data<Elem = T>, D : Dimension {
    check_header_extension(header_path)?;

    let declared_channels = match header.get(Tag::ElementNumberOfChannels) {
        Some(TagValue::Integer(channels)) => Some(*channels),
        _ => None,
    };
    let mut dim_size = spatial_shape(array.shape(), declared_channels)?;
    dim_size.reverse();
    let data_file = raw_file_name(header_path)?;

    header.insert(Tag::ObjectType, "Image")?;
    header.insert(Tag::BinaryData, true)?;
    header.insert(Tag::BinaryDataByteOrderMSB, native_endian() == Endian::Big)?;
    header.insert(Tag::ElementType, T::ELEMENT_TYPE.as_str())?;
    header.insert(Tag::NDims, dim_size.len())?;
    header.insert(Tag::DimSize, dim_size)?;
    header.insert(Tag::ElementDataFile, data_file.as_str())?;

    let data_path = resolve_data_file(header_path, &data_file);
    debug!(
        "Saving {} {:?} to {:?} and {:?}",
        T::ELEMENT_TYPE, array.shape(), header_path, data_path
    );

    write_header(header_path, &header)?;
    write_raw_file(&data_path, array)?;
    Ok(header)
}

/// `store_array` for a `Volume` of any element type.
pub fn store_volume(header_path : &Path, volume : &Volume, header : MetaHeader)
    -> Result<MetaHeader> {
    dispatch_volume!(volume, array => store_array(header_path, array, header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_memory_shape() {
        assert_eq!(memory_shape(&[4, 5, 6], 1), vec![6, 5, 4]);
        assert_eq!(memory_shape(&[4, 5, 6], 3), vec![6, 5, 4, 3]);
        assert_eq!(memory_shape(&[7], 1), vec![7]);
    }

    #[test]
    fn test_spatial_shape() {
        assert_eq!(spatial_shape(&[6, 5, 4], None).unwrap(), vec![6, 5, 4]);
        assert_eq!(spatial_shape(&[6, 5, 1], Some(1)).unwrap(), vec![6, 5]);
        assert_eq!(spatial_shape(&[6, 5, 3], Some(3)).unwrap(), vec![6, 5]);

        assert!(matches!(
            spatial_shape(&[6, 5, 4], Some(3)),
            Err(MetaImageError::ChannelMismatch { declared : 3, found : 4 })
        ));
        assert!(matches!(
            spatial_shape(&[6, 5, 4], Some(1)),
            Err(MetaImageError::ChannelMismatch { declared : 1, found : 4 })
        ));
        assert!(matches!(
            spatial_shape(&[], Some(1)),
            Err(MetaImageError::ChannelMismatch { declared : 1, found : 0 })
        ));
        assert!(matches!(
            spatial_shape(&[3], Some(3)),
            Err(MetaImageError::ShapeMismatch(_))
        ));
        assert!(matches!(spatial_shape(&[], None), Err(MetaImageError::ShapeMismatch(_))));
        assert!(matches!(spatial_shape(&[2, 2], Some(0)), Err(MetaImageError::ShapeMismatch(_))));
    }

    #[test]
    fn test_element_count_overflow() {
        assert_eq!(element_count(&[6, 5, 4]).unwrap(), 120);
        assert_eq!(element_count(&[]).unwrap(), 1);
        assert!(element_count(&[usize::MAX, 2]).is_err());
    }

    #[test]
    fn test_write_elements_logical_order() {
        // Transposed views are written in their logical order,
        // not their memory order
        let array = Array3::<u8>::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 12 + y * 4 + x) as u8);
        let transposed = array.view().reversed_axes();

        let mut bytes = Vec::new();
        write_elements(&mut bytes, &transposed).unwrap();

        let expected : Vec<u8> = transposed.iter().copied().collect();
        assert_eq!(bytes, expected);
        assert_eq!(bytes[1], 12);
    }

    #[test]
    fn test_write_elements_host_order() {
        let array = ndarray::arr1(&[0x0102u16, 0x0304]);
        let mut bytes = Vec::new();
        write_elements(&mut bytes, &array).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&0x0102u16.to_ne_bytes());
        expected.extend_from_slice(&0x0304u16.to_ne_bytes());
        assert_eq!(bytes, expected);
    }
}
