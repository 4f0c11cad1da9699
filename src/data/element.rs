//! Element types: the `MET_*` names a header may declare, and
//! the Rust scalar types they correspond to.

use std::fmt;
use std::io::{Read, Seek};
use std::str::FromStr;

use binrw::{BinRead, Endian, VecArgs};
use ndarray::ArrayD;

use crate::data::volume::Volume;
use crate::error::MetaImageError;

/// The scalar type of every sample in a raw data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float,
    Double,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
}

/// `ElementType` <-> header name <-> bytes per element.
/// Read and write both go through this one table.
static ELEMENT_TABLE : [(ElementType, &str, usize); 8] = [
    (ElementType::Float, "MET_FLOAT", 4),
    (ElementType::Double, "MET_DOUBLE", 8),
    (ElementType::Char, "MET_CHAR", 1),
    (ElementType::UChar, "MET_UCHAR", 1),
    (ElementType::Short, "MET_SHORT", 2),
    (ElementType::UShort, "MET_USHORT", 2),
    (ElementType::Int, "MET_INT", 4),
    (ElementType::UInt, "MET_UINT", 4),
];

impl ElementType {
    pub const ALL : [ElementType; 8] = [
        ElementType::Float,
        ElementType::Double,
        ElementType::Char,
        ElementType::UChar,
        ElementType::Short,
        ElementType::UShort,
        ElementType::Int,
        ElementType::UInt,
    ];

    fn entry(&self) -> &'static (ElementType, &'static str, usize) {
        // The table covers every variant
        &ELEMENT_TABLE[*self as usize]
    }

    /// The `MET_*` name written to `ElementType`.
    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    /// Width of one element in bytes.
    pub fn size_of(&self) -> usize {
        self.entry().2
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = MetaImageError;

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        ELEMENT_TABLE.iter()
            .find(|(_, name, _)| *name == s)
            .map(|(element_type, _, _)| *element_type)
            .ok_or_else(|| MetaImageError::UnsupportedElementType(s.to_string()))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust scalar that can be stored in a MetaImage raw file.
///
/// Implemented exactly for `f32`, `f64`, `i8`, `u8`, `i16`,
/// `u16`, `i32` and `u32`. Any other scalar type is rejected
/// at compile time.
pub trait Element : bytemuck::Pod + PartialEq + fmt::Debug + sealed::Sealed {
    const ELEMENT_TYPE : ElementType;

    /// Reads `count` elements stored with byte order `endian`,
    /// returning them in host order.
    fn read_elements<R : Read + Seek>(reader : &mut R, endian : Endian, count : usize)
        -> binrw::BinResult<Vec<Self>>;

    fn into_volume(array : ArrayD<Self>) -> Volume;

    fn from_volume(volume : &Volume) -> Option<&ArrayD<Self>>;

    fn from_volume_owned(volume : Volume) -> Result<ArrayD<Self>, Volume>;
}

macro_rules! impl_element {
    ($scalar : ty, $variant : ident) => {
        impl sealed::Sealed for $scalar {}

        impl Element for $scalar {
            const ELEMENT_TYPE : ElementType = ElementType::$variant;

            fn read_elements<R : Read + Seek>(reader : &mut R, endian : Endian, count : usize)
                -> binrw::BinResult<Vec<Self>> {
                Vec::<$scalar>::read_options(reader, endian, VecArgs { count, inner : () })
            }

            fn into_volume(array : ArrayD<Self>) -> Volume {
                Volume::$variant(array)
            }

            fn from_volume(volume : &Volume) -> Option<&ArrayD<Self>> {
                match volume {
                    Volume::$variant(array) => Some(array),
                    _ => None,
                }
            }

            fn from_volume_owned(volume : Volume) -> Result<ArrayD<Self>, Volume> {
                match volume {
                    Volume::$variant(array) => Ok(array),
                    other => Err(other),
                }
            }
        }
    };
}

impl_element!(f32, Float);
impl_element!(f64, Double);
impl_element!(i8, Char);
impl_element!(u8, UChar);
impl_element!(i16, Short);
impl_element!(u16, UShort);
impl_element!(i32, Int);
impl_element!(u32, UInt);
