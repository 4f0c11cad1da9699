//! `Volume` is the in-memory side of a MetaImage file: an
//! N-dimensional array of one of the supported element types.
//!
//! Axis order is the reverse of `DimSize`: the file's
//! fastest-varying axis is the array's last spatial axis. A
//! trailing channel axis follows the spatial axes when the file
//! has more than one channel.

use ndarray::ArrayD;

use crate::data::element::{Element, ElementType};

/// An N-dimensional array with a runtime element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Volume {
    Float(ArrayD<f32>),
    Double(ArrayD<f64>),
    Char(ArrayD<i8>),
    UChar(ArrayD<u8>),
    Short(ArrayD<i16>),
    UShort(ArrayD<u16>),
    Int(ArrayD<i32>),
    UInt(ArrayD<u32>),
}

/// Evaluates `$body` with `$array` bound to the inner
/// `ArrayD<T>` of whichever variant `$volume` is.
///
/// ```rust, ignore
/// let n = dispatch_volume!(volume, array => array.len());
/// ```
macro_rules! dispatch_volume {
    ($volume : expr, $array : ident => $body : expr) => {
        match $volume {
            Volume::Float($array) => $body,
            Volume::Double($array) => $body,
            Volume::Char($array) => $body,
            Volume::UChar($array) => $body,
            Volume::Short($array) => $body,
            Volume::UShort($array) => $body,
            Volume::Int($array) => $body,
            Volume::UInt($array) => $body,
        }
    };
}

pub(crate) use dispatch_volume;

impl Volume {
    pub fn element_type(&self) -> ElementType {
        match self {
            Volume::Float(_) => ElementType::Float,
            Volume::Double(_) => ElementType::Double,
            Volume::Char(_) => ElementType::Char,
            Volume::UChar(_) => ElementType::UChar,
            Volume::Short(_) => ElementType::Short,
            Volume::UShort(_) => ElementType::UShort,
            Volume::Int(_) => ElementType::Int,
            Volume::UInt(_) => ElementType::UInt,
        }
    }

    /// In-memory shape, slowest-varying axis first.
    pub fn shape(&self) -> &[usize] {
        dispatch_volume!(self, array => array.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements, channels included.
    pub fn len(&self) -> usize {
        dispatch_volume!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the array if the volume holds elements of type `T`.
    ///
    /// ## Example
    ///
    /// ```
    /// use mhdio::Volume;
    /// use ndarray::{ArrayD, IxDyn};
    ///
    /// let volume = Volume::from(ArrayD::<i16>::zeros(IxDyn(&[2, 3])));
    /// assert!(volume.as_array::<i16>().is_some());
    /// assert!(volume.as_array::<f32>().is_none());
    /// ```
    pub fn as_array<T : Element>(&self) -> Option<&ArrayD<T>> {
        T::from_volume(self)
    }

    /// Unwraps the array if the volume holds elements of type `T`,
    /// otherwise hands the volume back unchanged.
    pub fn into_array<T : Element>(self) -> Result<ArrayD<T>, Volume> {
        T::from_volume_owned(self)
    }
}

impl<T : Element> From<ArrayD<T>> for Volume {
    fn from(array : ArrayD<T>) -> Self {
        T::into_volume(array)
    }
}
