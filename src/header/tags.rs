//! The fixed set of header tags this crate understands, and
//! the kind of value each one carries.
//!
//! `Tag` variants are declared in the canonical order in which
//! they are written to disk, so sorting by `Tag` (or keeping them
//! in a `BTreeMap`) gives the render order for free.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

/// A recognized MetaImage header key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    ObjectType,
    NDims,
    BinaryData,
    BinaryDataByteOrderMSB,
    CompressedData,
    CompressedDataSize,
    TransformMatrix,
    Offset,
    CenterOfRotation,
    AnatomicalOrientation,
    ElementSpacing,
    DimSize,
    ElementNumberOfChannels,
    ElementType,
    ElementDataFile,
    Comment,
    SeriesDescription,
    AcquisitionDate,
    AcquisitionTime,
    StudyDate,
    StudyTime,
}

/// The shape of the value a `Tag` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Free-form text, passed through untouched
    Text,
    /// A single non-negative integer
    Integer,
    /// `True` or `False`
    Boolean,
    /// Whitespace-separated floating point numbers
    Floats,
    /// Whitespace-separated non-negative integers
    Integers,
}

/// A typed tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Integer(usize),
    Boolean(bool),
    Floats(Vec<f64>),
    Integers(Vec<usize>),
}

impl Tag {
    /// Every recognized tag, in canonical render order.
    pub const ALL : [Tag; 21] = [
        Tag::ObjectType,
        Tag::NDims,
        Tag::BinaryData,
        Tag::BinaryDataByteOrderMSB,
        Tag::CompressedData,
        Tag::CompressedDataSize,
        Tag::TransformMatrix,
        Tag::Offset,
        Tag::CenterOfRotation,
        Tag::AnatomicalOrientation,
        Tag::ElementSpacing,
        Tag::DimSize,
        Tag::ElementNumberOfChannels,
        Tag::ElementType,
        Tag::ElementDataFile,
        Tag::Comment,
        Tag::SeriesDescription,
        Tag::AcquisitionDate,
        Tag::AcquisitionTime,
        Tag::StudyDate,
        Tag::StudyTime,
    ];

    /// The key as it is spelled in a header file.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::ObjectType => "ObjectType",
            Tag::NDims => "NDims",
            Tag::BinaryData => "BinaryData",
            Tag::BinaryDataByteOrderMSB => "BinaryDataByteOrderMSB",
            Tag::CompressedData => "CompressedData",
            Tag::CompressedDataSize => "CompressedDataSize",
            Tag::TransformMatrix => "TransformMatrix",
            Tag::Offset => "Offset",
            Tag::CenterOfRotation => "CenterOfRotation",
            Tag::AnatomicalOrientation => "AnatomicalOrientation",
            Tag::ElementSpacing => "ElementSpacing",
            Tag::DimSize => "DimSize",
            Tag::ElementNumberOfChannels => "ElementNumberOfChannels",
            Tag::ElementType => "ElementType",
            Tag::ElementDataFile => "ElementDataFile",
            Tag::Comment => "Comment",
            Tag::SeriesDescription => "SeriesDescription",
            Tag::AcquisitionDate => "AcquisitionDate",
            Tag::AcquisitionTime => "AcquisitionTime",
            Tag::StudyDate => "StudyDate",
            Tag::StudyTime => "StudyTime",
        }
    }

    /// The kind of value stored under this tag.
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::NDims | Tag::ElementNumberOfChannels => TagKind::Integer,
            Tag::BinaryData
            | Tag::BinaryDataByteOrderMSB
            | Tag::CompressedData => TagKind::Boolean,
            Tag::TransformMatrix
            | Tag::Offset
            | Tag::CenterOfRotation
            | Tag::ElementSpacing => TagKind::Floats,
            Tag::DimSize => TagKind::Integers,
            _ => TagKind::Text,
        }
    }

    /// Parses the (already trimmed) textual value of this tag
    /// into a `TagValue` of the tag's kind. Returns `None` if
    /// the text is not a valid value of that kind.
    ///
    /// Booleans are lenient: only the literal `True` is true,
    /// anything else reads as false.
    pub fn parse_value(&self, content : &str) -> Option<TagValue> {
        match self.kind() {
            TagKind::Text => Some(TagValue::Text(content.to_string())),
            TagKind::Integer => content.parse().ok().map(TagValue::Integer),
            TagKind::Boolean => Some(TagValue::Boolean(content == "True")),
            TagKind::Floats => content.split_whitespace()
                .map(str::parse)
                .collect::<Result<Vec<f64>, _>>()
                .ok()
                .map(TagValue::Floats),
            TagKind::Integers => content.split_whitespace()
                .map(str::parse)
                .collect::<Result<Vec<usize>, _>>()
                .ok()
                .map(TagValue::Integers),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Tag {
    type Err = ();

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        Tag::ALL.iter()
            .find(|tag| tag.name() == s)
            .copied()
            .ok_or(())
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TagKind::Text => "text",
            TagKind::Integer => "integer",
            TagKind::Boolean => "boolean",
            TagKind::Floats => "floating point sequence",
            TagKind::Integers => "integer sequence",
        };
        write!(f, "{}", name)
    }
}

impl TagValue {
    pub fn kind(&self) -> TagKind {
        match self {
            TagValue::Text(_) => TagKind::Text,
            TagValue::Integer(_) => TagKind::Integer,
            TagValue::Boolean(_) => TagKind::Boolean,
            TagValue::Floats(_) => TagKind::Floats,
            TagValue::Integers(_) => TagKind::Integers,
        }
    }
}

/// Renders the value the way it appears after `Key = `
/// in a header file.
impl fmt::Display for TagValue {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagValue::Text(text) => write!(f, "{}", text),
            TagValue::Integer(value) => write!(f, "{}", value),
            TagValue::Boolean(true) => write!(f, "True"),
            TagValue::Boolean(false) => write!(f, "False"),
            TagValue::Floats(values) => write!(f, "{}", values.iter().join(" ")),
            TagValue::Integers(values) => write!(f, "{}", values.iter().join(" ")),
        }
    }
}

impl From<&str> for TagValue {
    fn from(text : &str) -> Self {
        TagValue::Text(text.to_string())
    }
}

impl From<String> for TagValue {
    fn from(text : String) -> Self {
        TagValue::Text(text)
    }
}

impl From<usize> for TagValue {
    fn from(value : usize) -> Self {
        TagValue::Integer(value)
    }
}

impl From<bool> for TagValue {
    fn from(value : bool) -> Self {
        TagValue::Boolean(value)
    }
}

impl From<Vec<f64>> for TagValue {
    fn from(values : Vec<f64>) -> Self {
        TagValue::Floats(values)
    }
}

impl From<Vec<usize>> for TagValue {
    fn from(values : Vec<usize>) -> Self {
        TagValue::Integers(values)
    }
}
