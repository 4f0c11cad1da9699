//! The `MetaHeader` is the typed tag mapping parsed from
//! (or rendered into) a `.mhd` header file.

use std::collections::BTreeMap;
use std::fmt;

use binrw::Endian;
use log::trace;

use crate::data::ElementType;
use crate::error::{MetaImageError, Result};
use crate::header::tags::{Tag, TagValue};

/// An ordered mapping from recognized `Tag`s to typed values.
///
/// Each value is checked against `Tag::kind` when it is inserted,
/// so the accessors below never see a value of the wrong kind.
/// Iteration (and rendering) always follows the canonical tag
/// order, regardless of the order tags were inserted or parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaHeader {
    tags : BTreeMap<Tag, TagValue>,
}

impl MetaHeader {
    pub fn new() -> Self {
        MetaHeader::default()
    }

    /// Parses the full text of a header file.
    ///
    /// Each line is `Key = Value`, split on the first `=`, with
    /// both sides trimmed. Unknown keys are ignored, and only the
    /// first occurrence of a recognized key is kept. Whitespace-only
    /// lines are skipped.
    ///
    /// ## Errors
    ///
    /// * `MalformedLine` - a non-blank line has no `=`
    /// * `InvalidValue` - a recognized tag's value does not parse
    /// as the tag's kind (e.g. `NDims = three`)
    ///
    /// ## Example
    ///
    /// ```
    /// use mhdio::{MetaHeader, Tag, TagValue};
    ///
    /// let header = MetaHeader::parse("NDims = 2\nDimSize = 3 4\n").unwrap();
    /// assert_eq!(header.get(Tag::DimSize), Some(&TagValue::Integers(vec![3, 4])));
    /// ```
    pub fn parse(text : &str) -> Result<Self> {
        let mut header = MetaHeader::new();

        for (line_idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, content) = line.split_once('=')
                .ok_or_else(|| MetaImageError::MalformedLine {
                    line_number : line_idx + 1,
                    line : line.to_string(),
                })?;
            let (key, content) = (key.trim(), content.trim());

            let tag = match key.parse::<Tag>() {
                Ok(tag) => tag,
                Err(_) => {
                    trace!("Ignoring unrecognized header key {:?}", key);
                    continue;
                }
            };

            if header.contains(tag) {
                trace!("Ignoring repeated header key {}", tag);
                continue;
            }

            let value = tag.parse_value(content)
                .ok_or_else(|| MetaImageError::InvalidValue {
                    tag,
                    value : content.to_string(),
                })?;
            header.tags.insert(tag, value);
        }
        Ok(header)
    }

    /// Renders the header as `Key = Value` lines in canonical
    /// tag order. Absent tags produce no line at all.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn get(&self, tag : Tag) -> Option<&TagValue> {
        self.tags.get(&tag)
    }

    pub fn contains(&self, tag : Tag) -> bool {
        self.tags.contains_key(&tag)
    }

    /// Sets `tag` to `value`, returning the previous value.
    ///
    /// ## Errors
    ///
    /// * `WrongValueKind` - `value` is not of the kind `tag` holds
    /// * `InvalidValue` - a text value contains a line break
    ///
    /// ## Example
    ///
    /// ```
    /// use mhdio::{MetaHeader, Tag};
    ///
    /// let mut header = MetaHeader::new();
    /// header.insert(Tag::ElementSpacing, vec![0.5f64, 0.5, 2.0]).unwrap();
    /// assert!(header.insert(Tag::ElementSpacing, "0.5 0.5 2.0").is_err());
    /// ```
    pub fn insert<V : Into<TagValue>>(&mut self, tag : Tag, value : V)
        -> Result<Option<TagValue>> {
        let value = value.into();
        if value.kind() != tag.kind() {
            return Err(MetaImageError::WrongValueKind { tag, expected : tag.kind() });
        }
        check_single_line(tag, &value)?;
        Ok(self.tags.insert(tag, value))
    }

    /// Sets `tag` from its textual form, parsed the same way a
    /// header file line would be. Lets sequence tags be supplied
    /// as already-joined strings like `"1 1 2.5"`.
    pub fn insert_str(&mut self, tag : Tag, content : &str) -> Result<Option<TagValue>> {
        let content = content.trim();
        let value = tag.parse_value(content)
            .ok_or_else(|| MetaImageError::InvalidValue {
                tag,
                value : content.to_string(),
            })?;
        check_single_line(tag, &value)?;
        Ok(self.tags.insert(tag, value))
    }

    pub fn remove(&mut self, tag : Tag) -> Option<TagValue> {
        self.tags.remove(&tag)
    }

    /// Iterates over the present tags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &TagValue)> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn integer(&self, tag : Tag) -> Option<usize> {
        match self.tags.get(&tag) {
            Some(TagValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    fn boolean(&self, tag : Tag) -> Option<bool> {
        match self.tags.get(&tag) {
            Some(TagValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    fn text(&self, tag : Tag) -> Option<&str> {
        match self.tags.get(&tag) {
            Some(TagValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Number of spatial dimensions (`NDims`).
    pub fn ndims(&self) -> Result<usize> {
        self.integer(Tag::NDims).ok_or(MetaImageError::MissingTag(Tag::NDims))
    }

    /// `DimSize`, fastest-varying axis first.
    pub fn dim_size(&self) -> Result<&[usize]> {
        match self.tags.get(&Tag::DimSize) {
            Some(TagValue::Integers(sizes)) => Ok(sizes.as_slice()),
            _ => Err(MetaImageError::MissingTag(Tag::DimSize)),
        }
    }

    /// ## Errors
    ///
    /// * `MissingTag` - no `ElementType` tag
    /// * `UnsupportedElementType` - the tag names a type outside
    /// the `MET_*` set this crate supports
    pub fn element_type(&self) -> Result<ElementType> {
        self.text(Tag::ElementType)
            .ok_or(MetaImageError::MissingTag(Tag::ElementType))?
            .parse()
    }

    /// `ElementNumberOfChannels`, or 1 if absent.
    pub fn element_channels(&self) -> usize {
        self.integer(Tag::ElementNumberOfChannels).unwrap_or(1)
    }

    pub fn element_data_file(&self) -> Result<&str> {
        self.text(Tag::ElementDataFile)
            .ok_or(MetaImageError::MissingTag(Tag::ElementDataFile))
    }

    /// Byte order declared by `BinaryDataByteOrderMSB`, if any.
    pub fn byte_order(&self) -> Option<Endian> {
        self.boolean(Tag::BinaryDataByteOrderMSB)
            .map(|msb| if msb { Endian::Big } else { Endian::Little })
    }

    pub fn is_compressed(&self) -> bool {
        self.boolean(Tag::CompressedData).unwrap_or(false)
    }
}

impl fmt::Display for MetaHeader {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        for (tag, value) in self.tags.iter() {
            writeln!(f, "{} = {}", tag, value)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for MetaHeader {
    type Err = MetaImageError;

    fn from_str(s : &str) -> Result<Self> {
        MetaHeader::parse(s)
    }
}

impl From<MetaHeader> for BTreeMap<Tag, TagValue> {
    fn from(header : MetaHeader) -> Self {
        header.tags
    }
}

/// Each tag renders to exactly one header line.
fn check_single_line(tag : Tag, value : &TagValue) -> Result<()> {
    match value {
        TagValue::Text(text) if text.contains(|c : char| c == '\n' || c == '\r') => {
            Err(MetaImageError::InvalidValue { tag, value : text.clone() })
        },
        _ => Ok(()),
    }
}

impl TryFrom<BTreeMap<Tag, TagValue>> for MetaHeader {
    type Error = MetaImageError;

    fn try_from(tags : BTreeMap<Tag, TagValue>) -> Result<Self> {
        let mut header = MetaHeader::new();
        for (tag, value) in tags {
            header.insert(tag, value)?;
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TagKind;

    const EXAMPLE_HEADER : &str = "\
ObjectType = Image
NDims = 3
BinaryData = True
BinaryDataByteOrderMSB = False
CompressedData = False
TransformMatrix = 1 0 0 0 1 0 0 0 1
Offset = 0 0 0
CenterOfRotation = 0 0 0
AnatomicalOrientation = RAI
ElementSpacing = 0.5 0.5 2
DimSize = 4 5 6
ElementType = MET_SHORT
ElementDataFile = volume.raw
";

    #[test]
    fn test_parse_example() {
        let header = MetaHeader::parse(EXAMPLE_HEADER).unwrap();

        assert_eq!(header.len(), 13);
        assert_eq!(header.ndims().unwrap(), 3);
        assert_eq!(header.dim_size().unwrap(), &[4, 5, 6]);
        assert_eq!(header.element_type().unwrap(), ElementType::Short);
        assert_eq!(header.element_channels(), 1);
        assert_eq!(header.element_data_file().unwrap(), "volume.raw");
        assert_eq!(header.byte_order(), Some(Endian::Little));
        assert!(!header.is_compressed());
        assert_eq!(
            header.get(Tag::ElementSpacing),
            Some(&TagValue::Floats(vec![0.5, 0.5, 2.0]))
        );
        assert_eq!(
            header.get(Tag::AnatomicalOrientation),
            Some(&TagValue::Text("RAI".to_string()))
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let header = MetaHeader::parse(
            "NDims = 2\nComment = first\nNDims = 3\nComment = second\n"
        ).unwrap();
        assert_eq!(header.ndims().unwrap(), 2);
        assert_eq!(header.get(Tag::Comment), Some(&TagValue::from("first")));
    }

    #[test]
    fn test_unknown_and_blank_lines_ignored() {
        let header = MetaHeader::parse(
            "Modality = MET_MOD_CT\n\n   \nNDims = 1\nHeaderSize = -1\n"
        ).unwrap();
        assert_eq!(header.len(), 1);
        assert_eq!(header.ndims().unwrap(), 1);
    }

    #[test]
    fn test_split_on_first_delimiter() {
        let header = MetaHeader::parse("Comment =  a = b  \n").unwrap();
        assert_eq!(header.get(Tag::Comment), Some(&TagValue::from("a = b")));
    }

    #[test]
    fn test_malformed_line() {
        let err = MetaHeader::parse("NDims = 3\nDimSize 4 5 6\n").unwrap_err();
        match err {
            MetaImageError::MalformedLine { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "DimSize 4 5 6");
            },
            other => panic!("Unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value() {
        assert!(matches!(
            MetaHeader::parse("NDims = three\n"),
            Err(MetaImageError::InvalidValue { tag : Tag::NDims, .. })
        ));
    }

    #[test]
    fn test_unsupported_element_type() {
        let header = MetaHeader::parse("ElementType = MET_UNKNOWN\n").unwrap();
        match header.element_type() {
            Err(MetaImageError::UnsupportedElementType(name)) => {
                assert_eq!(name, "MET_UNKNOWN")
            },
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_render_canonical_order() {
        let mut header = MetaHeader::new();
        header.insert(Tag::ElementDataFile, "a.raw").unwrap();
        header.insert(Tag::DimSize, vec![6usize, 5, 4]).unwrap();
        header.insert(Tag::BinaryData, true).unwrap();
        header.insert(Tag::ObjectType, "Image").unwrap();
        header.insert(Tag::NDims, 3usize).unwrap();
        header.insert(Tag::BinaryDataByteOrderMSB, false).unwrap();

        assert_eq!(
            header.render(),
            "ObjectType = Image\n\
             NDims = 3\n\
             BinaryData = True\n\
             BinaryDataByteOrderMSB = False\n\
             DimSize = 6 5 4\n\
             ElementDataFile = a.raw\n"
        );
    }

    #[test]
    fn test_render_parse_agree() {
        let header = MetaHeader::parse(EXAMPLE_HEADER).unwrap();
        assert_eq!(MetaHeader::parse(&header.render()).unwrap(), header);
    }

    #[test]
    fn test_insert_checks_kind() {
        let mut header = MetaHeader::new();
        assert!(matches!(
            header.insert(Tag::NDims, "3"),
            Err(MetaImageError::WrongValueKind { tag : Tag::NDims, expected : TagKind::Integer })
        ));
        assert!(header.is_empty());

        header.insert_str(Tag::Offset, " 1.5 2 -3 ").unwrap();
        assert_eq!(header.get(Tag::Offset), Some(&TagValue::Floats(vec![1.5, 2.0, -3.0])));
        assert!(header.insert_str(Tag::DimSize, "1 two").is_err());

        let previous = header.insert(Tag::Offset, vec![0.0f64, 0.0, 0.0]).unwrap();
        assert_eq!(previous, Some(TagValue::Floats(vec![1.5, 2.0, -3.0])));
        assert_eq!(header.remove(Tag::Offset), Some(TagValue::Floats(vec![0.0; 3])));
    }

    #[test]
    fn test_insert_rejects_line_breaks() {
        let mut header = MetaHeader::new();
        assert!(matches!(
            header.insert(Tag::Comment, "a\nb"),
            Err(MetaImageError::InvalidValue { tag : Tag::Comment, .. })
        ));
        assert!(matches!(
            header.insert(Tag::AnatomicalOrientation, "RAI\r"),
            Err(MetaImageError::InvalidValue { tag : Tag::AnatomicalOrientation, .. })
        ));
        assert!(header.insert_str(Tag::Comment, "first\nsecond").is_err());
        assert!(header.is_empty());

        header.insert(Tag::Comment, "one line").unwrap();
        assert_eq!(header.render().parse::<MetaHeader>().unwrap(), header);
    }

    #[test]
    fn test_missing_tags() {
        let header = MetaHeader::new();
        assert!(matches!(header.ndims(), Err(MetaImageError::MissingTag(Tag::NDims))));
        assert!(matches!(header.dim_size(), Err(MetaImageError::MissingTag(Tag::DimSize))));
        assert_eq!(header.byte_order(), None);
        assert_eq!(header.element_channels(), 1);
    }
}
