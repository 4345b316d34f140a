//! XML serialization of request payloads.
//!
//! The only request document in the ECS extension set is
//! `CreateBucketConfiguration`, written with the S3 namespace on the root.

use std::io::{self, Write};

use ecs_s3_model::types::CreateBucketConfiguration;
use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Trait for serializing types to XML.
///
/// Implementors write their content as child elements inside the current XML context.
/// The root element name and namespace are handled by the top-level [`to_xml`] function.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require `io::Result<()>`.
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as an XML document with declaration and namespace.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write `<tag>text</tag>` only if the value is `Some`.
fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        writer
            .create_element(tag)
            .write_text_content(BytesText::new(v))?;
    }
    Ok(())
}

impl S3Serialize for CreateBucketConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_optional_text(
            writer,
            "LocationConstraint",
            self.location_constraint.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_location_constraint() {
        let config = CreateBucketConfiguration {
            location_constraint: Some("eu-west-1".to_owned()),
        };

        let xml = to_xml("CreateBucketConfiguration", &config).expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml_str.contains(
            "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"
        ));
        assert!(xml_str.contains("<LocationConstraint>eu-west-1</LocationConstraint>"));
        assert!(xml_str.ends_with("</CreateBucketConfiguration>"));
    }

    #[test]
    fn test_should_omit_absent_location_constraint() {
        let xml = to_xml("CreateBucketConfiguration", &CreateBucketConfiguration::default())
            .expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");
        assert!(!xml_str.contains("LocationConstraint"));
    }

    #[test]
    fn test_should_escape_special_characters() {
        let config = CreateBucketConfiguration {
            location_constraint: Some("a<b&c".to_owned()),
        };
        let xml = to_xml("CreateBucketConfiguration", &config).expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");
        assert!(xml_str.contains("a&lt;b&amp;c"));
    }
}
