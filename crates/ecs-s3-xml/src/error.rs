//! XML error types and the S3 error envelope.
//!
//! Failed requests come back as a flat `<Error>` element without an outer
//! `<ErrorResponse>` wrapper:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Error>
//!   <Code>NoSuchBucket</Code>
//!   <Message>The specified bucket does not exist</Message>
//!   <Resource>/mybucket</Resource>
//!   <RequestId>0af9f5a1:17a0c1c1f2b:3e2c:1</RequestId>
//! </Error>
//! ```

use std::io;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::deserialize::{S3Deserialize, element_name, from_xml, read_text_content, skip_element};

/// Errors that can occur during XML serialization or deserialization.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),
}

/// The fields of an S3 `<Error>` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// `Code`.
    pub code: Option<String>,
    /// `Message`.
    pub message: Option<String>,
    /// `Resource`.
    pub resource: Option<String>,
    /// `RequestId`.
    pub request_id: Option<String>,
}

impl S3Deserialize for ErrorEnvelope {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut envelope = Self::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "Code" => envelope.code = Some(read_text_content(reader)?),
                    "Message" => envelope.message = Some(read_text_content(reader)?),
                    "Resource" => envelope.resource = Some(read_text_content(reader)?),
                    "RequestId" => envelope.request_id = Some(read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in Error".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(envelope)
    }
}

/// Parse an error response body.
///
/// # Errors
///
/// Returns `XmlError` if the body is not a well-formed XML document.
pub fn parse_error(body: &[u8]) -> Result<ErrorEnvelope, XmlError> {
    from_xml(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_error_with_resource() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
        <Error>
            <Code>NoSuchBucket</Code>
            <Message>The specified bucket does not exist</Message>
            <Resource>/mybucket</Resource>
            <RequestId>0af9f5a1:17a0c1c1f2b:3e2c:1</RequestId>
        </Error>"#;

        let envelope = parse_error(xml).expect("deserialization should succeed");
        assert_eq!(envelope.code.as_deref(), Some("NoSuchBucket"));
        assert_eq!(
            envelope.message.as_deref(),
            Some("The specified bucket does not exist")
        );
        assert_eq!(envelope.resource.as_deref(), Some("/mybucket"));
        assert_eq!(
            envelope.request_id.as_deref(),
            Some("0af9f5a1:17a0c1c1f2b:3e2c:1")
        );
    }

    #[test]
    fn test_should_parse_error_without_resource() {
        let xml = b"<Error><Code>InternalError</Code><Message>oops</Message></Error>";
        let envelope = parse_error(xml).expect("deserialization should succeed");
        assert_eq!(envelope.code.as_deref(), Some("InternalError"));
        assert!(envelope.resource.is_none());
        assert!(envelope.request_id.is_none());
    }

    #[test]
    fn test_should_unescape_special_characters() {
        let xml = b"<Error><Code>InvalidArgument</Code>\
            <Message>Value must be &lt; 1024 &amp; &gt; 0</Message></Error>";
        let envelope = parse_error(xml).expect("deserialization should succeed");
        assert_eq!(
            envelope.message.as_deref(),
            Some("Value must be < 1024 & > 0")
        );
    }

    #[test]
    fn test_should_reject_empty_error_body() {
        assert!(matches!(parse_error(b""), Err(XmlError::MissingElement(_))));
    }
}
