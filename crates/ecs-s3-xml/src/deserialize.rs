//! XML deserialization: parsing ECS response documents into model types.
//!
//! The parsers walk `quick_xml` events and match on local element names, so a
//! default `xmlns` on the root is accepted. Unknown elements are skipped.

use std::collections::HashMap;

use ecs_s3_model::output::{
    GetSystemMetadataSearchKeysOutput, ListBucketMetadataSearchOutput, ListBucketQueryOutput,
};
use ecs_s3_model::types::{
    IndexableKey, MetadataDatatype, ObjectMatch, OptionalAttribute, QueryMetadata,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::XmlError;

/// Trait for deserializing types from XML.
///
/// The root element has already been consumed by the caller; the implementation
/// reads child elements until the matching end tag.
pub trait S3Deserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// The reader is positioned just after the opening tag of this element.
    /// The implementation should read all child content and return when
    /// the matching end tag is consumed.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize an XML document into a typed value.
///
/// Finds the root element and delegates to the type's `S3Deserialize` implementation.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or deserialization fails.
pub fn from_xml<T: S3Deserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);

    // Skip the XML declaration and find the root element.
    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return T::deserialize_xml(&mut reader);
            }
            Event::Empty(_) => {
                return deserialize_empty();
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_string()));
            }
            // Skip declaration, comments, processing instructions, whitespace.
            _ => {}
        }
    }
}

/// Check that a body is well-formed XML without decoding anything from it.
///
/// An empty body passes.
///
/// # Errors
///
/// Returns `XmlError` on mismatched or otherwise ill-formed markup.
pub fn check_well_formed(xml: &[u8]) -> Result<(), XmlError> {
    let mut reader = Reader::from_reader(xml);
    let mut depth: u32 = 0;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(XmlError::UnexpectedElement(
            "unexpected EOF before closing tag".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

/// The local name of an element, without any namespace prefix.
pub(crate) fn element_name<'a>(e: &'a BytesStart<'_>) -> Result<&'a str, XmlError> {
    std::str::from_utf8(e.local_name().into_inner()).map_err(|err| XmlError::ParseError(err.to_string()))
}

/// Read the text content of the current element and consume its end tag.
///
/// Expects the reader to be positioned right after a `Start` event. Entity and
/// character references are resolved.
pub(crate) fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::CData(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?
                {
                    text.push(ch);
                } else {
                    let name = e
                        .decode()
                        .map_err(|err| XmlError::ParseError(err.to_string()))?;
                    let resolved = quick_xml::escape::resolve_predefined_entity(&name)
                        .ok_or_else(|| XmlError::ParseError(format!("unknown entity &{name};")))?;
                    text.push_str(resolved);
                }
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
pub(crate) fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Deserialize a self-closing element (`<Key/>`) as one with no children.
fn deserialize_empty<T: S3Deserialize>() -> Result<T, XmlError> {
    let mut empty = Reader::from_reader(&b"<empty></empty>"[..]);
    empty.read_event()?;
    T::deserialize_xml(&mut empty)
}

/// Parse a boolean from XML text ("true"/"false").
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

/// Parse an i64 from XML text.
fn parse_i64(s: &str) -> Result<i64, XmlError> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| XmlError::ParseError(format!("invalid i64 '{s}': {e}")))
}

/// Deserialize a list of items where each item is wrapped in the given element name.
fn deserialize_list<T: S3Deserialize>(
    reader: &mut Reader<&[u8]>,
    item_tag: &str,
) -> Result<Vec<T>, XmlError> {
    let mut items = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if element_name(&e)? == item_tag {
                    items.push(T::deserialize_xml(reader)?);
                } else {
                    skip_element(reader)?;
                }
            }
            Event::Empty(e) => {
                if element_name(&e)? == item_tag {
                    items.push(deserialize_empty()?);
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF in list".to_string(),
                ));
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Read a `<Name/>` + `<Datatype/>` pair, shared by indexable keys and
/// optional attributes.
fn read_named_datatype(
    reader: &mut Reader<&[u8]>,
    context: &str,
) -> Result<(Option<String>, Option<MetadataDatatype>), XmlError> {
    let mut name = None;
    let mut datatype = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match element_name(&e)? {
                "Name" => name = Some(read_text_content(reader)?),
                "Datatype" => datatype = Some(MetadataDatatype::from(read_text_content(reader)?)),
                _ => skip_element(reader)?,
            },
            Event::End(_) => break,
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(format!(
                    "unexpected EOF in {context}"
                )));
            }
            _ => {}
        }
    }

    Ok((name, datatype))
}

// ---------------------------------------------------------------------------
// S3Deserialize implementations
// ---------------------------------------------------------------------------

impl S3Deserialize for IndexableKey {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let (name, datatype) = read_named_datatype(reader, "Key")?;
        Ok(IndexableKey { name, datatype })
    }
}

impl S3Deserialize for OptionalAttribute {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let (name, datatype) = read_named_datatype(reader, "Attribute")?;
        Ok(OptionalAttribute { name, datatype })
    }
}

/// One `<entry><key/><value/></entry>` of an `mdMap`.
struct MapEntry {
    key: Option<String>,
    value: Option<String>,
}

impl S3Deserialize for MapEntry {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = None;
        let mut value = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "key" => key = Some(read_text_content(reader)?),
                    "value" => value = Some(read_text_content(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in entry".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(MapEntry { key, value })
    }
}

impl S3Deserialize for QueryMetadata {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut md_type = None;
        let mut md_map = HashMap::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "type" => md_type = Some(read_text_content(reader)?),
                    "mdMap" => {
                        let entries: Vec<MapEntry> = deserialize_list(reader, "entry")?;
                        for entry in entries {
                            if let Some(key) = entry.key {
                                md_map.insert(key, entry.value.unwrap_or_default());
                            }
                        }
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in queryMds".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(QueryMetadata { md_type, md_map })
    }
}

impl S3Deserialize for ObjectMatch {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut m = ObjectMatch::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "indexKey" => m.index_key = Some(read_text_content(reader)?),
                    "objectId" => m.object_id = Some(read_text_content(reader)?),
                    "objectName" => m.object_name = Some(read_text_content(reader)?),
                    "objectOwnerZone" => m.object_owner_zone = Some(read_text_content(reader)?),
                    "versionId" => m.version_id = Some(read_text_content(reader)?),
                    // Flattened: one element per metadata group.
                    "queryMds" => m.query_mds.push(QueryMetadata::deserialize_xml(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in object".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(m)
    }
}

impl S3Deserialize for ListBucketMetadataSearchOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = ListBucketMetadataSearchOutput::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "MetadataSearchEnabled" => {
                        out.metadata_search_enabled =
                            Some(parse_bool(&read_text_content(reader)?)?);
                    }
                    "IndexableKeys" => out.indexable_keys = deserialize_list(reader, "Key")?,
                    "OptionalAttributes" => {
                        out.optional_attributes = deserialize_list(reader, "Attribute")?;
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in MetadataSearchList".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(out)
    }
}

impl S3Deserialize for GetSystemMetadataSearchKeysOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = GetSystemMetadataSearchKeysOutput::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "IndexableKeys" => out.indexable_keys = deserialize_list(reader, "Key")?,
                    "OptionalAttributes" => {
                        out.optional_attributes = deserialize_list(reader, "Attribute")?;
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in MetadataSearchList".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(out)
    }
}

impl S3Deserialize for ListBucketQueryOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = ListBucketQueryOutput::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)? {
                    "Name" => out.name = Some(read_text_content(reader)?),
                    "NextMarker" => out.next_marker = Some(read_text_content(reader)?),
                    "MaxKeys" => out.max_keys = Some(parse_i64(&read_text_content(reader)?)?),
                    "ObjectMatches" => out.object_matches = deserialize_list(reader, "object")?,
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in BucketQueryResult".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_deserialize_metadata_search_list() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
        <MetadataSearchList xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
            <MetadataSearchEnabled>true</MetadataSearchEnabled>
            <IndexableKeys>
                <Key><Name>Size</Name><Datatype>integer</Datatype></Key>
                <Key><Name>CreateTime</Name><Datatype>datetime</Datatype></Key>
                <Key><Name>x-amz-meta-STR</Name><Datatype>string</Datatype></Key>
            </IndexableKeys>
            <OptionalAttributes>
                <Attribute><Name>ContentType</Name><Datatype>string</Datatype></Attribute>
            </OptionalAttributes>
        </MetadataSearchList>"#;

        let out: ListBucketMetadataSearchOutput =
            from_xml(xml).expect("deserialization should succeed");
        assert_eq!(out.metadata_search_enabled, Some(true));
        assert_eq!(out.indexable_keys.len(), 3);
        assert_eq!(out.indexable_keys[0].name.as_deref(), Some("Size"));
        assert_eq!(
            out.indexable_keys[0].datatype,
            Some(MetadataDatatype::Integer)
        );
        assert_eq!(out.indexable_keys[2].name.as_deref(), Some("x-amz-meta-STR"));
        assert_eq!(out.optional_attributes.len(), 1);
        assert_eq!(
            out.optional_attributes[0].name.as_deref(),
            Some("ContentType")
        );
    }

    #[test]
    fn test_should_deserialize_system_keys() {
        let xml = br#"<MetadataSearchList>
            <IndexableKeys>
                <Key><Name>LastModified</Name><Datatype>datetime</Datatype></Key>
                <Key><Name>Owner</Name><Datatype>string</Datatype></Key>
            </IndexableKeys>
            <OptionalAttributes>
                <Attribute><Name>Retention</Name><Datatype>integer</Datatype></Attribute>
                <Attribute><Name>Expiration</Name><Datatype>datetime</Datatype></Attribute>
            </OptionalAttributes>
        </MetadataSearchList>"#;

        let out: GetSystemMetadataSearchKeysOutput =
            from_xml(xml).expect("deserialization should succeed");
        assert_eq!(out.indexable_keys.len(), 2);
        assert_eq!(out.indexable_keys[1].name.as_deref(), Some("Owner"));
        assert_eq!(out.optional_attributes.len(), 2);
        assert_eq!(
            out.optional_attributes[1].datatype,
            Some(MetadataDatatype::Datetime)
        );
    }

    #[test]
    fn test_should_deserialize_query_result_in_server_order() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
        <BucketQueryResult xmlns:ns2="http://s3.amazonaws.com/doc/2006-03-01/">
            <Name>search-bucket</Name>
            <Marker/>
            <NextMarker>NO MORE PAGES</NextMarker>
            <MaxKeys>1000</MaxKeys>
            <ObjectMatches>
                <object>
                    <objectName>1</objectName>
                    <objectId>6b2b4f0a</objectId>
                    <versionId>0</versionId>
                    <queryMds>
                        <type>SYSMD</type>
                        <mdMap>
                            <entry><key>size</key><value>4</value></entry>
                            <entry><key>ctype</key><value>binary/octet-stream</value></entry>
                        </mdMap>
                    </queryMds>
                    <queryMds>
                        <type>USERMD</type>
                        <mdMap/>
                    </queryMds>
                    <indexKey/>
                </object>
                <object>
                    <objectName>2</objectName>
                    <objectId>9c1e0d42</objectId>
                    <versionId>0</versionId>
                    <queryMds>
                        <type>SYSMD</type>
                        <mdMap><entry><key>size</key><value>5</value></entry></mdMap>
                    </queryMds>
                </object>
            </ObjectMatches>
        </BucketQueryResult>"#;

        let out: ListBucketQueryOutput = from_xml(xml).expect("deserialization should succeed");
        assert_eq!(out.name.as_deref(), Some("search-bucket"));
        assert_eq!(out.max_keys, Some(1000));
        assert!(!out.has_more_pages());
        assert_eq!(out.object_matches.len(), 2);

        let first = &out.object_matches[0];
        assert_eq!(first.object_name.as_deref(), Some("1"));
        assert_eq!(first.object_id.as_deref(), Some("6b2b4f0a"));
        assert_eq!(first.query_mds.len(), 2);
        assert_eq!(first.query_mds[0].md_type.as_deref(), Some("SYSMD"));
        assert_eq!(
            first.query_mds[0].md_map.get("size").map(String::as_str),
            Some("4")
        );
        assert!(first.query_mds[1].md_map.is_empty());

        assert_eq!(out.object_matches[1].object_name.as_deref(), Some("2"));
    }

    #[test]
    fn test_should_deserialize_empty_query_result() {
        let xml = b"<BucketQueryResult><Name>b</Name><ObjectMatches/></BucketQueryResult>";
        let out: ListBucketQueryOutput = from_xml(xml).expect("deserialization should succeed");
        assert!(out.object_matches.is_empty());
        assert!(out.next_marker.is_none());
    }

    #[test]
    fn test_should_keep_self_closing_list_items() {
        let xml = b"<BucketQueryResult><ObjectMatches>\
            <object/>\
            <object><objectName>k1</objectName><queryMds><mdMap>\
            <entry/><entry><key>size</key><value>3</value></entry>\
            </mdMap></queryMds></object>\
            </ObjectMatches></BucketQueryResult>";
        let out: ListBucketQueryOutput = from_xml(xml).expect("deserialization should succeed");
        assert_eq!(out.object_matches.len(), 2);
        assert!(out.object_matches[0].object_name.is_none());
        let second = &out.object_matches[1];
        assert_eq!(second.object_name.as_deref(), Some("k1"));
        assert_eq!(second.query_mds[0].md_map.len(), 1);

        let keys: GetSystemMetadataSearchKeysOutput = from_xml(
            b"<MetadataSearchList><IndexableKeys><Key/><Key><Name>Size</Name></Key></IndexableKeys></MetadataSearchList>",
        )
        .expect("deserialization should succeed");
        assert_eq!(keys.indexable_keys.len(), 2);
        assert_eq!(keys.indexable_keys[1].name.as_deref(), Some("Size"));
    }

    #[test]
    fn test_should_accept_empty_root_element() {
        let out: GetSystemMetadataSearchKeysOutput =
            from_xml(b"<MetadataSearchList/>").expect("deserialization should succeed");
        assert!(out.indexable_keys.is_empty());
    }

    #[test]
    fn test_should_reject_invalid_boolean() {
        let xml = b"<MetadataSearchList><MetadataSearchEnabled>yes</MetadataSearchEnabled></MetadataSearchList>";
        let result: Result<ListBucketMetadataSearchOutput, _> = from_xml(xml);
        assert!(matches!(result, Err(XmlError::ParseError(_))));
    }

    #[test]
    fn test_should_accept_well_formed_or_empty_body() {
        assert!(check_well_formed(b"").is_ok());
        assert!(check_well_formed(b"<a><b>text</b></a>").is_ok());
    }

    #[test]
    fn test_should_reject_mismatched_tags() {
        assert!(check_well_formed(b"<a><b></a>").is_err());
        assert!(check_well_formed(b"<a><b></b>").is_err());
    }
}
