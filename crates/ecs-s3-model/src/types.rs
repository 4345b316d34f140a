//! Shared enums and structures used by several operations.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declare a string-valued enum. Values the client does not know are kept in
/// `Unknown` so nothing the server sends is lost.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value not known to this client, preserved verbatim.
            Unknown(String),
        }

        impl $name {
            /// Returns the wire value of this variant.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Unknown(s) => s,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($value => Self::$variant,)+
                    other => Self::Unknown(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from(s.as_str())
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_owned()
            }
        }
    };
}

string_enum! {
    /// Canned ACL applied at bucket creation.
    BucketCannedACL {
        Private => "private",
        PublicRead => "public-read",
        PublicReadWrite => "public-read-write",
        AuthenticatedRead => "authenticated-read",
    }
}

string_enum! {
    /// Canned ACL applied to an object.
    ObjectCannedACL {
        Private => "private",
        PublicRead => "public-read",
        PublicReadWrite => "public-read-write",
        AuthenticatedRead => "authenticated-read",
        AwsExecRead => "aws-exec-read",
        BucketOwnerRead => "bucket-owner-read",
        BucketOwnerFullControl => "bucket-owner-full-control",
    }
}

string_enum! {
    /// Server-side encryption algorithm.
    ServerSideEncryption {
        Aes256 => "AES256",
        AwsKms => "aws:kms",
    }
}

string_enum! {
    /// Object storage class.
    StorageClass {
        Standard => "STANDARD",
        ReducedRedundancy => "REDUCED_REDUNDANCY",
        StandardIa => "STANDARD_IA",
        OnezoneIa => "ONEZONE_IA",
        IntelligentTiering => "INTELLIGENT_TIERING",
        Glacier => "GLACIER",
        DeepArchive => "DEEP_ARCHIVE",
    }
}

string_enum! {
    /// Confirms the requester knows they will be charged.
    RequestPayer {
        Requester => "requester",
    }
}

string_enum! {
    /// Reported when the requester was charged.
    RequestCharged {
        Requester => "requester",
    }
}

string_enum! {
    /// Cross-site replication state of an object.
    ReplicationStatus {
        Complete => "COMPLETE",
        Pending => "PENDING",
        Failed => "FAILED",
        Replica => "REPLICA",
    }
}

string_enum! {
    /// Datatype of an indexable metadata key.
    MetadataDatatype {
        String => "string",
        Integer => "integer",
        Decimal => "decimal",
        Datetime => "datetime",
    }
}

/// Payload of `CreateBucket`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBucketConfiguration {
    /// `LocationConstraint`: the region the bucket is created in.
    pub location_constraint: Option<String>,
}

/// A metadata key that can be indexed for search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexableKey {
    /// `Name`, e.g. `Size` or `x-amz-meta-owner`.
    pub name: Option<String>,
    /// `Datatype`.
    pub datatype: Option<MetadataDatatype>,
}

/// An attribute that can be requested alongside query results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalAttribute {
    /// `Name`, e.g. `ContentType`.
    pub name: Option<String>,
    /// `Datatype`.
    pub datatype: Option<MetadataDatatype>,
}

/// One object matched by a metadata query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMatch {
    /// `indexKey`: value of the sort key for this match.
    pub index_key: Option<String>,
    /// `objectId`.
    pub object_id: Option<String>,
    /// `objectName`: the object key.
    pub object_name: Option<String>,
    /// `objectOwnerZone`.
    pub object_owner_zone: Option<String>,
    /// `versionId`.
    pub version_id: Option<String>,
    /// `queryMds` (flattened): metadata groups returned for the match.
    pub query_mds: Vec<QueryMetadata>,
}

/// A group of metadata values attached to a query match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// `type`: e.g. `SYSMD` or `USERMD`.
    pub md_type: Option<String>,
    /// `mdMap`: `<entry><key/><value/></entry>` pairs.
    pub md_map: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_preserve_unknown_enum_value() {
        let class = StorageClass::from("COLD_LINE");
        assert_eq!(class, StorageClass::Unknown("COLD_LINE".to_owned()));
        assert_eq!(class.as_str(), "COLD_LINE");
        assert_eq!(StorageClass::from("STANDARD"), StorageClass::Standard);
    }

    #[test]
    fn test_should_serialize_enum_as_wire_string() {
        let json = serde_json::to_string(&ServerSideEncryption::Aes256).expect("serialize");
        assert_eq!(json, "\"AES256\"");
        let back: ServerSideEncryption = serde_json::from_str("\"aws:kms\"").expect("deserialize");
        assert_eq!(back, ServerSideEncryption::AwsKms);
    }

    #[test]
    fn test_should_serialize_object_match() {
        let m = ObjectMatch {
            object_name: Some("1".to_owned()),
            query_mds: vec![QueryMetadata {
                md_type: Some("SYSMD".to_owned()),
                md_map: HashMap::from([("size".to_owned(), "4".to_owned())]),
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(&m).expect("serialize");
        assert_eq!(value["object_name"], "1");
        assert_eq!(value["query_mds"][0]["md_map"]["size"], "4");
    }
}
