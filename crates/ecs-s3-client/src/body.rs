//! Response body handed from the transport to the unmarshal stage.
//!
//! The pipeline buffers the body of every response whose output has no
//! streaming payload, so unmarshal handlers see [`ResponseBody::Buffered`].
//! Only `GetObject` keeps [`ResponseBody::Streaming`] and hands the stream to
//! the caller.

use std::io;

use bytes::Bytes;
use ecs_s3_model::ByteStream;

/// HTTP response body, either in memory or still on the connection.
#[derive(Debug)]
pub enum ResponseBody {
    /// Fully read body.
    Buffered(Bytes),
    /// Body still being received.
    Streaming(ByteStream),
}

impl ResponseBody {
    /// An empty buffered body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Buffered(Bytes::new())
    }

    /// Read the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised by the stream.
    pub async fn collect(self) -> io::Result<Bytes> {
        match self {
            Self::Buffered(data) => Ok(data),
            Self::Streaming(stream) => stream.collect().await,
        }
    }

    /// Turn the body into a stream.
    #[must_use]
    pub fn into_stream(self) -> ByteStream {
        match self {
            Self::Buffered(data) => ByteStream::from_bytes(data),
            Self::Streaming(stream) => stream,
        }
    }

    /// The buffered bytes, or `None` while the body is still streaming.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Buffered(data) => Some(data),
            Self::Streaming(_) => None,
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for ResponseBody {
    fn from(data: Bytes) -> Self {
        Self::Buffered(data)
    }
}

impl From<&'static str> for ResponseBody {
    fn from(data: &'static str) -> Self {
        Self::Buffered(Bytes::from_static(data.as_bytes()))
    }
}
