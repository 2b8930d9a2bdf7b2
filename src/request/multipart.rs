//! Multipart form-data assembly.
//!
//! Builds a `multipart/form-data` body as a sequence of independently
//! readable segments: in-memory text blocks owned by the assembler, raw
//! attachment bytes, and caller-owned payload streams that are consumed
//! lazily and never buffered or copied. The composite is handed to the
//! transport as one flattened byte stream, so cancelling the transport call
//! also stops further reads from attachment streams.

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use futures_util::Stream;

use crate::encoding::encode_value;
use crate::error::FbError;
use crate::params::{ByteStream, MediaBytes, MediaStream, Params};

/// One logically independent piece of the multipart body.
pub enum Segment {
    /// Assembler-owned in-memory data (text blocks, attachment bytes).
    Bytes(Bytes),
    /// Caller-owned attachment payload stream. Not closed by the assembler.
    Stream(ByteStream),
}

impl Segment {
    fn len(&self) -> Option<u64> {
        match self {
            Self::Bytes(b) => Some(b.len() as u64),
            Self::Stream(_) => None,
        }
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.debug_tuple("Stream").field(&"<byte stream>").finish(),
        }
    }
}

/// An assembled multipart body.
#[derive(Debug)]
pub struct MultipartBody {
    boundary: String,
    segments: Vec<Segment>,
}

impl MultipartBody {
    /// Generate a boundary token from a high-resolution timestamp.
    ///
    /// `assemble` takes the boundary explicitly so tests can pass a fixed
    /// token instead.
    pub fn generate_boundary() -> String {
        format!(
            "{:x}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        )
    }

    /// Assemble scalar parameters and attachments into an ordered segment
    /// sequence.
    ///
    /// A byte attachment missing its content type, file name, or payload is
    /// rejected; a stream attachment is rejected when content type or file
    /// name is empty (its payload exists by construction).
    pub fn assemble(
        scalars: &Params,
        byte_attachments: Vec<(String, MediaBytes)>,
        stream_attachments: Vec<(String, MediaStream)>,
        boundary: impl Into<String>,
    ) -> Result<Self, FbError> {
        let boundary = boundary.into();
        let mut segments = Vec::new();

        // (a) all scalar parameters in one owned text segment
        if !scalars.is_empty() {
            let mut text = String::new();
            for (key, value) in scalars.iter() {
                text.push_str(&format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{key}\"\r\n\r\n{}\r\n",
                    encode_value(value)?
                ));
            }
            segments.push(Segment::Bytes(Bytes::from(text)));
        }

        // (b) byte attachments: header block, raw bytes, trailing newline
        for (key, attachment) in byte_attachments {
            if attachment.content_type.is_empty()
                || attachment.file_name.is_empty()
                || attachment.bytes.is_empty()
            {
                return Err(FbError::UnsupportedOperation(format!(
                    "media attachment '{key}' requires content type, file name and data"
                )));
            }
            segments.push(Segment::Bytes(part_header(
                &boundary,
                &key,
                &attachment.file_name,
                &attachment.content_type,
            )));
            segments.push(Segment::Bytes(Bytes::from(attachment.bytes)));
            segments.push(Segment::Bytes(Bytes::from_static(b"\r\n")));
        }

        // (c) stream attachments: same shape, payload stays caller-owned
        for (key, attachment) in stream_attachments {
            if attachment.content_type.is_empty() || attachment.file_name.is_empty() {
                return Err(FbError::UnsupportedOperation(format!(
                    "media attachment '{key}' requires content type, file name and data"
                )));
            }
            segments.push(Segment::Bytes(part_header(
                &boundary,
                &key,
                &attachment.file_name,
                &attachment.content_type,
            )));
            segments.push(Segment::Stream(attachment.stream));
            segments.push(Segment::Bytes(Bytes::from_static(b"\r\n")));
        }

        // (d) closing boundary
        segments.push(Segment::Bytes(Bytes::from(format!(
            "\r\n--{boundary}--\r\n"
        ))));

        Ok(Self { boundary, segments })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Total body length, known only when every segment is in memory.
    pub fn len_hint(&self) -> Option<u64> {
        self.segments.iter().map(Segment::len).sum()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Flatten the segments into one lazily-read byte stream.
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
        stream::iter(self.segments).flat_map(|segment| match segment {
            Segment::Bytes(bytes) => stream::once(futures::future::ready(Ok(bytes))).boxed(),
            Segment::Stream(payload) => payload,
        })
    }
}

fn part_header(boundary: &str, name: &str, file_name: &str, content_type: &str) -> Bytes {
    Bytes::from(format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    ))
}
