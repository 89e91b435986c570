//! Response body module
//!
//! One body type for every response: empty, in-memory, or a byte interval
//! streamed from an open file.

use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Read chunk size when streaming files
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Body of every response produced by the middleware
pub type ServeBody = UnsyncBoxBody<Bytes, io::Error>;

/// Empty body
pub fn empty() -> ServeBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// In-memory body
pub fn full(data: impl Into<Bytes>) -> ServeBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Stream `len` bytes of `file` starting at `offset`
///
/// The file handle is owned by the body; dropping the body (for example when
/// the client disconnects) closes it and stops further reads.
pub async fn file_range(mut file: File, offset: u64, len: u64) -> io::Result<ServeBody> {
    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }
    let stream = ReaderStream::with_capacity(file.take(len), STREAM_CHUNK_SIZE);
    Ok(StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync())
}
