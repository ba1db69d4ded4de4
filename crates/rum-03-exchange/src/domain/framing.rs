//! # Stream Framing
//!
//! Each message is a LEB128 varint length followed by that many bytes of
//! protobuf-encoded [`RumMsg`]. The length is checked against the frame
//! limit before the body buffer is allocated.

use std::io;

use prost::Message;
use shared_types::RumMsg;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::errors::ExchangeError;

/// A varint never needs more than ten bytes for a `u64`.
const MAX_VARINT_LEN: usize = 10;

/// Result of reading one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Message(RumMsg),
    /// The remote closed the stream cleanly between frames.
    Eof,
}

/// Write one length-delimited frame and flush.
pub async fn write_msg<W>(writer: &mut W, msg: &RumMsg, max_len: usize) -> Result<(), ExchangeError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let len = msg.encoded_len();
    if len > max_len {
        return Err(ExchangeError::FrameTooLarge { len, max: max_len });
    }
    let frame = msg.encode_length_delimited_to_vec();
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-delimited frame.
///
/// EOF before the first length byte is a clean close; EOF anywhere later
/// is an `Io` error.
pub async fn read_msg<R>(reader: &mut R, max_len: usize) -> Result<ReadOutcome, ExchangeError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = Vec::with_capacity(MAX_VARINT_LEN);
    loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte).await? == 0 {
            if prefix.is_empty() {
                return Ok(ReadOutcome::Eof);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "eof inside length prefix").into());
        }
        prefix.push(byte[0]);
        if byte[0] & 0x80 == 0 || prefix.len() == MAX_VARINT_LEN {
            break;
        }
    }

    // An over-long prefix still carrying the continuation bit fails here.
    let len = prost::decode_length_delimiter(prefix.as_slice())?;
    if len > max_len {
        return Err(ExchangeError::FrameTooLarge { len, max: max_len });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(ReadOutcome::Message(RumMsg::decode(body.as_slice())?))
}
