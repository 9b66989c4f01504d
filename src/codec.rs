use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::Error;

const LF: u8 = b'\n';

/// Splits the inbound byte stream into request lines. A line is terminated
/// by LF; one trailing CR is tolerated and stripped. Bytes after the last
/// LF stay buffered until more data arrives.
pub struct LineCodec;

impl Decoder for LineCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(position) = src.iter().position(|&byte| byte == LF) else {
            return Ok(None); // No full line buffered yet.
        };

        let mut line = src.split_to(position);
        src.advance(1); // Drop the LF itself.
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}
