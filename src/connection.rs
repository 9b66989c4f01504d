use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_util::codec::FramedRead;

use crate::codec::LineCodec;
use crate::response::Response;
use crate::Error;

static NEXT_CONNECTION_NUMBER: AtomicU64 = AtomicU64::new(0);

/// One client connection: the split socket plus the session id that keys
/// this connection's database selection and pending transaction.
pub struct Connection {
    /// Opaque session id, unique per live connection: the peer address plus
    /// a process-wide counter.
    pub id: String,
    reader: FramedRead<OwnedReadHalf, LineCodec>,
    writer: OwnedWriteHalf,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr) -> Connection {
        let number = NEXT_CONNECTION_NUMBER.fetch_add(1, Ordering::Relaxed);
        let (read_half, write_half) = stream.into_split();

        Connection {
            id: format!("{client_address}-{number}"),
            reader: FramedRead::new(read_half, LineCodec),
            writer: write_half,
        }
    }

    /// Next request line, or `None` once the client disconnects.
    pub async fn read_line(&mut self) -> Result<Option<String>, Error> {
        self.reader.next().await.transpose()
    }

    /// Writes one response as a single LF-terminated payload.
    pub async fn write_response(&mut self, response: Response) -> Result<(), Error> {
        let bytes: Vec<u8> = response.into();
        self.writer.write_all(&bytes).await?;
        Ok(())
    }
}
