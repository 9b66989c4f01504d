use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands;
use crate::connection::Connection;
use crate::request::Request;
use crate::response::Response;
use crate::session::SessionGuard;
use crate::store::Store;
use crate::Error;

pub async fn run(address: &str) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(address).await?;
    let store = Store::new();

    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store).await {
                error!("Connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store),
    fields(session_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address);
    // The guard discards any pending transaction and forgets the session
    // on every exit path, error or EOF alike.
    let session = SessionGuard::open(&store, conn.id.clone());

    tracing::Span::current()
        .record("session_id", session.id())
        .record("client_address", client_address.to_string());

    while let Some(line) = conn.read_line().await? {
        debug!("Received line from client: {:?}", line);

        let response = match Request::parse(&line) {
            Ok(request) => commands::dispatch(&store, session.id(), request),
            Err(err) => Response::Error(err.to_string()),
        };

        debug!("Sending response to client: {}", response);
        conn.write_response(response).await?;
    }

    info!("Connection closed");
    Ok(())
}
