use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::ClientError;
use crate::objects::Notification;

/// Subscription to the server's broadcast socket.
///
/// ```no_run
/// # async fn run() -> Result<(), potluck_sdk::client::ClientError> {
/// let mut stream =
///     potluck_sdk::client::NotificationStream::connect("ws://localhost:8080/ws").await?;
/// while let Some(msg) = stream.next().await {
///     println!("{}", msg?.kind());
/// }
/// # Ok(())
/// # }
/// ```
pub struct NotificationStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl NotificationStream {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (socket, _response) = connect_async(url).await?;
        Ok(Self { socket })
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the server closes the connection.
    pub async fn next(&mut self) -> Option<Result<Notification, ClientError>> {
        loop {
            let frame = match self.socket.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e.into())),
            };
            match frame {
                Message::Text(text) => {
                    return Some(serde_json::from_str(&text).map_err(ClientError::from));
                }
                Message::Binary(bytes) => {
                    return Some(serde_json::from_slice(&bytes).map_err(ClientError::from));
                }
                Message::Close(_) => return None,
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    /// Send a close frame and drop the connection.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }
}
