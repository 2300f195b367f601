//! In-process websocket server for relay tests
//!
//! Serves a fixed script: each entry is one connection, each connection
//! sends its text frames, then closes. After the last connection the
//! listener is dropped so further connects are refused.

use std::sync::{Arc, Mutex};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

pub struct RelayTestServer {
    pub url: String,
    /// Request URIs of accepted handshakes, in order
    pub handshakes: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl RelayTestServer {
    pub async fn start(connections: Vec<Vec<String>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind relay test server");
        let addr = listener.local_addr().expect("relay test server address");
        let handshakes = Arc::new(Mutex::new(Vec::new()));
        let recorded = handshakes.clone();

        let handle = tokio::spawn(async move {
            for frames in connections {
                let (stream, _) = listener.accept().await.expect("accept relay connection");
                let recorded = recorded.clone();
                let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                    recorded.lock().unwrap().push(request.uri().to_string());
                    Ok(response)
                };
                let mut socket = accept_hdr_async(stream, callback).await.expect("websocket handshake");

                for frame in frames {
                    socket.send(Message::Text(frame.into())).await.expect("send frame");
                }
                socket.close(None).await.ok();

                // Wait for the client's close reply so no frame is lost to a reset
                while let Some(Ok(_)) = socket.next().await {}
            }
        });

        Self {
            url: format!("ws://{}/ws", addr),
            handshakes,
            handle,
        }
    }

    /// Wait until the scripted connections have been served
    pub async fn finished(self) {
        self.handle.await.expect("relay test server task");
    }
}
