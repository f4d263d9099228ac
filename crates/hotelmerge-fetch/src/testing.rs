//! Throwaway HTTP server and image fixtures for exercising fetches without the network.
//!
//! One request per connection, canned responses keyed by path. Unknown paths get a 404.

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use image::{ImageFormat, RgbImage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const MAX_REQUEST_HEAD: usize = 8 * 1024;

#[derive(Debug, Clone)]
enum Canned {
    Body {
        status: u16,
        content_type: &'static str,
        body: Vec<u8>,
    },
    /// Accept the request and never answer.
    Hang,
}

#[derive(Debug, Default)]
pub struct StubServerBuilder {
    routes: HashMap<String, Canned>,
}

impl StubServerBuilder {
    /// Serve `bytes` as a 200 image response.
    pub fn image(self, path: &str, bytes: Vec<u8>) -> Self {
        self.body(path, 200, "image/png", bytes)
    }

    /// Serve an empty response with the given status.
    pub fn status(self, path: &str, status: u16) -> Self {
        self.body(path, status, "text/plain", Vec::new())
    }

    pub fn body(
        mut self,
        path: &str,
        status: u16,
        content_type: &'static str,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned::Body {
                status,
                content_type,
                body: body.into(),
            },
        );
        self
    }

    pub fn hang(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), Canned::Hang);
        self
    }

    pub async fn start(self) -> std::io::Result<StubServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let routes = Arc::new(self.routes);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                tokio::spawn(async move {
                    let _ = respond(stream, &routes).await;
                });
            }
        });
        Ok(StubServer { addr, handle })
    }
}

/// Local HTTP server; stops when dropped.
pub struct StubServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder::default()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(mut stream: TcpStream, routes: &HashMap<String, Canned>) -> std::io::Result<()> {
    let path = read_request_path(&mut stream).await?;
    let canned = routes.get(&path).cloned().unwrap_or(Canned::Body {
        status: 404,
        content_type: "text/plain",
        body: b"not found".to_vec(),
    });

    match canned {
        Canned::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
        Canned::Body {
            status,
            content_type,
            body,
        } => {
            let head = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reason(status),
                body.len()
            );
            stream.write_all(head.as_bytes()).await?;
            stream.write_all(&body).await?;
            stream.shutdown().await
        }
    }
}

async fn read_request_path(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") && head.len() < MAX_REQUEST_HEAD {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    let head = String::from_utf8_lossy(&head);
    // "GET /path HTTP/1.1"
    Ok(head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Encode a black `width` x `height` PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode png fixture");
    out
}

/// A GIF header declaring a 0x0 logical screen, followed by the trailer.
pub fn zero_size_gif() -> Vec<u8> {
    let mut out = b"GIF89a".to_vec();
    out.extend_from_slice(&[0, 0, 0, 0, 0x00, 0, 0]);
    out.push(0x3B);
    out
}
