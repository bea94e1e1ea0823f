/// Transport: one WebSocket link to the robot controller.
///
/// ## Lifecycle
///   - `connect()` opens TCP (with a timeout), runs the client handshake,
///     then switches the socket to non-blocking.
///   - `poll()` drains every frame currently readable, in receipt order.
///   - `send()` writes one text frame; fails with `NotConnected` when the
///     link is down and transmits nothing.
///   - `close()` releases the link; calling it again is a no-op.
///
/// A dropped link stays dropped. There is no reconnect: a new session
/// means a new `Transport`.
///
/// Every inbound frame and every send attempt is mirrored to the log sink.

use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tungstenite::http::Uri;
use tungstenite::{Error as WsError, Message, WebSocket};

use crate::error::TransportError;
use crate::sim::log::LogSink;

pub struct Transport {
    address: String,
    socket: Option<WebSocket<TcpStream>>,
}

impl Transport {
    /// A transport that never opened. Every send fails with `NotConnected`.
    pub fn disconnected(address: &str) -> Self {
        Transport { address: address.to_string(), socket: None }
    }

    /// Open the link. Failure is logged and yields a disconnected transport.
    pub fn connect(address: &str, timeout: Duration, log: &mut impl LogSink) -> Self {
        match open(address, timeout) {
            Ok(socket) => {
                log.log(format!("WebSocket connected to {address}"));
                Transport { address: address.to_string(), socket: Some(socket) }
            }
            Err(e) => {
                log.error(format!("WebSocket Error: {e}"));
                Transport::disconnected(address)
            }
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Liveness flag.
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    pub fn send(&mut self, text: &str, log: &mut impl LogSink) -> Result<(), TransportError> {
        let Some(socket) = self.socket.as_mut() else {
            log.error("WebSocket not connected");
            return Err(TransportError::NotConnected);
        };

        log.log(format!("Sending command: {text}"));
        match socket.send(Message::text(text)) {
            Ok(()) => Ok(()),
            // Frame is queued; the next poll flushes it.
            Err(WsError::Io(e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => {
                self.socket = None;
                log.error(format!("WebSocket Error: {e}"));
                log.error("WebSocket disconnected unexpectedly");
                Err(e.into())
            }
        }
    }

    /// Drain all readable frames as text, oldest first.
    pub fn poll(&mut self, log: &mut impl LogSink) -> Vec<String> {
        let mut frames = Vec::new();
        let Some(socket) = self.socket.as_mut() else {
            return frames;
        };

        // Some(None) = clean close, Some(Some(reason)) = error.
        let mut dropped: Option<Option<String>> = None;

        loop {
            match socket.read() {
                Ok(Message::Text(text)) => {
                    log.log(format!("Received from robot: {text}"));
                    frames.push(text);
                }
                Ok(Message::Binary(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    log.log(format!("Received from robot: {text}"));
                    frames.push(text);
                }
                Ok(Message::Close(_)) => {
                    // Reply is queued by the socket; push it out best-effort.
                    let _ = socket.flush();
                    dropped = Some(None);
                    break;
                }
                Ok(_) => {} // ping / pong / raw frame
                Err(WsError::Io(e)) if e.kind() == ErrorKind::WouldBlock => break,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    dropped = Some(None);
                    break;
                }
                Err(e) => {
                    dropped = Some(Some(e.to_string()));
                    break;
                }
            }
        }

        if dropped.is_none() {
            match socket.flush() {
                Ok(()) => {}
                Err(WsError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => dropped = Some(None),
                Err(e) => dropped = Some(Some(e.to_string())),
            }
        }

        if let Some(reason) = dropped {
            self.socket = None;
            if let Some(reason) = reason {
                log.error(format!("WebSocket Error: {reason}"));
            }
            log.log("WebSocket closed");
            log.error("WebSocket disconnected unexpectedly");
        }

        frames
    }

    /// Release the link. Idempotent.
    pub fn close(&mut self, log: &mut impl LogSink) {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None);
            let _ = socket.flush();
            log.log("WebSocket closed");
        }
    }
}

/// Resolve, connect with timeout, handshake, go non-blocking.
fn open(address: &str, timeout: Duration) -> Result<WebSocket<TcpStream>, TransportError> {
    let invalid = || TransportError::InvalidAddress(address.to_string());

    let uri: Uri = address.parse().map_err(|_| invalid())?;
    if uri.scheme_str() != Some("ws") {
        return Err(invalid());
    }
    let host = uri.host().ok_or_else(invalid)?;
    let port = uri.port_u16().unwrap_or(80);
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(invalid)?;

    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let (socket, _response) = tungstenite::client::client(address, stream)
        .map_err(|e| TransportError::Handshake(e.to_string()))?;

    let stream = socket.get_ref();
    stream.set_read_timeout(None)?;
    stream.set_write_timeout(None)?;
    stream.set_nonblocking(true)?;

    Ok(socket)
}
