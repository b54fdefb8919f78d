//! Transient loopback listener that receives the OAuth redirect.
//!
//! The listener runs on its own task. The first GET request it reads decides
//! the outcome: the extracted code (or the failure) is handed to the waiting
//! authorizer over a oneshot channel, a short HTML page is returned to the
//! browser, and the task ends, closing the socket. Nobody awaits that task.

use std::net::SocketAddr;

use photomirror_core::{MirrorError, MirrorResult};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing::{debug, error};

const SUCCESS_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization complete</h1>\
    <p>You may now close this window and return to the terminal.</p></body></html>";

const FAILURE_RESPONSE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization failed</h1>\
    <p>You may close this window; see the terminal for details.</p></body></html>";

/// Query parameters of the redirect request.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CallbackParams {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
}

impl CallbackParams {
    /// Parses `GET /path?query HTTP/1.1`; returns `None` for anything else.
    pub(crate) fn from_request_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        if parts.next()? != "GET" {
            return None;
        }
        let target = parts.next()?;
        let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");

        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(params)
    }

    /// Turns the parameters into the authorization code.
    ///
    /// When `expected_state` is set the redirect must carry the same value.
    pub(crate) fn into_code(self, expected_state: Option<&str>) -> MirrorResult<String> {
        if let Some(error) = self.error {
            return Err(MirrorError::authorization(format!(
                "authorization denied: {}",
                error
            )));
        }
        if let Some(expected) = expected_state
            && self.state.as_deref() != Some(expected)
        {
            return Err(MirrorError::authorization(
                "OAuth state mismatch - possible CSRF attack",
            ));
        }
        match self.code {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(MirrorError::authorization(
                "missing authorization code in callback",
            )),
        }
    }
}

/// A bound, not yet serving, callback listener.
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl CallbackListener {
    /// Binds the listener. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr) -> MirrorResult<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            MirrorError::authorization(format!(
                "failed to bind callback listener on {}: {}",
                addr, e
            ))
            .with_source(e)
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            MirrorError::internal(format!("callback listener has no local address: {}", e))
        })?;
        debug!("bound callback listener on {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts serving on a detached task.
    ///
    /// The receiver yields exactly one result, from the first GET request.
    pub fn spawn(self, expected_state: Option<String>) -> oneshot::Receiver<MirrorResult<String>> {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                let stream = match self.listener.accept().await {
                    Ok((stream, peer)) => {
                        debug!("callback connection from {}", peer);
                        stream
                    }
                    Err(e) => {
                        error!("failed to accept callback connection: {}", e);
                        continue;
                    }
                };

                if let Some(result) = handle_connection(stream, expected_state.as_deref()).await {
                    if tx.send(result).is_err() {
                        debug!("authorizer stopped waiting before the callback arrived");
                    }
                    break;
                }
            }
            debug!("callback listener on {} closed", self.local_addr);
        });

        rx
    }
}

/// Reads one request; `None` means the connection did not carry a GET.
async fn handle_connection(
    stream: TcpStream,
    expected_state: Option<&str>,
) -> Option<MirrorResult<String>> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.is_err() {
        return None;
    }

    let params = CallbackParams::from_request_line(&request_line)?;

    // Drain headers so the browser sees a clean response.
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) if line.trim().is_empty() => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }

    let result = params.into_code(expected_state);
    let response = if result.is_ok() {
        SUCCESS_RESPONSE
    } else {
        FAILURE_RESPONSE
    };

    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;

    Some(result)
}
