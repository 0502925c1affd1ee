//! Supervisor transport — trait plus the JSON-lines Unix socket client.
//!
//! One request, one newline-delimited JSON response per call:
//!
//! ```text
//! → {"method":"reload_config"}
//! ← {"ok":true,"data":{"added":["station_1"],"changed":[],"removed":[]}}
//! → {"method":"stop_process_group","group":"station_1"}
//! ← {"ok":true}
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Group-name lists the supervisor reports after re-reading its config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadOutcome {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub changed: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

/// RPC surface of the process supervisor, consumed as a black box.
///
/// Every call may fail independently; only `reload_config` failures are
/// fatal to a run (the supervisor is unreachable), per-group operations are
/// logged and recorded.
pub trait SupervisorTransport {
    fn reload_config(&mut self) -> Result<ReloadOutcome, TransportError>;
    fn stop_process_group(&mut self, group: &str) -> Result<(), TransportError>;
    fn remove_process_group(&mut self, group: &str) -> Result<(), TransportError>;
    fn add_process_group(&mut self, group: &str) -> Result<(), TransportError>;
    fn signal_process(&mut self, process: &str, signal: &str) -> Result<(), TransportError>;
}

/// All errors the socket transport can produce.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket-level I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The supervisor socket does not exist or refused the connection.
    #[error("supervisor not running (socket {socket})")]
    NotRunning { socket: PathBuf },

    /// The response line was not the expected JSON shape.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The supervisor answered, but with an error payload.
    #[error("supervisor error: {message}")]
    Rpc { message: String },
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TransportError {
    TransportError::Io {
        path: path.into(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SupervisorRequest<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<&'a str>,
}

impl<'a> SupervisorRequest<'a> {
    fn method(method: &'a str) -> Self {
        SupervisorRequest {
            method,
            group: None,
            process: None,
            signal: None,
        }
    }

    fn group(method: &'a str, group: &'a str) -> Self {
        SupervisorRequest {
            group: Some(group),
            ..Self::method(method)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupervisorResponse {
    ok: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Socket client
// ---------------------------------------------------------------------------

/// JSON-lines client for the supervisor control socket.
#[derive(Debug, Clone)]
pub struct SocketSupervisor {
    socket: PathBuf,
}

impl SocketSupervisor {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        SocketSupervisor {
            socket: socket.into(),
        }
    }

    #[cfg(unix)]
    fn call(&self, request: &SupervisorRequest<'_>) -> Result<SupervisorResponse, TransportError> {
        use std::io::{BufRead, BufReader, Write};
        use std::os::unix::net::UnixStream;

        if !self.socket.exists() {
            return Err(TransportError::NotRunning {
                socket: self.socket.clone(),
            });
        }

        let mut stream = UnixStream::connect(&self.socket).map_err(|err| {
            if matches!(
                err.kind(),
                std::io::ErrorKind::NotFound
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
            ) {
                TransportError::NotRunning {
                    socket: self.socket.clone(),
                }
            } else {
                io_err(&self.socket, err)
            }
        })?;

        let payload = serde_json::to_string(request).map_err(|e| TransportError::Protocol {
            message: e.to_string(),
        })?;
        stream
            .write_all(payload.as_bytes())
            .map_err(|e| io_err(&self.socket, e))?;
        stream.write_all(b"\n").map_err(|e| io_err(&self.socket, e))?;
        stream.flush().map_err(|e| io_err(&self.socket, e))?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| io_err(&self.socket, e))?;
        if read == 0 {
            return Err(TransportError::Protocol {
                message: "connection closed before response".into(),
            });
        }

        let response: SupervisorResponse =
            serde_json::from_str(line.trim()).map_err(|e| TransportError::Protocol {
                message: format!("malformed response: {e}"),
            })?;

        if !response.ok {
            return Err(TransportError::Rpc {
                message: response.error.unwrap_or_else(|| "unspecified".into()),
            });
        }
        Ok(response)
    }

    #[cfg(not(unix))]
    fn call(&self, _request: &SupervisorRequest<'_>) -> Result<SupervisorResponse, TransportError> {
        Err(TransportError::NotRunning {
            socket: self.socket.clone(),
        })
    }

    fn call_unit(&self, request: &SupervisorRequest<'_>) -> Result<(), TransportError> {
        self.call(request).map(|_| ())
    }
}

impl SupervisorTransport for SocketSupervisor {
    fn reload_config(&mut self) -> Result<ReloadOutcome, TransportError> {
        let response = self.call(&SupervisorRequest::method("reload_config"))?;
        let data = response.data.ok_or_else(|| TransportError::Protocol {
            message: "reload_config returned no data".into(),
        })?;
        serde_json::from_value(data).map_err(|e| TransportError::Protocol {
            message: format!("malformed reload data: {e}"),
        })
    }

    fn stop_process_group(&mut self, group: &str) -> Result<(), TransportError> {
        self.call_unit(&SupervisorRequest::group("stop_process_group", group))
    }

    fn remove_process_group(&mut self, group: &str) -> Result<(), TransportError> {
        self.call_unit(&SupervisorRequest::group("remove_process_group", group))
    }

    fn add_process_group(&mut self, group: &str) -> Result<(), TransportError> {
        self.call_unit(&SupervisorRequest::group("add_process_group", group))
    }

    fn signal_process(&mut self, process: &str, signal: &str) -> Result<(), TransportError> {
        self.call_unit(&SupervisorRequest {
            process: Some(process),
            signal: Some(signal),
            ..SupervisorRequest::method("signal_process")
        })
    }
}

/// Supervisor process name of the reverse proxy.
pub const PROXY_PROCESS: &str = "nginx";
/// Signal that makes the proxy re-read its config and certificates.
pub const PROXY_RELOAD_SIGNAL: &str = "HUP";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
