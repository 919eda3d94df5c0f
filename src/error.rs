// Copyright (c) 2025 Hive TCLI Client Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the Hive TCLI client.
//!
//! Connection, authentication, RPC and poll-timeout failures are hard
//! failures that propagate to the caller. Malformed per-cell payloads are
//! recovered in place by the decoder (see [`crate::decode`]) and unknown
//! wire types map to an `unsupported` schema marker (see
//! [`crate::schema`]); neither surfaces here.

use crate::protocol::messages::OperationState;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket, TLS, or dial failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server rejected the handshake (BAD/ERROR frame) or the
    /// security-context provider failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The server returned an error status or a remote exception reply.
    #[error("server error: {message} (sqlstate: {sql_state:?}, code: {error_code:?})")]
    Rpc {
        message: String,
        sql_state: Option<String>,
        error_code: Option<i32>,
    },

    /// The status poll budget was exhausted while the operation was still
    /// in a non-terminal state.
    #[error("operation still {last_state:?} after {attempts} status polls")]
    OperationTimeout {
        attempts: u32,
        last_state: OperationState,
    },

    /// Malformed wire data (bad framing, unexpected message type, or a
    /// response that cannot be decoded).
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Connection(e.to_string())
    }
}
