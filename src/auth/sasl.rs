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

//! SASL handshake frames and per-mechanism negotiation.
//!
//! Handshake frames are a 1-byte status followed by a 4-byte big-endian
//! payload length. After a successful handshake on PLAIN or GSSAPI,
//! every Thrift message travels in a 4-byte length-prefixed data frame;
//! NOSASL connections skip both the handshake and the framing.

use crate::auth::{SaslStep, SecurityContext};
use crate::error::{Error, Result};
use crate::params::AuthMechanism;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

mod status {
    pub const START: u8 = 1;
    pub const OK: u8 = 2;
    pub const BAD: u8 = 3;
    pub const ERROR: u8 = 4;
    pub const COMPLETE: u8 = 5;
}

/// Upper bound on a single handshake or data frame.
const MAX_FRAME_LEN: u32 = 256 * 1024 * 1024;

async fn write_frame<S>(stream: &mut S, status: u8, payload: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin + Send,
{
    let mut frame = Vec::with_capacity(5 + payload.len());
    frame.push(status);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}

async fn read_frame<S>(stream: &mut S) -> Result<(u8, Vec<u8>)>
where
    S: AsyncRead + Unpin + Send,
{
    let mut header = [0u8; 5];
    stream.read_exact(&mut header).await?;
    let status = header[0];
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_FRAME_LEN {
        return Err(Error::Protocol(format!(
            "handshake frame length {len} exceeds limit"
        )));
    }
    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).await?;
    Ok((status, payload))
}

/// Write one length-prefixed Thrift data frame (post-handshake traffic).
pub(crate) async fn write_data_frame<S>(stream: &mut S, payload: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin + Send,
{
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one length-prefixed Thrift data frame.
pub(crate) async fn read_data_frame<S>(stream: &mut S) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin + Send,
{
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;
    let len = u32::from_be_bytes(header);
    if len > MAX_FRAME_LEN {
        return Err(Error::Protocol(format!(
            "data frame length {len} exceeds limit"
        )));
    }
    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

fn reject(status: u8, payload: &[u8]) -> Error {
    let detail = String::from_utf8_lossy(payload);
    let verdict = match status {
        status::BAD => "rejected",
        status::ERROR => "errored during",
        _ => "failed",
    };
    Error::Authentication(format!("server {verdict} authentication: {detail}"))
}

/// Run the handshake for the configured mechanism. NOSASL is a no-op;
/// the server expects bare Thrift messages immediately.
pub(crate) async fn negotiate<S>(
    stream: &mut S,
    mechanism: AuthMechanism,
    username: &str,
    password: &str,
    context: Option<&mut (dyn SecurityContext + '_)>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    match mechanism {
        AuthMechanism::Nosasl => Ok(()),
        AuthMechanism::Plain => negotiate_plain(stream, username, password).await,
        AuthMechanism::Gssapi => {
            let context = context.ok_or_else(|| {
                Error::Authentication(
                    "GSSAPI negotiation requires a security context".to_string(),
                )
            })?;
            negotiate_gssapi(stream, context).await
        }
    }
}

async fn negotiate_plain<S>(stream: &mut S, username: &str, password: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    debug!(mechanism = "PLAIN", "starting handshake");
    write_frame(stream, status::START, AuthMechanism::Plain.sasl_name().as_bytes()).await?;

    // authzid NUL authcid NUL password, authzid mirroring the username.
    let mut credentials = Vec::with_capacity(username.len() * 2 + password.len() + 2);
    credentials.extend_from_slice(username.as_bytes());
    credentials.push(0);
    credentials.extend_from_slice(username.as_bytes());
    credentials.push(0);
    credentials.extend_from_slice(password.as_bytes());
    write_frame(stream, status::OK, &credentials).await?;

    let (server_status, payload) = read_frame(stream).await?;
    match server_status {
        status::COMPLETE | status::OK => {
            debug!(mechanism = "PLAIN", "handshake complete");
            Ok(())
        }
        other => Err(reject(other, &payload)),
    }
}

async fn negotiate_gssapi<S>(
    stream: &mut S,
    context: &mut (dyn SecurityContext + '_),
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    debug!(mechanism = "GSSAPI", "starting handshake");
    write_frame(
        stream,
        status::START,
        AuthMechanism::Gssapi.sasl_name().as_bytes(),
    )
    .await?;

    let mut inbound: Vec<u8> = Vec::new();
    loop {
        match context.step(&inbound).await? {
            SaslStep::Continue(token) => {
                write_frame(stream, status::OK, &token).await?;
            }
            // Context established locally; the server still owes a
            // completion frame.
            SaslStep::Complete => {}
        }
        let (server_status, payload) = read_frame(stream).await?;
        match server_status {
            status::OK => inbound = payload,
            status::COMPLETE => {
                debug!(mechanism = "GSSAPI", "handshake complete");
                return Ok(());
            }
            other => return Err(reject(other, &payload)),
        }
    }
}
