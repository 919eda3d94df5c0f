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

//! Socket-level TCLI service connection.
//!
//! One `Connection` owns one socket. RPCs are serialized over it with a
//! mutex so call/reply pairs never interleave; sequence ids are checked
//! on every reply. SASL-authenticated connections wrap each message in
//! a 4-byte length-prefixed frame, NOSASL connections write bare
//! messages.

use crate::auth::{self, SecurityContext};
use crate::client::TcliService;
use crate::error::{Error, Result};
use crate::params::{AuthMechanism, ConnectionParams};
use crate::protocol::messages::{
    ApplicationException, CloseOperationReq, CloseOperationResp, CloseSessionReq,
    CloseSessionResp, ExecuteStatementReq, FetchResultsReq, FetchResultsResp, GetCatalogsReq,
    GetColumnsReq, GetOperationStatusReq, GetOperationStatusResp, GetPrimaryKeysReq,
    GetResultSetMetadataReq, GetResultSetMetadataResp, GetSchemasReq, OpenSessionReq,
    OpenSessionResp, OperationResp, Response,
};
use crate::protocol::wire::{message_type, ttype, WireReader, WireWriter};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Socket abstraction so plain TCP and TLS share one transport path.
trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

struct Transport {
    stream: Box<dyn Stream>,
    framed: bool,
    sequence_id: i32,
}

/// A live, authenticated connection to one server endpoint.
pub struct Connection {
    transport: Mutex<Transport>,
}

impl Connection {
    /// Dial, optionally wrap in TLS, and run the configured handshake.
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        Self::connect_with_context(params, None).await
    }

    /// As [`connect`](Connection::connect), with a security context for
    /// GSSAPI negotiation.
    pub async fn connect_with_context(
        params: &ConnectionParams,
        mut context: Option<Box<dyn SecurityContext>>,
    ) -> Result<Self> {
        let address = (params.host.as_str(), params.port);
        let tcp = tokio::time::timeout(params.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "connect to {}:{} timed out after {:?}",
                    params.host, params.port, params.connect_timeout
                ))
            })??;
        tcp.set_nodelay(true)?;
        debug!(host = %params.host, port = params.port, "connected");

        let mut stream: Box<dyn Stream> = match &params.tls {
            Some(tls) => {
                let mut builder = native_tls::TlsConnector::builder();
                if tls.accept_invalid_certs {
                    builder.danger_accept_invalid_certs(true);
                    builder.danger_accept_invalid_hostnames(true);
                    warn!("TLS certificate verification disabled");
                }
                let connector = builder
                    .build()
                    .map_err(|e| Error::Connection(format!("TLS setup failed: {e}")))?;
                let connector = tokio_native_tls::TlsConnector::from(connector);
                let domain = tls.sni_hostname.as_deref().unwrap_or(&params.host);
                let tls_stream = connector
                    .connect(domain, tcp)
                    .await
                    .map_err(|e| Error::Connection(format!("TLS handshake failed: {e}")))?;
                Box::new(tls_stream)
            }
            None => Box::new(tcp),
        };

        auth::negotiate(
            &mut stream,
            params.mechanism,
            &params.username,
            &params.password,
            context.as_deref_mut(),
        )
        .await?;

        Ok(Self {
            transport: Mutex::new(Transport {
                stream,
                framed: params.mechanism != AuthMechanism::Nosasl,
                sequence_id: 0,
            }),
        })
    }

    /// Issue one call and decode its reply. The transport lock is held
    /// across the full exchange.
    async fn call<T: Response>(
        &self,
        method: &'static str,
        encode: impl FnOnce(&mut WireWriter),
    ) -> Result<T> {
        let mut transport = self.transport.lock().await;
        transport.sequence_id += 1;
        let sequence_id = transport.sequence_id;

        let mut w = WireWriter::new();
        w.write_message_begin(method, message_type::CALL, sequence_id);
        // The args struct wraps the request struct at field id 1.
        w.write_field_begin(ttype::STRUCT, 1);
        encode(&mut w);
        w.write_field_stop();
        let message = w.into_bytes();
        debug!(method, sequence_id, len = message.len(), "rpc call");

        if transport.framed {
            auth::write_data_frame(&mut transport.stream, &message).await?;
            let reply = auth::read_data_frame(&mut transport.stream).await?;
            let mut reader = WireReader::new(&reply[..]);
            read_reply(&mut reader, method, sequence_id).await
        } else {
            transport.stream.write_all(&message).await?;
            transport.stream.flush().await?;
            let mut reader = WireReader::new(&mut transport.stream);
            read_reply(&mut reader, method, sequence_id).await
        }
    }
}

async fn read_reply<R, T>(
    reader: &mut WireReader<R>,
    method: &'static str,
    expected_sequence_id: i32,
) -> Result<T>
where
    R: AsyncRead + Unpin + Send,
    T: Response,
{
    let header = reader.read_message_begin().await?;
    if header.name != method {
        return Err(Error::Protocol(format!(
            "reply names method {:?}, expected {method:?}",
            header.name
        )));
    }
    if header.sequence_id != expected_sequence_id {
        return Err(Error::Protocol(format!(
            "reply sequence id {} does not match call sequence id {expected_sequence_id}",
            header.sequence_id
        )));
    }
    match header.kind {
        message_type::REPLY => {
            // The result struct carries the success value at field id 0.
            let mut result: Option<T> = None;
            while let Some((field_type, id)) = reader.read_field_begin().await? {
                match (id, field_type) {
                    (0, ttype::STRUCT) => result = Some(T::decode_body(reader).await?),
                    _ => reader.skip(field_type).await?,
                }
            }
            result.ok_or_else(|| Error::Protocol(format!("{method} reply carried no result")))
        }
        message_type::EXCEPTION => {
            let exc = ApplicationException::decode(reader).await?;
            Err(Error::Rpc {
                message: exc
                    .message
                    .unwrap_or_else(|| format!("{method} raised a remote exception")),
                sql_state: None,
                error_code: exc.kind,
            })
        }
        other => Err(Error::Protocol(format!(
            "unexpected message type {other} in reply to {method}"
        ))),
    }
}

#[async_trait]
impl TcliService for Connection {
    async fn open_session(&self, req: OpenSessionReq) -> Result<OpenSessionResp> {
        let resp: OpenSessionResp = self.call("OpenSession", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn close_session(&self, req: CloseSessionReq) -> Result<CloseSessionResp> {
        let resp: CloseSessionResp = self.call("CloseSession", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn execute_statement(&self, req: ExecuteStatementReq) -> Result<OperationResp> {
        let resp: OperationResp = self.call("ExecuteStatement", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn get_operation_status(
        &self,
        req: GetOperationStatusReq,
    ) -> Result<GetOperationStatusResp> {
        let resp: GetOperationStatusResp =
            self.call("GetOperationStatus", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn fetch_results(&self, req: FetchResultsReq) -> Result<FetchResultsResp> {
        let resp: FetchResultsResp = self.call("FetchResults", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn get_result_set_metadata(
        &self,
        req: GetResultSetMetadataReq,
    ) -> Result<GetResultSetMetadataResp> {
        let resp: GetResultSetMetadataResp =
            self.call("GetResultSetMetadata", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn get_schemas(&self, req: GetSchemasReq) -> Result<OperationResp> {
        let resp: OperationResp = self.call("GetSchemas", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn get_catalogs(&self, req: GetCatalogsReq) -> Result<OperationResp> {
        let resp: OperationResp = self.call("GetCatalogs", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn get_columns(&self, req: GetColumnsReq) -> Result<OperationResp> {
        let resp: OperationResp = self.call("GetColumns", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn get_primary_keys(&self, req: GetPrimaryKeysReq) -> Result<OperationResp> {
        let resp: OperationResp = self.call("GetPrimaryKeys", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }

    async fn close_operation(&self, req: CloseOperationReq) -> Result<CloseOperationResp> {
        let resp: CloseOperationResp = self.call("CloseOperation", |w| req.encode(w)).await?;
        resp.status.check()?;
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::Status;
    use crate::protocol::wire::VERSION_1;

    // Build a framed OpenSession reply by hand and check the full
    // call path against an in-memory server.
    fn encode_open_session_reply(sequence_id: i32) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.write_message_begin("OpenSession", message_type::REPLY, sequence_id);
        w.write_field_begin(ttype::STRUCT, 0);
        {
            // TOpenSessionResp
            w.write_field_begin(ttype::STRUCT, 1);
            {
                w.write_field_begin(ttype::I32, 1);
                w.write_i32(0); // SUCCESS
                w.write_field_stop();
            }
            w.write_field_begin(ttype::I32, 2);
            w.write_i32(8);
            w.write_field_begin(ttype::STRUCT, 3);
            {
                w.write_field_begin(ttype::STRUCT, 1);
                {
                    w.write_field_begin(ttype::STRING, 1);
                    w.write_binary(&[7; 16]);
                    w.write_field_begin(ttype::STRING, 2);
                    w.write_binary(&[9; 16]);
                    w.write_field_stop();
                }
                w.write_field_stop();
            }
            w.write_field_stop();
        }
        w.write_field_stop();
        w.into_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_read_reply_decodes_success_struct() {
        let reply = encode_open_session_reply(1);
        let mut reader = WireReader::new(&reply[..]);
        let resp: OpenSessionResp = read_reply(&mut reader, "OpenSession", 1).await.unwrap();
        assert_eq!(resp.server_protocol_version, 8);
        let handle = resp.session_handle.unwrap();
        assert_eq!(handle.session_id.guid, vec![7; 16]);
    }

    #[tokio::test]
    async fn test_read_reply_rejects_sequence_mismatch() {
        let reply = encode_open_session_reply(7);
        let mut reader = WireReader::new(&reply[..]);
        let err = read_reply::<_, OpenSessionResp>(&mut reader, "OpenSession", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_read_reply_rejects_method_mismatch() {
        let reply = encode_open_session_reply(1);
        let mut reader = WireReader::new(&reply[..]);
        let err = read_reply::<_, OpenSessionResp>(&mut reader, "CloseSession", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_read_reply_surfaces_remote_exception() {
        let mut w = WireWriter::new();
        w.write_message_begin("OpenSession", message_type::EXCEPTION, 1);
        w.write_field_begin(ttype::STRING, 1);
        w.write_string("unknown method");
        w.write_field_begin(ttype::I32, 2);
        w.write_i32(1);
        w.write_field_stop();
        let reply = w.into_bytes();
        let mut reader = WireReader::new(&reply[..]);
        let err = read_reply::<_, OpenSessionResp>(&mut reader, "OpenSession", 1)
            .await
            .unwrap_err();
        match err {
            Error::Rpc {
                message,
                error_code,
                ..
            } => {
                assert_eq!(message, "unknown method");
                assert_eq!(error_code, Some(1));
            }
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[test]
    fn test_call_message_envelope_uses_strict_version() {
        let mut w = WireWriter::new();
        w.write_message_begin("ExecuteStatement", message_type::CALL, 3);
        let bytes = w.into_bytes();
        let version = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(version & 0xffff_0000, VERSION_1);
        assert_eq!(version & 0xff, u32::from(message_type::CALL));
    }

    #[test]
    fn test_status_check_flows_through_service_methods() {
        let status = Status::default();
        // Unknown status codes are not treated as failures.
        assert!(status.check().is_ok());
    }
}
