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

//! Thrift binary-protocol primitives.
//!
//! Implements the subset of the strict binary protocol the TCLI service
//! contract uses: message envelopes, struct fields, maps, lists, and the
//! base types. The writer serializes into a growable buffer; the reader
//! decodes incrementally from any async byte stream, so the same decode
//! path serves framed and unframed transports.

use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Wire type ids of the binary protocol.
pub mod ttype {
    pub const STOP: u8 = 0;
    pub const BOOL: u8 = 2;
    pub const BYTE: u8 = 3;
    pub const DOUBLE: u8 = 4;
    pub const I16: u8 = 6;
    pub const I32: u8 = 8;
    pub const I64: u8 = 10;
    pub const STRING: u8 = 11;
    pub const STRUCT: u8 = 12;
    pub const MAP: u8 = 13;
    pub const SET: u8 = 14;
    pub const LIST: u8 = 15;
}

/// Message envelope kinds.
pub mod message_type {
    pub const CALL: u8 = 1;
    pub const REPLY: u8 = 2;
    pub const EXCEPTION: u8 = 3;
}

/// Strict-protocol version tag carried in the message envelope.
pub(crate) const VERSION_1: u32 = 0x8001_0000;
/// Upper bound on any length field read off the wire.
const MAX_WIRE_LEN: i32 = 256 * 1024 * 1024;

/// Serializes one RPC message into an owned buffer.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn write_message_begin(&mut self, name: &str, kind: u8, sequence_id: i32) {
        self.buf.put_u32(VERSION_1 | kind as u32);
        self.write_string(name);
        self.buf.put_i32(sequence_id);
    }

    pub fn write_field_begin(&mut self, field_type: u8, id: i16) {
        self.buf.put_u8(field_type);
        self.buf.put_i16(id);
    }

    pub fn write_field_stop(&mut self) {
        self.buf.put_u8(ttype::STOP);
    }

    pub fn write_map_begin(&mut self, key_type: u8, value_type: u8, len: usize) {
        self.buf.put_u8(key_type);
        self.buf.put_u8(value_type);
        self.buf.put_i32(len as i32);
    }

    pub fn write_list_begin(&mut self, element_type: u8, len: usize) {
        self.buf.put_u8(element_type);
        self.buf.put_i32(len as i32);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.put_i8(v);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.put_i16(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    pub fn write_double(&mut self, v: f64) {
        self.buf.put_f64(v);
    }

    pub fn write_string(&mut self, v: &str) {
        self.write_binary(v.as_bytes());
    }

    pub fn write_binary(&mut self, v: &[u8]) {
        self.buf.put_i32(v.len() as i32);
        self.buf.put_slice(v);
    }
}

/// Decoded message envelope.
#[derive(Debug)]
pub struct MessageHeader {
    pub name: String,
    pub kind: u8,
    pub sequence_id: i32,
}

/// Decodes binary-protocol values from an async byte stream.
pub struct WireReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin + Send> WireReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub async fn read_message_begin(&mut self) -> Result<MessageHeader> {
        let head = self.inner.read_i32().await?;
        if head >= 0 {
            // Old unversioned framing is not part of the contract.
            return Err(Error::Protocol(
                "unversioned message header from server".to_string(),
            ));
        }
        let head = head as u32;
        if head & 0xffff_0000 != VERSION_1 {
            return Err(Error::Protocol(format!(
                "bad protocol version in message header: {head:#010x}"
            )));
        }
        let kind = (head & 0xff) as u8;
        let name = self.read_string().await?;
        let sequence_id = self.inner.read_i32().await?;
        Ok(MessageHeader {
            name,
            kind,
            sequence_id,
        })
    }

    /// Next field header, or `None` at the struct's STOP marker.
    pub async fn read_field_begin(&mut self) -> Result<Option<(u8, i16)>> {
        let field_type = self.inner.read_u8().await?;
        if field_type == ttype::STOP {
            return Ok(None);
        }
        let id = self.inner.read_i16().await?;
        Ok(Some((field_type, id)))
    }

    pub async fn read_map_begin(&mut self) -> Result<(u8, u8, usize)> {
        let key_type = self.inner.read_u8().await?;
        let value_type = self.inner.read_u8().await?;
        let len = self.read_len().await?;
        Ok((key_type, value_type, len))
    }

    pub async fn read_list_begin(&mut self) -> Result<(u8, usize)> {
        let element_type = self.inner.read_u8().await?;
        let len = self.read_len().await?;
        Ok((element_type, len))
    }

    pub async fn read_bool(&mut self) -> Result<bool> {
        Ok(self.inner.read_u8().await? != 0)
    }

    pub async fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8().await?)
    }

    pub async fn read_i16(&mut self) -> Result<i16> {
        Ok(self.inner.read_i16().await?)
    }

    pub async fn read_i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32().await?)
    }

    pub async fn read_i64(&mut self) -> Result<i64> {
        Ok(self.inner.read_i64().await?)
    }

    /// The raw big-endian octets of an i64 value. Column payloads keep
    /// the bytes so the row assembler can apply its own integer decode.
    pub async fn read_i64_raw(&mut self) -> Result<[u8; 8]> {
        let mut bytes = [0u8; 8];
        self.inner.read_exact(&mut bytes).await?;
        Ok(bytes)
    }

    pub async fn read_double(&mut self) -> Result<f64> {
        Ok(self.inner.read_f64().await?)
    }

    pub async fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_binary().await?;
        String::from_utf8(bytes).map_err(|e| Error::Protocol(format!("invalid utf-8 string: {e}")))
    }

    pub async fn read_binary(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len().await?;
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes).await?;
        Ok(bytes)
    }

    async fn read_len(&mut self) -> Result<usize> {
        let len = self.inner.read_i32().await?;
        if !(0..=MAX_WIRE_LEN).contains(&len) {
            return Err(Error::Protocol(format!("implausible wire length {len}")));
        }
        Ok(len as usize)
    }

    /// Discard one value of the given wire type, recursing through
    /// containers. Required to tolerate response fields this client does
    /// not model.
    pub fn skip<'a>(
        &'a mut self,
        field_type: u8,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            match field_type {
                ttype::BOOL | ttype::BYTE => {
                    self.inner.read_u8().await?;
                }
                ttype::DOUBLE => {
                    self.read_double().await?;
                }
                ttype::I16 => {
                    self.read_i16().await?;
                }
                ttype::I32 => {
                    self.read_i32().await?;
                }
                ttype::I64 => {
                    self.read_i64().await?;
                }
                ttype::STRING => {
                    self.read_binary().await?;
                }
                ttype::STRUCT => {
                    while let Some((inner_type, _)) = self.read_field_begin().await? {
                        self.skip(inner_type).await?;
                    }
                }
                ttype::MAP => {
                    let (key_type, value_type, len) = self.read_map_begin().await?;
                    for _ in 0..len {
                        self.skip(key_type).await?;
                        self.skip(value_type).await?;
                    }
                }
                ttype::SET | ttype::LIST => {
                    let (element_type, len) = self.read_list_begin().await?;
                    for _ in 0..len {
                        self.skip(element_type).await?;
                    }
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "cannot skip unknown wire type {other}"
                    )));
                }
            }
            Ok(())
        })
    }
}
