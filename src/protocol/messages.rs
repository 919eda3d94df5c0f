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

//! TCLI service request/response types and their wire codec.
//!
//! Field ids, operation names, and enum ordinals follow the TCLI service
//! Thrift contract exactly; the server is an unmodified HiveServer2-style
//! endpoint and will reject anything else. Unknown response fields are
//! skipped so newer servers remain readable.

use crate::error::{Error, Result};
use crate::protocol::wire::{ttype, WireReader, WireWriter};
use std::collections::HashMap;
use std::future::Future;
use tokio::io::AsyncRead;

/// Protocol version sent at session open (HIVE_CLI_SERVICE_PROTOCOL_V9).
pub const PROTOCOL_V9: i32 = 8;

/// Status code carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    SuccessWithInfo,
    StillExecuting,
    Error,
    InvalidHandle,
    Unknown(i32),
}

impl StatusCode {
    fn from_i32(v: i32) -> Self {
        match v {
            0 => StatusCode::Success,
            1 => StatusCode::SuccessWithInfo,
            2 => StatusCode::StillExecuting,
            3 => StatusCode::Error,
            4 => StatusCode::InvalidHandle,
            other => StatusCode::Unknown(other),
        }
    }
}

/// Lifecycle state of one statement's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Initialized,
    Running,
    Finished,
    Canceled,
    Closed,
    Error,
    Unknown,
    Pending,
    Timedout,
}

impl OperationState {
    pub fn from_i32(v: i32) -> Self {
        match v {
            0 => OperationState::Initialized,
            1 => OperationState::Running,
            2 => OperationState::Finished,
            3 => OperationState::Canceled,
            4 => OperationState::Closed,
            5 => OperationState::Error,
            7 => OperationState::Pending,
            8 => OperationState::Timedout,
            _ => OperationState::Unknown,
        }
    }

    /// Terminal states end the poll loop. Transitions are monotonic
    /// toward one of these.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationState::Finished
                | OperationState::Canceled
                | OperationState::Closed
                | OperationState::Error
        )
    }
}

/// Primitive wire type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeId {
    Boolean,
    Tinyint,
    Smallint,
    Int,
    Bigint,
    Float,
    Double,
    String,
    Timestamp,
    Binary,
    Array,
    Map,
    Struct,
    Union,
    UserDefined,
    Decimal,
    Null,
    Date,
    Varchar,
    Char,
    IntervalYearMonth,
    IntervalDayTime,
    Unknown(i32),
}

impl TypeId {
    pub fn from_i32(v: i32) -> Self {
        match v {
            0 => TypeId::Boolean,
            1 => TypeId::Tinyint,
            2 => TypeId::Smallint,
            3 => TypeId::Int,
            4 => TypeId::Bigint,
            5 => TypeId::Float,
            6 => TypeId::Double,
            7 => TypeId::String,
            8 => TypeId::Timestamp,
            9 => TypeId::Binary,
            10 => TypeId::Array,
            11 => TypeId::Map,
            12 => TypeId::Struct,
            13 => TypeId::Union,
            14 => TypeId::UserDefined,
            15 => TypeId::Decimal,
            16 => TypeId::Null,
            17 => TypeId::Date,
            18 => TypeId::Varchar,
            19 => TypeId::Char,
            20 => TypeId::IntervalYearMonth,
            21 => TypeId::IntervalDayTime,
            other => TypeId::Unknown(other),
        }
    }

    /// Human-readable name used in `unsupported` schema markers.
    pub fn wire_name(&self) -> String {
        match self {
            TypeId::Unknown(v) => format!("UNKNOWN({v})"),
            other => format!("{other:?}").to_uppercase(),
        }
    }
}

/// Fetch orientation for paginated result retrieval. Only the first-page
/// and next-page orientations are part of this client's fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrientation {
    Next,
    First,
}

impl FetchOrientation {
    pub fn as_i32(&self) -> i32 {
        match self {
            FetchOrientation::Next => 0,
            FetchOrientation::First => 4,
        }
    }
}

/// Decodable reply body. Implemented by every response type so the
/// connection's call loop can stay generic.
pub(crate) trait Response: Sized {
    fn decode_body<R: AsyncRead + Unpin + Send>(
        r: &mut WireReader<R>,
    ) -> impl Future<Output = Result<Self>> + Send;
}

// ---------------------------------------------------------------------------
// Shared structures
// ---------------------------------------------------------------------------

/// Status block carried by every response.
#[derive(Debug, Clone)]
pub struct Status {
    pub status_code: StatusCode,
    pub info_messages: Vec<String>,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            status_code: StatusCode::Unknown(-1),
            info_messages: Vec::new(),
            sql_state: None,
            error_code: None,
            error_message: None,
        }
    }
}

impl Status {
    /// Map an error-bearing status into `Error::Rpc`, keeping the
    /// server's diagnostic detail.
    pub fn check(&self) -> Result<()> {
        match self.status_code {
            StatusCode::Error | StatusCode::InvalidHandle => {
                let message = self
                    .error_message
                    .clone()
                    .or_else(|| {
                        (!self.info_messages.is_empty()).then(|| self.info_messages.join("; "))
                    })
                    .unwrap_or_else(|| "unspecified server error".to_string());
                Err(Error::Rpc {
                    message,
                    sql_state: self.sql_state.clone(),
                    error_code: self.error_code,
                })
            }
            _ => Ok(()),
        }
    }

    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut status = Status::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::I32) => status.status_code = StatusCode::from_i32(r.read_i32().await?),
                (2, ttype::LIST) => {
                    let (_, len) = r.read_list_begin().await?;
                    for _ in 0..len {
                        status.info_messages.push(r.read_string().await?);
                    }
                }
                (3, ttype::STRING) => status.sql_state = Some(r.read_string().await?),
                (4, ttype::I32) => status.error_code = Some(r.read_i32().await?),
                (5, ttype::STRING) => status.error_message = Some(r.read_string().await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(status)
    }
}

/// Server-issued guid/secret pair identifying a session or operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleIdentifier {
    pub guid: Vec<u8>,
    pub secret: Vec<u8>,
}

impl HandleIdentifier {
    fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRING, 1);
        w.write_binary(&self.guid);
        w.write_field_begin(ttype::STRING, 2);
        w.write_binary(&self.secret);
        w.write_field_stop();
    }

    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut ident = HandleIdentifier::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRING) => ident.guid = r.read_binary().await?,
                (2, ttype::STRING) => ident.secret = r.read_binary().await?,
                _ => r.skip(field_type).await?,
            }
        }
        Ok(ident)
    }
}

/// Opaque session token; valid only for the lifetime of the socket it
/// was issued on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHandle {
    pub session_id: HandleIdentifier,
}

impl SessionHandle {
    fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_id.encode(w);
        w.write_field_stop();
    }

    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut handle = SessionHandle::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => handle.session_id = HandleIdentifier::decode(r).await?,
                _ => r.skip(field_type).await?,
            }
        }
        Ok(handle)
    }
}

/// Token tracking one statement's execution lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationHandle {
    pub operation_id: HandleIdentifier,
    pub operation_type: i32,
    pub has_result_set: bool,
    pub modified_row_count: Option<f64>,
}

impl OperationHandle {
    fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.operation_id.encode(w);
        w.write_field_begin(ttype::I32, 2);
        w.write_i32(self.operation_type);
        w.write_field_begin(ttype::BOOL, 3);
        w.write_bool(self.has_result_set);
        if let Some(count) = self.modified_row_count {
            w.write_field_begin(ttype::DOUBLE, 4);
            w.write_double(count);
        }
        w.write_field_stop();
    }

    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut handle = OperationHandle::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => handle.operation_id = HandleIdentifier::decode(r).await?,
                (2, ttype::I32) => handle.operation_type = r.read_i32().await?,
                (3, ttype::BOOL) => handle.has_result_set = r.read_bool().await?,
                (4, ttype::DOUBLE) => handle.modified_row_count = Some(r.read_double().await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(handle)
    }
}

// ---------------------------------------------------------------------------
// Result data
// ---------------------------------------------------------------------------

/// Column-major batch of typed values.
///
/// `i64` payloads keep their raw big-endian octets; the row assembler
/// owns the signed decode and its clamping behavior. Nulls bitmaps are
/// read off the wire but not applied during row assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Bool { values: Vec<bool>, nulls: Vec<u8> },
    Byte { values: Vec<i8>, nulls: Vec<u8> },
    I16 { values: Vec<i16>, nulls: Vec<u8> },
    I32 { values: Vec<i32>, nulls: Vec<u8> },
    I64 { values: Vec<[u8; 8]>, nulls: Vec<u8> },
    Double { values: Vec<f64>, nulls: Vec<u8> },
    String { values: Vec<String>, nulls: Vec<u8> },
    Binary { values: Vec<Vec<u8>>, nulls: Vec<u8> },
}

impl Column {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Bool { values, .. } => values.len(),
            Column::Byte { values, .. } => values.len(),
            Column::I16 { values, .. } => values.len(),
            Column::I32 { values, .. } => values.len(),
            Column::I64 { values, .. } => values.len(),
            Column::Double { values, .. } => values.len(),
            Column::String { values, .. } => values.len(),
            Column::Binary { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut column = None;
        while let Some((field_type, id)) = r.read_field_begin().await? {
            if field_type != ttype::STRUCT {
                r.skip(field_type).await?;
                continue;
            }
            column = Some(match id {
                1 => {
                    let (values, nulls) = decode_bool_column(r).await?;
                    Column::Bool { values, nulls }
                }
                2 => {
                    let (values, nulls) = decode_byte_column(r).await?;
                    Column::Byte { values, nulls }
                }
                3 => {
                    let (values, nulls) = decode_i16_column(r).await?;
                    Column::I16 { values, nulls }
                }
                4 => {
                    let (values, nulls) = decode_i32_column(r).await?;
                    Column::I32 { values, nulls }
                }
                5 => {
                    let (values, nulls) = decode_i64_column(r).await?;
                    Column::I64 { values, nulls }
                }
                6 => {
                    let (values, nulls) = decode_double_column(r).await?;
                    Column::Double { values, nulls }
                }
                7 => {
                    let (values, nulls) = decode_string_column(r).await?;
                    Column::String { values, nulls }
                }
                8 => {
                    let (values, nulls) = decode_binary_column(r).await?;
                    Column::Binary { values, nulls }
                }
                _ => {
                    r.skip(ttype::STRUCT).await?;
                    continue;
                }
            });
        }
        column.ok_or_else(|| Error::Protocol("column union with no value set".to_string()))
    }
}

macro_rules! typed_column_decoder {
    ($name:ident, $elem:ty, $read:ident) => {
        async fn $name<R: AsyncRead + Unpin + Send>(
            r: &mut WireReader<R>,
        ) -> Result<(Vec<$elem>, Vec<u8>)> {
            let mut values: Vec<$elem> = Vec::new();
            let mut nulls = Vec::new();
            while let Some((field_type, id)) = r.read_field_begin().await? {
                match (id, field_type) {
                    (1, ttype::LIST) => {
                        let (_, len) = r.read_list_begin().await?;
                        values.reserve(len);
                        for _ in 0..len {
                            values.push(r.$read().await?);
                        }
                    }
                    (2, ttype::STRING) => nulls = r.read_binary().await?,
                    _ => r.skip(field_type).await?,
                }
            }
            Ok((values, nulls))
        }
    };
}

typed_column_decoder!(decode_bool_column, bool, read_bool);
typed_column_decoder!(decode_byte_column, i8, read_i8);
typed_column_decoder!(decode_i16_column, i16, read_i16);
typed_column_decoder!(decode_i32_column, i32, read_i32);
typed_column_decoder!(decode_i64_column, [u8; 8], read_i64_raw);
typed_column_decoder!(decode_double_column, f64, read_double);
typed_column_decoder!(decode_string_column, String, read_string);
typed_column_decoder!(decode_binary_column, Vec<u8>, read_binary);

/// One batch of rows in column-major layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub start_row_offset: i64,
    pub columns: Vec<Column>,
}

impl RowSet {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut row_set = RowSet::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::I64) => row_set.start_row_offset = r.read_i64().await?,
                (3, ttype::LIST) => {
                    let (_, len) = r.read_list_begin().await?;
                    for _ in 0..len {
                        row_set.columns.push(Column::decode(r).await?);
                    }
                }
                // Row-major `rows` (field 2) is unused at this protocol
                // version; servers send column-major data.
                _ => r.skip(field_type).await?,
            }
        }
        Ok(row_set)
    }
}

// ---------------------------------------------------------------------------
// Type descriptors
// ---------------------------------------------------------------------------

/// Qualifier value: the contract's i32-or-string union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeQualifierValue {
    pub i32_value: Option<i32>,
    pub string_value: Option<String>,
}

impl TypeQualifierValue {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut value = TypeQualifierValue::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::I32) => value.i32_value = Some(r.read_i32().await?),
                (2, ttype::STRING) => value.string_value = Some(r.read_string().await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(value)
    }
}

/// Named qualifiers (length, precision, scale) attached to a primitive
/// type entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeQualifiers {
    pub qualifiers: HashMap<String, TypeQualifierValue>,
}

impl TypeQualifiers {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut quals = TypeQualifiers::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::MAP) => {
                    let (_, _, len) = r.read_map_begin().await?;
                    for _ in 0..len {
                        let key = r.read_string().await?;
                        let value = TypeQualifierValue::decode(r).await?;
                        quals.qualifiers.insert(key, value);
                    }
                }
                _ => r.skip(field_type).await?,
            }
        }
        Ok(quals)
    }
}

/// Primitive entry of a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveTypeEntry {
    pub type_id: TypeId,
    pub qualifiers: Option<TypeQualifiers>,
}

impl Default for PrimitiveTypeEntry {
    fn default() -> Self {
        Self {
            type_id: TypeId::Unknown(-1),
            qualifiers: None,
        }
    }
}

impl PrimitiveTypeEntry {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut entry = PrimitiveTypeEntry::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::I32) => entry.type_id = TypeId::from_i32(r.read_i32().await?),
                (2, ttype::STRUCT) => entry.qualifiers = Some(TypeQualifiers::decode(r).await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(entry)
    }
}

/// One entry of a type descriptor. Nested (array/map/struct element)
/// entries carry no data this client consumes; only the primitive entry
/// is modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEntry {
    pub primitive: Option<PrimitiveTypeEntry>,
}

impl TypeEntry {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut entry = TypeEntry::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => entry.primitive = Some(PrimitiveTypeEntry::decode(r).await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(entry)
    }
}

/// Full type descriptor of a result column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDesc {
    pub types: Vec<TypeEntry>,
}

impl TypeDesc {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut desc = TypeDesc::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::LIST) => {
                    let (_, len) = r.read_list_begin().await?;
                    for _ in 0..len {
                        desc.types.push(TypeEntry::decode(r).await?);
                    }
                }
                _ => r.skip(field_type).await?,
            }
        }
        Ok(desc)
    }
}

/// Descriptor of one result column: possibly-qualified name, type,
/// 1-based position, optional comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDesc {
    pub column_name: String,
    pub type_desc: TypeDesc,
    pub position: i32,
    pub comment: Option<String>,
}

impl ColumnDesc {
    /// The primitive type entry, when the descriptor carries one.
    pub fn primitive_entry(&self) -> Option<&PrimitiveTypeEntry> {
        self.type_desc
            .types
            .first()
            .and_then(|entry| entry.primitive.as_ref())
    }

    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut desc = ColumnDesc::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRING) => desc.column_name = r.read_string().await?,
                (2, ttype::STRUCT) => desc.type_desc = TypeDesc::decode(r).await?,
                (3, ttype::I32) => desc.position = r.read_i32().await?,
                (4, ttype::STRING) => desc.comment = Some(r.read_string().await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(desc)
    }
}

/// Schema of a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub columns: Vec<ColumnDesc>,
}

impl TableSchema {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut schema = TableSchema::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::LIST) => {
                    let (_, len) = r.read_list_begin().await?;
                    for _ in 0..len {
                        schema.columns.push(ColumnDesc::decode(r).await?);
                    }
                }
                _ => r.skip(field_type).await?,
            }
        }
        Ok(schema)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn write_optional_string(w: &mut WireWriter, id: i16, value: Option<&str>) {
    if let Some(value) = value {
        w.write_field_begin(ttype::STRING, id);
        w.write_string(value);
    }
}

fn write_string_map(w: &mut WireWriter, id: i16, map: &HashMap<String, String>) {
    w.write_field_begin(ttype::MAP, id);
    w.write_map_begin(ttype::STRING, ttype::STRING, map.len());
    for (key, value) in map {
        w.write_string(key);
        w.write_string(value);
    }
}

/// OpenSession request.
#[derive(Debug, Clone, Default)]
pub struct OpenSessionReq {
    pub client_protocol: i32,
    pub username: Option<String>,
    pub password: Option<String>,
    pub configuration: HashMap<String, String>,
}

impl OpenSessionReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::I32, 1);
        w.write_i32(self.client_protocol);
        write_optional_string(w, 2, self.username.as_deref());
        write_optional_string(w, 3, self.password.as_deref());
        if !self.configuration.is_empty() {
            write_string_map(w, 4, &self.configuration);
        }
        w.write_field_stop();
    }
}

/// CloseSession request.
#[derive(Debug, Clone, Default)]
pub struct CloseSessionReq {
    pub session_handle: SessionHandle,
}

impl CloseSessionReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_handle.encode(w);
        w.write_field_stop();
    }
}

/// ExecuteStatement request.
#[derive(Debug, Clone, Default)]
pub struct ExecuteStatementReq {
    pub session_handle: SessionHandle,
    pub statement: String,
    pub conf_overlay: HashMap<String, String>,
    pub run_async: bool,
    pub query_timeout_secs: i64,
}

impl ExecuteStatementReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_handle.encode(w);
        w.write_field_begin(ttype::STRING, 2);
        w.write_string(&self.statement);
        if !self.conf_overlay.is_empty() {
            write_string_map(w, 3, &self.conf_overlay);
        }
        w.write_field_begin(ttype::BOOL, 4);
        w.write_bool(self.run_async);
        w.write_field_begin(ttype::I64, 5);
        w.write_i64(self.query_timeout_secs);
        w.write_field_stop();
    }
}

/// GetOperationStatus request.
#[derive(Debug, Clone, Default)]
pub struct GetOperationStatusReq {
    pub operation_handle: OperationHandle,
}

impl GetOperationStatusReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.operation_handle.encode(w);
        w.write_field_stop();
    }
}

/// FetchResults request: one page of `max_rows` rows.
#[derive(Debug, Clone)]
pub struct FetchResultsReq {
    pub operation_handle: OperationHandle,
    pub orientation: FetchOrientation,
    pub max_rows: i64,
}

impl FetchResultsReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.operation_handle.encode(w);
        w.write_field_begin(ttype::I32, 2);
        w.write_i32(self.orientation.as_i32());
        w.write_field_begin(ttype::I64, 3);
        w.write_i64(self.max_rows);
        w.write_field_stop();
    }
}

/// GetResultSetMetadata request.
#[derive(Debug, Clone, Default)]
pub struct GetResultSetMetadataReq {
    pub operation_handle: OperationHandle,
}

impl GetResultSetMetadataReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.operation_handle.encode(w);
        w.write_field_stop();
    }
}

/// GetSchemas request.
#[derive(Debug, Clone, Default)]
pub struct GetSchemasReq {
    pub session_handle: SessionHandle,
    pub catalog_name: Option<String>,
    pub schema_name: Option<String>,
}

impl GetSchemasReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_handle.encode(w);
        write_optional_string(w, 2, self.catalog_name.as_deref());
        write_optional_string(w, 3, self.schema_name.as_deref());
        w.write_field_stop();
    }
}

/// GetCatalogs request.
#[derive(Debug, Clone, Default)]
pub struct GetCatalogsReq {
    pub session_handle: SessionHandle,
}

impl GetCatalogsReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_handle.encode(w);
        w.write_field_stop();
    }
}

/// GetColumns request.
#[derive(Debug, Clone, Default)]
pub struct GetColumnsReq {
    pub session_handle: SessionHandle,
    pub catalog_name: Option<String>,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
}

impl GetColumnsReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_handle.encode(w);
        write_optional_string(w, 2, self.catalog_name.as_deref());
        write_optional_string(w, 3, self.schema_name.as_deref());
        write_optional_string(w, 4, self.table_name.as_deref());
        write_optional_string(w, 5, self.column_name.as_deref());
        w.write_field_stop();
    }
}

/// GetPrimaryKeys request.
#[derive(Debug, Clone, Default)]
pub struct GetPrimaryKeysReq {
    pub session_handle: SessionHandle,
    pub catalog_name: Option<String>,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
}

impl GetPrimaryKeysReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.session_handle.encode(w);
        write_optional_string(w, 2, self.catalog_name.as_deref());
        write_optional_string(w, 3, self.schema_name.as_deref());
        write_optional_string(w, 4, self.table_name.as_deref());
        w.write_field_stop();
    }
}

/// CloseOperation request.
#[derive(Debug, Clone, Default)]
pub struct CloseOperationReq {
    pub operation_handle: OperationHandle,
}

impl CloseOperationReq {
    pub(crate) fn encode(&self, w: &mut WireWriter) {
        w.write_field_begin(ttype::STRUCT, 1);
        self.operation_handle.encode(w);
        w.write_field_stop();
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// OpenSession response.
#[derive(Debug, Clone, Default)]
pub struct OpenSessionResp {
    pub status: Status,
    pub server_protocol_version: i32,
    pub session_handle: Option<SessionHandle>,
}

impl OpenSessionResp {
    async fn decode<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = OpenSessionResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                (2, ttype::I32) => resp.server_protocol_version = r.read_i32().await?,
                (3, ttype::STRUCT) => resp.session_handle = Some(SessionHandle::decode(r).await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

impl Response for OpenSessionResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        Self::decode(r).await
    }
}

/// CloseSession response.
#[derive(Debug, Clone, Default)]
pub struct CloseSessionResp {
    pub status: Status,
}

impl Response for CloseSessionResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = CloseSessionResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

/// Response shape shared by ExecuteStatement and the metadata operations:
/// a status plus the operation handle tracking the server-side execution.
#[derive(Debug, Clone, Default)]
pub struct OperationResp {
    pub status: Status,
    pub operation_handle: Option<OperationHandle>,
}

impl OperationResp {
    /// Whether the operation produced a result set at all (pure DDL does
    /// not).
    pub fn has_result_set(&self) -> bool {
        self.operation_handle
            .as_ref()
            .is_some_and(|handle| handle.has_result_set)
    }
}

impl Response for OperationResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = OperationResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                (2, ttype::STRUCT) => {
                    resp.operation_handle = Some(OperationHandle::decode(r).await?)
                }
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

/// GetOperationStatus response.
#[derive(Debug, Clone)]
pub struct GetOperationStatusResp {
    pub status: Status,
    pub operation_state: OperationState,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl Default for GetOperationStatusResp {
    fn default() -> Self {
        Self {
            status: Status::default(),
            operation_state: OperationState::Unknown,
            sql_state: None,
            error_code: None,
            error_message: None,
        }
    }
}

impl Response for GetOperationStatusResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = GetOperationStatusResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                (2, ttype::I32) => {
                    resp.operation_state = OperationState::from_i32(r.read_i32().await?)
                }
                (3, ttype::STRING) => resp.sql_state = Some(r.read_string().await?),
                (4, ttype::I32) => resp.error_code = Some(r.read_i32().await?),
                (5, ttype::STRING) => resp.error_message = Some(r.read_string().await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

/// FetchResults response: one batch plus the more-rows flag that drives
/// pagination.
#[derive(Debug, Clone, Default)]
pub struct FetchResultsResp {
    pub status: Status,
    pub has_more_rows: bool,
    pub results: Option<RowSet>,
}

impl Response for FetchResultsResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = FetchResultsResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                (2, ttype::BOOL) => resp.has_more_rows = r.read_bool().await?,
                (3, ttype::STRUCT) => resp.results = Some(RowSet::decode(r).await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

/// GetResultSetMetadata response.
#[derive(Debug, Clone, Default)]
pub struct GetResultSetMetadataResp {
    pub status: Status,
    pub schema: Option<TableSchema>,
}

impl Response for GetResultSetMetadataResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = GetResultSetMetadataResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                (2, ttype::STRUCT) => resp.schema = Some(TableSchema::decode(r).await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

/// CloseOperation response.
#[derive(Debug, Clone, Default)]
pub struct CloseOperationResp {
    pub status: Status,
}

impl Response for CloseOperationResp {
    async fn decode_body<R: AsyncRead + Unpin + Send>(r: &mut WireReader<R>) -> Result<Self> {
        let mut resp = CloseOperationResp::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRUCT) => resp.status = Status::decode(r).await?,
                _ => r.skip(field_type).await?,
            }
        }
        Ok(resp)
    }
}

/// Remote exception reply (TApplicationException body).
#[derive(Debug, Clone, Default)]
pub(crate) struct ApplicationException {
    pub message: Option<String>,
    pub kind: Option<i32>,
}

impl ApplicationException {
    pub(crate) async fn decode<R: AsyncRead + Unpin + Send>(
        r: &mut WireReader<R>,
    ) -> Result<Self> {
        let mut exc = ApplicationException::default();
        while let Some((field_type, id)) = r.read_field_begin().await? {
            match (id, field_type) {
                (1, ttype::STRING) => exc.message = Some(r.read_string().await?),
                (2, ttype::I32) => exc.kind = Some(r.read_i32().await?),
                _ => r.skip(field_type).await?,
            }
        }
        Ok(exc)
    }
}
