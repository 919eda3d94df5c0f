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

//! Client for communicating with a HiveServer2-compatible endpoint.
//!
//! This module provides:
//! - `TcliService` trait: abstract interface over the TCLI service RPCs
//! - `Connection`: implementation over a socket speaking Thrift binary
//!   protocol, with optional TLS and SASL framing

pub mod thrift;

use crate::error::Result;
use crate::protocol::messages::{
    CloseOperationReq, CloseOperationResp, CloseSessionReq, CloseSessionResp, ExecuteStatementReq,
    FetchResultsReq, FetchResultsResp, GetCatalogsReq, GetColumnsReq, GetOperationStatusReq,
    GetOperationStatusResp, GetPrimaryKeysReq, GetResultSetMetadataReq, GetResultSetMetadataResp,
    GetSchemasReq, OpenSessionReq, OpenSessionResp, OperationResp,
};
use async_trait::async_trait;

pub use thrift::Connection;

/// Abstract interface over the TCLI service RPC surface.
///
/// `Connection` is the production implementation; tests substitute
/// scripted implementations to drive the session and cursor layers
/// without a server.
#[async_trait]
pub trait TcliService: Send + Sync {
    async fn open_session(&self, req: OpenSessionReq) -> Result<OpenSessionResp>;

    async fn close_session(&self, req: CloseSessionReq) -> Result<CloseSessionResp>;

    async fn execute_statement(&self, req: ExecuteStatementReq) -> Result<OperationResp>;

    async fn get_operation_status(
        &self,
        req: GetOperationStatusReq,
    ) -> Result<GetOperationStatusResp>;

    async fn fetch_results(&self, req: FetchResultsReq) -> Result<FetchResultsResp>;

    async fn get_result_set_metadata(
        &self,
        req: GetResultSetMetadataReq,
    ) -> Result<GetResultSetMetadataResp>;

    async fn get_schemas(&self, req: GetSchemasReq) -> Result<OperationResp>;

    async fn get_catalogs(&self, req: GetCatalogsReq) -> Result<OperationResp>;

    async fn get_columns(&self, req: GetColumnsReq) -> Result<OperationResp>;

    async fn get_primary_keys(&self, req: GetPrimaryKeysReq) -> Result<OperationResp>;

    async fn close_operation(&self, req: CloseOperationReq) -> Result<CloseOperationResp>;
}
