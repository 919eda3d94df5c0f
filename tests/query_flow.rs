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

//! End-to-end statement flow against a scripted service: submit, poll,
//! page, assemble rows, and map the schema, all through the public API.

use async_trait::async_trait;
use hive_tcli::protocol::messages::{
    CloseOperationReq, CloseOperationResp, CloseSessionReq, CloseSessionResp, Column,
    ColumnDesc, ExecuteStatementReq, FetchResultsReq, FetchResultsResp, GetCatalogsReq,
    GetColumnsReq, GetOperationStatusReq, GetOperationStatusResp, GetPrimaryKeysReq,
    GetResultSetMetadataReq, GetResultSetMetadataResp, GetSchemasReq, OpenSessionReq,
    OpenSessionResp, OperationHandle, OperationResp, OperationState, PrimitiveTypeEntry, RowSet,
    SessionHandle, Status, StatusCode, TableSchema, TypeDesc, TypeEntry, TypeId, PROTOCOL_V9,
};
use hive_tcli::schema::map_schema;
use hive_tcli::{ConnectionParams, ExecuteOptions, Result, Session, TcliService};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn ok_status() -> Status {
    Status {
        status_code: StatusCode::Success,
        ..Status::default()
    }
}

fn column_desc(name: &str, position: i32, type_id: TypeId) -> ColumnDesc {
    ColumnDesc {
        column_name: name.to_string(),
        type_desc: TypeDesc {
            types: vec![TypeEntry {
                primitive: Some(PrimitiveTypeEntry {
                    type_id,
                    qualifiers: None,
                }),
            }],
        },
        position,
        comment: None,
    }
}

/// Warehouse double: two result pages for one statement, counters for
/// lifecycle assertions.
struct FakeWarehouse {
    statuses: Mutex<VecDeque<OperationState>>,
    pages: Mutex<VecDeque<FetchResultsResp>>,
    schema: TableSchema,
    sessions_closed: AtomicU32,
    operations_closed: AtomicU32,
}

impl FakeWarehouse {
    fn new() -> Self {
        let schema = TableSchema {
            columns: vec![
                column_desc("t.name", 1, TypeId::String),
                column_desc("t.total", 2, TypeId::Bigint),
            ],
        };
        let page = |names: &[&str], totals: &[i64], more: bool| FetchResultsResp {
            status: ok_status(),
            has_more_rows: more,
            results: Some(RowSet {
                start_row_offset: 0,
                columns: vec![
                    Column::String {
                        values: names.iter().map(|n| n.to_string()).collect(),
                        nulls: Vec::new(),
                    },
                    Column::I64 {
                        values: totals.iter().map(|t| t.to_be_bytes()).collect(),
                        nulls: Vec::new(),
                    },
                ],
            }),
        };
        Self {
            statuses: Mutex::new(VecDeque::from([
                OperationState::Running,
                OperationState::Finished,
            ])),
            pages: Mutex::new(VecDeque::from([
                page(&["alpha", "beta"], &[1, 1 << 60], true),
                page(&["gamma"], &[-3], false),
            ])),
            schema,
            sessions_closed: AtomicU32::new(0),
            operations_closed: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TcliService for FakeWarehouse {
    async fn open_session(&self, req: OpenSessionReq) -> Result<OpenSessionResp> {
        assert_eq!(req.client_protocol, PROTOCOL_V9);
        Ok(OpenSessionResp {
            status: ok_status(),
            server_protocol_version: PROTOCOL_V9,
            session_handle: Some(SessionHandle::default()),
        })
    }

    async fn close_session(&self, _req: CloseSessionReq) -> Result<CloseSessionResp> {
        self.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(CloseSessionResp { status: ok_status() })
    }

    async fn execute_statement(&self, req: ExecuteStatementReq) -> Result<OperationResp> {
        assert!(req.run_async);
        assert_eq!(req.query_timeout_secs, 100_000);
        Ok(OperationResp {
            status: ok_status(),
            operation_handle: Some(OperationHandle {
                has_result_set: true,
                ..OperationHandle::default()
            }),
        })
    }

    async fn get_operation_status(
        &self,
        _req: GetOperationStatusReq,
    ) -> Result<GetOperationStatusResp> {
        let state = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .expect("status polled after terminal state");
        Ok(GetOperationStatusResp {
            status: ok_status(),
            operation_state: state,
            ..GetOperationStatusResp::default()
        })
    }

    async fn fetch_results(&self, req: FetchResultsReq) -> Result<FetchResultsResp> {
        assert_eq!(req.max_rows, 100);
        Ok(self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetched past the final page"))
    }

    async fn get_result_set_metadata(
        &self,
        _req: GetResultSetMetadataReq,
    ) -> Result<GetResultSetMetadataResp> {
        Ok(GetResultSetMetadataResp {
            status: ok_status(),
            schema: Some(self.schema.clone()),
        })
    }

    async fn get_schemas(&self, req: GetSchemasReq) -> Result<OperationResp> {
        assert_eq!(req.schema_name.as_deref(), Some("sales"));
        Ok(OperationResp {
            status: ok_status(),
            operation_handle: Some(OperationHandle::default()),
        })
    }

    async fn get_catalogs(&self, _req: GetCatalogsReq) -> Result<OperationResp> {
        Ok(OperationResp {
            status: ok_status(),
            operation_handle: Some(OperationHandle::default()),
        })
    }

    async fn get_columns(&self, req: GetColumnsReq) -> Result<OperationResp> {
        assert_eq!(req.table_name.as_deref(), Some("orders"));
        Ok(OperationResp {
            status: ok_status(),
            operation_handle: Some(OperationHandle::default()),
        })
    }

    async fn get_primary_keys(&self, req: GetPrimaryKeysReq) -> Result<OperationResp> {
        assert_eq!(req.table_name.as_deref(), Some("orders"));
        Ok(OperationResp {
            status: ok_status(),
            operation_handle: Some(OperationHandle::default()),
        })
    }

    async fn close_operation(&self, _req: CloseOperationReq) -> Result<CloseOperationResp> {
        self.operations_closed.fetch_add(1, Ordering::SeqCst);
        Ok(CloseOperationResp { status: ok_status() })
    }
}

fn fast_params() -> ConnectionParams {
    let mut params = ConnectionParams::new("warehouse.test", 10000);
    params.poll_interval = Duration::from_millis(1);
    params
}

#[tokio::test]
async fn test_statement_flow_end_to_end() {
    let warehouse = Arc::new(FakeWarehouse::new());
    let session = Session::open(warehouse.clone(), fast_params()).await.unwrap();
    assert_eq!(session.server_protocol_version(), PROTOCOL_V9);

    let cursor = session.cursor();
    let resp = cursor
        .async_execute("SELECT name, total FROM t", &ExecuteOptions::default())
        .await
        .unwrap();
    let handle = resp.operation_handle.as_ref().unwrap();

    let rows = cursor.fetch_rows(handle).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], json!("alpha"));
    assert_eq!(rows[0]["total"], json!(1));
    // Above the exact-integer range of a double-backed consumer.
    assert_eq!(rows[1]["total"], json!((1i64 << 53) - 1));
    assert_eq!(rows[2]["name"], json!("gamma"));
    assert_eq!(rows[2]["total"], json!(-3));

    cursor.close_operation(handle).await.unwrap();
    session.close().await.unwrap();
    assert_eq!(warehouse.operations_closed.load(Ordering::SeqCst), 1);
    assert_eq!(warehouse.sessions_closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_metadata_operations_route_filters() {
    let warehouse = Arc::new(FakeWarehouse::new());
    let session = Session::open(warehouse, fast_params()).await.unwrap();
    let cursor = session.cursor();

    assert!(cursor
        .get_schemas(None, Some("sales"))
        .await
        .unwrap()
        .operation_handle
        .is_some());
    assert!(cursor.get_catalogs().await.unwrap().operation_handle.is_some());
    assert!(cursor
        .get_columns(None, Some("sales"), Some("orders"), None)
        .await
        .unwrap()
        .operation_handle
        .is_some());
    assert!(cursor
        .get_primary_keys(None, Some("sales"), Some("orders"))
        .await
        .unwrap()
        .operation_handle
        .is_some());
}

#[tokio::test]
async fn test_schema_document_from_metadata() {
    let warehouse = Arc::new(FakeWarehouse::new());
    let session = Session::open(warehouse, fast_params()).await.unwrap();
    let cursor = session.cursor();

    let metadata = cursor.get_schema(&OperationHandle::default()).await.unwrap();
    let document = map_schema(&metadata.schema.unwrap());
    assert_eq!(
        document["properties"]["name"],
        json!({"type": "text", "mode": "string", "comments": ""})
    );
    assert_eq!(
        document["properties"]["total"],
        json!({"type": "numeric", "mode": "bigint", "comments": ""})
    );
}
