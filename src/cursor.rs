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

//! Session lifecycle and statement execution.
//!
//! A [`Session`] owns one server-side session handle; [`Cursor`]s
//! cloned from it run statements, poll asynchronous operations to
//! completion, and page through results. Handles are only valid on the
//! connection that issued them, so everything here shares one client.

use crate::client::{Connection, TcliService};
use crate::decode;
use crate::error::{Error, Result};
use crate::params::{ConnectionParams, ExecuteOptions};
use crate::protocol::messages::{
    CloseOperationReq, CloseSessionReq, ExecuteStatementReq, FetchOrientation, FetchResultsReq,
    GetCatalogsReq, GetColumnsReq, GetOperationStatusReq, GetOperationStatusResp,
    GetPrimaryKeysReq, GetResultSetMetadataReq, GetResultSetMetadataResp, GetSchemasReq,
    OpenSessionReq, OperationHandle, OperationResp, RowSet, SessionHandle, PROTOCOL_V9,
};
use crate::Row;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Open a connection and a session on it in one step.
pub async fn connect(params: ConnectionParams) -> Result<Session> {
    let client = Arc::new(Connection::connect(&params).await?);
    Session::open(client, params).await
}

/// As [`connect`], with a security context for GSSAPI negotiation.
pub async fn connect_with_context(
    params: ConnectionParams,
    context: Box<dyn crate::auth::SecurityContext>,
) -> Result<Session> {
    let client = Arc::new(Connection::connect_with_context(&params, Some(context)).await?);
    Session::open(client, params).await
}

/// Poll/fetch knobs a cursor carries; copied out of the connection
/// parameters when the session opens.
#[derive(Debug, Clone)]
struct CursorSettings {
    poll_attempts: u32,
    poll_interval: Duration,
    fetch_page_size: i64,
    query_timeout_secs: i64,
}

/// One open server-side session.
pub struct Session {
    client: Arc<dyn TcliService>,
    handle: SessionHandle,
    server_protocol_version: i32,
    settings: CursorSettings,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("server_protocol_version", &self.server_protocol_version)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session over an already-negotiated client.
    pub async fn open(client: Arc<dyn TcliService>, params: ConnectionParams) -> Result<Self> {
        let req = OpenSessionReq {
            client_protocol: PROTOCOL_V9,
            username: Some(params.username.clone()),
            password: Some(params.password.clone()),
            configuration: params.configuration.clone(),
        };
        let resp = client.open_session(req).await?;
        let handle = resp
            .session_handle
            .ok_or_else(|| Error::Protocol("server returned no session handle".to_string()))?;
        debug!(
            server_protocol_version = resp.server_protocol_version,
            "session opened"
        );
        Ok(Self {
            client,
            handle,
            server_protocol_version: resp.server_protocol_version,
            settings: CursorSettings {
                poll_attempts: params.poll_attempts,
                poll_interval: params.poll_interval,
                fetch_page_size: params.fetch_page_size,
                query_timeout_secs: params.query_timeout_secs,
            },
        })
    }

    /// Protocol version the server negotiated down to.
    pub fn server_protocol_version(&self) -> i32 {
        self.server_protocol_version
    }

    /// A cursor bound to this session.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            client: Arc::clone(&self.client),
            session: self.handle.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Close the session on the server. Best effort on drop is not
    /// possible over async I/O, so callers close explicitly; a lost
    /// close only leaks a server-side session that idles out.
    pub async fn close(self) -> Result<()> {
        self.client
            .close_session(CloseSessionReq {
                session_handle: self.handle,
            })
            .await?;
        debug!("session closed");
        Ok(())
    }
}

/// Runs statements and metadata operations within one session.
#[derive(Clone)]
pub struct Cursor {
    client: Arc<dyn TcliService>,
    session: SessionHandle,
    settings: CursorSettings,
}

impl Cursor {
    /// Execute a statement synchronously; the call returns once the
    /// server finishes executing.
    pub async fn execute(&self, statement: &str, options: &ExecuteOptions) -> Result<OperationResp> {
        self.execute_inner(statement, options, false).await
    }

    /// Submit a statement with `runAsync` and poll it to a terminal
    /// state before returning.
    pub async fn async_execute(
        &self,
        statement: &str,
        options: &ExecuteOptions,
    ) -> Result<OperationResp> {
        let resp = self.execute_inner(statement, options, true).await?;
        if let Some(handle) = &resp.operation_handle {
            self.wait_finished(handle).await?;
        }
        Ok(resp)
    }

    async fn execute_inner(
        &self,
        statement: &str,
        options: &ExecuteOptions,
        run_async: bool,
    ) -> Result<OperationResp> {
        debug!(run_async, statement, "executing statement");
        self.client
            .execute_statement(ExecuteStatementReq {
                session_handle: self.session.clone(),
                statement: statement.to_string(),
                conf_overlay: options.conf_overlay.clone(),
                run_async,
                query_timeout_secs: options
                    .query_timeout_secs
                    .unwrap_or(self.settings.query_timeout_secs),
            })
            .await
    }

    /// Poll an operation until it reaches a terminal state, sleeping
    /// between attempts. The terminal status is returned as-is, error
    /// and canceled states included; exhausting the attempt budget is
    /// an [`Error::OperationTimeout`].
    pub async fn wait_finished(
        &self,
        handle: &OperationHandle,
    ) -> Result<GetOperationStatusResp> {
        let mut last_state = None;
        for attempt in 1..=self.settings.poll_attempts {
            let resp = self
                .client
                .get_operation_status(GetOperationStatusReq {
                    operation_handle: handle.clone(),
                })
                .await?;
            debug!(attempt, state = ?resp.operation_state, "operation status");
            if resp.operation_state.is_terminal() {
                return Ok(resp);
            }
            last_state = Some(resp.operation_state);
            if attempt < self.settings.poll_attempts {
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }
        let last_state = last_state.unwrap_or(crate::protocol::messages::OperationState::Unknown);
        warn!(
            attempts = self.settings.poll_attempts,
            last_state = ?last_state,
            "operation did not finish within the poll budget"
        );
        Err(Error::OperationTimeout {
            attempts: self.settings.poll_attempts,
            last_state,
        })
    }

    /// Page through an operation's full result set: first page with the
    /// first-page orientation, subsequent pages with next-page, all at
    /// the configured page size, until the server reports no more rows.
    /// Operations without a result set yield no batches.
    pub async fn fetch_result(&self, handle: &OperationHandle) -> Result<Vec<RowSet>> {
        if !handle.has_result_set {
            return Ok(Vec::new());
        }
        let mut batches = Vec::new();
        let mut orientation = FetchOrientation::First;
        loop {
            let resp = self
                .client
                .fetch_results(FetchResultsReq {
                    operation_handle: handle.clone(),
                    orientation,
                    max_rows: self.settings.fetch_page_size,
                })
                .await?;
            if let Some(row_set) = resp.results {
                batches.push(row_set);
            }
            if !resp.has_more_rows {
                return Ok(batches);
            }
            orientation = FetchOrientation::Next;
        }
    }

    /// Result-set schema of an operation.
    pub async fn get_schema(&self, handle: &OperationHandle) -> Result<GetResultSetMetadataResp> {
        self.client
            .get_result_set_metadata(GetResultSetMetadataReq {
                operation_handle: handle.clone(),
            })
            .await
    }

    /// Fetch an operation's results and assemble them into row-major
    /// JSON objects keyed by short column name.
    pub async fn fetch_rows(&self, handle: &OperationHandle) -> Result<Vec<Row>> {
        let batches = self.fetch_result(handle).await?;
        if batches.is_empty() {
            return Ok(Vec::new());
        }
        let metadata = self.get_schema(handle).await?;
        let schema = metadata
            .schema
            .ok_or_else(|| Error::Protocol("result set metadata carried no schema".to_string()))?;
        Ok(decode::assemble_rows(&schema, &batches))
    }

    /// List schemas, optionally filtered by catalog and schema pattern.
    pub async fn get_schemas(
        &self,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
    ) -> Result<OperationResp> {
        self.client
            .get_schemas(GetSchemasReq {
                session_handle: self.session.clone(),
                catalog_name: catalog_name.map(str::to_string),
                schema_name: schema_name.map(str::to_string),
            })
            .await
    }

    /// List catalogs.
    pub async fn get_catalogs(&self) -> Result<OperationResp> {
        self.client
            .get_catalogs(GetCatalogsReq {
                session_handle: self.session.clone(),
            })
            .await
    }

    /// List columns matching the given patterns.
    pub async fn get_columns(
        &self,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        table_name: Option<&str>,
        column_name: Option<&str>,
    ) -> Result<OperationResp> {
        self.client
            .get_columns(GetColumnsReq {
                session_handle: self.session.clone(),
                catalog_name: catalog_name.map(str::to_string),
                schema_name: schema_name.map(str::to_string),
                table_name: table_name.map(str::to_string),
                column_name: column_name.map(str::to_string),
            })
            .await
    }

    /// List primary keys of a table.
    pub async fn get_primary_keys(
        &self,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        table_name: Option<&str>,
    ) -> Result<OperationResp> {
        self.client
            .get_primary_keys(GetPrimaryKeysReq {
                session_handle: self.session.clone(),
                catalog_name: catalog_name.map(str::to_string),
                schema_name: schema_name.map(str::to_string),
                table_name: table_name.map(str::to_string),
            })
            .await
    }

    /// Release an operation's server-side resources.
    pub async fn close_operation(&self, handle: &OperationHandle) -> Result<()> {
        self.client
            .close_operation(CloseOperationReq {
                operation_handle: handle.clone(),
            })
            .await?;
        Ok(())
    }
}
