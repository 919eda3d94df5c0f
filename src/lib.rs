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

//! Async client for HiveServer2-compatible SQL warehouses.
//!
//! This crate speaks the TCLI service RPC protocol over Thrift strict
//! binary encoding, with SASL-style transport negotiation (NOSASL,
//! PLAIN, or GSSAPI via a pluggable security context) and optional TLS.
//!
//! ## Overview
//!
//! - [`connect`] dials an endpoint, authenticates, and opens a session
//! - [`Cursor`] executes statements (synchronously or with server-side
//!   async polled to completion), pages through results, and runs the
//!   catalog/schema/column/primary-key metadata operations
//! - [`decode::assemble_rows`] turns column-major batches into
//!   row-major JSON objects
//! - [`schema::map_schema`] maps result-set wire types to a structural
//!   document schema
//!
//! ## Example
//!
//! ```ignore
//! use hive_tcli::{connect, ConnectionParams, ExecuteOptions};
//!
//! let mut params = ConnectionParams::new("warehouse.example.com", 10000);
//! params.username = "hue".into();
//! params.password = "secret".into();
//!
//! let session = connect(params).await?;
//! let cursor = session.cursor();
//! let resp = cursor.async_execute("SELECT * FROM t", &ExecuteOptions::default()).await?;
//! if let Some(handle) = &resp.operation_handle {
//!     let rows = cursor.fetch_rows(handle).await?;
//!     cursor.close_operation(handle).await?;
//! }
//! session.close().await?;
//! ```

pub mod auth;
pub mod client;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod logging;
pub mod params;
pub mod protocol;
pub mod schema;

pub use client::{Connection, TcliService};
pub use cursor::{connect, connect_with_context, Cursor, Session};
pub use decode::Row;
pub use error::{Error, Result};
pub use logging::{init_logging, LogConfig};
pub use params::{AuthMechanism, ConnectionParams, ExecuteOptions, TlsParams};
