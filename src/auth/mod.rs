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

//! Transport authentication: the SASL-style handshake run before any
//! RPC traffic, plus the pluggable security context used for GSSAPI.

mod sasl;

pub(crate) use sasl::{negotiate, read_data_frame, write_data_frame};

use crate::error::Result;
use async_trait::async_trait;

/// Outcome of one GSSAPI context step.
#[derive(Debug)]
pub enum SaslStep {
    /// Send this token to the server and wait for its reply.
    Continue(Vec<u8>),
    /// The context is established on the client side; wait for the
    /// server to confirm completion.
    Complete,
}

/// Pluggable Kerberos-style security context. The handshake calls
/// [`step`](SecurityContext::step) with each server token (empty on the
/// first call) until the context reports completion; token contents are
/// opaque to the transport and pass over the wire unmodified.
#[async_trait]
pub trait SecurityContext: Send {
    async fn step(&mut self, inbound: &[u8]) -> Result<SaslStep>;
}
