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

//! Connection and execution parameters.

use std::collections::HashMap;
use std::time::Duration;

/// Authentication mechanism selected for the pre-RPC handshake.
///
/// `Nosasl` skips the handshake entirely; `Plain` performs password-based
/// negotiation; `Gssapi` delegates each round to a
/// [`crate::auth::SecurityContext`] provider supplied at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMechanism {
    Nosasl,
    Plain,
    Gssapi,
}

impl AuthMechanism {
    /// Wire name sent in the START frame.
    pub fn sasl_name(&self) -> &'static str {
        match self {
            AuthMechanism::Nosasl => "NOSASL",
            AuthMechanism::Plain => "PLAIN",
            AuthMechanism::Gssapi => "GSSAPI",
        }
    }
}

/// TLS settings for the underlying socket.
#[derive(Debug, Clone, Default)]
pub struct TlsParams {
    /// Accept certificates that fail verification (self-signed clusters).
    pub accept_invalid_certs: bool,
    /// Hostname presented for SNI/verification when it differs from the
    /// dialed host.
    pub sni_hostname: Option<String>,
}

/// Parameters for one connection attempt. Immutable once handed to
/// [`crate::connect`].
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub mechanism: AuthMechanism,
    pub username: String,
    pub password: String,
    /// Wrap the socket in TLS before the handshake when set.
    pub tls: Option<TlsParams>,
    /// Bound on the TCP dial (and TLS handshake).
    pub connect_timeout: Duration,
    /// Per-statement server-side timeout, in seconds, sent with every
    /// ExecuteStatement request.
    pub query_timeout_secs: i64,
    /// Status poll budget for async execution.
    pub poll_attempts: u32,
    /// Fixed delay between status polls.
    pub poll_interval: Duration,
    /// Page size for paginated result fetches.
    pub fetch_page_size: i64,
    /// Session-level configuration map sent at OpenSession.
    pub configuration: HashMap<String, String>,
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 10000,
            mechanism: AuthMechanism::Nosasl,
            username: String::new(),
            password: String::new(),
            tls: None,
            connect_timeout: Duration::from_secs(10),
            query_timeout_secs: 100_000,
            poll_attempts: 5,
            poll_interval: Duration::from_millis(1000),
            fetch_page_size: 100,
            configuration: HashMap::new(),
        }
    }
}

/// Per-statement options for [`crate::cursor::Cursor::execute`].
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Session-setting overlay applied to this statement only.
    pub conf_overlay: HashMap<String, String>,
    /// Overrides the connection-level query timeout when set.
    pub query_timeout_secs: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_bound_all_waits() {
        let params = ConnectionParams::default();
        assert!(params.connect_timeout > Duration::ZERO);
        assert!(params.query_timeout_secs > 0);
        assert_eq!(params.poll_attempts, 5);
        assert_eq!(params.poll_interval, Duration::from_millis(1000));
        assert_eq!(params.fetch_page_size, 100);
    }

    #[test]
    fn test_sasl_names() {
        assert_eq!(AuthMechanism::Plain.sasl_name(), "PLAIN");
        assert_eq!(AuthMechanism::Gssapi.sasl_name(), "GSSAPI");
        assert_eq!(AuthMechanism::Nosasl.sasl_name(), "NOSASL");
    }
}
