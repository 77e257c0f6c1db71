//! Graph store session.
//!
//! Statements reach NebulaGraph through its HTTP gateway. The session is
//! behind the [`GraphSession`] trait so the executor, loader, and validator
//! can run against a scripted session in tests.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::NebulaConfig;
use crate::error::{LoadError, StoreError};

/// Result of one executed statement.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub code: i64,
    pub message: String,
    pub data: serde_json::Value,
}

impl ExecOutcome {
    /// Successful outcome with no payload, for tests and dry paths.
    pub fn ok() -> ExecOutcome {
        ExecOutcome {
            code: 0,
            message: String::new(),
            data: serde_json::Value::Null,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        self.code == 0
    }

    /// Extract the first row's `count` column from a count query result.
    pub fn first_count(&self) -> Option<i64> {
        self.data.get("tables")?.get(0)?.get("count")?.as_i64()
    }
}

/// A connected store session that can execute nGQL statements.
///
/// A transport failure is an `Err`; a statement the store rejected is an
/// `Ok` outcome with a non-zero code. The retrying executor treats both as
/// retryable.
#[async_trait]
pub trait GraphSession: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<ExecOutcome, StoreError>;

    /// Release the session. Called exactly once, on every run outcome.
    async fn disconnect(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Session over the NebulaGraph HTTP gateway.
pub struct GatewaySession {
    http: reqwest::Client,
    base: String,
    session_id: String,
}

impl GatewaySession {
    /// Connect to the first reachable configured gateway endpoint and
    /// authenticate. Fails when every endpoint refuses.
    pub async fn connect(config: &NebulaConfig) -> Result<GatewaySession, LoadError> {
        let pool = &config.connection_pool;
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(pool.max_size)
            .timeout(std::time::Duration::from_secs(pool.timeout))
            .pool_idle_timeout(std::time::Duration::from_secs(pool.idle_time))
            .build()
            .map_err(|e| LoadError::Connection(format!("building HTTP client: {e}")))?;

        let mut last_error = String::from("no hosts configured");
        for host in &config.hosts {
            let base = format!("http://{}:{}", host.host, host.port);
            debug!("Connecting to store gateway at {}", base);
            match Self::authenticate(&http, &base, &config.username, &config.password).await {
                Ok(session_id) => {
                    info!("Connected to store gateway at {}", base);
                    return Ok(GatewaySession {
                        http,
                        base,
                        session_id,
                    });
                }
                Err(e) => {
                    warn!("Gateway {} refused connection: {}", base, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(LoadError::Connection(format!(
            "all configured hosts failed, last error: {last_error}"
        )))
    }

    async fn authenticate(
        http: &reqwest::Client,
        base: &str,
        username: &str,
        password: &str,
    ) -> Result<String, StoreError> {
        let body: GatewayResponse = http
            .post(format!("{base}/api/db/connect"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?
            .json()
            .await?;

        if body.code != 0 {
            return Err(StoreError::Gateway {
                code: body.code,
                message: body.message,
            });
        }
        body.data
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| StoreError::MalformedResponse("connect returned no session id".into()))
    }
}

#[async_trait]
impl GraphSession for GatewaySession {
    async fn execute(&self, statement: &str) -> Result<ExecOutcome, StoreError> {
        let body: GatewayResponse = self
            .http
            .post(format!("{}/api/db/exec", self.base))
            .header("Cookie", format!("NSID={}", self.session_id))
            .json(&serde_json::json!({ "gql": statement }))
            .send()
            .await?
            .json()
            .await?;

        Ok(ExecOutcome {
            code: body.code,
            message: body.message,
            data: body.data,
        })
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.http
            .post(format!("{}/api/db/disconnect", self.base))
            .header("Cookie", format!("NSID={}", self.session_id))
            .send()
            .await?;
        Ok(())
    }
}
