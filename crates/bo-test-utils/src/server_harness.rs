//! Test server harness for E2E testing
//!
//! Provides `TestBackOfficeServer` for spawning a real Back Office router in
//! tests, backed by an in-memory store and a manually driven clock.

use crate::test_ids::{
    test_start_time, TEST_BCRYPT_COST, TEST_JWT_SECRET_B64, TEST_PASSWORD,
};
use anyhow::{anyhow, Context};
use bo_service::clock::{Clock, MockClock};
use bo_service::config::Config;
use bo_service::crypto;
use bo_service::models::{Identity, NewIdentity, NewProduct, Product, Role, Team};
use bo_service::observability::metrics::init_metrics_recorder;
use bo_service::repositories::{InMemoryStore, Store};
use bo_service::routes::{self, AppState};
use bo_service::services::meeting_scheduler::MeetingScheduler;
use bo_service::services::token_service::TokenService;
use common::types::TenantId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Global metrics handle shared by every test server in the process.
static TEST_METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    OnceLock::new();

fn test_metrics_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

/// An identity with a session token the server will accept.
#[derive(Debug, Clone)]
pub struct TestSession {
    pub identity: Identity,
    pub token: String,
}

/// Test harness for spawning the Back Office server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestBackOfficeServer::spawn().await?;
///     let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
///
///     let response = server
///         .client()
///         .get(format!("{}/api/user", server.url()))
///         .bearer_auth(&owner.token)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestBackOfficeServer {
    addr: SocketAddr,
    store: Arc<InMemoryStore>,
    clock: Arc<MockClock>,
    token_service: Arc<TokenService>,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestBackOfficeServer {
    /// Spawn a new test server instance with an empty store
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start its clock at [`test_start_time`]
    /// - Start the HTTP server in the background
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://unused/backoffice".to_string(),
            ),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET_B64.to_string()),
            ("BCRYPT_COST".to_string(), TEST_BCRYPT_COST.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);
        let config = Config::from_vars(&vars).context("Failed to build test config")?;

        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MockClock::new(test_start_time()));
        let dyn_store: Arc<dyn Store> = store.clone();
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let token_service = Arc::new(
            TokenService::from_config(&config, dyn_clock.clone())
                .context("Failed to build token service")?,
        );

        let state = Arc::new(AppState {
            store: dyn_store.clone(),
            token_service: token_service.clone(),
            scheduler: Arc::new(MeetingScheduler::new(dyn_store, dyn_clock)),
            config: config.clone(),
        });

        // Build routes using bo-service's real route builder
        let app = routes::build_routes(state, test_metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            clock,
            token_service,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Direct access to the backing store, for seeding and inspection
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// The server's clock; advance it to expire tokens or age meetings
    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a tenant through `POST /api/admin` and return its owner session
    pub async fn bootstrap_tenant(&self, email: &str) -> Result<TestSession, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/admin", self.url()))
            .json(&serde_json::json!({
                "name": "Owner",
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::CREATED {
            return Err(anyhow!(
                "Bootstrap failed with {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            ));
        }

        let token = response
            .headers()
            .get("access-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Bootstrap response has no Access-Token header"))?;

        let body: serde_json::Value = response.json().await?;
        let identity: Identity = serde_json::from_value(body["user"].clone())?;

        Ok(TestSession { identity, token })
    }

    /// Insert an active ADMIN or MEMBER directly into `owner`'s tenant
    ///
    /// Bypasses invite and registration; the account's password is
    /// [`TEST_PASSWORD`].
    pub async fn seed_staff(
        &self,
        owner: &Identity,
        role: Role,
        email: &str,
    ) -> Result<TestSession, anyhow::Error> {
        let identity = self
            .store
            .create_identity(NewIdentity {
                name: email.split('@').next().unwrap_or("staff").to_string(),
                email: email.to_string(),
                role,
                team: Some(Team::Design),
                tenant_admin_id: Some(owner.id),
                active: true,
                password_hash: Some(crypto::hash_password(TEST_PASSWORD, TEST_BCRYPT_COST)?),
            })
            .await?;

        let token = self.token_service.issue(&identity)?;
        Ok(TestSession { identity, token })
    }

    /// Insert an active product owned by `owner`'s tenant
    pub async fn seed_product(
        &self,
        owner: &Identity,
        brand: &str,
        members: &[&Identity],
    ) -> Result<Product, anyhow::Error> {
        let product = self
            .store
            .create_product(NewProduct {
                brand: brand.to_string(),
                description: String::new(),
                owner_tenant_id: TenantId::from(owner.id),
                members: members.iter().map(|m| m.id).collect(),
                categories: Default::default(),
                tags: Default::default(),
            })
            .await?;
        Ok(product)
    }

    /// Issue a token for an identity as the server would
    pub fn token_for(&self, identity: &Identity) -> Result<String, anyhow::Error> {
        Ok(self.token_service.issue(identity)?)
    }
}

impl Drop for TestBackOfficeServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released when the test ends
        self._handle.abort();
    }
}
