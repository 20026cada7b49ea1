//! Common test utilities for E2E tests

#![allow(dead_code)]

use serde_json::{Value, json};
use taskboard::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Configuration pointing at a database inside `temp_dir`
pub fn test_config(temp_dir: &TempDir) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            cors_origins: Vec::new(),
            static_dir: None,
            max_body_bytes: 1_048_576,
        },
        database: config::DatabaseConfig {
            path: temp_dir.path().join("test.db"),
            max_connections: 5,
            query_timeout_seconds: 10,
        },
        api: config::ApiConfig::default(),
        metrics: config::MetricsConfig { enabled: true },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server instance with default test configuration
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server after letting the caller adjust the configuration
    pub async fn with_config(adjust: impl FnOnce(&mut config::AppConfig)) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        adjust(&mut config);

        if config.metrics.enabled {
            taskboard::metrics::init_metrics();
        }

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = taskboard::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST /api/register and return (status, body)
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (u16, Value) {
        let response = self
            .client
            .post(self.url("/api/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    /// POST /api/login and return (status, body)
    pub async fn login(&self, email: &str, password: &str) -> (u16, Value) {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    /// Register a user and return their ID
    pub async fn create_test_user(&self, email: &str) -> String {
        let (status, body) = self.register("Test User", email, "password123").await;
        assert_eq!(status, 200, "registration failed: {body}");
        body["user"]["id"].as_str().unwrap().to_string()
    }

    /// POST /api/tasks and return the created task
    pub async fn create_task(&self, user_id: &str, title: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .json(&json!({
                "userId": user_id,
                "title": title,
                "thingstodo": "write the report",
                "dueDate": "2024-12-31",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["task"].clone()
    }

    /// GET /api/tasks?userId= and return the task array
    pub async fn list_tasks(&self, user_id: &str) -> Vec<Value> {
        let response = self
            .client
            .get(self.url("/api/tasks"))
            .query(&[("userId", user_id)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["tasks"].as_array().unwrap().clone()
    }

    /// GET /metrics and return the exposition text
    pub async fn metrics_text(&self) -> String {
        let response = self
            .client
            .get(self.url("/metrics"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.text().await.unwrap()
    }
}

/// Value of the first sample of `name` carrying every `labels` pair, or 0
/// when no such sample has been recorded yet
pub fn metric_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> f64 {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let (series_name, series_labels) = match series.split_once('{') {
                Some((series_name, rest)) => (series_name, rest),
                None => (series, ""),
            };
            if series_name != name {
                return None;
            }
            let all_present = labels
                .iter()
                .all(|(key, val)| series_labels.contains(&format!("{key}=\"{val}\"")));
            all_present.then(|| value.parse::<f64>().ok()).flatten()
        })
        .next()
        .unwrap_or(0.0)
}
