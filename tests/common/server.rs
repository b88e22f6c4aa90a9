//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own corpus database.

use super::constants::*;
use super::fixtures::{create_test_corpus, KeywordClassifier};
use moviemood_server::corpus_store::SqliteMovieEmotionStore;
use moviemood_server::emotion::{EmotionPredictionEngine, SerializedClassifier, TextSegmenter};
use moviemood_server::recommend::RecommendationEngine;
use moviemood_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Knobs for [`TestServer::spawn_with`].
#[derive(Clone, Debug)]
pub struct TestServerOptions {
    /// Fill the corpus with the fixture movies
    pub populated_corpus: bool,
    /// Wrap the classifier behind the global inference lock
    pub serialize_inference: bool,
    pub worker_threads: usize,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            populated_corpus: true,
            serialize_inference: false,
            worker_threads: 2,
        }
    }
}

/// Test server instance with an isolated corpus database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Corpus database backing this server
    pub db_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port, with the fixture corpus
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a test server whose corpus database has no rows
    pub async fn spawn_with_empty_corpus() -> Self {
        Self::spawn_with(TestServerOptions {
            populated_corpus: false,
            ..TestServerOptions::default()
        })
        .await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Corpus creation fails
    /// - Port binding fails
    /// - Server doesn't become ready within timeout
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let (temp_db_dir, db_path) = create_test_corpus(options.populated_corpus)
            .expect("Failed to create test corpus");

        let store =
            Arc::new(SqliteMovieEmotionStore::new(&db_path).expect("Failed to open corpus store"));
        let recommendation_engine = Arc::new(RecommendationEngine::new(store));

        let classifier: moviemood_server::emotion::SharedClassifier =
            if options.serialize_inference {
                Arc::new(SerializedClassifier::new(Arc::new(KeywordClassifier)))
            } else {
                Arc::new(KeywordClassifier)
            };
        let prediction_engine = Arc::new(EmotionPredictionEngine::new(
            classifier,
            TextSegmenter::default(),
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            worker_threads: options.worker_threads,
            ..ServerConfig::default()
        };

        let app = make_app(config, prediction_engine, recommendation_engine)
            .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            db_path,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/api/v1/health", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
