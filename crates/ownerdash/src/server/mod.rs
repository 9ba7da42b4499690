//! HTTP server for the dashboard.
//!
//! Routes:
//! - `GET /`, `GET /dashboard`: render the page
//! - `POST /saveall`: persist submitted edits
//! - `POST /clear`: empty both edit maps
//!
//! Any other path or method is a 404. Nothing is cached between requests;
//! the dataset and edit maps are re-read from disk each time.

mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::dataset::load_dataset;
use crate::error::{Error, Result};
use crate::store::{EditField, EditStore};

pub use handlers::{Ack, JsonError, PageError};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// The edit store all handlers write through.
    pub store: Arc<EditStore>,
}

impl AppState {
    /// Build state from a configuration and an edit store.
    #[must_use]
    pub fn new(config: Config, store: EditStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Build state with an edit store over the configured files.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let store = EditStore::from_config(&config.data);
        Self::new(config, store)
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::dashboard).fallback(handlers::not_found),
        )
        .route(
            "/dashboard",
            get(handlers::dashboard).fallback(handlers::not_found),
        )
        .route(
            "/saveall",
            post(handlers::save_all).fallback(handlers::not_found),
        )
        .route("/clear", post(handlers::clear).fallback(handlers::not_found))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Run the server until Ctrl+C or SIGTERM.
///
/// The dataset and both edit files are read once before binding so that a
/// missing or malformed file stops startup instead of failing every request.
///
/// # Errors
///
/// Returns an error if the startup checks fail, the address cannot be bound,
/// or the server stops abnormally.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.listen_addr()?;
    let records = load_dataset(config.dataset_path())?;
    let state = AppState::from_config(config);
    let edits = state.store.load()?;

    let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind {
        addr: addr.to_string(),
        source,
    })?;
    let local = listener.local_addr()?;

    info!(
        "Dataset: {} ({} owners)",
        state.config.dataset_path().display(),
        records.len()
    );
    for field in EditField::ALL {
        info!(
            "{} edits: {} ({} entries)",
            field.label(),
            state.store.file(field).path().display(),
            edits.count(field)
        );
    }
    info!("Open: http://{local}");
    info!("Press Ctrl+C to stop");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::logging::init_test_logging;
    use crate::store::EditMap;

    const DATASET: &str = "TOP_OWNER,MAIL_STD,PARCEL_CNT,TOTAL_ACRE\n\
                           BIG RANCH INC,123 MAIN ST,3,500\n\
                           SISTER CO A,PO BOX 1,2,300.5\n\
                           SISTER CO B,PO BOX 1,1,120\n";

    struct Fixture {
        _dir: tempfile::TempDir,
        state: AppState,
    }

    impl Fixture {
        fn new(dataset: &str) -> Self {
            Self::with_config(dataset, |_, _| {})
        }

        fn with_config(dataset: &str, adjust: impl FnOnce(&mut Config, &std::path::Path)) -> Self {
            init_test_logging();
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config::default();
            config.data.dataset_path = dir.path().join("owners.csv");
            config.data.rv_edits_path = dir.path().join("rv_owner_edits.json");
            config.data.packer_edits_path = dir.path().join("packer_edits.json");
            adjust(&mut config, dir.path());
            std::fs::write(&config.data.dataset_path, dataset).unwrap();

            Self {
                _dir: dir,
                state: AppState::from_config(config),
            }
        }

        async fn send(&self, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let response = router(self.state.clone()).oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }

        async fn get(&self, uri: &str) -> (StatusCode, String) {
            self.send("GET", uri, "").await
        }

        async fn post(&self, uri: &str, body: &str) -> (StatusCode, String) {
            self.send("POST", uri, body).await
        }

        fn stored(&self, field: EditField) -> EditMap {
            self.state.store.file(field).load().unwrap()
        }
    }

    fn map(entries: &[(&str, &str)]) -> EditMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_get_root_and_dashboard_render() {
        let fx = Fixture::new(DATASET);

        let (status, root) = fx.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(root.starts_with("<!DOCTYPE html>"));
        assert!(root.contains("BIG RANCH INC"));

        let (status, dashboard) = fx.get("/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(root, dashboard);
    }

    #[tokio::test]
    async fn test_render_is_idempotent() {
        let fx = Fixture::new(DATASET);
        fx.post("/saveall", r#"{"rv": {"PO BOX 1": "Acme"}, "packer": {"123 MAIN ST": "Sunkist"}}"#)
            .await;

        let (_, first) = fx.get("/").await;
        let (_, second) = fx.get("/").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_then_render_shows_edit() {
        let fx = Fixture::new("TOP_OWNER,MAIL_STD,PARCEL_CNT,TOTAL_ACRE\nACME,123 MAIN ST,3,500\n");

        let (status, body) = fx
            .post("/saveall", r#"{"rv": {"123 MAIN ST": "Acme Farms"}, "packer": {}}"#)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":true}"#);

        let (_, html) = fx.get("/").await;
        assert!(html.contains(r#"data-field="rv" value="Acme Farms""#));
        assert!(html.contains(
            "<div class=\"stat-value\">1</div>\n            <div class=\"stat-label\">Rv_Owner Edits</div>"
        ));
    }

    #[tokio::test]
    async fn test_shared_address_edit_shows_on_both_rows() {
        let fx = Fixture::new(DATASET);

        fx.post("/saveall", r#"{"rv": {}, "packer": {"PO BOX 1": "Shared Packer"}}"#)
            .await;

        let (_, html) = fx.get("/").await;
        assert_eq!(
            html.matches(r#"data-key="PO BOX 1" data-field="packer" value="Shared Packer""#)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_replace_save_drops_unsubmitted_keys() {
        let fx = Fixture::new(DATASET);
        fx.post("/saveall", r#"{"rv": {"A": "x", "B": "y"}}"#).await;

        fx.post("/saveall", r#"{"rv": {"B": "z"}}"#).await;

        assert_eq!(fx.stored(EditField::Rv), map(&[("B", "z")]));
    }

    #[tokio::test]
    async fn test_merge_save_keeps_existing_keys() {
        let fx = Fixture::new(DATASET);
        fx.post("/saveall", r#"{"rv": {"A": "x", "B": "y"}, "packer": {"P": "q"}}"#)
            .await;

        let (status, _) = fx
            .post("/saveall", r#"{"rv": {"B": "z", "C": "w"}, "merge": true}"#)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            fx.stored(EditField::Rv),
            map(&[("A", "x"), ("B", "z"), ("C", "w")])
        );
        assert_eq!(fx.stored(EditField::Packer), map(&[("P", "q")]));
    }

    #[tokio::test]
    async fn test_empty_values_are_not_persisted() {
        let fx = Fixture::new(DATASET);

        fx.post("/saveall", r#"{"rv": {"A": "", "B": "  ", "C": "keep"}}"#)
            .await;

        assert_eq!(fx.stored(EditField::Rv), map(&[("C", "keep")]));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_without_writing() {
        let fx = Fixture::new(DATASET);
        fx.post("/saveall", r#"{"rv": {"A": "x"}}"#).await;

        for body in ["{not json", r#"{"rv": "oops"}"#, r#"{"packer": {"A": 1}}"#] {
            let (status, response) = fx.post("/saveall", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            let json: serde_json::Value = serde_json::from_str(&response).unwrap();
            assert_eq!(json["ok"], false);
            assert!(json["error"].as_str().unwrap().contains("invalid request"));
        }

        assert_eq!(fx.stored(EditField::Rv), map(&[("A", "x")]));
    }

    #[tokio::test]
    async fn test_clear_empties_both_maps() {
        let fx = Fixture::new(DATASET);
        fx.post("/saveall", r#"{"rv": {"A": "x"}, "packer": {"B": "y"}}"#)
            .await;

        let (status, body) = fx.post("/clear", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":true}"#);
        assert!(fx.stored(EditField::Rv).is_empty());
        assert!(fx.stored(EditField::Packer).is_empty());
        assert_eq!(
            std::fs::read_to_string(fx.state.store.file(EditField::Rv).path()).unwrap(),
            "{}\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_routes_and_methods_are_404() {
        let fx = Fixture::new(DATASET);

        assert_eq!(fx.get("/missing").await.0, StatusCode::NOT_FOUND);
        assert_eq!(fx.get("/saveall").await.0, StatusCode::NOT_FOUND);
        assert_eq!(fx.get("/clear").await.0, StatusCode::NOT_FOUND);
        assert_eq!(fx.post("/", "").await.0, StatusCode::NOT_FOUND);
        assert_eq!(fx.post("/dashboard", "").await.0, StatusCode::NOT_FOUND);
        assert_eq!(fx.send("DELETE", "/clear", "").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_dataset_at_request_time_is_500() {
        let fx = Fixture::new(DATASET);
        std::fs::remove_file(fx.state.config.dataset_path()).unwrap();

        let (status, body) = fx.get("/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("owners.csv"));
    }

    #[tokio::test]
    async fn test_malformed_edit_file_is_500() {
        let fx = Fixture::new(DATASET);
        std::fs::write(fx.state.store.file(EditField::Packer).path(), "[1, 2").unwrap();

        let (status, _) = fx.get("/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = fx.post("/saveall", r#"{"merge": true}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("packer_edits.json"));
    }

    #[tokio::test]
    async fn test_write_failure_is_500_and_applies_nothing() {
        let fx = Fixture::with_config(DATASET, |config, dir| {
            let blocker = dir.join("blocker");
            std::fs::write(&blocker, "").unwrap();
            config.data.packer_edits_path = blocker.join("packer_edits.json");
        });
        fx.state
            .store
            .file(EditField::Rv)
            .save(&map(&[("A", "x")]))
            .unwrap();

        for (uri, body) in [
            ("/saveall", r#"{"rv": {"B": "y"}, "packer": {"P": "q"}}"#),
            ("/saveall", r#"{"rv": {"B": "y"}, "merge": true}"#),
            ("/clear", ""),
        ] {
            let (status, response) = fx.post(uri, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri} {body}");
            let json: serde_json::Value = serde_json::from_str(&response).unwrap();
            assert_eq!(json["ok"], false);
            assert!(json["error"].as_str().unwrap().contains("packer_edits.json"));
        }

        assert_eq!(fx.stored(EditField::Rv), map(&[("A", "x")]));
    }

    #[tokio::test]
    async fn test_serve_fails_fast_on_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.server.port = 0;
        config.data.dataset_path = dir.path().join("absent.csv");

        let err = serve(config).await.unwrap_err();
        assert!(err.is_dataset_error());
    }
}
