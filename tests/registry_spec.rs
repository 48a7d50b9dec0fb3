use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use npme::actions;
use npme::registry::{RegistryClient, RegistryError};

/// Requests seen by the fake registry.
#[derive(Debug, Default)]
struct Recorded {
    searches: Vec<HashMap<String, String>>,
    packages: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

fn search_hits() -> Value {
    json!({
        "objects": [
            {
                "package": {
                    "name": "left-pad",
                    "version": "1.3.0",
                    "description": "String left pad",
                    "author": { "name": "azer" },
                    "date": "2018-04-09T01:53:46.000Z"
                }
            },
            {
                "package": {
                    "name": "pad-left",
                    "version": "2.1.0",
                    "description": "",
                    "publisher": { "username": "jonschlinkert" }
                }
            }
        ],
        "total": 2
    })
}

fn package_document(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Type definitions",
        "readme": "# Title\n\nUse `npm i`.",
        "license": "MIT",
        "keywords": ["types"],
        "maintainers": [{ "name": "types-bot" }],
        "dist-tags": { "latest": "20.1.0" }
    })
}

async fn search(
    State(recorded): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorded.lock().unwrap().searches.push(params);
    Json(search_hits())
}

async fn package(State(recorded): State<Shared>, Path(name): Path<String>) -> impl IntoResponse {
    recorded.lock().unwrap().packages.push(name.clone());
    match name.as_str() {
        "missing" => (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response(),
        "broken" => (StatusCode::OK, "{\"name\": ").into_response(),
        "no-readme" => Json(json!({ "name": "no-readme" })).into_response(),
        _ => Json(package_document(&name)).into_response(),
    }
}

/// Start a fake registry on an ephemeral port.
async fn serve() -> (RegistryClient, Shared) {
    let recorded = Shared::default();
    let app = Router::new()
        .route("/-/v1/search", get(search))
        .route("/{name}", get(package))
        .with_state(Arc::clone(&recorded));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (RegistryClient::new(format!("http://{}/", addr)), recorded)
}

mod search {
    use super::*;

    #[tokio::test]
    async fn sends_query_and_size() {
        let (client, recorded) = serve().await;

        client.with_search_size(5).search("  left pad ").await.unwrap();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.searches.len(), 1);
        assert_eq!(recorded.searches[0]["text"], "left pad");
        assert_eq!(recorded.searches[0]["size"], "5");
    }

    #[tokio::test]
    async fn maps_hits_to_summaries() {
        let (client, _) = serve().await;

        let hits = client.search("pad").await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "left-pad");
        assert_eq!(hits[0].author, "azer");
        assert!(hits[0].date.is_some());
        assert_eq!(hits[1].description, "No description");
        assert_eq!(hits[1].author, "jonschlinkert");
        assert!(hits.iter().all(|hit| !hit.installed));
    }

    #[tokio::test]
    async fn rejects_blank_query_without_a_request() {
        let (client, recorded) = serve().await;

        let err = client.search("   ").await.unwrap_err();

        assert!(matches!(err, RegistryError::EmptyQuery));
        assert!(recorded.lock().unwrap().searches.is_empty());
    }

    #[tokio::test]
    async fn flags_installed_packages() {
        let (client, _) = serve().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"devDependencies": {"pad-left": "^2.0.0"}}"#,
        )
        .unwrap();

        let hits = actions::search(&client, dir.path(), "pad").await.unwrap();

        assert!(!hits[0].installed);
        assert!(hits[1].installed);
    }

    #[tokio::test]
    async fn works_without_a_manifest() {
        let (client, _) = serve().await;
        let dir = tempfile::tempdir().unwrap();

        let hits = actions::search(&client, dir.path(), "pad").await.unwrap();

        assert_eq!(hits.len(), 2);
    }
}

mod package {
    use super::*;

    #[tokio::test]
    async fn encodes_scoped_names() {
        let (client, recorded) = serve().await;

        let metadata = client.package("@types/node").await.unwrap();

        assert_eq!(metadata.name, "@types/node");
        assert_eq!(metadata.latest_version(), Some("20.1.0"));
        assert_eq!(metadata.author(), "types-bot");
        assert_eq!(recorded.lock().unwrap().packages, vec!["@types/node"]);
    }

    #[tokio::test]
    async fn reports_error_status() {
        let (client, _) = serve().await;

        let err = client.package("missing").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, RegistryError::Status { .. }));
    }

    #[tokio::test]
    async fn reports_malformed_json() {
        let (client, _) = serve().await;

        let err = client.package("broken").await.unwrap_err();

        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[tokio::test]
    async fn reports_unreachable_registry() {
        let client = RegistryClient::new("http://127.0.0.1:1");

        let err = client.package("left-pad").await.unwrap_err();

        assert!(matches!(err, RegistryError::Http(_)));
    }
}

mod readme {
    use super::*;

    #[tokio::test]
    async fn renders_the_readme() {
        let (client, _) = serve().await;

        let html = actions::readme_html(&client, "left-pad").await.unwrap();

        assert!(html.starts_with("<div>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<code>npm i</code>"));
    }

    #[tokio::test]
    async fn falls_back_when_missing() {
        let (client, _) = serve().await;

        let html = actions::readme_html(&client, "no-readme").await.unwrap();

        assert_eq!(html, "<div><p>No README available for this package.</p></div>");
    }

    #[tokio::test]
    async fn propagates_fetch_errors() {
        let (client, _) = serve().await;

        let err = actions::readme_html(&client, "missing").await.unwrap_err();

        assert!(err.to_string().contains("missing"));
    }
}

mod details {
    use super::*;

    #[tokio::test]
    async fn uses_the_declared_version() {
        let (client, _) = serve().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"left-pad": "^1.3.0"}}"#,
        )
        .unwrap();

        let html = actions::details_page(&client, dir.path(), "left-pad").await.unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("^1.3.0"));
        assert!(html.contains("MIT"));
        assert!(html.contains("<h1>Title</h1>"));
    }

    #[tokio::test]
    async fn shows_a_notice_when_a_declared_package_cannot_be_fetched() {
        let (client, _) = serve().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"devDependencies": {"missing": "^0.1.0"}}"#,
        )
        .unwrap();

        let html = actions::details_page(&client, dir.path(), "missing").await.unwrap();

        assert!(html.contains("^0.1.0"));
        assert!(html.contains("Dev Dependency"));
        assert!(html.contains("<p>Failed to load package information.</p>"));
        assert!(html.contains("https://www.npmjs.com/package/missing"));
    }

    #[tokio::test]
    async fn propagates_fetch_errors_for_undeclared_packages() {
        let (client, _) = serve().await;
        let dir = tempfile::tempdir().unwrap();

        let err = actions::details_page(&client, dir.path(), "missing").await.unwrap_err();

        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn falls_back_to_the_latest_version() {
        let (client, _) = serve().await;
        let dir = tempfile::tempdir().unwrap();

        let html = actions::details_page(&client, dir.path(), "left-pad").await.unwrap();

        assert!(html.contains("20.1.0"));
    }
}
