//! Request helpers shared by the handler tests.
use actix_web::{App, http::StatusCode, test, web};
use serde_json::Value;

use crate::{
    forge::request::{FileCommit, FileContent, Repository},
    handlers::{self, AppState},
    test_helpers::TEST_SESSION,
};

/// POST `body` to `uri` as the test session and return status and JSON body.
pub async fn post(
    state: web::Data<AppState>,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    send(state, uri, body, Some(TEST_SESSION)).await
}

pub async fn send(
    state: web::Data<AppState>,
    uri: &str,
    body: Value,
    session: Option<&str>,
) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .app_data(handlers::json_config(1024 * 1024))
            .wrap(handlers::cors())
            .configure(handlers::configure_routes),
    )
    .await;

    let mut req = test::TestRequest::post().uri(uri).set_json(body);
    if let Some(session) = session {
        req = req.insert_header(("Authorization", format!("Bearer {session}")));
    }

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Field names listed in a validation error body.
pub fn detail_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

pub fn repository(owner: &str, name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        owner: owner.to_string(),
        default_branch: "main".to_string(),
        private: false,
        description: None,
        html_url: format!("https://github.com/{owner}/{name}"),
        updated_at: None,
    }
}

pub fn file(path: &str, sha: &str, content: &str) -> FileContent {
    FileContent {
        path: path.to_string(),
        sha: sha.to_string(),
        content: content.as_bytes().to_vec(),
    }
}

pub fn written(path: &str) -> FileCommit {
    FileCommit {
        path: path.to_string(),
        sha: Some("b".repeat(40)),
        commit_sha: "c".repeat(40),
    }
}

/// A syntactically valid blob sha.
pub fn sha(c: char) -> String {
    c.to_string().repeat(40)
}
