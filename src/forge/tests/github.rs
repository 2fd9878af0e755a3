//! Tests for the GitHub REST client against a local mock server.
//!
//! Tests for:
//! - auth, accept and api version headers
//! - per-segment path encoding and GitHub Enterprise path prefixes
//! - base64 decoding and the blob fallback for large files
//! - 404s as absent values and upstream error passthrough
//! - pagination
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{
    body_json, body_partial_json, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{
    error::RepodeskError,
    forge::{
        config::UpstreamConfig,
        github::Github,
        request::{
            CreatePrRequest, CreateTreeRequest, GetFileRequest, ObjectKind,
            PutFileRequest, RepoId, TreeEntry, UpdateRefRequest,
        },
        traits::Forge,
    },
};

fn client(api_url: String) -> Github {
    let config = UpstreamConfig {
        api_url,
        ..Default::default()
    };
    Github::new(&config, &SecretString::from("ghp_secret")).unwrap()
}

fn notes() -> RepoId {
    RepoId::new("octocat", "notes")
}

fn get_file(path: &str) -> GetFileRequest {
    GetFileRequest {
        repo: notes(),
        path: path.into(),
        branch: Some("main".into()),
    }
}

fn branch(name: &str) -> Value {
    json!({ "name": name, "commit": { "sha": format!("{name}-sha") } })
}

#[tokio::test]
async fn test_get_file_sends_auth_headers_and_decodes_wrapped_base64() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/contents/README.md"))
        .and(query_param("ref", "main"))
        .and(header("authorization", "Bearer ghp_secret"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "README.md",
            "path": "README.md",
            "sha": "abc123",
            "size": 12,
            "type": "file",
            "encoding": "base64",
            "content": "aGVsbG8g\nd29ybGQh\n",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let file = forge.get_file(get_file("README.md")).await.unwrap().unwrap();

    assert_eq!(file.sha, "abc123");
    assert_eq!(file.content, b"hello world!");
}

#[tokio::test]
async fn test_get_file_missing_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/contents/missing.txt"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "Not Found" })),
        )
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let file = forge.get_file(get_file("missing.txt")).await.unwrap();

    assert!(file.is_none());
}

#[tokio::test]
async fn test_get_file_on_directory_is_bad_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/contents/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let err = forge.get_file(get_file("docs")).await.unwrap_err();

    assert!(matches!(err, RepodeskError::BadRequest(_)));
}

#[tokio::test]
async fn test_get_file_without_inline_content_reads_blob() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/contents/big.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "big.bin",
            "path": "big.bin",
            "sha": "bigsha",
            "size": 2_000_000,
            "type": "file",
            "encoding": "none",
            "content": "",
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/git/blobs/bigsha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "bigsha",
            "encoding": "base64",
            "content": "YmluYXJ5",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let file = forge.get_file(get_file("big.bin")).await.unwrap().unwrap();

    assert_eq!(file.content, b"binary");
}

#[tokio::test]
async fn test_paths_are_percent_encoded_per_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/contents/my%20docs/a%23b.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "a#b.md",
            "path": "my docs/a#b.md",
            "sha": "s1",
            "type": "file",
            "encoding": "base64",
            "content": "eA==",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let file = forge
        .get_file(get_file("my docs/a#b.md"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(file.path, "my docs/a#b.md");
}

#[tokio::test]
async fn test_put_file_create_omits_sha() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/notes/contents/new.txt"))
        .and(body_json(json!({
            "message": "Create new.txt",
            "content": "aGk=",
            "branch": "main",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": { "path": "new.txt", "sha": "blob1" },
            "commit": { "sha": "commit1" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let commit = forge
        .put_file(PutFileRequest {
            repo: notes(),
            path: "new.txt".into(),
            content: b"hi".to_vec(),
            message: "Create new.txt".into(),
            branch: Some("main".into()),
            sha: None,
        })
        .await
        .unwrap();

    assert_eq!(commit.path, "new.txt");
    assert_eq!(commit.sha.as_deref(), Some("blob1"));
    assert_eq!(commit.commit_sha, "commit1");
}

#[tokio::test]
async fn test_upstream_error_keeps_status_and_details() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/octocat/notes/contents/taken.txt"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Invalid request.",
            "errors": [{ "message": "\"sha\" wasn't supplied." }],
        })))
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let err = forge
        .put_file(PutFileRequest {
            repo: notes(),
            path: "taken.txt".into(),
            content: vec![],
            message: "Create taken.txt".into(),
            branch: None,
            sha: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(422));
    assert_eq!(
        err.to_string(),
        "Invalid request.: \"sha\" wasn't supplied."
    );
}

#[tokio::test]
async fn test_upstream_error_with_plain_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let err = forge.get_repo(notes()).await.unwrap_err();

    assert_eq!(err.upstream_status(), Some(502));
    assert_eq!(err.to_string(), "bad gateway");
}

#[tokio::test]
async fn test_list_branches_follows_pages_until_short_page() {
    let server = MockServer::start().await;

    let full_page = (0..100)
        .map(|i| branch(&format!("feature-{i}")))
        .collect::<Vec<Value>>();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/branches"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_page))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/branches"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([branch("main")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let branches = forge.list_branches(notes()).await.unwrap();

    assert_eq!(branches.len(), 101);
    assert_eq!(branches[100].name, "main");
    assert_eq!(branches[100].sha, "main-sha");
}

#[tokio::test]
async fn test_get_branch_ref_missing_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/notes/git/ref/heads/feature/x"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let found = forge
        .get_branch_ref(notes(), "feature/x".into())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_create_tree_sends_only_blob_entries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octocat/notes/git/trees"))
        .and(body_json(json!({
            "tree": [{
                "path": "src/lib.rs",
                "mode": "100644",
                "type": "blob",
                "sha": "b1",
            }],
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "sha": "newtree", "tree": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let sha = forge
        .create_tree(CreateTreeRequest {
            repo: notes(),
            entries: vec![
                TreeEntry {
                    path: "src".into(),
                    kind: ObjectKind::Tree,
                    sha: "t1".into(),
                    mode: "040000".into(),
                },
                TreeEntry {
                    path: "src/lib.rs".into(),
                    kind: ObjectKind::Blob,
                    sha: "b1".into(),
                    mode: "100644".into(),
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(sha, "newtree");
}

#[tokio::test]
async fn test_set_starred_puts_and_deletes() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/starred/octocat/notes"))
        .and(header("content-length", "0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/user/starred/octocat/notes"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(server.uri());
    forge.set_starred(notes(), true).await.unwrap();
    forge.set_starred(notes(), false).await.unwrap();
}

#[tokio::test]
async fn test_api_url_with_path_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/repos/octocat/notes/pulls"))
        .and(body_partial_json(json!({ "head": "feature", "base": "main" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 7,
            "title": "Add feature",
            "state": "open",
            "html_url": "https://github.com/octocat/notes/pull/7",
            "head": { "ref": "feature" },
            "base": { "ref": "main" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forge = client(format!("{}/api/v3/", server.uri()));
    let pr = forge
        .create_pr(CreatePrRequest {
            repo: notes(),
            title: "Add feature".into(),
            body: String::new(),
            head: "feature".into(),
            base: "main".into(),
        })
        .await
        .unwrap();

    assert_eq!(pr.number, 7);
    assert_eq!(pr.html_url, "https://github.com/octocat/notes/pull/7");
}

#[test]
fn test_invalid_api_version_is_a_config_error() {
    let config = UpstreamConfig {
        api_version: "2022-11-28\n".into(),
        ..Default::default()
    };
    let result = Github::new(&config, &SecretString::from("t"));
    assert!(matches!(result, Err(RepodeskError::InvalidConfig(_))));
}

#[test]
fn test_invalid_token_is_unauthenticated() {
    let result =
        Github::new(&UpstreamConfig::default(), &SecretString::from("a\nb"));
    assert!(matches!(result, Err(RepodeskError::Unauthenticated(_))));
}

#[test]
fn test_rejects_non_base_api_url() {
    let config = UpstreamConfig {
        api_url: "mailto:someone@example.com".into(),
        ..Default::default()
    };
    let result = Github::new(&config, &SecretString::from("t"));
    assert!(matches!(result, Err(RepodeskError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_upstream_error_without_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/notes/git/refs/heads/main"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let forge = client(server.uri());
    let err = forge
        .update_ref(UpdateRefRequest {
            repo: notes(),
            branch: "main".into(),
            sha: "c2".into(),
            force: false,
        })
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(409));
    assert_eq!(err.to_string(), "Conflict");
}
