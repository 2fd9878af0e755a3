//! Tests for directory deletion by tree rewrite.

use mockall::Sequence;

use super::common::*;
use crate::{
    error::RepodeskError,
    forge::{
        request::{GitCommit, GitRef, RepoId, Tree},
        traits::MockForge,
    },
    workflow::tree::*,
};

fn request(path: &str) -> DeleteDirectoryRequest {
    DeleteDirectoryRequest {
        repo: RepoId::new(ACCOUNT, "notes"),
        branch: "main".into(),
        path: path.into(),
        message: format!("Delete {path}"),
    }
}

fn tip_and_commit(mock_forge: &mut MockForge) {
    mock_forge.expect_get_branch_ref().returning(|_, branch| {
        Ok(Some(GitRef {
            branch,
            sha: "tip-sha".into(),
        }))
    });
    mock_forge
        .expect_get_commit()
        .withf(|_, sha| sha == "tip-sha")
        .returning(|_, sha| {
            Ok(GitCommit {
                sha,
                tree_sha: "tree-sha".into(),
            })
        });
}

#[test]
fn is_under_matches_whole_segments() {
    assert!(is_under("a", "a"));
    assert!(is_under("a/b.txt", "a"));
    assert!(is_under("a/c/d.txt", "a/"));
    assert!(!is_under("ab.txt", "a"));
    assert!(!is_under("b/a", "a"));
}

#[test]
fn prune_tree_partitions_entries() {
    let (kept, removed) = prune_tree(
        vec![
            subtree("a", "1"),
            blob("a/b.txt", "2"),
            blob("a/c/d.txt", "3"),
            blob("e.txt", "4"),
        ],
        "a",
    );

    assert_eq!(kept, vec![blob("e.txt", "4")]);
    assert_eq!(removed.len(), 3);
}

#[tokio::test]
async fn delete_directory_rewrites_tree_and_fast_forwards() {
    let mut seq = Sequence::new();
    let mut mock_forge = MockForge::new();

    mock_forge
        .expect_get_branch_ref()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, branch| {
            Ok(Some(GitRef {
                branch,
                sha: "tip-sha".into(),
            }))
        });

    mock_forge
        .expect_get_commit()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, sha| sha == "tip-sha")
        .returning(|_, sha| {
            Ok(GitCommit {
                sha,
                tree_sha: "tree-sha".into(),
            })
        });

    mock_forge
        .expect_get_tree()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, tree_ish| tree_ish == "tree-sha")
        .returning(|_, _| {
            Ok(Tree {
                sha: "tree-sha".into(),
                truncated: false,
                entries: vec![
                    subtree("a", "1"),
                    blob("a/b.txt", "2"),
                    subtree("a/c", "3"),
                    blob("a/c/d.txt", "4"),
                    blob("e.txt", "5"),
                ],
            })
        });

    mock_forge
        .expect_create_tree()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| req.entries == vec![blob("e.txt", "5")])
        .returning(|_| Ok("new-tree".into()));

    mock_forge
        .expect_create_commit()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| {
            req.tree_sha == "new-tree"
                && req.parents == vec!["tip-sha".to_string()]
                && req.message == "Delete a"
        })
        .returning(|req| {
            Ok(GitCommit {
                sha: "new-commit".into(),
                tree_sha: req.tree_sha,
            })
        });

    mock_forge
        .expect_update_ref()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| {
            req.branch == "main" && req.sha == "new-commit" && !req.force
        })
        .returning(|req| {
            Ok(GitRef {
                branch: req.branch,
                sha: req.sha,
            })
        });

    let commit = delete_directory(&mock_forge, request("a"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(commit.sha, "new-commit");
}

#[tokio::test]
async fn delete_directory_is_noop_when_nothing_matches() {
    let mut mock_forge = MockForge::new();
    tip_and_commit(&mut mock_forge);
    mock_forge.expect_get_tree().returning(|_, _| {
        Ok(Tree {
            sha: "tree-sha".into(),
            truncated: false,
            entries: vec![blob("e.txt", "5")],
        })
    });
    mock_forge.expect_create_tree().times(0);
    mock_forge.expect_create_commit().times(0);
    mock_forge.expect_update_ref().times(0);

    let result = delete_directory(&mock_forge, request("gone")).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn delete_directory_refuses_truncated_tree() {
    let mut mock_forge = MockForge::new();
    tip_and_commit(&mut mock_forge);
    mock_forge.expect_get_tree().returning(|_, _| {
        Ok(Tree {
            sha: "tree-sha".into(),
            truncated: true,
            entries: vec![blob("a/b.txt", "2"), blob("e.txt", "5")],
        })
    });
    mock_forge.expect_create_tree().times(0);
    mock_forge.expect_update_ref().times(0);

    let result = delete_directory(&mock_forge, request("a")).await;

    assert!(matches!(result, Err(RepodeskError::BadRequest(_))));
}

#[tokio::test]
async fn delete_directory_missing_branch_is_not_found() {
    let mut mock_forge = MockForge::new();
    mock_forge.expect_get_branch_ref().returning(|_, _| Ok(None));
    mock_forge.expect_get_commit().times(0);

    let result = delete_directory(&mock_forge, request("a")).await;

    assert!(matches!(result, Err(RepodeskError::NotFound(_))));
}
