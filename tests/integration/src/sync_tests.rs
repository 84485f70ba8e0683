//! End-to-end sync scenarios
//!
//! A real upstream repository, a real mirror on disk and either the
//! in-memory store or a Consul stand-in served over HTTP.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, body::Bytes, extract::{Path, State}, routing::put};
use git2consul_core::{Error, RetryPolicy, SyncConfig, SyncController};
use git2consul_git::{Advance, Ensured, GitMirror, Revision};
use git2consul_kv::{ConsulStore, MemoryStore};
use git2consul_test_utils::UpstreamRepo;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;

struct Harness {
    upstream: UpstreamRepo,
    _work: TempDir,
    config: SyncConfig,
}

impl Harness {
    fn new(files: &[(&str, &str)]) -> Self {
        let upstream = UpstreamRepo::with_files(files);
        let work = TempDir::new().unwrap();
        let config = SyncConfig {
            directory: work.path().join("mirror"),
            polling_interval: Duration::from_millis(25),
            retry: RetryPolicy {
                initial_interval: Duration::from_millis(5),
                max_interval: Duration::from_millis(20),
                max_elapsed_time: Some(Duration::from_millis(300)),
            },
            ..SyncConfig::new(upstream.url())
        };
        Self {
            upstream,
            _work: work,
            config,
        }
    }

    fn mirror(&self) -> GitMirror {
        GitMirror::new(self.config.repository.clone(), self.config.directory.clone())
    }

    fn controller(&self) -> SyncController<GitMirror, Arc<MemoryStore>> {
        SyncController::new(&self.config, self.mirror(), Arc::new(MemoryStore::new()))
    }
}

#[tokio::test]
async fn test_clone_then_fast_forward_then_stale_key() {
    let harness = Harness::new(&[("foo/bar.txt", "1"), ("README.md", "# config")]);
    let controller = harness.controller();

    let ensured = controller.start().await.unwrap();
    assert!(matches!(ensured, Ensured::Cloned(_)));

    let first = controller.run_cycle().await.unwrap();
    assert_eq!(first.keys_written, 1);
    assert_eq!(first.advance, Advance::UpToDate(Revision::from(harness.upstream.head())));
    assert_eq!(controller.store().get_string("foo/bar.txt").as_deref(), Some("1"));
    assert_eq!(controller.store().get("README.md"), None);

    harness
        .upstream
        .commit(&[("foo/bar.txt", "2"), ("baz.txt", "3")], "Second commit");
    let second = controller.run_cycle().await.unwrap();
    match second.advance {
        Advance::FastForwarded { to, commits, .. } => {
            assert_eq!(to, Revision::from(harness.upstream.head()));
            assert_eq!(commits, 1);
        }
        other => panic!("expected a fast-forward, got {other:?}"),
    }
    assert_eq!(controller.store().get_string("foo/bar.txt").as_deref(), Some("2"));
    assert_eq!(controller.store().get_string("baz.txt").as_deref(), Some("3"));

    harness.upstream.remove(&["baz.txt"], "Remove baz");
    let third = controller.run_cycle().await.unwrap();
    assert_eq!(third.keys_written, 1);
    // Deleted files are never removed from the store
    assert_eq!(controller.store().get_string("baz.txt").as_deref(), Some("3"));
}

#[tokio::test]
async fn test_restart_reuses_existing_mirror() {
    let harness = Harness::new(&[("a.txt", "1")]);

    let first = harness.controller().start().await.unwrap();
    let second = harness.controller().start().await.unwrap();

    assert!(matches!(first, Ensured::Cloned(_)));
    assert_eq!(second, Ensured::Existing(first.revision()));
}

#[tokio::test]
async fn test_unchanged_remote_writes_same_pairs_each_cycle() {
    let harness = Harness::new(&[("a.txt", "1"), ("dir/b.txt", "2")]);
    let controller = harness.controller();
    controller.start().await.unwrap();

    let first = controller.run_cycle().await.unwrap();
    let second = controller.run_cycle().await.unwrap();

    assert!(!second.advance.changed());
    assert_eq!(first.advance.after(), second.advance.after());
    let writes = controller.store().writes();
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[..2], writes[2..]);
}

#[tokio::test]
async fn test_store_failure_halts_cycle() {
    let harness = Harness::new(&[("a.txt", "1"), ("b.txt", "2"), ("c.txt", "3")]);
    let controller = harness.controller();
    controller.start().await.unwrap();
    controller.store().fail_always("b.txt", false);

    let err = controller.run_cycle().await.unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert_eq!(controller.store().keys(), vec!["a.txt"]);
}

#[tokio::test]
async fn test_run_loop_follows_remote_until_shutdown() {
    let harness = Harness::new(&[("app/config.yml", "v1")]);
    let controller = harness.controller();
    let (tx, rx) = watch::channel(false);

    let driver = async {
        let store = controller.store();
        wait_until(|| store.get_string("app/config.yml").as_deref() == Some("v1")).await;
        harness.upstream.commit(&[("app/config.yml", "v2")], "Bump config");
        wait_until(|| store.get_string("app/config.yml").as_deref() == Some("v2")).await;
        tx.send(true).unwrap();
    };

    let (outcome, ()) = tokio::time::timeout(Duration::from_secs(30), async {
        tokio::join!(controller.run(rx), driver)
    })
    .await
    .expect("sync loop did not pick up the new commit");
    outcome.unwrap();
}

#[tokio::test]
async fn test_unreachable_remote_ends_run_with_error() {
    let work = TempDir::new().unwrap();
    let missing: PathBuf = work.path().join("no-such-remote");
    let config = SyncConfig {
        directory: work.path().join("mirror"),
        polling_interval: Duration::from_millis(25),
        retry: RetryPolicy {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            max_elapsed_time: Some(Duration::from_millis(200)),
        },
        ..SyncConfig::new(missing.to_string_lossy())
    };
    let mirror = GitMirror::new(config.repository.clone(), config.directory.clone());
    let controller = SyncController::new(&config, mirror, Arc::new(MemoryStore::new()));
    let (_tx, rx) = watch::channel(false);

    let err = tokio::time::timeout(Duration::from_secs(30), controller.run(rx))
        .await
        .unwrap()
        .unwrap_err();
    assert!(
        matches!(err, Error::Git(_) | Error::RetriesExhausted { .. }),
        "unexpected error: {err}"
    );
}

type Entries = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

async fn put_key(State(entries): State<Entries>, Path(key): Path<String>, body: Bytes) -> &'static str {
    entries.lock().unwrap().insert(key, body.to_vec());
    "true"
}

#[tokio::test]
async fn test_cycle_against_consul_http_api() {
    let entries: Entries = Arc::default();
    let app = Router::new()
        .route("/v1/kv/{*key}", put(put_key))
        .with_state(Arc::clone(&entries));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let harness = Harness::new(&[("foo/bar.txt", "1"), (".hidden/x", "skip")]);
    let store = ConsulStore::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();
    let controller = SyncController::new(&harness.config, harness.mirror(), store);

    controller.start().await.unwrap();
    controller.run_cycle().await.unwrap();

    let entries = entries.lock().unwrap();
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["foo/bar.txt"]);
    assert_eq!(entries["foo/bar.txt"], b"1".to_vec());
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
