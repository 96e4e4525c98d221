//! The client-side state layer driven end-to-end against a live
//! server: session lifecycle, cache reconciliation, board drags.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::TestServer;
use taskdeck::client::{
    ApiClient, AuthSession, Board, ClientError, DragError, DragMove, DragOutcome,
    MemoryTokenStore, Notice, RecordingNotifier, TaskCache, TokenStore,
};
use taskdeck::model::task::{NewTask, TaskListQuery, TaskPatch, TaskStatus};

struct Harness {
    api: ApiClient,
    tokens: Arc<MemoryTokenStore>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new(server: &TestServer) -> Self {
        Self {
            api: ApiClient::new(&server.url),
            tokens: Arc::new(MemoryTokenStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn session(&self) -> AuthSession {
        AuthSession::new(self.api.clone(), self.tokens.clone(), self.notifier.clone())
    }

    fn cache(&self) -> TaskCache {
        TaskCache::new(self.api.clone(), self.tokens.clone())
    }
}

/// Let an aborted server task actually release its listener.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn signup_authenticates_and_logout_clears_everything() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    let mut session = h.session();

    assert!(session.signup("Ada", "ada@example.com", "correct horse battery").await);
    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().name, "Ada");
    assert!(h.tokens.load().is_some());
    assert_eq!(
        h.notifier.last(),
        Some((Notice::Success, "Signup successful!".to_string()))
    );

    session.logout();
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(h.tokens.load().is_none());
}

#[tokio::test]
async fn connect_restores_a_persisted_session() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);

    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    // a fresh session over the same token store picks the identity up
    let mut restored = h.session();
    restored.connect().await;

    assert!(restored.is_authenticated());
    assert!(!restored.is_loading());
    assert_eq!(restored.user().unwrap().email, "ada@example.com");
}

#[tokio::test]
async fn connect_fails_closed_on_a_bad_token() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);

    h.tokens.save("stale.or.garbage");

    let mut session = h.session();
    session.connect().await;

    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    // the rejected token is gone, not retried forever
    assert!(h.tokens.load().is_none());
}

#[tokio::test]
async fn failed_login_notifies_without_authenticating() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);

    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;
    h.tokens.clear();

    let mut session = h.session();
    let authenticated = session.login("ada@example.com", "wrong password").await;

    assert!(!authenticated);
    assert!(!session.is_authenticated());
    assert!(h.tokens.load().is_none());
    assert_eq!(
        h.notifier.last(),
        Some((
            Notice::Error,
            "Failed to login. Please check your credentials.".to_string()
        ))
    );
}

#[tokio::test]
async fn cache_reconciles_every_mutation_with_the_server() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    let mut cache = h.cache();

    cache.fetch_tasks().await;
    assert!(cache.tasks().is_empty());
    assert!(cache.error().is_none());
    assert!(!cache.is_loading());

    cache.add_task(NewTask::new("write tests")).await;
    cache.add_task(NewTask::new("ship it")).await;
    assert_eq!(cache.tasks().len(), 2);
    // appended at the tail, in creation order
    assert_eq!(cache.tasks()[1].title, "ship it");

    let id = cache.tasks()[0].id;
    let updated = cache
        .update_task(id, TaskPatch::with_status(TaskStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(cache.task(id).unwrap().status, TaskStatus::InProgress);

    cache.delete_task(id).await;
    assert!(cache.task(id).is_none());
    assert_eq!(cache.tasks().len(), 1);

    // deleting the same id again fails cleanly: error slot set, list kept
    cache.delete_task(id).await;
    assert_eq!(cache.error(), Some("Failed to delete task"));
    assert_eq!(cache.tasks().len(), 1);

    // a successful fetch clears the error slot
    cache.fetch_tasks().await;
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn cache_fetch_honors_filters_and_sorting() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    let mut cache = h.cache();
    for (title, due) in [
        ("january", "2024-01-01"),
        ("march", "2024-03-01"),
        ("february", "2024-02-01"),
    ] {
        let task = NewTask {
            due_date: Some(due.parse().unwrap()),
            ..NewTask::new(title)
        };
        cache.add_task(task).await;
    }

    cache
        .fetch_tasks_with(&TaskListQuery::default().sort_by("dueDate:desc"))
        .await;
    let fetched: Vec<&str> = cache.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(fetched, ["march", "february", "january"]);

    cache
        .fetch_tasks_with(
            &TaskListQuery::default().due_on_or_before("2024-02-01".parse().unwrap()),
        )
        .await;
    let mut fetched: Vec<&str> = cache.tasks().iter().map(|t| t.title.as_str()).collect();
    fetched.sort_unstable();
    assert_eq!(fetched, ["february", "january"]);
}

#[tokio::test]
async fn failed_add_leaves_the_list_unchanged() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    let mut cache = h.cache();
    cache.add_task(NewTask::new("already here")).await;
    assert_eq!(cache.tasks().len(), 1);
    assert!(cache.error().is_none());

    drop(server);
    settle().await;

    cache.add_task(NewTask::new("never lands")).await;

    assert_eq!(cache.error(), Some("Failed to add task"));
    assert_eq!(cache.tasks().len(), 1);
    assert_eq!(cache.tasks()[0].title, "already here");
}

#[tokio::test]
async fn unauthenticated_cache_requests_are_rejected() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    // no signup: the token store is empty, requests carry no header

    let mut cache = h.cache();
    cache.add_task(NewTask::new("nobody's task")).await;

    assert_eq!(cache.error(), Some("Failed to add task"));
    assert!(cache.tasks().is_empty());
}

#[tokio::test]
async fn stalled_request_times_out_as_retryable() {
    // accepts connections and then sits on them without answering
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hold = tokio::spawn(async move {
        let mut parked = Vec::new();
        loop {
            let (socket, _) = listener.accept().await.unwrap();
            parked.push(socket);
        }
    });

    let api = ApiClient::with_timeout(format!("http://{addr}"), Duration::from_millis(200));
    let err = api
        .get::<serde_json::Value>("/api/tasks", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout));
    assert!(err.is_retryable());
    assert_eq!(err.status(), None);

    hold.abort();
}

#[tokio::test]
async fn server_rejection_is_definitive_not_retryable() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);

    // no token, so the server turns the request away with a status
    let err = h
        .api
        .get::<serde_json::Value>("/api/tasks", None)
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn cross_column_drag_persists_the_status_change() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    let mut cache = h.cache();
    cache.add_task(NewTask::new("draggable")).await;
    cache
        .add_task(NewTask {
            status: TaskStatus::InProgress,
            ..NewTask::new("busy")
        })
        .await;
    cache.fetch_tasks_with(&TaskListQuery::default().sort_by("title")).await;

    let mut board = Board::from_tasks(cache.tasks());
    assert_eq!(board.todo.len(), 1);
    let dragged = board.todo[0].id;

    let outcome = board
        .drag(
            &mut cache,
            DragMove {
                from: TaskStatus::ToDo,
                from_index: 0,
                to: TaskStatus::Completed,
                to_index: 0,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DragOutcome::Moved {
            task: dragged,
            status: TaskStatus::Completed,
        }
    );

    // the card sits in exactly one bucket
    assert!(board.todo.iter().all(|t| t.id != dragged));
    assert!(board.in_progress.iter().all(|t| t.id != dragged));
    assert_eq!(board.completed.len(), 1);
    assert_eq!(board.completed[0].id, dragged);

    // the cache saw the server's merged record
    assert_eq!(cache.task(dragged).unwrap().status, TaskStatus::Completed);

    // and the server agrees after a clean refetch
    cache
        .fetch_tasks_with(&TaskListQuery::default().status(TaskStatus::Completed))
        .await;
    let ids: Vec<_> = cache.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, [dragged]);
}

#[tokio::test]
async fn same_column_drag_is_never_persisted() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    let mut cache = h.cache();
    cache.add_task(NewTask::new("alpha")).await;
    cache.add_task(NewTask::new("beta")).await;
    cache.fetch_tasks_with(&TaskListQuery::default().sort_by("title")).await;

    let mut board = Board::from_tasks(cache.tasks());
    let outcome = board
        .drag(
            &mut cache,
            DragMove {
                from: TaskStatus::ToDo,
                from_index: 0,
                to: TaskStatus::ToDo,
                to_index: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome, DragOutcome::Reordered);
    let local: Vec<&str> = board.todo.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(local, ["beta", "alpha"]);

    // the server still returns its own order; the reorder was visual
    cache.fetch_tasks_with(&TaskListQuery::default().sort_by("title")).await;
    let remote: Vec<&str> = cache.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(remote, ["alpha", "beta"]);
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn failed_drag_reverts_the_board() {
    let server = TestServer::spawn().await;
    let h = Harness::new(&server);
    h.session()
        .signup("Ada", "ada@example.com", "correct horse battery")
        .await;

    let mut cache = h.cache();
    cache.add_task(NewTask::new("stuck")).await;
    cache.fetch_tasks().await;

    let mut board = Board::from_tasks(cache.tasks());
    let before = board.clone();

    drop(server);
    settle().await;

    let result = board
        .drag(
            &mut cache,
            DragMove {
                from: TaskStatus::ToDo,
                from_index: 0,
                to: TaskStatus::Completed,
                to_index: 0,
            },
        )
        .await;

    assert!(matches!(result, Err(DragError::Update(_))));
    // optimistic move rolled back, failure recorded
    assert_eq!(board, before);
    assert_eq!(cache.error(), Some("Failed to update task"));
}
