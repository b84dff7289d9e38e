//! End-to-end handler tests through the dispatcher.
//!
//! Everything runs against `InMemoryStore`, whose commit counter shows
//! which paths reach the unit of work and whose failure switch stands in
//! for a broken database.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::field::{Field, Visit};
use tracing::{span, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

use db::InMemoryStore;
use domain::{Entity, WarehouseSizeId, WorkerId, WorkerRole};

use crate::{
    warehouse_dispatcher, AppError, CreateWarehouseSize, CreateWorker, Deleted,
    DeleteWarehouseSize, DeleteWorker, Dispatcher, ErrorKind, GetWarehouseSize, GetWorker,
    ListWarehouseSizes, ListWorkers, Request, UpdateWarehouseSize, UpdateWorker,
};

fn setup() -> (InMemoryStore, Dispatcher) {
    let store = InMemoryStore::new();
    let dispatcher = warehouse_dispatcher(Arc::new(store.clone())).expect("complete registry");
    (store, dispatcher)
}

fn create_worker(first: &str, last: &str, role: WorkerRole) -> CreateWorker {
    CreateWorker {
        first_name: first.into(),
        last_name: last.into(),
        role,
    }
}

fn create_size(name: &str, sectors: u32, racks: u32) -> CreateWarehouseSize {
    CreateWarehouseSize {
        name: name.into(),
        sector_number: sectors,
        rack_quantity: racks,
    }
}

// ============================================================
// Scenarios
// ============================================================

#[tokio::test]
async fn worker_lifecycle_scenario() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let created = dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .expect("create succeeds");
    assert_eq!(created.role().to_string(), "Regular");
    let w1 = created.id();

    let fetched = dispatcher.send(GetWorker { id: w1 }, &cancel).await.unwrap();
    assert_eq!(fetched, created);

    let updated = dispatcher
        .send(
            UpdateWorker {
                id: w1,
                first_name: "Anne".into(),
                last_name: "Lee".into(),
                role: WorkerRole::Admin,
            },
            &cancel,
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.role().to_string(), "Admin");
    assert_eq!(updated.id(), w1);

    let deleted = dispatcher.send(DeleteWorker { id: w1 }, &cancel).await.unwrap();
    assert_eq!(deleted, Deleted);

    let err = dispatcher.send(GetWorker { id: w1 }, &cancel).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "Worker" }));
}

#[tokio::test]
async fn warehouse_size_lifecycle_scenario() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let small = dispatcher
        .send(create_size("Small", 2, 10), &cancel)
        .await
        .expect("create succeeds");

    let all = dispatcher.send(ListWarehouseSizes, &cancel).await.unwrap();
    assert_eq!(all, vec![small.clone()]);

    dispatcher
        .send(DeleteWarehouseSize { id: small.id() }, &cancel)
        .await
        .unwrap();

    let all = dispatcher.send(ListWarehouseSizes, &cancel).await.unwrap();
    assert!(all.is_empty());
}

// ============================================================
// Properties
// ============================================================

#[tokio::test]
async fn create_assigns_distinct_ids() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let mut ids = HashSet::new();
    for _ in 0..20 {
        let worker = dispatcher
            .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
            .await
            .unwrap();
        assert!(ids.insert(worker.id()), "id reused: {}", worker.id());
    }
}

#[tokio::test]
async fn missing_ids_are_not_found_and_never_commit() {
    let (store, dispatcher) = setup();
    let cancel = CancellationToken::new();
    let ghost = WorkerId::new();

    let get = dispatcher.send(GetWorker { id: ghost }, &cancel).await;
    let update = dispatcher
        .send(
            UpdateWorker {
                id: ghost,
                first_name: "A".into(),
                last_name: "B".into(),
                role: WorkerRole::Admin,
            },
            &cancel,
        )
        .await;
    let delete = dispatcher.send(DeleteWorker { id: ghost }, &cancel).await;

    for result in [get.map(|_| ()), update.map(|_| ()), delete.map(|_| ())] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    }

    let ghost = WarehouseSizeId::new();
    let err = dispatcher
        .send(
            UpdateWarehouseSize {
                id: ghost,
                name: "Large".into(),
                sector_number: 8,
                rack_quantity: 40,
            },
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "WarehouseSize" }));
    assert_eq!(err.to_string(), "WarehouseSize not found");

    assert_eq!(store.commit_count(), 0);
}

#[tokio::test]
async fn update_is_a_full_replace() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let size = dispatcher.send(create_size("Small", 2, 10), &cancel).await.unwrap();
    dispatcher
        .send(
            UpdateWarehouseSize {
                id: size.id(),
                name: "Small".into(),
                sector_number: 3,
                rack_quantity: 10,
            },
            &cancel,
        )
        .await
        .unwrap();

    let fetched = dispatcher
        .send(GetWarehouseSize { id: size.id() }, &cancel)
        .await
        .unwrap();
    assert_eq!(fetched.name(), "Small");
    assert_eq!(fetched.sector_number(), 3);
    assert_eq!(fetched.rack_quantity(), 10);
}

#[tokio::test]
async fn delete_twice_is_not_found_the_second_time() {
    let (store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let worker = dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap();

    assert!(dispatcher.send(DeleteWorker { id: worker.id() }, &cancel).await.is_ok());
    let commits = store.commit_count();

    let err = dispatcher
        .send(DeleteWorker { id: worker.id() }, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.commit_count(), commits);
}

#[tokio::test]
async fn list_reflects_exactly_the_live_entities() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    assert!(dispatcher.send(ListWorkers, &cancel).await.unwrap().is_empty());

    let ann = dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap();
    let bob = dispatcher
        .send(create_worker("Bob", "Ray", WorkerRole::Admin), &cancel)
        .await
        .unwrap();
    let cid = dispatcher
        .send(create_worker("Cid", "Moe", WorkerRole::Regular), &cancel)
        .await
        .unwrap();
    dispatcher.send(DeleteWorker { id: bob.id() }, &cancel).await.unwrap();

    let listed: HashSet<WorkerId> = dispatcher
        .send(ListWorkers, &cancel)
        .await
        .unwrap()
        .iter()
        .map(|w| w.id())
        .collect();
    assert_eq!(listed, HashSet::from([ann.id(), cid.id()]));
}

#[tokio::test]
async fn workers_and_warehouse_sizes_are_independent() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap();
    assert!(dispatcher.send(ListWarehouseSizes, &cancel).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_names_are_allowed() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    dispatcher.send(create_size("Small", 2, 10), &cancel).await.unwrap();
    dispatcher.send(create_size("Small", 4, 20), &cancel).await.unwrap();
    assert_eq!(dispatcher.send(ListWarehouseSizes, &cancel).await.unwrap().len(), 2);
}

// ============================================================
// Failure paths
// ============================================================

#[tokio::test]
async fn invalid_fields_fail_before_staging() {
    let (store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let err = dispatcher
        .send(create_worker("", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = dispatcher.send(create_size("Small", 0, 10), &cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(store.commit_count(), 0);
}

#[tokio::test]
async fn invalid_update_leaves_the_entity_untouched() {
    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let worker = dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap();
    let err = dispatcher
        .send(
            UpdateWorker {
                id: worker.id(),
                first_name: "Anne".into(),
                last_name: "   ".into(),
                role: WorkerRole::Admin,
            },
            &cancel,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let fetched = dispatcher.send(GetWorker { id: worker.id() }, &cancel).await.unwrap();
    assert_eq!(fetched, worker);
}

#[tokio::test]
async fn commit_failure_is_an_infrastructure_error_with_no_effect() {
    let (store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    store.set_fail_commits(true);
    let err = dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Infrastructure);
    assert_eq!(store.commit_count(), 1, "no retry");

    store.set_fail_commits(false);
    assert!(dispatcher.send(ListWorkers, &cancel).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_request_does_not_mutate() {
    let (store, dispatcher) = setup();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = dispatcher
        .send(create_size("Small", 2, 10), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Infrastructure(db::DbError::Cancelled)));

    let live = CancellationToken::new();
    assert!(dispatcher.send(ListWarehouseSizes, &live).await.unwrap().is_empty());
    assert_eq!(store.commit_count(), 0);
}

// ============================================================
// Tracing
// ============================================================

/// Records the `request` field of every new span.
#[derive(Clone, Default)]
struct RequestSpans(Arc<Mutex<Vec<String>>>);

struct RequestField(Option<String>);

impl Visit for RequestField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name().trim_start_matches('_') == "request" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for RequestSpans {
    fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
        let mut field = RequestField(None);
        attrs.record(&mut field);
        if let Some(request) = field.0 {
            self.0.lock().unwrap().push(request);
        }
    }
}

#[tokio::test]
async fn every_handler_opens_a_span() {
    let spans = RequestSpans::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(spans.clone()));

    let (_store, dispatcher) = setup();
    let cancel = CancellationToken::new();

    let worker = dispatcher
        .send(create_worker("Ann", "Lee", WorkerRole::Regular), &cancel)
        .await
        .unwrap();
    dispatcher.send(GetWorker { id: worker.id() }, &cancel).await.unwrap();
    dispatcher.send(ListWorkers, &cancel).await.unwrap();
    dispatcher
        .send(
            UpdateWorker {
                id: worker.id(),
                first_name: "Anne".into(),
                last_name: "Lee".into(),
                role: WorkerRole::Admin,
            },
            &cancel,
        )
        .await
        .unwrap();
    dispatcher.send(DeleteWorker { id: worker.id() }, &cancel).await.unwrap();

    let size = dispatcher.send(create_size("Small", 2, 10), &cancel).await.unwrap();
    dispatcher.send(GetWarehouseSize { id: size.id() }, &cancel).await.unwrap();
    dispatcher.send(ListWarehouseSizes, &cancel).await.unwrap();
    dispatcher
        .send(
            UpdateWarehouseSize {
                id: size.id(),
                name: "Large".into(),
                sector_number: 8,
                rack_quantity: 40,
            },
            &cancel,
        )
        .await
        .unwrap();
    dispatcher.send(DeleteWarehouseSize { id: size.id() }, &cancel).await.unwrap();

    let recorded = spans.0.lock().unwrap().clone();
    for name in [
        CreateWorker::NAME,
        GetWorker::NAME,
        ListWorkers::NAME,
        UpdateWorker::NAME,
        DeleteWorker::NAME,
        CreateWarehouseSize::NAME,
        GetWarehouseSize::NAME,
        ListWarehouseSizes::NAME,
        UpdateWarehouseSize::NAME,
        DeleteWarehouseSize::NAME,
    ] {
        assert!(
            recorded.iter().any(|r| r.split([' ', '{']).next() == Some(name)),
            "no span for {name}: {recorded:?}"
        );
    }
}
