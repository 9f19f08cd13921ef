use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fact_domain::infrastructure::{
    AggregateRehydrator, EventStore, InMemoryEventStore, InMemorySnapshotRepository,
    SnapshotProcess,
};
use fact_domain::{
    Aggregate, AttributeMap, AttributeValue, DomainEventPublisher, Entity, Identifier,
    MutableProperty, Process, ProcessEvent, ProcessFactory, PropertyKind,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn setup_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn attributes(value: &str) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert("value".to_string(), AttributeValue::from(value));
    map
}

fn chained_property(versions: usize) -> MutableProperty {
    let owner = Entity::with_id(Identifier::new("uid", "bench-owner").unwrap());
    let kind = PropertyKind::new("bench-kind");
    let mut property =
        MutableProperty::new(owner.clone(), kind.clone(), attributes("v0")).unwrap();
    for i in 1..versions {
        let candidate =
            MutableProperty::new(owner.clone(), kind.clone(), attributes(&format!("v{i}")))
                .unwrap();
        property = property.enhance_history_of(candidate, None).unwrap();
    }
    property
}

async fn seeded_store(
    events: usize,
) -> (
    Arc<InMemoryEventStore<ProcessEvent>>,
    Arc<InMemorySnapshotRepository>,
    Process,
) {
    let store = Arc::new(InMemoryEventStore::new(Arc::new(
        DomainEventPublisher::new(),
    )));
    let snapshots = Arc::new(InMemorySnapshotRepository::new());
    let parent = Entity::with_id(Identifier::new("uid", "bench-company").unwrap());
    let mut process = Process::create(
        &parent,
        Identifier::new("uid", "bench-process").unwrap(),
        "bench process",
    )
    .unwrap();
    for i in 1..events {
        process.rename(&format!("bench process {i}")).unwrap();
    }
    for event in process.take_change_events() {
        store.append(event).await.unwrap();
    }
    (store, snapshots, process)
}

fn benchmark_history_enhancement(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_enhancement");

    for versions in [10usize, 100, 1_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(versions),
            versions,
            |b, &versions| {
                b.iter(|| black_box(chained_property(versions)));
            },
        );
    }

    group.finish();
}

fn benchmark_changes_history_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("changes_history_walk");

    for versions in [10usize, 100, 1_000].iter() {
        let property = chained_property(*versions);

        group.bench_with_input(BenchmarkId::from_parameter(versions), versions, |b, _| {
            b.iter(|| black_box(property.changes_history().len()));
        });
    }

    group.finish();
}

fn benchmark_rehydration_from_origin(c: &mut Criterion) {
    let rt = setup_runtime();
    let mut group = c.benchmark_group("rehydration_from_origin");

    for count in [10usize, 100, 1_000].iter() {
        let (store, snapshots, process) = rt.block_on(seeded_store(*count));
        let id = process.identified().unwrap();
        let rehydrator = AggregateRehydrator::new(store, snapshots, ProcessFactory);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| rt.block_on(async { black_box(rehydrator.load(&id).await.unwrap()) }));
        });
    }

    group.finish();
}

fn benchmark_rehydration_from_snapshot(c: &mut Criterion) {
    let rt = setup_runtime();
    let mut group = c.benchmark_group("rehydration_from_snapshot");

    for count in [100usize, 1_000].iter() {
        let (store, snapshots, id) = rt.block_on(async {
            let (store, snapshots, mut process) = seeded_store(*count).await;
            let id = process.identified().unwrap();
            SnapshotProcess::new(store.clone(), snapshots.clone(), ProcessFactory)
                .generate_snapshot(&id)
                .await
                .unwrap();
            for i in 0..10 {
                process.rename(&format!("after capture {i}")).unwrap();
            }
            for event in process.take_change_events() {
                store.append(event).await.unwrap();
            }
            (store, snapshots, id)
        });
        let rehydrator = AggregateRehydrator::new(store, snapshots, ProcessFactory);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| rt.block_on(async { black_box(rehydrator.load(&id).await.unwrap()) }));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_history_enhancement,
    benchmark_changes_history_walk,
    benchmark_rehydration_from_origin,
    benchmark_rehydration_from_snapshot
);

criterion_main!(benches);
