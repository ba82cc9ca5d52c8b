use std::sync::{Arc, Mutex};

use rust_order_queries::catalog::{CatalogQuery, QueryOutput, SumMethod};
use rust_order_queries::execution::{
    CompositeObserver, QueryEngine, QueryEvent, QueryObserver, StdErrQueryObserver,
};
use rust_order_queries::ingestion::ingest_json_from_path;
use rust_order_queries::processing::StageKind;
use rust_order_queries::repository::Repository;

#[derive(Default)]
struct RecordingObserver {
    finished: Mutex<Vec<(&'static str, usize)>>,
    stages: Mutex<Vec<(&'static str, StageKind, usize)>>,
}

impl QueryObserver for RecordingObserver {
    fn on_event(&self, event: &QueryEvent) {
        match event {
            QueryEvent::RunFinished {
                query, output_len, ..
            } => self.finished.lock().unwrap().push((*query, *output_len)),
            QueryEvent::StageFinished {
                query,
                stage,
                output_len,
            } => self.stages.lock().unwrap().push((*query, *stage, *output_len)),
            _ => {}
        }
    }
}

fn engine_with(observer: Arc<dyn QueryObserver>) -> QueryEngine<impl Repository> {
    let repo = ingest_json_from_path("tests/fixtures/store.json").unwrap();
    QueryEngine::new(repo).with_observer(observer)
}

#[test]
fn exercises_run_end_to_end_on_fixture() {
    let obs = Arc::new(RecordingObserver::default());
    let engine = engine_with(obs.clone());

    let outputs = engine.run_all(&CatalogQuery::exercises()).unwrap();
    let lens: Vec<usize> = outputs.iter().map(QueryOutput::len).collect();
    // books>100 x3, baby orders, toys, tier 2, cheapest books, recent, 03-15, totals x2
    assert_eq!(lens, vec![2, 3, 3, 3, 4, 4, 3, 3, 4, 1, 1]);

    let totals: Vec<f64> = outputs.iter().filter_map(QueryOutput::total).collect();
    assert_eq!(totals, vec![465.0, 465.0]);

    let finished = obs.finished.lock().unwrap();
    assert_eq!(finished.len(), 11);
    assert_eq!(finished[0], ("products-in-category-above-price", 2));
    assert_eq!(finished[10], ("total-price-in-range-accumulator", 1));
}

#[test]
fn stage_events_describe_the_flatten_before_the_sum() {
    let obs = Arc::new(RecordingObserver::default());
    let engine = engine_with(obs.clone());

    engine
        .run(&CatalogQuery::TotalPriceInRange {
            start: chrono::NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            method: SumMethod::Builtin,
        })
        .unwrap();

    let stages = obs.stages.lock().unwrap();
    assert_eq!(
        *stages,
        vec![
            ("total-price-in-range", StageKind::Source, 10),
            ("total-price-in-range", StageKind::Filter, 3),
            ("total-price-in-range", StageKind::FlatMap, 6),
        ]
    );
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn QueryObserver>> = vec![
        a.clone() as Arc<dyn QueryObserver>,
        b.clone() as Arc<dyn QueryObserver>,
        Arc::new(StdErrQueryObserver) as Arc<dyn QueryObserver>,
    ];
    let composite = CompositeObserver::new(observers);
    let engine = engine_with(Arc::new(composite));

    engine
        .run(&CatalogQuery::MostRecentOrders { limit: 3 })
        .unwrap();

    assert_eq!(a.finished.lock().unwrap().len(), 1);
    assert_eq!(b.finished.lock().unwrap().len(), 1);
}

#[test]
fn ordered_on_reports_inspect_stage_over_the_repository_snapshot() {
    let obs = Arc::new(RecordingObserver::default());
    let engine = engine_with(obs.clone());
    let date = chrono::NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
    let on_date = engine
        .repository()
        .orders()
        .iter()
        .filter(|o| o.order_date == date)
        .count();

    engine.run(&CatalogQuery::ProductsOrderedOn { date }).unwrap();

    let stages = obs.stages.lock().unwrap();
    assert_eq!(
        *stages,
        vec![
            ("products-ordered-on", StageKind::Source, 10),
            ("products-ordered-on", StageKind::Filter, on_date),
            ("products-ordered-on", StageKind::Inspect, on_date),
            ("products-ordered-on", StageKind::FlatMap, 4),
        ]
    );
}

#[test]
fn metrics_snapshot_displays_counts() {
    let engine = engine_with(Arc::new(RecordingObserver::default()));
    engine
        .run(&CatalogQuery::ProductsOrderedOn {
            date: chrono::NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
        })
        .unwrap();

    let snap = engine.metrics().snapshot();
    assert_eq!(snap.rows_emitted, 4);
    assert!(snap.to_string().starts_with("runs=1/1 failed=0 rows_emitted=4"));
}
