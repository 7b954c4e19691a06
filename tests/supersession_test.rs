mod helpers;

use helpers::{add, ids, test_engine, test_engine_on, test_store};
use strata::error::InsightError;
use strata::insight::lifecycle::chain;
use strata::insight::store::InsightStore;
use strata::insight::types::InsightType;
use strata::retrieval::RetrieveOptions;

fn every_id(result: &strata::retrieval::RetrievalResult) -> Vec<String> {
    ids(&result.surface)
        .into_iter()
        .chain(ids(&result.mid))
        .chain(ids(&result.deep))
        .collect()
}

#[test]
fn superseded_insight_excluded_from_retrieval() {
    let engine = test_engine();
    let old = add(&engine, "A can't be relied on", InsightType::Observation, 0.5, 60, &["A"]);
    let new = add(&engine, "A keeps showing up", InsightType::Observation, 0.8, 1, &["A"]);

    engine.supersede(&old, &new).unwrap();

    for query in ["trust", "everything is falling apart", "unrelated words"] {
        let found = every_id(&engine.retrieve(query).unwrap());
        assert!(!found.contains(&old), "superseded insight returned for {query:?}");
        assert!(found.contains(&new));
    }

    let with_history = engine
        .retrieve_with(
            "trust",
            RetrieveOptions {
                include_superseded: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(every_id(&with_history).contains(&old));
}

#[test]
fn supersede_sets_both_links() {
    let engine = test_engine();
    let old = add(&engine, "first take", InsightType::Strategy, 0.5, 5, &[]);
    let new = add(&engine, "second take", InsightType::Strategy, 0.6, 1, &[]);

    engine.supersede(&old, &new).unwrap();

    let old_row = engine.store().get(&old).unwrap().unwrap();
    let new_row = engine.store().get(&new).unwrap().unwrap();
    assert_eq!(old_row.superseded_by.as_deref(), Some(new.as_str()));
    assert_eq!(new_row.supersedes.as_deref(), Some(old.as_str()));
}

#[test]
fn relinking_the_same_pair_is_a_no_op() {
    let engine = test_engine();
    let old = add(&engine, "first take", InsightType::Strategy, 0.5, 5, &[]);
    let new = add(&engine, "second take", InsightType::Strategy, 0.6, 1, &[]);

    engine.supersede(&old, &new).unwrap();
    engine.supersede(&old, &new).unwrap();
}

#[test]
fn missing_ids_are_not_found_and_change_nothing() {
    let engine = test_engine();
    let real = add(&engine, "real", InsightType::Observation, 0.5, 1, &[]);

    match engine.supersede("ghost", &real) {
        Err(InsightError::NotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    match engine.supersede(&real, "ghost") {
        Err(InsightError::NotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected NotFound, got {other:?}"),
    }

    let row = engine.store().get(&real).unwrap().unwrap();
    assert!(row.superseded_by.is_none() && row.supersedes.is_none());
}

#[test]
fn cycles_are_rejected() {
    let engine = test_engine();
    let a = add(&engine, "v1", InsightType::Strategy, 0.5, 3, &[]);
    let b = add(&engine, "v2", InsightType::Strategy, 0.5, 2, &[]);
    let c = add(&engine, "v3", InsightType::Strategy, 0.5, 1, &[]);
    engine.supersede(&a, &b).unwrap();
    engine.supersede(&b, &c).unwrap();

    assert!(matches!(
        engine.supersede(&c, &a),
        Err(InsightError::Cycle { .. })
    ));
    assert!(matches!(
        engine.supersede(&c, &c),
        Err(InsightError::Cycle { .. })
    ));

    let c_row = engine.store().get(&c).unwrap().unwrap();
    assert!(c_row.superseded_by.is_none());
}

#[test]
fn branching_a_chain_is_rejected() {
    let engine = test_engine();
    let a = add(&engine, "v1", InsightType::Strategy, 0.5, 3, &[]);
    let b = add(&engine, "v2", InsightType::Strategy, 0.5, 2, &[]);
    let other = add(&engine, "v2 alternative", InsightType::Strategy, 0.5, 1, &[]);
    engine.supersede(&a, &b).unwrap();

    assert!(matches!(
        engine.supersede(&a, &other),
        Err(InsightError::Validation(_))
    ));
}

#[test]
fn chain_walks_oldest_to_newest() {
    let engine = test_engine();
    let a = add(&engine, "v1", InsightType::Strategy, 0.5, 3, &[]);
    let b = add(&engine, "v2", InsightType::Strategy, 0.5, 2, &[]);
    let c = add(&engine, "v3", InsightType::Strategy, 0.5, 1, &[]);
    engine.supersede(&a, &b).unwrap();
    engine.supersede(&b, &c).unwrap();

    let from_middle: Vec<String> = chain(engine.store(), &b)
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(from_middle, vec![a, b, c]);
}

#[test]
fn supersession_is_audit_logged() {
    let store = test_store();
    let engine = test_engine_on(store.clone());
    let old = add(&engine, "first take", InsightType::Strategy, 0.5, 5, &[]);
    let new = add(&engine, "second take", InsightType::Strategy, 0.6, 1, &[]);
    engine.supersede(&old, &new).unwrap();

    let ops: Vec<String> = store
        .history(&old)
        .unwrap()
        .into_iter()
        .map(|e| e.operation)
        .collect();
    assert_eq!(ops, vec!["create", "supersede"]);

    let link = store.history(&old).unwrap().pop().unwrap();
    assert_eq!(link.details.unwrap()["superseded_by"], new.as_str());
}
