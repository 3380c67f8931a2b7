//! Laziness and caching guarantees, observed through read counters.
//!
//! Answers are covered by the YAML fixtures; these tests pin down how much of
//! the input the engine touches to get them.

use rematch::{Mismatch, Results};
use rematch_test::prelude::*;

fn letters(items: &[&'static str]) -> Vec<Value> {
    items.iter().copied().map(Value::from).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sequences
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn exact_sequence_reads_one_past_its_patterns() {
    let (input, reads) = counted_sequence((1..).map(Value::from));
    let pattern = build_matcher([1, 2]);

    let result = pattern.apply(&input).unwrap();
    assert_eq!(
        result.as_unmatched().and_then(|u| u.mismatch.clone()),
        Some(Mismatch::Trailing { consumed: 2 })
    );
    assert_eq!(reads.count(), 3);
}

#[test]
fn failed_element_stops_reading() {
    let (input, reads) = counted_sequence((1..).map(Value::from));
    let pattern = build_matcher([1, 5, 3]);

    assert!(!pattern.matches(&input).unwrap());
    assert_eq!(reads.count(), 2);
}

#[test]
fn alternative_sequences_share_one_pass() {
    let (input, reads) = counted_sequence(vec![Value::from(1), Value::from(2), Value::from(3)]);
    let pattern = one_of([
        Matchable::from([1, 2, 9]),
        Matchable::from([1, 9]),
        Matchable::from([1, 2, 3]),
    ]);

    let result = pattern.apply(&input).unwrap();
    assert_eq!(result.value(), Some(&Value::from_iter([1, 2, 3])));
    assert_eq!(reads.count(), 3);
}

#[test]
fn generator_probed_by_three_patterns() {
    let (input, reads) = counted_sequence((1..).map(Value::from));
    let pattern = one_of([
        when([match_number(None)]).then(|_| Value::from("one")),
        when([match_number(None), match_number(None)]).then(|_| Value::from("two")),
        otherwise().then(|_| Value::from("many")),
    ]);

    assert_eq!(pattern.evaluate(&input).unwrap(), Some(Value::from("many")));
    assert!(reads.count() <= 3);
}

#[test]
fn alternative_pairs_inside_an_array() {
    let pairs = build_matcher(Matchable::seq([one_of([
        group(["alice", "bob"]),
        group(["fred", "sally"]),
    ])]));

    assert!(pairs.matches(&Value::from_iter(["alice", "bob"])).unwrap());
    assert!(pairs.matches(&Value::from_iter(["fred", "sally"])).unwrap());
    assert!(!pairs.matches(&Value::from_iter(["alice", "sally"])).unwrap());
    assert!(!pairs.matches(&Value::from_iter(["fred", "sally", "bob"])).unwrap());
}

#[test]
fn single_read_alternatives_in_a_sequence() {
    let (input, reads) = counted_sequence(vec![Value::from(2), Value::from(3)]);
    let pattern = build_matcher(Matchable::seq([one_of([1, 2]), rest()]));

    let result = pattern.apply(&input).unwrap();
    let m = result.as_matched().unwrap();
    assert_eq!(m.rest, Some(Value::from_iter([3])));
    assert_eq!(reads.count(), 2);
}

#[test]
fn grouped_alternatives_backtrack_without_rereading() {
    let (input, reads) = counted_sequence(letters(&["a", "c", "d"]));
    let pattern = build_matcher(Matchable::seq([
        one_of([group(["a", "b"]), group(["a", "c"])]),
        rest(),
    ]));

    let result = pattern.apply(&input).unwrap();
    let m = result.as_matched().unwrap();
    assert_eq!(m.result_at(0).and_then(MatchResult::value), Some(&Value::from_iter(["a", "c"])));
    assert_eq!(m.rest, Some(Value::from_iter(["d"])));
    assert_eq!(reads.count(), 3);
}

#[test]
fn repeat_rolls_back_a_partial_iteration() {
    let (input, reads) = counted_sequence(letters(&["k", "v", "k", "v", "k", "end"]));
    let pattern = build_matcher(Matchable::seq([
        some(group(["k", "v"])).into(),
        Matchable::from("k"),
        Matchable::from("end"),
    ]));

    let result = pattern.apply(&input).unwrap();
    let m = result.as_matched().unwrap();
    let Some(Results::List(items)) = &m.results else {
        panic!("expected positional results, got {:?}", m.results);
    };
    assert_eq!(
        items[0].value(),
        Some(&Value::from_iter([
            Value::from_iter(["k", "v"]),
            Value::from_iter(["k", "v"]),
        ]))
    );
    assert_eq!(reads.count(), 6);
}

#[test]
fn repeat_without_progress_is_fatal_on_lazy_input() {
    let (input, _) = counted_sequence(vec![Value::from(1)]);
    let pattern = build_matcher(Matchable::seq([some(maybe(1))]));

    let err = pattern.apply(&input).unwrap_err();
    assert!(matches!(err, MatcherError::NoProgress { .. }));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Accessor-backed records
// ═══════════════════════════════════════════════════════════════════════════════

fn shapes() -> Matcher {
    one_of([
        Matchable::record([("kind", "circle".into()), ("r", match_number(None).into())]),
        Matchable::record([("kind", "square".into()), ("side", match_number(None).into())]),
        Matchable::record([
            ("kind", "rect".into()),
            ("w", match_number(None).into()),
            ("h", match_number(None).into()),
        ]),
    ])
}

#[test]
fn alternatives_read_each_property_once() {
    let (input, reads) = CountingRecord::new([
        ("kind", Value::from("rect")),
        ("w", Value::from(2)),
        ("h", Value::from(3)),
    ]);

    assert!(shapes().matches(&input).unwrap());
    // kind, r, side, w, h: every distinct property once, hit or miss
    assert_eq!(reads.count(), 5);
}

#[test]
fn alternatives_see_consistent_data() {
    let (input, reads) = TickingRecord::new(["n"]);
    let pattern = one_of([
        Matchable::record([("n", 2.into())]),
        Matchable::record([("n", 1.into())]),
    ]);

    assert!(pattern.matches(&input).unwrap());
    assert_eq!(reads.count(), 1);
}

#[test]
fn conjunction_sees_consistent_data() {
    let (input, reads) = TickingRecord::new(["n"]);
    let pattern = all_of([
        Matchable::record([("n", 1.into())]),
        Matchable::record([("n", 1.into())]),
    ]);

    assert!(pattern.matches(&input).unwrap());
    assert_eq!(reads.count(), 1);
}

#[test]
fn negation_binds_the_cached_view() {
    let (input, reads) = TickingRecord::new(["n"]);
    let pattern = not(Matchable::record([("n", 2.into())]));

    let bound = pattern.evaluate(&input).unwrap().unwrap();
    assert_eq!(bound.get("n"), Some(Value::from(1)));
    assert_eq!(reads.count(), 1);
}

#[test]
fn records_pulled_from_a_sequence_are_cached_too() {
    let (record, record_reads) = CountingRecord::new([("k", Value::from(2))]);
    let (input, pulls) = counted_sequence(vec![record]);
    let pattern = one_of([
        Matchable::seq([Matchable::record([("k", 1.into())])]),
        Matchable::seq([Matchable::record([("k", 2.into())])]),
    ]);

    assert!(pattern.matches(&input).unwrap());
    assert_eq!(pulls.count(), 1);
    assert_eq!(record_reads.count(), 1);
}

#[test]
fn plain_records_are_not_wrapped() {
    let input = Value::record([("kind", Value::from("square")), ("side", Value::from(1))]);

    let result = shapes().apply(&input).unwrap();
    assert_eq!(result.value(), Some(&input));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Routing with guards and mappers
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn guards_fall_through_to_the_next_case() {
    let route = one_of([
        when(Matchable::record([("age", match_number(None).into())]))
            .guard(|m| m.value.get("age").and_then(|v| v.as_number()) >= Some(18.0))
            .then(|_| Value::from("adult")),
        when(Matchable::record([("age", match_number(None).into())]))
            .then(|_| Value::from("minor")),
        otherwise().then(|_| Value::from("unknown")),
    ]);

    let person = |age: i32| Value::record([("age", Value::from(age))]);
    assert_eq!(route.evaluate(&person(30)).unwrap(), Some(Value::from("adult")));
    assert_eq!(route.evaluate(&person(12)).unwrap(), Some(Value::from("minor")));
    assert_eq!(
        route.evaluate(&Value::from("x")).unwrap(),
        Some(Value::from("unknown"))
    );
}

#[test]
fn mapper_sees_rest_capture() {
    let (input, _) = counted_sequence(letters(&["cmd", "a", "b"]));
    let pattern = when(Matchable::seq([Matchable::from("cmd"), rest().into()]))
        .then(|m| m.rest.clone().unwrap_or_default());

    assert_eq!(
        pattern.evaluate(&input).unwrap(),
        Some(Value::from_iter(["a", "b"]))
    );
}
