//! End-to-end decorator behavior: a batch of records flows through a wrapped
//! transformation, gets demultiplexed, and captured descriptors stay tied to
//! the inputs that produced them — including under concurrent invocation.

use letterbox_core::{
    split, CaptureConfig, ErrorCapture, Outcome, OutcomeIteratorExt, Record, SourceCoordinates,
};

fn capture() -> ErrorCapture {
    ErrorCapture::with_config(
        "parse amount",
        CaptureConfig {
            capture_backtrace: false,
            ..CaptureConfig::default()
        },
    )
}

fn order_record(key: u64, value: &str, offset: i64) -> Record<u64, String> {
    Record::new(key, value.to_string()).with_coordinates(SourceCoordinates {
        topic: Some("orders".into()),
        partition: Some((key % 4) as i32),
        offset: Some(offset),
        timestamp_ms: Some(1_700_000_000_000 + offset),
    })
}

#[test]
fn batch_flows_into_two_ordered_channels() {
    let parse = capture().wrap_values(|_: &u64, v: &String| v.parse::<i64>());

    let records = vec![
        order_record(1, "10", 0),
        order_record(2, "oops", 1),
        order_record(3, "30", 2),
        order_record(4, "40", 3),
        order_record(5, "bad", 4),
    ];

    let outcomes: Vec<_> = records
        .iter()
        .map(|r| parse(r).expect("no shutdown signal"))
        .collect();

    let (amounts, dead_letters) = split(outcomes);
    assert_eq!(amounts, vec![10, 30, 40]);
    assert_eq!(dead_letters.len(), 2);

    // Failure channel preserves input order and per-record context.
    assert_eq!(dead_letters[0].coordinates.offset, Some(1));
    assert_eq!(dead_letters[1].coordinates.offset, Some(4));
    assert_eq!(
        dead_letters[0].input_value.as_ref().map(|p| &p.body[..]),
        Some(&b"oops"[..])
    );
}

#[test]
fn flat_map_batch_keeps_all_or_nothing_shape() {
    let explode = capture().wrap_flat_values(|_: &u64, v: &String| {
        v.split(',')
            .map(|part| part.parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
    });

    let good = order_record(1, "1,2,3", 0);
    let bad = order_record(2, "4,x,6", 1);

    let outcomes: Vec<_> = [&good, &bad]
        .into_iter()
        .flat_map(|r| explode(r).expect("no shutdown signal"))
        .collect();

    // 3 successes from the first record, exactly 1 failure from the second —
    // the partially parsed 4 never escapes.
    let successes: Vec<_> = outcomes.iter().filter(|o| o.is_success()).collect();
    let failures: Vec<_> = outcomes.iter().filter(|o| o.is_failure()).collect();
    assert_eq!(successes.len(), 3);
    assert_eq!(failures.len(), 1);
}

#[test]
fn lazy_projections_compose_with_wrapped_calls() {
    let parse = capture().wrap_values(|_: &u64, v: &String| v.parse::<i64>());
    let records = vec![
        order_record(1, "7", 0),
        order_record(2, "x", 1),
        order_record(3, "9", 2),
    ];

    let successes: Vec<i64> = records
        .iter()
        .map(|r| parse(r).expect("no shutdown signal"))
        .successes()
        .collect();
    assert_eq!(successes, vec![7, 9]);
}

#[test]
fn concurrent_captures_never_cross_contaminate() {
    let parse = capture().wrap_values(|_: &u64, v: &String| v.parse::<i64>());
    let parse = &parse;

    std::thread::scope(|scope| {
        for task in 0u64..8 {
            scope.spawn(move || {
                for i in 0..50 {
                    let key = task * 1_000 + i;
                    let offset = key as i64;
                    let record = order_record(key, &format!("fail-{key}"), offset);

                    let letter = parse(&record)
                        .expect("no shutdown signal")
                        .into_failure()
                        .expect("always fails");

                    // Each descriptor reflects exactly its own invocation.
                    assert_eq!(
                        letter.input_key.as_ref().map(|p| p.body.clone()),
                        Some(bytes::Bytes::from(key.to_string()))
                    );
                    assert_eq!(
                        letter.input_value.as_ref().map(|p| &p.body[..]),
                        Some(format!("fail-{key}").as_bytes())
                    );
                    assert_eq!(letter.coordinates.offset, Some(offset));
                }
            });
        }
    });
}

#[test]
fn wrapped_closure_is_shareable_across_threads() {
    fn assert_sync<T: Sync>(_: &T) {}
    let parse = capture().wrap_values(|_: &u64, v: &String| v.parse::<i64>());
    assert_sync(&parse);
}
