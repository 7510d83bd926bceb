//! Wire-level behavior of the message codec: round-trips, framing
//! rejection, unknown-field tolerance, and encode-side degradation.

use proptest::prelude::*;

use letterbox_core::{Cause, DeadLetter, EncodeLimits, Payload, SourceCoordinates};
use letterbox_proto::{
    DecodeError, ProtoDeadLetterCodec, CURRENT_VERSION, FORMAT_MESSAGE, MAGIC,
};

fn full_letter() -> DeadLetter {
    DeadLetter {
        description: "join customer".into(),
        cause: vec![
            Cause {
                type_name: Some("store::LookupError".into()),
                message: "customer 42 not found".into(),
            },
            Cause {
                type_name: None,
                message: "join failed".into(),
            },
        ],
        causes_truncated: false,
        stack_trace: Some("0: lookup\n1: join".into()),
        stack_trace_truncated: false,
        input_key: Some(Payload::bytes(vec![0x00, 0x2A]).with_type_tag("u16")),
        input_value: Some(Payload::text(r#"{"customer":42}"#)),
        coordinates: SourceCoordinates {
            topic: Some("purchases".into()),
            partition: Some(7),
            offset: Some(1_234_567),
            timestamp_ms: Some(1_700_000_111_222),
        },
    }
}

fn minimal_letter() -> DeadLetter {
    DeadLetter {
        description: "validate".into(),
        cause: vec![Cause {
            type_name: None,
            message: "empty body".into(),
        }],
        causes_truncated: false,
        stack_trace: None,
        stack_trace_truncated: false,
        input_key: None,
        input_value: None,
        coordinates: SourceCoordinates::default(),
    }
}

#[test]
fn full_descriptor_roundtrips() {
    let codec = ProtoDeadLetterCodec::new();
    let letter = full_letter();
    assert_eq!(codec.decode(&codec.encode(&letter)).expect("decode"), letter);
}

#[test]
fn minimal_descriptor_roundtrips() {
    let codec = ProtoDeadLetterCodec::new();
    let letter = minimal_letter();
    assert_eq!(codec.decode(&codec.encode(&letter)).expect("decode"), letter);
}

#[test]
fn frame_names_current_version() {
    let bytes = ProtoDeadLetterCodec::new().encode(&minimal_letter());
    assert_eq!(&bytes[..2], &MAGIC);
    assert_eq!(bytes[2], FORMAT_MESSAGE);
    assert_eq!(bytes[3], CURRENT_VERSION);
}

#[test]
fn garbage_is_rejected_not_defaulted() {
    let codec = ProtoDeadLetterCodec::new();

    assert!(matches!(
        codec.decode(&[]).expect_err("empty"),
        DecodeError::TruncatedFrame { len: 0 }
    ));
    assert!(matches!(
        codec.decode(b"not a dead letter").expect_err("bad magic"),
        DecodeError::BadMagic { .. }
    ));
    assert!(matches!(
        codec
            .decode(&[0xDE, 0xAD, 0x01, 0x02, 0x00])
            .expect_err("row-codec frame"),
        DecodeError::WrongFormat(0x01)
    ));
    assert!(matches!(
        codec
            .decode(&[0xDE, 0xAD, FORMAT_MESSAGE, 9])
            .expect_err("future version"),
        DecodeError::UnknownWireVersion(9)
    ));

    // Valid header, body cut mid-field.
    let mut bytes = codec.encode(&full_letter());
    bytes.truncate(bytes.len() - 3);
    assert!(matches!(
        codec.decode(&bytes).expect_err("torn body"),
        DecodeError::Proto(_)
    ));
}

/// A writer that appended a field this reader has never heard of must still
/// decode; the unknown field is skipped, not an error.
#[test]
fn fields_from_newer_writers_are_skipped() {
    let codec = ProtoDeadLetterCodec::new();
    let letter = full_letter();

    // Field 99, varint wire type: tag varint 0x98 0x06, value 1.
    let mut bytes = codec.encode(&letter);
    bytes.extend_from_slice(&[0x98, 0x06, 0x01]);

    assert_eq!(codec.decode(&bytes).expect("decode"), letter);
}

/// An empty cause chain never leaves the builder, so bytes carrying one are
/// malformed and must be rejected before a descriptor is handed back.
#[test]
fn empty_cause_chain_is_rejected() {
    use prost::Message as _;

    let hollow = letterbox_proto::message::ProtoDeadLetter {
        description: "step".into(),
        ..Default::default()
    };

    let mut frame = vec![MAGIC[0], MAGIC[1], FORMAT_MESSAGE, CURRENT_VERSION];
    frame.extend_from_slice(&hollow.encode_to_vec());

    let err = ProtoDeadLetterCodec::new()
        .decode(&frame)
        .expect_err("no originating cause");
    assert!(matches!(err, DecodeError::EmptyCauseChain));
}

#[test]
fn deep_chain_is_truncated_with_marker_on_the_wire() {
    let mut letter = minimal_letter();
    letter.cause = (0..6)
        .map(|i| Cause {
            type_name: None,
            message: format!("cause {i}"),
        })
        .collect();

    let codec = ProtoDeadLetterCodec::with_limits(EncodeLimits::default().max_cause_depth(4));
    let decoded = codec.decode(&codec.encode(&letter)).expect("decode");

    assert_eq!(decoded.cause.len(), 4);
    assert_eq!(decoded.cause[0].message, "cause 0");
    assert!(decoded.causes_truncated, "marker must survive the wire");
}

#[test]
fn stack_trace_is_capped_before_encoding() {
    let mut letter = minimal_letter();
    letter.stack_trace = Some("x".repeat(1000));

    let codec =
        ProtoDeadLetterCodec::with_limits(EncodeLimits::default().max_stack_trace_bytes(64));
    let decoded = codec.decode(&codec.encode(&letter)).expect("decode");

    assert_eq!(decoded.stack_trace.as_ref().map(|t| t.len()), Some(64));
    assert!(decoded.stack_trace_truncated, "marker must survive the wire");
}

fn arb_payload() -> impl Strategy<Value = Payload> {
    (
        proptest::collection::vec(any::<u8>(), 0..64),
        proptest::option::of("[a-zA-Z:_]{1,24}"),
    )
        .prop_map(|(body, type_tag)| {
            let mut payload = Payload::bytes(body);
            payload.type_tag = type_tag;
            payload
        })
}

fn arb_coordinates() -> impl Strategy<Value = SourceCoordinates> {
    (
        proptest::option::of("[a-z.-]{1,30}"),
        proptest::option::of(any::<i32>()),
        proptest::option::of(any::<i64>()),
        proptest::option::of(any::<i64>()),
    )
        .prop_map(|(topic, partition, offset, timestamp_ms)| SourceCoordinates {
            topic,
            partition,
            offset,
            timestamp_ms,
        })
}

fn arb_letter() -> impl Strategy<Value = DeadLetter> {
    (
        "[ -~]{1,40}",
        proptest::collection::vec(
            (proptest::option::of("[a-zA-Z:_]{1,20}"), "[ -~]{0,60}").prop_map(
                |(type_name, message)| Cause { type_name, message },
            ),
            1..8,
        ),
        any::<bool>(),
        proptest::option::of("[ -~]{0,200}"),
        any::<bool>(),
        proptest::option::of(arb_payload()),
        proptest::option::of(arb_payload()),
        arb_coordinates(),
    )
        .prop_map(
            |(
                description,
                cause,
                causes_truncated,
                stack_trace,
                stack_trace_truncated,
                input_key,
                input_value,
                coordinates,
            )| DeadLetter {
                description,
                cause,
                causes_truncated,
                stack_trace,
                stack_trace_truncated,
                input_key,
                input_value,
                coordinates,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_bounded_descriptor_roundtrips(letter in arb_letter()) {
        let codec = ProtoDeadLetterCodec::new();
        prop_assert_eq!(codec.decode(&codec.encode(&letter)).expect("decode"), letter);
    }
}
