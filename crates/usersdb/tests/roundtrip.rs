//! Property tests: linear → indexed → linear preserves every record, and
//! re-encoding a decoded database reproduces it byte for byte.

use std::borrow::Cow;

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use usersdb::{
    decode_database, encode_database, find_user, format_record, parse_linear, validate_database,
    write_linear, FieldFlags, IndexedDb, UserRecord,
};

/// Small alphabets so that fields collide often and nodes get shared.
fn field(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    vec(prop::sample::select(b"AB1 -\xe9".to_vec()), 0..=max_len)
}

type Fields = (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>);

fn fields() -> impl Strategy<Value = Fields> {
    (field(12), field(4), field(3), field(3), field(2), field(2))
}

/// Records with unique IDs in ascending order.
fn records() -> impl Strategy<Value = Vec<UserRecord<'static>>> {
    btree_set(0u32..=0xFFFFFF, 0..40)
        .prop_flat_map(|ids| {
            let n = ids.len();
            (Just(ids), vec(fields(), n))
        })
        .prop_map(|(ids, fields)| {
            ids.into_iter()
                .zip(fields)
                .map(|(id, (callsign, name, nickname, city, state, country))| UserRecord {
                    id,
                    callsign: Cow::Owned(callsign),
                    name: Cow::Owned(name),
                    nickname: Cow::Owned(nickname),
                    city: Cow::Owned(city),
                    state: Cow::Owned(state),
                    country: Cow::Owned(country),
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn decode_returns_encoded_records(records in records()) {
        let bytes = encode_database(&records).unwrap();
        let decoded = decode_database(&bytes).unwrap();
        prop_assert_eq!(&decoded, &records);

        let summary = validate_database(&bytes).unwrap();
        prop_assert_eq!(summary.records, records.len());
        prop_assert_eq!(summary.total_bytes, bytes.len());
    }

    #[test]
    fn reencoding_is_byte_identical(records in records()) {
        let bytes = encode_database(&records).unwrap();
        let decoded = decode_database(&bytes).unwrap();
        prop_assert_eq!(encode_database(&decoded).unwrap(), bytes);
    }

    #[test]
    fn lookup_finds_exactly_the_present_ids(records in records(), other_id in 0u32..=0xFFFFFF) {
        let bytes = encode_database(&records).unwrap();
        for record in &records {
            let found = find_user(&bytes, record.id).unwrap();
            prop_assert_eq!(found.as_ref(), Some(record));
        }
        let expected = records.iter().find(|r| r.id == other_id);
        let got = find_user(&bytes, other_id).unwrap();
        prop_assert_eq!(got.as_ref(), expected);
    }

    #[test]
    fn linear_text_survives_round_trip(records in records()) {
        // Field alphabets contain no commas or newlines
        let mut linear = Vec::new();
        write_linear(&mut linear, &records).unwrap();
        let parsed = parse_linear(&linear).unwrap();
        prop_assert_eq!(&parsed, &records);

        let bytes = encode_database(&parsed).unwrap();
        let mut back = Vec::new();
        write_linear(&mut back, &decode_database(&bytes).unwrap()).unwrap();
        prop_assert_eq!(back, linear);
    }

    #[test]
    fn lead_flags_match_present_fields(records in records()) {
        let bytes = encode_database(&records).unwrap();
        for (index, record) in records.iter().enumerate() {
            let entry = 9 + index * 6;
            let node = (bytes[entry + 3] as usize) << 16
                | (bytes[entry + 4] as usize) << 8
                | bytes[entry + 5] as usize;
            prop_assert_eq!(FieldFlags::from_lead(bytes[node]), FieldFlags::for_record(record));
        }
    }
}

#[test]
fn preamble_and_missing_newline() {
    let input = b"58\n1001,N0CALL,John Doe,Springfield,IL,Johnny,USA";
    let records = parse_linear(input).unwrap();
    let bytes = encode_database(&records).unwrap();
    let db = IndexedDb::open(&bytes).unwrap();
    let user = db.lookup(1001).unwrap().unwrap();
    assert_eq!(
        format_record(&user),
        b"1001,N0CALL,John Doe,Springfield,IL,Johnny,USA\n"
    );
}
