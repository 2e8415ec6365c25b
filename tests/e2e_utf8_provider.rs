//! End-to-end scenarios against the UTF-8 provider.

use textcursor::providers::utf8::{open_const_u8, open_u8};
use textcursor::TextError;

#[test]
fn non_ascii_iteration_reports_expected_scalars_and_indices() {
    let bytes = vec![0xC8, 0x81, 0xE1, 0x82, 0x83, 0xF1, 0x84, 0x85, 0x86];
    let len = bytes.len() as i64;
    let mut view = open_const_u8(bytes, Some(len));

    assert_eq!(view.next32(), 0x201);
    assert_eq!(view.get_native_index(), 2);
    assert_eq!(view.next32(), 0x1083);
    assert_eq!(view.get_native_index(), 5);
    assert_eq!(view.next32(), 0x44146);
    assert_eq!(view.get_native_index(), 9);

    view.set_native_index(3);
    assert_eq!(view.get_native_index(), 2);
}

#[test]
fn malformed_sequences_surface_as_replacement_characters() {
    let bytes = vec![0x41, 0x81, 0x42, 0xF0, 0x81, 0x81, 0x43];
    let len = bytes.len() as i64;
    let mut view = open_const_u8(bytes, Some(len));

    let mut scalars = Vec::new();
    loop {
        let c = view.next32();
        if c == textcursor::SENTINEL {
            break;
        }
        scalars.push(c);
    }
    assert_eq!(scalars, vec![0x41, 0xFFFD, 0x42, 0xFFFD, 0xFFFD, 0xFFFD, 0x43]);
}

#[test]
fn replace_grow_beyond_capacity_is_rejected() {
    let mut view = open_u8(b"hello".to_vec(), Some(5));
    let repl: Vec<u16> = " world".encode_utf16().collect();
    let err = view.replace(5, 5, &repl).unwrap_err();
    assert_eq!(err, TextError::BufferOverflow);
    assert_eq!(view.native_length(), 5);
}

#[test]
fn round_trip_iteration_matches_source() {
    let text = "na\u{efeF}\u{1F600}ve";
    let mut view = open_const_u8(text.as_bytes().to_vec(), Some(text.len() as i64));

    let collected: Vec<i32> = std::iter::from_fn(|| {
        let c = view.next32();
        if c == textcursor::SENTINEL {
            None
        } else {
            Some(c)
        }
    })
    .collect();
    let expected: Vec<i32> = text.chars().map(|c| c as i32).collect();
    assert_eq!(collected, expected);
}

#[test]
fn extract_produces_canonical_utf16() {
    let text = "na\u{efeF}\u{1F600}ve";
    let mut view = open_const_u8(text.as_bytes().to_vec(), Some(text.len() as i64));
    let mut out = vec![0u16; 16];
    let outcome = view.extract(0, text.len() as i64, &mut out).unwrap();
    let decoded = String::from_utf16(&out[..outcome.written]).unwrap();
    assert_eq!(decoded, text);
}
