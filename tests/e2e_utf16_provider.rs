//! End-to-end scenarios against the UTF-16 provider.

use textcursor::providers::utf16::{open_const_u16, open_u16};
use textcursor::TextError;

#[test]
fn surrogate_repair_on_set_native_index() {
    let mut view = open_const_u16(vec![0xD83B, 0xDE00, 0x0041], Some(3));

    view.set_native_index(1);
    assert_eq!(view.get_native_index(), 0);

    view.set_native_index(0);
    assert_eq!(view.next32(), 0x1EE00);
    assert_eq!(view.next32(), 0x41);
    assert_eq!(view.next32(), textcursor::SENTINEL);
}

#[test]
fn replace_shrink_shifts_tail_left() {
    let backing: Vec<u16> = "ABCDEFGHI".encode_utf16().chain(std::iter::repeat(0).take(7)).collect();
    assert_eq!(backing.len(), 16);
    let mut view = open_u16(backing, Some(9));

    let repl: Vec<u16> = "X".encode_utf16().collect();
    let delta = view.replace(3, 6, &repl).unwrap();
    assert_eq!(delta, -2);
    assert_eq!(view.native_length(), 7);
    assert_eq!(view.get_native_index(), 4);

    let mut out = vec![0u16; 7];
    let outcome = view.extract(0, 7, &mut out).unwrap();
    assert_eq!(outcome.length, 7);
    assert_eq!(String::from_utf16(&out).unwrap(), "ABCXGHI");
}

#[test]
fn replace_grow_beyond_capacity_is_rejected() {
    let backing: Vec<u16> = "hello".encode_utf16().chain(std::iter::repeat(0).take(3)).collect();
    let mut view = open_u16(backing, Some(5));

    let repl: Vec<u16> = " world".encode_utf16().collect();
    let err = view.replace(5, 5, &repl).unwrap_err();
    assert_eq!(err, TextError::BufferOverflow);
    assert_eq!(view.native_length(), 5);
}

#[test]
fn copy_overlap_is_rejected() {
    let backing: Vec<u16> = "ABCDEFGH".encode_utf16().collect();
    let mut view = open_u16(backing, Some(8));

    let err = view.copy(2, 6, 4, false).unwrap_err();
    assert_eq!(err, TextError::IndexOutOfBounds);

    let mut out = vec![0u16; 8];
    view.extract(0, 8, &mut out).unwrap();
    assert_eq!(String::from_utf16(&out).unwrap(), "ABCDEFGH");
}

#[test]
fn freeze_blocks_writes_but_not_navigation() {
    let backing: Vec<u16> = "hi".encode_utf16().collect();
    let mut view = open_u16(backing, Some(2));
    view.freeze();

    let repl: Vec<u16> = "x".encode_utf16().collect();
    assert_eq!(view.replace(0, 0, &repl).unwrap_err(), TextError::NoWritePermission);
    assert_eq!(view.next32(), 'h' as i32);
}

#[test]
fn deep_clone_is_independent_of_source() {
    let backing: Vec<u16> = "hello".encode_utf16().chain(std::iter::repeat(0).take(3)).collect();
    let mut view = open_u16(backing, Some(5));

    let mut clone = view.clone_view(true, false).unwrap();
    let repl: Vec<u16> = "!!!".encode_utf16().collect();
    clone.replace(0, 5, &repl).unwrap();

    assert_eq!(clone.native_length(), 3);
    assert_eq!(view.native_length(), 5);
    let mut out = vec![0u16; 5];
    view.extract(0, 5, &mut out).unwrap();
    assert_eq!(String::from_utf16(&out).unwrap(), "hello");
}

#[test]
fn round_trip_iteration_matches_source() {
    let text = "a\u{1F600}b\u{1EE00}c";
    let units: Vec<u16> = text.encode_utf16().collect();
    let len = units.len() as i64;
    let mut view = open_const_u16(units, Some(len));

    let mut forward = Vec::new();
    loop {
        let c = view.next32();
        if c == textcursor::SENTINEL {
            break;
        }
        forward.push(c);
    }
    let expected: Vec<i32> = text.chars().map(|c| c as i32).collect();
    assert_eq!(forward, expected);

    let mut backward = Vec::new();
    loop {
        let c = view.previous32();
        if c == textcursor::SENTINEL {
            break;
        }
        backward.push(c);
    }
    backward.reverse();
    assert_eq!(backward, expected);
}
