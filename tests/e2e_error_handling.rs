//! Argument, bounds, capacity, and permission errors across providers.

use textcursor::providers::utf16::open_u16;
use textcursor::providers::utf8::open_u8;
use textcursor::TextError;

#[test]
fn extract_rejects_inverted_range() {
    let mut view = open_u16("abc".encode_utf16().collect(), Some(3));
    let mut out = [0u16; 4];
    let err = view.extract(2, 1, &mut out).unwrap_err();
    assert_eq!(err, TextError::IllegalArgument);
}

#[test]
fn extract_reports_string_not_terminated_when_destination_fits_exactly() {
    let mut view = open_u16("abc".encode_utf16().collect(), Some(3));
    let mut out = [0u16; 3];
    let outcome = view.extract(0, 3, &mut out).unwrap();
    assert_eq!(outcome.length, 3);
    assert!(!outcome.overflowed);
    assert_eq!(outcome.warning, Some(textcursor::TextWarning::StringNotTerminated));
}

#[test]
fn extract_reports_overflow_when_destination_is_too_small() {
    let mut view = open_u16("abcdef".encode_utf16().collect(), Some(6));
    let mut out = [0u16; 2];
    let outcome = view.extract(0, 6, &mut out).unwrap();
    assert_eq!(outcome.length, 6);
    assert!(outcome.overflowed);
    assert_eq!(outcome.written, 2);
}

#[test]
fn replace_on_non_writable_view_is_rejected() {
    let mut view = textcursor::providers::utf16::open_const_u16("abc".encode_utf16().collect(), Some(3));
    let err = view.replace(0, 1, &[b'x' as u16]).unwrap_err();
    assert_eq!(err, TextError::NoWritePermission);
}

#[test]
fn replace_rejects_inverted_range() {
    let mut view = open_u16("abc".encode_utf16().collect(), Some(3));
    let err = view.replace(2, 1, &[]).unwrap_err();
    assert_eq!(err, TextError::IndexOutOfBounds);
}

#[test]
fn copy_rejects_inverted_range() {
    let mut view = open_u16("abcdef".encode_utf16().collect(), Some(6));
    let err = view.copy(4, 2, 0, false).unwrap_err();
    assert_eq!(err, TextError::IndexOutOfBounds);
}

#[test]
fn utf8_replace_overflow_leaves_backing_untouched() {
    let mut view = open_u8(b"hello".to_vec(), Some(5));
    let repl: Vec<u16> = " world".encode_utf16().collect();
    let err = view.replace(5, 5, &repl).unwrap_err();
    assert_eq!(err, TextError::BufferOverflow);

    let mut out = [0u8; 8];
    let mut readback = open_u8(b"hello".to_vec(), Some(5));
    let outcome = readback.extract(0, 5, &mut [0u16; 8]);
    assert!(outcome.is_ok());
    let _ = out;
    assert_eq!(view.native_length(), 5);
}
