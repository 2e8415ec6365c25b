//! Universal invariants that must hold for every provider.

use textcursor::providers::utf16::open_const_u16;
use textcursor::providers::utf8::open_const_u8;
use textcursor::providers::utf32::open_const_u32;
use textcursor::TextView;

fn open_views(text: &str) -> Vec<TextView> {
    let u16_units: Vec<u16> = text.encode_utf16().collect();
    let u16_len = u16_units.len() as i64;
    let code_points: Vec<i32> = text.chars().map(|c| c as i32).collect();
    let cp_len = code_points.len() as i64;
    vec![
        open_const_u16(u16_units, Some(u16_len)),
        open_const_u8(text.as_bytes().to_vec(), Some(text.len() as i64)),
        open_const_u32(code_points, Some(cp_len)),
    ]
}

const SAMPLE: &str = "Hi\u{e9}\u{1F600}\u{4e2d}x";

#[test]
fn index_coherence_snaps_left_on_code_point_boundary() {
    for mut view in open_views(SAMPLE) {
        let len = view.native_length();
        for i in 0..=len {
            view.set_native_index(i);
            let snapped = view.get_native_index();
            assert!(snapped <= i);
            view.set_native_index(snapped);
            assert_eq!(view.get_native_index(), snapped, "set_native_index is idempotent at a boundary");
        }
    }
}

#[test]
fn move_index32_symmetry() {
    for mut view in open_views(SAMPLE) {
        let n = SAMPLE.chars().count() as i32;
        view.set_native_index(0);
        for k in 1..=n {
            view.set_native_index(0);
            let forward_ok = view.move_index32(k);
            let backward_ok = view.move_index32(-k);
            if forward_ok && backward_ok {
                assert_eq!(view.get_native_index(), 0);
            }
        }
    }
}

#[test]
fn get_previous_native_index_matches_previous32_next32_round_trip() {
    for mut view in open_views(SAMPLE) {
        let len = view.native_length();
        view.set_native_index(0);
        loop {
            let c = view.next32();
            if c == textcursor::SENTINEL {
                break;
            }
            let fast = view.get_previous_native_index();
            let here = view.get_native_index();
            view.previous32();
            let slow = view.get_native_index();
            view.next32();
            assert_eq!(view.get_native_index(), here);
            assert_eq!(fast, slow);
        }
        assert_eq!(view.get_native_index(), len);
    }
}

#[test]
fn char32_at_agrees_with_forward_iteration() {
    for mut view in open_views(SAMPLE) {
        view.set_native_index(0);
        loop {
            let before = view.get_native_index();
            let peeked = view.char32_at(before);
            let advanced = view.next32();
            if advanced == textcursor::SENTINEL {
                assert_eq!(peeked, textcursor::SENTINEL);
                break;
            }
            assert_eq!(peeked, advanced);
        }
    }
}

#[test]
fn replace_with_empty_range_and_empty_source_is_a_no_op() {
    let backing: Vec<u16> = "abc".encode_utf16().collect();
    let mut view = textcursor::providers::utf16::open_u16(backing, Some(3));
    let before = view.native_length();
    let delta = view.replace(1, 1, &[]).unwrap();
    assert_eq!(delta, 0);
    assert_eq!(view.native_length(), before);
}
