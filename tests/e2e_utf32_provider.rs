//! End-to-end scenarios against the UTF-32 provider.

use textcursor::providers::utf32::{open_const_u32, open_u32};

#[test]
fn chunk_boundary_straddles_a_supplementary_code_point() {
    let mut code_points: Vec<i32> = vec![0x41; 34];
    code_points[32] = 0x11000;
    code_points[33] = 0x42;
    let mut view = open_const_u32(code_points, Some(34));

    assert_eq!(view.char32_at(32), 0x11000);
    assert_eq!(view.get_native_index(), 32);

    assert_eq!(view.next32(), 0x11000);
    assert_eq!(view.get_native_index(), 33);
    assert_eq!(view.next32(), 0x42);
    assert_eq!(view.get_native_index(), 34);
}

#[test]
fn round_trip_iteration_matches_source() {
    let code_points: Vec<i32> = vec![0x41, 0x1F600, 0x42, 0x10FFFF, 0x43];
    let len = code_points.len() as i64;
    let mut view = open_const_u32(code_points.clone(), Some(len));

    let mut forward = Vec::new();
    loop {
        let c = view.next32();
        if c == textcursor::SENTINEL {
            break;
        }
        forward.push(c);
    }
    assert_eq!(forward, code_points);
}

#[test]
fn replace_updates_length_and_content() {
    let mut view = open_u32(vec![0x41, 0x42, 0x43, 0], Some(3));
    let repl: Vec<u16> = "XY".encode_utf16().collect();
    let delta = view.replace(1, 2, &repl).unwrap();
    assert_eq!(delta, 1);
    assert_eq!(view.native_length(), 4);

    let mut out = vec![0u16; 4];
    let outcome = view.extract(0, 4, &mut out).unwrap();
    assert_eq!(String::from_utf16(&out[..outcome.written]).unwrap(), "AXYC");
}
