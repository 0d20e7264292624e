use super::*;

// =============================================================
// Parsing
// =============================================================

#[test]
fn parses_six_digit_hex() {
    let c = Color::from_hex("#4DABF7").unwrap();
    assert_eq!(c, Color::rgb(0x4D, 0xAB, 0xF7));
}

#[test]
fn parses_without_hash_and_lowercase() {
    assert_eq!(Color::from_hex("ff6b6b").unwrap(), Color::rgb(0xFF, 0x6B, 0x6B));
}

#[test]
fn parses_short_form() {
    assert_eq!(Color::from_hex("#888").unwrap(), Color::rgb(0x88, 0x88, 0x88));
    assert_eq!(Color::from_hex("#f0a").unwrap(), Color::rgb(0xFF, 0x00, 0xAA));
}

#[test]
fn parses_alpha_form() {
    let c = Color::from_hex("#00000080").unwrap();
    assert_eq!(c.a, 0x80);
}

#[test]
fn parses_names() {
    assert_eq!(Color::from_hex("White").unwrap(), Color::WHITE);
    assert_eq!(Color::from_hex("black").unwrap(), Color::BLACK);
    assert_eq!(Color::from_hex("transparent").unwrap().a, 0);
}

#[test]
fn rejects_bad_input_with_readable_messages() {
    assert_eq!(Color::from_hex("").unwrap_err(), ColorError::Empty);
    assert_eq!(Color::from_hex("#12345").unwrap_err(), ColorError::BadLength(5));
    let err = Color::from_hex("#zzzzzz").unwrap_err();
    assert_eq!(err.to_string(), "invalid hex digit in \"#zzzzzz\"");
    assert!(matches!(Color::from_hex("#ééé"), Err(ColorError::BadDigit(_))));
}

// =============================================================
// Formatting
// =============================================================

#[test]
fn to_hex_round_trips_opaque_and_translucent() {
    assert_eq!(Color::rgb(0x1E, 0x90, 0xFF).to_hex(), "#1E90FF");
    let c = Color { r: 1, g: 2, b: 3, a: 4 };
    assert_eq!(c.to_hex(), "#01020304");
    assert_eq!(Color::from_hex(&c.to_hex()).unwrap(), c);
}

#[test]
fn with_opacity_scales_alpha() {
    assert_eq!(Color::BLACK.with_opacity(0.4).a, 102);
    assert_eq!(Color::BLACK.with_opacity(2.0).a, 255);
    assert_eq!(Color::BLACK.with_opacity(-1.0).a, 0);
}

#[test]
fn serde_uses_hex_strings() {
    let json = serde_json::to_string(&Color::rgb(0xFF, 0xE0, 0x66)).unwrap();
    assert_eq!(json, "\"#FFE066\"");
    let back: Color = serde_json::from_str("\"#ffe066\"").unwrap();
    assert_eq!(back, Color::rgb(0xFF, 0xE0, 0x66));
    assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
}
