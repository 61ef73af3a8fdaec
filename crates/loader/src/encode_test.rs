use super::*;

// Decoder mirroring how the warehouse reads escaped lines back, used to
// check that encoding is lossless.

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut raw = String::new();
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                raw.push('\\');
                if let Some(escaped) = chars.next() {
                    raw.push(escaped);
                }
            }
            FIELD_DELIMITER => fields.push(std::mem::take(&mut raw)),
            _ => raw.push(ch),
        }
    }
    fields.push(raw);
    fields
}

fn decode_field(raw: &str) -> Datum {
    if raw == NULL_TOKEN {
        return Datum::Null;
    }
    let mut text = String::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    text.push(escaped);
                }
            }
            _ => text.push(ch),
        }
    }
    Datum::Text(text)
}

fn decode_line(line: &str) -> Vec<Datum> {
    split_fields(line).iter().map(|raw| decode_field(raw)).collect()
}

#[test]
fn joins_fields_with_pipe() {
    let row = vec![Datum::from("a"), Datum::from("b")];
    assert_eq!(encode_row(&row), "a|b");
}

#[test]
fn null_renders_as_marker() {
    let row = vec![Datum::Null, Datum::from("x|y")];
    assert_eq!(encode_row(&row), "\\N|x\\|y");
}

#[test]
fn escapes_backslash_and_pipe_in_text() {
    assert_eq!(encode_row(&[Datum::from("x|y")]), "x\\|y");
    assert_eq!(encode_row(&[Datum::from("a\\b")]), "a\\\\b");
    assert_eq!(encode_row(&[Datum::from("p|q\\r")]), "p\\|q\\\\r");
}

#[test]
fn literal_backslash_n_is_not_null() {
    // A text value "\N" escapes to "\\N", which the warehouse decodes
    // back to the two characters, not to NULL.
    assert_eq!(encode_row(&[Datum::from("\\N")]), "\\\\N");
}

#[test]
fn decoding_reverses_the_escapes_exactly() {
    let row = vec![Datum::Null, Datum::from("a\\b"), Datum::from("x|y")];
    assert_eq!(decode_line(&encode_row(&row)), row);
}

#[test]
fn decoding_keeps_literal_backslash_n_distinct_from_null() {
    let row = vec![Datum::from("\\N"), Datum::Null, Datum::from("p|q\\r")];
    assert_eq!(decode_line(&encode_row(&row)), row);
}

#[test]
fn empty_text_stays_an_empty_field() {
    let row = vec![Datum::from(""), Datum::from("x")];
    assert_eq!(encode_row(&row), "|x");
}

#[test]
fn numbers_and_bools_render_canonically() {
    let row = vec![
        Datum::from(42i64),
        Datum::from(-7i32),
        Datum::from(1.5),
        Datum::from(true),
        Datum::from(false),
    ];
    assert_eq!(encode_row(&row), "42|-7|1.5|true|false");
}

#[test]
fn option_converts_to_null_or_value() {
    assert_eq!(Datum::from(None::<i64>), Datum::Null);
    assert_eq!(Datum::from(Some(7i64)), Datum::Int(7));
    assert_eq!(Datum::from(Some("x")), Datum::Text("x".to_string()));
}

#[test]
fn encode_row_into_clears_the_buffer() {
    let mut buf = String::new();
    encode_row_into(&mut buf, &[Datum::from("first"), Datum::from("row")]);
    assert_eq!(buf, "first|row");

    encode_row_into(&mut buf, &[Datum::from("second")]);
    assert_eq!(buf, "second");
}

#[test]
fn empty_row_encodes_to_empty_line() {
    assert_eq!(encode_row(&[]), "");
}
