//! The linear database: one user per line, seven comma-separated fields.
//!
//! ```text
//! id,callsign,name,city,state,nickname,country
//! ```
//!
//! Fields cannot contain commas or newlines; there is no quoting. Parsing
//! borrows every field from the input.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::error::ParseError;
use crate::limits::MAX_ID;
use crate::model::UserRecord;

const FIELD_COUNT: usize = 7;

/// Parses a linear database.
///
/// A missing newline after the last line is tolerated. If the first line
/// has no comma at all it is a preamble (an empty line, or the byte count
/// line of the `.bin` variant of the file) and is skipped.
pub fn parse_linear(input: &[u8]) -> Result<Vec<UserRecord<'_>>, ParseError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let body = input.strip_suffix(b"\n").unwrap_or(input);

    let mut records = Vec::new();
    for (i, line) in body.split(|&b| b == b'\n').enumerate() {
        let line_no = i + 1;
        let mut fields: [&[u8]; FIELD_COUNT] = [&[][..]; FIELD_COUNT];
        let mut count = 0;
        for field in line.split(|&b| b == b',') {
            if count == FIELD_COUNT {
                return Err(ParseError::TooManyFields { line: line_no });
            }
            fields[count] = field;
            count += 1;
        }

        if count == 1 && i == 0 {
            tracing::debug!(len = line.len(), "skipping preamble line");
            continue;
        }
        if count < FIELD_COUNT {
            return Err(ParseError::TooFewFields {
                line: line_no,
                found: count,
            });
        }

        let [id, callsign, name, city, state, nickname, country] = fields;
        records.push(UserRecord {
            id: parse_id(id, line_no)?,
            callsign: Cow::Borrowed(callsign),
            name: Cow::Borrowed(name),
            nickname: Cow::Borrowed(nickname),
            city: Cow::Borrowed(city),
            state: Cow::Borrowed(state),
            country: Cow::Borrowed(country),
        });
    }
    Ok(records)
}

/// Parses a decimal DMR ID. Leading zeros are allowed.
fn parse_id(field: &[u8], line: usize) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidId {
        line,
        value: String::from_utf8_lossy(field).into_owned(),
    };
    if field.is_empty() {
        return Err(invalid());
    }
    let mut id = 0u32;
    for &byte in field {
        if !byte.is_ascii_digit() {
            return Err(invalid());
        }
        id = id * 10 + u32::from(byte - b'0');
        if id > MAX_ID {
            return Err(invalid());
        }
    }
    Ok(id)
}

/// Writes one record as a linear line, including the newline.
pub fn write_record<W: Write>(writer: &mut W, record: &UserRecord<'_>) -> io::Result<()> {
    write!(writer, "{}", record.id)?;
    for field in [
        &record.callsign,
        &record.name,
        &record.city,
        &record.state,
        &record.nickname,
        &record.country,
    ] {
        writer.write_all(b",")?;
        writer.write_all(field)?;
    }
    writer.write_all(b"\n")
}

/// Writes records as a linear database.
pub fn write_linear<'r, 'a: 'r, W: Write>(
    writer: &mut W,
    records: impl IntoIterator<Item = &'r UserRecord<'a>>,
) -> io::Result<()> {
    for record in records {
        write_record(writer, record)?;
    }
    Ok(())
}

/// Formats one record as a linear line, including the newline.
pub fn format_record(record: &UserRecord<'_>) -> Vec<u8> {
    let mut line = Vec::new();
    // Writing to a Vec cannot fail
    let _ = write_record(&mut line, record);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"1001,N0CALL,John Doe,Springfield,IL,Johnny,USA\n\
                            1002,N0CALL2,,,,,\n";

    #[test]
    fn test_parse_field_order() {
        let records = parse_linear(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let john = &records[0];
        assert_eq!(john.id, 1001);
        assert_eq!(&*john.callsign, b"N0CALL");
        assert_eq!(&*john.name, b"John Doe");
        assert_eq!(&*john.city, b"Springfield");
        assert_eq!(&*john.state, b"IL");
        assert_eq!(&*john.nickname, b"Johnny");
        assert_eq!(&*john.country, b"USA");

        let bare = &records[1];
        assert_eq!(&*bare.callsign, b"N0CALL2");
        assert!(bare.name.is_empty() && bare.country.is_empty());
    }

    #[test]
    fn test_write_reproduces_input() {
        let records = parse_linear(SAMPLE).unwrap();
        let mut out = Vec::new();
        write_linear(&mut out, &records).unwrap();
        assert_eq!(out, SAMPLE);
    }

    #[test]
    fn test_missing_final_newline() {
        let records = parse_linear(b"7,K1ABC,Al,,,,").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(format_record(&records[0]), b"7,K1ABC,Al,,,,\n");
    }

    #[test]
    fn test_preamble_lines_skipped() {
        for input in [&b"\n1,A,,,,,\n"[..], &b"123456\n1,A,,,,,\n"[..]] {
            let records = parse_linear(input).unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id, 1);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_linear(b"").unwrap().is_empty());
        assert!(parse_linear(b"\n").unwrap().is_empty());
    }

    #[test]
    fn test_too_few_fields() {
        let result = parse_linear(b"1,A,,,,,\n2,B,,\n");
        assert_eq!(result, Err(ParseError::TooFewFields { line: 2, found: 4 }));

        // Only the first line may be a preamble
        let result = parse_linear(b"1,A,,,,,\n\n3,C,,,,,\n");
        assert_eq!(result, Err(ParseError::TooFewFields { line: 2, found: 1 }));

        // Six fields on the first line is not a preamble
        let result = parse_linear(b"1,A,,,,\n");
        assert_eq!(result, Err(ParseError::TooFewFields { line: 1, found: 6 }));
    }

    #[test]
    fn test_too_many_fields() {
        let result = parse_linear(b"1,A,,,,,,\n");
        assert_eq!(result, Err(ParseError::TooManyFields { line: 1 }));
    }

    #[test]
    fn test_bad_ids() {
        for id in ["", "12a", "+5", " 5", "16777216", "123456789"] {
            let line = format!("{},A,,,,,\n", id);
            assert!(
                matches!(parse_linear(line.as_bytes()), Err(ParseError::InvalidId { line: 1, .. })),
                "accepted {:?}",
                id
            );
        }
        let records = parse_linear(b"16777215,A,,,,,\n").unwrap();
        assert_eq!(records[0].id, 0xFFFFFF);
    }

    #[test]
    fn test_zero_padded_ids() {
        let records = parse_linear(b"000001234,A,,,,,\n0000000000016777215,B,,,,,\n").unwrap();
        assert_eq!(records[0].id, 1234);
        assert_eq!(records[1].id, 0xFFFFFF);

        let result = parse_linear(b"00016777216,A,,,,,\n");
        assert!(matches!(result, Err(ParseError::InvalidId { line: 1, .. })));
    }

    #[test]
    fn test_non_utf8_fields_preserved() {
        let input = b"2621001,DL1ABC,J\xfcrgen,M\xfcnchen,,,Germany\n";
        let records = parse_linear(input).unwrap();
        assert_eq!(&*records[0].name, b"J\xfcrgen");
        assert_eq!(format_record(&records[0]), input);
    }
}
