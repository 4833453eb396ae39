//! Structural checks for Indian tax identifiers.
//!
//! Both validators only check character positions and ranges. Neither
//! verifies the GSTIN check digit nor the PAN holder-type letter.

/// Remove all spaces and upper-case the identifier.
pub fn normalize_identifier(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Validate a PAN: `AAAAA9999A` (5 letters, 4 digits, 1 letter).
pub fn validate_pan(input: &str) -> bool {
    let pan: Vec<char> = normalize_identifier(input).chars().collect();
    if pan.len() != 10 {
        return false;
    }

    pan[..5].iter().all(char::is_ascii_alphabetic)
        && pan[5..9].iter().all(char::is_ascii_digit)
        && pan[9].is_ascii_alphabetic()
}

/// Validate a GSTIN layout.
///
/// - chars 1-2: state code, numeric, within 1..=37
/// - chars 3-12: alphanumeric (the embedded PAN)
/// - char 13: entity digit within 1..=9
/// - char 14: literal `Z`
/// - char 15: alphanumeric
pub fn validate_gst(input: &str) -> bool {
    let gst: Vec<char> = normalize_identifier(input).chars().collect();
    if gst.len() != 15 {
        return false;
    }

    let state_code = match digits_value(&gst[..2]) {
        Some(code) => code,
        None => return false,
    };
    if !(1..=37).contains(&state_code) {
        return false;
    }

    if !gst[2..12].iter().all(char::is_ascii_alphanumeric) {
        return false;
    }

    match gst[12].to_digit(10) {
        Some(digit) if (1..=9).contains(&digit) => {}
        _ => return false,
    }

    gst[13] == 'Z' && gst[14].is_ascii_alphanumeric()
}

fn digits_value(chars: &[char]) -> Option<u32> {
    chars.iter().try_fold(0u32, |acc, c| {
        if c.is_ascii_digit() {
            c.to_digit(10).map(|d| acc * 10 + d)
        } else {
            None
        }
    })
}
