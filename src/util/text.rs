//! Small string helpers shared by the command handlers

/// Longest prefix of `text` that fits in `max` bytes on a char boundary
pub fn clip_to(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Lenient integer parse: optional sign, then leading digits. Anything
/// unparsable yields 0, matching how console arguments have always been read.
pub fn leading_int(arg: &str) -> i64 {
    let s = arg.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_respects_char_boundary() {
        assert_eq!(clip_to("héllo", 2), "h");
        assert_eq!(clip_to("abc", 10), "abc");
        assert_eq!(clip_to("abcdef", 3), "abc");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42"), 42);
        assert_eq!(leading_int("  -7"), -7);
        assert_eq!(leading_int("+3"), 3);
        assert_eq!(leading_int("50abc"), 50);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("-"), 0);
    }
}
