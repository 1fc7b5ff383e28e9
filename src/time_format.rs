use serde::{Serialize, Serializer};

const SEC_HOUR: u64 = 3600;
const SEC_MINUTE: u64 = 60;

pub const DIGIT_WIDTH: usize = 6;
pub const DEFAULT_DIGITS: &str = "000100";

/// Parses an `HHMMSS` string into seconds.
///
/// Shorter input is left-padded with zeroes. Minutes and seconds are not
/// range checked, `"009900"` is 99 minutes.
pub fn parse_duration(input: &str) -> u64 {
    let digits: Vec<char> = input.chars().collect();
    let start = digits.len().saturating_sub(DIGIT_WIDTH);
    let padded = format!(
        "{:0>width$}",
        digits[start..]
            .iter()
            .map(|c| if c.is_ascii_digit() { *c } else { '0' })
            .collect::<String>(),
        width = DIGIT_WIDTH
    );

    let pair = |offset: usize| -> u64 { padded[offset..offset + 2].parse().unwrap_or(0) };

    pair(0) * SEC_HOUR + pair(2) * SEC_MINUTE + pair(4)
}

pub fn format_duration(seconds: u64) -> String {
    let mut time = seconds;
    let hours = time / SEC_HOUR;
    time -= hours * SEC_HOUR;
    let minutes = time / SEC_MINUTE;
    time -= minutes * SEC_MINUTE;

    format!("{}:{}:{}", hours, pad_zeroes(minutes, 2), pad_zeroes(time, 2))
}

fn pad_zeroes(time: u64, length: usize) -> String {
    let str_length = time.to_string().chars().count();
    if str_length >= length {
        return format!("{}", time);
    }
    let count = length - str_length;
    let zeroes = "0".repeat(count);
    format!("{}{}", zeroes, time)
}

/// Fixed-width shift register holding the typed `HHMMSS` digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitBuffer {
    digits: [u8; DIGIT_WIDTH],
}

impl DigitBuffer {
    /// Builds a buffer from a persisted string, falling back to the default
    /// unless it is exactly six ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let bytes = raw.as_bytes();
        if bytes.len() != DIGIT_WIDTH || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let mut digits = [b'0'; DIGIT_WIDTH];
        digits.copy_from_slice(bytes);
        Some(Self { digits })
    }

    /// Appends a digit on the right, dropping the oldest one. Returns false
    /// for anything that is not an ASCII digit.
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() {
            return false;
        }
        self.digits.rotate_left(1);
        self.digits[DIGIT_WIDTH - 1] = c as u8;
        true
    }

    /// Removes the most recent digit and shifts a zero in on the left.
    pub fn pop(&mut self) {
        self.digits.rotate_right(1);
        self.digits[0] = b'0';
    }

    pub fn clear(&mut self) {
        self.digits = [b'0'; DIGIT_WIDTH];
    }

    pub fn as_str(&self) -> &str {
        // only ever holds ASCII digits
        std::str::from_utf8(&self.digits).unwrap_or(DEFAULT_DIGITS)
    }

    pub fn seconds(&self) -> u64 {
        parse_duration(self.as_str())
    }

    /// `HH:MM:SS` view of the raw digits, without normalizing ranges.
    pub fn grouped(&self) -> String {
        let s = self.as_str();
        format!("{}:{}:{}", &s[0..2], &s[2..4], &s[4..6])
    }
}

impl Default for DigitBuffer {
    fn default() -> Self {
        Self::parse(DEFAULT_DIGITS).unwrap_or(Self {
            digits: [b'0'; DIGIT_WIDTH],
        })
    }
}

impl Serialize for DigitBuffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_hhmmss() {
        assert_eq!(parse_duration("013000"), 5400);
        assert_eq!(parse_duration("5"), 5);
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("000100"), 60);
    }

    #[test]
    fn accepts_out_of_range_minutes() {
        assert_eq!(parse_duration("009900"), 99 * 60);
        assert_eq!(parse_duration("999999"), 99 * 3600 + 99 * 60 + 99);
    }

    #[test]
    fn long_input_uses_last_six_digits() {
        assert_eq!(parse_duration("12013000"), 5400);
    }

    #[test]
    fn non_digits_read_as_zero() {
        assert_eq!(parse_duration("01x000"), 3600);
        assert_eq!(parse_duration("ééé"), 0);
    }

    #[test]
    fn formats_hours_unpadded() {
        assert_eq!(format_duration(5400), "1:30:00");
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(59), "0:00:59");
        assert_eq!(format_duration(36_061), "10:01:01");
    }

    #[test]
    fn buffer_keeps_last_six_digits() {
        let mut buffer = DigitBuffer::default();
        for c in "1234567".chars() {
            assert!(buffer.push(c));
        }
        assert_eq!(buffer.as_str(), "234567");

        buffer.pop();
        assert_eq!(buffer.as_str(), "023456");
    }

    #[test]
    fn buffer_ignores_non_digits() {
        let mut buffer = DigitBuffer::default();
        assert!(!buffer.push('x'));
        assert!(!buffer.push(' '));
        assert_eq!(buffer.as_str(), DEFAULT_DIGITS);
    }

    #[test]
    fn buffer_rejects_malformed_persisted_digits() {
        assert!(DigitBuffer::parse("12345").is_none());
        assert!(DigitBuffer::parse("12a456").is_none());
        assert!(DigitBuffer::parse("1234567").is_none());
        assert_eq!(DigitBuffer::parse("013000").map(|b| b.seconds()), Some(5400));
    }

    #[test]
    fn grouped_shows_raw_pairs() {
        let buffer = DigitBuffer::parse("009900").unwrap();
        assert_eq!(buffer.grouped(), "00:99:00");
    }
}
