// src/cli.rs

//! Command line parsing: `xpopup [-c] [-d duration] message...`.

use anyhow::{anyhow, Result};

pub const USAGE: &str = "Usage: xpopup [-c] [-d duration] message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Center on the monitor under the pointer instead of anchoring to a corner.
    pub centered: bool,
    /// Seconds until the popup expires; `Some(0)` disables the timer and
    /// `None` leaves the configured default in place.
    pub duration: Option<u32>,
    /// All remaining arguments joined by single spaces.
    pub message: String,
}

/// Leading decimal digits of `value`, or 0 when there are none.
///
/// Follows C `atoi` for the inputs a duration can sensibly take: leading
/// whitespace and a `+` sign are skipped and anything after the digits is
/// ignored. A negative number or garbage yields 0, and values past `u32::MAX`
/// saturate.
fn parse_seconds(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| {
            acc.saturating_mul(10).saturating_add((digit - b'0') as u32)
        })
}

/// Parses arguments, excluding the program name.
///
/// Flags are only recognised before the first message word. A lone `-d` at
/// the end has no value and therefore starts the message.
pub fn parse<I, S>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut centered = false;
    let mut duration = None;
    let mut index = 0;

    while index < args.len() {
        match args[index].as_str() {
            "-c" => centered = true,
            "-d" if index + 1 < args.len() => {
                index += 1;
                duration = Some(parse_seconds(&args[index]));
            }
            _ => break,
        }
        index += 1;
    }

    let words = &args[index..];
    if words.is_empty() {
        return Err(anyhow!(USAGE));
    }

    Ok(Args {
        centered,
        duration,
        message: words.join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn message_words_are_space_joined() {
        let args = parse(["hello", "big", "world"]).unwrap();
        assert_eq!(args.message, "hello big world");
        assert!(!args.centered);
        assert_eq!(args.duration, None);
    }

    #[test_log::test]
    fn flags_before_message() {
        let args = parse(["-c", "-d", "3", "done"]).unwrap();
        assert!(args.centered);
        assert_eq!(args.duration, Some(3));
        assert_eq!(args.message, "done");
    }

    #[test_log::test]
    fn flags_after_message_are_text() {
        let args = parse(["note", "-c"]).unwrap();
        assert!(!args.centered);
        assert_eq!(args.message, "note -c");
    }

    #[test_log::test]
    fn non_numeric_duration_means_no_timer() {
        assert_eq!(parse(["-d", "soon", "x"]).unwrap().duration, Some(0));
        assert_eq!(parse(["-d", "-4", "x"]).unwrap().duration, Some(0));
        assert_eq!(parse(["-d", "12abc", "x"]).unwrap().duration, Some(12));
        assert_eq!(parse(["-d", " 7", "x"]).unwrap().duration, Some(7));
        assert_eq!(parse(["-d", "+5", "x"]).unwrap().duration, Some(5));
        assert_eq!(parse(["-d", "++5", "x"]).unwrap().duration, Some(0));
    }

    #[test_log::test]
    fn huge_duration_saturates() {
        let args = parse(["-d", "99999999999999", "x"]).unwrap();
        assert_eq!(args.duration, Some(u32::MAX));
    }

    #[test_log::test]
    fn missing_message_is_a_usage_error() {
        let err = parse(Vec::<String>::new()).unwrap_err();
        assert_eq!(err.to_string(), USAGE);
        assert!(parse(["-c"]).is_err());
        assert!(parse(["-c", "-d", "4"]).is_err());
    }

    #[test_log::test]
    fn trailing_dash_d_is_the_message() {
        let args = parse(["-d"]).unwrap();
        assert_eq!(args.message, "-d");
        assert_eq!(args.duration, None);
    }
}
