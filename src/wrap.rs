// src/wrap.rs

//! Greedy, UTF-8 aware line wrapping under a pixel-width budget.
//!
//! The wrapper never looks at glyphs itself. Every width comes from a
//! [`FontMetrics`] implementation supplied by the rendering backend, which
//! keeps the algorithm testable with fake fonts.

use log::trace;

/// Font measurements the wrapper and the height calculation need.
///
/// Implemented by the X11 backend on top of Xft, and by fixed-advance fakes in
/// tests.
pub trait FontMetrics {
    /// Pixel width of `text` when drawn with this font.
    fn text_width(&self, text: &str) -> u32;
    /// Widest advance of any glyph in the font.
    fn max_advance_width(&self) -> u32;
    fn ascent(&self) -> i32;
    fn descent(&self) -> i32;

    /// Row height used for layout: ascent minus descent, never negative.
    fn text_height(&self) -> u32 {
        (self.ascent() - self.descent()).max(0) as u32
    }
}

/// One wrapped, renderable row of the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine(String);

impl DisplayLine {
    fn new(text: &str) -> Self {
        Self(text.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where the next line ends within the remaining text.
///
/// `line_len` bytes go into the emitted line; `consumed` bytes are skipped
/// before the next call. The two differ by the one separator (space or
/// newline) a break swallows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    pub line_len: usize,
    pub consumed: usize,
}

impl Break {
    const END: Break = Break {
        line_len: 0,
        consumed: 0,
    };

    fn at(line_len: usize, consumed: usize) -> Self {
        Self { line_len, consumed }
    }
}

fn is_separator(byte: u8) -> bool {
    byte == b' ' || byte == b'\n'
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

fn prev_char_boundary(text: &str, index: usize) -> usize {
    text[..index]
        .chars()
        .next_back()
        .map_or(0, |c| index - c.len_utf8())
}

/// Longest code-point aligned prefix of `text` whose width is within `budget`.
///
/// Starts from the `budget / max_advance_width` estimate, which can only
/// under-shoot for a well-behaved font, and walks forward one code point at a
/// time until the next step would cross the budget.
fn fitting_prefix<M: FontMetrics + ?Sized>(text: &str, budget: u32, metrics: &M) -> usize {
    let advance = metrics.max_advance_width().max(1);
    let mut pos = floor_char_boundary(text, (budget / advance) as usize);

    // Kerning or a lying max advance can push the estimate over.
    while pos > 0 && metrics.text_width(&text[..pos]) > budget {
        pos = prev_char_boundary(text, pos);
    }

    while pos < text.len() {
        let next = next_char_boundary(text, pos);
        if metrics.text_width(&text[..next]) > budget {
            break;
        }
        pos = next;
    }
    pos
}

/// Computes where the line starting at `remaining` ends.
///
/// Returns [`Break::END`] once nothing is left. A newline inside the span
/// that fits always forces a break there. When the text does not fit, the
/// break moves back to the last space of the fitting prefix; a token with no
/// space to fall back to is emitted whole and overflows the box.
pub fn next_break<M: FontMetrics + ?Sized>(remaining: &str, budget: u32, metrics: &M) -> Break {
    if remaining.is_empty() {
        return Break::END;
    }
    let bytes = remaining.as_bytes();

    // Only prefixes near the budget are measured. Backends report widths in
    // 16 bits, so the whole remaining text can wrap around and look short.
    let candidate = fitting_prefix(remaining, budget, metrics);
    let fits = candidate == remaining.len();

    if let Some(newline) = bytes[..candidate].iter().position(|&b| b == b'\n') {
        return Break::at(newline, newline + 1);
    }
    if fits {
        return Break::at(candidate, candidate);
    }

    // `candidate < len` here, so the byte right after the prefix is readable.
    // Index 0 never counts: breaking there would emit nothing.
    if let Some(space) = (1..=candidate).rev().find(|&i| is_separator(bytes[i])) {
        return Break::at(space, space + 1);
    }

    trace!(
        "No break point within {}px, emitting the whole token unsplit",
        budget
    );
    match (1..bytes.len()).find(|&i| is_separator(bytes[i])) {
        Some(end) => Break::at(end, end + 1),
        None => Break::at(remaining.len(), remaining.len()),
    }
}

/// Wraps `text` into display lines no wider than `budget` pixels, except for
/// single tokens that cannot be broken.
pub fn wrap<M: FontMetrics + ?Sized>(text: &str, budget: u32, metrics: &M) -> Vec<DisplayLine> {
    let mut lines = Vec::new();
    let mut rest = text;

    loop {
        let brk = next_break(rest, budget, metrics);
        if brk.consumed == 0 {
            break;
        }
        lines.push(DisplayLine::new(&rest[..brk.line_len]));
        rest = &rest[brk.consumed..];
    }

    trace!("Wrapped {} bytes into {} lines", text.len(), lines.len());
    lines
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every code point is `advance` pixels wide.
    pub(crate) struct MonoMetrics {
        pub advance: u32,
    }

    impl FontMetrics for MonoMetrics {
        fn text_width(&self, text: &str) -> u32 {
            text.chars().count() as u32 * self.advance
        }
        fn max_advance_width(&self) -> u32 {
            self.advance
        }
        fn ascent(&self) -> i32 {
            12
        }
        fn descent(&self) -> i32 {
            3
        }
    }

    /// Narrow ASCII, wide everything else, and a max advance that lies low so
    /// the initial estimate over-shoots.
    struct ProportionalMetrics;

    impl ProportionalMetrics {
        fn char_width(c: char) -> u32 {
            match c {
                'i' | 'l' | ' ' => 4,
                c if c.is_ascii() => 8,
                _ => 14,
            }
        }
    }

    impl FontMetrics for ProportionalMetrics {
        fn text_width(&self, text: &str) -> u32 {
            text.chars().map(Self::char_width).sum()
        }
        fn max_advance_width(&self) -> u32 {
            6
        }
        fn ascent(&self) -> i32 {
            10
        }
        fn descent(&self) -> i32 {
            2
        }
    }

    /// Reports widths modulo 65536 the way Xft's 16-bit extents do.
    struct SixteenBitMetrics;

    impl FontMetrics for SixteenBitMetrics {
        fn text_width(&self, text: &str) -> u32 {
            (text.chars().count() as u32 * 10) as u16 as u32
        }
        fn max_advance_width(&self) -> u32 {
            10
        }
        fn ascent(&self) -> i32 {
            12
        }
        fn descent(&self) -> i32 {
            3
        }
    }

    fn strings(lines: &[DisplayLine]) -> Vec<&str> {
        lines.iter().map(DisplayLine::as_str).collect()
    }

    #[test_log::test]
    fn text_height_is_ascent_minus_descent() {
        assert_eq!(MonoMetrics { advance: 10 }.text_height(), 9);
        assert_eq!(ProportionalMetrics.text_height(), 8);
    }

    #[test_log::test]
    fn short_text_stays_on_one_line() {
        let lines = wrap("hello world", 200, &MonoMetrics { advance: 10 });
        assert_eq!(strings(&lines), vec!["hello world"]);
    }

    #[test_log::test]
    fn newline_forces_a_break_regardless_of_budget() {
        for budget in [20, 100, 10_000] {
            let lines = wrap("a\nb", budget, &MonoMetrics { advance: 10 });
            assert_eq!(strings(&lines), vec!["a", "b"], "budget {}", budget);
        }
    }

    #[test_log::test]
    fn newline_break_lands_on_its_offset() {
        let brk = next_break("abc\ndef ghi", 1000, &MonoMetrics { advance: 10 });
        assert_eq!(brk, Break::at(3, 4));
    }

    #[test_log::test]
    fn consecutive_newlines_produce_an_empty_line() {
        let lines = wrap("a\n\nb", 100, &MonoMetrics { advance: 10 });
        assert_eq!(strings(&lines), vec!["a", "", "b"]);
    }

    #[test_log::test]
    fn oversized_token_is_emitted_unsplit() {
        let token = "x".repeat(50);
        let lines = wrap(&token, 100, &MonoMetrics { advance: 10 });
        assert_eq!(strings(&lines), vec![token.as_str()]);
    }

    #[test_log::test]
    fn oversized_token_between_words_gets_its_own_line() {
        let text = "tiny abcdefghijklmnop end";
        let lines = wrap(text, 80, &MonoMetrics { advance: 10 });
        assert_eq!(strings(&lines), vec!["tiny", "abcdefghijklmnop", "end"]);
    }

    #[test_log::test]
    fn wraps_at_last_space_that_fits() {
        let lines = wrap("the quick brown fox jumps", 100, &MonoMetrics { advance: 10 });
        assert_eq!(strings(&lines), vec!["the quick", "brown fox", "jumps"]);
    }

    #[test_log::test]
    fn exact_width_line_is_accepted_and_separator_dropped() {
        let brk = next_break("abcde fgh", 50, &MonoMetrics { advance: 10 });
        assert_eq!(brk, Break::at(5, 6));
    }

    #[test_log::test]
    fn newline_right_after_fitting_prefix_breaks_there() {
        let lines = wrap("abcde\nfg", 50, &MonoMetrics { advance: 10 });
        assert_eq!(strings(&lines), vec!["abcde", "fg"]);
    }

    #[test_log::test]
    fn leading_space_is_not_a_break_point() {
        let brk = next_break(" abcdefgh", 40, &MonoMetrics { advance: 10 });
        assert_eq!(brk, Break::at(9, 9));
    }

    #[test_log::test]
    fn empty_text_has_no_lines() {
        assert!(wrap("", 100, &MonoMetrics { advance: 10 }).is_empty());
        assert_eq!(next_break("", 100, &MonoMetrics { advance: 10 }), Break::END);
    }

    #[test_log::test]
    fn lines_fit_budget_unless_single_token() {
        let metrics = ProportionalMetrics;
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing élit, séd dö eiusmod \
                    tempor incididunt ut labore et dolore magna aliqua. Ünïcödé wörds façade";
        let budget = 120;
        let lines = wrap(text, budget, &metrics);
        assert!(lines.len() > 1);
        for line in &lines {
            let width = metrics.text_width(line.as_str());
            assert!(
                width <= budget || !line.as_str().contains(' '),
                "line {:?} is {}px",
                line.as_str(),
                width
            );
        }
    }

    #[test_log::test]
    fn very_long_text_still_wraps_with_sixteen_bit_widths() {
        // 13119 chars at 10px is 131190px, which 16 bits report as 118px.
        let text = "a ".repeat(6560);
        let text = text.trim_end();
        let lines = wrap(text, 420, &SixteenBitMetrics);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.as_str().chars().count() <= 42, "{:?}", line.as_str());
        }
        assert_eq!(strings(&lines).join(" "), text);
    }

    #[test_log::test]
    fn joining_lines_restores_text_modulo_newlines() {
        let metrics = ProportionalMetrics;
        let text = "über naïve café\nrésumé with a few more words to wrap around the box \
                    and a verylongunbreakabletokenthatoverflows then more";
        let lines = wrap(text, 90, &metrics);
        let joined = strings(&lines).join(" ");
        assert_eq!(joined, text.replace('\n', " "));
    }

    #[test_log::test]
    fn breaks_never_split_a_code_point() {
        let metrics = ProportionalMetrics;
        let text = "ééééé ààààà ööööö üüüüü ñññññ ééééé";
        let mut rest = text;
        for budget in [30, 45, 71, 100] {
            while !rest.is_empty() {
                let brk = next_break(rest, budget, &metrics);
                assert!(rest.is_char_boundary(brk.line_len));
                assert!(rest.is_char_boundary(brk.consumed));
                assert!(brk.consumed > 0);
                rest = &rest[brk.consumed..];
            }
            rest = text;
        }
    }

    #[test_log::test]
    fn over_estimated_start_converges_back_under_budget() {
        // max_advance_width says 6px but most glyphs are 8px: the estimate of
        // 60 / 6 = 10 chars is 76px and must walk back to 7 chars.
        let metrics = ProportionalMetrics;
        let brk = next_break("abcdefghijklmnop qr", 60, &metrics);
        // No space inside the fitting prefix, so the token is emitted whole.
        assert_eq!(brk, Break::at(16, 17));

        let brk = next_break("abc defghijklmnop", 60, &metrics);
        assert_eq!(brk, Break::at(3, 4));
    }
}
