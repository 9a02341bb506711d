//! ui::text
//!
//! Pure text helpers used by the display layer.
//!
//! # Design
//!
//! These functions take immutable inputs and return formatted strings. They
//! have no side effects and never touch the terminal.
//!
//! # Example
//!
//! ```
//! use certward::ui::text::summarize_domain_list;
//!
//! assert_eq!(summarize_domain_list(&["a.com", "b.com"]), "a.com and b.com");
//! assert_eq!(
//!     summarize_domain_list(&["a.com", "b.com", "c.com"]),
//!     "a.com and 2 more domains"
//! );
//! ```

/// Column limit used by [`wrap_lines`].
pub const WRAP_WIDTH: usize = 80;

/// Wrap every newline-separated segment of `msg` to [`WRAP_WIDTH`] columns.
///
/// Explicit newlines are kept. Segments that already fit are returned
/// unchanged. Longer segments are re-flowed on whitespace only: words are never
/// split, not even on hyphens, so a word longer than the limit ends up alone on
/// its own line.
pub fn wrap_lines(msg: &str) -> String {
    msg.lines()
        .map(wrap_segment)
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_segment(segment: &str) -> String {
    if segment.chars().count() <= WRAP_WIDTH {
        return segment.to_string();
    }

    let mut filler = Filler::default();
    let mut word = String::new();
    let mut gap = String::new();

    for c in segment.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                filler.place(&gap, &word);
                word.clear();
                gap.clear();
            }
            gap.push(c);
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        filler.place(&gap, &word);
    }

    filler.finish()
}

/// Greedy line filler. The whitespace before a word is kept when the word
/// stays on the same line and dropped at a break.
#[derive(Default)]
struct Filler {
    lines: Vec<String>,
    current: String,
    current_len: usize,
}

impl Filler {
    fn place(&mut self, gap: &str, word: &str) {
        let word_len = word.chars().count();
        let gap_len = gap.chars().count();

        if self.current_len == 0 {
            // Leading indentation of the segment survives; later breaks drop it.
            if self.lines.is_empty() {
                self.current.push_str(gap);
                self.current_len = gap_len;
            }
            self.current.push_str(word);
            self.current_len += word_len;
        } else if self.current_len + gap_len + word_len <= WRAP_WIDTH {
            self.current.push_str(gap);
            self.current.push_str(word);
            self.current_len += gap_len + word_len;
        } else {
            self.lines.push(std::mem::take(&mut self.current));
            self.current.push_str(word);
            self.current_len = word_len;
        }
    }

    fn finish(mut self) -> String {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines.join("\n")
    }
}

/// Summarize a list of domains for a one-line message.
///
/// - no domains: `""`
/// - one: `"example.com"`
/// - two: `"example.com and www.example.com"`
/// - more: `"example.com and N more domains"`
pub fn summarize_domain_list<S: AsRef<str>>(domains: &[S]) -> String {
    match domains {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [first, rest @ ..] => format!("{} and {} more domains", first.as_ref(), rest.len()),
    }
}

/// Split user input on commas and whitespace.
///
/// Empty fragments are dropped, so `"a.com, b.com ,,c.com"` yields three
/// entries.
pub fn separate_list_input(input: &str) -> Vec<String> {
    input
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Place parens around the first character of `label`: `"Yes"` → `"(Y)es"`.
///
/// An empty label is returned unchanged.
pub fn parens_around_char(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => format!("({}){}", first, chars.as_str()),
        None => String::new(),
    }
}
