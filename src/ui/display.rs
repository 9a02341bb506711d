//! ui::display
//!
//! The display layer: notifications, menus, free-text input, yes/no
//! questions and checklists.
//!
//! # Design
//!
//! The display is constructed once in `cli::run` and handed to everything that
//! needs to talk to the operator through [`crate::engine::Context`]. Nothing
//! looks it up globally.
//!
//! Two implementations exist:
//! - [`FileDisplay`]: line-oriented prompts on a reader/writer pair (stdin and
//!   stdout in production), every read bounded by a timeout
//! - [`NoninteractiveDisplay`]: prints notifications, refuses to ask questions
//!   unless a default answer is available
//!
//! Methods take `&self`; implementations keep their streams behind `RefCell`
//! since the process is single-threaded.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Stdout, Write};
use std::os::fd::AsRawFd;
use std::time::Duration;

use thiserror::Error;

use super::input::{input_with_timeout, stdin_handle, InputError, DEFAULT_INPUT_TIMEOUT};
use super::text::{parens_around_char, separate_list_input, wrap_lines};

/// Errors from the display layer.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Reading the operator's answer failed (timeout, closed input, I/O).
    #[error(transparent)]
    Input(#[from] InputError),

    /// Writing to the output stream failed.
    #[error("display output error: {0}")]
    Output(#[from] io::Error),

    /// A question was asked while running non-interactively.
    #[error("cannot prompt in non-interactive mode: {0}")]
    NotInteractive(String),
}

/// The operator's answer to a cancellable prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    /// The operator answered.
    Ok(T),
    /// The operator cancelled the prompt.
    Cancel,
}

impl<T> Answer<T> {
    /// Convert into an `Option`, mapping `Cancel` to `None`.
    pub fn ok(self) -> Option<T> {
        match self {
            Answer::Ok(value) => Some(value),
            Answer::Cancel => None,
        }
    }
}

/// Operator-facing display contract.
pub trait Display {
    /// Show a message. When `pause` is set, wait for the operator to
    /// acknowledge it.
    fn notification(&self, message: &str, pause: bool) -> Result<(), DisplayError>;

    /// Let the operator pick one of `choices`. Returns the chosen index.
    fn menu(&self, message: &str, choices: &[String]) -> Result<Answer<usize>, DisplayError>;

    /// Ask for free text.
    fn input(&self, message: &str) -> Result<Answer<String>, DisplayError>;

    /// Ask a yes/no question. `default` is used on a blank answer and when no
    /// question can be asked.
    fn yesno(
        &self,
        message: &str,
        yes_label: &str,
        no_label: &str,
        default: Option<bool>,
    ) -> Result<bool, DisplayError>;

    /// Let the operator pick any subset of `tags`.
    fn checklist(&self, message: &str, tags: &[String])
        -> Result<Answer<Vec<String>>, DisplayError>;
}

const SIDE_FRAME: &str =
    "-------------------------------------------------------------------------------";

/// Line-oriented display on a reader/writer pair.
#[derive(Debug)]
pub struct FileDisplay<R, W> {
    reader: RefCell<R>,
    out: RefCell<W>,
    timeout: Duration,
}

impl FileDisplay<File, Stdout> {
    /// Display on the process's stdin/stdout with the default input timeout.
    pub fn stdio() -> io::Result<Self> {
        Ok(Self::new(stdin_handle()?, io::stdout(), DEFAULT_INPUT_TIMEOUT))
    }
}

impl<R: Read + AsRawFd, W: Write> FileDisplay<R, W> {
    /// Create a display over the given streams.
    pub fn new(reader: R, out: W, timeout: Duration) -> Self {
        Self {
            reader: RefCell::new(reader),
            out: RefCell::new(out),
            timeout,
        }
    }

    /// Consume the display and return the output stream.
    pub fn into_output(self) -> W {
        self.out.into_inner()
    }

    fn write(&self, text: &str) -> Result<(), DisplayError> {
        let mut out = self.out.borrow_mut();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn ask(&self, prompt: &str) -> Result<String, DisplayError> {
        self.write(prompt)?;
        let line = input_with_timeout(&mut *self.reader.borrow_mut(), self.timeout)?;
        Ok(line.trim().to_string())
    }

    fn print_choices(&self, message: &str, choices: &[String]) -> Result<(), DisplayError> {
        let mut text = format!("\n{}\n{}\n", wrap_lines(message), SIDE_FRAME);
        for (i, choice) in choices.iter().enumerate() {
            text.push_str(&wrap_lines(&format!("{}: {}", i + 1, choice)));
            text.push('\n');
        }
        text.push_str(SIDE_FRAME);
        text.push('\n');
        self.write(&text)
    }

    fn invalid(&self) -> Result<(), DisplayError> {
        self.write("** Invalid input **\n")
    }
}

fn is_cancel(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("c")
}

/// Parse a 1-based selection into a 0-based index.
fn parse_index(answer: &str, len: usize) -> Option<usize> {
    match answer.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => None,
    }
}

impl<R: Read + AsRawFd, W: Write> Display for FileDisplay<R, W> {
    fn notification(&self, message: &str, pause: bool) -> Result<(), DisplayError> {
        self.write(&format!(
            "\n{}\n{}\n{}\n",
            SIDE_FRAME,
            wrap_lines(message),
            SIDE_FRAME
        ))?;
        if pause {
            self.ask("Press Enter to Continue")?;
        }
        Ok(())
    }

    fn menu(&self, message: &str, choices: &[String]) -> Result<Answer<usize>, DisplayError> {
        self.print_choices(message, choices)?;
        let prompt = format!(
            "Select the appropriate number [1-{}] then [enter] (press 'c' to cancel): ",
            choices.len()
        );
        loop {
            let answer = self.ask(&prompt)?;
            if is_cancel(&answer) {
                return Ok(Answer::Cancel);
            }
            match parse_index(&answer, choices.len()) {
                Some(index) => return Ok(Answer::Ok(index)),
                None => self.invalid()?,
            }
        }
    }

    fn input(&self, message: &str) -> Result<Answer<String>, DisplayError> {
        let answer = self.ask(&format!("{} (Enter 'c' to cancel): ", wrap_lines(message)))?;
        if is_cancel(&answer) {
            Ok(Answer::Cancel)
        } else {
            Ok(Answer::Ok(answer))
        }
    }

    fn yesno(
        &self,
        message: &str,
        yes_label: &str,
        no_label: &str,
        default: Option<bool>,
    ) -> Result<bool, DisplayError> {
        self.write(&format!("\n{}\n{}\n", SIDE_FRAME, wrap_lines(message)))?;
        let prompt = format!(
            "{}/{}: ",
            parens_around_char(yes_label),
            parens_around_char(no_label)
        );
        let matches = |answer: &str, label: &str| {
            answer
                .chars()
                .next()
                .zip(label.chars().next())
                .is_some_and(|(a, l)| a.eq_ignore_ascii_case(&l))
        };

        loop {
            let answer = self.ask(&prompt)?;
            if answer.is_empty() {
                if let Some(default) = default {
                    return Ok(default);
                }
            } else if matches(&answer, yes_label) {
                return Ok(true);
            } else if matches(&answer, no_label) {
                return Ok(false);
            }
            self.invalid()?;
        }
    }

    fn checklist(
        &self,
        message: &str,
        tags: &[String],
    ) -> Result<Answer<Vec<String>>, DisplayError> {
        self.print_choices(message, tags)?;
        let prompt = "Select the appropriate numbers separated by commas and/or spaces, \
                      or leave input blank to select all options shown (Enter 'c' to cancel): ";
        loop {
            let answer = self.ask(prompt)?;
            if is_cancel(&answer) {
                return Ok(Answer::Cancel);
            }
            if answer.is_empty() {
                return Ok(Answer::Ok(tags.to_vec()));
            }

            let indices: Option<Vec<usize>> = separate_list_input(&answer)
                .iter()
                .map(|s| parse_index(s, tags.len()))
                .collect();
            match indices {
                Some(mut indices) => {
                    indices.sort_unstable();
                    indices.dedup();
                    return Ok(Answer::Ok(indices.into_iter().map(|i| tags[i].clone()).collect()));
                }
                None => self.invalid()?,
            }
        }
    }
}

/// Display that never blocks on the operator.
///
/// Notifications are printed; any question without a usable default fails
/// with [`DisplayError::NotInteractive`].
#[derive(Debug)]
pub struct NoninteractiveDisplay<W> {
    out: RefCell<W>,
}

impl NoninteractiveDisplay<Stdout> {
    /// Non-interactive display writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> NoninteractiveDisplay<W> {
    /// Create a non-interactive display writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    /// Consume the display and return the output stream.
    pub fn into_output(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> Display for NoninteractiveDisplay<W> {
    fn notification(&self, message: &str, _pause: bool) -> Result<(), DisplayError> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "\n{}\n{}\n{}", SIDE_FRAME, wrap_lines(message), SIDE_FRAME)?;
        out.flush()?;
        Ok(())
    }

    fn menu(&self, message: &str, _choices: &[String]) -> Result<Answer<usize>, DisplayError> {
        Err(DisplayError::NotInteractive(message.to_string()))
    }

    fn input(&self, message: &str) -> Result<Answer<String>, DisplayError> {
        Err(DisplayError::NotInteractive(message.to_string()))
    }

    fn yesno(
        &self,
        message: &str,
        _yes_label: &str,
        _no_label: &str,
        default: Option<bool>,
    ) -> Result<bool, DisplayError> {
        default.ok_or_else(|| DisplayError::NotInteractive(message.to_string()))
    }

    fn checklist(
        &self,
        message: &str,
        _tags: &[String],
    ) -> Result<Answer<Vec<String>>, DisplayError> {
        Err(DisplayError::NotInteractive(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixStream;

    /// Build a display whose input is pre-loaded with `answers`.
    fn scripted(answers: &str) -> (FileDisplay<UnixStream, Vec<u8>>, UnixStream) {
        let (mut writer, reader) = UnixStream::pair().expect("socket pair");
        writer.write_all(answers.as_bytes()).unwrap();
        (
            FileDisplay::new(reader, Vec::new(), Duration::from_secs(5)),
            writer,
        )
    }

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn menu_returns_zero_based_index() {
        let (display, _w) = scripted("2\n");
        let answer = display.menu("Pick one", &choices(&["a", "b", "c"])).unwrap();
        assert_eq!(answer, Answer::Ok(1));
    }

    #[test]
    fn menu_reprompts_on_invalid_input() {
        let (display, _w) = scripted("9\nfoo\n1\n");
        let answer = display.menu("Pick one", &choices(&["a", "b"])).unwrap();
        assert_eq!(answer, Answer::Ok(0));

        let output = String::from_utf8(display.into_output()).unwrap();
        assert_eq!(output.matches("Invalid input").count(), 2);
    }

    #[test]
    fn menu_cancel() {
        let (display, _w) = scripted("c\n");
        let answer = display.menu("Pick one", &choices(&["a"])).unwrap();
        assert_eq!(answer, Answer::Cancel);
    }

    #[test]
    fn input_returns_text_or_cancel() {
        let (display, _w) = scripted("example.com\nC\n");
        assert_eq!(
            display.input("Domain?").unwrap(),
            Answer::Ok("example.com".to_string())
        );
        assert_eq!(display.input("Domain?").unwrap(), Answer::Cancel);
    }

    #[test]
    fn yesno_matches_first_letter() {
        let (display, _w) = scripted("y\nNo\n");
        assert!(display.yesno("Continue?", "Yes", "No", None).unwrap());
        assert!(!display.yesno("Continue?", "Yes", "No", None).unwrap());
    }

    #[test]
    fn yesno_blank_uses_default() {
        let (display, _w) = scripted("\n");
        assert!(!display.yesno("Redirect?", "Redirect", "Easy", Some(false)).unwrap());
    }

    #[test]
    fn yesno_prints_labels_with_parens() {
        let (display, _w) = scripted("e\n");
        assert!(!display.yesno("Redirect?", "Redirect", "Easy", None).unwrap());
        let output = String::from_utf8(display.into_output()).unwrap();
        assert!(output.contains("(R)edirect/(E)asy"));
    }

    #[test]
    fn checklist_blank_selects_all() {
        let (display, _w) = scripted("\n");
        let tags = choices(&["a.com", "b.com"]);
        assert_eq!(display.checklist("Names", &tags).unwrap(), Answer::Ok(tags));
    }

    #[test]
    fn checklist_selects_subset_in_order() {
        let (display, _w) = scripted("3, 1 3\n");
        let tags = choices(&["a.com", "b.com", "c.com"]);
        assert_eq!(
            display.checklist("Names", &tags).unwrap(),
            Answer::Ok(choices(&["a.com", "c.com"]))
        );
    }

    #[test]
    fn timeout_propagates_as_error() {
        let (reader_end, _writer_end) = UnixStream::pair().expect("socket pair");
        let display = FileDisplay::new(reader_end, Vec::new(), Duration::from_millis(20));
        let result = display.input("Domain?");
        assert!(matches!(
            result,
            Err(DisplayError::Input(InputError::Timeout(_)))
        ));
    }

    #[test]
    fn notification_wraps_message() {
        let (display, _w) = scripted("");
        display.notification(&"word ".repeat(40), false).unwrap();
        let output = String::from_utf8(display.into_output()).unwrap();
        assert!(output.lines().all(|l| l.chars().count() <= 80));
    }

    #[test]
    fn noninteractive_refuses_questions() {
        let display = NoninteractiveDisplay::new(Vec::new());
        assert!(matches!(
            display.input("Domain?"),
            Err(DisplayError::NotInteractive(_))
        ));
        assert!(matches!(
            display.menu("Pick", &choices(&["a"])),
            Err(DisplayError::NotInteractive(_))
        ));
        assert!(display.yesno("Redirect?", "Yes", "No", Some(true)).unwrap());
        assert!(display.yesno("Redirect?", "Yes", "No", None).is_err());
    }

    #[test]
    fn noninteractive_prints_notifications() {
        let display = NoninteractiveDisplay::new(Vec::new());
        display.notification("Congratulations!", true).unwrap();
        let output = String::from_utf8(display.into_output()).unwrap();
        assert!(output.contains("Congratulations!"));
    }
}
