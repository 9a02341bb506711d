//! ui::scripted
//!
//! A [`Display`] that answers from a script.
//!
//! # Design
//!
//! Tests queue the operator's replies up front and inspect the transcript
//! afterwards. A question with no matching reply queued fails the same way a
//! non-interactive display does, so a test that forgets a reply sees the
//! error the production code would.
//!
//! # Example
//!
//! ```
//! use certward::ui::scripted::{Prompt, Reply, ScriptedDisplay};
//! use certward::ui::{Answer, Display};
//!
//! let display = ScriptedDisplay::new(vec![Reply::Input(Answer::Ok("me@example.com".into()))]);
//! let answer = display.input("Enter email address").unwrap();
//! assert_eq!(answer, Answer::Ok("me@example.com".to_string()));
//! assert_eq!(display.transcript(), vec![Prompt::Input("Enter email address".to_string())]);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use super::display::{Answer, Display, DisplayError};

/// A queued reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Menu(Answer<usize>),
    Input(Answer<String>),
    YesNo(bool),
    Checklist(Answer<Vec<String>>),
}

/// Something the display was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Notification(String),
    Menu { message: String, choices: Vec<String> },
    Input(String),
    YesNo(String),
    Checklist { message: String, tags: Vec<String> },
}

/// Display answering from a queue of [`Reply`]s.
#[derive(Debug, Default)]
pub struct ScriptedDisplay {
    replies: RefCell<VecDeque<Reply>>,
    transcript: RefCell<Vec<Prompt>>,
}

impl ScriptedDisplay {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            transcript: RefCell::new(Vec::new()),
        }
    }

    /// Everything shown or asked so far, in order.
    pub fn transcript(&self) -> Vec<Prompt> {
        self.transcript.borrow().clone()
    }

    /// Number of questions asked (notifications excluded).
    pub fn questions_asked(&self) -> usize {
        self.transcript
            .borrow()
            .iter()
            .filter(|p| !matches!(p, Prompt::Notification(_)))
            .count()
    }

    /// Notification texts shown so far.
    pub fn notifications(&self) -> Vec<String> {
        self.transcript
            .borrow()
            .iter()
            .filter_map(|p| match p {
                Prompt::Notification(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }

    fn next(&self, prompt: Prompt, message: &str) -> Result<Reply, DisplayError> {
        self.transcript.borrow_mut().push(prompt);
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| DisplayError::NotInteractive(message.to_string()))
    }
}

fn unexpected(message: &str, reply: Reply) -> DisplayError {
    DisplayError::NotInteractive(format!("{} (scripted reply was {:?})", message, reply))
}

impl Display for ScriptedDisplay {
    fn notification(&self, message: &str, _pause: bool) -> Result<(), DisplayError> {
        self.transcript
            .borrow_mut()
            .push(Prompt::Notification(message.to_string()));
        Ok(())
    }

    fn menu(&self, message: &str, choices: &[String]) -> Result<Answer<usize>, DisplayError> {
        let prompt = Prompt::Menu {
            message: message.to_string(),
            choices: choices.to_vec(),
        };
        match self.next(prompt, message)? {
            Reply::Menu(answer) => Ok(answer),
            other => Err(unexpected(message, other)),
        }
    }

    fn input(&self, message: &str) -> Result<Answer<String>, DisplayError> {
        match self.next(Prompt::Input(message.to_string()), message)? {
            Reply::Input(answer) => Ok(answer),
            other => Err(unexpected(message, other)),
        }
    }

    fn yesno(
        &self,
        message: &str,
        _yes_label: &str,
        _no_label: &str,
        default: Option<bool>,
    ) -> Result<bool, DisplayError> {
        let prompt = Prompt::YesNo(message.to_string());
        if self.replies.borrow().is_empty() {
            if let Some(default) = default {
                self.transcript.borrow_mut().push(prompt);
                return Ok(default);
            }
        }
        match self.next(prompt, message)? {
            Reply::YesNo(answer) => Ok(answer),
            other => Err(unexpected(message, other)),
        }
    }

    fn checklist(
        &self,
        message: &str,
        tags: &[String],
    ) -> Result<Answer<Vec<String>>, DisplayError> {
        let prompt = Prompt::Checklist {
            message: message.to_string(),
            tags: tags.to_vec(),
        };
        match self.next(prompt, message)? {
            Reply::Checklist(answer) => Ok(answer),
            other => Err(unexpected(message, other)),
        }
    }
}
