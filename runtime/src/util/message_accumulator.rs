use itertools::Itertools;
use std::{cell::RefCell, fmt::Display, rc::Rc};

use regex::Regex;

/// Collects invariant violations found while walking state.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    /// Shared with every accumulator derived through `with_prefix()`.
    msgs: Rc<RefCell<Vec<String>>>,
    prefix: String,
}

impl MessageAccumulator {
    /// Returns an accumulator writing to the same collection, prefixing each new message.
    pub fn with_prefix<S: AsRef<str>>(&self, prefix: S) -> Self {
        let prefix = self.prefix.to_owned() + prefix.as_ref();
        MessageAccumulator { msgs: self.msgs.clone(), prefix }
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.borrow().is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.msgs.borrow().to_owned()
    }

    pub fn add<S: AsRef<str>>(&self, msg: S) {
        self.msgs.borrow_mut().push(format!("{}{}", self.prefix, msg.as_ref()));
    }

    /// Adds messages from another accumulator to this one
    pub fn add_all(&self, other: &Self) {
        for msg in other.messages() {
            self.add(msg);
        }
    }

    /// Adds a message if predicate is false
    pub fn require<S: AsRef<str>>(&self, predicate: bool, msg: S) {
        if !predicate {
            self.add(msg);
        }
    }

    /// Adds a message if result is `Err`, otherwise hands back the value.
    pub fn require_no_error<V, E: Display, S: AsRef<str>>(
        &self,
        result: Result<V, E>,
        msg: S,
    ) -> Option<V> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add(format!("{}: {e}", msg.as_ref()));
                None
            }
        }
    }

    #[track_caller]
    pub fn assert_empty(&self) {
        assert!(self.is_empty(), "{}", self.messages().join("\n"))
    }

    /// Asserts the messages match the patterns, in order.
    #[track_caller]
    pub fn assert_expected(&self, expected_patterns: &[Regex]) {
        let messages = self.messages();
        assert!(
            messages.len() == expected_patterns.len(),
            "Incorrect number of accumulator messages. Actual: {}.\nExpected: {}",
            messages.join("\n"),
            expected_patterns.iter().map(|regex| regex.as_str()).join("\n")
        );

        for (message, pattern) in messages.iter().zip(expected_patterns) {
            assert!(
                pattern.is_match(message),
                "message does not match. Actual: {}, expected: {}",
                message,
                pattern.as_str()
            );
        }
    }
}
