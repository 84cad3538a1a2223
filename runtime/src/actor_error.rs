use std::fmt::{self, Display};

use fvm_shared::error::ExitCode;
use thiserror::Error;

/// Exit code for a miner created with too little pledge or collateral.
pub const ERR_PLEDGE_TOO_LOW: ExitCode = ExitCode::new(32);
/// Exit code for a miner public key longer than the policy allows.
pub const ERR_PUBLIC_KEY_TOO_BIG: ExitCode = ExitCode::new(33);
/// Legacy system exit code 3 (invalid method); fvm_shared 3.x reserves it without a name.
const SYS_INVALID_METHOD: ExitCode = ExitCode::new(3);

/// The kind of failure a message or invocation ended with.
///
/// Exit codes are what travel in receipts; the kind is what callers match on.
/// Several exit codes may share a kind (e.g. the system and user variants of
/// insufficient funds).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NonceMismatch,
    InsufficientFunds,
    PledgeTooLow,
    PublicKeyTooBig,
    UnknownMethod,
    Unauthorized,
    ActorNotFound,
    IllegalArgument,
    Serialization,
    IllegalState,
}

impl ErrorKind {
    pub fn from_exit_code(code: ExitCode) -> Self {
        match code {
            ExitCode::SYS_SENDER_STATE_INVALID => ErrorKind::NonceMismatch,
            ExitCode::SYS_INSUFFICIENT_FUNDS | ExitCode::USR_INSUFFICIENT_FUNDS => {
                ErrorKind::InsufficientFunds
            }
            ERR_PLEDGE_TOO_LOW => ErrorKind::PledgeTooLow,
            ERR_PUBLIC_KEY_TOO_BIG => ErrorKind::PublicKeyTooBig,
            ExitCode::USR_UNHANDLED_MESSAGE | SYS_INVALID_METHOD => {
                ErrorKind::UnknownMethod
            }
            ExitCode::USR_FORBIDDEN => ErrorKind::Unauthorized,
            ExitCode::SYS_SENDER_INVALID
            | ExitCode::SYS_INVALID_RECEIVER
            | ExitCode::USR_NOT_FOUND => ErrorKind::ActorNotFound,
            ExitCode::USR_ILLEGAL_ARGUMENT => ErrorKind::IllegalArgument,
            ExitCode::USR_SERIALIZATION => ErrorKind::Serialization,
            _ => ErrorKind::IllegalState,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NonceMismatch => "nonce mismatch",
            ErrorKind::InsufficientFunds => "not enough balance",
            ErrorKind::PledgeTooLow => "pledge must be at least the minimum",
            ErrorKind::PublicKeyTooBig => "public key is too big",
            ErrorKind::UnknownMethod => "actor does not export method",
            ErrorKind::Unauthorized => "not authorized",
            ErrorKind::ActorNotFound => "actor not found",
            ErrorKind::IllegalArgument => "illegal argument",
            ErrorKind::Serialization => "serialization error",
            ErrorKind::IllegalState => "illegal state",
        };
        f.write_str(s)
    }
}

/// The error type returned by actor method calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ActorError(exit_code: {exit_code:?}, msg: {msg})")]
pub struct ActorError {
    /// The exit code for this invocation.
    exit_code: ExitCode,
    /// Message for debugging purposes,
    msg: String,
}

impl ActorError {
    /// Creates a new ActorError. This method does not check that the code is in the
    /// range of valid actor abort codes.
    pub fn unchecked(code: ExitCode, msg: String) -> Self {
        Self { exit_code: code, msg }
    }

    pub fn illegal_argument(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_ILLEGAL_ARGUMENT, msg }
    }
    pub fn not_found(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_NOT_FOUND, msg }
    }
    pub fn forbidden(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_FORBIDDEN, msg }
    }
    pub fn insufficient_funds(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_INSUFFICIENT_FUNDS, msg }
    }
    pub fn illegal_state(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_ILLEGAL_STATE, msg }
    }
    pub fn serialization(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_SERIALIZATION, msg }
    }
    pub fn unhandled_message(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_UNHANDLED_MESSAGE, msg }
    }
    pub fn assertion_failed(msg: String) -> Self {
        Self { exit_code: ExitCode::USR_ASSERTION_FAILED, msg }
    }
    pub fn pledge_too_low(msg: String) -> Self {
        Self { exit_code: ERR_PLEDGE_TOO_LOW, msg }
    }
    pub fn public_key_too_big(msg: String) -> Self {
        Self { exit_code: ERR_PUBLIC_KEY_TOO_BIG, msg }
    }

    /// Returns the exit code of the error.
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// The error kind this exit code maps to.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_exit_code(self.exit_code)
    }

    /// Error message of the actor error.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Prefix error message with a string message.
    pub fn wrap(mut self, msg: impl AsRef<str>) -> Self {
        self.msg = format!("{}: {}", msg.as_ref(), self.msg);
        self
    }
}

/// Converts a raw encoding error into an ErrSerialization.
impl From<fvm_ipld_encoding::Error> for ActorError {
    fn from(e: fvm_ipld_encoding::Error) -> Self {
        Self { exit_code: ExitCode::USR_SERIALIZATION, msg: e.to_string() }
    }
}

/// Convenience macro for generating Actor Errors
#[macro_export]
macro_rules! actor_error {
    // Error with only one stringable expression
    ( $code:ident; $msg:expr ) => { $crate::ActorError::$code($msg.to_string()) };

    // String with positional arguments
    ( $code:ident; $msg:literal $(, $ex:expr)+ ) => {
        $crate::ActorError::$code(format!($msg, $($ex,)*))
    };

    // Error with only one stringable expression, with comma separator
    ( $code:ident, $msg:expr ) => { $crate::actor_error!($code; $msg) };

    // String with positional arguments, with comma separator
    ( $code:ident, $msg:literal $(, $ex:expr)+ ) => {
        $crate::actor_error!($code; $msg $(, $ex)*)
    };
}

// Adds context to an actor error's descriptive message.
pub trait ActorContext<T> {
    fn context<C>(self, context: C) -> Result<T, ActorError>
    where
        C: Display + 'static;

    fn with_context<C, F>(self, f: F) -> Result<T, ActorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C;
}

impl<T> ActorContext<T> for Result<T, ActorError> {
    fn context<C>(self, context: C) -> Result<T, ActorError>
    where
        C: Display + 'static,
    {
        self.map_err(|err| err.wrap(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ActorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.wrap(f().to_string()))
    }
}

// Adapts a target into an actor error.
pub trait AsActorError<T>: Sized {
    fn exit_code(self, code: ExitCode) -> Result<T, ActorError>;

    fn context_code<C>(self, code: ExitCode, context: C) -> Result<T, ActorError>
    where
        C: Display + 'static;

    fn with_context_code<C, F>(self, code: ExitCode, f: F) -> Result<T, ActorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Display> AsActorError<T> for Result<T, E> {
    fn exit_code(self, code: ExitCode) -> Result<T, ActorError> {
        self.map_err(|err| ActorError { exit_code: code, msg: err.to_string() })
    }

    fn context_code<C>(self, code: ExitCode, context: C) -> Result<T, ActorError>
    where
        C: Display + 'static,
    {
        self.map_err(|err| ActorError { exit_code: code, msg: format!("{}: {}", context, err) })
    }

    fn with_context_code<C, F>(self, code: ExitCode, f: F) -> Result<T, ActorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| ActorError { exit_code: code, msg: format!("{}: {}", f(), err) })
    }
}

impl<T> AsActorError<T> for Option<T> {
    fn exit_code(self, code: ExitCode) -> Result<T, ActorError> {
        self.ok_or_else(|| ActorError { exit_code: code, msg: "None".to_string() })
    }

    fn context_code<C>(self, code: ExitCode, context: C) -> Result<T, ActorError>
    where
        C: Display + 'static,
    {
        self.ok_or_else(|| ActorError { exit_code: code, msg: context.to_string() })
    }

    fn with_context_code<C, F>(self, code: ExitCode, f: F) -> Result<T, ActorError>
    where
        C: Display + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| ActorError { exit_code: code, msg: f().to_string() })
    }
}
