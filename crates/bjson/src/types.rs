//! Status codes, the sticky `Result` alias, and the decoder's
//! callback-control signal.

use core::fmt;

/// Mirrors `bjson_status_t`. `Ok` only ever appears as the initial
/// state or a successful return; once any other variant is latched
/// into a decoder/encoder's status field it stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    CanceledByClient,
    NotImplemented,
    InvalidDataType,
    UnexpectedEndOfStream,
    UnhandledDecodeStage,
    TooManyNestedContainers,
    OutOfMemory,
    InvalidObjectKey,
    UnclosedMap,
    UnclosedArray,
    KeyWithoutValue,
    MoreDataThanDeclared,
    EmptyInputPassed,
    CloseMapButArrayOpen,
    CloseArrayButMapOpen,
    CloseMapAtRootLevel,
    CloseArrayAtRootLevel,
    NegativeSize,
}

impl Status {
    /// Short status text, matching `bjson_getStatusAsText`.
    pub const fn as_text(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::CanceledByClient => "decode canceled via callback return value",
            Status::NotImplemented => "not implemented",
            Status::InvalidDataType => "invalid data type",
            Status::UnexpectedEndOfStream => "unexpected end of stream",
            Status::UnhandledDecodeStage => "unhandled decode stage",
            Status::TooManyNestedContainers => "too many nested containers",
            Status::OutOfMemory => "out of memory",
            Status::InvalidObjectKey => "invalid object key",
            Status::UnclosedMap => "unclosed map",
            Status::UnclosedArray => "unclosed array",
            Status::KeyWithoutValue => "missing value after object key",
            Status::MoreDataThanDeclared => "more data than declared",
            Status::EmptyInputPassed => "empty input passed",
            Status::CloseMapButArrayOpen => "going to close map but array open",
            Status::CloseArrayButMapOpen => "going to close array but map open",
            Status::CloseMapAtRootLevel => "going to close map at root level",
            Status::CloseArrayAtRootLevel => "going to close array at root level",
            Status::NegativeSize => "going to encode negative size value",
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

impl std::error::Error for Status {}

pub type Result<T> = std::result::Result<T, Status>;

/// Returned by every `TokenSink` callback; `Abort` latches
/// `Status::CanceledByClient` and stops the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Abort,
}
