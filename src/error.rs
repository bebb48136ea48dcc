//! Error kinds shared across the translation pipeline.
//!
//! `CommandError` describes what is wrong with a single command and knows
//! nothing about where it came from. `TranslateError` is what a run reports:
//! it pins command errors to a module and line, and covers the I/O edges.

use std::io;

use snafu::Snafu;

use crate::ast::Segment;

pub type CommandResult<T> = Result<T, CommandError>;
pub type TranslateResult<T> = Result<T, TranslateError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("unknown command `{keyword}`"))]
    UnknownCommand { keyword: String },

    #[snafu(display("unknown arithmetic operation `{op}`"))]
    UnknownArithmeticOp { op: String },

    #[snafu(display("unknown segment `{segment}`"))]
    UnknownSegment { segment: String },

    #[snafu(display("malformed command: {reason}"))]
    MalformedCommand { reason: String },

    #[snafu(display("index {index} is out of range for segment {segment} (max {max})"))]
    IndexOutOfRange {
        segment: Segment,
        index: u16,
        max: u16,
    },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranslateError {
    #[snafu(display("{module}:{line_number}: {source}\n    {line}"))]
    Line {
        module: String,
        line_number: usize,
        line: String,
        source: CommandError,
    },

    #[snafu(display("input module `{module}` not found: {source}"))]
    InputNotFound { module: String, source: io::Error },

    #[snafu(display("failed reading input module `{module}`: {source}"))]
    InputRead { module: String, source: io::Error },

    #[snafu(display(
        "module `{module}` maps to static namespace `{namespace}`, already used by `{existing}`"
    ))]
    NamespaceCollision {
        module: String,
        existing: String,
        namespace: String,
    },

    #[snafu(display("failed writing output to {destination}: {source}"))]
    OutputWriteFailure {
        destination: String,
        source: io::Error,
    },
}
