//! Translator from the Hack VM stack language to Hack assembly.
//!
//! - `parser` turns a raw line into a `Command`.
//! - `translator` lowers each command to instructions, one generator per
//!   command family.
//! - `linker` runs modules through both in order and owns the state that has
//!   to be unique across the whole program.
//! - `io` holds the line source and sink seams plus input discovery.

pub mod ast;
pub mod error;
pub mod io;
pub mod linker;
pub mod parser;
pub mod translator;

pub use ast::{ArithmeticOp, Command, Segment};
pub use error::{CommandError, TranslateError, TranslateResult};
pub use linker::{LinkOptions, Linker};
pub use translator::{LabelCounters, LabelScope};

/// Translate a single module held in memory.
pub fn translate_str(
    module: &str,
    text: &str,
    options: LinkOptions,
) -> TranslateResult<Vec<String>> {
    let source = io::MemorySource::new().with_module(module, text);
    Linker::new(options).link(&source, &[module])
}
