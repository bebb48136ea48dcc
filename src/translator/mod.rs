//! Lowering of VM commands into Hack assembly.
//!
//! Each submodule emits the instruction sequence for one command family.
//! `Translator` binds them to a single module: it knows the module's static
//! namespace, the enclosing function (for label scoping) and borrows the
//! run-wide `LabelCounters` so generated symbols stay unique across modules.

use std::fmt::Display;

use tracing::trace;

use crate::ast::{Command::*, *};
use crate::error::CommandResult;

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

pub mod arithmetic;
pub mod bootstrap;
pub mod branching;
pub mod calls;
pub mod memory;

fn at(target: impl Display) -> String {
    format!("@{}", target)
}

fn label_decl(symbol: impl Display) -> String {
    format!("({})", symbol)
}

/// Push the D register onto the stack.
fn push_d() -> Vec<String> {
    svec![
        "@SP",
        "M=M+1",
        "A=M-1", // Don't need to refetch SP; this is safe
        "M=D"
    ]
}

/// Pop the stack top into the D register.
fn pop_d() -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1", // SP--, A <- new SP (val to be popped)
        "D=M"
    ]
}

/// Run-wide sources of unique suffixes for generated symbols.
#[derive(Debug, Default)]
pub struct LabelCounters {
    comparisons: usize,
    calls: usize,
}

impl LabelCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_comparison(&mut self) -> usize {
        let tmp = self.comparisons;
        self.comparisons += 1;
        tmp
    }

    pub fn next_return(&mut self) -> usize {
        let tmp = self.calls;
        self.calls += 1;
        tmp
    }

    /// Number of comparison label pairs handed out so far.
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Number of return labels handed out so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

/// How authored `label`/`goto`/`if-goto` names map to assembly symbols.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LabelScope {
    /// Names are emitted verbatim. Two functions in one module reusing a
    /// label name produce a duplicate symbol.
    #[default]
    Bare,
    /// Names are qualified as `{function}${name}` by the enclosing function.
    Function,
}

pub struct Translator<'a> {
    module: &'a str,
    counters: &'a mut LabelCounters,
    scope: LabelScope,
    function: Option<String>,
}

impl<'a> Translator<'a> {
    pub fn new(module: &'a str, counters: &'a mut LabelCounters, scope: LabelScope) -> Self {
        Translator {
            module,
            counters,
            scope,
            function: None,
        }
    }

    /// Convert a VM label to its assembly symbol.
    fn label_to_sym(&self, label: &str) -> String {
        match (self.scope, &self.function) {
            (LabelScope::Function, Some(function)) => format!("{}${}", function, label),
            _ => label.to_string(),
        }
    }

    pub fn translate(&mut self, command: &Command) -> CommandResult<Vec<String>> {
        trace!(module = self.module, %command, "translating");
        let instructions = match command {
            Arithmetic(op) => arithmetic::arithmetic(*op, self.counters),
            Push(segment, index) => memory::push(*segment, *index, self.module)?,
            Pop(segment, index) => memory::pop(*segment, *index, self.module)?,
            Label(name) => branching::label(&self.label_to_sym(name)),
            Goto(name) => branching::goto(&self.label_to_sym(name)),
            IfGoto(name) => branching::if_goto(&self.label_to_sym(name)),
            Function(name, locals) => {
                self.function = Some(name.clone());
                calls::function(name, *locals)
            }
            Call(name, args) => {
                check_arg_count(*args)?;
                calls::call(name, *args, self.counters)
            }
            Return => calls::return_from_function(),
        };
        Ok(instructions)
    }
}
