use std::{fmt, str::FromStr};

use crate::error::{
    CommandError, CommandResult, IndexOutOfRangeSnafu, MalformedCommandSnafu,
    UnknownArithmeticOpSnafu,
};

/// Largest number an `@value` instruction can load.
pub const MAX_LITERAL: u16 = 32767;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    /// Largest index the segment can address. Indices of the based segments
    /// and `constant` values are emitted as `@index`, so they share the
    /// literal limit.
    pub fn max_index(self) -> u16 {
        match self {
            Segment::Pointer => 1,
            Segment::Temp => 7,
            _ => MAX_LITERAL,
        }
    }

    pub fn check_index(self, index: u16) -> CommandResult<()> {
        let max = self.max_index();
        if index > max {
            IndexOutOfRangeSnafu {
                segment: self,
                index,
                max,
            }
            .fail()
        } else {
            Ok(())
        }
    }
}

/// `call` emits its argument count as `@args`.
pub fn check_arg_count(args: u16) -> CommandResult<()> {
    if args > MAX_LITERAL {
        MalformedCommandSnafu {
            reason: format!("argument count {} exceeds {}", args, MAX_LITERAL),
        }
        .fail()
    } else {
        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Segment::*;
        f.write_str(match self {
            Constant => "constant",
            Local => "local",
            Static => "static",
            Argument => "argument",
            This => "this",
            That => "that",
            Pointer => "pointer",
            Temp => "temp",
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ArithmeticOp::*;
        f.write_str(match self {
            Add => "add",
            Sub => "sub",
            Neg => "neg",
            Eq => "eq",
            Gt => "gt",
            Lt => "lt",
            And => "and",
            Or => "or",
            Not => "not",
        })
    }
}

impl FromStr for ArithmeticOp {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use self::ArithmeticOp::*;
        Ok(match s.to_ascii_lowercase().as_str() {
            "add" => Add,
            "sub" => Sub,
            "neg" => Neg,
            "eq" => Eq,
            "gt" => Gt,
            "lt" => Lt,
            "and" => And,
            "or" => Or,
            "not" => Not,
            _ => return UnknownArithmeticOpSnafu { op: s }.fail(),
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Stack
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),

    // Control
    Label(String),
    Goto(String),
    IfGoto(String),

    // Functions
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Command::*;
        match self {
            Arithmetic(op) => write!(f, "{}", op),
            Push(segment, index) => write!(f, "push {} {}", segment, index),
            Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Label(name) => write!(f, "label {}", name),
            Goto(name) => write!(f, "goto {}", name),
            IfGoto(name) => write!(f, "if-goto {}", name),
            Function(name, locals) => write!(f, "function {} {}", name, locals),
            Call(name, args) => write!(f, "call {} {}", name, args),
            Return => f.write_str("return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_ops_parse_case_insensitively() {
        assert_eq!("ADD".parse::<ArithmeticOp>().unwrap(), ArithmeticOp::Add);
        assert_eq!("Not".parse::<ArithmeticOp>().unwrap(), ArithmeticOp::Not);
    }

    #[test]
    fn unknown_arithmetic_op_is_reported() {
        assert!(matches!(
            "mul".parse::<ArithmeticOp>(),
            Err(CommandError::UnknownArithmeticOp { op }) if op == "mul"
        ));
    }

    #[test]
    fn every_segment_is_bounded() {
        assert_eq!(Segment::Local.max_index(), MAX_LITERAL);
        assert!(Segment::That.check_index(32767).is_ok());
        assert!(matches!(
            Segment::Argument.check_index(40000),
            Err(CommandError::IndexOutOfRange { max: 32767, .. })
        ));
        assert!(check_arg_count(32767).is_ok());
        assert!(matches!(
            check_arg_count(40000),
            Err(CommandError::MalformedCommand { .. })
        ));
    }

    #[test]
    fn commands_render_as_source_text() {
        assert_eq!(
            Command::Push(Segment::Argument, 3).to_string(),
            "push argument 3"
        );
        assert_eq!(
            Command::IfGoto("LOOP".to_string()).to_string(),
            "if-goto LOOP"
        );
        assert_eq!(
            Command::Arithmetic(ArithmeticOp::Lt).to_string(),
            "lt"
        );
    }
}
