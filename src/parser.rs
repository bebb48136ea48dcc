use nom::{
    branch::alt,
    bytes::complete::{is_a, tag_no_case},
    character::complete::digit1,
    combinator::{all_consuming, map_res, value, verify},
    IResult,
};

use crate::ast::{Command::*, Segment::*, *};
#[cfg(test)]
use crate::error::CommandError;
use crate::error::{CommandResult, MalformedCommandSnafu, UnknownCommandSnafu, UnknownSegmentSnafu};

const SYMBOL_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_.$:0123456789";

/// Strip the `//` comment, collapse whitespace runs and trim.
/// Returns `None` for lines that carry no command.
pub fn sanitize(line: &str) -> Option<String> {
    let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line);
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

#[test]
fn test_sanitize() {
    assert_eq!(
        sanitize("  push\tconstant   7 // seven"),
        Some("push constant 7".to_string())
    );
    assert_eq!(sanitize("// only a comment"), None);
    assert_eq!(sanitize("   \t "), None);
    assert_eq!(sanitize("add//tight"), Some("add".to_string()));
}

fn integer(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |c: &str| c.parse())(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Constant, tag_no_case("constant")),
        value(Local, tag_no_case("local")),
        value(Static, tag_no_case("static")),
        value(Argument, tag_no_case("argument")),
        value(This, tag_no_case("this")),
        value(That, tag_no_case("that")),
        value(Pointer, tag_no_case("pointer")),
        value(Temp, tag_no_case("temp")),
    ))(input)
}

/// Authored symbols may not start with a digit, nor with `$`, which is
/// reserved for generated labels.
fn symbol(input: &str) -> IResult<&str, &str> {
    verify(is_a(SYMBOL_CHARS), |sym: &str| {
        !sym.starts_with(|c: char| c.is_ascii_digit() || c == '$')
    })(input)
}

/// Run `parser` over a whole token, failing if anything is left over.
fn whole<'a, O, F>(parser: F, token: &'a str) -> Option<O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(parser)(token).ok().map(|(_, out)| out)
}

fn segment_arg(token: &str) -> CommandResult<Segment> {
    whole(segment, token).ok_or_else(|| UnknownSegmentSnafu { segment: token }.build())
}

fn number_arg(token: &str) -> CommandResult<u16> {
    whole(integer, token).ok_or_else(|| {
        MalformedCommandSnafu {
            reason: format!("expected a number, found `{}`", token),
        }
        .build()
    })
}

fn symbol_arg(token: &str) -> CommandResult<String> {
    whole(symbol, token)
        .map(str::to_string)
        .ok_or_else(|| {
            MalformedCommandSnafu {
                reason: format!("invalid symbol `{}`", token),
            }
            .build()
        })
}

#[test]
fn test_args() {
    assert_eq!(segment_arg("POINTER").unwrap(), Pointer);
    assert!(matches!(
        segment_arg("heap"),
        Err(CommandError::UnknownSegment { .. })
    ));
    assert!(matches!(
        segment_arg("thisx"),
        Err(CommandError::UnknownSegment { .. })
    ));
    assert_eq!(number_arg("32").unwrap(), 32);
    assert!(number_arg("-1").is_err());
    assert!(number_arg("65536").is_err());
    assert_eq!(symbol_arg("Main.fibonacci$LOOP_1").unwrap(), "Main.fibonacci$LOOP_1");
    assert!(symbol_arg("1abc").is_err());
    assert!(symbol_arg("a-b").is_err());
    assert!(symbol_arg("$RET_0").is_err());
    assert!(symbol_arg("$CMP_3").is_err());
}

fn expect_arity(keyword: &str, tokens: &[&str], arity: usize) -> CommandResult<()> {
    if tokens.len() == arity {
        Ok(())
    } else {
        MalformedCommandSnafu {
            reason: format!(
                "`{}` takes {} argument(s), found {}",
                keyword,
                arity - 1,
                tokens.len() - 1
            ),
        }
        .fail()
    }
}

/// Classify one sanitized line into a `Command`.
pub fn classify(line: &str) -> CommandResult<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let keyword = match tokens.first() {
        Some(keyword) => keyword.to_ascii_lowercase(),
        None => return MalformedCommandSnafu { reason: "empty command" }.fail(),
    };

    let command = match keyword.as_str() {
        "push" | "pop" => {
            expect_arity(&keyword, &tokens, 3)?;
            let segment = segment_arg(tokens[1])?;
            let index = number_arg(tokens[2])?;
            segment.check_index(index)?;
            if keyword == "push" {
                Push(segment, index)
            } else {
                Pop(segment, index)
            }
        }
        "label" | "goto" | "if-goto" => {
            expect_arity(&keyword, &tokens, 2)?;
            let name = symbol_arg(tokens[1])?;
            match keyword.as_str() {
                "label" => Label(name),
                "goto" => Goto(name),
                _ => IfGoto(name),
            }
        }
        "function" | "call" => {
            expect_arity(&keyword, &tokens, 3)?;
            let name = symbol_arg(tokens[1])?;
            let count = number_arg(tokens[2])?;
            if keyword == "function" {
                Function(name, count)
            } else {
                check_arg_count(count)?;
                Call(name, count)
            }
        }
        "return" => {
            expect_arity(&keyword, &tokens, 1)?;
            Return
        }
        other => match other.parse::<ArithmeticOp>() {
            Ok(op) => {
                expect_arity(&keyword, &tokens, 1)?;
                Arithmetic(op)
            }
            Err(_) => return UnknownCommandSnafu { keyword: tokens[0] }.fail(),
        },
    };

    Ok(command)
}

#[test]
fn test_classify() {
    assert_eq!(classify("push pointer 1").unwrap(), Push(Pointer, 1));
    assert_eq!(classify("POP Local 2").unwrap(), Pop(Local, 2));
    assert_eq!(classify("pop constant 2").unwrap(), Pop(Constant, 2));
    assert_eq!(classify("NEG").unwrap(), Arithmetic(ArithmeticOp::Neg));
    assert_eq!(classify("if-goto END").unwrap(), IfGoto("END".to_string()));
    assert_eq!(
        classify("function Main.main 2").unwrap(),
        Function("Main.main".to_string(), 2)
    );
    assert_eq!(
        classify("call Math.max 2").unwrap(),
        Call("Math.max".to_string(), 2)
    );
    assert_eq!(classify("return").unwrap(), Return);
}

#[test]
fn test_classify_errors() {
    assert!(matches!(
        classify("jump LOOP"),
        Err(CommandError::UnknownCommand { keyword }) if keyword == "jump"
    ));
    assert!(matches!(
        classify("push constant"),
        Err(CommandError::MalformedCommand { .. })
    ));
    assert!(matches!(
        classify("call Foo.bar 1 2"),
        Err(CommandError::MalformedCommand { .. })
    ));
    assert!(matches!(
        classify("add 1"),
        Err(CommandError::MalformedCommand { .. })
    ));
    assert!(matches!(
        classify("push local x"),
        Err(CommandError::MalformedCommand { .. })
    ));
    assert!(matches!(
        classify("push heap 0"),
        Err(CommandError::UnknownSegment { .. })
    ));
    assert!(matches!(
        classify("pop temp 8"),
        Err(CommandError::IndexOutOfRange { max: 7, .. })
    ));
    assert!(matches!(
        classify("push constant 32768"),
        Err(CommandError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        classify("push local 40000"),
        Err(CommandError::IndexOutOfRange { max: 32767, .. })
    ));
    assert!(matches!(
        classify("pop argument 32768"),
        Err(CommandError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        classify("call f 40000"),
        Err(CommandError::MalformedCommand { .. })
    ));
    assert!(matches!(
        classify("label $RET_0"),
        Err(CommandError::MalformedCommand { .. })
    ));
}
