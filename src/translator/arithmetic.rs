use crate::ast::{ArithmeticOp, ArithmeticOp::*};

use super::{at, label_decl, LabelCounters};

pub fn arithmetic(op: ArithmeticOp, counters: &mut LabelCounters) -> Vec<String> {
    match op {
        Not => simple_un_op('!'),
        Neg => simple_un_op('-'),
        Add => simple_bin_op('+'),
        Sub => simple_bin_op('-'),
        And => simple_bin_op('&'),
        Or => simple_bin_op('|'),
        Eq => compare("JEQ", counters.next_comparison()),
        Gt => compare("JGT", counters.next_comparison()),
        Lt => compare("JLT", counters.next_comparison()),
    }
}

fn simple_un_op(op: char) -> Vec<String> {
    svec!["@SP", "A=M-1", format!("M={}M", op)]
}

// i.e. no conditions or jumps, just pop and run
fn simple_bin_op(op: char) -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1",             // SP--, looking at top of stack now
        "D=M",                // Right arg in D
        "A=A-1",              // Looking at second arg of stack, will overwrite
        format!("M=M{}D", op) // Op and overwrite second element
    ]
}

/// Jumps to the true branch when `left - right` satisfies `jump`.
fn compare(jump: &str, id: usize) -> Vec<String> {
    let cmp_sym = format!("$CMP_{}", id);
    let end_sym = format!("$ENDCMP_{}", id);
    svec![
        "@SP",
        "AM=M-1", // SP--, looking at top of stack now
        "D=M",    // Right arg in D
        "A=A-1",
        "D=M-D",
        at(&cmp_sym),
        format!("D;{}", jump),
        "D=0",
        at(&end_sym),
        "0;JMP",
        label_decl(&cmp_sym),
        "D=-1",
        label_decl(&end_sym),
        "@SP",
        "A=M-1",
        "M=D"
    ]
}
