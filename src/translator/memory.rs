use crate::ast::{Segment, Segment::*};
use crate::error::{CommandResult, UnknownSegmentSnafu};

use super::{at, pop_d, push_d};

/// First register of the `temp` block (R5..R12).
const TEMP_BASE: u16 = 5;

/// Symbol holding the base address of a pointer-based segment.
fn base_symbol(segment: Segment) -> Option<&'static str> {
    match segment {
        Local => Some("LCL"),
        Argument => Some("ARG"),
        This => Some("THIS"),
        That => Some("THAT"),
        _ => None,
    }
}

/// Symbol naming the cell of a directly addressed segment.
fn direct_symbol(segment: Segment, index: u16, module: &str) -> String {
    match segment {
        Static => format!("{}.{}", module, index),
        Temp => format!("R{}", TEMP_BASE + index),
        Pointer if index == 0 => "THIS".to_string(),
        Pointer => "THAT".to_string(),
        _ => unreachable!("{} is not directly addressed", segment),
    }
}

pub fn push(segment: Segment, index: u16, module: &str) -> CommandResult<Vec<String>> {
    segment.check_index(index)?;
    let mut instructions = match (segment, base_symbol(segment)) {
        (Constant, _) => svec![at(index), "D=A"],
        (_, Some(base)) => svec![
            at(base),
            "D=M",
            at(index),
            "A=D+A", // A = SEG+arg
            "D=M"    // D = value to push
        ],
        (_, None) => svec![at(direct_symbol(segment, index, module)), "D=M"],
    };
    instructions.extend(push_d());
    Ok(instructions)
}

pub fn pop(segment: Segment, index: u16, module: &str) -> CommandResult<Vec<String>> {
    if segment == Constant {
        return UnknownSegmentSnafu { segment: "constant" }.fail();
    }
    segment.check_index(index)?;
    let mut instructions = match base_symbol(segment) {
        Some(base) => svec![at(base), "D=M", at(index), "D=D+A"],
        None => svec![at(direct_symbol(segment, index, module)), "D=A"],
    };
    instructions.extend(svec!["@R13", "M=D"]); // Store destination in R13
    instructions.extend(pop_d());
    instructions.extend(svec![
        "@R13",
        "A=M", // At the destination...
        "M=D"  // ... store the popped val
    ]);
    Ok(instructions)
}
