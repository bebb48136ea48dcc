//! The function call protocol.
//!
//! A call leaves this frame on the stack, growing upwards:
//!
//! ```text
//! ARG ->  argument 0 .. argument n-1
//!         return address
//!         saved LCL
//!         saved ARG
//!         saved THIS
//!         saved THAT
//! LCL ->  local 0 .. local k-1
//! ```

use super::{at, label_decl, push_d, LabelCounters};

/// Return address plus the four saved segment pointers.
const FRAME_SIZE: u16 = 5;

/// Caller pointers saved by `call`, in push order.
const SAVED_POINTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Holds the callee's LCL while returning.
const FRAME_REGISTER: &str = "@R14";
/// Holds the return address while returning.
const RETURN_REGISTER: &str = "@R15";

pub fn function(name: &str, locals: u16) -> Vec<String> {
    let mut instructions = svec![label_decl(name)];
    for _ in 0..locals {
        instructions.extend(svec!["@SP", "M=M+1", "A=M-1", "M=0"]);
    }
    instructions
}

pub fn call(name: &str, args: u16, counters: &mut LabelCounters) -> Vec<String> {
    let return_sym = format!("$RET_{}", counters.next_return());

    let mut instructions = svec![at(&return_sym), "D=A"];
    instructions.extend(push_d());
    for pointer in SAVED_POINTERS {
        instructions.extend(svec![at(pointer), "D=M"]);
        instructions.extend(push_d());
    }
    instructions.extend(svec![
        "@SP",
        "D=M",
        at(FRAME_SIZE),
        "D=D-A",
        at(args),
        "D=D-A", // D = SP - 5 - args
        "@ARG",
        "M=D",
        "@SP",
        "D=M",
        "@LCL",
        "M=D",
        at(name),
        "0;JMP",
        label_decl(&return_sym)
    ]);
    instructions
}

pub fn return_from_function() -> Vec<String> {
    let mut instructions = svec![
        "@LCL",
        "D=M",
        FRAME_REGISTER,
        "M=D", // frame = LCL
        at(FRAME_SIZE),
        "A=D-A",
        "D=M",
        RETURN_REGISTER,
        "M=D", // ret = *(frame - 5)
        "@SP",
        "AM=M-1",
        "D=M",
        "@ARG",
        "A=M",
        "M=D", // *ARG = pop()
        "@ARG",
        "D=M+1",
        "@SP",
        "M=D" // SP = ARG + 1
    ];
    for pointer in SAVED_POINTERS.iter().rev() {
        instructions.extend(svec![FRAME_REGISTER, "AM=M-1", "D=M", at(pointer), "M=D"]);
    }
    instructions.extend(svec![RETURN_REGISTER, "A=M", "0;JMP"]);
    instructions
}
