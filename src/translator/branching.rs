use super::{at, label_decl, pop_d};

pub fn label(symbol: &str) -> Vec<String> {
    svec![label_decl(symbol)]
}

pub fn goto(symbol: &str) -> Vec<String> {
    svec![
        at(symbol),
        "0;JMP" // Unconditional jump
    ]
}

pub fn if_goto(symbol: &str) -> Vec<String> {
    let mut instructions = pop_d();
    instructions.extend(svec![
        at(symbol),
        "D;JNE" // False is 0
    ]);
    instructions
}
