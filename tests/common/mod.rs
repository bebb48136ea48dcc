//! A small Hack CPU for running translated programs in tests.

#![allow(dead_code)]

use std::collections::HashMap;

use vmil_translator::{translate_str, LinkOptions};

pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

pub const STACK_BASE: usize = 256;

#[derive(Debug, Clone)]
enum Instruction {
    A(u16),
    C {
        dest: String,
        comp: String,
        jump: Option<String>,
    },
}

pub struct Cpu {
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
    program: Vec<Instruction>,
    symbols: HashMap<String, u16>,
}

fn predefined() -> HashMap<String, u16> {
    let mut symbols: HashMap<String, u16> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ]
    .into_iter()
    .map(|(name, address)| (name.to_string(), address))
    .collect();
    for r in 0..16 {
        symbols.insert(format!("R{}", r), r);
    }
    symbols
}

fn code(line: &str) -> Option<&str> {
    let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

impl Cpu {
    /// Assemble `lines`, resolving labels and allocating variables from 16.
    pub fn load(lines: &[String]) -> Self {
        let mut symbols = predefined();

        let mut count = 0u16;
        for line in lines.iter().filter_map(|l| code(l)) {
            if let Some(label) = line.strip_prefix('(') {
                let label = label.strip_suffix(')').expect("unterminated label");
                assert!(
                    symbols.insert(label.to_string(), count).is_none(),
                    "duplicate label {}",
                    label
                );
            } else {
                count += 1;
            }
        }

        let mut next_variable = 16u16;
        let mut program = Vec::new();
        for line in lines.iter().filter_map(|l| code(l)) {
            if line.starts_with('(') {
                continue;
            }
            if let Some(target) = line.strip_prefix('@') {
                let address = match target.parse::<u16>() {
                    Ok(value) => value,
                    Err(_) => *symbols.entry(target.to_string()).or_insert_with(|| {
                        let address = next_variable;
                        next_variable += 1;
                        address
                    }),
                };
                program.push(Instruction::A(address));
                continue;
            }
            let (dest, rest) = match line.split_once('=') {
                Some((dest, rest)) => (dest.to_string(), rest),
                None => (String::new(), line),
            };
            let (comp, jump) = match rest.split_once(';') {
                Some((comp, jump)) => (comp.to_string(), Some(jump.to_string())),
                None => (rest.to_string(), None),
            };
            program.push(Instruction::C { dest, comp, jump });
        }

        Cpu {
            ram: vec![0; 1 << 16],
            a: 0,
            d: 0,
            pc: 0,
            program,
            symbols,
        }
    }

    pub fn address(&self, symbol: &str) -> usize {
        self.symbols[symbol] as usize
    }

    fn m(&self) -> i16 {
        self.ram[self.a as u16 as usize]
    }

    fn eval(&self, comp: &str) -> i16 {
        let reg = |c: char| match c {
            'A' => self.a,
            'D' => self.d,
            'M' => self.m(),
            '0' => 0,
            '1' => 1,
            _ => panic!("bad operand {} in {}", c, comp),
        };
        let chars: Vec<char> = comp.chars().collect();
        match chars.as_slice() {
            ['-', '1'] => -1,
            [x] => reg(*x),
            ['!', x] => !reg(*x),
            ['-', x] => reg(*x).wrapping_neg(),
            [x, op, y] => {
                let (x, y) = (reg(*x), reg(*y));
                match op {
                    '+' => x.wrapping_add(y),
                    '-' => x.wrapping_sub(y),
                    '&' => x & y,
                    '|' => x | y,
                    _ => panic!("bad operator in {}", comp),
                }
            }
            _ => panic!("bad comp {}", comp),
        }
    }

    pub fn step(&mut self) {
        match self.program[self.pc].clone() {
            Instruction::A(value) => {
                self.a = value as i16;
                self.pc += 1;
            }
            Instruction::C { dest, comp, jump } => {
                let value = self.eval(&comp);
                let address = self.a as u16 as usize;
                if dest.contains('M') {
                    self.ram[address] = value;
                }
                if dest.contains('A') {
                    self.a = value;
                }
                if dest.contains('D') {
                    self.d = value;
                }
                let taken = match jump.as_deref() {
                    None => false,
                    Some("JGT") => value > 0,
                    Some("JEQ") => value == 0,
                    Some("JGE") => value >= 0,
                    Some("JLT") => value < 0,
                    Some("JNE") => value != 0,
                    Some("JLE") => value <= 0,
                    Some("JMP") => true,
                    Some(other) => panic!("bad jump {}", other),
                };
                if taken {
                    self.pc = address;
                } else {
                    self.pc += 1;
                }
            }
        }
    }

    /// Run until the program counter leaves the program or `max_steps` pass.
    /// Returns whether the program ran off its end.
    pub fn run(&mut self, max_steps: usize) -> bool {
        for _ in 0..max_steps {
            if self.pc >= self.program.len() {
                return true;
            }
            self.step();
        }
        self.pc >= self.program.len()
    }

    pub fn sp(&self) -> usize {
        self.ram[SP] as usize
    }

    pub fn top(&self) -> i16 {
        self.ram[self.sp() - 1]
    }

    /// Stack contents from the base up to SP.
    pub fn stack(&self) -> &[i16] {
        &self.ram[STACK_BASE..self.sp()]
    }
}

/// Translate one module without bootstrap.
pub fn translate(module: &str, text: &str) -> Vec<String> {
    translate_str(module, text, LinkOptions::default()).expect("translation failed")
}

/// Translate `text` as module `Test`, seed RAM with `setup` and run it to
/// completion.
pub fn run_vm(text: &str, setup: &[(usize, i16)]) -> Cpu {
    let mut cpu = Cpu::load(&translate("Test", text));
    cpu.ram[SP] = STACK_BASE as i16;
    for &(address, value) in setup {
        cpu.ram[address] = value;
    }
    assert!(cpu.run(100_000), "program did not finish");
    cpu
}
