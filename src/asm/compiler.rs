//! Two-pass assembly -> bytes.

use std::collections::HashMap;

use crate::asm::ast::{Directive, Operand, Statement};
use crate::error::AssemblyError;
use crate::opcode;

pub const TAPE_PAYLOAD_LIMIT: usize = 1920;
pub const SPLIT_BIN_LIMIT: usize = 512;

pub struct Compiler {
    symbols: HashMap<String, u16>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    pub fn compile(&mut self, statements: &[Statement]) -> Result<Vec<u8>, AssemblyError> {
        self.first_pass(statements);
        self.second_pass(statements)
    }

    /// Lays out addresses: each `#org` resets the running logical address
    /// used for subsequent label bindings; it does not move the output
    /// cursor.
    fn first_pass(&mut self, statements: &[Statement]) {
        self.symbols.clear();
        let mut logical_address: u16 = 0;

        for statement in statements {
            match statement {
                Statement::Directive(Directive::Org(address)) => {
                    logical_address = *address;
                }
                Statement::Directive(Directive::DataBytes(bytes)) => {
                    logical_address = logical_address.wrapping_add(bytes.len() as u16);
                }
                Statement::Label { name } => {
                    self.symbols.insert(name.clone(), logical_address);
                }
                Statement::Instruction { mnemonic, .. } => {
                    logical_address =
                        logical_address.wrapping_add(instruction_size(mnemonic) as u16);
                }
            }
        }
    }

    fn second_pass(&self, statements: &[Statement]) -> Result<Vec<u8>, AssemblyError> {
        let mut bytes = Vec::new();

        for statement in statements {
            match statement {
                Statement::Directive(Directive::DataBytes(data)) => bytes.extend_from_slice(data),
                Statement::Directive(Directive::Org(_)) | Statement::Label { .. } => {}
                Statement::Instruction { mnemonic, operands } => {
                    bytes.extend(self.encode_instruction(mnemonic, operands)?);
                }
            }
        }

        Ok(bytes)
    }

    fn resolve(&self, name: &str) -> Result<u16, AssemblyError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| AssemblyError::UnknownLabel {
                name: name.to_string(),
            })
    }

    /// Expands a memory-referencing operand to its big-endian address
    /// bytes, resolving labels through the symbol table built in pass one.
    fn address_bytes(&self, operand: &Operand) -> Result<[u8; 2], AssemblyError> {
        let address = match operand {
            Operand::MemoryDirect(addr) => *addr,
            Operand::LabelRef(name) => self.resolve(name)?,
            _ => unreachable!("address_bytes only called on direct/label operands"),
        };
        Ok([(address >> 8) as u8, address as u8])
    }

    fn encode_instruction(
        &self,
        mnemonic: &str,
        operands: &[Operand],
    ) -> Result<Vec<u8>, AssemblyError> {
        use Operand::*;

        let unsupported = || AssemblyError::UnsupportedOperands {
            mnemonic: mnemonic.to_string(),
        };

        let bytes = match (mnemonic, operands) {
            ("nop", []) => vec![opcode::NOP],
            ("hlt", []) => vec![opcode::HLT],
            ("ret", []) => vec![opcode::RET],

            ("mov", [dst, src]) => self.encode_mov(dst, src)?,
            ("stm", [MemoryDirect(_) | LabelRef(_), Register(src)]) => {
                let addr = self.address_bytes(&operands[0])?;
                vec![opcode::STM, addr[0], addr[1], *src]
            }
            ("stm_pair", [Register(high), Register(low), Register(src)]) => {
                vec![opcode::STM_PAIR, *high, *low, *src]
            }
            ("ldm", [Register(dst), MemoryDirect(_) | LabelRef(_)]) => {
                let addr = self.address_bytes(&operands[1])?;
                vec![opcode::LDM, *dst, addr[0], addr[1]]
            }

            ("add", [Register(a), Register(b)]) => vec![opcode::ADD_R, *a, *b],
            ("sub", [Register(a), Register(b)]) => vec![opcode::SUB_R, *a, *b],
            ("xor", [Register(a), Register(b)]) => vec![opcode::XOR_R, *a, *b],
            ("or", [Register(a), Register(b)]) => vec![opcode::OR_R, *a, *b],
            ("and", [Register(a), Register(b)]) => vec![opcode::AND_R, *a, *b],
            ("not", [Register(a), Register(b)]) => vec![opcode::NOT_R, *a, *b],

            ("cmp", [x, y]) => self.encode_cmp(x, y)?,

            ("jmp", [operand]) => self.encode_jump(opcode::JMP, operand)?,
            ("je", [operand]) => self.encode_jump(opcode::JE, operand)?,
            ("jne", [operand]) => self.encode_jump(opcode::JNE, operand)?,
            ("call", [operand]) => self.encode_jump(opcode::CALL, operand)?,

            ("shl", [Register(r)]) => vec![opcode::SHL_R, *r],
            ("shr", [Register(r)]) => vec![opcode::SHR_R, *r],
            ("push", [Register(r)]) => vec![opcode::PUSH_R, *r],
            ("pop", [Register(r)]) => vec![opcode::POP_R, *r],
            ("inc", [Register(r)]) => vec![opcode::INC_R, *r],
            ("dec", [Register(r)]) => vec![opcode::DEC_R, *r],

            ("in", [Register(port), Register(dst)]) => vec![opcode::IN_R, *port, *dst],
            ("out", [Register(port), Register(val)]) => vec![opcode::OUT_R, *port, *val],

            ("ld", [Register(dst), Immediate(imm)]) => vec![opcode::LD_R, *dst, *imm, 0x00],

            _ => return Err(unsupported()),
        };

        Ok(bytes)
    }

    /// `mov` is abstract over six concrete encodings, chosen by operand
    /// shape.
    fn encode_mov(&self, dst: &Operand, src: &Operand) -> Result<Vec<u8>, AssemblyError> {
        use Operand::*;

        match (dst, src) {
            (MemoryPair { high, low }, Register(src_sel)) => {
                Ok(vec![opcode::STM_PAIR, *high, *low, *src_sel])
            }
            (MemoryDirect(_), Register(src_sel)) | (LabelRef(_), Register(src_sel)) => {
                let addr = self.address_bytes(dst)?;
                Ok(vec![opcode::STM, addr[0], addr[1], *src_sel])
            }
            (Register(dst_sel), Immediate(imm)) => Ok(vec![opcode::LD_R, *dst_sel, *imm, 0x00]),
            (Register(dst_sel), MemoryPair { high, low }) => {
                Ok(vec![opcode::LDM_PAIR, *dst_sel, *high, *low])
            }
            (Register(dst_sel), MemoryDirect(_)) | (Register(dst_sel), LabelRef(_)) => {
                let addr = self.address_bytes(src)?;
                Ok(vec![opcode::LDM, *dst_sel, addr[0], addr[1]])
            }
            (Register(dst_sel), Register(src_sel)) => {
                Ok(vec![opcode::MOV_R, *dst_sel, *src_sel, 0x00])
            }
            (Register(dst_sel), RegisterOffset { selector, offset }) => {
                Ok(vec![opcode::MOV_R, *dst_sel, *selector, *offset])
            }
            _ => Err(AssemblyError::UnsupportedOperands {
                mnemonic: "mov".to_string(),
            }),
        }
    }

    fn encode_cmp(&self, x: &Operand, y: &Operand) -> Result<Vec<u8>, AssemblyError> {
        use Operand::*;

        let (x_byte, y_byte, mode) = match (x, y) {
            (Register(x_sel), Register(y_sel)) => (*x_sel, *y_sel, opcode::cmp_mode::REG_REG),
            (Register(x_sel), Immediate(y_imm)) => (*x_sel, *y_imm, opcode::cmp_mode::REG_IMM),
            (Immediate(x_imm), Register(y_sel)) => (*x_imm, *y_sel, opcode::cmp_mode::IMM_REG),
            (Immediate(x_imm), Immediate(y_imm)) => (*x_imm, *y_imm, opcode::cmp_mode::IMM_IMM),
            _ => {
                return Err(AssemblyError::UnsupportedOperands {
                    mnemonic: "cmp".to_string(),
                })
            }
        };

        Ok(vec![opcode::CMP_R, x_byte, y_byte, mode])
    }

    fn encode_jump(&self, opcode: u8, operand: &Operand) -> Result<Vec<u8>, AssemblyError> {
        let addr = match operand {
            Operand::MemoryDirect(_) | Operand::LabelRef(_) => self.address_bytes(operand)?,
            _ => {
                return Err(AssemblyError::UnsupportedOperands {
                    mnemonic: "jmp/je/jne/call".to_string(),
                })
            }
        };
        Ok(vec![opcode, addr[0], addr[1]])
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Total instruction width, mirroring the opcode-size table so the
/// compiler's first pass can lay out addresses before the concrete opcode
/// is chosen in the second pass.
fn instruction_size(mnemonic: &str) -> u8 {
    match mnemonic {
        "nop" | "ret" | "hlt" => 1,
        "shl" | "shr" | "push" | "pop" | "inc" | "dec" => 2,
        "add" | "sub" | "xor" | "or" | "and" | "not" | "jmp" | "je" | "jne" | "call" | "in"
        | "out" => 3,
        "mov" | "ld" | "cmp" | "ldm" | "stm" | "stm_pair" => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::lexer::Lexer;
    use crate::asm::parser::Parser;

    fn compile_source(source: &str) -> Vec<u8> {
        let tokens = Lexer::new().tokenize(source).unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();
        Compiler::new().compile(&statements).unwrap()
    }

    #[test]
    fn minimum_program_compiles_to_a_single_hlt_byte() {
        assert_eq!(compile_source("#org 0x0000\nhlt\n"), vec![0xFF]);
    }

    #[test]
    fn register_arithmetic_program_matches_the_documented_bytes() {
        let source = "#org 0x0000\nmov a, 5\nmov b, 3\nadd a, b\nhlt\n";
        assert_eq!(
            compile_source(source),
            vec![
                0x02, 0x01, 0x05, 0x00, 0x02, 0x02, 0x03, 0x00, 0x03, 0x01, 0x02, 0xFF,
            ]
        );
    }

    #[test]
    fn forward_referenced_jump_resolves_to_the_label_after_it() {
        let source = "#org 0x0100\njmp done\nnop\ndone:\nhlt\n";
        assert_eq!(
            compile_source(source),
            vec![0x0A, 0x01, 0x05, 0x00, 0xFF]
        );
    }

    #[test]
    fn local_labels_in_two_contexts_resolve_to_distinct_addresses() {
        let source = "#org 0x0000\nf1:\njmp .loop\n.loop:\nhlt\nf2:\njmp .loop\n.loop:\nhlt\n";
        let bytes = compile_source(source);
        // f1's jmp targets 0x0003 (f1.loop), f2's jmp targets 0x0007 (f2.loop)
        assert_eq!(&bytes[0..3], &[0x0A, 0x00, 0x03]);
        assert_eq!(&bytes[4..7], &[0x0A, 0x00, 0x07]);
    }

    #[test]
    fn unknown_label_fails_assembly() {
        let tokens = Lexer::new().tokenize("jmp nowhere\n").unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();
        let result = Compiler::new().compile(&statements);
        assert!(matches!(result, Err(AssemblyError::UnknownLabel { .. })));
    }
}
