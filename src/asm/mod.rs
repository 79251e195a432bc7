//! The assembler pipeline: lex -> parse -> two-pass compile.

pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

use crate::asm::compiler::{Compiler, SPLIT_BIN_LIMIT, TAPE_PAYLOAD_LIMIT};
use crate::asm::lexer::Lexer;
use crate::asm::parser::Parser;
use crate::error::AssemblyError;
use crate::tape::{self, TapeMetadata};

/// Stateless entry point to the lex -> parse -> compile pipeline.
pub struct Assembler;

impl Assembler {
    /// Runs the full pipeline over `source`, returning the emitted byte
    /// vector.
    pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblyError> {
        let tokens = Lexer::new().tokenize(source)?;
        let statements = Parser::new(&tokens).parse()?;
        Compiler::new().compile(&statements)
    }

    /// Splits `bytes` into the `0.bin`/`1.bin` layout the split-bin loader
    /// expects. Returns `(first, second)`, where `second` is `None` when
    /// the program fits in a single 256-byte file.
    pub fn to_split_bin(bytes: &[u8]) -> Result<(Vec<u8>, Option<Vec<u8>>), AssemblyError> {
        if bytes.len() > SPLIT_BIN_LIMIT {
            return Err(AssemblyError::ProgramTooLarge {
                size: bytes.len(),
                limit: SPLIT_BIN_LIMIT,
            });
        }
        if bytes.len() <= 256 {
            Ok((bytes.to_vec(), None))
        } else {
            Ok((bytes[..256].to_vec(), Some(bytes[256..].to_vec())))
        }
    }

    /// Wraps `bytes` in a TAPE container.
    pub fn to_tape(
        bytes: &[u8],
        metadata: &TapeMetadata,
    ) -> Result<[u8; tape::TAPE_SIZE], AssemblyError> {
        if bytes.len() > TAPE_PAYLOAD_LIMIT {
            return Err(AssemblyError::ProgramTooLarge {
                size: bytes.len(),
                limit: TAPE_PAYLOAD_LIMIT,
            });
        }
        tape::encode(bytes, metadata).map_err(|_| AssemblyError::ProgramTooLarge {
            size: bytes.len(),
            limit: TAPE_PAYLOAD_LIMIT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_runs_the_full_pipeline() {
        let bytes = Assembler::assemble("#org 0x0000\nhlt\n").unwrap();
        assert_eq!(bytes, vec![0xFF]);
    }

    #[test]
    fn split_bin_keeps_small_programs_in_one_file() {
        let bytes = vec![0u8; 200];
        let (first, second) = Assembler::to_split_bin(&bytes).unwrap();
        assert_eq!(first.len(), 200);
        assert!(second.is_none());
    }

    #[test]
    fn split_bin_splits_at_256() {
        let bytes = vec![0u8; 300];
        let (first, second) = Assembler::to_split_bin(&bytes).unwrap();
        assert_eq!(first.len(), 256);
        assert_eq!(second.unwrap().len(), 44);
    }

    #[test]
    fn split_bin_rejects_programs_over_512_bytes() {
        let bytes = vec![0u8; 513];
        assert!(matches!(
            Assembler::to_split_bin(&bytes),
            Err(AssemblyError::ProgramTooLarge { .. })
        ));
    }
}
