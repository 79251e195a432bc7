//! Token stream -> [`Statement`] AST.

use crate::asm::ast::{Directive, Operand, Statement};
use crate::asm::lexer::{Token, TokenKind};
use crate::error::AssemblyError;

fn register_selector(name: &str) -> u8 {
    match name {
        "a" => 0x01,
        "b" => 0x02,
        "c" => 0x03,
        "d" => 0x04,
        "ip" => 0x05,
        "ir" => 0x06,
        "sp" => 0x07,
        "bp" => 0x08,
        "ss" => 0x09,
        _ => unreachable!("lexer only emits known register names"),
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    current_label_context: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            current_label_context: None,
        }
    }

    pub fn parse(&mut self) -> Result<Vec<Statement>, AssemblyError> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();
            match self.current().kind.clone() {
                TokenKind::Eof => break,
                TokenKind::Directive(_) => {
                    if let Some(directive) = self.parse_directive()? {
                        statements.push(Statement::Directive(directive));
                    }
                }
                TokenKind::Label(name) => {
                    self.current_label_context = Some(name.clone());
                    statements.push(Statement::Label { name });
                    self.advance();
                }
                TokenKind::LocalLabel(local) => {
                    let full = self.resolve_label_name(&local);
                    statements.push(Statement::Label { name: full });
                    self.advance();
                }
                TokenKind::Instruction(_) => {
                    statements.push(self.parse_instruction()?);
                }
                TokenKind::Comment => {
                    self.advance();
                }
                _ => {
                    return Err(AssemblyError::ParseError {
                        message: format!("unexpected token {:?}", self.current().kind),
                        at: self.current().at,
                    });
                }
            }
        }

        Ok(statements)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    /// Rewrites a dotted local reference to `{context}{.name}`; a name
    /// with no leading `.` (an ordinary label) passes through untouched.
    fn resolve_label_name(&self, name: &str) -> String {
        if name.starts_with('.') {
            match &self.current_label_context {
                Some(context) => format!("{}{}", context, name),
                None => name.to_string(),
            }
        } else {
            name.to_string()
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<u32, AssemblyError> {
        match self.current().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(AssemblyError::ParseError {
                message: format!("expected {}", what),
                at: self.current().at,
            }),
        }
    }

    fn parse_directive(&mut self) -> Result<Option<Directive>, AssemblyError> {
        let name = match self.current().kind.clone() {
            TokenKind::Directive(name) => name,
            _ => return Ok(None),
        };
        self.advance();

        match name.as_str() {
            "org" => {
                let address = self.expect_number("an address after #org")?;
                Ok(Some(Directive::Org(address as u16)))
            }
            "db" => {
                let mut bytes = vec![(self.expect_number("a byte after #db")? & 0xFF) as u8];
                while matches!(self.current().kind, TokenKind::Comma) {
                    self.advance();
                    bytes.push((self.expect_number("a byte after ',' in #db")? & 0xFF) as u8);
                }
                Ok(Some(Directive::DataBytes(bytes)))
            }
            _ => Ok(None),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, AssemblyError> {
        match self.current().kind.clone() {
            TokenKind::Register(name) => {
                let selector = register_selector(&name);
                self.advance();
                if matches!(self.current().kind, TokenKind::Plus) {
                    self.advance();
                    let offset = self.expect_number("a number after '+'")?;
                    return Ok(Operand::RegisterOffset {
                        selector,
                        offset: (offset & 0xFF) as u8,
                    });
                }
                Ok(Operand::Register(selector))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Operand::Immediate((n & 0xFF) as u8))
            }
            TokenKind::LBracket => {
                self.advance();
                match self.current().kind.clone() {
                    TokenKind::Register(first) => {
                        let first_sel = register_selector(&first);
                        self.advance();
                        if matches!(self.current().kind, TokenKind::Comma) {
                            self.advance();
                            let second = match self.current().kind.clone() {
                                TokenKind::Register(r) => r,
                                _ => {
                                    return Err(AssemblyError::ParseError {
                                        message: "expected a second register in [reg, reg]"
                                            .to_string(),
                                        at: self.current().at,
                                    })
                                }
                            };
                            let second_sel = register_selector(&second);
                            self.advance();
                            self.expect_rbracket()?;
                            Ok(Operand::MemoryPair {
                                high: first_sel,
                                low: second_sel,
                            })
                        } else {
                            self.expect_rbracket()?;
                            Ok(Operand::MemoryReg(first_sel))
                        }
                    }
                    TokenKind::Number(addr) => {
                        self.advance();
                        self.expect_rbracket()?;
                        Ok(Operand::MemoryDirect(addr as u16))
                    }
                    _ => Err(AssemblyError::ParseError {
                        message: "unexpected operand inside brackets".to_string(),
                        at: self.current().at,
                    }),
                }
            }
            TokenKind::Identifier(name) => {
                let resolved = self.resolve_label_name(&name);
                self.advance();
                Ok(Operand::LabelRef(resolved))
            }
            _ => Err(AssemblyError::ParseError {
                message: format!("unexpected operand {:?}", self.current().kind),
                at: self.current().at,
            }),
        }
    }

    fn expect_rbracket(&mut self) -> Result<(), AssemblyError> {
        if matches!(self.current().kind, TokenKind::RBracket) {
            self.advance();
            Ok(())
        } else {
            Err(AssemblyError::ParseError {
                message: "expected ']'".to_string(),
                at: self.current().at,
            })
        }
    }

    fn parse_instruction(&mut self) -> Result<Statement, AssemblyError> {
        let mnemonic = match self.current().kind.clone() {
            TokenKind::Instruction(name) => name,
            _ => unreachable!("caller only invokes this on an Instruction token"),
        };
        self.advance();

        let mut operands = Vec::new();
        if !matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Comment | TokenKind::Eof
        ) {
            operands.push(self.parse_operand()?);
            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                operands.push(self.parse_operand()?);
            }
        }

        Ok(Statement::Instruction { mnemonic, operands })
    }
}
