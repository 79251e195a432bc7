//! Tokenizer and `#define` preprocessor.

use crate::error::{AssemblyError, SourceLocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Instruction(String),
    Register(String),
    Number(u32),
    Label(String),
    LocalLabel(String),
    Identifier(String),
    Directive(String),
    Comma,
    Plus,
    LBracket,
    RBracket,
    Comment,
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub at: SourceLocation,
}

const INSTRUCTIONS: &[&str] = &[
    "nop", "mov", "ld", "add", "sub", "xor", "or", "and", "not", "cmp", "jmp", "je", "jne",
    "shl", "shr", "call", "ret", "in", "out", "ldm", "stm", "stm_pair", "hlt", "push", "pop",
    "inc", "dec",
];

const REGISTERS: &[&str] = &["a", "b", "c", "d", "ip", "ir", "sp", "bp", "ss"];

const DIRECTIVES: &[&str] = &["org", "db", "define"];

/// Expands every `#define NAME VALUE` line and substitutes `NAME` in the
/// remaining source, then hands the result to [`tokenize`].
pub struct Lexer {
    defines: Vec<(String, String)>,
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>, AssemblyError> {
        let preprocessed = self.preprocess_defines(source)?;
        self.scan(&preprocessed)
    }

    /// Strips `#define` lines into a name->value table, then substitutes
    /// whole-word occurrences of each name into the remaining lines.
    /// Only the third whitespace-delimited token of a `#define` line is
    /// taken as the value; anything after it on the same line is dropped.
    fn preprocess_defines(&mut self, source: &str) -> Result<String, AssemblyError> {
        self.defines.clear();
        let mut processed_lines = Vec::new();

        for (line_no, raw_line) in source.lines().enumerate() {
            let line_number = line_no + 1;
            let without_comment = match raw_line.find(';') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };
            let stripped = without_comment.trim();

            if stripped.starts_with("#define") {
                let parts: Vec<&str> = stripped.split_whitespace().collect();
                if parts.len() < 3 {
                    return Err(AssemblyError::LexError {
                        message: format!("malformed #define: {}", raw_line),
                        at: SourceLocation {
                            line: line_number,
                            column: 1,
                        },
                    });
                }
                let name = parts[1].to_string();
                let value = parts[2].to_string();
                self.defines.push((name, value));
                processed_lines.push(String::new());
            } else {
                processed_lines.push(substitute_defines(raw_line, &self.defines));
            }
        }

        Ok(processed_lines.join("\n"))
    }

    fn scan(&self, text: &str) -> Result<Vec<Token>, AssemblyError> {
        let chars: Vec<char> = text.chars().collect();
        let mut pos = 0usize;
        let mut line = 1usize;
        let mut column = 1usize;
        let mut tokens = Vec::new();

        macro_rules! loc {
            () => {
                SourceLocation { line, column }
            };
        }

        let advance = |pos: &mut usize, line: &mut usize, column: &mut usize, chars: &[char]| {
            if chars.get(*pos) == Some(&'\n') {
                *line += 1;
                *column = 1;
            } else {
                *column += 1;
            }
            *pos += 1;
        };

        while pos < chars.len() {
            while pos < chars.len() && (chars[pos] == ' ' || chars[pos] == '\t') {
                advance(&mut pos, &mut line, &mut column, &chars);
            }
            if pos >= chars.len() {
                break;
            }
            let ch = chars[pos];
            let at = loc!();

            match ch {
                '\n' => {
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        at,
                    });
                    advance(&mut pos, &mut line, &mut column, &chars);
                }
                ',' => {
                    tokens.push(Token {
                        kind: TokenKind::Comma,
                        at,
                    });
                    advance(&mut pos, &mut line, &mut column, &chars);
                }
                '+' => {
                    tokens.push(Token {
                        kind: TokenKind::Plus,
                        at,
                    });
                    advance(&mut pos, &mut line, &mut column, &chars);
                }
                '[' => {
                    tokens.push(Token {
                        kind: TokenKind::LBracket,
                        at,
                    });
                    advance(&mut pos, &mut line, &mut column, &chars);
                }
                ']' => {
                    tokens.push(Token {
                        kind: TokenKind::RBracket,
                        at,
                    });
                    advance(&mut pos, &mut line, &mut column, &chars);
                }
                ';' => {
                    while pos < chars.len() && chars[pos] != '\n' {
                        advance(&mut pos, &mut line, &mut column, &chars);
                    }
                    tokens.push(Token {
                        kind: TokenKind::Comment,
                        at,
                    });
                }
                '#' => {
                    advance(&mut pos, &mut line, &mut column, &chars);
                    let ident = read_identifier(&chars, &mut pos, &mut line, &mut column);
                    let lower = ident.to_ascii_lowercase();
                    if DIRECTIVES.contains(&lower.as_str()) {
                        tokens.push(Token {
                            kind: TokenKind::Directive(lower),
                            at,
                        });
                    } else {
                        return Err(AssemblyError::LexError {
                            message: format!("unknown directive #{}", ident),
                            at,
                        });
                    }
                }
                c if c.is_ascii_digit() => {
                    let value = read_number(&chars, &mut pos, &mut line, &mut column);
                    tokens.push(Token {
                        kind: TokenKind::Number(value),
                        at,
                    });
                }
                c if c.is_alphabetic() || c == '_' || c == '.' => {
                    let ident = read_identifier(&chars, &mut pos, &mut line, &mut column);
                    if chars.get(pos) == Some(&':') {
                        advance(&mut pos, &mut line, &mut column, &chars);
                        if ident.starts_with('.') {
                            tokens.push(Token {
                                kind: TokenKind::LocalLabel(ident),
                                at,
                            });
                        } else {
                            tokens.push(Token {
                                kind: TokenKind::Label(ident),
                                at,
                            });
                        }
                    } else {
                        let lower = ident.to_ascii_lowercase();
                        if INSTRUCTIONS.contains(&lower.as_str()) {
                            tokens.push(Token {
                                kind: TokenKind::Instruction(lower),
                                at,
                            });
                        } else if REGISTERS.contains(&lower.as_str()) {
                            tokens.push(Token {
                                kind: TokenKind::Register(lower),
                                at,
                            });
                        } else {
                            tokens.push(Token {
                                kind: TokenKind::Identifier(ident),
                                at,
                            });
                        }
                    }
                }
                other => {
                    return Err(AssemblyError::LexError {
                        message: format!("unexpected character '{}'", other),
                        at,
                    });
                }
            }
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            at: SourceLocation { line, column },
        });
        Ok(tokens)
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

fn read_identifier(
    chars: &[char],
    pos: &mut usize,
    line: &mut usize,
    column: &mut usize,
) -> String {
    let mut result = String::new();
    while let Some(&c) = chars.get(*pos) {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            if c == '\n' {
                *line += 1;
                *column = 1;
            } else {
                *column += 1;
            }
            *pos += 1;
        } else {
            break;
        }
    }
    result
}

fn read_number(chars: &[char], pos: &mut usize, line: &mut usize, column: &mut usize) -> u32 {
    let mut bump = |pos: &mut usize| {
        if chars.get(*pos) == Some(&'\n') {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
        *pos += 1;
    };

    if chars.get(*pos) == Some(&'0')
        && chars
            .get(*pos + 1)
            .map(|c| c.eq_ignore_ascii_case(&'x'))
            .unwrap_or(false)
    {
        bump(pos);
        bump(pos);
        let mut digits = String::new();
        while let Some(&c) = chars.get(*pos) {
            if c.is_ascii_hexdigit() {
                digits.push(c);
                bump(pos);
            } else {
                break;
            }
        }
        return u32::from_str_radix(&digits, 16).unwrap_or(0);
    }

    if chars.get(*pos) == Some(&'0')
        && chars
            .get(*pos + 1)
            .map(|c| c.eq_ignore_ascii_case(&'b'))
            .unwrap_or(false)
    {
        bump(pos);
        bump(pos);
        let mut digits = String::new();
        while let Some(&c) = chars.get(*pos) {
            if c == '0' || c == '1' {
                digits.push(c);
                bump(pos);
            } else {
                break;
            }
        }
        return u32::from_str_radix(&digits, 2).unwrap_or(0);
    }

    let mut digits = String::new();
    while let Some(&c) = chars.get(*pos) {
        if c.is_ascii_digit() {
            digits.push(c);
            bump(pos);
        } else {
            break;
        }
    }
    digits.parse().unwrap_or(0)
}

/// Replaces whole-word occurrences of each defined name with its textual
/// value. Longer names are substituted first so a definition like `FOOBAR`
/// can't be partially clobbered by a shorter `FOO`.
fn substitute_defines(line: &str, defines: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = defines.iter().collect();
    ordered.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));

    let mut out = line.to_string();
    for (name, value) in ordered {
        out = replace_word(&out, name, value);
    }
    out
}

fn replace_word(text: &str, word: &str, replacement: &str) -> String {
    if word.is_empty() {
        return text.to_string();
    }
    let bytes: Vec<char> = text.chars().collect();
    let word_chars: Vec<char> = word.chars().collect();
    let mut result = String::new();
    let mut i = 0;

    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';

    while i < bytes.len() {
        if bytes[i..].starts_with(&word_chars[..])
            && i + word_chars.len() <= bytes.len()
        {
            let before_ok = i == 0 || !is_word_char(bytes[i - 1]);
            let after_idx = i + word_chars.len();
            let after_ok = after_idx >= bytes.len() || !is_word_char(bytes[after_idx]);
            if before_ok && after_ok {
                result.push_str(replacement);
                i += word_chars.len();
                continue;
            }
        }
        result.push(bytes[i]);
        i += 1;
    }
    result
}
