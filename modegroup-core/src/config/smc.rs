//! Reader for the host's nested section/key-value text format
//!
//! ```text
//! "ModeGroups"
//! {
//!     "combat"                    // a section
//!     {
//!         "plugin_directory" "combat"   // a key-value pair
//!     }
//! }
//! ```
//!
//! The reader is streaming: it never builds a tree. It drives a
//! [`SectionListener`] with enter/key-value/leave events and reports the first
//! syntax problem with its 1-based line and column.

use crate::error::ConfigError;

/// Receives parse events in document order
pub trait SectionListener {
    fn enter_section(&mut self, name: &str);
    fn key_value(&mut self, key: &str, value: &str);
    fn leave_section(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Open,
    Close,
}

#[derive(Debug)]
struct Spanned {
    token: Token,
    line: u32,
    col: u32,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            // A leading BOM is not part of the first token
            chars: text.trim_start_matches('\u{feff}').chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<(), ConfigError> {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, col) = (self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(syntax(line, col, "unterminated block comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, ConfigError> {
        self.skip_trivia()?;
        let (line, col) = (self.line, self.col);
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '{' => {
                self.bump();
                Token::Open
            }
            '}' => {
                self.bump();
                Token::Close
            }
            '"' => {
                self.bump();
                Token::Text(self.quoted(line, col)?)
            }
            _ => Token::Text(self.bare()),
        };

        Ok(Some(Spanned { token, line, col }))
    }

    fn quoted(&mut self, line: u32, col: u32) -> Result<String, ConfigError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(other) => out.push(other),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(syntax(line, col, "unterminated quoted string"))
    }

    fn bare(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '{' | '}' | '"') {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }
}

fn syntax(line: u32, col: u32, message: impl Into<String>) -> ConfigError {
    ConfigError::Syntax {
        line,
        col,
        message: message.into(),
    }
}

/// Parse `text`, feeding events to `listener`.
///
/// Events already delivered before an error are not retracted; listeners that
/// need all-or-nothing semantics must only commit on a clean leave.
pub fn parse_str<L: SectionListener>(text: &str, listener: &mut L) -> Result<(), ConfigError> {
    let mut lexer = Lexer::new(text);
    let mut depth = 0usize;
    // A string waiting to learn whether it names a section or a key
    let mut pending: Option<(String, u32, u32)> = None;

    while let Some(Spanned { token, line, col }) = lexer.next_token()? {
        match token {
            Token::Text(text) => match pending.take() {
                Some((key, _, _)) => listener.key_value(&key, &text),
                None => pending = Some((text, line, col)),
            },
            Token::Open => {
                let Some((name, _, _)) = pending.take() else {
                    return Err(syntax(line, col, "section opened without a name"));
                };
                depth += 1;
                listener.enter_section(&name);
            }
            Token::Close => {
                if let Some((key, line, col)) = pending.take() {
                    return Err(syntax(line, col, format!("key '{key}' has no value")));
                }
                if depth == 0 {
                    return Err(syntax(line, col, "'}' without an open section"));
                }
                depth -= 1;
                listener.leave_section();
            }
        }
    }

    if let Some((key, line, col)) = pending {
        return Err(syntax(line, col, format!("key '{key}' has no value")));
    }
    if depth > 0 {
        return Err(syntax(
            lexer.line,
            lexer.col,
            format!("unexpected end of file, {depth} section(s) left open"),
        ));
    }
    Ok(())
}
