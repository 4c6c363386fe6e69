use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(Rc<str>),
    Ident(Rc<str>),
    Int(Rc<str>),
    Float(Rc<str>),
    String(Rc<str>),
    /// A whole template without interpolations.
    TemplateString(Rc<str>),
    /// Opening template text up to the first interpolation `{`.
    TemplateHead(Rc<str>),
    /// Text between an interpolation's `}` and the next `{`.
    TemplateMiddle(Rc<str>),
    /// Text between the last interpolation's `}` and the closing backtick.
    TemplateTail(Rc<str>),

    // Operators
    Assign,
    Walrus,
    PlusAssign,
    MinusAssign,
    AsteriskAssign,
    SlashAssign,
    PercentAssign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Percent,

    Equal,
    NotEqual,

    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    ShiftLeft,

    Dot,
    Range,
    Ampersand,
    And,
    Pipe,
    Or,
    At,
    MacroIntro,
    Backslash,

    Comma,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Hashmap,

    // Keywords
    Yif,
    Yels,
    Yeet,
    Yoyo,
    Yall,
    Yolo,
    True,
    False,
    Null,

    Eof,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "yif" => Some(TokenKind::Yif),
        "yels" => Some(TokenKind::Yels),
        "yeet" => Some(TokenKind::Yeet),
        "yoyo" => Some(TokenKind::Yoyo),
        "yall" => Some(TokenKind::Yall),
        "yolo" => Some(TokenKind::Yolo),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "null" => Some(TokenKind::Null),
        _ => None,
    }
}

impl TokenKind {
    /// Source text of the token. Literal kinds return their payload.
    pub fn literal(&self) -> &str {
        use TokenKind::*;
        match self {
            Illegal(s) | Ident(s) | Int(s) | Float(s) | String(s)
            | TemplateString(s) | TemplateHead(s) | TemplateMiddle(s) | TemplateTail(s) => s,
            Assign => "=",
            Walrus => ":=",
            PlusAssign => "+=",
            MinusAssign => "-=",
            AsteriskAssign => "*=",
            SlashAssign => "/=",
            PercentAssign => "%=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            Percent => "%",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            GreaterEqual => ">=",
            LessThan => "<",
            LessEqual => "<=",
            ShiftLeft => "<<",
            Dot => ".",
            Range => "..",
            Ampersand => "&",
            And => "&&",
            Pipe => "|",
            Or => "||",
            At => "@",
            MacroIntro => "@\\",
            Backslash => "\\",
            Comma => ",",
            Colon => ":",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Hashmap => "%{",
            Yif => "yif",
            Yels => "yels",
            Yeet => "yeet",
            Yoyo => "yoyo",
            Yall => "yall",
            Yolo => "yolo",
            True => "true",
            False => "false",
            Null => "null",
            Eof => "",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Illegal(msg) => write!(f, "illegal token ({})", msg),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Int(val) | TokenKind::Float(val) => write!(f, "number '{}'", val),
            TokenKind::String(_) => write!(f, "string"),
            TokenKind::TemplateString(_) | TokenKind::TemplateHead(_) => write!(f, "template string"),
            TokenKind::TemplateMiddle(_) | TokenKind::TemplateTail(_) => {
                write!(f, "end of template interpolation")
            }
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "'{}'", other.literal()),
        }
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
    /// Open brace count for each template interpolation we are inside of.
    brackets: Vec<usize>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self {
            input,
            iter,
            brackets: Vec::new(),
            finished: false,
        }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn peek_second(&self) -> Option<char> {
        let mut iter = self.iter.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.next_idx(),
        }
    }

    /// Picks `long` when the next char is `second`, otherwise `short`.
    fn either(&mut self, second: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            long
        } else {
            short
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.iter.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

            let comment = matches!(self.iter.peek(), Some((_, '/'))) && self.peek_second() == Some('/');
            if !comment {
                return;
            }
            while self.iter.next_if(|(_, ch)| *ch != '\n').is_some() {}
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_letter(*ch) || ch.is_ascii_digit())
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token {
            kind: keywords(ident).unwrap_or_else(|| TokenKind::Ident(ident.into())),
            start,
            end,
        }
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let is_float = matches!(self.iter.peek(), Some((_, '.')))
            && self.peek_second().is_some_and(|ch| ch.is_ascii_digit());
        if is_float {
            self.iter.next();
            while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}
        }

        let end = self.next_idx();
        let number: Rc<str> = self.input[start..end].into();
        let kind = if is_float {
            TokenKind::Float(number)
        } else {
            TokenKind::Int(number)
        };
        Token { kind, start, end }
    }

    fn read_string(&mut self, start: usize) -> Token {
        let mut value = String::new();
        loop {
            match self.iter.next() {
                Some((_, '"')) => break,
                Some((_, '\\')) => match self.iter.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, other)) => value.push(other),
                    None => return self.token(TokenKind::Illegal("unterminated string".into()), start),
                },
                Some((_, ch)) => value.push(ch),
                None => return self.token(TokenKind::Illegal("unterminated string".into()), start),
            }
        }

        self.token(TokenKind::String(value.into()), start)
    }

    /// Reads template text until an interpolation opens or the backtick
    /// closes. `{{` and `}}` are de-escaped into single braces.
    /// `continued` is set when resuming after an interpolation's `}`.
    fn read_template(&mut self, start: usize, continued: bool) -> Token {
        let mut value = String::new();
        loop {
            match self.iter.next() {
                Some((_, '`')) => {
                    let kind = if continued {
                        TokenKind::TemplateTail(value.into())
                    } else {
                        TokenKind::TemplateString(value.into())
                    };
                    return self.token(kind, start);
                }
                Some((_, '{')) => {
                    if self.iter.next_if(|(_, ch)| *ch == '{').is_some() {
                        value.push('{');
                    } else {
                        self.brackets.push(1);
                        let kind = if continued {
                            TokenKind::TemplateMiddle(value.into())
                        } else {
                            TokenKind::TemplateHead(value.into())
                        };
                        return self.token(kind, start);
                    }
                }
                Some((_, '}')) => {
                    self.iter.next_if(|(_, ch)| *ch == '}');
                    value.push('}');
                }
                Some((_, ch)) => value.push(ch),
                None => return self.token(TokenKind::Illegal("unterminated string".into()), start),
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let Some((idx, ch)) = self.iter.next() else {
            let end = self.input.len();
            return Token {
                kind: TokenKind::Eof,
                start: end,
                end,
            };
        };

        let kind = match ch {
            '=' => self.either('=', TokenKind::Equal, TokenKind::Assign),
            ':' => self.either('=', TokenKind::Walrus, TokenKind::Colon),
            '+' => self.either('=', TokenKind::PlusAssign, TokenKind::Plus),
            '-' => self.either('=', TokenKind::MinusAssign, TokenKind::Minus),
            '*' => self.either('=', TokenKind::AsteriskAssign, TokenKind::Asterisk),
            '/' => self.either('=', TokenKind::SlashAssign, TokenKind::Slash),
            '%' => {
                if self.iter.next_if(|(_, ch)| *ch == '{').is_some() {
                    if let Some(top) = self.brackets.last_mut() {
                        *top += 1;
                    }
                    TokenKind::Hashmap
                } else {
                    self.either('=', TokenKind::PercentAssign, TokenKind::Percent)
                }
            }
            '!' => self.either('=', TokenKind::NotEqual, TokenKind::Bang),
            '<' => {
                if self.iter.next_if(|(_, ch)| *ch == '<').is_some() {
                    TokenKind::ShiftLeft
                } else {
                    self.either('=', TokenKind::LessEqual, TokenKind::LessThan)
                }
            }
            '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::GreaterThan),
            '.' => self.either('.', TokenKind::Range, TokenKind::Dot),
            '&' => self.either('&', TokenKind::And, TokenKind::Ampersand),
            '|' => self.either('|', TokenKind::Or, TokenKind::Pipe),
            '@' => self.either('\\', TokenKind::MacroIntro, TokenKind::At),
            '\\' => TokenKind::Backslash,
            ',' => TokenKind::Comma,
            ';' => TokenKind::SemiColon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => {
                if let Some(top) = self.brackets.last_mut() {
                    *top += 1;
                }
                TokenKind::LBrace
            }
            '}' => match self.brackets.last().copied() {
                Some(1) => {
                    self.brackets.pop();
                    return self.read_template(idx, true);
                }
                Some(depth) => {
                    if let Some(top) = self.brackets.last_mut() {
                        *top = depth - 1;
                    }
                    TokenKind::RBrace
                }
                None => TokenKind::RBrace,
            },
            '"' => return self.read_string(idx),
            '`' => return self.read_template(idx, false),
            c if Lexer::is_letter(c) => return self.read_identifier(idx),
            c if c.is_ascii_digit() => return self.read_number(idx),
            c => TokenKind::Illegal(format!("illegal character '{}'", c).into()),
        };

        self.token(kind, idx)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
            return None;
        }
        log::trace!("token {:?} at {}", token.kind, token.start);
        Some(token)
    }
}
