//! Script tokenization.
//!
//! Arguments are split into parts on `>`; inside a part every argument made
//! only of digits, `.` and `-` is a number, anything else a word.

use std::fmt;

/// Part separator.
pub const SEPARATOR: &str = ">";

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric argument. Malformed numbers such as `-` are NaN.
    Number(f64),
    Word(String),
}

impl Token {
    pub fn parse(arg: &str) -> Token {
        if !arg.is_empty()
            && arg
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        {
            Token::Number(leading_float(arg))
        } else {
            Token::Word(arg.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// The number as a non-negative integer count.
    pub fn as_count(&self) -> Option<u64> {
        self.as_number()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
    }

    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(w) if w == word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Token::Number(n) if n.is_nan() => f.write_str("NaN"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Word(w) => f.write_str(w),
        }
    }
}

/// Longest prefix of the form `-?digits[.digits]`, parsed; NaN when empty.
fn leading_float(arg: &str) -> f64 {
    let bytes = arg.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    arg[..end].parse().unwrap_or(f64::NAN)
}

/// A tokenized script: one token list per part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    parts: Vec<Vec<Token>>,
}

impl Script {
    /// Tokenize script arguments (the command name already removed).
    ///
    /// There is always at least one part, possibly empty.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Script {
        let mut parts = Vec::new();
        let mut current = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            if arg == SEPARATOR {
                parts.push(std::mem::take(&mut current));
            } else {
                current.push(Token::parse(arg));
            }
        }
        parts.push(current);
        Script { parts }
    }

    pub fn parts(&self) -> &[Vec<Token>] {
        &self.parts
    }

    pub fn is_single_part(&self) -> bool {
        self.parts.len() == 1
    }

    /// `F` of a leading `F fps` in the first part.
    pub fn leading_fps(&self) -> Option<f64> {
        match self.parts.first()?.as_slice() {
            [first, second, ..] if second.is_word("fps") => first.as_number(),
            _ => None,
        }
    }
}

/// Render tokens the way they were written, for error messages.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_classification() {
        assert_eq!(Token::parse("30"), Token::Number(30.0));
        assert_eq!(Token::parse("-2.5"), Token::Number(-2.5));
        assert_eq!(Token::parse("1.2.3"), Token::Number(1.2));
        assert!(matches!(Token::parse("-"), Token::Number(n) if n.is_nan()));
        assert_eq!(Token::parse("fps"), Token::Word("fps".into()));
        assert_eq!(Token::parse("3x"), Token::Word("3x".into()));
    }

    #[test]
    fn test_counts() {
        assert_eq!(Token::parse("12").as_count(), Some(12));
        assert_eq!(Token::parse("1.5").as_count(), None);
        assert_eq!(Token::parse("-1").as_count(), None);
        assert_eq!(Token::parse("-").as_count(), None);
        assert_eq!(Token::parse("wait").as_count(), None);
    }

    #[test]
    fn test_parts() {
        let script = Script::parse(&["30", ">", "wait", "5", ">", "10", "2"]);
        assert_eq!(script.parts().len(), 3);
        assert!(!script.is_single_part());
        assert_eq!(
            script.parts()[2],
            vec![Token::Number(10.0), Token::Number(2.0)]
        );

        let empty = Script::parse::<&str>(&[]);
        assert!(empty.is_single_part());
        assert!(empty.parts()[0].is_empty());
    }

    #[test]
    fn test_leading_fps() {
        assert_eq!(Script::parse(&["5", "fps", "30"]).leading_fps(), Some(5.0));
        assert_eq!(Script::parse(&["30", "5", "fps"]).leading_fps(), None);
    }

    #[test]
    fn test_join_tokens() {
        let tokens = vec![Token::Word("foo".into()), Token::Number(3.0), Token::Number(0.5)];
        assert_eq!(join_tokens(&tokens), "foo 3 0.5");
    }
}
