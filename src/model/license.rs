//! License entries and license expression handling.
//!
//! License keys are DejaCode/ScanCode keys (e.g. `apache-2.0`, `gpl-2.0-plus`),
//! not SPDX identifiers, so expressions are tokenized with a small purpose-built
//! parser: parentheses, the connectives `and`, `or`, `with`, and keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default base URL used to derive license URLs.
pub const DEFAULT_LICENSE_URL_BASE: &str = "https://enterprise.dejacode.com";

/// Derive the display URL of a license from an API base (`scheme://host[:port]`).
pub fn license_url(base: &str, key: &str) -> String {
    format!(
        "{}/urn/?urn=urn:dje:license:{key}",
        base.trim_end_matches('/')
    )
}

/// One license referenced by a record.
///
/// Two entries with the same `key` are the same license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// File name of the license text next to the descriptor
    pub file: String,
    pub url: String,
    /// Full license text, when resolved
    #[serde(skip)]
    pub text: Option<String>,
}

impl License {
    /// Create an entry with the default file name and a URL derived from `url_base`.
    pub fn new(key: impl Into<String>, url_base: &str) -> Self {
        let key = key.into();
        Self {
            file: format!("{key}.LICENSE"),
            url: license_url(url_base, &key),
            name: None,
            text: None,
            key,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether license text is available and non-empty
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl PartialEq for License {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for License {}

impl std::hash::Hash for License {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Op(&'static str),
    Key(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
            Self::Op(op) => f.write_str(op),
            Self::Key(key) => f.write_str(key),
        }
    }
}

fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if word.is_empty() {
            return;
        }
        let lower = word.to_lowercase();
        tokens.push(match lower.as_str() {
            "and" => Token::Op("and"),
            "or" => Token::Op("or"),
            "with" => Token::Op("with"),
            _ => Token::Key(lower),
        });
        word.clear();
    };

    for c in raw.chars() {
        match c {
            '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Close);
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

/// A parsed license expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseExpression {
    /// Normalized expression, or the trimmed raw value when invalid
    pub expression: String,
    /// License keys in first-seen order, without duplicates
    pub keys: Vec<String>,
    /// Why the expression is invalid, if it is
    pub error: Option<String>,
}

impl LicenseExpression {
    /// Parse an expression. Never fails: syntax problems are reported in `error`
    /// and every key that could be extracted is still returned.
    pub fn parse(raw: &str) -> Self {
        let tokens = tokenize(raw);

        let mut keys: Vec<String> = Vec::new();
        for token in &tokens {
            if let Token::Key(key) = token {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }

        let error = check_syntax(&tokens).err();
        let expression = if error.is_some() {
            raw.trim().to_string()
        } else {
            normalize(&tokens)
        };

        Self {
            expression,
            keys,
            error,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

fn check_syntax(tokens: &[Token]) -> Result<(), String> {
    let mut depth = 0usize;
    let mut expect_operand = true;

    for token in tokens {
        match token {
            Token::Key(key) => {
                if !expect_operand {
                    return Err(format!("missing connective before license key '{key}'"));
                }
                expect_operand = false;
            }
            Token::Open => {
                if !expect_operand {
                    return Err("missing connective before '('".to_string());
                }
                depth += 1;
            }
            Token::Close => {
                if depth == 0 {
                    return Err("unbalanced parentheses".to_string());
                }
                if expect_operand {
                    return Err("empty group or connective before ')'".to_string());
                }
                depth -= 1;
            }
            Token::Op(op) => {
                if expect_operand {
                    return Err(format!("misplaced connective '{op}'"));
                }
                expect_operand = true;
            }
        }
    }

    if depth > 0 {
        return Err("unbalanced parentheses".to_string());
    }
    if expect_operand && !tokens.is_empty() {
        return Err("expression ends with a connective".to_string());
    }
    Ok(())
}

fn normalize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        let glue = matches!(prev, Some(Token::Open)) || matches!(token, Token::Close);
        if prev.is_some() && !glue {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        prev = Some(token);
    }
    out
}
