use serde::{Deserialize, Serialize};

use crate::error::PrismaticResult;

/// A node of the tokenizer output tree.
///
/// `Text` is an unclassified leaf. `Syntax` carries the token type name from
/// the grammar, an optional alias, and either the matched substring or the
/// child tokens produced by a nested grammar.
///
/// Concatenating all leaf text of a token tree in order reconstructs the
/// tokenized input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text {
        content: String,
    },
    Syntax {
        name: String,
        alias: Option<String>,
        content: TokenContent,
    },
}

/// What a syntax token holds: the raw matched substring, or the token tree
/// produced by tokenizing that substring with a nested grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenContent {
    Text(String),
    Children(Vec<Token>),
}

/// Sentinel token type name for unclassified text on the wire
pub const TEXT_TOKEN_TYPE: &str = "text";

impl Token {
    pub fn text(content: impl Into<String>) -> Self {
        Token::Text {
            content: content.into(),
        }
    }

    /// The concatenated leaf text of this token
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain_text(&mut out);
        out
    }

    fn write_plain_text(&self, out: &mut String) {
        match self {
            Token::Text { content } => out.push_str(content),
            Token::Syntax { content, .. } => match content {
                TokenContent::Text(text) => out.push_str(text),
                TokenContent::Children(children) => {
                    for child in children {
                        child.write_plain_text(out);
                    }
                }
            },
        }
    }
}

/// The concatenated leaf text of a token list, in tree order
pub fn plain_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_plain_text(&mut out);
    }
    out
}

/// Renders a token list to its wire form: a JSON array of
/// `{"type": "text", "content": s}` and
/// `{"type": name, "alias"?: name, "content": s | [...]}` objects.
pub fn tokens_to_json(tokens: &[Token]) -> PrismaticResult<String> {
    Ok(serde_json::to_string(tokens)?)
}

/// Parses the wire form back into a token list.
///
/// Structural round-trip: `tokens_from_json(&tokens_to_json(t)?)? == t`.
pub fn tokens_from_json(json: &str) -> PrismaticResult<Vec<Token>> {
    Ok(serde_json::from_str(json)?)
}

/// The wire shape. `TokenContent` is flattened into either a JSON string or
/// an array of nested wire tokens, so the externally visible format stays a
/// plain tagged tree with no Rust-enum framing.
#[derive(Serialize, Deserialize)]
struct WireToken {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    alias: Option<String>,
    content: WireContent,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Children(Vec<Token>),
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wire = match self {
            Token::Text { content } => WireToken {
                kind: TEXT_TOKEN_TYPE.to_string(),
                alias: None,
                content: WireContent::Text(content.clone()),
            },
            Token::Syntax {
                name,
                alias,
                content,
            } => WireToken {
                kind: name.clone(),
                alias: alias.clone(),
                content: match content {
                    TokenContent::Text(text) => WireContent::Text(text.clone()),
                    TokenContent::Children(children) => WireContent::Children(children.clone()),
                },
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = WireToken::deserialize(deserializer)?;
        if wire.kind == TEXT_TOKEN_TYPE {
            let content = match wire.content {
                WireContent::Text(text) => text,
                WireContent::Children(_) => {
                    return Err(serde::de::Error::custom(
                        "text tokens cannot have child tokens",
                    ));
                }
            };
            return Ok(Token::Text { content });
        }
        Ok(Token::Syntax {
            name: wire.kind,
            alias: wire.alias,
            content: match wire.content {
                WireContent::Text(text) => TokenContent::Text(text),
                WireContent::Children(children) => TokenContent::Children(children),
            },
        })
    }
}
