use std::ops::Range;

use logos::Logos;

use crate::diagnostics::Diagnostic;

/// Token type for ACLang source.
///
/// The lexer only separates what the normalizer must treat specially:
/// whitespace, comments, directives, string literals and statement ends.
/// Everything else is plain text handed through to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of spaces, tabs and newlines.
    Whitespace,
    /// `// ...` up to the end of the line.
    LineComment,
    /// `/* ... */`.
    BlockComment,
    /// A preprocessor directive such as `&use(std)`.
    Directive {
        /// Directive name without the `&`.
        name: String,
        /// Raw text between the parentheses.
        args: String,
    },
    /// A double-quoted string literal, quotes and escapes kept verbatim.
    Str(String),
    /// Statement terminator `;`.
    Semicolon,
    /// Any other source text.
    Text(String),
}

#[derive(Logos, Debug)]
enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*")]
    BlockCommentStart,

    #[regex(r"&[A-Za-z_][A-Za-z0-9_]*\([^)\n]*\)")]
    Directive,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[token(";")]
    Semicolon,

    #[regex(r#"[^ \t\r\n;"/&]+"#)]
    Text,

    #[token("/")]
    Slash,

    #[token("&")]
    Ampersand,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

impl From<LexError> for Diagnostic {
    fn from(e: LexError) -> Self {
        Diagnostic::error(e.span, e.message)
    }
}

/// Lex source code into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors; the offending text is kept as [`Token::Text`].
pub fn lex(source: &str) -> (Vec<(Token, Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::Whitespace) => Token::Whitespace,
            Ok(RawToken::LineComment) => Token::LineComment,
            Ok(RawToken::BlockCommentStart) => {
                let remainder = lexer.remainder();
                match remainder.find("*/") {
                    Some(end_idx) => lexer.bump(end_idx + 2),
                    None => {
                        errors.push(LexError {
                            span: span.clone(),
                            message: "unterminated block comment (missing closing */)".to_string(),
                        });
                        lexer.bump(remainder.len());
                    }
                }
                tokens.push((Token::BlockComment, span.start..lexer.span().end));
                continue;
            }
            Ok(RawToken::Directive) => {
                let slice = lexer.slice();
                let open = slice.find('(').unwrap_or(slice.len() - 1);
                Token::Directive {
                    name: slice[1..open].to_string(),
                    args: slice[open + 1..slice.len() - 1].to_string(),
                }
            }
            Ok(RawToken::Str) => Token::Str(lexer.slice().to_string()),
            Ok(RawToken::Semicolon) => Token::Semicolon,
            Ok(RawToken::Text | RawToken::Slash | RawToken::Ampersand) => {
                Token::Text(lexer.slice().to_string())
            }
            Err(()) => {
                let slice = &source[span.clone()];
                let message = if slice.starts_with('"') {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character: {slice:?}")
                };
                errors.push(LexError {
                    span: span.clone(),
                    message,
                });
                Token::Text(slice.to_string())
            }
        };
        tokens.push((token, span));
    }

    (tokens, errors)
}

/// A statement after normalization, with the byte range it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Trimmed statement text without the terminating `;`.
    pub text: String,
    /// Byte range in the preprocessed source.
    pub span: Range<usize>,
}

impl Statement {
    /// A statement with the given text and span.
    pub fn new(text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Non-empty statements in source order.
    pub statements: Vec<Statement>,
    /// Lexer errors and warnings about leftover directives.
    pub diagnostics: Vec<Diagnostic>,
}

/// Strip comments and directives, collapse whitespace, and split the source
/// into `;`-terminated statements.
///
/// Whitespace inside string literals is kept. Empty statements are dropped.
pub fn normalize(source: &str) -> Normalized {
    let (tokens, errors) = lex(source);
    let mut out = Normalized {
        diagnostics: errors.into_iter().map(Diagnostic::from).collect(),
        ..Default::default()
    };

    let mut text = String::new();
    let mut span: Option<Range<usize>> = None;
    let mut pending_space = false;

    for (token, range) in tokens {
        let piece = match token {
            Token::Whitespace | Token::LineComment | Token::BlockComment => {
                pending_space = true;
                continue;
            }
            Token::Directive { name, .. } => {
                out.diagnostics.push(
                    Diagnostic::warning(range, format!("directive `&{name}` was not expanded"))
                        .with_label("removed before parsing"),
                );
                pending_space = true;
                continue;
            }
            Token::Semicolon => {
                if let Some(span) = span.take() {
                    out.statements.push(Statement::new(std::mem::take(&mut text), span));
                }
                pending_space = false;
                continue;
            }
            Token::Str(s) | Token::Text(s) => s,
        };

        if pending_space && !text.is_empty() {
            text.push(' ');
        }
        pending_space = false;
        text.push_str(&piece);
        span = Some(match span {
            Some(s) => s.start..range.end,
            None => range,
        });
    }
    if let Some(span) = span {
        out.statements.push(Statement::new(text, span));
    }

    tracing::debug!(statements = out.statements.len(), "normalized source");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        normalize(source)
            .statements
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn lex_directive_parts() {
        let (tokens, errors) = lex("&use( std, extra )");
        assert!(errors.is_empty());
        assert_eq!(
            tokens[0].0,
            Token::Directive {
                name: "use".to_string(),
                args: " std, extra ".to_string()
            }
        );
    }

    #[test]
    fn lex_string_keeps_quotes_and_escapes() {
        let (tokens, errors) = lex(r#"say: "a \"b\"; c""#);
        assert!(errors.is_empty());
        assert!(tokens.iter().any(|(t, _)| *t == Token::Str(r#""a \"b\"; c""#.to_string())));
        assert!(!tokens.iter().any(|(t, _)| *t == Token::Semicolon));
    }

    #[test]
    fn lex_unterminated_string_is_reported() {
        let (_, errors) = lex("say: \"oops");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated string"));
    }

    #[test]
    fn lex_preserves_spans() {
        let (tokens, _) = lex("room: Hall;");
        assert_eq!(tokens[0], (Token::Text("room:".to_string()), 0..5));
        assert_eq!(tokens[2], (Token::Text("Hall".to_string()), 6..10));
        assert_eq!(tokens[3], (Token::Semicolon, 10..11));
    }

    #[test]
    fn normalize_splits_and_trims() {
        assert_eq!(
            texts("  room:   Hall ;\n\n item: Lamp;;  "),
            vec!["room: Hall", "item: Lamp"]
        );
    }

    #[test]
    fn normalize_strips_comments() {
        let source = "// header\nroom: Hall; /* a\nblock */ item: Lamp // trailing\n;";
        assert_eq!(texts(source), vec!["room: Hall", "item: Lamp"]);
    }

    #[test]
    fn normalize_keeps_string_contents() {
        assert_eq!(
            texts("say:   \"two  spaces; // not a comment\";"),
            vec!["say: \"two  spaces; // not a comment\""]
        );
    }

    #[test]
    fn normalize_statement_without_terminator() {
        assert_eq!(texts("endsuccess"), vec!["endsuccess"]);
        assert!(texts("  // nothing\n").is_empty());
    }

    #[test]
    fn normalize_statement_spans() {
        let out = normalize("room: Hall;  item: Lamp;");
        assert_eq!(out.statements[0].span, 0..10);
        assert_eq!(out.statements[1].span, 13..23);
    }

    #[test]
    fn normalize_warns_about_leftover_directives() {
        let out = normalize("&include(x) room: Hall;");
        assert_eq!(texts("&include(x) room: Hall;"), vec!["room: Hall"]);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("&include"));
    }
}
