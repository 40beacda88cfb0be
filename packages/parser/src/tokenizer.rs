use logos::Logos;
use std::fmt;

/// Token types for the top-level surface of an ES module with Flow annotations
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    // Comments are kept so pragmas and headers survive a round trip
    #[regex(r"//[^\n]*", |lex| lex.slice())]
    LineComment(&'src str),

    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/", |lex| lex.slice())]
    BlockComment(&'src str),

    // Keywords
    #[token("import")]
    Import,

    #[token("export")]
    Export,

    #[token("from")]
    From,

    #[token("as")]
    As,

    #[token("default")]
    Default,

    #[token("type")]
    Type,

    #[token("typeof")]
    Typeof,

    #[token("opaque")]
    Opaque,

    #[token("interface")]
    Interface,

    #[token("const")]
    Const,

    #[token("let")]
    Let,

    #[token("var")]
    Var,

    #[token("function")]
    Function,

    #[token("async")]
    Async,

    #[token("class")]
    Class,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice())]
    Template(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+n?", |lex| lex.slice())]
    Number(&'src str),

    // Symbols
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("?")]
    Question,

    #[token("...")]
    Ellipsis,

    #[token(".")]
    Dot,

    #[token("=")]
    Equals,

    #[token("=>")]
    Arrow,

    #[token("*")]
    Star,

    #[token("|")]
    Pipe,

    // Anything else that can appear inside an expression; only its extent matters
    #[regex(r"[-+/%&^!~<>@#]|==|===|!=|!==|<=|>=|&&|\|\||\?\?|\+\+|--|\*\*", |lex| lex.slice())]
    Operator(&'src str),
}

impl<'src> Token<'src> {
    /// The word this token spells when it is used as a binding or property name.
    ///
    /// Contextual keywords (`type`, `from`, `as`, ...) are valid identifiers in
    /// most positions, so the parser asks for a name instead of an `Ident`.
    pub fn as_name(&self) -> Option<&'src str> {
        match self {
            Token::Ident(s) => Some(s),
            Token::Import => Some("import"),
            Token::Export => Some("export"),
            Token::From => Some("from"),
            Token::As => Some("as"),
            Token::Default => Some("default"),
            Token::Type => Some("type"),
            Token::Typeof => Some("typeof"),
            Token::Opaque => Some("opaque"),
            Token::Interface => Some("interface"),
            Token::Const => Some("const"),
            Token::Let => Some("let"),
            Token::Var => Some("var"),
            Token::Function => Some("function"),
            Token::Async => Some("async"),
            Token::Class => Some("class"),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }

    pub fn opens_group(&self) -> bool {
        matches!(self, Token::LBrace | Token::LParen | Token::LBracket)
    }

    pub fn closes_group(&self) -> bool {
        matches!(self, Token::RBrace | Token::RParen | Token::RBracket)
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LineComment(_) | Token::BlockComment(_) => write!(f, "comment"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Template(_) => write!(f, "template literal"),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Operator(op) => write!(f, "'{}'", op),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Question => write!(f, "'?'"),
            Token::Ellipsis => write!(f, "'...'"),
            Token::Dot => write!(f, "'.'"),
            Token::Equals => write!(f, "'='"),
            Token::Arrow => write!(f, "'=>'"),
            Token::Star => write!(f, "'*'"),
            Token::Pipe => write!(f, "'|'"),
            keyword => match keyword.as_name() {
                Some(word) => write!(f, "keyword '{}'", word),
                None => write!(f, "{:?}", keyword),
            },
        }
    }
}

/// Tokenize a source string.
///
/// Characters the lexer does not recognize are dropped; the parser only needs
/// statement boundaries and the handful of constructs it reads structurally.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let tokens = tokenize("import export type from as default");

        assert_eq!(tokens[0].0, Token::Import);
        assert_eq!(tokens[1].0, Token::Export);
        assert_eq!(tokens[2].0, Token::Type);
        assert_eq!(tokens[3].0, Token::From);
        assert_eq!(tokens[4].0, Token::As);
        assert_eq!(tokens[5].0, Token::Default);
    }

    #[test]
    fn test_identifiers_are_not_keywords() {
        let tokens = tokenize("types importer $state _private");

        assert_eq!(tokens[0].0, Token::Ident("types"));
        assert_eq!(tokens[1].0, Token::Ident("importer"));
        assert_eq!(tokens[2].0, Token::Ident("$state"));
        assert_eq!(tokens[3].0, Token::Ident("_private"));
    }

    #[test]
    fn test_strings_both_quotes() {
        let tokens = tokenize(r#"'./App/reducer' "./Todo/reducer" 'it\'s'"#);

        assert_eq!(tokens[0].0, Token::String("'./App/reducer'"));
        assert_eq!(tokens[1].0, Token::String("\"./Todo/reducer\""));
        assert_eq!(tokens[2].0, Token::String(r"'it\'s'"));
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = tokenize("// @flow\n/* block */ import");

        assert_eq!(tokens[0].0, Token::LineComment("// @flow"));
        assert_eq!(tokens[1].0, Token::BlockComment("/* block */"));
        assert_eq!(tokens[2].0, Token::Import);
    }

    #[test]
    fn test_block_comment_spans() {
        let tokens = tokenize("/* @flow */ import");
        assert_eq!(tokens, vec![(Token::BlockComment("/* @flow */"), 0..11), (Token::Import, 12..18)]);

        let doc = "/**\n * Store helpers\n */";
        assert_eq!(tokenize(doc), vec![(Token::BlockComment(doc), 0..doc.len())]);
    }

    #[test]
    fn test_block_comment_with_stars_inside() {
        let tokens = tokenize("/* a * b **/ x /**/");

        assert_eq!(tokens[0].0, Token::BlockComment("/* a * b **/"));
        assert_eq!(tokens[1].0, Token::Ident("x"));
        assert_eq!(tokens[2].0, Token::BlockComment("/**/"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_spread_and_arrow() {
        let tokens = tokenize("...rest => a.b");

        assert_eq!(tokens[0].0, Token::Ellipsis);
        assert_eq!(tokens[1].0, Token::Ident("rest"));
        assert_eq!(tokens[2].0, Token::Arrow);
        assert_eq!(tokens[4].0, Token::Dot);
    }

    #[test]
    fn test_contextual_keyword_names() {
        assert_eq!(Token::Type.as_name(), Some("type"));
        assert_eq!(Token::Ident("State").as_name(), Some("State"));
        assert_eq!(Token::LBrace.as_name(), None);
    }
}
