use logos::{Lexer, Logos};

/// Markup-level tokens of an HTML string
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum HtmlToken<'src> {
    /// `<!-- ... -->`, carrying the comment body. An unterminated comment
    /// runs to the end of input.
    #[token("<!--", comment)]
    Comment(&'src str),

    /// `<!DOCTYPE ...>` and Word's `<![if ...]>` / `<![endif]>` markers
    #[regex(r"<![a-zA-Z\[][^>]*>", |lex| lex.slice())]
    Declaration(&'src str),

    /// `<?xml ...?>` and `<?xml:namespace ...>`
    #[regex(r"<\?[^>]*>", |lex| lex.slice())]
    ProcessingInstruction(&'src str),

    #[regex(r#"<[a-zA-Z][^\s/>]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    StartTag(&'src str),

    #[regex(r"</[a-zA-Z][^>]*>", |lex| lex.slice())]
    EndTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that does not open any markup; treated as text
    #[token("<")]
    Lt,
}

fn comment<'src>(lex: &mut Lexer<'src, HtmlToken<'src>>) -> &'src str {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            &rest[..end]
        }
        None => {
            lex.bump(rest.len());
            rest
        }
    }
}

/// Tokens inside a start tag, after the tag name
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\x0C]+")]
enum AttrToken<'src> {
    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    SingleQuoted(&'src str),

    #[regex(r#"[^\s"'=>]+"#, |lex| lex.slice())]
    Bare(&'src str),
}

/// A decomposed start tag
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag<'src> {
    /// Lowercased tag name
    pub name: String,
    /// Raw (undecoded) attribute values, names lowercased, in source order
    pub attributes: Vec<(String, &'src str)>,
    pub self_closing: bool,
}

/// Split `<name a=b c="d">` into name, attributes and the self-closing flag
pub fn parse_start_tag(tag: &str) -> StartTag<'_> {
    let inner = tag
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(tag);

    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();

    let mut rest = &inner[name_end..];
    let trimmed = rest.trim_end();
    let self_closing = trimmed.ends_with('/');
    if self_closing {
        rest = &trimmed[..trimmed.len() - 1];
    }

    StartTag {
        name,
        attributes: parse_attributes(rest),
        self_closing,
    }
}

/// End tag name, lowercased
pub fn end_tag_name(tag: &str) -> String {
    let inner = tag.trim_start_matches("</").trim_end_matches('>');
    inner
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_attributes(source: &str) -> Vec<(String, &str)> {
    let mut attributes: Vec<(String, &str)> = Vec::new();
    let mut lexer = AttrToken::lexer(source).peekable();

    while let Some(token) = lexer.next() {
        let Ok(AttrToken::Bare(name)) = token else {
            // Stray `=`, quotes without a name or unterminated quotes
            continue;
        };

        if name == "/" {
            continue;
        }

        let name = name.to_ascii_lowercase();
        let mut value = "";

        if matches!(lexer.peek(), Some(Ok(AttrToken::Eq))) {
            lexer.next();
            match lexer.peek() {
                Some(Ok(AttrToken::DoubleQuoted(v)))
                | Some(Ok(AttrToken::SingleQuoted(v)))
                | Some(Ok(AttrToken::Bare(v))) => {
                    value = *v;
                    lexer.next();
                }
                _ => {}
            }
        }

        // First occurrence wins
        if !attributes.iter().any(|(existing, _)| *existing == name) {
            attributes.push((name, value));
        }
    }

    attributes
}
