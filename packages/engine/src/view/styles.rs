//! Inline style declarations (`style="a:b;c:d"`)

/// Split a style attribute into `(property, value)` pairs.
///
/// Property names are lowercased. Semicolons inside quotes or parentheses
/// (`url(data:...;base64,...)`) do not terminate a declaration. Entries
/// without a colon or with an empty property are dropped.
pub fn parse_styles(value: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for ch in value.chars() {
        match (ch, quote) {
            ('"' | '\'', None) => {
                quote = Some(ch);
                current.push(ch);
            }
            (c, Some(q)) if c == q => {
                quote = None;
                current.push(ch);
            }
            ('(', None) => {
                depth += 1;
                current.push(ch);
            }
            (')', None) => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            (';', None) if depth == 0 => {
                push_declaration(&mut declarations, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_declaration(&mut declarations, &current);

    declarations
}

fn push_declaration(declarations: &mut Vec<(String, String)>, raw: &str) {
    let Some((property, value)) = raw.split_once(':') else {
        return;
    };

    let property = property.trim().to_ascii_lowercase();
    if property.is_empty() {
        return;
    }

    declarations.push((property, value.trim().to_string()));
}

/// Serialize declarations back into `a:b;c:d` form
pub fn stringify_styles<'a>(styles: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    styles
        .into_iter()
        .map(|(property, value)| format!("{}:{}", property, value))
        .collect::<Vec<_>>()
        .join(";")
}
