//! Minimal CSS selector matcher
//!
//! Supports what the action scanner needs: comma-separated selector lists
//! of compound selectors (`tag`, `*`, `.class`, `#id`, `[attr]`,
//! `[attr=value]`) joined by descendant (whitespace) or child (`>`)
//! combinators.

use thiserror::Error;

use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One complex selector, stored left to right. `steps[i].0` is the
/// combinator linking `steps[i]` to `steps[i - 1]` (ignored for `i == 0`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    steps: Vec<(Combinator, Compound)>,
}

/// Parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut selectors = Vec::new();
        let mut offset = 0;
        for part in input.split(',') {
            selectors.push(parse_complex(part, offset)?);
            offset += part.len() + 1;
        }
        Ok(Self { selectors })
    }

    /// Parse each entry of `parts` and combine them into one list
    pub fn parse_all<S: AsRef<str>>(parts: &[S]) -> Result<Self, SelectorError> {
        let mut selectors = Vec::new();
        for part in parts {
            selectors.extend(Self::parse(part.as_ref())?.selectors);
        }
        if selectors.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { selectors })
    }

    /// List that matches nothing
    pub fn empty() -> Self {
        Self {
            selectors: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Whether `node` matches any selector in the list
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|complex| matches_at(doc, node, &complex.steps))
    }

    /// Matching descendants of `scope` in document order, each once
    pub fn query_all(&self, doc: &Document, scope: NodeId) -> Vec<NodeId> {
        doc.descendants(scope)
            .into_iter()
            .filter(|&node| self.matches(doc, node))
            .collect()
    }
}

fn matches_at(doc: &Document, node: NodeId, steps: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, compound), rest)) = steps.split_last() else {
        return true;
    };
    if !compound_matches(doc, node, compound) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }

    match combinator {
        Combinator::Child => doc
            .get(node)
            .and_then(|el| el.parent())
            .is_some_and(|parent| matches_at(doc, parent, rest)),
        Combinator::Descendant => doc
            .ancestors(node)
            .any(|ancestor| matches_at(doc, ancestor, rest)),
    }
}

fn compound_matches(doc: &Document, node: NodeId, compound: &Compound) -> bool {
    let Some(el) = doc.get(node) else {
        return false;
    };
    if el.tag() == Document::ROOT_TAG {
        return false;
    }
    if compound.tag.as_deref().is_some_and(|tag| tag != el.tag()) {
        return false;
    }
    if compound
        .id
        .as_deref()
        .is_some_and(|id| el.attr("id") != Some(id))
    {
        return false;
    }
    if !compound.classes.iter().all(|c| el.has_class(c)) {
        return false;
    }
    compound.attrs.iter().all(|attr| match attr {
        AttrMatch::Exists(name) => el.attr(name).is_some(),
        AttrMatch::Equals(name, value) => el.attr(name) == Some(value.as_str()),
    })
}

fn parse_complex(input: &str, base: usize) -> Result<Complex, SelectorError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut pos = 0;
    let mut steps = Vec::new();
    let mut pending = Combinator::Descendant;

    loop {
        let mut saw_space = false;
        while pos < chars.len() && chars[pos].1.is_whitespace() {
            pos += 1;
            saw_space = true;
        }
        if pos >= chars.len() {
            break;
        }

        if chars[pos].1 == '>' {
            if steps.is_empty() {
                return Err(unexpected(&chars, pos, base));
            }
            pending = Combinator::Child;
            pos += 1;
            continue;
        }
        if !steps.is_empty() && !saw_space && pending == Combinator::Descendant {
            return Err(unexpected(&chars, pos, base));
        }

        let compound = parse_compound(&chars, &mut pos, base)?;
        steps.push((pending, compound));
        pending = Combinator::Descendant;
    }

    if steps.is_empty() {
        return Err(SelectorError::Empty);
    }
    if pending == Combinator::Child {
        return Err(SelectorError::Empty);
    }
    Ok(Complex { steps })
}

fn parse_compound(
    chars: &[(usize, char)],
    pos: &mut usize,
    base: usize,
) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let start = *pos;

    if chars[*pos].1 == '*' {
        *pos += 1;
    } else if is_ident_char(chars[*pos].1) {
        compound.tag = Some(read_ident(chars, pos).to_ascii_lowercase());
    }

    while *pos < chars.len() {
        match chars[*pos].1 {
            '.' => {
                *pos += 1;
                let class = read_ident(chars, pos);
                if class.is_empty() {
                    return Err(unexpected(chars, *pos, base));
                }
                compound.classes.push(class);
            }
            '#' => {
                *pos += 1;
                let id = read_ident(chars, pos);
                if id.is_empty() {
                    return Err(unexpected(chars, *pos, base));
                }
                compound.id = Some(id);
            }
            '[' => {
                *pos += 1;
                compound.attrs.push(parse_attr(chars, pos, base)?);
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return Err(unexpected(chars, *pos, base)),
        }
    }

    if *pos == start {
        return Err(unexpected(chars, *pos, base));
    }
    Ok(compound)
}

fn parse_attr(
    chars: &[(usize, char)],
    pos: &mut usize,
    base: usize,
) -> Result<AttrMatch, SelectorError> {
    let name = read_ident(chars, pos).to_ascii_lowercase();
    if name.is_empty() {
        return Err(unexpected(chars, *pos, base));
    }

    match chars.get(*pos).map(|(_, c)| *c) {
        Some(']') => {
            *pos += 1;
            Ok(AttrMatch::Exists(name))
        }
        Some('=') => {
            *pos += 1;
            let value = match chars.get(*pos).map(|(_, c)| *c) {
                Some(quote @ ('"' | '\'')) => {
                    *pos += 1;
                    let mut value = String::new();
                    loop {
                        match chars.get(*pos).map(|(_, c)| *c) {
                            Some(c) if c == quote => {
                                *pos += 1;
                                break;
                            }
                            Some(c) => {
                                value.push(c);
                                *pos += 1;
                            }
                            None => return Err(SelectorError::UnterminatedAttribute),
                        }
                    }
                    value
                }
                _ => read_ident(chars, pos),
            };
            match chars.get(*pos).map(|(_, c)| *c) {
                Some(']') => {
                    *pos += 1;
                    Ok(AttrMatch::Equals(name, value))
                }
                Some(_) => Err(unexpected(chars, *pos, base)),
                None => Err(SelectorError::UnterminatedAttribute),
            }
        }
        Some(_) => Err(unexpected(chars, *pos, base)),
        None => Err(SelectorError::UnterminatedAttribute),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[(usize, char)], pos: &mut usize) -> String {
    let mut out = String::new();
    while let Some(&(_, c)) = chars.get(*pos) {
        if !is_ident_char(c) {
            break;
        }
        out.push(c);
        *pos += 1;
    }
    out
}

fn unexpected(chars: &[(usize, char)], pos: usize, base: usize) -> SelectorError {
    match chars.get(pos) {
        Some(&(offset, ch)) => SelectorError::UnexpectedChar {
            ch,
            offset: base + offset,
        },
        None => SelectorError::Empty,
    }
}
