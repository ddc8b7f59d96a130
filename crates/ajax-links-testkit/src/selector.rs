//! Selector matching for the in-memory DOM
//!
//! Supports type, universal, `#id`, `.class`, `[attr]` and `[attr=value]`
//! simple selectors, descendant and child combinators, and selector lists.
//! Anything else is rejected the way `querySelectorAll` rejects it.

use crate::tree::{Arena, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut complexes = Vec::new();
        for part in split_top_level(input) {
            let part = part.trim();
            if part.is_empty() {
                return Err("empty selector".to_string());
            }
            complexes.push(Complex::parse(part)?);
        }
        Ok(Self(complexes))
    }

    /// Whether the element matches any selector in the list
    pub fn matches(&self, arena: &Arena, id: NodeId) -> bool {
        arena.is_element(id) && self.0.iter().any(|complex| complex.matches(arena, id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds left to right; `combinators[i]` sits between compound `i` and `i + 1`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Complex {
    fn parse(input: &str) -> Result<Self, String> {
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();

        loop {
            let before = pos;
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            if pos >= chars.len() {
                break;
            }
            let saw_space = pos > before;

            if !compounds.is_empty() {
                match chars[pos] {
                    '>' => {
                        pos += 1;
                        while pos < chars.len() && chars[pos].is_whitespace() {
                            pos += 1;
                        }
                        combinators.push(Combinator::Child);
                    }
                    '+' | '~' => return Err(format!("unsupported combinator '{}'", chars[pos])),
                    _ if saw_space => combinators.push(Combinator::Descendant),
                    other => return Err(format!("unexpected '{other}'")),
                }
            }

            let (compound, next) = Compound::parse(&chars, pos)?;
            compounds.push(compound);
            pos = next;
        }

        if compounds.is_empty() || combinators.len() + 1 != compounds.len() {
            return Err("dangling combinator".to_string());
        }
        Ok(Self {
            compounds,
            combinators,
        })
    }

    fn matches(&self, arena: &Arena, id: NodeId) -> bool {
        self.matches_from(arena, id, self.compounds.len() - 1)
    }

    fn matches_from(&self, arena: &Arena, id: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(arena, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => arena
                .parent(id)
                .filter(|&parent| arena.is_element(parent))
                .is_some_and(|parent| self.matches_from(arena, parent, index - 1)),
            Combinator::Descendant => {
                let mut cursor = arena.parent(id);
                while let Some(ancestor) = cursor {
                    if !arena.is_element(ancestor) {
                        break;
                    }
                    if self.matches_from(arena, ancestor, index - 1) {
                        return true;
                    }
                    cursor = arena.parent(ancestor);
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn parse(chars: &[char], mut pos: usize) -> Result<(Self, usize), String> {
        let start = pos;
        let mut compound = Self::default();

        if pos < chars.len() && chars[pos] == '*' {
            pos += 1;
        } else if pos < chars.len() && is_ident(chars[pos]) {
            let (tag, next) = ident(chars, pos)?;
            compound.tag = Some(tag.to_ascii_lowercase());
            pos = next;
        }

        while pos < chars.len() {
            match chars[pos] {
                '#' => {
                    let (id, next) = ident(chars, pos + 1)?;
                    compound.id = Some(id);
                    pos = next;
                }
                '.' => {
                    let (class, next) = ident(chars, pos + 1)?;
                    compound.classes.push(class);
                    pos = next;
                }
                '[' => {
                    let (test, next) = attr_test(chars, pos + 1)?;
                    compound.attrs.push(test);
                    pos = next;
                }
                ':' => return Err("pseudo-classes are not supported".to_string()),
                _ => break,
            }
        }

        if pos == start {
            return Err(format!("expected selector at '{}'", chars[start..].iter().collect::<String>()));
        }
        Ok((compound, pos))
    }

    fn matches(&self, arena: &Arena, id: NodeId) -> bool {
        let Some(tag) = arena.tag(id) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|wanted| wanted != tag) {
            return false;
        }
        if let Some(wanted) = &self.id {
            if arena.attr(id, "id") != Some(wanted.as_str()) {
                return false;
            }
        }
        let classes = arena.classes(id);
        if !self.classes.iter().all(|class| classes.contains(&class.as_str())) {
            return false;
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Present(name) => arena.attr(id, name).is_some(),
            AttrTest::Equals(name, value) => arena.attr(id, name) == Some(value.as_str()),
        })
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn ident(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let mut pos = start;
    while pos < chars.len() && is_ident(chars[pos]) {
        pos += 1;
    }
    if pos == start {
        return Err("expected identifier".to_string());
    }
    Ok((chars[start..pos].iter().collect(), pos))
}

fn attr_test(chars: &[char], start: usize) -> Result<(AttrTest, usize), String> {
    let skip_ws = |mut pos: usize| {
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
        }
        pos
    };

    let (name, mut pos) = ident(chars, skip_ws(start))?;
    let name = name.to_ascii_lowercase();
    pos = skip_ws(pos);

    match chars.get(pos) {
        Some(']') => Ok((AttrTest::Present(name), pos + 1)),
        Some('=') => {
            pos = skip_ws(pos + 1);
            let value = match chars.get(pos) {
                Some(&quote @ ('"' | '\'')) => {
                    let body_start = pos + 1;
                    let end = chars[body_start..]
                        .iter()
                        .position(|&c| c == quote)
                        .ok_or("unterminated attribute value")?;
                    pos = body_start + end + 1;
                    chars[body_start..body_start + end].iter().collect()
                }
                _ => {
                    let (value, next) = ident(chars, pos)?;
                    pos = next;
                    value
                }
            };
            pos = skip_ws(pos);
            if chars.get(pos) != Some(&']') {
                return Err("expected ']'".to_string());
            }
            Ok((AttrTest::Equals(name, value), pos + 1))
        }
        _ => Err("unsupported attribute operator".to_string()),
    }
}

/// Split on commas outside brackets and quotes.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Arena {
        let mut arena = Arena::new();
        arena.append_html(Arena::DOCUMENT, html);
        arena
    }

    fn select(arena: &Arena, selector: &str) -> Vec<String> {
        let list = SelectorList::parse(selector).unwrap();
        arena
            .descendants(Arena::DOCUMENT)
            .into_iter()
            .filter(|&id| list.matches(arena, id))
            .map(|id| arena.outer_html(id))
            .collect()
    }

    const PAGE: &str = r#"<div class="wrap" id="main"><ul><li class="item a">1</li><li class="item" data-k="v">2</li></ul><p><a href="/x" data-ajax-link-target=".wrap">x</a></p></div>"#;

    #[test]
    fn simple_selectors() {
        let arena = doc(PAGE);
        assert_eq!(select(&arena, "li").len(), 2);
        assert_eq!(select(&arena, "#main").len(), 1);
        assert_eq!(select(&arena, ".item.a"), vec![r#"<li class="item a">1</li>"#]);
        assert_eq!(select(&arena, "[data-k=v]").len(), 1);
        assert_eq!(select(&arena, r#"[data-k="v"]"#).len(), 1);
        assert_eq!(select(&arena, "[data-ajax-link-target]").len(), 1);
        assert_eq!(select(&arena, "*").len(), 6);
    }

    #[test]
    fn combinators_and_lists() {
        let arena = doc(PAGE);
        assert_eq!(select(&arena, ".wrap li").len(), 2);
        assert_eq!(select(&arena, ".wrap > li").len(), 0);
        assert_eq!(select(&arena, "ul > li").len(), 2);
        assert_eq!(select(&arena, "p a, #main").len(), 2);
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(SelectorList::parse("a:hover").is_err());
        assert!(SelectorList::parse("a + b").is_err());
        assert!(SelectorList::parse("a >").is_err());
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("[x~=y]").is_err());
    }
}
