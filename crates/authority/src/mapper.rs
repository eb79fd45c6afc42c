//! Identity mapping from incoming user names to authority user names.
//!
//! The remote authority is case-sensitive about its `domain\user` form
//! while the upstream identity source is not, so replacement templates
//! support per-group case folding in addition to plain back-references.

use authgate_config::MappingRule;
use authgate_core::{Error, Result};
use regex::{Captures, Regex};

/// Case folding applied to a captured group before substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fold {
    None,
    Lower,
    Upper,
}

/// One piece of a parsed replacement template.
#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Group { index: usize, fold: Fold },
}

#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    segments: Vec<Segment>,
}

/// Translates raw incoming identities into the canonical form the
/// authority expects.
///
/// Rules are ordered; the first rule whose pattern matches applies. Input
/// matching no rule passes through unchanged, so translation is total and
/// deterministic. All rule compilation errors surface at construction.
#[derive(Debug, Clone)]
pub struct IdentityMapper {
    rules: Vec<CompiledRule>,
}

impl IdentityMapper {
    /// Compile an ordered rule list. A pattern that is not a valid
    /// regular expression or a malformed replacement template is a
    /// configuration error.
    pub fn new(rules: &[MappingRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = Regex::new(&rule.pattern).map_err(|e| {
                Error::configuration(format!("invalid mapping pattern '{}': {e}", rule.pattern))
            })?;
            let segments = parse_template(&rule.replacement)?;
            compiled.push(CompiledRule { regex, segments });
        }
        Ok(Self { rules: compiled })
    }

    /// Translate a raw identity. Never fails.
    pub fn translate(&self, raw: &str) -> String {
        for rule in &self.rules {
            if let Some(caps) = rule.regex.captures(raw) {
                return expand(&rule.segments, &caps);
            }
        }
        raw.to_string()
    }
}

/// Parse a replacement template.
///
/// `$(n)` substitutes capture group `n`; a trailing `l` or `u` inside the
/// parentheses lowercases or uppercases the group. `$$` is a literal
/// dollar sign; any other character is literal.
fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let bad = |detail: &str| {
        Error::configuration(format!(
            "invalid replacement template '{template}': {detail}"
        ))
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                literal.push('$');
            }
            Some('(') => {
                chars.next();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                if digits.is_empty() {
                    return Err(bad("expected a group number after '$('"));
                }
                let fold = match chars.peek() {
                    Some('l') => {
                        chars.next();
                        Fold::Lower
                    }
                    Some('u') => {
                        chars.next();
                        Fold::Upper
                    }
                    _ => Fold::None,
                };
                if chars.next() != Some(')') {
                    return Err(bad("unterminated group reference"));
                }
                let index = digits
                    .parse()
                    .map_err(|_| bad(&format!("group number '{digits}' out of range")))?;
                segments.push(Segment::Group { index, fold });
            }
            _ => literal.push('$'),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn expand(segments: &[Segment], caps: &Captures<'_>) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Group { index, fold } => {
                // A group that did not participate in the match expands
                // to nothing; translation stays total.
                let text = caps.get(*index).map(|m| m.as_str()).unwrap_or("");
                match fold {
                    Fold::None => out.push_str(text),
                    Fold::Lower => out.push_str(&text.to_lowercase()),
                    Fold::Upper => out.push_str(&text.to_uppercase()),
                }
            }
        }
    }
    out
}
