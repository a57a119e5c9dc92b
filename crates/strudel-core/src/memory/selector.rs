//! Minimal selector engine for [`MemoryDocument`](super::MemoryDocument).
//!
//! Supports `*`, type selectors, `#id`, `.class`, `[attr]` and `[attr=value]`
//! (value optionally quoted), chained into compounds and separated by commas.
//! Combinators are rejected.

use crate::error::{Result, StrudelError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
	name: String,
	value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attributes: Vec<AttributeMatch>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
	compounds: Vec<Compound>,
}

impl SelectorList {
	pub(crate) fn parse(selector: &str) -> Result<Self> {
		let compounds = selector
			.split(',')
			.map(|part| parse_compound(selector, part.trim()))
			.collect::<Result<Vec<_>>>()?;
		Ok(Self { compounds })
	}

	/// Tests an element described by its tag and attribute lookup.
	pub(crate) fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
		self.compounds
			.iter()
			.any(|compound| compound_matches(compound, tag, &attribute))
	}
}

fn compound_matches<'a>(
	compound: &Compound,
	tag: &str,
	attribute: &impl Fn(&str) -> Option<&'a str>,
) -> bool {
	if let Some(expected) = &compound.tag
		&& !expected.eq_ignore_ascii_case(tag)
	{
		return false;
	}

	if let Some(id) = &compound.id
		&& attribute("id") != Some(id.as_str())
	{
		return false;
	}

	if !compound.classes.is_empty() {
		let classes = attribute("class").unwrap_or_default();
		if !compound
			.classes
			.iter()
			.all(|wanted| classes.split_whitespace().any(|c| c == wanted))
		{
			return false;
		}
	}

	compound.attributes.iter().all(|m| match (&m.value, attribute(&m.name)) {
		(_, None) => false,
		(None, Some(_)) => true,
		(Some(expected), Some(actual)) => expected == actual,
	})
}

fn invalid(selector: &str, reason: impl Into<String>) -> StrudelError {
	StrudelError::InvalidSelector {
		selector: selector.to_string(),
		reason: reason.into(),
	}
}

fn is_ident_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(selector: &str, part: &str) -> Result<Compound> {
	if part.is_empty() {
		return Err(invalid(selector, "empty selector"));
	}

	let mut compound = Compound::default();
	let mut rest = part;

	if let Some(stripped) = rest.strip_prefix('*') {
		rest = stripped;
	} else {
		let (tag, tail) = take_ident(rest);
		if !tag.is_empty() {
			compound.tag = Some(tag.to_string());
		}
		rest = tail;
	}

	while let Some(c) = rest.chars().next() {
		match c {
			'#' | '.' => {
				let (ident, tail) = take_ident(&rest[1..]);
				if ident.is_empty() {
					return Err(invalid(selector, format!("expected a name after `{c}`")));
				}
				if c == '#' {
					compound.id = Some(ident.to_string());
				} else {
					compound.classes.push(ident.to_string());
				}
				rest = tail;
			}
			'[' => {
				let close = rest
					.find(']')
					.ok_or_else(|| invalid(selector, "unterminated attribute selector"))?;
				compound.attributes.push(parse_attribute(selector, &rest[1..close])?);
				rest = &rest[close + 1..];
			}
			c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
				return Err(invalid(selector, "combinators are not supported"));
			}
			other => return Err(invalid(selector, format!("unexpected character `{other}`"))),
		}
	}

	Ok(compound)
}

fn parse_attribute(selector: &str, body: &str) -> Result<AttributeMatch> {
	let (name, value) = match body.split_once('=') {
		Some((name, value)) => (name.trim(), Some(unquote(value.trim()))),
		None => (body.trim(), None),
	};

	if name.is_empty() || !name.chars().all(is_ident_char) {
		return Err(invalid(selector, format!("bad attribute name `{name}`")));
	}

	Ok(AttributeMatch {
		name: name.to_string(),
		value: value.map(str::to_string),
	})
}

fn unquote(value: &str) -> &str {
	for quote in ['"', '\''] {
		if let Some(inner) = value
			.strip_prefix(quote)
			.and_then(|v| v.strip_suffix(quote))
		{
			return inner;
		}
	}
	value
}

fn take_ident(input: &str) -> (&str, &str) {
	let end = input
		.char_indices()
		.find(|(_, c)| !is_ident_char(*c))
		.map_or(input.len(), |(i, _)| i);
	input.split_at(end)
}
