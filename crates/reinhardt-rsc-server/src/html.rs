//! HTML rendering of resolved trees.
//!
//! Used for the first document of a visit. The output is plain markup with
//! no hydration markers. The client hydrates against the embedded payload.

use reinhardt_rsc_core::{CHILDREN, ClientElement, ClientElementKind, ClientNode};
use std::fmt::Write;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
	"track", "wbr",
];

/// Renders a resolved tree to HTML.
///
/// - text is escaped; numbers are written as-is; `null` and booleans render
///   nothing;
/// - fragments and sequences render their content in order;
/// - `className` and `htmlFor` become `class` and `for`;
/// - `true` attributes render as bare names; `false`, `null` and
///   non-scalar attributes are omitted;
/// - plain records render nothing.
pub fn render_to_html(tree: &ClientNode) -> String {
	let mut out = String::new();
	write_node(&mut out, tree);
	out
}

/// Renders a complete document, adding a doctype when the root is `<html>`.
pub fn render_document(tree: &ClientNode) -> String {
	let body = render_to_html(tree);
	let is_html_root = tree
		.as_element()
		.and_then(ClientElement::tag_name)
		.is_some_and(|tag| tag.eq_ignore_ascii_case("html"));
	if is_html_root {
		format!("<!DOCTYPE html>{}", body)
	} else {
		body
	}
}

/// Inserts `snippet` right before `</body>`, or appends it if there is none.
pub fn inject_before_body_end(document: &str, snippet: &str) -> String {
	match document.rfind("</body>") {
		Some(index) => {
			let mut out = String::with_capacity(document.len() + snippet.len());
			out.push_str(&document[..index]);
			out.push_str(snippet);
			out.push_str(&document[index..]);
			out
		}
		None => format!("{}{}", document, snippet),
	}
}

/// Escapes text content.
pub fn escape_text(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for ch in value.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(ch),
		}
	}
	out
}

/// Escapes a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for ch in value.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(ch),
		}
	}
	out
}

fn write_node(out: &mut String, node: &ClientNode) {
	match node {
		ClientNode::Null | ClientNode::Bool(_) | ClientNode::Record(_) => {}
		ClientNode::Number(n) => out.push_str(&n.to_string()),
		ClientNode::Text(s) => out.push_str(&escape_text(s)),
		ClientNode::Sequence(items) => items.iter().for_each(|item| write_node(out, item)),
		ClientNode::Element(element) => write_element(out, element),
	}
}

fn write_element(out: &mut String, element: &ClientElement) {
	let tag = match &element.kind {
		ClientElementKind::Fragment => {
			if let Some(children) = element.children_node() {
				write_node(out, children);
			}
			return;
		}
		ClientElementKind::Host(tag) => tag,
	};

	if !is_valid_name(tag) {
		tracing::warn!(tag = %tag, "Skipping element with invalid tag name");
		return;
	}

	out.push('<');
	out.push_str(tag);
	for (name, value) in &element.props {
		if name == CHILDREN {
			continue;
		}
		write_attribute(out, name, value);
	}
	out.push('>');

	if VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()) {
		return;
	}

	if let Some(children) = element.children_node() {
		write_node(out, children);
	}
	// Writing to a String cannot fail.
	let _ = write!(out, "</{}>", tag);
}

fn write_attribute(out: &mut String, name: &str, value: &ClientNode) {
	let name = match name {
		"className" => "class",
		"htmlFor" => "for",
		other => other,
	};
	if !is_valid_name(name) {
		return;
	}
	match value {
		ClientNode::Bool(true) => {
			let _ = write!(out, " {}", name);
		}
		ClientNode::Text(s) => {
			let _ = write!(out, " {}=\"{}\"", name, escape_attr(s));
		}
		ClientNode::Number(n) => {
			let _ = write!(out, " {}=\"{}\"", name, n);
		}
		ClientNode::Null
		| ClientNode::Bool(false)
		| ClientNode::Sequence(_)
		| ClientNode::Record(_)
		| ClientNode::Element(_) => {}
	}
}

fn is_valid_name(name: &str) -> bool {
	!name.is_empty()
		&& name
			.chars()
			.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.'))
}
