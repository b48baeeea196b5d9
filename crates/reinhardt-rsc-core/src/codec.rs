//! Wire codec for resolved trees.
//!
//! Encoding turns a [`ClientNode`] into JSON; decoding reverses it. Elements
//! are plain JSON objects tagged with a reserved token:
//!
//! ```json
//! {"$$typeof": "$RE", "type": "p", "key": null, "props": {"children": ["hi"]}}
//! ```
//!
//! Reserved tokens all start with [`ESCAPE`]. To keep data strings apart from
//! tokens, every string value starting with `$` gets one extra `$` on encode,
//! and decoding strips exactly one. A data string `"$cost"` travels as
//! `"$$cost"`; `"$RE"` travels as `"$$RE"` and can never be mistaken for the
//! element marker.
//!
//! The codec is stateless and performs no I/O.

use crate::node::{ClientElement, ClientElementKind, ClientNode, ClientProps};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The escape character prefixing every reserved token.
pub const ESCAPE: char = '$';

/// Wire token marking an object as an element.
pub const ELEMENT_TOKEN: &str = "$RE";

/// Wire token used as the `type` of a fragment element.
pub const FRAGMENT_TOKEN: &str = "$RF";

const TYPEOF_KEY: &str = "$$typeof";
const TYPE_KEY: &str = "type";
const KEY_KEY: &str = "key";
const PROPS_KEY: &str = "props";

/// Errors produced while decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
	/// The payload is not valid JSON.
	#[error("Malformed payload: {0}")]
	Json(#[from] serde_json::Error),

	/// A reserved token appeared where it has no meaning.
	#[error("Reserved token `{0}` found outside of its position")]
	StrayToken(&'static str),

	/// An element object is missing a field or has a field of the wrong type.
	#[error("Invalid element: {0}")]
	InvalidElement(String),
}

/// Special values carried on the wire as reserved tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
	/// Marks an object as an element.
	Element,
	/// Marks an element as a fragment.
	Fragment,
}

impl Sentinel {
	/// The wire token for this sentinel.
	pub fn token(self) -> &'static str {
		match self {
			Self::Element => ELEMENT_TOKEN,
			Self::Fragment => FRAGMENT_TOKEN,
		}
	}

	/// Looks up the sentinel for a wire token.
	pub fn from_token(token: &str) -> Option<Self> {
		match token {
			ELEMENT_TOKEN => Some(Self::Element),
			FRAGMENT_TOKEN => Some(Self::Fragment),
			_ => None,
		}
	}
}

/// Result of reviving one wire string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revived {
	/// The string was a reserved token.
	Token(Sentinel),
	/// The string was data.
	Text(String),
}

/// Encode-side transform for one string value.
///
/// Strings starting with [`ESCAPE`] get one extra escape character.
pub fn replace_str(value: &str) -> Cow<'_, str> {
	if value.starts_with(ESCAPE) {
		let mut escaped = String::with_capacity(value.len() + 1);
		escaped.push(ESCAPE);
		escaped.push_str(value);
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(value)
	}
}

/// Decode-side transform for one string value.
///
/// Reserved tokens map back to their sentinel. Any other string starting with
/// [`ESCAPE`] loses exactly one leading escape character.
pub fn revive_str(value: String) -> Revived {
	if let Some(sentinel) = Sentinel::from_token(&value) {
		return Revived::Token(sentinel);
	}
	match value.strip_prefix(ESCAPE) {
		Some(rest) => Revived::Text(rest.to_string()),
		None => Revived::Text(value),
	}
}

/// Encodes a resolved tree into a JSON string.
pub fn encode(tree: &ClientNode) -> Result<String, CodecError> {
	Ok(serde_json::to_string(&encode_value(tree))?)
}

/// Encodes a resolved tree into indented JSON, for debugging.
pub fn encode_pretty(tree: &ClientNode) -> Result<String, CodecError> {
	Ok(serde_json::to_string_pretty(&encode_value(tree))?)
}

/// Encodes a resolved tree into a JSON value.
pub fn encode_value(tree: &ClientNode) -> Value {
	match tree {
		ClientNode::Null => Value::Null,
		ClientNode::Bool(b) => Value::Bool(*b),
		ClientNode::Number(n) => Value::Number(n.clone()),
		ClientNode::Text(s) => encode_str(s),
		ClientNode::Sequence(items) => Value::Array(items.iter().map(encode_value).collect()),
		ClientNode::Record(props) => Value::Object(encode_props(props)),
		ClientNode::Element(element) => encode_element(element),
	}
}

fn encode_str(value: &str) -> Value {
	Value::String(replace_str(value).into_owned())
}

fn encode_props(props: &ClientProps) -> Map<String, Value> {
	props
		.iter()
		.map(|(name, value)| (name.clone(), encode_value(value)))
		.collect()
}

fn encode_element(element: &ClientElement) -> Value {
	let ty = match &element.kind {
		ClientElementKind::Host(name) => encode_str(name),
		ClientElementKind::Fragment => Value::String(Sentinel::Fragment.token().to_string()),
	};

	let mut object = Map::new();
	object.insert(
		TYPEOF_KEY.to_string(),
		Value::String(Sentinel::Element.token().to_string()),
	);
	object.insert(TYPE_KEY.to_string(), ty);
	object.insert(
		KEY_KEY.to_string(),
		element.key.as_deref().map_or(Value::Null, encode_str),
	);
	object.insert(
		PROPS_KEY.to_string(),
		Value::Object(encode_props(&element.props)),
	);
	Value::Object(object)
}

/// Decodes a JSON payload produced by [`encode`].
pub fn decode(payload: &str) -> Result<ClientNode, CodecError> {
	let value: Value = serde_json::from_str(payload)?;
	decode_value(value)
}

/// Decodes a JSON value produced by [`encode_value`].
pub fn decode_value(value: Value) -> Result<ClientNode, CodecError> {
	match value {
		Value::Null => Ok(ClientNode::Null),
		Value::Bool(b) => Ok(ClientNode::Bool(b)),
		Value::Number(n) => Ok(ClientNode::Number(n)),
		Value::String(s) => decode_text(s).map(ClientNode::Text),
		Value::Array(items) => items
			.into_iter()
			.map(decode_value)
			.collect::<Result<Vec<_>, _>>()
			.map(ClientNode::Sequence),
		Value::Object(object) if is_element(&object) => decode_element(object),
		Value::Object(object) => decode_props(object).map(ClientNode::Record),
	}
}

fn decode_text(value: String) -> Result<String, CodecError> {
	match revive_str(value) {
		Revived::Text(text) => Ok(text),
		Revived::Token(sentinel) => Err(CodecError::StrayToken(sentinel.token())),
	}
}

fn is_element(object: &Map<String, Value>) -> bool {
	matches!(object.get(TYPEOF_KEY), Some(Value::String(tag)) if tag == ELEMENT_TOKEN)
}

fn decode_props(object: Map<String, Value>) -> Result<ClientProps, CodecError> {
	object
		.into_iter()
		.map(|(name, value)| decode_value(value).map(|node| (name, node)))
		.collect()
}

fn decode_element(mut object: Map<String, Value>) -> Result<ClientNode, CodecError> {
	let kind = match object.remove(TYPE_KEY) {
		Some(Value::String(ty)) => match revive_str(ty) {
			Revived::Token(Sentinel::Fragment) => ClientElementKind::Fragment,
			Revived::Token(sentinel) => return Err(CodecError::StrayToken(sentinel.token())),
			Revived::Text(name) => ClientElementKind::Host(name),
		},
		Some(_) => {
			return Err(CodecError::InvalidElement(
				"`type` must be a string".to_string(),
			));
		}
		None => return Err(CodecError::InvalidElement("missing `type`".to_string())),
	};

	let key = match object.remove(KEY_KEY) {
		None | Some(Value::Null) => None,
		Some(Value::String(key)) => Some(decode_text(key)?),
		Some(_) => {
			return Err(CodecError::InvalidElement(
				"`key` must be a string or null".to_string(),
			));
		}
	};

	let props = match object.remove(PROPS_KEY) {
		Some(Value::Object(props)) => decode_props(props)?,
		Some(_) => {
			return Err(CodecError::InvalidElement(
				"`props` must be an object".to_string(),
			));
		}
		None => return Err(CodecError::InvalidElement("missing `props`".to_string())),
	};

	Ok(ClientNode::Element(ClientElement { kind, key, props }))
}

/// Quotes an encoded payload as a JavaScript string literal that is safe to
/// place inside an inline `<script>` element.
pub fn embed_script_literal(payload: &str) -> Result<String, CodecError> {
	let quoted = serde_json::to_string(payload)?;
	let mut out = String::with_capacity(quoted.len());
	for ch in quoted.chars() {
		match ch {
			'<' => out.push_str("\\u003c"),
			'>' => out.push_str("\\u003e"),
			'&' => out.push_str("\\u0026"),
			'\u{2028}' => out.push_str("\\u2028"),
			'\u{2029}' => out.push_str("\\u2029"),
			_ => out.push(ch),
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("plain", "plain")]
	#[case("$cost", "$$cost")]
	#[case("$$double", "$$$double")]
	#[case("$RE", "$$RE")]
	#[case("", "")]
	#[case("a$b", "a$b")]
	fn test_replace_str(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(replace_str(input), expected);
	}

	#[rstest]
	#[case("$RE", Revived::Token(Sentinel::Element))]
	#[case("$RF", Revived::Token(Sentinel::Fragment))]
	#[case("$$RE", Revived::Text("$RE".to_string()))]
	#[case("$$cost", Revived::Text("$cost".to_string()))]
	#[case("plain", Revived::Text("plain".to_string()))]
	fn test_revive_str(#[case] input: &str, #[case] expected: Revived) {
		assert_eq!(revive_str(input.to_string()), expected);
	}

	#[rstest]
	fn test_encode_element_shape() {
		let tree: ClientNode = ClientElement::host("p")
			.children(vec!["hi"])
			.into();
		let value: Value = serde_json::from_str(&encode(&tree).unwrap()).unwrap();
		assert_eq!(
			value,
			json!({
				"$$typeof": "$RE",
				"type": "p",
				"key": null,
				"props": {"children": ["hi"]}
			})
		);
	}

	#[rstest]
	fn test_marker_and_dollar_sibling() {
		let tree: ClientNode = ClientElement::host("span")
			.children(vec!["$cost"])
			.into();
		let encoded = encode(&tree).unwrap();

		assert!(encoded.contains("\"$RE\""));
		assert!(encoded.contains("\"$$cost\""));
		assert_eq!(decode(&encoded).unwrap(), tree);
	}

	#[rstest]
	fn test_fragment_uses_fragment_token() {
		let tree: ClientNode = ClientElement::fragment().key("k").children(vec![1, 2]).into();
		let value = encode_value(&tree);

		assert_eq!(value["type"], json!("$RF"));
		assert_eq!(value["key"], json!("k"));
		assert_eq!(decode_value(value).unwrap(), tree);
	}

	#[rstest]
	fn test_record_lookalike_is_not_an_element() {
		let mut props = ClientProps::new();
		props.insert("$$typeof".to_string(), ClientNode::from("$RE"));
		let tree = ClientNode::Record(props);
		let encoded = encode(&tree).unwrap();

		assert!(encoded.contains("\"$$RE\""));
		assert_eq!(decode(&encoded).unwrap(), tree);
	}

	#[rstest]
	#[case(r#""$RE""#)]
	#[case(r#"["$RF"]"#)]
	#[case(r#"{"$$typeof":"$RE","type":"$RE","key":null,"props":{}}"#)]
	fn test_stray_token_rejected(#[case] payload: &str) {
		assert!(matches!(decode(payload), Err(CodecError::StrayToken(_))));
	}

	#[rstest]
	#[case(r#"{"$$typeof":"$RE","key":null,"props":{}}"#)]
	#[case(r#"{"$$typeof":"$RE","type":1,"key":null,"props":{}}"#)]
	#[case(r#"{"$$typeof":"$RE","type":"p","key":3,"props":{}}"#)]
	#[case(r#"{"$$typeof":"$RE","type":"p","key":null}"#)]
	#[case(r#"{"$$typeof":"$RE","type":"p","key":null,"props":[]}"#)]
	fn test_invalid_element_rejected(#[case] payload: &str) {
		assert!(matches!(
			decode(payload),
			Err(CodecError::InvalidElement(_))
		));
	}

	#[rstest]
	fn test_malformed_json_rejected() {
		assert!(matches!(decode("{\"a\":"), Err(CodecError::Json(_))));
	}

	#[rstest]
	fn test_extra_element_fields_ignored() {
		let payload = r#"{"$$typeof":"$RE","type":"hr","key":null,"ref":null,"props":{}}"#;
		let decoded = decode(payload).unwrap();
		assert_eq!(decoded, ClientNode::Element(ClientElement::host("hr")));
	}

	#[rstest]
	fn test_embed_script_literal_escapes_markup() {
		let literal = embed_script_literal(r#"{"a":"</script><b>&"}"#).unwrap();

		assert!(literal.starts_with('"'));
		assert!(!literal.contains("</script>"));
		assert!(literal.contains("\\u003c/script\\u003e"));
		assert!(literal.contains("\\u0026"));
	}
}
