//! Property-based tests for the wire codec
//!
//! Uses proptest to check that every component-free tree survives an
//! encode/decode cycle unchanged.

use proptest::prelude::*;
use reinhardt_rsc_core::codec::{Revived, decode, encode, replace_str, revive_str};
use reinhardt_rsc_core::{ClientElement, ClientElementKind, ClientNode, ClientProps};
use serde_json::Number;

fn text_strategy() -> impl Strategy<Value = String> {
	prop_oneof![
		r"[a-zA-Z0-9 ]{0,12}",
		r"\${1,4}[a-zA-Z0-9]{0,8}",
		Just("$RE".to_string()),
		Just("$RF".to_string()),
		Just("$$RE".to_string()),
		any::<String>(),
	]
}

fn leaf_strategy() -> impl Strategy<Value = ClientNode> {
	prop_oneof![
		Just(ClientNode::Null),
		any::<bool>().prop_map(ClientNode::Bool),
		any::<i64>().prop_map(|n| ClientNode::Number(Number::from(n))),
		text_strategy().prop_map(ClientNode::Text),
	]
}

fn props_strategy(inner: BoxedStrategy<ClientNode>) -> impl Strategy<Value = ClientProps> {
	prop::collection::btree_map(text_strategy(), inner, 0..4)
}

fn tree_strategy() -> impl Strategy<Value = ClientNode> {
	leaf_strategy().prop_recursive(4, 48, 6, |inner| {
		let inner = inner.boxed();
		prop_oneof![
			prop::collection::vec(inner.clone(), 0..6).prop_map(ClientNode::Sequence),
			props_strategy(inner.clone()).prop_map(ClientNode::Record),
			(
				prop_oneof![
					r"[a-z][a-z0-9]{0,6}".prop_map(ClientElementKind::Host),
					Just(ClientElementKind::Fragment),
				],
				prop::option::of(text_strategy()),
				props_strategy(inner),
			)
				.prop_map(|(kind, key, props)| {
					ClientNode::Element(ClientElement { kind, key, props })
				}),
		]
	})
}

proptest! {
	/// Property: decode(encode(T)) == T for component-free trees
	#[test]
	fn prop_round_trip(tree in tree_strategy()) {
		let encoded = encode(&tree).unwrap();
		let decoded = decode(&encoded).unwrap();
		prop_assert_eq!(decoded, tree);
	}

	/// Property: strings starting with any number of escape characters survive
	#[test]
	fn prop_escaped_strings_survive(
		dollars in 1usize..6,
		rest in r"[a-zA-Z0-9$]{0,10}"
	) {
		let original = format!("{}{}", "$".repeat(dollars), rest);
		let tree = ClientNode::Text(original.clone());

		let decoded = decode(&encode(&tree).unwrap()).unwrap();

		prop_assert_eq!(decoded, ClientNode::Text(original));
	}

	/// Property: revive_str inverts replace_str for every string
	#[test]
	fn prop_revive_inverts_replace(value in any::<String>()) {
		let replaced = replace_str(&value).into_owned();
		prop_assert_eq!(revive_str(replaced), Revived::Text(value));
	}

	/// Property: escaping adds exactly one character, and only when needed
	#[test]
	fn prop_escape_adds_one_char(value in any::<String>()) {
		let replaced = replace_str(&value);
		let expected_len = if value.starts_with('$') { value.len() + 1 } else { value.len() };
		prop_assert_eq!(replaced.len(), expected_len);
	}
}
