//! In-app link recognition.
//!
//! A click is handled by the runtime only when all of these hold:
//!
//! - the clicked element is a hyperlink (`<a>`);
//! - no modifier key is held (so "open in new tab" keeps working);
//! - the destination is a same-origin path.
//!
//! Everything else is left to the browser.

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
	/// Meta (command) key.
	pub meta: bool,
	/// Control key.
	pub ctrl: bool,
	/// Shift key.
	pub shift: bool,
	/// Alt (option) key.
	pub alt: bool,
}

impl Modifiers {
	/// No modifier held.
	pub fn none() -> Self {
		Self::default()
	}

	/// Returns `true` if any modifier is held.
	pub fn any(&self) -> bool {
		self.meta || self.ctrl || self.shift || self.alt
	}
}

/// A click as seen by the navigation runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClick {
	/// Tag name of the clicked element.
	pub tag_name: String,
	/// The element's `href` attribute, if any.
	pub href: Option<String>,
	/// Modifier keys held during the click.
	pub modifiers: Modifiers,
}

impl LinkClick {
	/// A plain click on an `<a href="...">`.
	pub fn anchor(href: impl Into<String>) -> Self {
		Self {
			tag_name: "a".to_string(),
			href: Some(href.into()),
			modifiers: Modifiers::none(),
		}
	}

	/// Sets the held modifiers.
	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers = modifiers;
		self
	}
}

/// Returns the path to navigate to if the runtime should take over this click.
pub fn intercept_path(click: &LinkClick) -> Option<&str> {
	if !click.tag_name.eq_ignore_ascii_case("a") || click.modifiers.any() {
		return None;
	}
	let href = click.href.as_deref()?;
	// `//host/path` is protocol-relative and leaves the origin.
	if href.starts_with('/') && !href.starts_with("//") {
		Some(href)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(LinkClick::anchor("/hello-world"), Some("/hello-world"))]
	#[case(LinkClick::anchor("/"), Some("/"))]
	#[case(LinkClick::anchor("/search?q=rust"), Some("/search?q=rust"))]
	#[case(LinkClick::anchor("https://example.com/"), None)]
	#[case(LinkClick::anchor("//example.com/"), None)]
	#[case(LinkClick::anchor("relative"), None)]
	#[case(LinkClick::anchor("#top"), None)]
	fn test_intercept_by_href(#[case] click: LinkClick, #[case] expected: Option<&str>) {
		assert_eq!(intercept_path(&click), expected);
	}

	#[rstest]
	#[case(Modifiers { meta: true, ..Modifiers::none() })]
	#[case(Modifiers { ctrl: true, ..Modifiers::none() })]
	#[case(Modifiers { shift: true, ..Modifiers::none() })]
	#[case(Modifiers { alt: true, ..Modifiers::none() })]
	fn test_modifier_keys_skip_interception(#[case] modifiers: Modifiers) {
		let click = LinkClick::anchor("/about").with_modifiers(modifiers);
		assert_eq!(intercept_path(&click), None);
	}

	#[rstest]
	fn test_non_anchor_is_ignored() {
		let click = LinkClick {
			tag_name: "BUTTON".to_string(),
			href: Some("/about".to_string()),
			modifiers: Modifiers::none(),
		};
		assert_eq!(intercept_path(&click), None);
	}

	#[rstest]
	fn test_uppercase_anchor_tag() {
		let click = LinkClick {
			tag_name: "A".to_string(),
			href: Some("/about".to_string()),
			modifiers: Modifiers::none(),
		};
		assert_eq!(intercept_path(&click), Some("/about"));
	}

	#[rstest]
	fn test_anchor_without_href() {
		let click = LinkClick {
			tag_name: "a".to_string(),
			href: None,
			modifiers: Modifiers::none(),
		};
		assert_eq!(intercept_path(&click), None);
	}
}
