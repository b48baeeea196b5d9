//! Session history seam.

use std::cell::{Cell, RefCell};

/// The browser's session history, as far as navigation needs it.
pub trait SessionHistory {
	/// Pushes a new entry for `path`.
	fn push(&self, path: &str);

	/// The path of the current entry, including any query string.
	fn current_path(&self) -> String;
}

/// An in-memory history stack.
///
/// Behaves like a browser tab: pushing discards any forward entries, and
/// [`back`](Self::back) / [`forward`](Self::forward) move through the stack
/// without changing it.
#[derive(Debug)]
pub struct MemoryHistory {
	entries: RefCell<Vec<String>>,
	index: Cell<usize>,
}

impl MemoryHistory {
	/// Creates a history with a single entry.
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			entries: RefCell::new(vec![initial.into()]),
			index: Cell::new(0),
		}
	}

	/// Moves one entry back. Returns the new current path, or `None` at the
	/// start of the stack.
	pub fn back(&self) -> Option<String> {
		let index = self.index.get().checked_sub(1)?;
		self.index.set(index);
		self.entries.borrow().get(index).cloned()
	}

	/// Moves one entry forward. Returns the new current path, or `None` at the
	/// end of the stack.
	pub fn forward(&self) -> Option<String> {
		let index = self.index.get() + 1;
		let entries = self.entries.borrow();
		let path = entries.get(index).cloned()?;
		self.index.set(index);
		Some(path)
	}

	/// Number of entries in the stack.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Always `false`; a history has at least its initial entry.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl SessionHistory for MemoryHistory {
	fn push(&self, path: &str) {
		let mut entries = self.entries.borrow_mut();
		entries.truncate(self.index.get() + 1);
		entries.push(path.to_string());
		self.index.set(entries.len() - 1);
	}

	fn current_path(&self) -> String {
		self.entries
			.borrow()
			.get(self.index.get())
			.cloned()
			.unwrap_or_default()
	}
}
