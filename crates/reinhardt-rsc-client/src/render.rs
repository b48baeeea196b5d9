//! Rendering seam.

use reinhardt_rsc_core::ClientNode;

/// Displays committed trees.
///
/// The runtime calls [`hydrate`](Self::hydrate) once for the tree embedded in
/// the first document, then [`render`](Self::render) for every committed
/// navigation. Both receive a complete tree; nothing is patched in place.
pub trait TreeRenderer {
	/// Attaches to markup the server already produced for `tree`.
	fn hydrate(&self, tree: &ClientNode);

	/// Replaces the displayed tree.
	fn render(&self, tree: &ClientNode);
}

impl<R: TreeRenderer + ?Sized> TreeRenderer for std::rc::Rc<R> {
	fn hydrate(&self, tree: &ClientNode) {
		(**self).hydrate(tree);
	}

	fn render(&self, tree: &ClientNode) {
		(**self).render(tree);
	}
}
