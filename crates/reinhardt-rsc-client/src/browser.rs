//! Browser binding for the navigation runtime.
//!
//! Reads the payload the server embedded in the first document, hydrates,
//! and installs two listeners on the page:
//!
//! - a capture-phase `click` listener on the document that takes over in-app
//!   link clicks;
//! - a `popstate` listener on the window for back/forward.
//!
//! Listener closures are leaked with `.forget()`; they live as long as the
//! page.

use crate::fetch::{DEFAULT_QUERY_MARKER, HttpTreeFetcher};
use crate::history::SessionHistory;
use crate::link::{LinkClick, Modifiers, intercept_path};
use crate::render::TreeRenderer;
use crate::runtime::NavigationRuntime;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, MouseEvent, Window, window};

/// Global variable holding the embedded payload.
pub const DEFAULT_PAYLOAD_VAR: &str = "__INITIAL_CLIENT_JSX_STRING__";

/// Runtime wired to the browser.
pub type BrowserRuntime<R> = NavigationRuntime<HttpTreeFetcher, R, BrowserHistory>;

/// Session history backed by `window.history` and `window.location`.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
	history: web_sys::History,
	location: web_sys::Location,
}

impl BrowserHistory {
	/// Binds to the given window.
	pub fn from_window(window: &Window) -> Result<Self, JsValue> {
		Ok(Self {
			history: window.history()?,
			location: window.location(),
		})
	}
}

impl SessionHistory for BrowserHistory {
	fn push(&self, path: &str) {
		if let Err(err) = self
			.history
			.push_state_with_url(&JsValue::NULL, "", Some(path))
		{
			tracing::warn!(path, error = ?err, "Failed to push history entry");
		}
	}

	fn current_path(&self) -> String {
		let pathname = self
			.location
			.pathname()
			.unwrap_or_else(|_| "/".to_string());
		let search = self.location.search().unwrap_or_default();
		format!("{}{}", pathname, search)
	}
}

/// Reads the embedded payload from `window[var_name]`.
pub fn initial_payload(window: &Window, var_name: &str) -> Result<String, JsValue> {
	js_sys::Reflect::get(window, &JsValue::from_str(var_name))?
		.as_string()
		.ok_or_else(|| JsValue::from_str(&format!("window.{} is not a string", var_name)))
}

/// Starts navigation with the default payload variable and query marker.
pub fn start<R>(renderer: R) -> Result<Rc<BrowserRuntime<R>>, JsValue>
where
	R: TreeRenderer + 'static,
{
	start_with(renderer, DEFAULT_PAYLOAD_VAR, DEFAULT_QUERY_MARKER)
}

/// Starts navigation.
///
/// Hydrates from `window[payload_var]` and installs the click and popstate
/// listeners. Payload requests use `?{query_marker}`.
pub fn start_with<R>(
	renderer: R,
	payload_var: &str,
	query_marker: &str,
) -> Result<Rc<BrowserRuntime<R>>, JsValue>
where
	R: TreeRenderer + 'static,
{
	let window = window().ok_or_else(|| JsValue::from_str("No window object"))?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("No document object"))?;

	let payload = initial_payload(&window, payload_var)?;
	let history = BrowserHistory::from_window(&window)?;
	let fetcher = HttpTreeFetcher::new(window.location().origin()?).with_query_marker(query_marker);
	let location = history.current_path();

	let runtime = NavigationRuntime::hydrate(&payload, location, fetcher, renderer, history)
		.map_err(|err| JsValue::from_str(&err.to_string()))?;
	let runtime = Rc::new(runtime);

	// 1. Link clicks (capture phase, delegated to the document)
	let click_runtime = Rc::clone(&runtime);
	let click_handler = Closure::wrap(Box::new(move |event: Event| {
		let Some(click) = link_click(&event) else {
			return;
		};
		let Some(path) = intercept_path(&click).map(str::to_string) else {
			return;
		};
		event.prevent_default();

		let runtime = Rc::clone(&click_runtime);
		wasm_bindgen_futures::spawn_local(async move {
			runtime.follow_link(&path).await;
		});
	}) as Box<dyn FnMut(_)>);

	document.add_event_listener_with_callback_and_bool(
		"click",
		click_handler.as_ref().unchecked_ref(),
		true,
	)?;
	click_handler.forget();

	// 2. Back/forward
	let popstate_runtime = Rc::clone(&runtime);
	let popstate_handler = Closure::wrap(Box::new(move |_event: Event| {
		let runtime = Rc::clone(&popstate_runtime);
		wasm_bindgen_futures::spawn_local(async move {
			runtime.handle_popstate().await;
		});
	}) as Box<dyn FnMut(_)>);

	window
		.add_event_listener_with_callback("popstate", popstate_handler.as_ref().unchecked_ref())?;
	popstate_handler.forget();

	Ok(runtime)
}

/// Describes a click by its nearest enclosing `<a>`.
fn link_click(event: &Event) -> Option<LinkClick> {
	let mouse = event.dyn_ref::<MouseEvent>()?;
	let target = event.target()?.dyn_into::<Element>().ok()?;
	let anchor = target.closest("a").ok()??;

	Some(LinkClick {
		tag_name: anchor.tag_name(),
		href: anchor.get_attribute("href"),
		modifiers: Modifiers {
			meta: mouse.meta_key(),
			ctrl: mouse.ctrl_key(),
			shift: mouse.shift_key(),
			alt: mouse.alt_key(),
		},
	})
}
