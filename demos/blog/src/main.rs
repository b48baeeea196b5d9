//! Demo blog.
//!
//! Serves the posts in `./posts` on the address from `rsc.toml` (if present)
//! and `RSC_*` environment variables.
//!
//! ```text
//! cargo run -p reinhardt-rsc-blog
//! curl http://127.0.0.1:8080/hello-world
//! curl http://127.0.0.1:8080/hello-world?jsx
//! ```

mod pages;

use anyhow::Context;
use pages::{Blog, BlogRouter};
use reinhardt_rsc::prelude::*;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SETTINGS_FILE: &str = "rsc.toml";
const POSTS_DIR: &str = "posts";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let settings_path = Path::new(SETTINGS_FILE);
	let settings = ServerSettings::load(settings_path.exists().then_some(settings_path))
		.context("Failed to load settings")?;

	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let posts_dir = std::env::current_dir()?.join(POSTS_DIR);
	tracing::info!(posts = %posts_dir.display(), "Serving blog");

	let handler = RscHandler::new(BlogRouter::new(Blog::new(posts_dir))).with_settings(&settings);
	HttpServer::new(Arc::new(handler))
		.listen(settings.socket_addr()?, settings.shutdown_timeout())
		.await?;

	Ok(())
}
