//! Blog pages.
//!
//! Every request enters through [`BlogRouter`], which picks a page for the
//! path and wraps it in [`BlogLayout`]. Posts are plain `.txt` files in the
//! posts directory; the file stem is the post's slug.

use chrono::Datelike;
use pulldown_cmark::{Event, Options, Parser, Tag};
use reinhardt_rsc::prelude::*;
use std::path::{Path, PathBuf};

/// Title of every page.
pub const BLOG_TITLE: &str = "My blog";

/// Author shown in the footer.
pub const BLOG_AUTHOR: &str = "Jae Doe";

/// Shared configuration of the blog components.
#[derive(Debug, Clone)]
pub struct Blog {
	posts_dir: PathBuf,
	author: String,
}

impl Blog {
	/// Creates a blog reading posts from `posts_dir`.
	pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
		Self {
			posts_dir: posts_dir.into(),
			author: BLOG_AUTHOR.to_string(),
		}
	}

	/// Directory the posts are read from.
	pub fn posts_dir(&self) -> &Path {
		&self.posts_dir
	}

	fn post_path(&self, slug: &str) -> PathBuf {
		self.posts_dir.join(format!("{}.txt", slug))
	}
}

fn text_prop<'a>(props: &'a Props, name: &str) -> Option<&'a str> {
	props.get(name).and_then(Node::as_text)
}

/// Root component: maps the request path to a page.
#[derive(Debug, Clone)]
pub struct BlogRouter {
	blog: Arc<Blog>,
}

impl BlogRouter {
	/// Creates the router for `blog`.
	pub fn new(blog: Blog) -> Self {
		Self {
			blog: Arc::new(blog),
		}
	}
}

#[async_trait]
impl ServerComponent for BlogRouter {
	fn name(&self) -> &str {
		"BlogRouter"
	}

	async fn render(&self, props: Props) -> Result<Node, RenderError> {
		let pathname = text_prop(&props, PATHNAME_PROP).unwrap_or("/");

		let page = if pathname == "/" {
			Node::component(BlogIndexPage {
				blog: Arc::clone(&self.blog),
			})
		} else if !pathname.contains('.') {
			let slug = sanitize_slug(pathname.strip_prefix('/').unwrap_or(pathname));
			if slug.is_empty() {
				return Err(RenderError::not_found(pathname));
			}
			Node::component(BlogPostPage {
				blog: Arc::clone(&self.blog),
			})
			.prop("postSlug", slug)
		} else if pathname == "/favicon.ico" {
			return Ok(Node::from("favicon"));
		} else {
			return Err(RenderError::not_found(pathname));
		};

		Ok(Node::component(BlogLayout {
			blog: Arc::clone(&self.blog),
		})
		.prop(CHILDREN, page)
		.into())
	}
}

/// Lists every post in file name order.
#[derive(Debug)]
pub struct BlogIndexPage {
	blog: Arc<Blog>,
}

impl BlogIndexPage {
	async fn post_slugs(&self) -> Result<Vec<String>, RenderError> {
		let mut entries = tokio::fs::read_dir(self.blog.posts_dir()).await?;
		let mut slugs = Vec::new();
		while let Some(entry) = entries.next_entry().await? {
			if !entry.file_type().await?.is_file() {
				continue;
			}
			let file_name = entry.file_name().to_string_lossy().into_owned();
			let slug = match file_name.rfind('.') {
				Some(dot) => file_name[..dot].to_string(),
				None => file_name,
			};
			slugs.push(slug);
		}
		// read_dir order is platform dependent
		slugs.sort();
		Ok(slugs)
	}
}

#[async_trait]
impl ServerComponent for BlogIndexPage {
	fn name(&self) -> &str {
		"BlogIndexPage"
	}

	async fn render(&self, _props: Props) -> Result<Node, RenderError> {
		let slugs = self.post_slugs().await?;
		tracing::debug!(count = slugs.len(), "Listing posts");

		let posts = slugs.into_iter().map(|slug| {
			Node::component(Post {
				blog: Arc::clone(&self.blog),
			})
			.key(slug.clone())
			.prop("slug", slug)
		});

		Ok(Node::host("section")
			.child(Node::host("h1").child("Welcome to my blog"))
			.child(Node::host("div").children(posts))
			.child(Node::component(Markdown).prop(CHILDREN, "# Hello, *world*!"))
			.into())
	}
}

/// A single post on its own page.
#[derive(Debug)]
pub struct BlogPostPage {
	blog: Arc<Blog>,
}

#[async_trait]
impl ServerComponent for BlogPostPage {
	fn name(&self) -> &str {
		"BlogPostPage"
	}

	async fn render(&self, props: Props) -> Result<Node, RenderError> {
		let slug = text_prop(&props, "postSlug").unwrap_or_default();
		Ok(Node::component(Post {
			blog: Arc::clone(&self.blog),
		})
		.prop("slug", slug)
		.into())
	}
}

/// A post's title link and body, read from disk.
#[derive(Debug)]
pub struct Post {
	blog: Arc<Blog>,
}

#[async_trait]
impl ServerComponent for Post {
	fn name(&self) -> &str {
		"Post"
	}

	async fn render(&self, props: Props) -> Result<Node, RenderError> {
		let slug = text_prop(&props, "slug")
			.ok_or_else(|| RenderError::bad_request("Post requires a slug"))?;
		let content = tokio::fs::read_to_string(self.blog.post_path(slug)).await?;

		Ok(Node::host("section")
			.child(
				Node::host("h2").child(
					Node::host("a")
						.prop("href", format!("/{}", slug))
						.child(slug),
				),
			)
			.child(Node::host("article").child(content))
			.into())
	}
}

/// Page chrome shared by every page.
#[derive(Debug)]
pub struct BlogLayout {
	blog: Arc<Blog>,
}

#[async_trait]
impl ServerComponent for BlogLayout {
	fn name(&self) -> &str {
		"BlogLayout"
	}

	async fn render(&self, mut props: Props) -> Result<Node, RenderError> {
		let page = props.remove(CHILDREN).unwrap_or(Node::Null);

		Ok(Node::host("html")
			.child(Node::host("head").child(Node::host("title").child(BLOG_TITLE)))
			.child(
				Node::host("body")
					.child(
						Node::host("nav")
							.child(Node::host("a").prop("href", "/").child("Home"))
							.child(Node::host("hr"))
							.child(Node::host("input"))
							.child(Node::host("hr")),
					)
					.child(Node::host("main").child(page))
					.child(Node::component(Footer).prop("author", self.blog.author.as_str())),
			)
			.into())
	}
}

/// Copyright line with the current year.
#[derive(Debug)]
pub struct Footer;

#[async_trait]
impl ServerComponent for Footer {
	fn name(&self) -> &str {
		"Footer"
	}

	async fn render(&self, props: Props) -> Result<Node, RenderError> {
		let author = text_prop(&props, "author").unwrap_or("anonymous");
		let year = chrono::Local::now().year();

		Ok(Node::host("footer")
			.child(Node::host("hr"))
			.child(
				Node::host("p").child(
					Node::host("i")
						.child("(c) ")
						.child(author)
						.child(" ")
						.child(year.to_string()),
				),
			)
			.into())
	}
}

/// Renders its `children` text as Markdown.
///
/// Block and inline structure map to host elements: headings, paragraphs,
/// emphasis, strong, strikethrough, code, quotes, lists and links. Raw HTML
/// is kept as text.
#[derive(Debug)]
pub struct Markdown;

#[async_trait]
impl ServerComponent for Markdown {
	fn name(&self) -> &str {
		"Markdown"
	}

	async fn render(&self, props: Props) -> Result<Node, RenderError> {
		let source = text_prop(&props, CHILDREN).unwrap_or_default();
		Ok(Node::fragment().children(markdown_nodes(source)).into())
	}
}

fn markdown_nodes(source: &str) -> Vec<Node> {
	// Each open tag collects its children; `None` passes them to the parent.
	let mut stack: Vec<(Option<Element>, Vec<Node>)> = vec![(None, Vec::new())];
	let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;

	for event in Parser::new_ext(source, options) {
		let node: Node = match event {
			Event::Start(tag) => {
				stack.push((markdown_element(tag), Vec::new()));
				continue;
			}
			Event::End(_) => {
				if stack.len() < 2 {
					continue;
				}
				let Some((element, children)) = stack.pop() else {
					continue;
				};
				let Some((_, siblings)) = stack.last_mut() else {
					continue;
				};
				match element {
					Some(element) => siblings.push(element.children(children).into()),
					None => siblings.extend(children),
				}
				continue;
			}
			Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
				Node::from(text.to_string())
			}
			Event::Code(text) => Node::host("code").child(text.to_string()).into(),
			Event::SoftBreak => Node::from("\n"),
			Event::HardBreak => Node::host("br").into(),
			Event::Rule => Node::host("hr").into(),
			_ => continue,
		};
		if let Some((_, children)) = stack.last_mut() {
			children.push(node);
		}
	}

	stack
		.into_iter()
		.next()
		.map(|(_, nodes)| nodes)
		.unwrap_or_default()
}

fn markdown_element(tag: Tag<'_>) -> Option<Element> {
	let element = match tag {
		Tag::Heading { level, .. } => Node::host(format!("h{}", level as usize)),
		Tag::Paragraph => Node::host("p"),
		Tag::Emphasis => Node::host("em"),
		Tag::Strong => Node::host("strong"),
		Tag::Strikethrough => Node::host("del"),
		Tag::CodeBlock(_) => Node::host("pre"),
		Tag::BlockQuote(_) => Node::host("blockquote"),
		Tag::List(Some(start)) if start != 1 => Node::host("ol").prop("start", start),
		Tag::List(Some(_)) => Node::host("ol"),
		Tag::List(None) => Node::host("ul"),
		Tag::Item => Node::host("li"),
		Tag::Link { dest_url, .. } => Node::host("a").prop("href", dest_url.to_string()),
		_ => return None,
	};
	Some(element)
}

const RESERVED_NAMES: &[&str] = &[
	"con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
	"com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

const MAX_SLUG_BYTES: usize = 255;

/// Turns a request path segment into a safe file stem.
///
/// Path separators, characters that are illegal in file names and control
/// characters are dropped. Relative names (`.`, `..`) and reserved device
/// names yield an empty slug.
pub fn sanitize_slug(raw: &str) -> String {
	let mut slug: String = raw
		.chars()
		.filter(|&c| !matches!(c, '/' | '?' | '<' | '>' | '\\' | ':' | '*' | '|' | '"'))
		.filter(|c| !c.is_control())
		.collect();

	if slug.chars().all(|c| c == '.') {
		return String::new();
	}
	let stem = slug.split('.').next().unwrap_or_default();
	if RESERVED_NAMES.contains(&stem.to_ascii_lowercase().as_str()) {
		return String::new();
	}

	while slug.ends_with(['.', ' ']) {
		slug.pop();
	}
	if slug.len() > MAX_SLUG_BYTES {
		let mut end = MAX_SLUG_BYTES;
		while !slug.is_char_boundary(end) {
			end -= 1;
		}
		slug.truncate(end);
	}
	slug
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_rsc::core::{ResolveError, Resolver};
	use reinhardt_rsc::server::render_to_html;
	use rstest::*;
	use tempfile::TempDir;

	#[fixture]
	fn posts() -> TempDir {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("hello-world.txt"), "Hi there").unwrap();
		std::fs::write(dir.path().join("$pricing.txt"), "$5 a month").unwrap();
		dir
	}

	async fn render_path(dir: &TempDir, pathname: &str) -> Result<ClientNode, ResolveError> {
		let root = Node::component(BlogRouter::new(Blog::new(dir.path())))
			.prop(PATHNAME_PROP, pathname)
			.prop(SEARCH_PROP, Node::Null);
		Resolver::new().resolve(root.into()).await
	}

	#[rstest]
	#[tokio::test]
	async fn test_index_lists_posts_in_layout(posts: TempDir) {
		let tree = render_path(&posts, "/").await.unwrap();
		let html = render_to_html(&tree);

		assert!(html.starts_with("<html><head><title>My blog</title></head><body><nav>"));
		assert!(html.contains("<h1>Welcome to my blog</h1>"));
		assert!(html.contains("<a href=\"/$pricing\">$pricing</a>"));
		assert!(html.contains("<article>Hi there</article>"));
		assert!(html.contains("<h1>Hello, <em>world</em>!</h1>"));
		assert!(html.contains("(c) Jae Doe "));
	}

	#[rstest]
	#[tokio::test]
	async fn test_post_page_shows_single_post(posts: TempDir) {
		let tree = render_path(&posts, "/hello-world").await.unwrap();
		let html = render_to_html(&tree);

		assert!(html.contains("<main><section><h2><a href=\"/hello-world\">hello-world</a></h2><article>Hi there</article></section></main>"));
		assert!(!html.contains("$pricing"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_dollar_content_survives_the_wire(posts: TempDir) {
		let tree = render_path(&posts, "/$pricing").await.unwrap();

		let payload = reinhardt_rsc::core::encode(&tree).unwrap();
		assert!(payload.contains("\"$$5 a month\""));

		let decoded = reinhardt_rsc::core::decode(&payload).unwrap();
		assert_eq!(decoded, tree);
	}

	#[rstest]
	#[case("/missing-post")]
	#[case("/logo.png")]
	#[case("/..")]
	#[tokio::test]
	async fn test_unknown_paths_are_not_found(posts: TempDir, #[case] pathname: &str) {
		let err = render_path(&posts, pathname).await.unwrap_err();
		assert_eq!(err.status_code(), 404);
	}

	#[rstest]
	#[tokio::test]
	async fn test_favicon_is_plain_text(posts: TempDir) {
		let tree = render_path(&posts, "/favicon.ico").await.unwrap();
		assert_eq!(tree, ClientNode::from("favicon"));
	}

	#[rstest]
	#[case("hello-world", "hello-world")]
	#[case("nested/path", "nestedpath")]
	#[case("a<b>c:d", "abcd")]
	#[case("..", "")]
	#[case("CON", "")]
	#[case("com1.txt", "")]
	#[case("trailing. ", "trailing")]
	fn test_sanitize_slug(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(sanitize_slug(raw), expected);
	}

	#[rstest]
	fn test_sanitize_slug_truncates_long_names() {
		let slug = sanitize_slug(&"é".repeat(200));
		assert!(slug.len() <= MAX_SLUG_BYTES);
		assert!(slug.chars().all(|c| c == 'é'));
	}

	#[rstest]
	#[case("# Title", "<h1>Title</h1>")]
	#[case("### *Deep*", "<h3><em>Deep</em></h3>")]
	#[case("#NoSpace", "<p>#NoSpace</p>")]
	#[case("2 * 3", "<p>2 * 3</p>")]
	#[case("Some **bold** text", "<p>Some <strong>bold</strong> text</p>")]
	#[case("Run `cargo`", "<p>Run <code>cargo</code></p>")]
	#[case("[home](/)", "<p><a href=\"/\">home</a></p>")]
	#[case("- one\n- two", "<ul><li>one</li><li>two</li></ul>")]
	#[case("# Head\n\nBody", "<h1>Head</h1><p>Body</p>")]
	#[tokio::test]
	async fn test_markdown(#[case] source: &str, #[case] expected: &str) {
		let tree = Node::component(Markdown).prop(CHILDREN, source);
		let resolved = Resolver::new().resolve(tree.into()).await.unwrap();
		assert_eq!(render_to_html(&resolved), expected);
	}
}
