//! Markdown answers to HTML.

use pulldown_cmark::{html, Options, Parser};

/// Render model markdown as an HTML fragment. Tables and inline HTML pass through.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}
