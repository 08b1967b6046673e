use std::sync::OnceLock;

use ammonia::Builder as AmmoniaBuilder;
use comrak::{markdown_to_html, Options};

fn options() -> &'static Options<'static> {
    static OPTIONS: OnceLock<Options<'static>> = OnceLock::new();
    OPTIONS.get_or_init(|| {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options
    })
}

fn sanitizer() -> &'static AmmoniaBuilder<'static> {
    static SANITIZER: OnceLock<AmmoniaBuilder<'static>> = OnceLock::new();
    SANITIZER.get_or_init(|| {
        let mut builder = AmmoniaBuilder::default();
        builder.add_tags(&["input"]);
        builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
        builder
    })
}

/// Markdown to display HTML. Total: malformed input renders literally.
///
/// The result is inserted into pages without escaping, so it always goes
/// through the sanitizer, even though comrak already omits raw HTML.
pub fn render(markdown: &str) -> String {
    let html = markdown_to_html(markdown, options());
    sanitizer().clean(&html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings() {
        assert_eq!(render("# Hi").trim_end(), "<h1>Hi</h1>");
    }

    #[test]
    fn strips_script_and_event_handlers() {
        let html = render("hello <script>alert(1)</script>\n\n<img src=x onerror=alert(1)>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn drops_javascript_links() {
        let html = render("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn malformed_markdown_degrades_gracefully() {
        let html = render("**unclosed [link(");
        assert!(html.contains("unclosed"));
    }

    #[test]
    fn empty_markdown_renders_empty() {
        assert_eq!(render(""), "");
    }
}
