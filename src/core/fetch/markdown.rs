//! HTML to markdown conversion
//!
//! Walks the parsed DOM once and emits CommonMark-flavoured text. The
//! goal is readable content for a language model, not a lossless
//! round-trip: layout chrome (scripts, styles, navigation, forms) is
//! dropped and whitespace is normalised.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use url::Url;

/// Three or more consecutive newlines, possibly with trailing spaces
static BLANK_RUNS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\n[ \t]*\n([ \t]*\n)+").ok());

/// Elements whose content never reaches the output
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "head", "nav", "form", "button",
    "select", "canvas", "object",
];

/// Result of converting one document
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub title: Option<String>,
    pub markdown: String,
}

/// Convert an HTML document to markdown. Relative links and image
/// sources are resolved against `base` when one is given.
pub fn html_to_markdown(html: &str, base: Option<&Url>) -> Converted {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = find_element(root, "title")
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let body = find_element(root, "body").unwrap_or(root);
    let mut writer = MarkdownWriter::new(base);
    writer.children(body);

    Converted {
        title,
        markdown: tidy(&writer.out),
    }
}

/// Depth-first search for the first element with the given tag name
fn find_element<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    if el.value().name() == name {
        return Some(el);
    }
    el.children()
        .filter_map(ElementRef::wrap)
        .find_map(|child| find_element(child, name))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse blank-line runs and strip trailing whitespace
fn tidy(text: &str) -> String {
    let collapsed = match BLANK_RUNS.as_ref() {
        Some(re) => re.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    };
    collapsed
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

struct MarkdownWriter<'u> {
    out: String,
    base: Option<&'u Url>,
    lists: Vec<ListKind>,
}

impl<'u> MarkdownWriter<'u> {
    fn new(base: Option<&'u Url>) -> Self {
        Self {
            out: String::new(),
            base,
            lists: Vec::new(),
        }
    }

    fn children(&mut self, el: ElementRef<'_>) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.element(child_el);
                    }
                }
                _ => {}
            }
        }
    }

    /// Render an element's children into a separate buffer
    fn detached(&mut self, el: ElementRef<'_>) -> String {
        let saved = std::mem::take(&mut self.out);
        self.children(el);
        std::mem::replace(&mut self.out, saved)
    }

    /// Render an element's children as a single inline run
    fn capture(&mut self, el: ElementRef<'_>) -> String {
        let rendered = self.detached(el);
        collapse_whitespace(&rendered)
    }

    fn text(&mut self, text: &str) {
        let collapsed = collapse_whitespace(text);
        let leading_space = text.starts_with(char::is_whitespace);

        if collapsed.is_empty() {
            if leading_space && !self.at_line_start() {
                self.push_space();
            }
            return;
        }

        if leading_space && !self.at_line_start() {
            self.push_space();
        }
        self.out.push_str(&collapsed);
        if text.ends_with(char::is_whitespace) {
            self.push_space();
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn push_space(&mut self) {
        if !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let len = self.out.trim_end_matches(' ').len();
        self.out.truncate(len);
    }

    /// Ensure the output ends with a blank line
    fn block_break(&mut self) {
        self.trim_trailing_spaces();
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
    }

    /// Ensure the output ends with a newline
    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn resolve(&self, href: &str) -> String {
        match self.base {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        if SKIPPED.contains(&name) {
            return;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let text = self.capture(el);
                if text.is_empty() {
                    return;
                }
                self.block_break();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.out.push_str(&text);
                self.block_break();
            }
            "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "aside"
            | "figure" | "figcaption" | "address" | "details" | "summary" => {
                self.block_break();
                self.children(el);
                self.block_break();
            }
            "br" => self.line_break(),
            "hr" => {
                self.block_break();
                self.out.push_str("---");
                self.block_break();
            }
            "strong" | "b" => self.wrap_inline(el, "**"),
            "em" | "i" => self.wrap_inline(el, "*"),
            "del" | "s" | "strike" => self.wrap_inline(el, "~~"),
            "code" => {
                let text = collapse_whitespace(&el.text().collect::<String>());
                if !text.is_empty() {
                    let fence = if text.contains('`') { "``" } else { "`" };
                    self.out.push_str(&format!("{fence}{text}{fence}"));
                }
            }
            "pre" => self.preformatted(el),
            "a" => self.link(el),
            "img" => self.image(el),
            "ul" => self.list(el, ListKind::Unordered),
            "ol" => {
                let start = el
                    .value()
                    .attr("start")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1);
                self.list(el, ListKind::Ordered(start));
            }
            "blockquote" => self.blockquote(el),
            "table" => self.table(el),
            _ => self.children(el),
        }
    }

    fn wrap_inline(&mut self, el: ElementRef<'_>, marker: &str) {
        let text = self.capture(el);
        if text.is_empty() {
            return;
        }
        self.out.push_str(marker);
        self.out.push_str(&text);
        self.out.push_str(marker);
    }

    fn preformatted(&mut self, el: ElementRef<'_>) {
        let language = el
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code")
            .and_then(|code| code.value().attr("class"))
            .and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-"))
            })
            .unwrap_or("")
            .to_string();

        let text: String = el.text().collect();
        let text = text.trim_matches('\n');
        let fence = if text.contains("```") { "~~~" } else { "```" };

        self.block_break();
        self.out.push_str(fence);
        self.out.push_str(&language);
        self.out.push('\n');
        self.out.push_str(text);
        self.out.push('\n');
        self.out.push_str(fence);
        self.block_break();
    }

    fn link(&mut self, el: ElementRef<'_>) {
        let text = self.capture(el);
        let href = el.value().attr("href").map(str::trim).unwrap_or("");

        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            self.out.push_str(&text);
            return;
        }
        if text.is_empty() {
            return;
        }

        let target = self.resolve(href);
        self.out.push_str(&format!("[{text}]({target})"));
    }

    fn image(&mut self, el: ElementRef<'_>) {
        let Some(src) = el.value().attr("src").map(str::trim) else {
            return;
        };
        if src.is_empty() || src.starts_with("data:") {
            return;
        }
        let alt = collapse_whitespace(el.value().attr("alt").unwrap_or(""));
        let target = self.resolve(src);
        self.out.push_str(&format!("![{alt}]({target})"));
    }

    fn blockquote(&mut self, el: ElementRef<'_>) {
        let inner = self.detached(el);
        let inner = tidy(&inner);
        if inner.is_empty() {
            return;
        }

        let quoted = inner
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.block_break();
        self.out.push_str(&quoted);
        self.block_break();
    }

    fn list(&mut self, el: ElementRef<'_>, kind: ListKind) {
        if self.lists.is_empty() {
            self.block_break();
        }
        self.lists.push(kind);
        let indent = "  ".repeat(self.lists.len() - 1);

        for item in el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
        {
            let marker = match self.lists.last_mut() {
                Some(ListKind::Ordered(n)) => {
                    let marker = format!("{n}. ");
                    *n += 1;
                    marker
                }
                _ => "- ".to_string(),
            };

            // Nested lists render with their own absolute indent; any
            // other continuation line is indented under the marker.
            let body = self.detached(item);
            let mut lines = body
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.trim().is_empty());

            self.line_break();
            self.out.push_str(&indent);
            self.out.push_str(&marker);
            if let Some(first) = lines.next() {
                self.out.push_str(first.trim_start());
            }
            for line in lines {
                self.out.push('\n');
                if !line.starts_with(' ') {
                    self.out.push_str(&indent);
                    self.out.push_str("  ");
                }
                self.out.push_str(line);
            }
        }

        self.lists.pop();
        if self.lists.is_empty() {
            self.block_break();
        } else {
            self.line_break();
        }
    }

    fn table(&mut self, el: ElementRef<'_>) {
        let mut rows: Vec<Vec<String>> = Vec::new();
        self.collect_rows(el, &mut rows);

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return;
        }

        self.block_break();
        for (i, row) in rows.iter().enumerate() {
            let mut cells = row.clone();
            cells.resize(width, String::new());
            let line = cells
                .iter()
                .map(|c| c.replace('|', "\\|"))
                .collect::<Vec<_>>()
                .join(" | ");
            self.out.push_str(&format!("| {line} |"));
            self.line_break();
            if i == 0 {
                let separator = vec!["---"; width].join(" | ");
                self.out.push_str(&format!("| {separator} |"));
                self.line_break();
            }
        }
        self.block_break();
    }

    fn collect_rows(&mut self, el: ElementRef<'_>, rows: &mut Vec<Vec<String>>) {
        for child in el.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "tr" => {
                    let cells = child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                        .map(|cell| self.capture(cell))
                        .collect::<Vec<_>>();
                    if !cells.is_empty() {
                        rows.push(cells);
                    }
                }
                "thead" | "tbody" | "tfoot" => self.collect_rows(child, rows),
                _ => {}
            }
        }
    }
}
