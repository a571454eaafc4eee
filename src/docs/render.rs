use std::path::PathBuf;

use crate::config::DocsFormat;
use crate::docs::discover::{Language, Module};
use crate::docs::extract::{Item, ModuleDoc};

/// Built-in page template. `{{ title }}` and `{{ content }}` are replaced.
pub const DEFAULT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
<style>
body { font-family: sans-serif; max-width: 60em; margin: 2em auto; padding: 0 1em; }
pre { background: #f4f4f4; padding: 0.5em; overflow-x: auto; }
.item { margin-left: 1em; }
.members { margin-left: 2em; }
</style>
</head>
<body>
{{ content }}
</body>
</html>
"#;

pub const DEFAULT_MARKDOWN_TEMPLATE: &str = "{{ content }}";

/// Page template, built in or loaded from the docs directory
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Template { text: text.into() }
    }

    pub fn builtin(format: DocsFormat) -> Self {
        match format {
            DocsFormat::Html => Template::new(DEFAULT_HTML_TEMPLATE),
            DocsFormat::Markdown => Template::new(DEFAULT_MARKDOWN_TEMPLATE),
        }
    }

    pub fn fill(&self, title: &str, content: &str) -> String {
        self.text
            .replace("{{ title }}", title)
            .replace("{{title}}", title)
            .replace("{{ content }}", content)
            .replace("{{content}}", content)
    }
}

/// Link from a package page to one of its submodules
#[derive(Debug, Clone, PartialEq)]
pub struct SubmoduleLink {
    pub name: String,
    pub href: String,
}

/// Output path of a module page, relative to the docs directory.
///
/// Packages become `a/b/index.<ext>`, leaf modules `a/b.<ext>`.
pub fn page_path(module: &Module, format: DocsFormat) -> PathBuf {
    let segments = module.segments();
    let mut path: PathBuf = segments.iter().collect();
    if module.is_package {
        path.push(format!("index.{}", format.extension()));
    } else {
        path.set_extension(format.extension());
    }
    path
}

/// Link target of `child` as seen from its parent package page.
pub fn child_href(child: &Module, format: DocsFormat) -> String {
    if child.is_package {
        format!("{}/index.{}", child.short_name(), format.extension())
    } else {
        format!("{}.{}", child.short_name(), format.extension())
    }
}

/// Render a full page.
pub fn render_page(
    doc: &ModuleDoc,
    links: &[SubmoduleLink],
    with_source: bool,
    format: DocsFormat,
    template: &Template,
) -> String {
    let title = format!("{} API documentation", doc.name);
    let content = match format {
        DocsFormat::Html => html_content(doc, links, with_source),
        DocsFormat::Markdown => markdown_content(doc, links, with_source),
    };
    template.fill(&title, &content)
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Items grouped under their headings, in order of first appearance.
fn grouped(items: &[Item]) -> Vec<(&'static str, Vec<&Item>)> {
    let mut groups: Vec<(&'static str, Vec<&Item>)> = Vec::new();
    for item in items {
        let heading = item.kind.heading();
        match groups.iter_mut().find(|(h, _)| *h == heading) {
            Some((_, group)) => group.push(item),
            None => groups.push((heading, vec![item])),
        }
    }
    groups
}

fn html_paragraphs(text: &str) -> String {
    text.split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p.trim())))
        .collect::<Vec<_>>()
        .join("\n")
}

fn html_content(doc: &ModuleDoc, links: &[SubmoduleLink], with_source: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<h1>Module <code>{}</code></h1>\n",
        escape_html(&doc.name)
    ));
    if let Some(text) = &doc.doc {
        out.push_str(&format!(
            "<section class=\"docstring\">\n{}\n</section>\n",
            html_paragraphs(text)
        ));
    }

    if !links.is_empty() {
        out.push_str("<h2>Sub-modules</h2>\n<ul>\n");
        for link in links {
            out.push_str(&format!(
                "<li><a href=\"{}\"><code>{}</code></a></li>\n",
                escape_html(&link.href),
                escape_html(&link.name)
            ));
        }
        out.push_str("</ul>\n");
    }

    for (heading, items) in grouped(&doc.items) {
        out.push_str(&format!("<h2>{}</h2>\n", heading));
        for item in items {
            html_item(&mut out, doc, item, &doc.qualify(&item.name), with_source);
        }
    }
    out
}

fn html_item(out: &mut String, doc: &ModuleDoc, item: &Item, id: &str, with_source: bool) {
    out.push_str("<div class=\"item\">\n");
    out.push_str(&format!(
        "<h3 id=\"{}\"><code>{}</code></h3>\n",
        escape_html(id),
        escape_html(&item.signature)
    ));
    if let Some(text) = &item.doc {
        out.push_str(&format!(
            "<div class=\"docstring\">\n{}\n</div>\n",
            html_paragraphs(text)
        ));
    }
    if with_source {
        out.push_str(&format!(
            "<details><summary>Source</summary>\n<pre><code>{}</code></pre>\n</details>\n",
            escape_html(&item.source)
        ));
    }
    if !item.members.is_empty() {
        out.push_str("<div class=\"members\">\n");
        for member in &item.members {
            let member_id = format!("{}{}{}", id, doc.language.separator(), member.name);
            html_item(out, doc, member, &member_id, with_source);
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn markdown_content(doc: &ModuleDoc, links: &[SubmoduleLink], with_source: bool) -> String {
    let mut out = format!("# Module `{}`\n", doc.name);
    if let Some(text) = &doc.doc {
        out.push_str(&format!("\n{}\n", text));
    }

    if !links.is_empty() {
        out.push_str("\n## Sub-modules\n\n");
        for link in links {
            out.push_str(&format!("- [`{}`]({})\n", link.name, link.href));
        }
    }

    for (heading, items) in grouped(&doc.items) {
        out.push_str(&format!("\n## {}\n", heading));
        for item in items {
            markdown_item(&mut out, doc.language, item, "###", with_source);
            for member in &item.members {
                markdown_item(&mut out, doc.language, member, "####", with_source);
            }
        }
    }
    out
}

fn markdown_item(
    out: &mut String,
    language: Language,
    item: &Item,
    level: &str,
    with_source: bool,
) {
    out.push_str(&format!("\n{} `{}`\n", level, item.signature));
    if let Some(text) = &item.doc {
        out.push_str(&format!("\n{}\n", text));
    }
    if with_source {
        out.push_str(&format!("\n```{}\n{}\n```\n", language.tag(), item.source));
    }
}
