use super::{dedent, normalize_whitespace, Item, ItemKind};

/// Extract the `//!` module docs and the documented public items of a Rust
/// source file. Methods of inherent impls are attached to their type.
pub fn extract(source: &str) -> (Option<String>, Vec<Item>) {
    let lines: Vec<&str> = source.lines().collect();
    let doc = module_doc(&lines);

    let scanned = scan(&lines, 0, lines.len(), false);
    let mut items = scanned.items;
    for (target, methods) in scanned.impls {
        if let Some(item) = items.iter_mut().find(|item| {
            item.name == target && matches!(item.kind, ItemKind::Struct | ItemKind::Enum)
        }) {
            item.members.extend(methods);
        }
    }

    (doc, items)
}

fn module_doc(lines: &[&str]) -> Option<String> {
    let mut doc = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if let Some(text) = trimmed.strip_prefix("//!") {
            doc.push(text.strip_prefix(' ').unwrap_or(text));
        } else if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("#![") {
            continue;
        } else {
            break;
        }
    }
    join_doc(&doc)
}

fn join_doc(lines: &[&str]) -> Option<String> {
    let text = lines
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim_matches('\n');
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[derive(Default)]
struct Scan {
    items: Vec<Item>,
    /// Inherent impl blocks: target type and its public methods
    impls: Vec<(String, Vec<Item>)>,
}

fn scan(lines: &[&str], start: usize, end: usize, methods_only: bool) -> Scan {
    let mut out = Scan::default();
    let mut docs: Vec<&str> = Vec::new();
    let mut i = start;

    while i < end {
        let trimmed = lines[i].trim();

        if let Some(text) = trimmed.strip_prefix("///") {
            if !text.starts_with('/') {
                docs.push(text.strip_prefix(' ').unwrap_or(text));
            }
            i += 1;
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") {
            i += 1;
            continue;
        }
        if trimmed.starts_with("#[") || trimmed.starts_with("#![") {
            i = attribute_end(lines, i, end) + 1;
            continue;
        }

        let last = item_end(lines, i, end);

        if let Some(target) = inherent_impl_target(trimmed) {
            if !methods_only {
                let methods = scan(lines, i + 1, last, true).items;
                out.impls.push((target, methods));
            }
        } else if let Some((kind, name)) = pub_item(trimmed) {
            if !methods_only || kind == ItemKind::Function {
                let text = lines[i..=last].join("\n");
                out.items.push(Item {
                    kind: if methods_only { ItemKind::Method } else { kind },
                    name,
                    signature: signature(&text, kind),
                    doc: join_doc(&docs),
                    source: dedent(&lines[i..=last]),
                    members: Vec::new(),
                });
            }
        }

        docs.clear();
        i = last + 1;
    }

    out
}

/// Kind and name of a `pub` item declared on this line.
fn pub_item(line: &str) -> Option<(ItemKind, String)> {
    let mut rest = line.strip_prefix("pub ")?.trim_start();

    loop {
        if let Some(r) = rest.strip_prefix("const fn ") {
            return Some((ItemKind::Function, ident(r)?));
        }
        let stripped = ["async ", "unsafe ", "default ", "extern \"C\" "]
            .iter()
            .find_map(|q| rest.strip_prefix(q));
        match stripped {
            Some(r) => rest = r.trim_start(),
            None => break,
        }
    }

    let keywords = [
        ("fn ", ItemKind::Function),
        ("struct ", ItemKind::Struct),
        ("enum ", ItemKind::Enum),
        ("trait ", ItemKind::Trait),
        ("const ", ItemKind::Const),
        ("static mut ", ItemKind::Static),
        ("static ", ItemKind::Static),
        ("type ", ItemKind::Type),
        ("mod ", ItemKind::Module),
    ];
    keywords.iter().find_map(|(keyword, kind)| {
        let rest = rest.strip_prefix(keyword)?;
        Some((*kind, ident(rest)?))
    })
}

fn ident(text: &str) -> Option<String> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if end == 0 {
        None
    } else {
        Some(text[..end].to_string())
    }
}

/// Type name of an inherent `impl` block, `None` for trait impls and
/// anything else.
fn inherent_impl_target(line: &str) -> Option<String> {
    let rest = line.strip_prefix("impl")?;
    if !(rest.starts_with(' ') || rest.starts_with('<')) {
        return None;
    }
    let header = rest.split('{').next().unwrap_or(rest);
    if header.contains(" for ") {
        return None;
    }

    let mut depth = 0;
    let mut after_generics = header.len();
    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            c if depth == 0 && !c.is_whitespace() => {
                after_generics = i;
                break;
            }
            _ => {}
        }
    }

    let path = header[after_generics..].trim();
    let path = path.split('<').next().unwrap_or(path);
    ident(path.rsplit("::").next().unwrap_or(path))
}

/// Last line of an attribute starting at `start`.
fn attribute_end(lines: &[&str], start: usize, end: usize) -> usize {
    let mut depth: i32 = 0;
    for (offset, line) in lines[start..end].iter().enumerate() {
        for c in line.chars() {
            match c {
                '[' | '(' => depth += 1,
                ']' | ')' => depth -= 1,
                _ => {}
            }
        }
        if depth <= 0 {
            return start + offset;
        }
    }
    end.saturating_sub(1).max(start)
}

/// Last line of the item starting at `start`: the line holding its closing
/// brace, or the terminating `;` of a body-less item.
fn item_end(lines: &[&str], start: usize, end: usize) -> usize {
    let text = lines[start..end].join("\n");
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut line = start;
    let mut braces: i32 = 0;
    let mut nesting: i32 = 0;
    let mut opened = false;
    let mut k = 0;

    while k < len {
        let c = chars[k];
        let next = chars.get(k + 1).copied();
        match c {
            '\n' => line += 1,
            '/' if next == Some('/') => {
                while k + 1 < len && chars[k + 1] != '\n' {
                    k += 1;
                }
            }
            '/' if next == Some('*') => {
                k += 2;
                while k + 1 < len && !(chars[k] == '*' && chars[k + 1] == '/') {
                    if chars[k] == '\n' {
                        line += 1;
                    }
                    k += 1;
                }
                k += 1;
            }
            '"' => {
                k += 1;
                while k < len && chars[k] != '"' {
                    if chars[k] == '\\' {
                        k += 1;
                    }
                    if chars.get(k) == Some(&'\n') {
                        line += 1;
                    }
                    k += 1;
                }
            }
            'r' if k == 0 || !is_ident_char(chars[k - 1]) => {
                let hashes = chars[k + 1..].iter().take_while(|c| **c == '#').count();
                if chars.get(k + 1 + hashes) == Some(&'"') {
                    k += hashes + 2;
                    while k < len {
                        if chars[k] == '"'
                            && chars[k + 1..].iter().take_while(|c| **c == '#').count() >= hashes
                        {
                            k += hashes;
                            break;
                        }
                        if chars[k] == '\n' {
                            line += 1;
                        }
                        k += 1;
                    }
                }
            }
            '\'' => {
                if next == Some('\\') {
                    k += 2;
                    while k < len && chars[k] != '\'' {
                        k += 1;
                    }
                } else if chars.get(k + 2) == Some(&'\'') {
                    k += 2;
                }
            }
            '(' | '[' => nesting += 1,
            ')' | ']' => nesting -= 1,
            '{' => {
                braces += 1;
                opened = true;
            }
            '}' => {
                braces -= 1;
                if opened && braces == 0 {
                    return line;
                }
            }
            ';' if braces == 0 && nesting == 0 && !opened => return line,
            _ => {}
        }
        k += 1;
    }

    end.saturating_sub(1).max(start)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Declaration text without the body (or initialiser of constants).
fn signature(text: &str, kind: ItemKind) -> String {
    let mut depth: i32 = 0;
    let mut cut = text.len();
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' if depth > 0 => depth -= 1,
            '{' | ';' if depth == 0 => {
                cut = i;
                break;
            }
            '=' if depth == 0 && matches!(kind, ItemKind::Const | ItemKind::Static) => {
                cut = i;
                break;
            }
            _ => {}
        }
    }
    normalize_whitespace(&text[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r##"//! Wifi driver.
//!
//! Station mode only.

use std::fmt;

/// Connection timeout in seconds
pub const TIMEOUT: u32 = 10;

/// A wifi station.
///
/// Holds the interface handle.
#[derive(Debug, Clone)]
pub struct Station {
    handle: u8,
}

impl Station {
    /// Create a station.
    pub fn new(handle: u8) -> Self {
        Station { handle }
    }

    fn reset(&mut self) {}

    /// Scan for networks, `{` braces in strings are fine: "}".
    pub fn scan(
        &self,
        channel: u8,
    ) -> Vec<String> {
        let brace = '}';
        vec![format!("{}{}", brace, r#"}"#)]
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station {}", self.handle)
    }
}

fn private_helper() {}

pub(crate) fn crate_helper() {}

/// Connect to an access point.
pub async fn connect(ssid: &str) -> Result<(), Error> {
    Ok(())
}

pub mod scan;

pub use self::scan::Network;
"##;

    #[test]
    fn test_module_doc() {
        let (doc, _) = extract(SOURCE);
        assert_eq!(doc.as_deref(), Some("Wifi driver.\n\nStation mode only."));
    }

    #[test]
    fn test_public_items() {
        let (_, items) = extract(SOURCE);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["TIMEOUT", "Station", "connect", "scan"]);

        assert_eq!(items[0].kind, ItemKind::Const);
        assert_eq!(items[0].signature, "pub const TIMEOUT: u32");
        assert_eq!(items[0].doc.as_deref(), Some("Connection timeout in seconds"));

        assert_eq!(items[1].signature, "pub struct Station");
        assert_eq!(
            items[1].doc.as_deref(),
            Some("A wifi station.\n\nHolds the interface handle.")
        );
        assert!(items[1].source.ends_with('}'));

        assert_eq!(items[2].kind, ItemKind::Function);
        assert_eq!(
            items[2].signature,
            "pub async fn connect(ssid: &str) -> Result<(), Error>"
        );
        assert_eq!(items[3].kind, ItemKind::Module);
        assert_eq!(items[3].doc, None);
    }

    #[test]
    fn test_inherent_methods_attached() {
        let (_, items) = extract(SOURCE);
        let station = &items[1];
        let methods: Vec<&str> = station.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["new", "scan"]);
        assert_eq!(station.members[0].kind, ItemKind::Method);
        assert_eq!(station.members[0].doc.as_deref(), Some("Create a station."));
        assert_eq!(
            station.members[1].signature,
            "pub fn scan(&self, channel: u8,) -> Vec<String>"
        );
        assert!(station.members[1].source.starts_with("pub fn scan("));
        assert!(station.members[1].source.ends_with('}'));
    }

    #[test]
    fn test_impl_target() {
        assert_eq!(inherent_impl_target("impl Station {").as_deref(), Some("Station"));
        assert_eq!(
            inherent_impl_target("impl<T: Clone> Wrapper<T> {").as_deref(),
            Some("Wrapper")
        );
        assert_eq!(inherent_impl_target("impl fmt::Display for Station {"), None);
        assert_eq!(inherent_impl_target("implement()"), None);
    }
}
