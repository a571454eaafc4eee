use super::{dedent, normalize_whitespace, Item, ItemKind};

/// Extract the module docstring and the public definitions of a Python
/// source file.
pub fn extract(source: &str) -> (Option<String>, Vec<Item>) {
    let lines: Vec<&str> = source.lines().collect();

    let first_code = lines.iter().position(|l| {
        let t = l.trim();
        !t.is_empty() && !t.starts_with('#')
    });
    let doc = first_code.and_then(|i| docstring(&lines, i, lines.len()));

    let items = definitions(&lines, 0, lines.len(), 0, false);
    (doc, items)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_public(name: &str) -> bool {
    !name.starts_with('_') || name == "__init__"
}

/// `def`, `async def` or `class` header on a line, with the defined name.
fn header(trimmed: &str) -> Option<(ItemKind, &str)> {
    let (kind, rest) = if let Some(rest) = trimmed.strip_prefix("def ") {
        (ItemKind::Function, rest)
    } else if let Some(rest) = trimmed.strip_prefix("async def ") {
        (ItemKind::Function, rest)
    } else if let Some(rest) = trimmed.strip_prefix("class ") {
        (ItemKind::Class, rest)
    } else {
        return None;
    };

    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    if name.is_empty() {
        None
    } else {
        Some((kind, name))
    }
}

/// Definitions at `indent` within `lines[start..end]`.
///
/// Inside a class body only methods are collected.
fn definitions(
    lines: &[&str],
    start: usize,
    end: usize,
    indent: usize,
    in_class: bool,
) -> Vec<Item> {
    let mut items = Vec::new();
    let mut i = start;

    while i < end {
        let line = lines[i];
        let trimmed = line.trim_start();
        if trimmed.is_empty() || indent_of(line) != indent {
            i += 1;
            continue;
        }

        let Some((kind, name)) = header(trimmed) else {
            i += 1;
            continue;
        };

        let header_end = header_end(lines, i, end);
        let block_end = block_end(lines, header_end + 1, end, indent);

        if in_class && kind == ItemKind::Class {
            i = block_end;
            continue;
        }

        if is_public(name) {
            let header_text = lines[i..=header_end].join("\n");
            let members = if kind == ItemKind::Class {
                let body_indent = lines[header_end + 1..block_end]
                    .iter()
                    .find(|l| !l.trim().is_empty())
                    .map(|l| indent_of(l));
                match body_indent {
                    Some(body_indent) => {
                        definitions(lines, header_end + 1, block_end, body_indent, true)
                    }
                    None => Vec::new(),
                }
            } else {
                Vec::new()
            };

            items.push(Item {
                kind: if in_class { ItemKind::Method } else { kind },
                name: name.to_string(),
                signature: signature(&header_text),
                doc: docstring(lines, header_end + 1, block_end),
                source: dedent(&lines[i..block_end]),
                members,
            });
        }

        i = block_end;
    }

    items
}

/// Last line of a (possibly multi-line) header starting at `start`.
fn header_end(lines: &[&str], start: usize, end: usize) -> usize {
    let mut depth: i32 = 0;
    for (offset, line) in lines[start..end].iter().enumerate() {
        for c in line.chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                '#' => break,
                _ => {}
            }
        }
        if depth <= 0 {
            return start + offset;
        }
    }
    end.saturating_sub(1).max(start)
}

/// First line after the indented block that begins at `from`.
fn block_end(lines: &[&str], from: usize, end: usize, indent: usize) -> usize {
    let mut last = from;
    for (j, line) in lines.iter().enumerate().take(end).skip(from) {
        if line.trim().is_empty() {
            continue;
        }
        if indent_of(line) <= indent {
            break;
        }
        last = j + 1;
    }
    last
}

/// Header text up to the colon that opens the body.
fn signature(header: &str) -> String {
    let mut depth: i32 = 0;
    let mut cut = header.len();
    for (i, c) in header.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth == 0 => {
                cut = i;
                break;
            }
            _ => {}
        }
    }
    normalize_whitespace(&header[..cut])
}

/// Docstring at the first non-blank line of `lines[from..to]`, if any.
fn docstring(lines: &[&str], from: usize, to: usize) -> Option<String> {
    let first = (from..to).find(|&i| !lines[i].trim().is_empty())?;
    let opening = lines[first].trim_start();
    let opening = opening
        .strip_prefix(['r', 'R', 'u', 'U'])
        .filter(|rest| rest.starts_with("\"\"\"") || rest.starts_with("'''"))
        .unwrap_or(opening);

    let quote = ["\"\"\"", "'''"]
        .into_iter()
        .find(|q| opening.starts_with(q))?;
    let after = &opening[quote.len()..];

    let mut collected: Vec<&str> = Vec::new();
    if let Some(close) = after.find(quote) {
        collected.push(&after[..close]);
    } else {
        collected.push(after);
        let mut closed = false;
        for line in &lines[first + 1..to] {
            if let Some(close) = line.find(quote) {
                collected.push(&line[..close]);
                closed = true;
                break;
            }
            collected.push(line);
        }
        if !closed {
            return None;
        }
    }

    // the first line is never indented, the rest share the body indent
    let indent = collected[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);
    let mut cleaned = vec![collected[0].trim()];
    cleaned.extend(
        collected[1..]
            .iter()
            .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()).trim_end()),
    );

    let text = cleaned.join("\n").trim_matches('\n').to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
