use scraper::{ElementRef, Node};

const NBSP: char = '\u{a0}';

/// Plain text of an element with `**bold**` and `_italic_` markers.
/// Other wrappers (`span`, `a`, `o:p`, ...) are unwrapped. Only the final result is trimmed.
pub fn extract_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect(element, &mut out);
    out.trim().to_string()
}

fn collect(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Node::Text(text) = child.value() {
            out.extend(text.chars().map(|c| if c == NBSP { ' ' } else { c }));
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        match child.value().name() {
            "script" | "style" => {}
            "b" | "strong" => wrapped(child, "**", out),
            "i" | "em" => wrapped(child, "_", out),
            _ => collect(child, out),
        }
    }
}

/// Markers hug the text: surrounding whitespace stays outside, empty content gets none.
fn wrapped(element: ElementRef<'_>, marker: &str, out: &mut String) {
    let mut inner = String::new();
    collect(element, &mut inner);

    let core = inner.trim();
    if core.is_empty() {
        out.push_str(&inner);
        return;
    }

    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    out.push_str(leading);
    out.push_str(marker);
    out.push_str(core);
    out.push_str(marker);
    out.push_str(trailing);
}
