use std::fmt::Write;

use reflow_core::{TextRole, View, ViewKind};

/// Indented outline of a view tree, one node per line. Fragments are
/// transparent.
pub fn dump(view: &View) -> String {
    let mut out = String::new();
    write_node(view, 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn write_node(view: &View, depth: usize, out: &mut String) {
    let label = match &view.kind {
        ViewKind::Fragment => {
            for c in &view.children {
                write_node(c, depth, out);
            }
            return;
        }
        ViewKind::Surface => "Surface".to_string(),
        ViewKind::Column => "Column".to_string(),
        ViewKind::Row => "Row".to_string(),
        ViewKind::Text { text, role } => {
            let name = match role {
                TextRole::Body => "Text",
                TextRole::Heading => "Heading",
                TextRole::Error => "Error",
            };
            format!("{name} {text:?}")
        }
        ViewKind::Button { text, .. } => format!("Button {text:?}"),
        ViewKind::Component(c) => format!("<{}>", c.name),
        ViewKind::Provider(p) => format!("<{}.Provider>", p.name),
        ViewKind::Mounted(id) => format!("<mounted {id:?}>"),
    };
    let _ = write!(out, "{}{}", "  ".repeat(depth), label);
    if let Some(tag) = &view.tag {
        let _ = write!(out, " #{tag}");
    }
    out.push('\n');
    for c in &view.children {
        write_node(c, depth + 1, out);
    }
}
