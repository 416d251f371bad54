//! HTML序列化

use crate::tree::{NodeKind, ViewNode};
use std::fmt::Write;

/// 把显示树序列化为HTML片段
pub fn to_html(node: &ViewNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// 生成完整的HTML文档
pub fn render_document(title: &str, stylesheet: &str, body: &ViewNode) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(title));
    let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", escape(stylesheet));
    out.push_str("</head>\n<body>\n");
    write_node(body, &mut out);
    out.push_str("\n</body>\n</html>\n");
    out
}

fn write_node(node: &ViewNode, out: &mut String) {
    match node {
        ViewNode::Text { text } => out.push_str(&escape(text)),
        ViewNode::Element {
            kind,
            attrs,
            children,
        } => {
            let tag = kind.tag();
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                let _ = write!(out, " {}=\"{}\"", name, escape(value));
            }
            out.push('>');

            if kind.is_void() {
                return;
            }
            // 浏览器会吞掉textarea开标签后的第一个换行
            if *kind == NodeKind::TextArea {
                out.push('\n');
            }

            for child in children {
                write_node(child, out);
            }
            let _ = write!(out, "</{}>", tag);
        }
    }
}

/// 转义HTML特殊字符
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
