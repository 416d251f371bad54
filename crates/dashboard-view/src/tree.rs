//! 显示树
//!
//! 节点要么是带属性和子节点的元素，要么是纯文本。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 元素种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    Section,
    Header,
    Nav,
    Aside,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Paragraph,
    Span,
    Label,
    Button,
    Form,
    Select,
    SelectOption,
    TextArea,
    Input,
    Table,
    TableHead,
    TableBody,
    Row,
    HeaderCell,
    Cell,
    Chart,
    Bar,
}

impl NodeKind {
    /// 对应的HTML标签
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Container | NodeKind::Chart | NodeKind::Bar => "div",
            NodeKind::Section => "section",
            NodeKind::Header => "header",
            NodeKind::Nav => "nav",
            NodeKind::Aside => "aside",
            NodeKind::Heading1 => "h1",
            NodeKind::Heading2 => "h2",
            NodeKind::Heading3 => "h3",
            NodeKind::Heading4 => "h4",
            NodeKind::Heading5 => "h5",
            NodeKind::Paragraph => "p",
            NodeKind::Span => "span",
            NodeKind::Label => "label",
            NodeKind::Button => "button",
            NodeKind::Form => "form",
            NodeKind::Select => "select",
            NodeKind::SelectOption => "option",
            NodeKind::TextArea => "textarea",
            NodeKind::Input => "input",
            NodeKind::Table => "table",
            NodeKind::TableHead => "thead",
            NodeKind::TableBody => "tbody",
            NodeKind::Row => "tr",
            NodeKind::HeaderCell => "th",
            NodeKind::Cell => "td",
        }
    }

    /// 指定级别的标题，超出范围时取最近的级别
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => NodeKind::Heading1,
            2 => NodeKind::Heading2,
            3 => NodeKind::Heading3,
            4 => NodeKind::Heading4,
            _ => NodeKind::Heading5,
        }
    }

    /// 没有闭合标签的元素
    pub fn is_void(&self) -> bool {
        matches!(self, NodeKind::Input)
    }
}

/// 显示树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewNode {
    Element {
        kind: NodeKind,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ViewNode>,
    },
    Text {
        text: String,
    },
}

impl ViewNode {
    pub fn element(kind: NodeKind) -> Self {
        ViewNode::Element {
            kind,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ViewNode::Text { text: text.into() }
    }

    /// 设置属性；文本节点上调用时忽略
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let ViewNode::Element { attrs, .. } = &mut self {
            attrs.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    /// 追加子节点；文本节点上调用时忽略
    pub fn child(mut self, node: ViewNode) -> Self {
        if let ViewNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = ViewNode>) -> Self {
        if let ViewNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.child(ViewNode::text(text))
    }

    pub fn kind(&self) -> Option<&NodeKind> {
        match self {
            ViewNode::Element { kind, .. } => Some(kind),
            ViewNode::Text { .. } => None,
        }
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        match self {
            ViewNode::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            ViewNode::Text { .. } => None,
        }
    }

    pub fn child_nodes(&self) -> &[ViewNode] {
        match self {
            ViewNode::Element { children, .. } => children,
            ViewNode::Text { .. } => &[],
        }
    }

    /// 深度优先查找第一个满足条件的节点
    pub fn find(&self, predicate: &dyn Fn(&ViewNode) -> bool) -> Option<&ViewNode> {
        if predicate(self) {
            return Some(self);
        }
        self.child_nodes()
            .iter()
            .find_map(|child| child.find(predicate))
    }

    /// 深度优先收集所有满足条件的节点
    pub fn find_all<'a>(&'a self, predicate: &dyn Fn(&ViewNode) -> bool) -> Vec<&'a ViewNode> {
        let mut found = Vec::new();
        self.collect(predicate, &mut found);
        found
    }

    fn collect<'a>(&'a self, predicate: &dyn Fn(&ViewNode) -> bool, found: &mut Vec<&'a ViewNode>) {
        if predicate(self) {
            found.push(self);
        }
        for child in self.child_nodes() {
            child.collect(predicate, found);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ViewNode> {
        self.find(&|node| node.attr_value("id") == Some(id))
    }

    /// 拼接所有后代文本
    pub fn text_content(&self) -> String {
        match self {
            ViewNode::Text { text } => text.clone(),
            ViewNode::Element { children, .. } => {
                children.iter().map(ViewNode::text_content).collect()
            }
        }
    }
}

pub fn div() -> ViewNode {
    ViewNode::element(NodeKind::Container)
}

pub fn heading(level: u8, text: impl Into<String>) -> ViewNode {
    ViewNode::element(NodeKind::heading(level)).with_text(text)
}

pub fn paragraph(text: impl Into<String>) -> ViewNode {
    ViewNode::element(NodeKind::Paragraph).with_text(text)
}

pub fn span(text: impl Into<String>) -> ViewNode {
    ViewNode::element(NodeKind::Span).with_text(text)
}

/// 不绑定任何行为的按钮
pub fn static_button(text: impl Into<String>) -> ViewNode {
    ViewNode::element(NodeKind::Button)
        .attr("type", "button")
        .with_text(text)
}

/// 以POST提交到 `action` 的表单
pub fn post_form(action: &str) -> ViewNode {
    ViewNode::element(NodeKind::Form)
        .attr("method", "post")
        .attr("action", action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_queries() {
        let tree = div()
            .id("root")
            .child(heading(3, "Key Metrics"))
            .child(div().class("metric-box").child(span("50").id("total")));

        assert_eq!(tree.find_by_id("total").unwrap().text_content(), "50");
        assert_eq!(tree.text_content(), "Key Metrics50");
        assert_eq!(
            tree.find_all(&|node| node.attr_value("class") == Some("metric-box"))
                .len(),
            1
        );
        assert!(tree.find_by_id("missing").is_none());
    }

    #[test]
    fn test_text_nodes_ignore_element_builders() {
        let node = ViewNode::text("plain").attr("id", "x").child(span("y"));
        assert_eq!(node, ViewNode::text("plain"));
        assert!(node.kind().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let node = heading(4, "Title").class("title");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "element");
        assert_eq!(json["kind"], "heading4");
        assert_eq!(json["attrs"]["class"], "title");
        assert_eq!(json["children"][0]["type"], "text");
        assert_eq!(json["children"][0]["text"], "Title");

        let back: ViewNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
