//! In-memory document the view controllers render into
//!
//! The embedding shell owns the real widget tree; this model mirrors the
//! slice the controllers touch: named containers whose content is replaced
//! wholesale each render pass, nodes carrying class sets and translation
//! markers, and bound input fields. Later writes overwrite earlier ones
//! without conflict detection; everything runs on the one UI thread.

use std::collections::{BTreeMap, BTreeSet};

/// Escape text for element content or a double-quoted attribute value.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// One rendered element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: BTreeSet<String>,
    /// Translation marker; the relay rewrites `text` for every node bearing
    /// the same key
    pub l10n_key: Option<String>,
    pub text: String,
    pub hidden: bool,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn l10n(mut self, key: impl Into<String>) -> Self {
        self.l10n_key = Some(key.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    fn collect_l10n_keys(&self, into: &mut BTreeSet<String>) {
        if let Some(key) = &self.l10n_key {
            into.insert(key.clone());
        }
        for child in &self.children {
            child.collect_l10n_keys(into);
        }
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    fn find(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn to_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(id) = &self.id {
            out.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if !self.classes.is_empty() {
            let classes: Vec<&str> = self.classes.iter().map(String::as_str).collect();
            out.push_str(&format!(" class=\"{}\"", escape(&classes.join(" "))));
        }
        if let Some(key) = &self.l10n_key {
            out.push_str(&format!(" data-l10n=\"{}\"", escape(key)));
        }
        if self.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
        out.push_str(&escape(&self.text));
        for child in &self.children {
            child.to_html(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

/// The window's rendered state: containers plus bound input fields
#[derive(Debug, Clone, Default)]
pub struct Document {
    containers: BTreeMap<String, Vec<Node>>,
    inputs: BTreeMap<String, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap a container's entire content in one pass.
    pub fn replace_children(&mut self, container: &str, nodes: Vec<Node>) {
        self.containers.insert(container.to_string(), nodes);
    }

    pub fn container(&self, container: &str) -> &[Node] {
        self.containers
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.containers
            .values()
            .flatten()
            .find_map(|node| node.find(id))
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) {
        for nodes in self.containers.values_mut() {
            for node in nodes.iter_mut() {
                node.visit_mut(&mut |node| {
                    if node.id.as_deref() == Some(id) {
                        node.hidden = hidden;
                    }
                });
            }
        }
    }

    /// Unique translation markers currently present, in sorted order.
    pub fn l10n_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for nodes in self.containers.values() {
            for node in nodes {
                node.collect_l10n_keys(&mut keys);
            }
        }
        keys
    }

    /// Rewrite every node bearing this marker. Arrival order wins; a stale
    /// pair for the same key simply gets overwritten by a later one.
    pub fn apply_translation(&mut self, key: &str, text: &str) {
        for nodes in self.containers.values_mut() {
            for node in nodes.iter_mut() {
                node.visit_mut(&mut |node| {
                    if node.l10n_key.as_deref() == Some(key) {
                        node.text = text.to_string();
                    }
                });
            }
        }
    }

    pub fn set_input(&mut self, field: &str, value: String) {
        self.inputs.insert(field.to_string(), value);
    }

    pub fn input(&self, field: &str) -> &str {
        self.inputs.get(field).map(String::as_str).unwrap_or("")
    }

    /// Render the whole document to markup, containers in name order.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (name, nodes) in &self.containers {
            out.push_str(&format!("<div id=\"{}\">", escape(name)));
            for node in nodes {
                node.to_html(&mut out);
            }
            out.push_str("</div>\n");
        }
        for (field, value) in &self.inputs {
            out.push_str(&format!(
                "<input id=\"{}\" value=\"{}\">\n",
                escape(field),
                escape(value)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape(r#"<Mods & "Maps">"#),
            "&lt;Mods &amp; &quot;Maps&quot;&gt;"
        );
    }

    #[test]
    fn replace_children_discards_previous_content() {
        let mut doc = Document::new();
        doc.replace_children("list", vec![Node::new("li").id("a"), Node::new("li").id("b")]);
        doc.replace_children("list", vec![Node::new("li").id("c")]);

        assert_eq!(doc.container("list").len(), 1);
        assert!(doc.find("a").is_none());
        assert!(doc.find("c").is_some());
    }

    #[test]
    fn l10n_keys_are_deduplicated_and_sorted() {
        let mut doc = Document::new();
        doc.replace_children(
            "list",
            vec![
                Node::new("span").l10n("badge_unused"),
                Node::new("li").child(Node::new("span").l10n("badge_dlc")),
                Node::new("span").l10n("badge_unused"),
            ],
        );
        let keys: Vec<String> = doc.l10n_keys().into_iter().collect();
        assert_eq!(keys, ["badge_dlc", "badge_unused"]);
    }

    #[test]
    fn translation_updates_every_bearer() {
        let mut doc = Document::new();
        doc.replace_children(
            "a",
            vec![Node::new("span").l10n("title").text("title")],
        );
        doc.replace_children(
            "b",
            vec![Node::new("li").child(Node::new("span").l10n("title").text("title"))],
        );

        doc.apply_translation("title", "Titel");
        assert!(doc.to_html().matches("Titel").count() == 2);
    }

    #[test]
    fn hidden_entries_render_with_the_hidden_attribute() {
        let mut doc = Document::new();
        doc.replace_children("list", vec![Node::new("li").id("mod-a").text("a")]);
        doc.set_hidden("mod-a", true);
        assert!(doc.to_html().contains("hidden"));

        doc.set_hidden("mod-a", false);
        assert!(!doc.to_html().contains("hidden"));
    }

    #[test]
    fn missing_input_defaults_to_empty() {
        let doc = Document::new();
        assert_eq!(doc.input("note_server"), "");
    }
}
