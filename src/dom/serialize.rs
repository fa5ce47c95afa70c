//! HTML serialization of a [`Document`]

use super::document::{Document, NodeData, NodeId};

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

impl Document {
    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize the children of a node (`innerHTML`)
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Document => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag_name(p))
                    .map(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
                    .unwrap_or(false);
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for (key, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.name.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_body() {
        let doc = Document::parse(r#"<p class="lead">Fish &amp; chips<br>today</p>"#);
        let body = doc.body().unwrap();
        assert_eq!(
            doc.inner_html(body),
            r#"<p class="lead">Fish &amp; chips<br>today</p>"#
        );
    }

    #[test]
    fn test_script_text_is_raw() {
        let doc = Document::parse("<script>if (a < b) {}</script>");
        assert!(doc.to_html().contains("<script>if (a < b) {}</script>"));
    }

    #[test]
    fn test_doctype_preserved() {
        let doc = Document::parse("<!DOCTYPE html><p>x</p>");
        assert!(doc.to_html().starts_with("<!DOCTYPE html><html>"));
    }
}
