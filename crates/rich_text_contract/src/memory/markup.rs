//! Minimal HTML fragment reader/writer backing [`super::MemorySurface`].
//!
//! Covers the markup the editor produces: elements with quoted or bare attributes, void
//! elements, text, and the handful of entities the editor and browsers emit.

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum MarkupNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn close(self) -> MarkupNode {
        MarkupNode::Element {
            tag: self.tag,
            attrs: self.attrs,
            children: self.children,
        }
    }
}

pub(super) fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub(super) fn parse_fragment(html: &str) -> Vec<MarkupNode> {
    let mut top_level = Vec::new();
    let mut open: Vec<OpenElement> = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').unwrap_or(after.len());
            let tag = after[..end].trim().to_ascii_lowercase();
            rest = after.get(end + 1..).unwrap_or("");
            if let Some(pos) = open.iter().rposition(|element| element.tag == tag) {
                while open.len() > pos {
                    if let Some(element) = open.pop() {
                        attach(&mut top_level, &mut open, element.close());
                    }
                }
            }
            continue;
        }

        let opens_tag = rest
            .strip_prefix('<')
            .and_then(|after| after.chars().next())
            .map(|ch| ch.is_ascii_alphabetic())
            .unwrap_or(false);
        if opens_tag {
            let end = tag_end(rest);
            let inner = rest[1..end].trim_end();
            rest = rest.get(end + 1..).unwrap_or("");
            let self_closing = inner.ends_with('/');
            let (tag, attrs) = parse_tag(inner.trim_end_matches('/'));
            if self_closing || is_void(&tag) {
                let node = MarkupNode::Element {
                    tag,
                    attrs,
                    children: Vec::new(),
                };
                attach(&mut top_level, &mut open, node);
            } else {
                open.push(OpenElement {
                    tag,
                    attrs,
                    children: Vec::new(),
                });
            }
            continue;
        }

        let end = rest
            .char_indices()
            .skip(1)
            .find(|(_, ch)| *ch == '<')
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        attach(
            &mut top_level,
            &mut open,
            MarkupNode::Text(decode_entities(&rest[..end])),
        );
        rest = &rest[end..];
    }

    while let Some(element) = open.pop() {
        attach(&mut top_level, &mut open, element.close());
    }
    top_level
}

fn attach(top_level: &mut Vec<MarkupNode>, open: &mut [OpenElement], node: MarkupNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top_level.push(node),
    }
}

fn tag_end(source: &str) -> usize {
    let mut quote = None::<char>;
    for (idx, ch) in source.char_indices() {
        match quote {
            Some(active) if ch == active => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return idx,
            None => {}
        }
    }
    source.len()
}

fn parse_tag(inner: &str) -> (String, Vec<(String, String)>) {
    let mut chars = inner.chars().peekable();
    let mut tag = String::new();
    while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace()) {
        tag.push(ch.to_ascii_lowercase());
    }

    let mut attrs = Vec::new();
    loop {
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        let mut name = String::new();
        while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace() && *ch != '=') {
            name.push(ch.to_ascii_lowercase());
        }
        if name.is_empty() {
            break;
        }
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        let mut value = String::new();
        if chars.next_if_eq(&'=').is_some() {
            while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
            match chars.next_if(|ch| *ch == '"' || *ch == '\'') {
                Some(quote) => {
                    for ch in chars.by_ref() {
                        if ch == quote {
                            break;
                        }
                        value.push(ch);
                    }
                }
                None => {
                    while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace()) {
                        value.push(ch);
                    }
                }
            }
        }
        attrs.push((name, decode_entities(&value)));
    }
    (tag, attrs)
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub(super) fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

pub(super) fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\u{a0}', "&nbsp;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_nested_elements_with_attributes() {
        let nodes = parse_fragment(r#"<p>Hi <a href="https://x.test/?a=1&amp;b=2" target=_blank>x</a></p>"#);
        assert_eq!(
            nodes,
            vec![MarkupNode::Element {
                tag: "p".to_string(),
                attrs: Vec::new(),
                children: vec![
                    MarkupNode::Text("Hi ".to_string()),
                    MarkupNode::Element {
                        tag: "a".to_string(),
                        attrs: vec![
                            ("href".to_string(), "https://x.test/?a=1&b=2".to_string()),
                            ("target".to_string(), "_blank".to_string()),
                        ],
                        children: vec![MarkupNode::Text("x".to_string())],
                    },
                ],
            }]
        );
    }

    #[test]
    fn void_and_unclosed_elements_do_not_swallow_siblings() {
        let nodes = parse_fragment("a<br>b<b>c");
        assert_eq!(nodes.len(), 4);
        assert!(matches!(&nodes[1], MarkupNode::Element { tag, .. } if tag == "br"));
        assert!(
            matches!(&nodes[3], MarkupNode::Element { tag, children, .. } if tag == "b" && children.len() == 1)
        );
    }

    #[test]
    fn nbsp_entities_decode_and_reencode() {
        let nodes = parse_fragment("&nbsp;x");
        assert_eq!(nodes, vec![MarkupNode::Text("\u{a0}x".to_string())]);
        assert_eq!(escape_text("\u{a0}x<"), "&nbsp;x&lt;");
    }
}
