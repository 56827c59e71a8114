/*!
 * Arena-backed HTML document tree.
 *
 * Parsing goes through html5ever into an `RcDom`, which is immediately
 * flattened into a `Vec<Node>` keyed by `NodeId`. The arena is `Send`, so a
 * worker can hold it across backend calls; the `RcDom` never outlives
 * `DocumentTree::parse`.
 */

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};
use std::io;

use crate::errors::ParseError;

/// Index of a node inside its `DocumentTree`
pub type NodeId = usize;

/// Elements whose text content is never translated
pub const PROTECTED_TAGS: [&str; 4] = ["script", "style", "code", "pre"];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// The root; always `NodeId` 0
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element {
        name: QualName,
        attrs: Vec<(QualName, String)>,
    },
    Text {
        contents: String,
    },
    Comment {
        contents: String,
    },
    ProcessingInstruction {
        target: String,
        contents: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub data: NodeData,
    pub children: Vec<NodeId>,
}

/// A text node found by traversal, with its protection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNode {
    pub id: NodeId,
    /// True when some ancestor is one of `PROTECTED_TAGS`
    pub protected: bool,
}

/// Exclusively owned, mutable document graph
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub const ROOT: NodeId = 0;

    /// Empty document containing only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                children: Vec::new(),
            }],
        }
    }

    /// Parse UTF-8 HTML bytes.
    ///
    /// html5ever never rejects markup, so the only failure is an invalid
    /// encoding. Missing `html`/`head`/`body` elements are synthesized the way
    /// a browser would.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidEncoding {
            offset: e.valid_up_to(),
        })?;
        let dom = parse_document(RcDom::default(), Default::default()).one(text);
        Ok(Self::from_dom(&dom.document))
    }

    fn from_dom(document: &Handle) -> Self {
        let mut tree = Self::new();
        let mut pending: Vec<(Handle, NodeId)> = document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), Self::ROOT))
            .collect();

        while let Some((handle, parent)) = pending.pop() {
            let data = match &handle.data {
                DomData::Document => continue,
                DomData::Doctype {
                    name,
                    public_id,
                    system_id,
                } => NodeData::Doctype {
                    name: name.to_string(),
                    public_id: public_id.to_string(),
                    system_id: system_id.to_string(),
                },
                DomData::Text { contents } => NodeData::Text {
                    contents: contents.borrow().to_string(),
                },
                DomData::Comment { contents } => NodeData::Comment {
                    contents: contents.to_string(),
                },
                DomData::ProcessingInstruction { target, contents } => {
                    NodeData::ProcessingInstruction {
                        target: target.to_string(),
                        contents: contents.to_string(),
                    }
                }
                DomData::Element { name, attrs, .. } => NodeData::Element {
                    name: name.clone(),
                    attrs: attrs
                        .borrow()
                        .iter()
                        .map(|attr| (attr.name.clone(), attr.value.to_string()))
                        .collect(),
                },
            };

            let id = tree.push(parent, data);

            // <template> keeps its children in a separate fragment
            let mut children: Vec<Handle> = Vec::new();
            if let DomData::Element {
                template_contents, ..
            } = &handle.data
            {
                if let Some(fragment) = template_contents.borrow().as_ref() {
                    children.extend(fragment.children.borrow().iter().cloned());
                }
            }
            children.extend(handle.children.borrow().iter().cloned());
            pending.extend(children.into_iter().rev().map(|child| (child, id)));
        }

        tree
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Append an HTML element under `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let name = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag));
        self.push(parent, NodeData::Element { name, attrs: Vec::new() })
    }

    /// Append a text node under `parent`
    pub fn append_text(&mut self, parent: NodeId, contents: &str) -> NodeId {
        self.push(
            parent,
            NodeData::Text {
                contents: contents.to_string(),
            },
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Local name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => Some(&*name.local),
            _ => None,
        }
    }

    /// Content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Text { contents }) => Some(contents.as_str()),
            _ => None,
        }
    }

    /// Replace the content of a text node; returns false for any other node
    pub fn set_text(&mut self, id: NodeId, contents: String) -> bool {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text { contents: current }) => {
                *current = contents;
                true
            }
            _ => false,
        }
    }

    /// Remove a leading `<?xml ...?>` declaration from the document.
    ///
    /// The HTML tokenizer reports it as a bogus comment whose text starts with
    /// `?xml`; a real processing instruction is accepted too.
    pub fn strip_leading_xml_declaration(&mut self) -> bool {
        let Some(&first) = self.nodes[Self::ROOT].children.first() else {
            return false;
        };
        let is_declaration = match &self.nodes[first].data {
            NodeData::ProcessingInstruction { .. } => true,
            NodeData::Comment { contents } => contents.trim_start().starts_with("?xml"),
            _ => false,
        };
        if is_declaration {
            self.nodes[Self::ROOT].children.remove(0);
        }
        is_declaration
    }

    /// All text nodes in depth-first document order
    pub fn text_nodes(&self) -> Vec<TextNode> {
        let mut found = Vec::new();
        let mut stack: Vec<(NodeId, bool)> = vec![(Self::ROOT, false)];

        while let Some((id, protected)) = stack.pop() {
            let node = &self.nodes[id];
            let protected = protected
                || matches!(&node.data, NodeData::Element { name, .. }
                    if PROTECTED_TAGS.contains(&&*name.local));

            if let NodeData::Text { .. } = node.data {
                found.push(TextNode { id, protected });
            }
            stack.extend(node.children.iter().rev().map(|&child| (child, protected)));
        }

        found
    }

    /// Serialize back to HTML
    pub fn to_html(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        serialize(
            &mut buffer,
            self,
            SerializeOpts {
                traversal_scope: TraversalScope::ChildrenOnly(None),
                ..Default::default()
            },
        )?;
        Ok(buffer)
    }
}

enum SerializeOp {
    Open(NodeId),
    Close(QualName),
}

impl Serialize for DocumentTree {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops: Vec<SerializeOp> = match traversal_scope {
            TraversalScope::IncludeNode => vec![SerializeOp::Open(Self::ROOT)],
            TraversalScope::ChildrenOnly(_) => self.nodes[Self::ROOT]
                .children
                .iter()
                .rev()
                .map(|&child| SerializeOp::Open(child))
                .collect(),
        };

        while let Some(op) = ops.pop() {
            let id = match op {
                SerializeOp::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
                SerializeOp::Open(id) => id,
            };

            let node = &self.nodes[id];
            match &node.data {
                NodeData::Element { name, attrs } => {
                    serializer.start_elem(
                        name.clone(),
                        attrs.iter().map(|(attr, value)| (attr, value.as_str())),
                    )?;
                    ops.push(SerializeOp::Close(name.clone()));
                }
                NodeData::Document => {}
                NodeData::Doctype { name, .. } => serializer.write_doctype(name)?,
                NodeData::Text { contents } => serializer.write_text(contents)?,
                NodeData::Comment { contents } => serializer.write_comment(contents)?,
                NodeData::ProcessingInstruction { target, contents } => {
                    serializer.write_processing_instruction(target, contents)?
                }
            }
            ops.extend(node.children.iter().rev().map(|&child| SerializeOp::Open(child)));
        }

        Ok(())
    }
}
