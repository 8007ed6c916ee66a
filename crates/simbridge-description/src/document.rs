// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owned, immutable tree built once from the robot description markup.
//!
//! The markup is parsed with `roxmltree` and copied into [`ConfigNode`]s so
//! the document does not borrow the input text. Only elements are kept;
//! comments and processing instructions are dropped.

use simbridge_core::SimbridgeError;
use tracing::{debug, info};

/// Tag of the document root.
pub const ROBOT_TAG: &str = "robot";

/// Tag of the engine-specific section below the root.
pub const WEBOTS_TAG: &str = "webots";

/// One element of the robot description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<ConfigNode>,
    line: u32,
}

impl ConfigNode {
    fn from_xml(node: roxmltree::Node<'_, '_>, doc: &roxmltree::Document<'_>) -> Self {
        let attributes = node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();
        let text = node.text().map(str::to_string);
        let children = node
            .children()
            .filter(|n| n.is_element())
            .map(|child| ConfigNode::from_xml(child, doc))
            .collect();

        Self {
            tag: node.tag_name().name().to_string(),
            attributes,
            text,
            children,
            line: doc.text_pos_at(node.range().start).row,
        }
    }

    /// Tag name of the element.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Value of attribute `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text content exactly as written, `None` when the element has no text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[ConfigNode] {
        &self.children
    }

    /// 1-based line of the element's start tag in the source markup.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// First child with the given tag.
    pub fn find_child(&self, tag: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// First child, whatever its tag, whose attribute `key` equals `value`.
    pub fn find_child_by_attribute(&self, key: &str, value: &str) -> Option<&ConfigNode> {
        self.children
            .iter()
            .find(|c| c.attribute(key) == Some(value))
    }
}

/// The parsed robot description, or the absent document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    root: Option<ConfigNode>,
}

impl ConfigDocument {
    /// The absent document: every lookup falls back to defaults.
    pub fn empty() -> Self {
        Self { root: None }
    }

    /// Parse a robot description.
    ///
    /// Fails if the markup is not well formed or the root is not `<robot>`.
    pub fn parse(text: &str) -> Result<Self, SimbridgeError> {
        let doc = roxmltree::Document::parse(text)
            .map_err(|e| SimbridgeError::Description(format!("it cannot be parsed: {e}")))?;

        let root = doc.root_element();
        if !root.has_tag_name(ROBOT_TAG) {
            return Err(SimbridgeError::Description(format!(
                "it doesn't contain a <{ROBOT_TAG}> tag (found <{}>)",
                root.tag_name().name()
            )));
        }

        let root = ConfigNode::from_xml(root, &doc);
        debug!(
            elements = root.children().len(),
            has_webots = root.find_child(WEBOTS_TAG).is_some(),
            "parsed robot description"
        );
        Ok(Self { root: Some(root) })
    }

    /// Build the document from a possibly empty description parameter.
    ///
    /// Blank text yields the absent document.
    pub fn from_description(text: &str) -> Result<Self, SimbridgeError> {
        if text.trim().is_empty() {
            info!("robot description is not passed, using default parameters");
            return Ok(Self::empty());
        }
        Self::parse(text)
    }

    /// The `<robot>` element, if a description was supplied.
    pub fn root(&self) -> Option<&ConfigNode> {
        self.root.as_ref()
    }

    /// Returns true if no description was supplied.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The first `<webots>` child of the root.
    pub fn webots_section(&self) -> Option<&ConfigNode> {
        self.root.as_ref()?.find_child(WEBOTS_TAG)
    }
}
