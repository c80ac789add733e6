//! Element nodes.

use std::borrow::Cow;

use crate::{Attributes, ensure_sufficient_stack};

/// A markup element: name, attributes, text content and ordered children.
///
/// A freshly parsed element borrows its name and attribute keys from the
/// source buffer. Text stays borrowed while it is a single fragment and
/// becomes owned once a second fragment is joined on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element<'src> {
    /// Element name. Empty only if the name was missing in the source.
    pub name: Cow<'src, [u8]>,
    /// Attributes, unique by key.
    pub attributes: Attributes<'src>,
    /// Child elements in document order.
    pub children: Vec<Element<'src>>,
    /// Text content. Fragments are joined with a single space.
    pub text: Cow<'src, [u8]>,
}

impl<'src> Element<'src> {
    /// Create an element with no attributes, children or text.
    pub fn new(name: impl Into<Cow<'src, [u8]>>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            text: Cow::Borrowed(&[]),
        }
    }

    /// The element name as raw bytes.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// The element name, lossily decoded as UTF-8.
    pub fn name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// The text content as raw bytes.
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// The text content, lossily decoded as UTF-8.
    pub fn text_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Whether the element has neither children nor text.
    ///
    /// Such elements are written in self-closing form.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.is_empty()
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &[u8]) -> Option<&[u8]> {
        self.attributes.get(key)
    }

    /// Set an attribute, returning the value it replaced.
    pub fn set_attribute(
        &mut self,
        key: impl Into<Cow<'src, [u8]>>,
        value: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        self.attributes.insert(key, value.into())
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: Element<'src>) {
        self.children.push(child);
    }

    /// Append a text fragment, separated from existing text by one space.
    pub fn append_text(&mut self, fragment: &'src [u8]) {
        if self.text.is_empty() {
            self.text = Cow::Borrowed(fragment);
            return;
        }
        let text = self.text.to_mut();
        text.reserve(fragment.len() + 1);
        text.push(b' ');
        text.extend_from_slice(fragment);
    }

    /// Number of bytes the text would hold after [`Element::append_text`].
    pub fn text_len_after_append(&self, fragment: &[u8]) -> usize {
        if self.text.is_empty() {
            fragment.len()
        } else {
            self.text.len() + 1 + fragment.len()
        }
    }

    /// Get a child by index.
    pub fn child(&self, index: usize) -> Option<&Element<'src>> {
        self.children.get(index)
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The first direct child with the given name.
    pub fn find_child(&self, name: &[u8]) -> Option<&Element<'src>> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// This element and everything below it, depth-first, parents first.
    pub fn descendants(&self) -> Descendants<'_, 'src> {
        Descendants { stack: vec![self] }
    }

    /// Detach the tree from the source buffer by copying borrowed bytes.
    pub fn into_owned(mut self) -> Element<'static> {
        let children = std::mem::take(&mut self.children);
        Element {
            name: Cow::Owned(std::mem::take(&mut self.name).into_owned()),
            attributes: std::mem::take(&mut self.attributes).into_owned(),
            children: children
                .into_iter()
                .map(|child| ensure_sufficient_stack(|| child.into_owned()))
                .collect(),
            text: Cow::Owned(std::mem::take(&mut self.text).into_owned()),
        }
    }
}

impl Drop for Element<'_> {
    fn drop(&mut self) {
        // Flatten the subtree so dropping never recurses per nesting level.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Pre-order iterator returned by [`Element::descendants`].
pub struct Descendants<'a, 'src> {
    stack: Vec<&'a Element<'src>>,
}

impl<'a, 'src> Iterator for Descendants<'a, 'src> {
    type Item = &'a Element<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}
