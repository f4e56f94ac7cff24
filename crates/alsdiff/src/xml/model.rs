//! XML data model

use indexmap::IndexMap;

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// XML element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Content::Text(text.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    /// Raw text preceding the first child element, if any
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Content::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Direct child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|content| match content {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    /// Resolve a path like `Name/EffectiveName/@Value`.
    ///
    /// Every step before the final `@attribute` selects child elements by
    /// name; the first match in document order wins, backtracking into
    /// later siblings when an earlier branch does not lead to the attribute.
    /// A path without an `@` step resolves nothing.
    pub fn find_attribute(&self, path: &str) -> Option<&str> {
        let (steps, attribute) = path.rsplit_once('@')?;
        let steps: Vec<&str> = steps.split('/').filter(|step| !step.is_empty()).collect();
        self.lookup(&steps, attribute)
    }

    fn lookup(&self, steps: &[&str], attribute: &str) -> Option<&str> {
        match steps.split_first() {
            None => self.attributes.get(attribute).map(String::as_str),
            Some((step, rest)) => self
                .child_elements()
                .filter(|child| child.name == *step)
                .find_map(|child| child.lookup(rest, attribute)),
        }
    }
}
