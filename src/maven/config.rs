//! Plugin configuration tree
//!
//! Maven plugin `<configuration>` blocks are free-form XML. They are normalized into a
//! tagged recursive value so detectors can query nested paths without caring whether a
//! node is missing, repeated, or carries attributes.
//!
//! Conversion rules:
//! - an element without element children becomes [`ConfigValue::Text`] (trimmed)
//! - an element with element children becomes [`ConfigValue::Map`]
//! - repeated sibling elements with the same name collapse into a [`ConfigValue::List`]
//! - XML attributes are stored in the map under `@<name>`; mixed text under `#text`

use roxmltree::Node;

const TEXT_KEY: &str = "#text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    List(Vec<ConfigValue>),
    Map(Vec<(String, ConfigValue)>),
}

impl ConfigValue {
    pub fn text(value: impl Into<String>) -> Self {
        ConfigValue::Text(value.into())
    }

    pub fn empty() -> Self {
        ConfigValue::Map(Vec::new())
    }

    /// Parses a standalone XML fragment such as `<configuration>...</configuration>`.
    pub fn from_xml_str(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(xml)?;
        Ok(Self::from_element(doc.root_element(), &|s: &str| s.to_string()))
    }

    /// Converts an element subtree, passing every text value through `resolve`.
    pub fn from_element(node: Node<'_, '_>, resolve: &dyn Fn(&str) -> String) -> Self {
        let mut entries: Vec<(String, ConfigValue)> = Vec::new();

        for attr in node.attributes() {
            entries.push((format!("@{}", attr.name()), ConfigValue::Text(resolve(attr.value()))));
        }

        let mut has_elements = false;
        for child in node.children().filter(|c| c.is_element()) {
            has_elements = true;
            let name = child.tag_name().name().to_string();
            let value = Self::from_element(child, resolve);
            push_entry(&mut entries, name, value);
        }

        let text: String = node
            .children()
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect::<String>()
            .trim()
            .to_string();

        if !has_elements && entries.is_empty() {
            return ConfigValue::Text(resolve(&text));
        }

        if !text.is_empty() {
            entries.push((TEXT_KEY.to_string(), ConfigValue::Text(resolve(&text))));
        }

        ConfigValue::Map(entries)
    }

    /// Direct lookup of a key, without descending into lists.
    pub fn entry(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Child lookup. A list answers with its first element's child, which gives
    /// "first declared" semantics to paths like `images/image/name`.
    pub fn child(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Map(_) => self.entry(key),
            ConfigValue::List(items) => items.first().and_then(|first| first.child(key)),
            ConfigValue::Text(_) => None,
        }
    }

    pub fn get(&self, path: &[&str]) -> Option<&ConfigValue> {
        path.iter().try_fold(self, |node, key| node.child(key))
    }

    /// Scalar value of this node, if any. Empty text counts as absent.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) if !s.is_empty() => Some(s.as_str()),
            ConfigValue::Text(_) => None,
            ConfigValue::List(items) => items.first().and_then(|v| v.as_text()),
            ConfigValue::Map(_) => self.entry(TEXT_KEY).and_then(|v| v.as_text()),
        }
    }

    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(|v| v.as_text())
    }

    /// Items of a repeated node: the list elements, or the node itself when it occurs once.
    pub fn items(&self) -> Vec<&ConfigValue> {
        match self {
            ConfigValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// All occurrences of the last path segment under the node reached by the others.
    pub fn all_at(&self, path: &[&str]) -> Vec<&ConfigValue> {
        let Some((last, parents)) = path.split_last() else {
            return vec![self];
        };
        self.get(parents)
            .and_then(|parent| parent.entry(last))
            .map(|v| v.items())
            .unwrap_or_default()
    }

    /// Text of every occurrence of a repeated leaf, in declaration order, duplicates kept.
    pub fn texts_at(&self, path: &[&str]) -> Vec<String> {
        self.all_at(path)
            .into_iter()
            .filter_map(|v| v.as_text())
            .map(str::to_string)
            .collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.entry(&format!("@{}", name)).and_then(|v| v.as_text())
    }

    /// Depth-first, pre-order search through the whole subtree (self included).
    pub fn find_descendant<F>(&self, predicate: F) -> Option<&ConfigValue>
    where
        F: Fn(&ConfigValue) -> bool,
    {
        find_in(self, &predicate)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConfigValue::Text(s) => s.is_empty(),
            ConfigValue::List(items) => items.is_empty(),
            ConfigValue::Map(entries) => entries.is_empty(),
        }
    }
}

fn find_in<'a>(node: &'a ConfigValue, predicate: &dyn Fn(&ConfigValue) -> bool) -> Option<&'a ConfigValue> {
    if predicate(node) {
        return Some(node);
    }
    match node {
        ConfigValue::Text(_) => None,
        ConfigValue::List(items) => items.iter().find_map(|item| find_in(item, predicate)),
        ConfigValue::Map(entries) => entries.iter().find_map(|(_, v)| find_in(v, predicate)),
    }
}

fn push_entry(entries: &mut Vec<(String, ConfigValue)>, name: String, value: ConfigValue) {
    match entries.iter_mut().find(|(k, _)| *k == name) {
        Some((_, ConfigValue::List(items))) => items.push(value),
        Some((_, existing)) => {
            let first = std::mem::replace(existing, ConfigValue::List(Vec::new()));
            *existing = ConfigValue::List(vec![first, value]);
        }
        None => entries.push((name, value)),
    }
}
