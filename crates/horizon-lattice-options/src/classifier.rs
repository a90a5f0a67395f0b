//! Option identity.

/// The immutable identity shared by every option kind.
///
/// `(section, name)` is the external identity used by registries and
/// persistence. The sort tag orders options within a section when they are
/// presented, and the doc string is the tooltip text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionClassifier {
    section: String,
    name: String,
    sort_tag: String,
    doc_string: String,
}

impl OptionClassifier {
    /// Create a classifier.
    pub fn new(
        section: impl Into<String>,
        name: impl Into<String>,
        sort_tag: impl Into<String>,
        doc_string: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            name: name.into(),
            sort_tag: sort_tag.into(),
            doc_string: doc_string.into(),
        }
    }

    /// The section (page) the option belongs to.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// The option name, unique within its section.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sort key within the section.
    pub fn sort_tag(&self) -> &str {
        &self.sort_tag
    }

    /// The documentation string.
    pub fn doc_string(&self) -> &str {
        &self.doc_string
    }
}
