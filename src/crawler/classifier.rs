//! PDF-or-page classification of discovered links
//!
//! The policy is an ordered list of rules evaluated first-match-wins, with a fallback
//! label when no rule matches. The default policy is:
//!
//! | Order | Rule | Label |
//! |-------|------|-------|
//! | 1 | URL path ends in `.pdf` (any case) | PDF |
//! | 2 | Content-type hint is `application/pdf` | PDF |
//! | 3 | Link text contains "pdf" (any case) | PDF |
//! | - | Anything else | Page |
//!
//! Classification never touches the network; a content-type hint is only used when
//! the caller already has one.

use std::fmt;
use url::Url;

/// The label a link receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A PDF to collect for download
    Pdf,
    /// A page to traverse further
    Page,
}

/// A link found on a page, after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute URL of the link target
    pub url: Url,

    /// Visible anchor text
    pub text: String,

    /// Advertised MIME type, if known without fetching the target
    pub content_type_hint: Option<String>,
}

impl DiscoveredLink {
    pub fn new(url: Url, text: impl Into<String>) -> Self {
        Self {
            url,
            text: text.into(),
            content_type_hint: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type_hint = Some(content_type.into());
        self
    }
}

type Predicate = Box<dyn Fn(&DiscoveredLink) -> bool + Send + Sync>;

/// One `(predicate, label)` pair of the policy
pub struct Rule {
    name: &'static str,
    predicate: Predicate,
    kind: LinkKind,
}

impl Rule {
    pub fn new<P>(name: &'static str, kind: LinkKind, predicate: P) -> Self
    where
        P: Fn(&DiscoveredLink) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            kind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    fn matches(&self, link: &DiscoveredLink) -> bool {
        (self.predicate)(link)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered, first-match-wins link classifier
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<Rule>,
    fallback: LinkKind,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::empty(LinkKind::Page)
            .with_rule(Rule::new("pdf-extension", LinkKind::Pdf, path_has_pdf_extension))
            .with_rule(Rule::new("pdf-content-type", LinkKind::Pdf, |link| {
                link.content_type_hint
                    .as_deref()
                    .is_some_and(is_pdf_content_type)
            }))
            .with_rule(Rule::new("pdf-link-text", LinkKind::Pdf, |link| {
                link.text.to_lowercase().contains("pdf")
            }))
    }
}

impl Classifier {
    /// A classifier with no rules that labels everything `fallback`
    pub fn empty(fallback: LinkKind) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Appends a rule; it is evaluated after every rule already present
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Labels a link
    pub fn classify(&self, link: &DiscoveredLink) -> LinkKind {
        self.explain(link).0
    }

    /// Labels a link and names the rule that decided it (`None` means the fallback)
    pub fn explain(&self, link: &DiscoveredLink) -> (LinkKind, Option<&'static str>) {
        self.rules
            .iter()
            .find(|rule| rule.matches(link))
            .map(|rule| (rule.kind, Some(rule.name)))
            .unwrap_or((self.fallback, None))
    }
}

/// True for `application/pdf`, ignoring case and any parameters
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false)
}

fn path_has_pdf_extension(link: &DiscoveredLink) -> bool {
    link.url.path().to_ascii_lowercase().ends_with(".pdf")
}
