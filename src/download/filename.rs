use crate::crawler::is_pdf_content_type;
use std::collections::HashSet;
use url::Url;

/// Characters that are not allowed in file names on common filesystems
const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Derives a local file name for a downloaded URL
///
/// # Naming Rules
///
/// 1. Take the last path segment of the URL and percent-decode it
/// 2. Replace forbidden and control characters with `_`, trim dots and spaces
/// 3. If nothing is left, use `document_<unix-timestamp>.pdf`
/// 4. If the server says the body is a PDF and the name lacks `.pdf`, append it
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_harvest::download::derive_file_name;
///
/// let url = Url::parse("http://ex.com/docs/Annual%20Report.pdf").unwrap();
/// assert_eq!(derive_file_name(&url, None), "Annual Report.pdf");
///
/// let url = Url::parse("http://ex.com/download/42").unwrap();
/// assert_eq!(derive_file_name(&url, Some("application/pdf")), "42.pdf");
/// ```
pub fn derive_file_name(url: &Url, content_type: Option<&str>) -> String {
    let mut name = last_segment(url)
        .map(|segment| sanitize(&segment))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(fallback_name);

    if content_type.is_some_and(is_pdf_content_type) && !name.to_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }

    name
}

fn last_segment(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}

fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    replaced
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

fn fallback_name() -> String {
    format!("document_{}.pdf", chrono::Utc::now().timestamp())
}

/// Hands out unique file names within one download run
///
/// Names are compared case-insensitively; a taken name gets `-1`, `-2`, ...
/// inserted before its extension.
#[derive(Debug, Default)]
pub struct FileNamer {
    taken: HashSet<String>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `name` or the first free disambiguated variant, and marks it taken
    pub fn reserve(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let (stem, extension) = split_extension(name);
        let mut counter = 1;
        loop {
            let candidate = format!("{}-{}{}", stem, counter, extension);
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Frees a name whose file was never written
    pub fn release(&mut self, name: &str) {
        self.taken.remove(&name.to_lowercase());
    }
}

/// Splits `report.pdf` into `("report", ".pdf")`; names without a dot keep an empty extension
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}
