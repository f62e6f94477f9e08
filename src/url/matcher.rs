use regex::Regex;

/// Outcome of checking a URL against the follow and ignore patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternVerdict {
    /// No pattern excludes the URL
    Allowed,
    /// The ignore pattern matched
    Ignored,
    /// A follow pattern is set and did not match
    NotFollowed,
}

/// Checks a URL string against the optional ignore and follow patterns
///
/// The ignore pattern is checked first, so an ignore match wins even when the follow
/// pattern matches as well. An absent follow pattern follows everything.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use pdf_harvest::url::{match_patterns, PatternVerdict};
///
/// let follow = Regex::new(".*").unwrap();
/// let ignore = Regex::new("login").unwrap();
///
/// assert_eq!(
///     match_patterns("http://ex.com/login", Some(&follow), Some(&ignore)),
///     PatternVerdict::Ignored
/// );
/// assert_eq!(
///     match_patterns("http://ex.com/docs", Some(&follow), Some(&ignore)),
///     PatternVerdict::Allowed
/// );
/// ```
pub fn match_patterns(
    candidate: &str,
    follow: Option<&Regex>,
    ignore: Option<&Regex>,
) -> PatternVerdict {
    if ignore.is_some_and(|re| re.is_match(candidate)) {
        return PatternVerdict::Ignored;
    }

    if follow.is_some_and(|re| !re.is_match(candidate)) {
        return PatternVerdict::NotFollowed;
    }

    PatternVerdict::Allowed
}
