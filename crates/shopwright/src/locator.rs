//! Locator descriptors for storefront elements.
//!
//! A [`Locator`] pairs a logical role ("cart total", "login button") with a
//! [`Selector`]. Locators hold no live element; sessions resolve them on every
//! access, so a page re-render never leaves a stale handle behind.

use serde::{Deserialize, Serialize};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "#tbodyid .success")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Element id without the leading `#`
    Id(String),
    /// Anchor whose trimmed text equals the value
    LinkText(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text the element must contain
        text: String,
    },
}

/// Quote a string as a JavaScript literal
#[must_use]
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a link-text selector
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// JavaScript expression evaluating to an array of every match, in
    /// document order
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({}))", js_string(s)),
            Self::XPath(s) => format!(
                "(() => {{ const r = document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()",
                js_string(s)
            ),
            Self::Id(id) => format!(
                "[document.getElementById({})].filter(Boolean)",
                js_string(id)
            ),
            Self::LinkText(t) => format!(
                "Array.from(document.querySelectorAll('a')).filter(el => el.textContent.trim() === {})",
                js_string(t)
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => el.textContent.includes({}))",
                js_string(css),
                js_string(text)
            ),
        }
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query_all())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Id(s) => write!(f, "id={s}"),
            Self::LinkText(s) => write!(f, "link={s}"),
            Self::CssWithText { css, text } => write!(f, "css={css} >> text={text}"),
        }
    }
}

/// A selector tagged with the UI role it plays
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    role: String,
    selector: Selector,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(role: impl Into<String>, selector: Selector) -> Self {
        Self {
            role: role.into(),
            selector,
        }
    }

    /// Locator for a CSS selector
    #[must_use]
    pub fn css(role: impl Into<String>, css: impl Into<String>) -> Self {
        Self::new(role, Selector::css(css))
    }

    /// Locator for an element id
    #[must_use]
    pub fn id(role: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(role, Selector::id(id))
    }

    /// Locator for an XPath expression
    #[must_use]
    pub fn xpath(role: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(role, Selector::xpath(expr))
    }

    /// Locator for a link by its text
    #[must_use]
    pub fn link_text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(role, Selector::link_text(text))
    }

    /// Narrow a CSS locator to elements containing `text`.
    ///
    /// Non-CSS selectors are returned unchanged.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self {
            role: self.role,
            selector,
        }
    }

    /// Logical role
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Underlying selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.role, self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let q = Selector::css("#tbodyid .success").to_query_all();
            assert_eq!(q, r##"Array.from(document.querySelectorAll("#tbodyid .success"))"##);
        }

        #[test]
        fn test_id_query() {
            let q = Selector::id("totalp").to_query_all();
            assert!(q.contains(r#"getElementById("totalp")"#));
        }

        #[test]
        fn test_xpath_query_collects_snapshot() {
            let q = Selector::xpath("//a[text()='Delete']").to_query_all();
            assert!(q.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
            assert!(q.contains(r#""//a[text()='Delete']""#));
        }

        #[test]
        fn test_link_text_matches_trimmed_text() {
            let q = Selector::link_text("Phones").to_query_all();
            assert!(q.contains(r#"el.textContent.trim() === "Phones""#));
        }

        #[test]
        fn test_quotes_are_escaped() {
            let q = Selector::css_with_text(".card-title a", "O\"Brien").to_query_all();
            assert!(q.contains(r#"includes("O\"Brien")"#));
        }

        #[test]
        fn test_count_query() {
            assert!(Selector::css(".card").to_count_query().ends_with(".length"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::id("cartur").to_string(), "id=cartur");
            assert_eq!(
                Selector::css_with_text("a", "Nexus").to_string(),
                "css=a >> text=Nexus"
            );
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_role_and_selector() {
            let l = Locator::id("cart total", "totalp");
            assert_eq!(l.role(), "cart total");
            assert_eq!(l.selector(), &Selector::id("totalp"));
            assert_eq!(l.to_string(), "cart total (id=totalp)");
        }

        #[test]
        fn test_with_text_on_css() {
            let l = Locator::css("product link", ".card-title a").with_text("Nexus 6");
            assert_eq!(l.selector(), &Selector::css_with_text(".card-title a", "Nexus 6"));
        }

        #[test]
        fn test_with_text_keeps_other_selectors() {
            let l = Locator::id("cart link", "cartur").with_text("ignored");
            assert_eq!(l.selector(), &Selector::id("cartur"));
        }
    }
}
