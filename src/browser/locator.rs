//! Element references resolved against the live page at action time.

use std::fmt;

/// One way of matching elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    XPath(String),
    /// ARIA role with an accessible-name filter. When `exact` is false the
    /// name matches case-insensitively as a substring.
    Role { role: String, name: String, exact: bool },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub selector: Selector,
    pub nth: Option<usize>,
}

/// A chain of selectors, each scoped to the matches of the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    segments: Vec<Segment>,
}

impl Locator {
    pub fn new(selector: Selector) -> Self {
        Self {
            segments: vec![Segment { selector, nth: None }],
        }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new(Selector::Css(css.into()))
    }

    /// Accepts an optional Playwright-style `xpath=` prefix.
    pub fn xpath(xpath: impl Into<String>) -> Self {
        let xpath = xpath.into();
        let xpath = xpath.strip_prefix("xpath=").map(str::to_string).unwrap_or(xpath);
        Self::new(Selector::XPath(xpath))
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(Selector::Role {
            role: role.into(),
            name: name.into(),
            exact: false,
        })
    }

    pub fn role_exact(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(Selector::Role {
            role: role.into(),
            name: name.into(),
            exact: true,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::Text(text.into()))
    }

    /// Narrow to matches of `child` inside this locator's matches.
    pub fn locator(mut self, child: Locator) -> Self {
        self.segments.extend(child.segments);
        self
    }

    /// Keep only the `index`-th (0-based) match of the last segment.
    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.nth = Some(index);
        }
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "{}", css),
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath),
            Selector::Role { role, name, exact } => {
                write!(f, "role={}[name=\"{}\"{}]", role, name, if *exact { "" } else { "i" })
            }
            Selector::Text(text) => write!(f, "text=\"{}\"", text),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", segment.selector)?;
            if let Some(n) = segment.nth {
                write!(f, " >> nth={}", n)?;
            }
        }
        Ok(())
    }
}

/// Element condition a wait can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementState::Visible => "visible",
            ElementState::Hidden => "hidden",
            ElementState::Attached => "attached",
            ElementState::Detached => "detached",
        };
        f.write_str(s)
    }
}
