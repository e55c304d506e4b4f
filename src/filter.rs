use std::fmt;

// ---------------------------------------------------------------------------
// Story search expressions
// ---------------------------------------------------------------------------

/// A Tracker story search expression, sent as the `filter` query parameter.
///
/// Terms are rendered in insertion order, separated by single spaces:
///
/// ```
/// use tracker_client::filter::StoryFilter;
///
/// let filter = StoryFilter::new().label("needs review").state("started");
/// assert_eq!(filter.to_string(), r#"label:"needs review" state:started"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Keyed(&'static str, String),
    Text(String),
}

impl StoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stories owned by, or requested by, `username`.
    pub fn my_work(username: &str) -> Self {
        Self::new().keyed("mywork", username)
    }

    pub fn label(self, name: &str) -> Self {
        self.keyed("label", name)
    }

    pub fn state(self, state: &str) -> Self {
        self.keyed("state", state)
    }

    pub fn story_type(self, story_type: &str) -> Self {
        self.keyed("type", story_type)
    }

    pub fn owner(self, username: &str) -> Self {
        self.keyed("owner", username)
    }

    /// Free text matched against story names and descriptions.
    pub fn text(mut self, text: &str) -> Self {
        if !text.trim().is_empty() {
            self.terms.push(Term::Text(text.trim().to_owned()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn keyed(mut self, key: &'static str, value: &str) -> Self {
        self.terms.push(Term::Keyed(key, value.to_owned()));
        self
    }
}

fn quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_owned()
    }
}

impl fmt::Display for StoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match term {
                Term::Keyed(key, value) => write!(f, "{key}:{}", quote(value))?,
                Term::Text(text) => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

impl From<StoryFilter> for String {
    fn from(filter: StoryFilter) -> Self {
        filter.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn my_work_renders_plain_term() {
        assert_eq!(StoryFilter::my_work("alice").to_string(), "mywork:alice");
    }

    #[test]
    fn my_work_keeps_empty_username() {
        assert_eq!(StoryFilter::my_work("").to_string(), "mywork:");
    }

    #[test]
    fn terms_join_in_order() {
        let filter = StoryFilter::new()
            .story_type("bug")
            .owner("bob")
            .text("login page");
        assert_eq!(filter.to_string(), "type:bug owner:bob login page");
    }

    #[test]
    fn values_with_spaces_are_quoted() {
        let filter = StoryFilter::new().label("needs review");
        assert_eq!(filter.to_string(), "label:\"needs review\"");
    }

    #[test]
    fn blank_text_is_ignored() {
        let filter = StoryFilter::new().text("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.to_string(), "");
    }
}
