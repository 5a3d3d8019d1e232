//! Display categories, derived from a feed's own title.

use crate::types::ConfigError;
use regex::Regex;

/// Tokens the NOS feeds put in every channel title.
pub const DEFAULT_BOILERPLATE: &[&str] = &["NOS.nl", "NOS", "nieuws"];

/// Upper-cases the first non-whitespace character of every
/// whitespace-delimited word. The rest of each word is left alone and the
/// whitespace itself is preserved.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[derive(Debug, Clone)]
pub struct CategoryRules {
    boilerplate: Option<Regex>,
}

impl CategoryRules {
    /// Builds rules that strip every token in `tokens`, case-insensitively.
    /// Longer tokens win over their own prefixes.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ConfigError> {
        let mut escaped: Vec<String> = tokens
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        if escaped.is_empty() {
            return Ok(Self { boilerplate: None });
        }

        escaped.sort_by(|a, b| b.len().cmp(&a.len()));
        let pattern = format!("(?i)(?:{})", escaped.join("|"));
        let boilerplate = Regex::new(&pattern).map_err(|e| ConfigError::invalid("category_boilerplate", e))?;

        Ok(Self {
            boilerplate: Some(boilerplate),
        })
    }

    /// Strips boilerplate, capitalizes each word and trims. An empty result
    /// means the feed has no usable category.
    pub fn derive(&self, feed_title: &str) -> String {
        let stripped = match &self.boilerplate {
            Some(pattern) => pattern.replace_all(feed_title, ""),
            None => feed_title.into(),
        };

        capitalize_words(&stripped).trim().to_string()
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(DEFAULT_BOILERPLATE).unwrap_or(Self { boilerplate: None })
    }
}
