//! Locale selection for field reads.

use tracing::warn;

/// The locales a space offers, with the one used when nothing else is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locales {
    default: String,
    available: Vec<String>,
}

impl Locales {
    /// Locales with only a default.
    pub fn new(default: impl Into<String>) -> Self {
        let default = default.into();
        Self {
            available: vec![default.clone()],
            default,
        }
    }

    /// Add further available locales.
    pub fn with_available<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for locale in locales {
            let locale = locale.into();
            if !self.available.contains(&locale) {
                self.available.push(locale);
            }
        }
        self
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// The locale key to read fields with.
    ///
    /// A requested locale the space does not offer falls back to the default.
    pub fn select<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            None => &self.default,
            Some(locale) if self.available.iter().any(|l| l == locale) => locale,
            Some(locale) => {
                warn!(
                    requested = locale,
                    default = %self.default,
                    "unknown locale requested, using default"
                );
                &self.default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn no_request_uses_default() {
        let locales = Locales::new("en-US");
        assert_eq!(locales.select(None), "en-US");
    }

    #[test]
    fn available_request_is_honored() {
        let locales = Locales::new("en-US").with_available(["de-DE", "fr-FR"]);
        assert_eq!(locales.select(Some("de-DE")), "de-DE");
        assert_eq!(locales.available().len(), 3);
    }

    #[test]
    #[traced_test]
    fn unknown_request_falls_back_and_warns() {
        let locales = Locales::new("en-US");
        assert_eq!(locales.select(Some("xx")), "en-US");
        assert!(logs_contain("unknown locale requested"));
    }

    #[test]
    fn duplicates_are_not_added() {
        let locales = Locales::new("en").with_available(["en", "de", "de"]);
        assert_eq!(locales.available(), ["en".to_string(), "de".to_string()]);
        assert_eq!(locales.default_locale(), "en");
    }
}
