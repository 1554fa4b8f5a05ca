use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    Ar,
    #[default]
    En,
    De,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    pub const fn all() -> &'static [Locale] {
        &[Locale::Ar, Locale::En, Locale::De]
    }

    /// Locale from the usual POSIX variables, first non-empty wins.
    pub fn from_env() -> Self {
        let preference = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty());

        detect_locale(preference.as_deref())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a language preference such as `de-DE` or `ar_EG.UTF-8` to a
/// supported locale. Anything unrecognised falls back to English.
pub fn detect_locale(preference: Option<&str>) -> Locale {
    let lang = preference
        .unwrap_or("en")
        .split(['-', '_', '.'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    Locale::all()
        .iter()
        .copied()
        .find(|locale| locale.as_str() == lang)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_languages_are_detected() {
        assert_eq!(detect_locale(Some("de-DE")), Locale::De);
        assert_eq!(detect_locale(Some("ar_EG.UTF-8")), Locale::Ar);
        assert_eq!(detect_locale(Some("EN-us")), Locale::En);
        assert_eq!(detect_locale(Some("de")), Locale::De);
    }

    #[test]
    fn unsupported_or_missing_falls_back_to_english() {
        assert_eq!(detect_locale(Some("fr-FR")), Locale::En);
        assert_eq!(detect_locale(Some("C")), Locale::En);
        assert_eq!(detect_locale(Some("")), Locale::En);
        assert_eq!(detect_locale(None), Locale::En);
    }

    #[test]
    fn display_matches_tag() {
        for locale in Locale::all() {
            assert_eq!(locale.to_string(), locale.as_str());
        }
    }
}
