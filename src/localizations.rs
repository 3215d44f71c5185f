use std::collections::HashMap;

use i18n_embed::DesktopLanguageRequester;
use unic_langid::{langid, LanguageIdentifier};

const FALLBACK_LANG: &str = "en-US";

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

pub struct Localizations {
    translations: HashMap<&'static str, Translations>,
    current_lang: &'static str,
}

impl Default for Localizations {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizations {
    pub fn new() -> Self {
        let mut localizer = Self::with_language(&langid!("en-US"));
        let requested = DesktopLanguageRequester::requested_languages();
        if let Some(lang) = requested.first() {
            localizer.select(lang);
        }
        log::debug!("shell language: {}", localizer.current_language());
        localizer
    }

    pub fn with_language(lang: &LanguageIdentifier) -> Self {
        let mut translations = HashMap::new();

        let mut en = Translations::new();
        en.insert("app-title", "YouTube Video Downloader");
        en.insert("version-label", "Version");
        en.insert("project-link", "Project page");
        en.insert("latest-release-link", "Latest release");
        en.insert("open-failed", "Could not open the page");
        en.insert("status-ready", "Ready");
        translations.insert("en-US", en);

        let mut es = Translations::new();
        es.insert("app-title", "Descargador de videos de YouTube");
        es.insert("version-label", "Versión");
        es.insert("project-link", "Página del proyecto");
        es.insert("latest-release-link", "Última versión");
        es.insert("open-failed", "No se pudo abrir la página");
        es.insert("status-ready", "Listo");
        translations.insert("es-ES", es);

        let mut localizer = Self {
            translations,
            current_lang: FALLBACK_LANG,
        };
        localizer.select(lang);
        localizer
    }

    pub fn current_language(&self) -> &'static str {
        self.current_lang
    }

    /// Looks `key` up in the current language, then in English.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.translations
            .get(self.current_lang)
            .and_then(|t| t.lookup(key))
            .or_else(|| self.translations.get(FALLBACK_LANG).and_then(|t| t.lookup(key)))
            .map(str::to_string)
    }

    pub fn text(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }

    pub fn select(&mut self, lang: &LanguageIdentifier) {
        let requested = lang.to_string();
        let language = lang.language.as_str();

        self.current_lang = self
            .translations
            .keys()
            .copied()
            .find(|key| *key == requested)
            .or_else(|| {
                self.translations
                    .keys()
                    .copied()
                    .find(|key| key.split('-').next() == Some(language))
            })
            .unwrap_or(FALLBACK_LANG);
    }
}
