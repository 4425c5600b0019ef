//! Built-in language sets.

use std::fmt;

use crate::models::Language;

/// A named set of languages that can be registered in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Türkiye and its neighbours, plus Kurdish and Persian.
    Neighbors,
    Europe,
}

const NEIGHBORS: &[(&str, &str, &str, bool)] = &[
    ("tr", "Turkish", "tr_TR", false),
    ("en", "English", "en_US", false),
    ("el", "Greek", "el_GR", false),
    ("bg", "Bulgarian", "bg_BG", false),
    ("ro", "Romanian", "ro_RO", false),
    ("ka", "Georgian", "ka_GE", false),
    ("hy", "Armenian", "hy_AM", false),
    ("az", "Azerbaijani", "az_AZ", false),
    ("ar", "Arabic", "ar", true),
    ("fa", "Persian", "fa_IR", true),
    ("ku", "Kurdish", "ku", false),
    ("ru", "Russian", "ru_RU", false),
];

const EUROPE: &[(&str, &str, &str, bool)] = &[
    ("de", "German", "de_DE", false),
    ("fr", "French", "fr_FR", false),
    ("it", "Italian", "it_IT", false),
    ("es", "Spanish", "es_ES", false),
    ("pt", "Portuguese", "pt_PT", false),
    ("nl", "Dutch", "nl_NL", false),
    ("sv", "Swedish", "sv_SE", false),
    ("no", "Norwegian", "nb_NO", false),
    ("da", "Danish", "da_DK", false),
    ("fi", "Finnish", "fi_FI", false),
    ("pl", "Polish", "pl_PL", false),
    ("cs", "Czech", "cs_CZ", false),
    ("sk", "Slovak", "sk_SK", false),
    ("hu", "Hungarian", "hu_HU", false),
    ("sl", "Slovenian", "sl_SI", false),
    ("hr", "Croatian", "hr_HR", false),
    ("sr", "Serbian", "sr_RS", false),
    ("bs", "Bosnian", "bs_BA", false),
    ("sq", "Albanian", "sq_AL", false),
    ("mk", "Macedonian", "mk_MK", false),
    ("uk", "Ukrainian", "uk", false),
    ("lt", "Lithuanian", "lt_LT", false),
    ("lv", "Latvian", "lv_LV", false),
    ("et", "Estonian", "et", false),
    ("is", "Icelandic", "is_IS", false),
];

impl Preset {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "neighbors" => Some(Preset::Neighbors),
            "europe" => Some(Preset::Europe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Neighbors => "neighbors",
            Preset::Europe => "europe",
        }
    }

    pub fn languages(&self) -> Vec<Language> {
        let table = match self {
            Preset::Neighbors => NEIGHBORS,
            Preset::Europe => EUROPE,
        };

        table
            .iter()
            .filter_map(|(slug, name, locale, rtl)| {
                let language = Language::new(slug, name, locale)?;
                Some(if *rtl { language.rtl() } else { language })
            })
            .collect()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_fully_valid() {
        assert_eq!(Preset::Neighbors.languages().len(), NEIGHBORS.len());
        assert_eq!(Preset::Europe.languages().len(), EUROPE.len());
    }

    #[test]
    fn test_neighbors_marks_rtl_scripts() {
        let rtl: Vec<String> = Preset::Neighbors
            .languages()
            .into_iter()
            .filter(|l| l.rtl)
            .map(|l| l.slug)
            .collect();
        assert_eq!(rtl, vec!["ar", "fa"]);
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!(Preset::parse("Europe"), Some(Preset::Europe));
        assert_eq!(Preset::parse("asia"), None);
    }
}
