use std::fmt;
use std::str::FromStr;

use crate::errors::GenerationError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocaleKey {
    #[default]
    EnUs,
    PtBr,
}

impl LocaleKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en_US" => Some(Self::EnUs),
            "pt_BR" => Some(Self::PtBr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::PtBr => "pt_BR",
        }
    }
}

impl FromStr for LocaleKey {
    type Err = GenerationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| GenerationError::UnsupportedLocale(value.to_string()))
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
