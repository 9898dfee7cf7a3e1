//! Detected message language.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Es,
    En,
    Fr,
    Pt,
    It,
}

impl LanguageCode {
    pub fn name(&self) -> &'static str {
        match self {
            LanguageCode::Es => "Spanish",
            LanguageCode::En => "English",
            LanguageCode::Fr => "French",
            LanguageCode::Pt => "Portuguese",
            LanguageCode::It => "Italian",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub code: LanguageCode,
    pub name: String,
    pub confidence: f32,
}

impl Language {
    pub fn new(code: LanguageCode, confidence: f32) -> Self {
        Self { code, name: code.name().to_string(), confidence }
    }
}
