//! Movie record as stored on disk.
//!
//! Records are written by other tools too (catalog scraper, review and SEO
//! generators), so only the fields this crate reads are typed. Everything
//! else rides along in `extra` and is written back untouched.

use serde::de::value::StringDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// How an enriched plot was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotSource {
    /// Extracted text stored as-is.
    #[serde(rename = "web_scraped")]
    RawFetched,

    /// Extracted text rewritten by the generation service.
    #[serde(
        rename = "web_scraped_ai_cleaned",
        alias = "web_scraped_bedrock_cleaned"
    )]
    GenerationCleaned,
}

impl PlotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawFetched => "web_scraped",
            Self::GenerationCleaned => "web_scraped_ai_cleaned",
        }
    }
}

impl fmt::Display for PlotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release year. The catalog scraper writes strings, older records numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Year {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Year {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// One movie, one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<String>,

    /// Short plot from the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,

    /// Enriched long-form plot.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub web_plot: Option<String>,

    /// Extracted text the enriched plot was generated from.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_web_plot: Option<String>,

    #[serde(
        default,
        deserialize_with = "empty_source_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub plot_source: Option<PlotSource>,

    /// `%Y-%m-%d` date of the last change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Fields owned by other tools.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieRecord {
    /// Create a record with a title and year.
    pub fn new(title: impl Into<String>, year: impl Into<Year>) -> Self {
        Self {
            title: Some(title.into()),
            year: Some(year.into()),
            ..Default::default()
        }
    }

    /// Set the short plot.
    pub fn with_plot(mut self, plot: impl Into<String>) -> Self {
        self.plot = Some(plot.into());
        self
    }

    /// Set an enriched plot and its provenance.
    pub fn with_web_plot(mut self, web_plot: impl Into<String>, source: PlotSource) -> Self {
        self.web_plot = Some(web_plot.into());
        self.plot_source = Some(source);
        self
    }

    /// Title with surrounding whitespace removed, if non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Year as text; empty when unknown.
    pub fn year_text(&self) -> String {
        self.year.as_ref().map(|y| y.to_string()).unwrap_or_default()
    }

    pub fn base_plot(&self) -> &str {
        self.plot.as_deref().unwrap_or("")
    }

    pub fn has_enrichment(&self) -> bool {
        self.web_plot.is_some() || self.raw_web_plot.is_some() || self.plot_source.is_some()
    }

    /// Drop the enriched plot and its provenance.
    pub fn clear_web_plot(&mut self) {
        self.web_plot = None;
        self.plot_source = None;
    }

    /// Drop every enrichment field, including the raw source text.
    pub fn clear_enrichment(&mut self) {
        self.clear_web_plot();
        self.raw_web_plot = None;
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn empty_source_as_none<'de, D>(deserializer: D) -> Result<Option<PlotSource>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => {
            let de: StringDeserializer<D::Error> = s.into_deserializer();
            PlotSource::deserialize(de).map(Some)
        }
    }
}
