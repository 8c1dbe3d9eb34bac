//! Plot passage extraction from fetched HTML.
//!
//! Two strategies, picked by source host:
//! - encyclopedia articles: the paragraphs under the first heading that
//!   names a plot, synopsis or story section
//! - everything else: the long, boilerplate-free paragraphs near the top
//!   of the page
//!
//! Whatever comes out is run through the [`ContentValidator`] before it is
//! handed back as a [`CandidatePassage`].

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::config::EnricherConfig;
use crate::security::host_matches;
use crate::types::CandidatePassage;
use crate::validation::ContentValidator;

/// Hosts extracted with the section-heading strategy.
pub const STRUCTURED_ARTICLE_HOSTS: &[&str] = &["wikipedia.org"];

/// High-trust hosts that get the relaxed length floor.
pub const PREFERRED_HOSTS: &[&str] = &["wikipedia.org", "britannica.com", "imdb.com"];

/// Heading words that open a plot section.
const PLOT_HEADING_WORDS: &[&str] = &["plot", "synopsis", "story"];

/// Paragraphs containing any of these are dropped by the generic strategy.
const BOILERPLATE_WORDS: &[&str] = &[
    "cookie",
    "privacy",
    "consent",
    "advertisement",
    "subscribe",
    "newsletter",
];

static SECTION_HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3").unwrap());

static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

static RE_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?:\d+|[a-z][a-z ]*)\]").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Returns true when the URL's host is on the preferred allowlist.
pub fn is_preferred_source(url: &str) -> bool {
    host_of(url)
        .map(|host| PREFERRED_HOSTS.iter().any(|d| host_matches(&host, d)))
        .unwrap_or(false)
}

fn is_structured_article(url: &str) -> bool {
    host_of(url)
        .map(|host| STRUCTURED_ARTICLE_HOSTS.iter().any(|d| host_matches(&host, d)))
        .unwrap_or(false)
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

/// Extracts candidate plot passages from HTML documents.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    validator: ContentValidator,
    paragraph_scan_limit: usize,
    paragraph_min_chars: usize,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new(&EnricherConfig::default())
    }
}

impl PageExtractor {
    pub fn new(config: &EnricherConfig) -> Self {
        Self {
            validator: ContentValidator::new(config.thresholds),
            paragraph_scan_limit: config.paragraph_scan_limit,
            paragraph_min_chars: config.paragraph_min_chars,
        }
    }

    /// Extract and validate a plot passage.
    ///
    /// Returns `None` when nothing was found or the text failed validation.
    pub fn extract(&self, html: &str, source_url: &str) -> Option<CandidatePassage> {
        let document = Html::parse_document(html);

        let text = if is_structured_article(source_url) {
            extract_plot_section(&document)
        } else {
            self.extract_paragraphs(&document)
        };

        if text.is_empty() {
            debug!(url = %source_url, "No plot text found on page");
            return None;
        }

        let preferred = is_preferred_source(source_url);
        let verdict = self.validator.validate(&text, preferred);
        if let Some(reason) = verdict.reason() {
            debug!(
                url = %source_url,
                reason = %reason,
                chars = text.chars().count(),
                "Extracted content failed validation"
            );
            return None;
        }

        Some(CandidatePassage::new(text, source_url, preferred))
    }

    /// Generic strategy: long, boilerplate-free paragraphs near the top.
    fn extract_paragraphs(&self, document: &Html) -> String {
        let kept: Vec<String> = document
            .select(&PARAGRAPHS)
            .take(self.paragraph_scan_limit)
            .map(|p| element_text(&p))
            .filter(|text| text.chars().count() > self.paragraph_min_chars)
            .filter(|text| {
                let lower = text.to_lowercase();
                !BOILERPLATE_WORDS.iter().any(|w| lower.contains(w))
            })
            .collect();

        kept.join(" ")
    }
}

/// Structured strategy: paragraphs under the first plot-like heading.
fn extract_plot_section(document: &Html) -> String {
    let Some(heading) = document.select(&SECTION_HEADINGS).find(|h| {
        let text = element_text(h).to_lowercase();
        PLOT_HEADING_WORDS.iter().any(|w| text.contains(w))
    }) else {
        return String::new();
    };

    let level = heading_level(&heading).unwrap_or(2);

    // Newer article markup wraps each heading in `div.mw-heading`, and the
    // section paragraphs are siblings of the wrapper rather than the heading.
    let anchor = heading
        .parent()
        .and_then(ElementRef::wrap)
        .filter(is_heading_wrapper)
        .unwrap_or(heading);

    let mut paragraphs = Vec::new();
    for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
        if section_level(&sibling).is_some_and(|l| l <= level) {
            break;
        }
        if sibling.value().name() == "p" {
            let text = element_text(&sibling);
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }

    let joined = paragraphs.join(" ");
    let stripped = RE_CITATION.replace_all(&joined, "");
    collapse_whitespace(&stripped)
}

fn is_heading_wrapper(element: &ElementRef) -> bool {
    element.value().name() == "div" && element.value().classes().any(|c| c == "mw-heading")
}

/// Level of an `h1`..`h6` element.
fn heading_level(element: &ElementRef) -> Option<u8> {
    let name = element.value().name();
    let digit = name.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(n @ 1..=6) => Some(n),
        _ => None,
    }
}

/// Level of a section boundary: a bare heading or a heading wrapper.
fn section_level(element: &ElementRef) -> Option<u8> {
    if let Some(level) = heading_level(element) {
        return Some(level);
    }
    if !is_heading_wrapper(element) {
        return None;
    }
    element
        .value()
        .classes()
        .find_map(|c| c.strip_prefix("mw-heading").and_then(|n| n.parse().ok()))
        .or_else(|| {
            element
                .children()
                .filter_map(ElementRef::wrap)
                .find_map(|child| heading_level(&child))
        })
}

fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NARRATIVE: &str = "The film opens in a quiet mountain village where a retired officer \
        recruits two small-time thieves to capture a ruthless bandit. Over the course of the story \
        the pair grow loyal to the officer and to the villagers they were hired to protect. A \
        romance blossoms between one thief and a spirited cart driver, while the other befriends \
        a widow living in the officer's house. The final confrontation at the quarry tests every \
        character.";

    fn wiki_page(body: &str) -> String {
        format!("<html><head><title>Film</title></head><body><div id=\"content\">{body}</div></body></html>")
    }

    #[test]
    fn test_preferred_sources() {
        assert!(is_preferred_source("https://en.wikipedia.org/wiki/Sholay"));
        assert!(is_preferred_source("https://www.britannica.com/topic/Sholay"));
        assert!(!is_preferred_source("https://www.filmcompanion.in/sholay"));
        assert!(!is_preferred_source("not a url"));
    }

    #[test]
    fn test_structured_plot_section() {
        let html = wiki_page(&format!(
            "<h2>Production</h2><p>Filming took place in Ramanagara over two years of shooting.</p>\
             <h2>Plot</h2><p>{NARRATIVE}</p><h3>Ending</h3><p>Second part of the plot.</p>\
             <h2>Cast</h2><p>Not part of the plot section at all, this belongs to the cast list.</p>"
        ));

        let passage = PageExtractor::default()
            .extract(&html, "https://en.wikipedia.org/wiki/Test_Film")
            .unwrap();

        assert!(passage.preferred);
        assert!(passage.text.starts_with("The film opens"));
        assert!(passage.text.ends_with("Second part of the plot."));
        assert!(!passage.text.contains("Filming took place"));
        assert!(!passage.text.contains("cast list"));
    }

    #[test]
    fn test_structured_heading_wrapper_and_citations() {
        let html = wiki_page(&format!(
            "<div class=\"mw-heading mw-heading2\"><h2 id=\"Plot\">Plot</h2></div>\
             <p>{NARRATIVE}[1]</p><p>The officer survives.[citation needed]</p>\
             <div class=\"mw-heading mw-heading2\"><h2 id=\"Cast\">Cast</h2></div>\
             <p>Dharmendra as Veeru, a thief with a fondness for the cast of the film.</p>"
        ));

        let passage = PageExtractor::default()
            .extract(&html, "https://en.wikipedia.org/wiki/Test_Film")
            .unwrap();

        assert!(!passage.text.contains("[1]"));
        assert!(!passage.text.contains("[citation needed]"));
        assert!(passage.text.ends_with("The officer survives."));
        assert!(!passage.text.contains("Veeru"));
    }

    #[test]
    fn test_structured_without_plot_heading() {
        let html = wiki_page(&format!("<h2>Reception</h2><p>{NARRATIVE}</p>"));
        assert!(PageExtractor::default()
            .extract(&html, "https://en.wikipedia.org/wiki/Test_Film")
            .is_none());
    }

    #[test]
    fn test_generic_paragraphs_filter_boilerplate() {
        let html = format!(
            "<html><body><p>Short.</p>\
             <p>We value your privacy and use tracking technology on this website to serve you.</p>\
             <p>{NARRATIVE}</p></body></html>"
        );

        let passage = PageExtractor::default()
            .extract(&html, "https://www.filmreviews.example/test-film")
            .unwrap();

        assert!(!passage.preferred);
        assert_eq!(passage.text, collapse_whitespace(NARRATIVE));
    }

    #[test]
    fn test_generic_scan_limit() {
        let filler = "<p>x</p>".repeat(15);
        let html = format!("<html><body>{filler}<p>{NARRATIVE}</p></body></html>");
        assert!(PageExtractor::default()
            .extract(&html, "https://www.filmreviews.example/test-film")
            .is_none());
    }

    #[test]
    fn test_cookie_banner_page_rejected() {
        let html = "<html><body><p>We use cookies to personalise content and ads. By clicking \
                    accept you agree to our cookie policy and terms of service.</p>\
                    <p>Manage consent preferences for this movie site at any time in settings.</p>\
                    </body></html>";
        assert!(PageExtractor::default()
            .extract(html, "https://www.filmreviews.example/test-film")
            .is_none());
    }
}
