//! Narrative-content classifier.
//!
//! Decides whether a block of extracted text reads like a movie plot or is
//! page noise: block pages, error pages, cookie banners, paywalls, navigation
//! chrome, or the placeholder prose emitted by fallback generators.
//!
//! Pure and deterministic. All matching is case-insensitive substring
//! matching against fixed phrase lists.

use serde::Serialize;

use crate::config::LengthThresholds;

/// Security and block-page phrases. The first five reject on sight.
pub const SECURITY_INDICATORS: &[&str] = &[
    "cloudflare",
    "security service",
    "online attacks",
    "ray id",
    "blocked",
    "triggered the security solution",
    "sql command",
    "malformed data",
    "performance & security by",
    "this website is using a security service",
    "you were blocked",
    "click to reveal",
    "your ip",
];

/// HTTP error page phrases.
pub const ERROR_INDICATORS: &[&str] = &[
    "404 not found",
    "403 forbidden",
    "500 internal server error",
    "page not found",
    "access denied",
    "server error",
    "temporarily unavailable",
    "under maintenance",
];

/// Cookie and privacy notice phrases.
pub const PRIVACY_INDICATORS: &[&str] = &[
    "cookie policy",
    "privacy policy",
    "gdpr",
    "accept cookies",
    "we use cookies",
    "consent",
    "data protection",
    "terms of service",
    "privacy notice",
];

/// Subscription and advertising phrases.
pub const COMMERCIAL_INDICATORS: &[&str] = &[
    "subscribe now",
    "sign up",
    "create account",
    "login required",
    "premium content",
    "advertisement",
    "sponsored content",
    "newsletter",
    "follow us",
    "social media",
];

/// Navigation and page chrome phrases.
pub const UI_INDICATORS: &[&str] = &[
    "home page",
    "contact us",
    "about us",
    "search results",
    "navigation menu",
    "sidebar",
    "footer",
    "header",
    "click here",
    "read more",
    "load more",
];

/// Number of leading `SECURITY_INDICATORS` that reject on a single hit.
const HARD_SECURITY_COUNT: usize = 5;

/// Distinct indicators at which text is rejected regardless of length.
const NOISE_REJECT_COUNT: usize = 3;

/// Minimum number of period-separated segments.
const MIN_SENTENCE_SEGMENTS: usize = 3;

/// Sentences produced by placeholder plot generators.
pub const TEMPLATE_SENTENCES: &[&str] = &[
    "follows the journey of a protagonist who faces numerous challenges",
    "the film begins with an introduction to the main character",
    "inciting incident disrupts their routine",
    "explores themes of perseverance, identity, and the human condition",
    "offering viewers a compelling story that resonates on multiple levels",
];

/// Words that place text in the movie domain.
pub const MOVIE_KEYWORDS: &[&str] = &[
    "film",
    "movie",
    "story",
    "plot",
    "character",
    "protagonist",
    "drama",
    "comedy",
    "thriller",
    "romance",
    "action",
    "directed",
    "starring",
    "cast",
    "screenplay",
    "cinema",
];

/// Why a block of text was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Empty or below a length floor.
    TooShort,
    /// One or more noise indicators present.
    NoiseIndicators,
    /// A hard security phrase is present.
    SecurityNotice,
    /// Matches placeholder generator prose.
    TemplateText,
    /// Fewer than three sentence-like segments.
    TooFewSentences,
    /// No movie-domain keyword.
    NoMovieKeywords,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TooShort => "too short",
            Self::NoiseIndicators => "noise indicators",
            Self::SecurityNotice => "security notice",
            Self::TemplateText => "template text",
            Self::TooFewSentences => "too few sentences",
            Self::NoMovieKeywords => "no movie keywords",
        };
        f.write_str(s)
    }
}

/// Outcome of validating a block of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Accept => None,
            Self::Reject(reason) => Some(*reason),
        }
    }
}

/// Classifies text as narrative plot content or noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentValidator {
    thresholds: LengthThresholds,
}

impl ContentValidator {
    pub fn new(thresholds: LengthThresholds) -> Self {
        Self { thresholds }
    }

    /// Validate `text` for final acceptance.
    ///
    /// `preferred` lowers the final length floor from the strict value to
    /// the preferred-source value. Every other check is identical.
    pub fn validate(&self, text: &str, preferred: bool) -> Verdict {
        let trimmed = text.trim();
        let length = char_len(trimmed);

        if length < self.thresholds.generic_min {
            return Verdict::Reject(RejectReason::TooShort);
        }

        let lower = trimmed.to_lowercase();

        let indicators = noise_indicator_count(&lower);
        if indicators >= NOISE_REJECT_COUNT {
            return Verdict::Reject(RejectReason::NoiseIndicators);
        }

        if SECURITY_INDICATORS[..HARD_SECURITY_COUNT]
            .iter()
            .any(|phrase| lower.contains(phrase))
        {
            return Verdict::Reject(RejectReason::SecurityNotice);
        }

        if TEMPLATE_SENTENCES.iter().any(|s| lower.contains(s)) {
            return Verdict::Reject(RejectReason::TemplateText);
        }

        if trimmed.split('.').count() < MIN_SENTENCE_SEGMENTS {
            return Verdict::Reject(RejectReason::TooFewSentences);
        }

        if !has_movie_keyword(&lower) {
            return Verdict::Reject(RejectReason::NoMovieKeywords);
        }

        if indicators > 0 {
            return Verdict::Reject(RejectReason::NoiseIndicators);
        }

        let floor = if preferred {
            self.thresholds.preferred_min
        } else {
            self.thresholds.strict_min
        };
        if length < floor {
            return Verdict::Reject(RejectReason::TooShort);
        }

        Verdict::Accept
    }

    /// Shorthand for `validate(..).is_accepted()`.
    pub fn is_valid(&self, text: &str, preferred: bool) -> bool {
        self.validate(text, preferred).is_accepted()
    }
}

/// Length in characters, the unit every threshold is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Count distinct indicator phrases present in already-lowercased text.
pub fn noise_indicator_count(lower: &str) -> usize {
    SECURITY_INDICATORS
        .iter()
        .chain(ERROR_INDICATORS)
        .chain(PRIVACY_INDICATORS)
        .chain(COMMERCIAL_INDICATORS)
        .chain(UI_INDICATORS)
        .filter(|phrase| lower.contains(*phrase))
        .count()
}

fn has_movie_keyword(lower: &str) -> bool {
    MOVIE_KEYWORDS.iter().any(|k| lower.contains(k))
}
