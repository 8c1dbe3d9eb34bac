//! Search query phrasings.

/// Build the ordered query phrasings for a movie.
///
/// The first phrasing steers toward encyclopedia articles, the later ones
/// widen to synopsis pages and long-form reviews.
pub fn plot_queries(title: &str, year: &str) -> Vec<String> {
    let subject = if year.trim().is_empty() {
        title.trim().to_string()
    } else {
        format!("{} {}", title.trim(), year.trim())
    };

    vec![
        format!("{subject} plot summary wikipedia"),
        format!("{subject} movie synopsis"),
        format!("{subject} story plot detailed"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_phrasings_in_order() {
        assert_eq!(
            plot_queries("Test Film", "2020"),
            vec![
                "Test Film 2020 plot summary wikipedia",
                "Test Film 2020 movie synopsis",
                "Test Film 2020 story plot detailed",
            ]
        );
    }

    #[test]
    fn test_missing_year() {
        assert_eq!(plot_queries("Sholay", "")[1], "Sholay movie synopsis");
    }
}
