use crate::types::Post;

use scraper::{Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No post entries found on page")]
    NoPosts,
    #[error("Missing required element: {0}")]
    MissingField(String),
}

/// Extract the most recent post: the first `div.post` in document order.
/// The listing is reverse-chronological, so first means newest.
pub fn latest_post(html: &str) -> Result<Post, ParseError> {
    let document = Html::parse_document(html);
    let post_selector = Selector::parse("div.post").unwrap();
    let title_selector = Selector::parse("h3.entry-title").unwrap();
    let span_selector = Selector::parse("span").unwrap();

    let post = document
        .select(&post_selector)
        .next()
        .ok_or(ParseError::NoPosts)?;

    let title = post
        .select(&title_selector)
        .next()
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .ok_or_else(|| ParseError::MissingField("h3.entry-title".to_string()))?;

    let span_texts = post
        .select(&span_selector)
        .map(|elem| normalize_whitespace(&elem.text().collect::<String>()))
        .collect();

    Ok(Post { title, span_texts })
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_post_wins() {
        let html = r#"
            <div class="content">
                <div class="post">
                    <h3 class="entry-title">March 4 specials</h3>
                    <span>we have mocha chip scones</span>
                </div>
                <div class="post">
                    <h3 class="entry-title">March 3 specials</h3>
                    <span>plain scones only</span>
                </div>
            </div>
        "#;

        let post = latest_post(html).expect("Failed to parse");

        assert_eq!(post.title, "March 4 specials");
        assert!(post.has_keyword("mocha chip"));
    }

    #[test]
    fn test_title_is_trimmed() {
        let html = r#"
            <div class="post">
                <h3 class="entry-title">
                    March 4 specials
                </h3>
            </div>
        "#;

        let post = latest_post(html).expect("Failed to parse");

        assert_eq!(post.title, "March 4 specials");
    }

    #[test]
    fn test_span_texts_are_whitespace_normalized() {
        let html = r#"
            <div class="post">
                <h3 class="entry-title">March 4 specials</h3>
                <span>Mocha
                      chip  today</span>
            </div>
        "#;

        let post = latest_post(html).expect("Failed to parse");

        assert_eq!(post.span_texts, vec!["Mocha chip today".to_string()]);
        assert!(post.has_keyword("Mocha chip"));
        assert!(!post.has_keyword("mocha chip"));
    }

    #[test]
    fn test_span_text_includes_nested_elements() {
        let html = r#"
            <div class="post">
                <h3 class="entry-title">March 4 specials</h3>
                <span>fresh mocha <em>chip</em> scones</span>
            </div>
        "#;

        let post = latest_post(html).expect("Failed to parse");

        assert!(post.has_keyword("mocha chip"));
    }

    #[test]
    fn test_keyword_outside_span_does_not_count() {
        let html = r#"
            <div class="post">
                <h3 class="entry-title">March 4 specials</h3>
                <p>we have mocha chip scones</p>
            </div>
        "#;

        let post = latest_post(html).expect("Failed to parse");

        assert!(!post.has_keyword("mocha chip"));
    }

    #[test]
    fn test_page_without_posts_is_an_error() {
        let html = r#"<div class="content"><p>Nothing here yet.</p></div>"#;

        let err = latest_post(html).unwrap_err();

        assert!(matches!(err, ParseError::NoPosts));
    }

    #[test]
    fn test_post_without_title_is_an_error() {
        let html = r#"
            <div class="post">
                <span>we have mocha chip scones</span>
            </div>
        "#;

        let err = latest_post(html).unwrap_err();

        assert!(matches!(err, ParseError::MissingField(_)));
    }
}
