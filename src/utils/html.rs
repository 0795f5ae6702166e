use ammonia;

/// Clean HTML coming from the rich-text editor before it is stored.
///
/// Whitelist-based: safe markup (<p>, <b>, <img>, headings, lists) survives,
/// anything executable (<script>, <iframe>, on* attributes) is stripped.
/// Post and information content is rendered verbatim by the storefront, so
/// this is the only barrier against stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_benign_markup() {
        let cleaned = clean_html("<p>Trail shoes <b>review</b></p>");
        assert_eq!(cleaned, "<p>Trail shoes <b>review</b></p>");
    }

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_html("<p>hi</p><script>alert(1)</script>");
        assert!(!cleaned.contains("script"));
        assert!(cleaned.contains("<p>hi</p>"));
    }
}
