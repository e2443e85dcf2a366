use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use adblock_sitekey::core::{detect_by_extension, detect_content_type, ContentTypeMask};
use adblock_sitekey::ContentType;
use proptest::prelude::*;
use test_case::test_case;

fn headers(name: &'static str, value: &'static str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("http://example.com/app.js", Some(ContentType::Script) ; "script")]
    #[test_case("http://example.com/style.CSS", Some(ContentType::Stylesheet) ; "uppercase stylesheet")]
    #[test_case("http://example.com/banner.png?size=large", Some(ContentType::Image) ; "image with query")]
    #[test_case("http://example.com/clip.mp4#t=10", Some(ContentType::Media) ; "media with fragment")]
    #[test_case("http://example.com/font.woff2", Some(ContentType::Font) ; "font")]
    #[test_case("http://example.com/frame.html", Some(ContentType::Subdocument) ; "subdocument")]
    #[test_case("http://example.com/api/data", None ; "no extension")]
    #[test_case("http://example.com/archive.zip", None ; "unknown extension")]
    #[test_case("not a url.js", None ; "invalid url")]
    fn test_detect_by_extension(url: &str, expected: Option<ContentType>) {
        assert_eq!(detect_by_extension(url), expected);
    }

    #[test]
    fn test_xhr_header_wins_over_extension() {
        let headers = headers("x-requested-with", "XMLHttpRequest");

        assert_eq!(
            detect_content_type("http://example.com/app.js", &headers),
            ContentType::XmlHttpRequest
        );
    }

    #[test]
    fn test_accept_html_means_subdocument() {
        let headers = headers("accept", "text/html,application/xhtml+xml");

        assert_eq!(
            detect_content_type("http://example.com/frame", &headers),
            ContentType::Subdocument
        );
    }

    #[test]
    fn test_unknown_is_other() {
        assert_eq!(
            detect_content_type("http://example.com/track", &HeaderMap::new()),
            ContentType::Other
        );
    }

    #[test]
    fn test_mask_combination() {
        let mask = ContentType::Image.mask().with(ContentType::Script);

        assert!(mask.contains(ContentType::Image));
        assert!(mask.contains(ContentType::Script));
        assert!(!mask.contains(ContentType::Subdocument));
        assert_eq!(ContentTypeMask::from(ContentType::Other), ContentTypeMask(1));
    }

    #[test]
    fn test_display_and_visibility() {
        assert_eq!(ContentType::XmlHttpRequest.to_string(), "XMLHTTPREQUEST");
        assert!(ContentType::Image.is_visible());
        assert!(!ContentType::Script.is_visible());
    }

    proptest! {
        #[test]
        fn test_extension_detection_ignores_case_and_query(
            name in "[a-z0-9_-]{1,16}",
            upper in any::<bool>(),
            query in "[a-z0-9=&]{0,16}",
        ) {
            let extension = if upper { "PNG" } else { "png" };
            let url = format!("http://example.com/{}.{}?{}", name, extension, query);

            prop_assert_eq!(detect_by_extension(&url), Some(ContentType::Image));
        }

        #[test]
        fn test_extensionless_paths_fall_back_to_other(path in "[a-z0-9/]{0,24}") {
            let url = format!("http://example.com/{}", path);

            prop_assert_eq!(detect_content_type(&url, &HeaderMap::new()), ContentType::Other);
        }
    }
}
