use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use adblock_sitekey::{CspRewriter, CspUpdate, NonceGenerator};
use test_case::test_case;

const CSP: &str = "content-security-policy";
const NONCE: &str = "nonce-+B+pU8gwIWUuPqY2HDc1xA";

fn csp_headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(CSP), HeaderValue::from_str(value).unwrap());
    headers
}

fn csp_value(headers: &HeaderMap) -> &str {
    headers.get(CSP).unwrap().to_str().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_no_csp_header() {
        let rewriter = CspRewriter::new();
        let mut headers = HeaderMap::new();

        assert_eq!(rewriter.update_csp_header(&mut headers), None);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_empty_csp_header() {
        let rewriter = CspRewriter::new();
        let mut headers = csp_headers("");

        assert_eq!(rewriter.update_csp_header(&mut headers), None);
        assert_eq!(csp_value(&headers), "");
    }

    #[test_case("default-src * blob: data:;" ; "no script-src")]
    #[test_case("default-src * blob: data:; style-src 'unsafe-inline'" ; "unsafe-inline outside script-src")]
    #[test_case("default-src * blob: data:; object-src 'nonce-+B+pU8gwIWUuPqY2HDc1xA';" ; "object-src nonce")]
    #[test_case("default-src 'self'; script-src-elem 'self'" ; "longer directive name")]
    fn test_policy_without_script_src_is_unchanged(policy: &str) {
        let rewriter = CspRewriter::new();
        let mut headers = csp_headers(policy);

        assert_eq!(rewriter.rewrite(policy), CspUpdate::Unchanged);
        assert_eq!(rewriter.update_csp_header(&mut headers), None);
        assert_eq!(csp_value(&headers), policy);
    }

    #[test]
    fn test_applicable_unsafe_inline() {
        let rewriter = CspRewriter::new();
        let policy = "default-src * blob: data:; script-src 'unsafe-inline'";
        let mut headers = csp_headers(policy);

        assert_eq!(rewriter.rewrite(policy), CspUpdate::InlineAllowed);
        assert_eq!(rewriter.update_csp_header(&mut headers), None);
        assert_eq!(csp_value(&headers), policy);
    }

    #[test]
    fn test_unsafe_inline_behind_other_directive_does_not_count() {
        let rewriter = CspRewriter::new();
        let policy = "script-src 'self'; style-src 'unsafe-inline'";

        assert!(matches!(rewriter.rewrite(policy), CspUpdate::Injected { .. }));
    }

    #[test_case("default-src * blob: data:; style-src 'unsafe-inline script-src *'" ; "unterminated unsafe-inline")]
    #[test_case(
        "default-src * blob: data:; script-src 'sha256-5CxqAdDXlHviOy7zxeRpMobzRK/JNpLvkS+k8Zj3L3A= blob: https://some.domain.dot.com;" ;
        "hash source"
    )]
    fn test_nonce_is_injected_after_script_src(policy: &str) {
        let rewriter = CspRewriter::new();
        let mut headers = csp_headers(policy);

        let nonce = rewriter.update_csp_header(&mut headers).expect("nonce injected");

        let expected = policy.replace("script-src", &format!("script-src 'nonce-{}'", nonce));
        assert_eq!(csp_value(&headers), expected);
    }

    #[test]
    fn test_injection_at_policy_start() {
        let rewriter = CspRewriter::with_nonce_generator(NonceGenerator::new(8));

        match rewriter.rewrite("script-src 'self'") {
            CspUpdate::Injected { nonce, header } => {
                assert_eq!(header, format!("script-src 'nonce-{}' 'self'", nonce));
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test]
    fn test_bare_script_src() {
        let rewriter = CspRewriter::new();

        match rewriter.rewrite("default-src 'none'; script-src") {
            CspUpdate::Injected { nonce, header } => {
                assert_eq!(header, format!("default-src 'none'; script-src 'nonce-{}'", nonce));
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test_case(
        "default-src * blob: data:; script-src 'report-sample' 'nonce-+B+pU8gwIWUuPqY2HDc1xA' 'unsafe-eval';object-src 'none';" ;
        "script-src nonce"
    )]
    #[test_case(
        "default-src * blob: data:; script-src 'report-sample' 'nonce-+B+pU8gwIWUuPqY2HDc1xA' 'unsafe-inline';object-src 'none';" ;
        "script-src nonce and unsafe-inline"
    )]
    fn test_existing_script_nonce_is_reused(policy: &str) {
        let rewriter = CspRewriter::new();
        let mut headers = csp_headers(policy);

        let nonce = rewriter.update_csp_header(&mut headers).expect("existing nonce");

        assert_eq!(format!("nonce-{}", nonce), NONCE);
        assert_eq!(csp_value(&headers), policy);
    }

    #[test_case(
        "default-src * blob: data:; object-src 'nonce-+B+pU8gwIWUuPqY2HDc1xAobject';script-src 'report-sample' 'nonce-+B+pU8gwIWUuPqY2HDc1xAscript' 'unsafe-eval';" ;
        "object nonce first"
    )]
    #[test_case(
        "default-src * blob: data:; script-src 'report-sample' 'nonce-+B+pU8gwIWUuPqY2HDc1xAscript' 'unsafe-eval';object-src 'nonce-+B+pU8gwIWUuPqY2HDc1xAobject';" ;
        "script nonce first"
    )]
    fn test_script_nonce_wins_over_object_nonce(policy: &str) {
        let rewriter = CspRewriter::new();
        let mut headers = csp_headers(policy);

        let nonce = rewriter.update_csp_header(&mut headers);

        assert_eq!(nonce.map(|n| format!("nonce-{}", n)), Some(format!("{}script", NONCE)));
        assert_eq!(csp_value(&headers), policy);
    }

    #[test]
    fn test_existing_nonce_without_trailing_separator() {
        let rewriter = CspRewriter::new();

        assert_eq!(
            rewriter.rewrite("script-src 'nonce-abc'"),
            CspUpdate::ExistingNonce("abc".to_owned())
        );
    }

    #[test]
    fn test_other_policy_headers_are_kept() {
        let rewriter = CspRewriter::new();
        let mut headers = csp_headers("script-src 'self'");
        headers.append(HeaderName::from_static(CSP), HeaderValue::from_static("frame-ancestors 'none'"));

        let nonce = rewriter.update_csp_header(&mut headers).unwrap();

        let values: Vec<&str> = headers.get_all(CSP).map(|v| v.to_str().unwrap()).collect();
        assert_eq!(
            values,
            [format!("script-src 'nonce-{}' 'self'", nonce).as_str(), "frame-ancestors 'none'"]
        );
    }

    #[test]
    fn test_update_nonce_accessor() {
        assert_eq!(CspUpdate::Unchanged.nonce(), None);
        assert_eq!(CspUpdate::InlineAllowed.nonce(), None);
        assert_eq!(CspUpdate::ExistingNonce("n".to_owned()).nonce(), Some("n"));
    }
}
