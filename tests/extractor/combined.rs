use adblock_sitekey::{CombinedSiteKeyExtractor, HoldState, ServerResponse, SiteKeyExtractor, WebRequest};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{configuration, FakeHost, MockClient, PAGE_URL};

fn extractor_with(client: MockClient) -> CombinedSiteKeyExtractor {
    let extractor = CombinedSiteKeyExtractor::new();
    extractor.set_site_keys_configuration(Some(configuration(Arc::new(client), Duration::from_millis(300))));
    extractor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_frame_goes_to_page_extractor() {
        let mut client = MockClient::new();
        client.expect_request().never();
        let extractor = extractor_with(client);

        let response = extractor.obtain_and_check_site_key(&FakeHost::default(), &WebRequest::get(PAGE_URL).main_frame());

        assert!(response.is_allow_load());
        assert_eq!(
            extractor.page().gate().current().map(|check| check.url().to_owned()),
            Some(PAGE_URL.to_owned())
        );
    }

    #[test]
    fn test_sub_frame_goes_to_header_extractor() {
        let mut client = MockClient::new();
        client
            .expect_request()
            .times(1)
            .returning(|_| Ok(ServerResponse::new(200).with_header("Content-Type", "text/html").with_body("<p/>")));
        let extractor = extractor_with(client);

        let response = extractor.obtain_and_check_site_key(
            &FakeHost::default(),
            &WebRequest::get("http://frame.example.com/embed.html"),
        );

        assert!(response.response().is_some());
    }

    #[test]
    fn test_enabled_state_reaches_both() {
        let extractor = extractor_with(MockClient::new());

        extractor.set_enabled(false);
        assert!(!extractor.is_enabled());
        assert!(!extractor.http().is_enabled());
        assert!(!extractor.page().is_enabled());

        extractor.set_enabled(true);
        assert!(extractor.http().is_enabled());
        assert!(extractor.page().is_enabled());
    }

    #[test]
    fn test_start_new_page_and_wait_use_page_gate() {
        let extractor = extractor_with(MockClient::new());
        extractor.start_new_page(PAGE_URL);
        extractor.page().on_site_key_does_not_exist(PAGE_URL);

        assert_eq!(
            extractor.page().gate().current().unwrap().state(),
            HoldState::Absent
        );
        assert!(!extractor.wait_for_sitekey_check("http://cdn.example.com/a.js", &[PAGE_URL.to_owned()], false));
    }
}
