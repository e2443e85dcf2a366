use crate::constants::{BODY_END_TAG, HTML_SITEKEY_ATTRIBUTE};
use crate::utils::{find_bytes_ignore_case, rfind_bytes_ignore_case};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlSiteKey {
    Found(String),
    Missing,
    /// The root element has not been fully received yet.
    Incomplete,
}

#[inline]
pub fn has_body_end(html: &[u8]) -> bool {
    rfind_bytes_ignore_case(html, BODY_END_TAG.as_bytes()).is_some()
}

pub fn script_tag(js: &str, nonce: Option<&str>) -> String {
    match nonce {
        Some(nonce) => format!("<script nonce=\"{}\">{}</script>", nonce, js),
        None => format!("<script>{}</script>", js),
    }
}

/// Inserts `snippet` right before the last `</body>`. Works on raw bytes so
/// any ASCII compatible charset survives untouched.
pub fn inject_before_body_end(html: &[u8], snippet: &str) -> Option<Vec<u8>> {
    let pos = rfind_bytes_ignore_case(html, BODY_END_TAG.as_bytes())?;
    let mut out = Vec::with_capacity(html.len() + snippet.len());
    out.extend_from_slice(&html[..pos]);
    out.extend_from_slice(snippet.as_bytes());
    out.extend_from_slice(&html[pos..]);
    Some(out)
}

/// Reads the site key attribute of the root `<html>` start tag.
pub fn find_html_site_key(html: &str) -> HtmlSiteKey {
    let bytes = html.as_bytes();
    let mut from = 0;
    let tag_start = loop {
        match find_bytes_ignore_case(bytes, b"<html", from) {
            Some(pos) => {
                match bytes.get(pos + 5) {
                    Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => break pos + 5,
                    Some(_) => from = pos + 1,
                    None => return HtmlSiteKey::Incomplete,
                }
            }
            None => {
                let unterminated = match (html.rfind('<'), html.rfind('>')) {
                    (Some(open), Some(close)) => open > close,
                    (Some(_), None) => true,
                    _ => false,
                };
                return if html.trim().is_empty() || unterminated {
                    HtmlSiteKey::Incomplete
                } else {
                    HtmlSiteKey::Missing
                };
            }
        }
    };

    let mut attributes = Attributes {
        src: &html[tag_start..],
        pos: 0,
    };
    loop {
        match attributes.next_attribute() {
            Attr::Pair(name, value) => {
                if name.eq_ignore_ascii_case(HTML_SITEKEY_ATTRIBUTE) {
                    let value = value.unwrap_or("").trim();
                    return if value.is_empty() {
                        HtmlSiteKey::Missing
                    } else {
                        HtmlSiteKey::Found(value.to_owned())
                    };
                }
            }
            Attr::End => return HtmlSiteKey::Missing,
            Attr::Truncated => return HtmlSiteKey::Incomplete,
        }
    }
}

enum Attr<'a> {
    Pair(&'a str, Option<&'a str>),
    End,
    Truncated,
}

struct Attributes<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Attributes<'a> {
    fn skip_whitespace(&mut self) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn next_attribute(&mut self) -> Attr<'a> {
        let bytes = self.src.as_bytes();
        self.skip_whitespace();
        match bytes.get(self.pos) {
            None => return Attr::Truncated,
            Some(b'>') => return Attr::End,
            Some(b'/') => {
                self.pos += 1;
                return self.next_attribute();
            }
            Some(_) => {}
        }

        let name_start = self.pos;
        while self.pos < bytes.len()
            && !bytes[self.pos].is_ascii_whitespace()
            && !matches!(bytes[self.pos], b'=' | b'>' | b'/')
        {
            self.pos += 1;
        }
        let name = &self.src[name_start..self.pos];
        self.skip_whitespace();

        if bytes.get(self.pos) != Some(&b'=') {
            return if self.pos >= bytes.len() {
                Attr::Truncated
            } else {
                Attr::Pair(name, None)
            };
        }
        self.pos += 1;
        self.skip_whitespace();

        match bytes.get(self.pos) {
            None => Attr::Truncated,
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = self.pos + 1;
                match self.src[value_start..].find(quote as char) {
                    Some(len) => {
                        self.pos = value_start + len + 1;
                        Attr::Pair(name, Some(&self.src[value_start..value_start + len]))
                    }
                    None => Attr::Truncated,
                }
            }
            Some(_) => {
                let value_start = self.pos;
                while self.pos < bytes.len() && !bytes[self.pos].is_ascii_whitespace() && bytes[self.pos] != b'>' {
                    self.pos += 1;
                }
                if self.pos >= bytes.len() {
                    return Attr::Truncated;
                }
                Attr::Pair(name, Some(&self.src[value_start..self.pos]))
            }
        }
    }
}
