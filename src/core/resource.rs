use crate::constants::BINARY_MIME_PREFIXES;

const CHARSET: &str = "charset=";

/// MIME type and character encoding derived from a `Content-Type` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    pub mime_type: Option<String>,
    pub encoding: Option<String>,
    pub is_binary: bool,
}

impl ResourceInfo {
    /// Malformed values (leading `;`, no `/`) yield an empty info, never an error.
    /// Binary types never carry an encoding.
    pub fn parse(content_type: Option<&str>) -> Self {
        let content_type = match content_type {
            Some(value) => value,
            None => return Self::default(),
        };

        let mut info = match content_type.find(';') {
            Some(pos) if pos > 0 => {
                let encoding = content_type
                    .find(CHARSET)
                    .map(|start| &content_type[start + CHARSET.len()..])
                    .map(|rest| rest.split(';').next().unwrap_or(rest))
                    .filter(|value| !value.trim().is_empty())
                    .map(str::to_owned);
                Self {
                    mime_type: Some(content_type[..pos].to_owned()),
                    encoding,
                    is_binary: false,
                }
            }
            Some(_) => return Self::default(),
            None if content_type.find('/').map_or(false, |pos| pos > 0) => Self {
                mime_type: Some(content_type.to_owned()),
                ..Default::default()
            },
            None => return Self::default(),
        };

        info.trim();
        info.is_binary = info.mime_type.as_deref().map_or(false, Self::is_binary_mime);
        if info.is_binary {
            info.encoding = None;
        }
        info
    }

    pub fn is_binary_mime(mime_type: &str) -> bool {
        let mime_type = mime_type.trim();
        BINARY_MIME_PREFIXES.iter().any(|prefix| {
            mime_type
                .get(..prefix.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
        })
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        let mime_type = mime_type.into();
        self.is_binary = Self::is_binary_mime(&mime_type);
        self.mime_type = Some(mime_type);
        if self.is_binary {
            self.encoding = None;
        }
    }

    pub fn trim(&mut self) {
        if let Some(mime_type) = self.mime_type.as_mut() {
            *mime_type = mime_type.trim().to_owned();
        }
        if let Some(encoding) = self.encoding.as_mut() {
            *encoding = encoding.trim().to_owned();
        }
    }

    /// Whether the type is unknown or HTML.
    pub fn may_be_html(&self) -> bool {
        self.mime_type
            .as_deref()
            .map_or(true, |mime| mime.to_ascii_lowercase().contains(crate::constants::MIME_TEXT_HTML))
    }
}
