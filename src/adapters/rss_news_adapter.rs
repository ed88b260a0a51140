//! RSS headline feed (Google News search by default).

use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Duration;
use tracing::debug;

use crate::domain::error::TraderError;
use crate::ports::news_port::NewsPort;

pub struct RssNewsAdapter {
    url: String,
    max_headlines: usize,
    placeholder: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub published: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    PubDate,
}

fn malformed(e: impl std::fmt::Display) -> TraderError {
    TraderError::NewsUnavailable {
        reason: format!("malformed feed: {e}"),
    }
}

/// Extracts up to `max` items in feed order. Only direct `<title>` and
/// `<pubDate>` children of `<item>` are read; entities and CDATA are decoded.
pub fn parse_feed(xml: &str, max: usize) -> Result<Vec<Headline>, TraderError> {
    let mut reader = Reader::from_str(xml);
    let mut headlines = Vec::new();
    let mut depth_in_item: Option<usize> = None;
    let mut field: Option<Field> = None;
    let mut title = String::new();
    let mut published = String::new();

    while headlines.len() < max {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => match depth_in_item {
                None if e.local_name().as_ref() == b"item" => {
                    depth_in_item = Some(0);
                    title.clear();
                    published.clear();
                }
                None => {}
                Some(depth) => {
                    field = match (depth, e.local_name().as_ref()) {
                        (0, b"title") => Some(Field::Title),
                        (0, b"pubDate") => Some(Field::PubDate),
                        _ => None,
                    };
                    depth_in_item = Some(depth + 1);
                }
            },
            Event::End(_) => match depth_in_item {
                Some(0) => {
                    depth_in_item = None;
                    let text = title.trim();
                    if !text.is_empty() {
                        let date = published.trim();
                        headlines.push(Headline {
                            title: text.to_string(),
                            published: (!date.is_empty()).then(|| date.to_string()),
                        });
                    }
                }
                Some(depth) => {
                    depth_in_item = Some(depth - 1);
                    field = None;
                }
                None => {}
            },
            Event::Text(t) => {
                if let Some(f) = field {
                    let text = t.unescape().map_err(malformed)?;
                    match f {
                        Field::Title => title.push_str(&text),
                        Field::PubDate => published.push_str(&text),
                    }
                }
            }
            Event::CData(c) => {
                if let Some(f) = field {
                    let raw = c.into_inner();
                    let text = String::from_utf8_lossy(&raw);
                    match f {
                        Field::Title => title.push_str(&text),
                        Field::PubDate => published.push_str(&text),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(headlines)
}

/// One `- title (published)` line per headline.
pub fn format_headlines(headlines: &[Headline]) -> String {
    headlines
        .iter()
        .map(|h| match &h.published {
            Some(p) => format!("- {} ({p})", h.title),
            None => format!("- {}", h.title),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl RssNewsAdapter {
    pub fn new(
        url: impl Into<String>,
        max_headlines: usize,
        placeholder: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            max_headlines,
            placeholder: placeholder.into(),
            client: reqwest::blocking::Client::new(),
            timeout,
        }
    }
}

impl NewsPort for RssNewsAdapter {
    fn fetch_headlines(&self) -> Result<String, TraderError> {
        let body = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| TraderError::NewsUnavailable {
                reason: e.to_string(),
            })?;

        let headlines = parse_feed(&body, self.max_headlines)?;
        debug!(count = headlines.len(), "fetched headlines");
        if headlines.is_empty() {
            return Ok(self.placeholder.clone());
        }
        Ok(format_headlines(&headlines))
    }
}
