//! RSS 2.0 document decoding.
//!
//! Only the `<channel>` fields and the `title`, `link`, `description` and
//! `pubDate` of each `<item>` are kept. Everything else is skipped, but the
//! document as a whole must still be well-formed XML.

use html_escape::decode_html_entities;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use crate::fetcher::FetchError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RssDocument {
    pub channel: Channel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Raw `pubDate` text; turned into a timestamp by the normalizer.
    pub pub_date: String,
}

/// Decode an RSS document from raw bytes.
///
/// Title and description text is HTML-unescaped on top of the regular XML
/// unescaping, so double-escaped entities such as `&amp;#39;` come out as `'`.
pub fn parse_document(xml: &[u8]) -> Result<RssDocument, FetchError> {
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    let mut channel: Option<Channel> = None;
    let mut current_item: Option<RssItem> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let parent = path.last().map(String::as_str);

                match (parent, name.as_str()) {
                    (_, "channel") if channel.is_none() => channel = Some(Channel::default()),
                    (Some("channel"), "item") => current_item = Some(RssItem::default()),
                    _ => {}
                }

                path.push(name);
                text.clear();
            }
            Ok(Event::Text(e)) => {
                let unescaped = e.unescape().map_err(|err| {
                    FetchError::Parse(format!(
                        "XML parse error at byte {}: {}",
                        reader.buffer_position(),
                        err
                    ))
                })?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                text.push_str(&String::from_utf8_lossy(&raw));
            }
            Ok(Event::End(e)) => {
                let closing = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let name = path.pop().ok_or_else(|| {
                    FetchError::Parse(format!("</{}> without matching opening tag", closing))
                })?;
                if name != closing {
                    return Err(FetchError::Parse(format!(
                        "expected </{}>, found </{}>",
                        name, closing
                    )));
                }
                let parent = path.last().map(String::as_str);
                let value = std::mem::take(&mut text).trim().to_string();

                match (parent, name.as_str()) {
                    (Some("channel"), "item") => {
                        if let (Some(channel), Some(item)) = (channel.as_mut(), current_item.take())
                        {
                            channel.items.push(item);
                        }
                    }
                    (Some("item"), field) => {
                        if let Some(item) = current_item.as_mut() {
                            match field {
                                "title" => item.title = unescape_html(&value),
                                "link" => item.link = value,
                                "description" => item.description = unescape_html(&value),
                                "pubDate" => item.pub_date = value,
                                _ => {}
                            }
                        }
                    }
                    (Some("channel"), field) => {
                        if let Some(channel) = channel.as_mut() {
                            match field {
                                "title" => channel.title = unescape_html(&value),
                                "link" => channel.link = value,
                                "description" => channel.description = unescape_html(&value),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "XML parse error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = path.last() {
        return Err(FetchError::Parse(format!(
            "unexpected end of document inside <{}>",
            open
        )));
    }

    let channel =
        channel.ok_or_else(|| FetchError::Parse("document has no <channel> element".into()))?;
    Ok(RssDocument { channel })
}

fn unescape_html(s: &str) -> String {
    decode_html_entities(s).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Test &amp;amp; Feed</title>
    <link>https://example.com/</link>
    <description>A test feed</description>
    <atom:link href="https://example.com/feed.xml" rel="self" type="application/rss+xml"/>
    <image>
      <title>Logo title</title>
      <url>https://example.com/logo.png</url>
    </image>
    <item>
      <title>It&amp;#39;s item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>&lt;p&gt;This is item 1&lt;/p&gt;</description>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <description><![CDATA[Fish &amp; chips]]></description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel_fields() {
        let doc = parse_document(RSS_SAMPLE.as_bytes()).unwrap();

        assert_eq!(doc.channel.title, "Test & Feed");
        assert_eq!(doc.channel.link, "https://example.com/");
        assert_eq!(doc.channel.description, "A test feed");
        assert_eq!(doc.channel.items.len(), 2);
    }

    #[test]
    fn test_parse_item_fields() {
        let doc = parse_document(RSS_SAMPLE.as_bytes()).unwrap();
        let first = &doc.channel.items[0];

        assert_eq!(first.title, "It's item 1");
        assert_eq!(first.link, "https://example.com/item1");
        assert_eq!(first.pub_date, "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(first.description, "<p>This is item 1</p>");
    }

    #[test]
    fn test_cdata_is_html_unescaped_once() {
        let doc = parse_document(RSS_SAMPLE.as_bytes()).unwrap();
        let second = &doc.channel.items[1];

        assert_eq!(second.description, "Fish & chips");
        assert_eq!(second.pub_date, "");
    }

    #[test]
    fn test_nested_titles_do_not_override_channel_title() {
        let doc = parse_document(RSS_SAMPLE.as_bytes()).unwrap();
        assert_ne!(doc.channel.title, "Logo title");
    }

    #[test]
    fn test_mismatched_tags_are_parse_errors() {
        let xml = "<rss><channel><title>Broken</link></channel></rss>";
        let err = parse_document(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_truncated_document_is_parse_error() {
        let xml = "<rss><channel><title>Cut off</title><item><title>x</title>";
        let err = parse_document(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_document_without_channel_is_parse_error() {
        let err = parse_document(b"<html><body>Not a feed</body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));

        let err = parse_document(b"").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_bare_ampersand_is_parse_error() {
        let xml = "<rss><channel><title>AT & T</title></channel></rss>";
        let err = parse_document(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_whitespace_around_cdata_is_kept() {
        let xml = "<rss><channel><title>A <![CDATA[&]]> B</title>\
                   <item><link>\n  https://example.com/x\n</link></item></channel></rss>";
        let doc = parse_document(xml.as_bytes()).unwrap();

        assert_eq!(doc.channel.title, "A & B");
        assert_eq!(doc.channel.items[0].link, "https://example.com/x");
    }

    #[test]
    fn test_empty_channel() {
        let doc = parse_document(b"<rss><channel><title>Quiet</title></channel></rss>").unwrap();
        assert_eq!(doc.channel.title, "Quiet");
        assert!(doc.channel.items.is_empty());
    }
}
