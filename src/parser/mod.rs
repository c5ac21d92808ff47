//! Feed document parsing.
//!
//! RSS 2.0 and RSS 1.0 (RDF) go through the generic [`tree`] parser so that
//! namespaced media fields survive untouched; Atom documents are handed to
//! `feed-rs` and mapped onto the same [`RawItem`] shape.

pub mod tree;

use crate::app::{FeedcastError, Result};
use crate::domain::{MediaCandidate, ParsedFeed, RawItem};

pub use tree::{parse_document, XmlDocument, XmlNode};

const KNOWN_ITEM_FIELDS: &[&str] = &[
    "title",
    "link",
    "pubDate",
    "dc:date",
    "description",
    "content",
    "content:encoded",
    "dc:creator",
    "creator",
    "media:group",
    "media:content",
    "media:thumbnail",
];

#[derive(Debug, Clone, Default)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, xml: &str) -> Result<ParsedFeed> {
        let doc = parse_document(xml)?;

        match local_name(&doc.root_name) {
            "rss" => {
                let channel = doc
                    .root
                    .child("channel")
                    .ok_or_else(|| FeedcastError::parse("rss document has no <channel>"))?;
                Ok(ParsedFeed {
                    title: channel.child_text("title").map(String::from),
                    channel_image_url: image_url(channel),
                    items: channel.children_named("item").iter().map(raw_item).collect(),
                })
            }
            "RDF" => {
                // RSS 1.0 keeps items and image next to the channel, not inside it.
                let channel = doc.root.child("channel");
                Ok(ParsedFeed {
                    title: channel.and_then(|c| c.child_text("title")).map(String::from),
                    channel_image_url: image_url(&doc.root),
                    items: doc.root.children_named("item").iter().map(raw_item).collect(),
                })
            }
            "feed" => parse_atom(xml),
            other => Err(FeedcastError::parse(format!(
                "unrecognised feed root <{}>",
                other
            ))),
        }
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn image_url(node: &XmlNode) -> Option<String> {
    node.path(&["image", "url"])
        .and_then(XmlNode::text)
        .map(String::from)
}

fn text_of(node: &XmlNode, name: &str) -> Option<String> {
    node.child_text(name).map(String::from)
}

fn first_url(nodes: &[XmlNode]) -> Option<String> {
    nodes
        .iter()
        .filter_map(|n| n.attr("url"))
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(String::from)
}

fn raw_item(node: &XmlNode) -> RawItem {
    let mut media = Vec::new();

    if let Some(url) = node
        .child("media:group")
        .and_then(|group| first_url(group.children_named("media:content")))
    {
        media.push(MediaCandidate::GroupContent(url));
    }
    if let Some(url) = first_url(node.children_named("media:content")) {
        media.push(MediaCandidate::Content(url));
    }
    if let Some(url) = first_url(node.children_named("media:thumbnail")) {
        media.push(MediaCandidate::Thumbnail(url));
    }

    let ignored_fields = node
        .children
        .iter()
        .filter(|(name, _)| !KNOWN_ITEM_FIELDS.contains(&name.as_str()))
        .map(|(_, children)| children.as_slice().len())
        .sum();

    RawItem {
        title: text_of(node, "title"),
        link: text_of(node, "link").or_else(|| {
            node.child("link")
                .and_then(|l| l.attr("href"))
                .map(String::from)
        }),
        pub_date: text_of(node, "pubDate").or_else(|| text_of(node, "dc:date")),
        description: text_of(node, "description"),
        content: text_of(node, "content"),
        content_encoded: text_of(node, "content:encoded"),
        dc_creator: text_of(node, "dc:creator"),
        creator: text_of(node, "creator"),
        media,
        ignored_fields,
    }
}

fn parse_atom(xml: &str) -> Result<ParsedFeed> {
    let feed = feed_rs::parser::parse(xml.as_bytes()).map_err(FeedcastError::parse)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let mut media = Vec::new();
            for object in &entry.media {
                if let Some(url) = object.content.iter().find_map(|c| c.url.as_ref()) {
                    media.push(MediaCandidate::Content(url.to_string()));
                }
                if let Some(thumb) = object.thumbnails.first() {
                    media.push(MediaCandidate::Thumbnail(thumb.image.uri.clone()));
                }
            }
            media.sort_by_key(MediaCandidate::rank);

            RawItem {
                title: entry.title.map(|t| t.content),
                link: entry.links.first().map(|l| l.href.clone()),
                pub_date: entry.published.or(entry.updated).map(|d| d.to_rfc3339()),
                description: entry.summary.map(|s| s.content),
                content: entry.content.and_then(|c| c.body),
                content_encoded: None,
                dc_creator: None,
                creator: entry.authors.first().map(|a| a.name.clone()),
                media,
                ignored_fields: 0,
            }
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.content),
        channel_image_url: feed.logo.or(feed.icon).map(|i| i.uri),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Test Feed</title>
    <image><url>https://example.com/logo.png</url></image>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
      <dc:creator>Jane Doe</dc:creator>
      <media:content url="https://example.com/1.jpg" medium="image"/>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <media:group>
        <media:content url="https://example.com/g1.jpg"/>
        <media:content url="https://example.com/g2.jpg"/>
      </media:group>
      <media:thumbnail url="https://example.com/t.jpg"/>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss() {
        let feed = FeedParser::new().parse(RSS_SAMPLE).unwrap();

        assert_eq!(feed.title, Some("Test Feed".into()));
        assert_eq!(
            feed.channel_image_url,
            Some("https://example.com/logo.png".into())
        );
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.title, Some("Test Item 1".into()));
        assert_eq!(first.link, Some("https://example.com/item1".into()));
        assert_eq!(first.dc_creator, Some("Jane Doe".into()));
        assert_eq!(
            first.media,
            vec![MediaCandidate::Content("https://example.com/1.jpg".into())]
        );
        // guid is not a recognised field
        assert_eq!(first.ignored_fields, 1);
    }

    #[test]
    fn test_media_group_takes_first_content() {
        let feed = FeedParser::new().parse(RSS_SAMPLE).unwrap();
        assert_eq!(
            feed.items[1].media,
            vec![
                MediaCandidate::GroupContent("https://example.com/g1.jpg".into()),
                MediaCandidate::Thumbnail("https://example.com/t.jpg".into()),
            ]
        );
    }

    #[test]
    fn test_single_item_is_not_dropped() {
        let xml = r#"<rss><channel><title>One</title>
            <item><title>Only</title><link>https://example.com/only</link></item>
        </channel></rss>"#;
        let feed = FeedParser::new().parse(xml).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].title, Some("Only".into()));
    }

    #[test]
    fn test_empty_channel() {
        let feed = FeedParser::new()
            .parse("<rss><channel><title>Quiet</title></channel></rss>")
            .unwrap();
        assert!(feed.items.is_empty());
        assert_eq!(feed.channel_image_url, None);
    }

    #[test]
    fn test_escaped_description_markup_is_preserved_as_text() {
        let xml = r#"<rss><channel><item>
            <title>T</title><link>https://e.com/x</link>
            <description>&lt;img src="https://e.com/b.jpg"/&gt;text</description>
        </item></channel></rss>"#;
        let feed = FeedParser::new().parse(xml).unwrap();
        assert_eq!(
            feed.items[0].description.as_deref(),
            Some(r#"<img src="https://e.com/b.jpg"/>text"#)
        );
    }

    #[test]
    fn test_rdf_items_live_beside_channel() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
          <channel><title>RDF Feed</title></channel>
          <image><url>https://example.com/rdf.png</url></image>
          <item><title>A</title><link>https://example.com/a</link><dc:date>2024-01-01T00:00:00Z</dc:date></item>
          <item><title>B</title><link>https://example.com/b</link></item>
        </rdf:RDF>"#;
        let feed = FeedParser::new().parse(xml).unwrap();
        assert_eq!(feed.title, Some("RDF Feed".into()));
        assert_eq!(
            feed.channel_image_url,
            Some("https://example.com/rdf.png".into())
        );
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].pub_date, Some("2024-01-01T00:00:00Z".into()));
    }

    #[test]
    fn test_parse_atom() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <id>urn:feed</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <author><name>Ann</name></author>
    <summary>This is Atom entry 1</summary>
  </entry>
</feed>"#;
        let feed = FeedParser::new().parse(xml).unwrap();
        assert_eq!(feed.title, Some("Atom Test Feed".into()));
        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(item.title, Some("Atom Entry 1".into()));
        assert_eq!(item.link, Some("https://example.com/atom1".into()));
        assert_eq!(item.creator, Some("Ann".into()));
        assert_eq!(item.description, Some("This is Atom entry 1".into()));
        assert!(item.pub_date.is_some());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = FeedParser::new()
            .parse("<rss><channel><item></channel></rss>")
            .unwrap_err();
        assert!(matches!(err, FeedcastError::FeedParse(_)));
    }

    #[test]
    fn test_unknown_root_is_parse_error() {
        let err = FeedParser::new().parse("<html><body/></html>").unwrap_err();
        assert!(matches!(err, FeedcastError::FeedParse(_)));
    }

    #[test]
    fn test_rss_without_channel_is_parse_error() {
        assert!(FeedParser::new().parse("<rss version=\"2.0\"/>").is_err());
    }
}
