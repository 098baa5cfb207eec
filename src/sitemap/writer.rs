//! Sitemap XML serialization

use crate::sitemap::types::{SitemapEntry, SITEMAP_NAMESPACE};
use crate::SitemaperError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Serializes entries into a sitemaps.org `urlset` document
///
/// Entries are written in the order given. All text content is XML-escaped,
/// so the output is well-formed for any input.
///
/// # Arguments
///
/// * `entries` - Sitemap entries in discovery order
///
/// # Returns
///
/// * `Ok(String)` - The XML document, terminated by a newline
/// * `Err(SitemaperError::Serialization)` - The XML writer failed
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use sitemaper::config::ChangeFreq;
/// use sitemaper::sitemap::{serialize, SitemapEntry};
///
/// let entries = vec![SitemapEntry::new("https://a.test/", Utc::now(), ChangeFreq::Daily)];
/// let xml = serialize(&entries).unwrap();
/// assert!(xml.contains("<loc>https://a.test/</loc>"));
/// ```
pub fn serialize(entries: &[SitemapEntry]) -> Result<String, SitemaperError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NAMESPACE));
    write_event(&mut writer, Event::Start(urlset))?;

    for entry in entries {
        write_event(&mut writer, Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        write_text_element(&mut writer, "lastmod", &entry.lastmod_date())?;
        write_text_element(&mut writer, "changefreq", entry.changefreq.as_str())?;
        write_event(&mut writer, Event::End(BytesEnd::new("url")))?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new("urlset")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');

    String::from_utf8(bytes).map_err(|e| SitemaperError::Serialization(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), SitemaperError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SitemaperError> {
    writer
        .write_event(event)
        .map_err(|e| SitemaperError::Serialization(e.to_string()))
}
