//! Sitemap parsing

use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<url>` block of a sitemap
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

#[derive(Debug, Default)]
struct PartialEntry {
    loc: String,
    lastmod: String,
    changefreq: String,
    priority: String,
}

impl Field {
    /// Maps an unprefixed child of `<url>` to the field it fills
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Field::Loc),
            b"lastmod" => Some(Field::Lastmod),
            b"changefreq" => Some(Field::Changefreq),
            b"priority" => Some(Field::Priority),
            _ => None,
        }
    }
}

impl PartialEntry {
    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Loc => &mut self.loc,
            Field::Lastmod => &mut self.lastmod,
            Field::Changefreq => &mut self.changefreq,
            Field::Priority => &mut self.priority,
        }
    }

    fn finish(self) -> Option<SitemapEntry> {
        let non_empty = |s: String| {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        };

        Some(SitemapEntry {
            url: non_empty(self.loc)?,
            priority: self.priority.trim().parse::<f64>().ok(),
            lastmod: non_empty(self.lastmod),
            changefreq: non_empty(self.changefreq),
        })
    }
}

/// Parses the `<url>` entries of a sitemap document
///
/// Only direct children of `<url>` are read, so extension blocks such as
/// `<image:image>` never leak into the entry. Blocks without a `<loc>` are
/// skipped and an unparseable `<priority>` becomes `None`. Parsing stops at
/// the first XML error, keeping every entry read up to that point.
///
/// # Example
///
/// ```
/// use kb_mirror::detector::parse_sitemap;
///
/// let xml = r#"<urlset><url><loc>https://docs.example.com/a</loc><priority>0.8</priority></url></urlset>"#;
/// let entries = parse_sitemap(xml);
/// assert_eq!(entries[0].url, "https://docs.example.com/a");
/// assert_eq!(entries[0].priority, Some(0.8));
/// ```
pub fn parse_sitemap(xml: &str) -> Vec<SitemapEntry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<PartialEntry> = None;
    let mut field: Option<Field> = None;
    // Open elements below the current <url>
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if current.is_some() {
                    depth += 1;
                    field = if depth == 1 {
                        Field::from_name(e.name().as_ref())
                    } else {
                        None
                    };
                } else if e.local_name().as_ref() == b"url" {
                    current = Some(PartialEntry::default());
                    depth = 0;
                }
            }
            Ok(Event::Text(text)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    match text.unescape() {
                        Ok(value) => entry.field_mut(field).push_str(&value),
                        Err(e) => tracing::debug!("Skipping undecodable sitemap text: {}", e),
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry
                        .field_mut(field)
                        .push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(_)) => {
                field = None;
                if current.is_some() {
                    if depth == 0 {
                        if let Some(entry) = current.take().and_then(PartialEntry::finish) {
                            entries.push(entry);
                        }
                    } else {
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(
                    "Malformed sitemap at byte {}: {} (keeping {} entries)",
                    reader.buffer_position(),
                    e,
                    entries.len()
                );
                break;
            }
            _ => {}
        }
    }

    entries
}
