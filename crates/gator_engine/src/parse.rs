use gator_logging::gator_debug;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::{DecodeError, Feed, Item};

const CHANNEL_DEPTH: usize = 2;
const ITEM_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
}

impl Field {
    fn from_name(name: &[u8], in_item: bool) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" => Some(Field::Description),
            b"pubDate" if in_item => Some(Field::PubDate),
            _ => None,
        }
    }
}

/// Text being collected for one field element.
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Default)]
struct FeedBuilder {
    feed: Feed,
    saw_channel: bool,
    in_channel: bool,
    item: Option<Item>,
    capture: Option<Capture>,
}

impl FeedBuilder {
    fn open(&mut self, name: &[u8], depth: usize) {
        if self.capture.is_some() {
            return;
        }
        match depth {
            CHANNEL_DEPTH if name == b"channel" => {
                self.saw_channel = true;
                self.in_channel = true;
            }
            ITEM_DEPTH if self.in_channel && name == b"item" => self.item = Some(Item::default()),
            ITEM_DEPTH if self.in_channel => self.start_capture(name, depth, false),
            d if d == ITEM_DEPTH + 1 && self.item.is_some() => self.start_capture(name, depth, true),
            _ => {}
        }
    }

    fn start_capture(&mut self, name: &[u8], depth: usize, in_item: bool) {
        if let Some(field) = Field::from_name(name, in_item) {
            self.capture = Some(Capture {
                field,
                depth,
                text: String::new(),
            });
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    fn close(&mut self, name: &[u8], depth: usize) {
        if let Some(capture) = self.capture.take() {
            if capture.depth != depth {
                self.capture = Some(capture);
                return;
            }
            self.assign(capture.field, capture.text);
            return;
        }
        match depth {
            ITEM_DEPTH if name == b"item" => {
                if let Some(item) = self.item.take() {
                    self.feed.items.push(item);
                }
            }
            CHANNEL_DEPTH if name == b"channel" => self.in_channel = false,
            _ => {}
        }
    }

    fn assign(&mut self, field: Field, text: String) {
        match self.item.as_mut() {
            Some(item) => match field {
                Field::Title => item.title = text,
                Field::Link => item.link = text,
                Field::Description => item.description = text,
                Field::PubDate => item.published_at = text,
            },
            None => match field {
                Field::Title => self.feed.title = text,
                Field::Link => self.feed.link = text,
                Field::Description => self.feed.description = text,
                Field::PubDate => {}
            },
        }
    }
}

/// Parse an RSS 2.0 document into a [`Feed`] without touching its text.
///
/// The `channel` element below the root supplies the feed fields and its
/// `item` children supply the items, in document order. Unknown elements are
/// skipped; element names are matched exactly, so `atom:link` is not `link`.
/// A well-formed document without a channel yields an empty feed.
pub fn parse_feed(xml: &str) -> Result<Feed, DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = FeedBuilder::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|err| DecodeError::Malformed {
            position: reader.error_position() as u64,
            message: err.to_string(),
        })?;
        match event {
            Event::Start(e) => {
                stack.push(e.name().as_ref().to_vec());
                seen_root = true;
                builder.open(e.name().as_ref(), stack.len());
            }
            Event::Empty(e) => {
                seen_root = true;
                let depth = stack.len() + 1;
                builder.open(e.name().as_ref(), depth);
                builder.close(e.name().as_ref(), depth);
            }
            Event::End(e) => {
                builder.close(e.name().as_ref(), stack.len());
                stack.pop();
            }
            Event::Text(e) if builder.capture.is_some() => {
                let text = e
                    .unescape_with(resolve_html5_entity)
                    .map_err(|err| DecodeError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                builder.text(&text);
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                builder.text(&String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::Malformed {
            position: reader.buffer_position() as u64,
            message: format!(
                "unexpected end of document inside <{}>",
                String::from_utf8_lossy(open)
            ),
        });
    }
    if !seen_root {
        return Err(DecodeError::Malformed {
            position: 0,
            message: "document has no root element".into(),
        });
    }
    if !builder.saw_channel {
        gator_debug!("document has no <channel> element");
    }
    Ok(builder.feed)
}
