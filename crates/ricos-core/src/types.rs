use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Foreground applied to link text runs.
pub const LINK_COLOR: &str = "#084EBD";
/// Foreground applied to plain text runs.
pub const BODY_TEXT_COLOR: &str = "rgb(0, 0, 0)";
pub const TRANSPARENT_BACKGROUND: &str = "transparent";

/// Level-3 headings carry a fixed font size; levels 2 and 4 do not.
pub const H3_FONT_SIZE_PX: u32 = 22;

/// Per-unit table dimension hints, multiplied out by row/column counts.
pub const TABLE_COL_WIDTH_RATIO: u32 = 754;
pub const TABLE_ROW_HEIGHT: u32 = 47;
pub const TABLE_COL_MIN_WIDTH: u32 = 120;
pub const HEADER_CELL_BACKGROUND: &str = "#F2F2F2";

/// Substituted when a platform media reference carries no dimension
/// metadata; the substitution is logged where it happens.
pub const PLACEHOLDER_IMAGE_WIDTH: u32 = 1000;
pub const PLACEHOLDER_IMAGE_HEIGHT: u32 = 750;

/// Short node identifier in the platform's 8-hex-char form.
pub fn node_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// A converted document: an ordered block sequence in source order.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug)]
pub enum Block {
    Paragraph {
        id: String,
        inlines: Vec<TextRun>,
    },
    Heading {
        id: String,
        level: u8,
        inlines: Vec<TextRun>,
    },
    OrderedList {
        id: String,
        items: Vec<Vec<TextRun>>,
    },
    BulletedList {
        id: String,
        items: Vec<Vec<TextRun>>,
    },
    /// Rows hold cells, cells hold runs. Rectangular only up to the
    /// longest row; shorter rows are not padded.
    Table {
        id: String,
        rows: Vec<Vec<Vec<TextRun>>>,
    },
    Image {
        id: String,
        media: MediaReference,
        alt: String,
    },
    /// An empty paragraph used purely for vertical rhythm.
    Spacer {
        id: String,
    },
}

impl Block {
    pub fn paragraph(inlines: Vec<TextRun>) -> Self {
        Block::Paragraph {
            id: node_id(),
            inlines,
        }
    }

    pub fn heading(level: u8, inlines: Vec<TextRun>) -> Self {
        Block::Heading {
            id: node_id(),
            level,
            inlines,
        }
    }

    pub fn ordered_list(items: Vec<Vec<TextRun>>) -> Self {
        Block::OrderedList {
            id: node_id(),
            items,
        }
    }

    pub fn bulleted_list(items: Vec<Vec<TextRun>>) -> Self {
        Block::BulletedList {
            id: node_id(),
            items,
        }
    }

    pub fn table(rows: Vec<Vec<Vec<TextRun>>>) -> Self {
        Block::Table {
            id: node_id(),
            rows,
        }
    }

    pub fn image(media: MediaReference, alt: impl Into<String>) -> Self {
        Block::Image {
            id: node_id(),
            media,
            alt: alt.into(),
        }
    }

    pub fn spacer() -> Self {
        Block::Spacer { id: node_id() }
    }

    /// A paragraph with zero inlines is indistinguishable from a spacer.
    pub fn is_spacer(&self) -> bool {
        match self {
            Block::Spacer { .. } => true,
            Block::Paragraph { inlines, .. } => inlines.is_empty(),
            _ => false,
        }
    }
}

/// A run of text plus the style markers attached to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub decorations: Vec<Decoration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoration {
    Bold,
    Color {
        foreground: String,
        background: String,
    },
    /// Serialized with `target: BLANK` and `rel: { nofollow: true }`.
    Link {
        url: String,
    },
    Underline,
    FontSize {
        px: u32,
    },
}

static MEDIA_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9a-f]{4,}_[0-9a-f]{8,}~mv2(?:\.[a-z0-9]{2,5})?)").expect("media id regex")
});

/// A resolved pointer to an image asset. Exactly one shape per reference:
/// a fetchable URL, or an opaque platform media identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaReference {
    Url(String),
    Media {
        id: String,
        width: Option<u32>,
        height: Option<u32>,
        name: Option<String>,
    },
}

impl MediaReference {
    pub fn media(id: impl Into<String>) -> Self {
        MediaReference::Media {
            id: id.into(),
            width: None,
            height: None,
            name: None,
        }
    }

    /// Normalizes a raw caller-supplied value (hosted URL, bare media id,
    /// `wix:image://` reference) into exactly one of the two shapes.
    /// Untyped values never travel past this boundary.
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(id) = embedded_media_id(raw) {
            return MediaReference::media(id);
        }
        MediaReference::Url(raw.to_string())
    }
}

/// Extracts an embedded platform media id from a source string, with or
/// without a hosting URL around it.
pub(crate) fn embedded_media_id(src: &str) -> Option<String> {
    MEDIA_ID
        .captures(src)
        .map(|captures| captures[1].to_string())
}
