use std::collections::HashMap;

use kuchiki::{traits::*, NodeRef};
use serde::Deserialize;
use thiserror::Error;

use crate::types::{Block, Decoration, Document, H3_FONT_SIZE_PX};

pub(crate) mod images;
pub(crate) mod inline;
pub mod spacing;
mod table;

use images::ImageResolver;
use inline::InlineContext;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input HTML is empty")]
    EmptyInput,
}

/// Caller-supplied conversion inputs. Deserializes from the JSON payload
/// shape the surrounding service accepts, including its historical field
/// names.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConvertOptions {
    /// Base URL for resolving relative image sources.
    #[serde(default, alias = "baseUrl")]
    pub base_url: Option<String>,
    /// Raw image source (or basename) to hosted url / media id.
    #[serde(default, alias = "imageMap", alias = "image_url_map")]
    pub image_map: HashMap<String, String>,
    /// Pre-resolved references consumed front-to-back, one per image,
    /// in document order.
    #[serde(default, alias = "imageQueue", alias = "images")]
    pub image_queue: Vec<String>,
}

/// Converts an HTML fragment or document into an ordered block sequence.
///
/// Fails only on empty/whitespace-only input; any parseable HTML converts.
/// The call owns its substitution queue, so concurrent conversions are
/// independent.
pub fn convert(html: &str, options: ConvertOptions) -> Result<Document, ConvertError> {
    if html.trim().is_empty() {
        return Err(ConvertError::EmptyInput);
    }
    let dom = kuchiki::parse_html().one(html.to_string());
    let bold_class = inline::discover_bold_class(&dom);
    let ctx = InlineContext {
        bold_class: bold_class.as_deref(),
    };
    let mut resolver = ImageResolver::new(&options);

    let root = match dom.select_first("body") {
        Ok(body) => body.as_node().clone(),
        Err(()) => dom,
    };
    let mut normalizer = spacing::SpacingNormalizer::new();
    for child in root.children() {
        for block in element_blocks(&child, &ctx, &mut resolver) {
            normalizer.push(block);
        }
    }
    Ok(Document {
        blocks: normalizer.finish(),
    })
}

fn heading_level(tag: &str) -> Option<u8> {
    (tag.len() == 2 && tag.starts_with('h'))
        .then(|| tag[1..].parse::<u8>().ok())
        .flatten()
        .filter(|lvl| (1..=4).contains(lvl))
}

/// Translates one top-level element into zero or more blocks. Unrecognized
/// tags contribute nothing; nothing at this layer is fatal.
fn element_blocks(
    node: &NodeRef,
    ctx: &InlineContext<'_>,
    resolver: &mut ImageResolver,
) -> Vec<Block> {
    let Some(el) = node.as_element() else {
        return Vec::new();
    };
    let tag = el.name.local.to_lowercase();
    if let Some(level) = heading_level(&tag) {
        return heading_blocks(node, level, resolver);
    }
    match tag.as_str() {
        "p" => paragraph_blocks(node, ctx, resolver),
        "img" => image_block(node, resolver).into_iter().collect(),
        "ul" => table::list_block(node, ctx, false).into_iter().collect(),
        "ol" => table::list_block(node, ctx, true).into_iter().collect(),
        "table" => table::table_block(node, ctx).into_iter().collect(),
        _ => {
            log::debug!("skipping top-level <{}>", tag);
            Vec::new()
        }
    }
}

/// Detaches every `<img>` under `node` and returns the blocks the resolved
/// ones produce, in document order.
fn promote_images(node: &NodeRef, resolver: &mut ImageResolver) -> Vec<Block> {
    let imgs: Vec<_> = match node.select("img") {
        Ok(iter) => iter.collect(),
        Err(()) => Vec::new(),
    };
    let mut blocks = Vec::new();
    for img in imgs {
        if let Some(block) = image_block(img.as_node(), resolver) {
            blocks.push(block);
        }
        img.as_node().detach();
    }
    blocks
}

fn image_block(node: &NodeRef, resolver: &mut ImageResolver) -> Option<Block> {
    let el = node.as_element()?;
    let attrs = el.attributes.borrow();
    let src = attrs.get("src").map(str::trim).filter(|s| !s.is_empty())?;
    let alt = attrs.get("alt").unwrap_or("");
    match resolver.resolve(src) {
        Some(media) => Some(Block::image(media, alt)),
        None => {
            log::debug!("dropping image with unresolvable src {:?}", src);
            None
        }
    }
}

fn heading_blocks(node: &NodeRef, level: u8, resolver: &mut ImageResolver) -> Vec<Block> {
    let mut blocks = promote_images(node, resolver);
    let text = inline::collapse_whitespace(&node.text_contents());
    if !text.is_empty() {
        let mut run = inline::text_run(text, true, None, false);
        if level == 3 {
            run.decorations.push(Decoration::FontSize {
                px: H3_FONT_SIZE_PX,
            });
        }
        blocks.push(Block::heading(level, vec![run]));
    }
    blocks
}

fn paragraph_blocks(
    node: &NodeRef,
    ctx: &InlineContext<'_>,
    resolver: &mut ImageResolver,
) -> Vec<Block> {
    let mut blocks = promote_images(node, resolver);
    let runs = inline::extract_runs(node, ctx);
    if !runs.is_empty() {
        blocks.push(Block::paragraph(runs));
    }
    blocks
}
