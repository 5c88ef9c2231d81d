use kuchiki::NodeRef;

use crate::types::{Block, TextRun};

use super::inline::{extract_runs, InlineContext};

/// One item per direct `li` child; items with no content are dropped, and
/// an all-empty list produces no block.
pub(crate) fn list_block(
    node: &NodeRef,
    ctx: &InlineContext<'_>,
    ordered: bool,
) -> Option<Block> {
    let mut items: Vec<Vec<TextRun>> = Vec::new();
    for li in node.children() {
        if let Some(el) = li.as_element() {
            if el.name.local.as_ref() == "li" {
                let runs = extract_runs(&li, ctx);
                if !runs.is_empty() {
                    items.push(runs);
                }
            }
        }
    }
    if items.is_empty() {
        None
    } else if ordered {
        Some(Block::ordered_list(items))
    } else {
        Some(Block::bulleted_list(items))
    }
}

/// Header and data cells alike become run sequences; rows keep their own
/// lengths (no padding).
pub(crate) fn table_block(node: &NodeRef, ctx: &InlineContext<'_>) -> Option<Block> {
    let mut rows: Vec<Vec<Vec<TextRun>>> = Vec::new();
    if let Ok(trs) = node.select("tr") {
        for tr in trs {
            let mut cells: Vec<Vec<TextRun>> = Vec::new();
            for child in tr.as_node().children() {
                if let Some(el) = child.as_element() {
                    let tag = el.name.local.to_lowercase();
                    if tag == "td" || tag == "th" {
                        cells.push(extract_runs(&child, ctx));
                    }
                }
            }
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
    }
    if rows.is_empty() {
        None
    } else {
        Some(Block::table(rows))
    }
}
