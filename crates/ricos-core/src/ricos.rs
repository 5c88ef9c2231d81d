//! Emission of the platform's rich-content JSON schema.
//!
//! The document model stays typed up to this boundary; node ids for
//! generated sub-nodes (list items, rows, cells, wrapping paragraphs) are
//! minted here.

use serde_json::{json, Value};

use crate::types::{
    node_id, Block, Decoration, Document, MediaReference, TextRun, HEADER_CELL_BACKGROUND,
    PLACEHOLDER_IMAGE_HEIGHT, PLACEHOLDER_IMAGE_WIDTH, TABLE_COL_MIN_WIDTH,
    TABLE_COL_WIDTH_RATIO, TABLE_ROW_HEIGHT,
};

pub fn document_to_value(document: &Document) -> Value {
    json!({
        "nodes": document.blocks.iter().map(block_value).collect::<Vec<_>>(),
    })
}

fn block_value(block: &Block) -> Value {
    match block {
        Block::Paragraph { id, inlines } => paragraph_value(id, inlines),
        Block::Spacer { id } => paragraph_value(id, &[]),
        Block::Heading { id, level, inlines } => json!({
            "type": "HEADING",
            "id": id,
            "nodes": text_values(inlines),
            "style": {},
            "headingData": {
                "level": level,
                "textStyle": {"textAlignment": "AUTO"},
            },
        }),
        Block::OrderedList { id, items } => list_value(id, items, true),
        Block::BulletedList { id, items } => list_value(id, items, false),
        Block::Table { id, rows } => table_value(id, rows),
        Block::Image { id, media, alt } => image_value(id, media, alt),
    }
}

fn paragraph_value(id: &str, inlines: &[TextRun]) -> Value {
    json!({
        "type": "PARAGRAPH",
        "id": id,
        "nodes": text_values(inlines),
        "style": {},
    })
}

fn text_values(runs: &[TextRun]) -> Vec<Value> {
    runs.iter().map(text_value).collect()
}

fn text_value(run: &TextRun) -> Value {
    json!({
        "type": "TEXT",
        "id": "",
        "textData": {
            "text": run.text,
            "decorations": run.decorations.iter().map(decoration_value).collect::<Vec<_>>(),
        },
    })
}

fn decoration_value(decoration: &Decoration) -> Value {
    match decoration {
        Decoration::Bold => json!({"type": "BOLD", "fontWeightValue": 700}),
        Decoration::Color {
            foreground,
            background,
        } => json!({
            "type": "COLOR",
            "colorData": {"foreground": foreground, "background": background},
        }),
        Decoration::Link { url } => json!({
            "type": "LINK",
            "linkData": {
                "link": {"url": url, "target": "BLANK", "rel": {"nofollow": true}},
            },
        }),
        Decoration::Underline => json!({"type": "UNDERLINE"}),
        Decoration::FontSize { px } => json!({
            "type": "FONT_SIZE",
            "fontSizeData": {"unit": "PX", "value": px},
        }),
    }
}

fn list_value(id: &str, items: &[Vec<TextRun>], ordered: bool) -> Value {
    let list_type = if ordered { "ORDERED_LIST" } else { "BULLETED_LIST" };
    json!({
        "type": list_type,
        "id": id,
        "nodes": items.iter().map(|item| json!({
            "type": "LIST_ITEM",
            "id": node_id(),
            "nodes": [{
                "type": "PARAGRAPH",
                "id": node_id(),
                "nodes": text_values(item),
                "style": {"paddingTop": "0px", "paddingBottom": "0px"},
                "paragraphData": {"textStyle": {"lineHeight": "2"}},
            }],
        })).collect::<Vec<_>>(),
    })
}

fn table_value(id: &str, rows: &[Vec<Vec<TextRun>>]) -> Value {
    let num_rows = rows.len();
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    json!({
        "type": "TABLE",
        "id": id,
        "nodes": rows.iter().enumerate().map(|(row_index, row)| json!({
            "type": "TABLE_ROW",
            "id": node_id(),
            "nodes": row.iter().enumerate().map(|(col_index, cell)| json!({
                "type": "TABLE_CELL",
                "id": node_id(),
                "nodes": [{
                    "type": "PARAGRAPH",
                    "id": node_id(),
                    "nodes": text_values(cell),
                    "style": {},
                }],
                "tableCellData": {"cellStyle": cell_style(row_index, col_index)},
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
        "tableData": {
            "dimensions": {
                "colsWidthRatio": vec![TABLE_COL_WIDTH_RATIO; num_cols],
                "rowsHeight": vec![TABLE_ROW_HEIGHT; num_rows],
                "colsMinWidth": vec![TABLE_COL_MIN_WIDTH; num_cols],
            },
        },
    })
}

/// Header band: first row and first column.
fn cell_style(row_index: usize, col_index: usize) -> Value {
    if row_index == 0 || col_index == 0 {
        json!({
            "verticalAlignment": "TOP",
            "backgroundColor": HEADER_CELL_BACKGROUND,
        })
    } else {
        json!({})
    }
}

fn image_value(id: &str, media: &MediaReference, alt: &str) -> Value {
    let image = match media {
        MediaReference::Url(url) => json!({
            "src": {"url": url},
            "metadata": {"altText": alt},
        }),
        MediaReference::Media {
            id: media_id,
            width,
            height,
            name,
        } => {
            if width.is_none() || height.is_none() {
                log::debug!(
                    "applying placeholder dimensions to media {:?}",
                    media_id
                );
            }
            let mut metadata = json!({"altText": alt});
            if let Some(name) = name {
                metadata["displayName"] = json!(name);
            }
            json!({
                "src": {"id": media_id},
                "width": width.unwrap_or(PLACEHOLDER_IMAGE_WIDTH),
                "height": height.unwrap_or(PLACEHOLDER_IMAGE_HEIGHT),
                "metadata": metadata,
            })
        }
    };
    json!({
        "type": "IMAGE",
        "id": id,
        "imageData": {
            "containerData": {
                "width": {"size": "CONTENT"},
                "alignment": "CENTER",
                "textWrap": true,
            },
            "image": image,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::inline::text_run;

    #[test]
    fn paragraph_node_shape() {
        let document = Document {
            blocks: vec![Block::paragraph(vec![text_run("hello", false, None, false)])],
        };
        let value = document_to_value(&document);
        let node = &value["nodes"][0];
        assert_eq!(node["type"], "PARAGRAPH");
        assert_eq!(node["id"].as_str().unwrap().len(), 8);
        assert_eq!(node["style"], json!({}));
        let text = &node["nodes"][0];
        assert_eq!(text["type"], "TEXT");
        assert_eq!(text["id"], "");
        assert_eq!(text["textData"]["text"], "hello");
        let decorations = text["textData"]["decorations"].as_array().unwrap();
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0]["type"], "COLOR");
    }

    #[test]
    fn link_decoration_shape() {
        let run = text_run("go", false, Some("https://example.com/p"), true);
        let value = text_value(&run);
        let decorations = value["textData"]["decorations"].as_array().unwrap();
        let types: Vec<_> = decorations.iter().map(|d| d["type"].clone()).collect();
        assert_eq!(types, ["BOLD", "COLOR", "LINK", "UNDERLINE"]);
        assert_eq!(decorations[0]["fontWeightValue"], 700);
        assert_eq!(
            decorations[2]["linkData"]["link"],
            json!({"url": "https://example.com/p", "target": "BLANK", "rel": {"nofollow": true}})
        );
    }

    #[test]
    fn spacer_serializes_as_empty_paragraph() {
        let value = block_value(&Block::spacer());
        assert_eq!(value["type"], "PARAGRAPH");
        assert_eq!(value["nodes"], json!([]));
    }

    #[test]
    fn list_items_wrap_runs_in_tight_paragraphs() {
        let value = block_value(&Block::bulleted_list(vec![vec![text_run(
            "item", false, None, false,
        )]]));
        assert_eq!(value["type"], "BULLETED_LIST");
        let item = &value["nodes"][0];
        assert_eq!(item["type"], "LIST_ITEM");
        let wrapper = &item["nodes"][0];
        assert_eq!(wrapper["type"], "PARAGRAPH");
        assert_eq!(wrapper["style"]["paddingTop"], "0px");
        assert_eq!(wrapper["paragraphData"]["textStyle"]["lineHeight"], "2");
        assert_eq!(wrapper["nodes"][0]["textData"]["text"], "item");
    }

    #[test]
    fn table_dimensions_follow_row_and_column_counts() {
        let cell = |s: &str| vec![text_run(s, false, None, false)];
        let value = block_value(&Block::table(vec![
            vec![cell("a"), cell("b"), cell("c")],
            vec![cell("1"), cell("2")],
        ]));
        let dims = &value["tableData"]["dimensions"];
        assert_eq!(dims["colsWidthRatio"], json!([754, 754, 754]));
        assert_eq!(dims["rowsHeight"], json!([47, 47]));
        assert_eq!(dims["colsMinWidth"], json!([120, 120, 120]));
    }

    #[test]
    fn header_band_cells_are_styled() {
        let cell = |s: &str| vec![text_run(s, false, None, false)];
        let value = block_value(&Block::table(vec![
            vec![cell("h1"), cell("h2")],
            vec![cell("r"), cell("d")],
        ]));
        let style_of = |row: usize, col: usize| {
            value["nodes"][row]["nodes"][col]["tableCellData"]["cellStyle"].clone()
        };
        assert_eq!(style_of(0, 1)["verticalAlignment"], "TOP");
        assert_eq!(style_of(1, 0)["backgroundColor"], HEADER_CELL_BACKGROUND);
        assert_eq!(style_of(1, 1), json!({}));
    }

    #[test]
    fn url_image_shape() {
        let value = block_value(&Block::image(
            MediaReference::Url("https://example.com/a.png".into()),
            "alt text",
        ));
        assert_eq!(value["type"], "IMAGE");
        let image = &value["imageData"]["image"];
        assert_eq!(image["src"]["url"], "https://example.com/a.png");
        assert_eq!(image["metadata"]["altText"], "alt text");
        assert_eq!(
            value["imageData"]["containerData"]["width"]["size"],
            "CONTENT"
        );
    }

    #[test]
    fn media_image_gets_placeholder_dimensions() {
        let value = block_value(&Block::image(
            MediaReference::media("8bb438_8e70cf8ea4d94d47a5b0b72ebbbd31c2~mv2.jpg"),
            "",
        ));
        let image = &value["imageData"]["image"];
        assert_eq!(
            image["src"]["id"],
            "8bb438_8e70cf8ea4d94d47a5b0b72ebbbd31c2~mv2.jpg"
        );
        assert_eq!(image["width"], PLACEHOLDER_IMAGE_WIDTH);
        assert_eq!(image["height"], PLACEHOLDER_IMAGE_HEIGHT);
    }
}
