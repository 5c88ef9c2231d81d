use kuchiki::NodeRef;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::types::{
    Decoration, TextRun, BODY_TEXT_COLOR, LINK_COLOR, TRANSPARENT_BACKGROUND,
};

/// First class selector whose declaration block carries a heavy
/// font-weight. The Google-Docs export pattern this discovery exists for.
static BOLD_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\.([A-Za-z][A-Za-z0-9_-]*)[^{}]*\{[^}]*font-weight\s*:\s*(?:bold|[6-9]00)")
        .expect("bold rule regex")
});

/// Per-document inline extraction inputs.
pub(crate) struct InlineContext<'a> {
    pub(crate) bold_class: Option<&'a str>,
}

impl InlineContext<'_> {
    /// True for a `<span>` carrying the discovered bold marker class.
    fn is_bold_wrapper(&self, node: &NodeRef) -> bool {
        let Some(class) = self.bold_class else {
            return false;
        };
        let Some(el) = node.as_element() else {
            return false;
        };
        if el.name.local.as_ref() != "span" {
            return false;
        }
        el.attributes
            .borrow()
            .get("class")
            .map(|attr| attr.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn has_bold_descendant(&self, node: &NodeRef) -> bool {
        if self.bold_class.is_none() {
            return false;
        }
        match node.select("span") {
            Ok(mut spans) => spans.any(|span| self.is_bold_wrapper(span.as_node())),
            Err(()) => false,
        }
    }
}

/// Scans embedded stylesheets for the bold marker class, once per document.
pub(crate) fn discover_bold_class(dom: &NodeRef) -> Option<String> {
    let styles = dom.select("style").ok()?;
    for style in styles {
        let css = style.as_node().text_contents();
        if let Some(captures) = BOLD_RULE.captures(&css) {
            let class = captures[1].to_string();
            log::debug!("bold marker class {:?} discovered from stylesheet", class);
            return Some(class);
        }
    }
    None
}

/// Walks a tag's children into an ordered run sequence. Line breaks and
/// images contribute nothing here; images belong to the block layer.
pub(crate) fn extract_runs(node: &NodeRef, ctx: &InlineContext<'_>) -> Vec<TextRun> {
    let mut runs = Vec::new();
    append_runs(node, ctx, &mut runs);
    runs
}

fn append_runs(node: &NodeRef, ctx: &InlineContext<'_>, out: &mut Vec<TextRun>) {
    for child in node.children() {
        if let Some(text) = child.as_text() {
            let text = text.borrow();
            if !text.trim().is_empty() {
                out.push(text_run(
                    text.clone(),
                    ctx.is_bold_wrapper(node),
                    None,
                    false,
                ));
            }
            continue;
        }
        let Some(el) = child.as_element() else {
            continue;
        };
        let tag = el.name.local.to_lowercase();
        match tag.as_str() {
            "br" | "img" => {}
            "a" => {
                let href = el.attributes.borrow().get("href").map(|s| s.trim().to_string());
                match href {
                    Some(href) if !href.is_empty() => {
                        let label = child.text_contents();
                        if !label.trim().is_empty() {
                            let target = unwrap_redirect(&href);
                            out.push(text_run(
                                label,
                                ctx.has_bold_descendant(&child),
                                Some(&target),
                                true,
                            ));
                        }
                    }
                    _ => append_runs(&child, ctx, out),
                }
            }
            _ => append_runs(&child, ctx, out),
        }
    }
}

/// De-redirects and percent-decodes an anchor target. An href whose path is
/// `/url` with a `q=` parameter unwraps to that parameter's decoded value;
/// anything else decodes as-is.
pub(crate) fn unwrap_redirect(href: &str) -> String {
    if let Ok(parsed) = Url::parse(href) {
        if parsed.path() == "/url" {
            if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "q") {
                return target.into_owned();
            }
        }
    }
    percent_decode_str(href).decode_utf8_lossy().into_owned()
}

/// Base decoration set for a run: bold, color, link, underline, in that
/// order. Links always render emphasized and always open in a new tab with
/// nofollow.
pub(crate) fn base_decorations(
    bold: bool,
    is_link: bool,
    link_url: Option<&str>,
    underline: bool,
) -> Vec<Decoration> {
    let mut decorations = Vec::new();
    if bold || is_link {
        decorations.push(Decoration::Bold);
    }
    decorations.push(Decoration::Color {
        foreground: if is_link { LINK_COLOR } else { BODY_TEXT_COLOR }.to_string(),
        background: TRANSPARENT_BACKGROUND.to_string(),
    });
    if is_link {
        if let Some(url) = link_url.filter(|u| !u.is_empty()) {
            decorations.push(Decoration::Link {
                url: url.to_string(),
            });
        }
    }
    if underline {
        decorations.push(Decoration::Underline);
    }
    decorations
}

pub(crate) fn text_run(
    text: impl Into<String>,
    bold: bool,
    link: Option<&str>,
    underline: bool,
) -> TextRun {
    TextRun {
        text: text.into(),
        decorations: base_decorations(bold, link.is_some(), link, underline),
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
