//! Image discovery and registration with the external hosting platform.
//!
//! Runs before conversion and produces the substitution map the resolver
//! consumes. The hosting wire protocol lives behind [`MediaHost`]; a
//! per-item failure falls back to the original source URL and is recorded
//! in the report list, never aborting the batch.

use std::collections::{HashMap, HashSet};

use kuchiki::traits::*;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::convert::images::{basename, is_absolute_url};

#[derive(Debug, Error)]
pub enum MediaHostError {
    #[error("media host request failed: {0}")]
    Request(String),
    #[error("media host response carried no usable url or id")]
    EmptyResponse,
}

/// What the hosting platform handed back for one imported file.
#[derive(Clone, Debug, Default)]
pub struct HostedMedia {
    pub url: Option<String>,
    pub media_id: Option<String>,
}

/// Boundary to the external hosting platform.
pub trait MediaHost {
    fn import_by_url(
        &mut self,
        source_url: &str,
        display_name: &str,
    ) -> Result<HostedMedia, MediaHostError>;
}

/// One line of the out-of-band upload diagnostics returned next to the map.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub name: String,
    pub original_src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Discovers `<img src>` references in document order, dedupes on
/// (src, basename), imports each through `host` and returns the
/// substitution map (keyed by both exact src and basename) plus the
/// per-item reports.
pub fn build_image_map(
    html: &str,
    base_url: Option<&str>,
    provided: &HashMap<String, String>,
    host: &mut dyn MediaHost,
) -> (HashMap<String, String>, Vec<UploadReport>) {
    let dom = kuchiki::parse_html().one(html.to_string());
    let mut seen = HashSet::new();
    let mut sources: Vec<(String, String)> = Vec::new();
    if let Ok(imgs) = dom.select("img") {
        for img in imgs {
            let attrs = img.attributes.borrow();
            let Some(src) = attrs.get("src").map(str::trim).filter(|s| !s.is_empty())
            else {
                continue;
            };
            let name = basename(src).to_string();
            if seen.insert((src.to_string(), name.clone())) {
                sources.push((src.to_string(), name));
            }
        }
    }

    let base = base_url.and_then(|raw| Url::parse(raw).ok());
    let mut map = HashMap::new();
    let mut reports = Vec::new();
    for (src, name) in sources {
        let source_url = provided
            .get(&src)
            .or_else(|| provided.get(&name))
            .cloned()
            .or_else(|| is_absolute_url(&src).then(|| src.clone()))
            .or_else(|| base.as_ref().and_then(|b| b.join(&src).ok()).map(String::from));
        let Some(source_url) = source_url else {
            log::debug!("no uploadable source for {:?}", src);
            continue;
        };
        let outcome = host
            .import_by_url(&source_url, &name)
            .and_then(|hosted| {
                if hosted.url.is_none() && hosted.media_id.is_none() {
                    Err(MediaHostError::EmptyResponse)
                } else {
                    Ok(hosted)
                }
            });
        match outcome {
            Ok(hosted) => {
                let value = hosted
                    .url
                    .clone()
                    .or_else(|| hosted.media_id.clone())
                    .unwrap_or_else(|| source_url.clone());
                map.insert(src.clone(), value.clone());
                map.insert(name.clone(), value);
                reports.push(UploadReport {
                    name,
                    original_src: src,
                    hosted_url: hosted.url,
                    hosted_id: hosted.media_id,
                    error: None,
                });
            }
            Err(err) => {
                log::warn!("media import failed for {:?}: {}", src, err);
                map.insert(src.clone(), source_url.clone());
                map.insert(name.clone(), source_url.clone());
                reports.push(UploadReport {
                    name,
                    original_src: src,
                    hosted_url: None,
                    hosted_id: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }
    (map, reports)
}
