use std::collections::{HashMap, VecDeque};

use url::Url;

use crate::types::{embedded_media_id, MediaReference};

use super::ConvertOptions;

/// Stateful image-source resolution for one document traversal. The
/// substitution queue is owned here and consumed destructively, so each
/// queued entry feeds at most one image, in document order.
pub(crate) struct ImageResolver {
    map: HashMap<String, MediaReference>,
    queue: VecDeque<MediaReference>,
    base_url: Option<Url>,
}

impl ImageResolver {
    pub(crate) fn new(options: &ConvertOptions) -> Self {
        let map = options
            .image_map
            .iter()
            .map(|(key, value)| (key.clone(), MediaReference::classify(value)))
            .collect();
        let queue = options
            .image_queue
            .iter()
            .map(|value| MediaReference::classify(value))
            .collect();
        let base_url = options.base_url.as_deref().and_then(|raw| {
            match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    log::warn!("ignoring unparseable base url {:?}: {}", raw, err);
                    None
                }
            }
        });
        Self {
            map,
            queue,
            base_url,
        }
    }

    /// Resolution order: exact map key, basename map key, queue front,
    /// embedded media id, absolute URL, base join. Explicit map entries win
    /// over the queue; everything after the queue is best-effort
    /// passthrough. `None` means the image is dropped.
    pub(crate) fn resolve(&mut self, src: &str) -> Option<MediaReference> {
        if src.is_empty() {
            return None;
        }
        if let Some(found) = self.map.get(src) {
            return Some(found.clone());
        }
        if let Some(found) = self.map.get(basename(src)) {
            return Some(found.clone());
        }
        if let Some(queued) = self.queue.pop_front() {
            log::debug!("substituting queued media for {:?}", src);
            return Some(queued);
        }
        if let Some(id) = embedded_media_id(src) {
            return Some(MediaReference::media(id));
        }
        if is_absolute_url(src) {
            return Some(MediaReference::Url(src.to_string()));
        }
        if let Some(base) = &self.base_url {
            match base.join(src) {
                Ok(joined) => return Some(MediaReference::Url(joined.into())),
                Err(err) => {
                    log::warn!("cannot join {:?} against base url: {}", src, err)
                }
            }
        }
        None
    }
}

/// Scheme plus network location, nothing less.
pub(crate) fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).map(|url| url.has_host()).unwrap_or(false)
}

pub(crate) fn basename(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(
        map: &[(&str, &str)],
        queue: &[&str],
        base_url: Option<&str>,
    ) -> ConvertOptions {
        ConvertOptions {
            base_url: base_url.map(str::to_string),
            image_map: map
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            image_queue: queue.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn exact_map_key_wins_over_queue() {
        let mut resolver = ImageResolver::new(&options(
            &[("photos/a.png", "https://cdn.example/a.png")],
            &["https://cdn.example/queued.png"],
            None,
        ));
        assert_eq!(
            resolver.resolve("photos/a.png"),
            Some(MediaReference::Url("https://cdn.example/a.png".into()))
        );
        // The queue was not consulted.
        assert_eq!(
            resolver.resolve("other.png"),
            Some(MediaReference::Url("https://cdn.example/queued.png".into()))
        );
    }

    #[test]
    fn basename_key_matches_when_exact_key_does_not() {
        let mut resolver = ImageResolver::new(&options(
            &[("a.png", "https://cdn.example/a.png")],
            &[],
            None,
        ));
        assert_eq!(
            resolver.resolve("deep/nested/a.png"),
            Some(MediaReference::Url("https://cdn.example/a.png".into()))
        );
    }

    #[test]
    fn queue_drains_front_to_back() {
        let mut resolver =
            ImageResolver::new(&options(&[], &["https://cdn.example/1.png", "https://cdn.example/2.png"], None));
        assert_eq!(
            resolver.resolve("x.png"),
            Some(MediaReference::Url("https://cdn.example/1.png".into()))
        );
        assert_eq!(
            resolver.resolve("y.png"),
            Some(MediaReference::Url("https://cdn.example/2.png".into()))
        );
        // Queue exhausted; relative source with no base drops.
        assert_eq!(resolver.resolve("z.png"), None);
    }

    #[test]
    fn sniffs_embedded_media_ids() {
        let mut resolver = ImageResolver::new(&ConvertOptions::default());
        assert!(matches!(
            resolver.resolve(
                "https://static.wixstatic.com/media/8bb438_8e70cf8ea4d94d47a5b0b72ebbbd31c2~mv2.jpg"
            ),
            Some(MediaReference::Media { ref id, .. })
                if id == "8bb438_8e70cf8ea4d94d47a5b0b72ebbbd31c2~mv2.jpg"
        ));
    }

    #[test]
    fn passes_absolute_urls_through() {
        let mut resolver = ImageResolver::new(&ConvertOptions::default());
        assert_eq!(
            resolver.resolve("https://example.com/img/a.png"),
            Some(MediaReference::Url("https://example.com/img/a.png".into()))
        );
    }

    #[test]
    fn joins_relative_sources_against_the_base() {
        let mut resolver =
            ImageResolver::new(&options(&[], &[], Some("https://example.com/articles/post/")));
        assert_eq!(
            resolver.resolve("img/a.png"),
            Some(MediaReference::Url(
                "https://example.com/articles/post/img/a.png".into()
            ))
        );
    }

    #[test]
    fn unresolved_sources_drop() {
        let mut resolver = ImageResolver::new(&ConvertOptions::default());
        assert_eq!(resolver.resolve("img/a.png"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn scheme_without_host_is_not_absolute() {
        assert!(!is_absolute_url("mailto:someone@example.com"));
        assert!(!is_absolute_url("relative/path.png"));
        assert!(is_absolute_url("https://example.com/a.png"));
    }

    #[test]
    fn basename_strips_directories() {
        assert_eq!(basename("a/b/c.png"), "c.png");
        assert_eq!(basename("c.png"), "c.png");
    }
}
