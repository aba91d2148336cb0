//! Pure DOM extraction passes.
//!
//! Each pass takes a slice of the [`DomSnapshot`](crate::snapshot::DomSnapshot)
//! plus a base URL and returns typed candidates. Passes are independent and
//! unioned in a fixed order by [`dom_resources`]; de-duplication happens in
//! the collector. A malformed item (empty attribute, unparseable URL,
//! `data:` scheme) is skipped individually — no pass ever fails as a whole.

use crate::snapshot::{DomSnapshot, SheetSnapshot, SourceSnapshot};
use crate::types::{Resource, ResourceType};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^'")][^)]*?))\s*\)"#).expect("valid regex")
});

/// Resolve a raw reference against a base, dropping empties, unparseable
/// URLs, and `data:` URLs.
fn resolve(base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let url = base.join(raw).ok()?;
    if url.scheme() == "data" {
        return None;
    }
    Some(url.into())
}

/// Resolution base for CSS-internal references: the stylesheet's own URL,
/// or the document base for inline stylesheets.
fn sheet_base(sheet: &SheetSnapshot, doc_base: &Url) -> Url {
    sheet
        .href
        .as_deref()
        .and_then(|href| Url::parse(href).ok())
        .unwrap_or_else(|| doc_base.clone())
}

/// Every `url(...)` token in a CSS property value.
fn css_urls(value: &str) -> Vec<&str> {
    CSS_URL_RE
        .captures_iter(value)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn resolved(kind: ResourceType, raws: &[String], base: &Url) -> Vec<Resource> {
    raws.iter()
        .filter_map(|raw| resolve(base, raw))
        .map(|url| Resource { kind, url })
        .collect()
}

/// `link[rel~=stylesheet]` hrefs → stylesheet.
pub fn stylesheet_links(hrefs: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Stylesheet, hrefs, base)
}

/// `@import` rules in readable stylesheets → stylesheet, resolved against
/// the owning sheet. Opaque (cross-origin) sheets contribute nothing.
pub fn stylesheet_imports(sheets: &[SheetSnapshot], doc_base: &Url) -> Vec<Resource> {
    let mut out = Vec::new();
    for sheet in sheets.iter().filter(|s| s.accessible) {
        let base = sheet_base(sheet, doc_base);
        for raw in &sheet.imports {
            if let Some(url) = resolve(&base, raw) {
                out.push(Resource::new(ResourceType::Stylesheet, url));
            }
        }
    }
    out
}

/// `script[src]` → script.
pub fn scripts(srcs: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Script, srcs, base)
}

/// `img[src]` → image.
pub fn images(srcs: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Image, srcs, base)
}

/// `video[src]` → video.
pub fn videos(srcs: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Video, srcs, base)
}

/// `<source>` elements: video when the parent is a `<video>`, else audio.
pub fn media_sources(sources: &[SourceSnapshot], base: &Url) -> Vec<Resource> {
    sources
        .iter()
        .filter_map(|s| {
            let kind = if s.parent_video {
                ResourceType::Video
            } else {
                ResourceType::Audio
            };
            resolve(base, &s.url).map(|url| Resource { kind, url })
        })
        .collect()
}

/// Responsive image candidates: the URL portion of each comma-separated
/// srcset entry, descriptors ignored.
pub fn srcset_candidates(srcsets: &[String], base: &Url) -> Vec<Resource> {
    let mut out = Vec::new();
    for value in srcsets {
        for candidate in value.split(',') {
            if let Some(raw) = candidate.trim().split_whitespace().next() {
                if let Some(url) = resolve(base, raw) {
                    out.push(Resource::new(ResourceType::Image, url));
                }
            }
        }
    }
    out
}

/// Background-image and generated-content `url(...)` references in
/// readable stylesheets → image, resolved against the owning sheet.
pub fn css_images(sheets: &[SheetSnapshot], doc_base: &Url) -> Vec<Resource> {
    let mut out = Vec::new();
    for sheet in sheets.iter().filter(|s| s.accessible) {
        let base = sheet_base(sheet, doc_base);
        for rule in &sheet.style_rules {
            for value in [rule.background_image.as_deref(), rule.content.as_deref()]
                .into_iter()
                .flatten()
            {
                for raw in css_urls(value) {
                    if let Some(url) = resolve(&base, raw) {
                        out.push(Resource::new(ResourceType::Image, url));
                    }
                }
            }
        }
    }
    out
}

/// `@font-face` `src` references in readable stylesheets → font.
pub fn font_faces(sheets: &[SheetSnapshot], doc_base: &Url) -> Vec<Resource> {
    let mut out = Vec::new();
    for sheet in sheets.iter().filter(|s| s.accessible) {
        let base = sheet_base(sheet, doc_base);
        for value in &sheet.font_face_srcs {
            for raw in css_urls(value) {
                if let Some(url) = resolve(&base, raw) {
                    out.push(Resource::new(ResourceType::Font, url));
                }
            }
        }
    }
    out
}

/// Icon links → favicon. Empty hrefs and `data:` URLs are dropped.
pub fn icons(hrefs: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Favicon, hrefs, base)
}

/// `iframe[src]` → iframe.
pub fn iframes(srcs: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Iframe, srcs, base)
}

/// The manifest link, at most one; absence is not an error.
pub fn manifest(href: Option<&str>, base: &Url) -> Vec<Resource> {
    href.and_then(|raw| resolve(base, raw))
        .map(|url| vec![Resource::new(ResourceType::Manifest, url)])
        .unwrap_or_default()
}

/// `object[data]` → object; an unparseable data URL skips the element.
pub fn objects(datas: &[String], base: &Url) -> Vec<Resource> {
    resolved(ResourceType::Object, datas, base)
}

/// Anchor hyperlink targets → link. `javascript:` and `data:` hrefs are
/// not navigable targets and are dropped.
pub fn anchors(hrefs: &[String], base: &Url) -> Vec<Resource> {
    hrefs
        .iter()
        .filter_map(|raw| {
            let url = base.join(raw.trim()).ok()?;
            match url.scheme() {
                "data" | "javascript" => None,
                _ => Some(Resource::new(ResourceType::Link, url)),
            }
        })
        .collect()
}

/// The full fixed battery of DOM passes (everything except anchors),
/// unioned in query order.
pub fn dom_resources(snapshot: &DomSnapshot, base: &Url) -> Vec<Resource> {
    let mut out = Vec::new();
    out.extend(stylesheet_links(&snapshot.stylesheet_links, base));
    out.extend(stylesheet_imports(&snapshot.sheets, base));
    out.extend(scripts(&snapshot.scripts, base));
    out.extend(images(&snapshot.images, base));
    out.extend(videos(&snapshot.videos, base));
    out.extend(media_sources(&snapshot.sources, base));
    out.extend(srcset_candidates(&snapshot.srcsets, base));
    out.extend(css_images(&snapshot.sheets, base));
    out.extend(font_faces(&snapshot.sheets, base));
    out.extend(icons(&snapshot.icons, base));
    out.extend(iframes(&snapshot.iframes, base));
    out.extend(manifest(snapshot.manifest.as_deref(), base));
    out.extend(objects(&snapshot.objects, base));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::StyleRuleSnapshot;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    #[test]
    fn test_stylesheet_links_resolve_against_page() {
        let out = stylesheet_links(
            &["a.css".into(), "/root.css".into(), "".into()],
            &base(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.com/page/a.css");
        assert_eq!(out[1].url, "https://example.com/root.css");
        assert!(out.iter().all(|r| r.kind == ResourceType::Stylesheet));
    }

    #[test]
    fn test_imports_resolve_against_owning_sheet() {
        let sheets = vec![
            SheetSnapshot {
                href: Some("https://example.com/css/a.css".into()),
                accessible: true,
                imports: vec!["b.css".into()],
                ..Default::default()
            },
            // inline <style> sheet: falls back to the document base
            SheetSnapshot {
                href: None,
                accessible: true,
                imports: vec!["c.css".into()],
                ..Default::default()
            },
        ];
        let out = stylesheet_imports(&sheets, &base());
        assert_eq!(out[0].url, "https://example.com/css/b.css");
        assert_eq!(out[1].url, "https://example.com/page/c.css");
    }

    #[test]
    fn test_opaque_sheets_are_silently_empty() {
        let sheets = vec![SheetSnapshot {
            href: Some("https://cdn.example.net/a.css".into()),
            accessible: false,
            imports: vec!["b.css".into()],
            font_face_srcs: vec!["url(f.woff2)".into()],
            style_rules: vec![StyleRuleSnapshot {
                background_image: Some("url(bg.png)".into()),
                content: None,
            }],
        }];
        assert!(stylesheet_imports(&sheets, &base()).is_empty());
        assert!(css_images(&sheets, &base()).is_empty());
        assert!(font_faces(&sheets, &base()).is_empty());
    }

    #[test]
    fn test_srcset_candidates_ignore_descriptors() {
        let out = srcset_candidates(&["x1.png 1x, x2.png 2x".into()], &base());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.com/page/x1.png");
        assert_eq!(out[1].url, "https://example.com/page/x2.png");
        assert!(out.iter().all(|r| r.kind == ResourceType::Image));
    }

    #[test]
    fn test_srcset_width_descriptors_and_whitespace() {
        let out = srcset_candidates(&["  a.jpg   480w ,b.jpg 800w".into()], &base());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.com/page/a.jpg");
        assert_eq!(out[1].url, "https://example.com/page/b.jpg");
    }

    #[test]
    fn test_css_urls_quoting_forms() {
        let urls = css_urls(r#"url("a.png"), url('b.png'), url( c.png )"#);
        assert_eq!(urls, vec!["a.png", "b.png", "c.png"]);
        assert!(css_urls("none").is_empty());
    }

    #[test]
    fn test_css_images_use_sheet_base_and_drop_data_urls() {
        let sheets = vec![SheetSnapshot {
            href: Some("https://example.com/css/site.css".into()),
            accessible: true,
            style_rules: vec![
                StyleRuleSnapshot {
                    background_image: Some("url(../img/bg.png)".into()),
                    content: None,
                },
                StyleRuleSnapshot {
                    background_image: Some("url(data:image/gif;base64,R0lGOD)".into()),
                    content: Some(r#"url("deco.svg")"#.into()),
                },
            ],
            ..Default::default()
        }];
        let out = css_images(&sheets, &base());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.com/img/bg.png");
        assert_eq!(out[1].url, "https://example.com/css/deco.svg");
    }

    #[test]
    fn test_font_faces() {
        let sheets = vec![SheetSnapshot {
            href: Some("https://example.com/css/site.css".into()),
            accessible: true,
            font_face_srcs: vec![r#"url("fonts/a.woff2") format("woff2"), url(fonts/a.woff)"#.into()],
            ..Default::default()
        }];
        let out = font_faces(&sheets, &base());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.com/css/fonts/a.woff2");
        assert_eq!(out[1].url, "https://example.com/css/fonts/a.woff");
        assert!(out.iter().all(|r| r.kind == ResourceType::Font));
    }

    #[test]
    fn test_icons_drop_data_and_empty() {
        let out = icons(
            &[
                "favicon.ico".into(),
                "data:image/png;base64,AAAA".into(),
                "   ".into(),
            ],
            &base(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://example.com/page/favicon.ico");
        assert_eq!(out[0].kind, ResourceType::Favicon);
    }

    #[test]
    fn test_media_sources_split_on_parent() {
        let sources = vec![
            SourceSnapshot {
                url: "clip.mp4".into(),
                parent_video: true,
            },
            SourceSnapshot {
                url: "song.ogg".into(),
                parent_video: false,
            },
        ];
        let out = media_sources(&sources, &base());
        assert_eq!(out[0].kind, ResourceType::Video);
        assert_eq!(out[1].kind, ResourceType::Audio);
    }

    #[test]
    fn test_objects_skip_unparseable_per_element() {
        let out = objects(&["file.pdf".into(), "https://[bad".into()], &base());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://example.com/page/file.pdf");
        assert_eq!(out[0].kind, ResourceType::Object);
    }

    #[test]
    fn test_manifest_at_most_one() {
        assert!(manifest(None, &base()).is_empty());
        let out = manifest(Some("e.webmanifest"), &base());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://example.com/page/e.webmanifest");
        assert_eq!(out[0].kind, ResourceType::Manifest);
    }

    #[test]
    fn test_anchors_drop_javascript_and_data() {
        let out = anchors(
            &[
                "/about".into(),
                "javascript:void(0)".into(),
                "data:text/plain,x".into(),
                "https://other.example.org/".into(),
            ],
            &base(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://example.com/about");
        assert_eq!(out[1].url, "https://other.example.org/");
        assert!(out.iter().all(|r| r.kind == ResourceType::Link));
    }

    #[test]
    fn test_emitted_urls_are_absolute() {
        // Re-resolving an emitted URL against an unrelated base is a no-op.
        let out = stylesheet_links(&["a.css".into()], &base());
        let other = Url::parse("https://unrelated.test/").unwrap();
        let again = other.join(&out[0].url).unwrap();
        assert_eq!(again.as_str(), out[0].url);
    }

    #[test]
    fn test_dom_battery_five_resources() {
        let snapshot = DomSnapshot {
            base_url: "https://example.com/".into(),
            stylesheet_links: vec!["a.css".into()],
            scripts: vec!["b.js".into()],
            images: vec!["c.png".into()],
            iframes: vec!["d.html".into()],
            manifest: Some("e.webmanifest".into()),
            ..Default::default()
        };
        let doc_base = Url::parse(&snapshot.base_url).unwrap();
        let out = dom_resources(&snapshot, &doc_base);
        assert_eq!(out.len(), 5);
        let kinds: Vec<_> = out.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceType::Stylesheet,
                ResourceType::Script,
                ResourceType::Image,
                ResourceType::Iframe,
                ResourceType::Manifest,
            ]
        );
        assert!(out.iter().all(|r| r.url.starts_with("https://example.com/")));
    }
}
