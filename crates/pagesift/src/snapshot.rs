//! DOM snapshot: the in-page collection script and its typed result.
//!
//! One `page.evaluate` round trip gathers the raw element and stylesheet
//! data; everything semantic (classification, URL resolution, filtering)
//! happens afterwards in the pure passes of [`crate::extract`].

use serde::{Deserialize, Serialize};

/// Raw element and stylesheet data gathered from the live document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomSnapshot {
    /// `document.baseURI` — the resolution base for element attributes.
    pub base_url: String,
    /// `href` of every `link[rel~=stylesheet]`.
    pub stylesheet_links: Vec<String>,
    /// Every entry of `document.styleSheets`.
    pub sheets: Vec<SheetSnapshot>,
    /// `src` of every `script[src]`.
    pub scripts: Vec<String>,
    /// `src` of every `img[src]`.
    pub images: Vec<String>,
    /// `src` of every `video[src]`.
    pub videos: Vec<String>,
    /// Every `source[src]`, with its parent-element kind.
    pub sources: Vec<SourceSnapshot>,
    /// Raw `srcset` attribute values.
    pub srcsets: Vec<String>,
    /// `href` of every icon / apple-touch-icon link.
    pub icons: Vec<String>,
    /// `src` of every `iframe[src]`.
    pub iframes: Vec<String>,
    /// `href` of the manifest link, if any.
    pub manifest: Option<String>,
    /// `data` of every `object[data]`.
    pub objects: Vec<String>,
    /// `href` of every `a[href]`.
    pub anchors: Vec<String>,
}

/// One entry of `document.styleSheets`.
///
/// A cross-origin stylesheet whose rules cannot be read is reported with
/// `accessible: false` and empty rule lists — a capability check, not an
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetSnapshot {
    /// The stylesheet's own URL; `None` for inline `<style>` sheets.
    pub href: Option<String>,
    /// Whether the rule list could be read.
    pub accessible: bool,
    /// `href` of every `@import` rule.
    pub imports: Vec<String>,
    /// Raw `src` property value of every `@font-face` rule.
    pub font_face_srcs: Vec<String>,
    /// Style rules carrying background-image or content URLs.
    pub style_rules: Vec<StyleRuleSnapshot>,
}

/// The URL-bearing properties of one style rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleRuleSnapshot {
    pub background_image: Option<String>,
    pub content: Option<String>,
}

/// One `<source>` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSnapshot {
    pub url: String,
    /// True when the parent element is a `<video>`.
    pub parent_video: bool,
}

/// The collection script evaluated against the live document.
pub const SNAPSHOT_JS: &str = r#"(() => {
  const attr = (el, name) => {
    const v = el.getAttribute(name);
    return v && v.trim() ? v.trim() : null;
  };
  const out = {
    baseUrl: document.baseURI,
    stylesheetLinks: [],
    sheets: [],
    scripts: [],
    images: [],
    videos: [],
    sources: [],
    srcsets: [],
    icons: [],
    iframes: [],
    manifest: null,
    objects: [],
    anchors: []
  };
  for (const el of document.querySelectorAll('link[rel~="stylesheet"]')) {
    const href = attr(el, 'href');
    if (href) out.stylesheetLinks.push(href);
  }
  for (const sheet of document.styleSheets) {
    const s = { href: sheet.href, accessible: true, imports: [], fontFaceSrcs: [], styleRules: [] };
    let rules = null;
    try { rules = sheet.cssRules; } catch (_) { s.accessible = false; }
    if (rules) {
      for (const rule of rules) {
        if (rule instanceof CSSImportRule) {
          if (rule.href) s.imports.push(rule.href);
        } else if (rule instanceof CSSFontFaceRule) {
          const src = rule.style.getPropertyValue('src');
          if (src) s.fontFaceSrcs.push(src);
        } else if (rule instanceof CSSStyleRule) {
          const bg = rule.style.getPropertyValue('background-image');
          const content = rule.style.getPropertyValue('content');
          if ((bg && bg !== 'none') || content) {
            s.styleRules.push({ backgroundImage: bg || null, content: content || null });
          }
        }
      }
    }
    out.sheets.push(s);
  }
  for (const el of document.querySelectorAll('script[src]')) {
    const src = attr(el, 'src');
    if (src) out.scripts.push(src);
  }
  for (const el of document.querySelectorAll('img[src]')) {
    const src = attr(el, 'src');
    if (src) out.images.push(src);
  }
  for (const el of document.querySelectorAll('video[src]')) {
    const src = attr(el, 'src');
    if (src) out.videos.push(src);
  }
  for (const el of document.querySelectorAll('source[src]')) {
    const src = attr(el, 'src');
    if (src) out.sources.push({
      url: src,
      parentVideo: !!(el.parentElement && el.parentElement.tagName === 'VIDEO')
    });
  }
  for (const el of document.querySelectorAll('[srcset]')) {
    const v = attr(el, 'srcset');
    if (v) out.srcsets.push(v);
  }
  const iconSelector = 'link[rel~="icon"], link[rel~="apple-touch-icon"], link[rel~="apple-touch-icon-precomposed"]';
  for (const el of document.querySelectorAll(iconSelector)) {
    const href = attr(el, 'href');
    if (href) out.icons.push(href);
  }
  for (const el of document.querySelectorAll('iframe[src]')) {
    const src = attr(el, 'src');
    if (src) out.iframes.push(src);
  }
  const manifest = document.querySelector('link[rel~="manifest"]');
  if (manifest) out.manifest = attr(manifest, 'href');
  for (const el of document.querySelectorAll('object[data]')) {
    const data = attr(el, 'data');
    if (data) out.objects.push(data);
  }
  for (const el of document.querySelectorAll('a[href]')) {
    const href = attr(el, 'href');
    if (href) out.anchors.push(href);
  }
  return out;
})()"#;
