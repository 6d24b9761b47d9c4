//! SEO, UX, accessibility, mobile and performance red flags.
//!
//! Every rule is independent and evaluated in a fixed order; thresholds are
//! literal. A rule that reports a count attaches it to the flag.

use tracing::debug;
use url::Url;

use super::{Extractor, ExtractorKind};
use crate::css;
use crate::types::{Document, DomNode, InspectionData, RedFlag, RedFlagCategory, Severity};
use crate::Result;

use RedFlagCategory::{Accessibility, Mobile, Performance, Seo, Ux};
use Severity::{Critical, Info, Warning};

const GENERIC_LINK_TEXT: [&str; 4] = ["click here", "here", "read more", "more"];
const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const INTERACTIVE: [&str; 5] = ["button", "a", "input", "select", "textarea"];
const SMALL_TEXT_TAGS: [&str; 4] = ["p", "span", "div", "li"];
const INLINE_HANDLERS: [&str; 4] = ["onclick", "onmouseover", "onload", "onerror"];
const OLD_IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

const SHORT_META_DESCRIPTION: usize = 50;
const LONG_META_DESCRIPTION: usize = 160;
const LONG_TITLE: usize = 60;
const SHORT_TITLE: usize = 30;
const MIN_TEXT_RATIO: f64 = 10.0;
const MIN_CONTRAST_DELTA: u64 = 150;
const MIN_FONT_SIZE: f64 = 12.0;
const MIN_TOUCH_TARGET: f32 = 44.0;
const LARGE_DATA_URL: usize = 100_000;
const MAX_DOM_NODES: usize = 1500;

pub struct RedFlagDetector;

impl Extractor for RedFlagDetector {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::RedFlags
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.red_flags = detect_red_flags(doc);
        Ok(())
    }
}

#[derive(Default)]
struct Flags(Vec<RedFlag>);

impl Flags {
    fn push(
        &mut self,
        id: &str,
        category: RedFlagCategory,
        severity: Severity,
        title: &str,
        description: impl Into<String>,
        recommendation: &str,
    ) -> &mut RedFlag {
        self.0.push(RedFlag {
            id: id.to_string(),
            category,
            severity,
            title: title.to_string(),
            description: description.into(),
            element: None,
            count: None,
            recommendation: recommendation.to_string(),
        });
        let last = self.0.len() - 1;
        &mut self.0[last]
    }

    /// Pushes a counted flag when `count` exceeds `threshold`.
    #[allow(clippy::too_many_arguments)]
    fn counted(
        &mut self,
        count: usize,
        threshold: usize,
        id: &str,
        category: RedFlagCategory,
        severity: Severity,
        title: &str,
        description: String,
        recommendation: &str,
    ) {
        if count > threshold {
            self.push(id, category, severity, title, description, recommendation)
                .count = Some(count);
        }
    }
}

pub fn detect_red_flags(doc: &Document<'_>) -> Vec<RedFlag> {
    let mut flags = Flags::default();
    seo_rules(doc, &mut flags);
    ux_rules(doc, &mut flags);
    accessibility_rules(doc, &mut flags);
    mobile_rules(doc, &mut flags);
    performance_rules(doc, &mut flags);
    debug!(count = flags.0.len(), "red flags detected");
    flags.0
}

/// Most severe flag, if any.
pub fn worst_severity(flags: &[RedFlag]) -> Option<Severity> {
    flags.iter().map(|f| f.severity).max()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn heading_level(node: &DomNode) -> Option<u32> {
    let tag = node.tag.to_ascii_lowercase();
    let level = tag.strip_prefix('h')?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn seo_rules(doc: &Document<'_>, flags: &mut Flags) {
    let h1_count = doc.by_tag("h1").count();
    if h1_count == 0 {
        flags.push(
            "seo-missing-h1",
            Seo,
            Critical,
            "Missing H1 Tag",
            "No H1 tag found on the page",
            "Add exactly one H1 tag as the main page heading",
        );
    } else {
        flags.counted(
            h1_count,
            1,
            "seo-multiple-h1",
            Seo,
            Warning,
            "Multiple H1 Tags",
            format!("Found {h1_count} H1 tags on the page"),
            "Use only one H1 tag per page for better SEO",
        );
    }

    let levels: Vec<u32> = doc.by_tags(&HEADINGS).filter_map(heading_level).collect();
    if let Some(pair) = levels.windows(2).find(|w| w[1] > w[0] + 1) {
        flags.push(
            "seo-heading-skip",
            Seo,
            Warning,
            "Broken Heading Hierarchy",
            format!("Heading skips from H{} to H{}", pair[0], pair[1]),
            "Use sequential heading levels (H1 → H2 → H3)",
        );
    }

    let meta_description = doc.meta("name", "description");
    let description_len = meta_description
        .map(|m| char_len(m.attr("content").unwrap_or("")))
        .unwrap_or(0);
    match meta_description {
        None => {
            flags.push(
                "seo-missing-meta-description",
                Seo,
                Critical,
                "Missing Meta Description",
                "No meta description found",
                "Add a meta description (150-160 characters)",
            );
        }
        Some(_) if description_len < SHORT_META_DESCRIPTION => {
            flags.push(
                "seo-short-meta-description",
                Seo,
                Warning,
                "Short Meta Description",
                format!("Meta description is only {description_len} characters"),
                "Use 150-160 characters for optimal display",
            );
        }
        Some(_) => {}
    }

    let title_text = doc.first_by_tag("title").map(|t| doc.text_content(t));
    let title_text = title_text.as_deref().map(str::trim).unwrap_or("");
    if title_text.is_empty() {
        flags.push(
            "seo-missing-title",
            Seo,
            Critical,
            "Missing Title Tag",
            "No title tag found",
            "Add a descriptive title tag (50-60 characters)",
        );
    }

    let images: Vec<&DomNode> = doc.by_tag("img").collect();
    let without_alt = images.iter().filter(|i| !i.has_attr("alt")).count();
    flags.counted(
        without_alt,
        0,
        "seo-missing-alt",
        Seo,
        Warning,
        "Images Without Alt Text",
        format!("{without_alt} images missing alt attributes"),
        "Add descriptive alt text to all images",
    );

    let links: Vec<&DomNode> = doc.by_tag("a").collect();
    let generic = links
        .iter()
        .filter(|a| {
            let text = doc.text_content(a).to_lowercase();
            GENERIC_LINK_TEXT.contains(&text.trim())
        })
        .count();
    flags.counted(
        generic,
        0,
        "seo-generic-links",
        Seo,
        Info,
        "Generic Link Text",
        format!("{generic} links use generic text like \"click here\""),
        "Use descriptive link text that explains the destination",
    );

    if !title_text.is_empty() {
        let length = char_len(title_text);
        if length > LONG_TITLE {
            flags.push(
                "seo-title-too-long",
                Seo,
                Warning,
                "Title Tag Too Long",
                format!("Title is {length} characters (recommended: 50-60)"),
                "Shorten title to 50-60 characters to avoid truncation in search results",
            );
        }
        if length < SHORT_TITLE {
            flags.push(
                "seo-title-too-short",
                Seo,
                Info,
                "Title Tag Too Short",
                format!("Title is only {length} characters"),
                "Use 50-60 characters to maximize SEO value",
            );
        }
    }

    if meta_description.is_some() && description_len > LONG_META_DESCRIPTION {
        flags.push(
            "seo-meta-desc-too-long",
            Seo,
            Warning,
            "Meta Description Too Long",
            format!("Meta description is {description_len} characters (recommended: 150-160)"),
            "Shorten to 150-160 characters to avoid truncation",
        );
    }

    if doc.links_with_rel("canonical").next().is_none() {
        flags.push(
            "seo-missing-canonical",
            Seo,
            Warning,
            "Missing Canonical URL",
            "No canonical link tag found",
            "Add <link rel=\"canonical\" href=\"...\"> to prevent duplicate content issues",
        );
    }

    let og = |p: &str| doc.meta("property", p).is_some();
    let og_image = og("og:image");
    if !og("og:title") && !og("og:description") && !og_image {
        flags.push(
            "seo-missing-og-tags",
            Seo,
            Warning,
            "Missing Open Graph Tags",
            "No Open Graph meta tags found",
            "Add og:title, og:description, og:image for better social media sharing",
        );
    } else if !og_image {
        flags.push(
            "seo-missing-og-image",
            Seo,
            Info,
            "Missing Open Graph Image",
            "No og:image meta tag found",
            "Add og:image for social media preview images",
        );
    }

    if doc.meta("name", "twitter:card").is_none() {
        flags.push(
            "seo-missing-twitter-card",
            Seo,
            Info,
            "Missing Twitter Card",
            "No Twitter Card meta tags found",
            "Add twitter:card meta tag for better Twitter previews",
        );
    }

    if let Some(robots) = doc.meta("name", "robots") {
        let content = robots.attr("content").unwrap_or("");
        if content.contains("noindex") {
            flags.push(
                "seo-noindex",
                Seo,
                Critical,
                "Page Set to Noindex",
                "Robots meta tag contains \"noindex\"",
                "Remove noindex if you want this page to appear in search results",
            );
        }
        if content.contains("nofollow") {
            flags.push(
                "seo-nofollow",
                Seo,
                Warning,
                "Page Set to Nofollow",
                "Robots meta tag contains \"nofollow\"",
                "Links on this page won't pass SEO value",
            );
        }
    }

    let scripts: Vec<&DomNode> = doc.by_tag("script").collect();
    if !scripts
        .iter()
        .any(|s| s.attr("type") == Some("application/ld+json"))
    {
        flags.push(
            "seo-missing-structured-data",
            Seo,
            Info,
            "Missing Structured Data",
            "No JSON-LD structured data found",
            "Add Schema.org structured data for rich search results",
        );
    }

    let lang = doc.root().and_then(|r| r.attr("lang")).unwrap_or("");
    if lang.is_empty() {
        flags.push(
            "seo-missing-lang",
            Seo,
            Warning,
            "Missing Language Attribute",
            "No lang attribute on <html> element",
            "Add lang=\"en\" (or appropriate language) to <html> tag",
        );
    }

    let empty_links = links
        .iter()
        .filter(|a| match a.attr("href") {
            None => true,
            Some(href) => href.is_empty() || href == "#" || href == "javascript:void(0)",
        })
        .count();
    flags.counted(
        empty_links,
        3,
        "seo-empty-links",
        Seo,
        Warning,
        "Empty or Placeholder Links",
        format!("{empty_links} links have empty or placeholder hrefs"),
        "Add meaningful URLs to all links or use buttons for non-navigation actions",
    );

    let broken = links
        .iter()
        .filter_map(|a| a.attr("href"))
        .filter(|href| href.starts_with('/'))
        .filter(|href| href.contains("undefined") || href.contains("null") || href.ends_with("/."))
        .count();
    flags.counted(
        broken,
        0,
        "seo-potential-broken-links",
        Seo,
        Warning,
        "Potentially Broken Links",
        format!("{broken} links may be broken (contain undefined/null)"),
        "Check and fix these internal links",
    );

    let no_dimensions = images
        .iter()
        .filter(|i| !i.has_attr("width") && !i.has_attr("height"))
        .count();
    flags.counted(
        no_dimensions,
        5,
        "seo-images-no-dimensions",
        Seo,
        Info,
        "Images Without Dimensions",
        format!("{no_dimensions} images missing width/height attributes"),
        "Add width and height attributes to prevent layout shifts (CLS)",
    );

    let descriptions = doc
        .by_tag("meta")
        .filter(|m| m.attr("name") == Some("description"))
        .count();
    flags.counted(
        descriptions,
        1,
        "seo-duplicate-meta-desc",
        Seo,
        Warning,
        "Duplicate Meta Descriptions",
        format!("Found {descriptions} meta description tags"),
        "Use only one meta description per page",
    );

    if doc.links_with_rel("icon").next().is_none()
        && doc.links_with_rel("shortcut icon").next().is_none()
    {
        flags.push(
            "seo-missing-favicon",
            Seo,
            Info,
            "Missing Favicon",
            "No favicon link found",
            "Add a favicon for better branding and bookmarks",
        );
    }

    let unsafe_blank = links
        .iter()
        .filter(|a| a.attr("target") == Some("_blank"))
        .filter(|a| {
            let rel = a.attr("rel").unwrap_or("");
            !rel.contains("noopener") && !rel.contains("noreferrer")
        })
        .count();
    flags.counted(
        unsafe_blank,
        0,
        "seo-external-links-security",
        Seo,
        Warning,
        "External Links Missing Security",
        format!("{unsafe_blank} external links missing rel=\"noopener\""),
        "Add rel=\"noopener noreferrer\" to target=\"_blank\" links for security",
    );

    let h2_count = doc.by_tag("h2").count();
    flags.counted(
        h2_count,
        15,
        "seo-too-many-h2",
        Seo,
        Info,
        "Many H2 Tags",
        format!("Page has {h2_count} H2 headings"),
        "Consider if all H2s are necessary; too many dilutes importance",
    );

    let empty_headings = doc
        .by_tags(&HEADINGS)
        .filter(|h| doc.text_content(h).trim().is_empty())
        .count();
    flags.counted(
        empty_headings,
        0,
        "seo-empty-headings",
        Seo,
        Warning,
        "Empty Headings",
        format!("{empty_headings} headings have no text content"),
        "Add meaningful text to all headings or remove empty ones",
    );

    let url = doc.url().to_lowercase();
    if url.contains('?') && url.contains("id=") {
        flags.push(
            "seo-non-descriptive-url",
            Seo,
            Info,
            "Non-Descriptive URL",
            "URL contains query parameters instead of descriptive paths",
            "Consider using clean, descriptive URLs for better SEO",
        );
    }

    if !doc.by_tag("meta").any(|m| m.has_attr("charset")) {
        flags.push(
            "seo-missing-charset",
            Seo,
            Warning,
            "Missing Charset Declaration",
            "No charset meta tag found",
            "Add <meta charset=\"UTF-8\"> at the start of <head>",
        );
    }

    let has_hreflang = doc.by_tag("link").any(|l| l.has_attr("hreflang"));
    let lang_elements = doc.elements().filter(|n| n.has_attr("lang")).count();
    if lang_elements > 2 && !has_hreflang {
        flags.push(
            "seo-missing-hreflang",
            Seo,
            Info,
            "Missing Hreflang Tags",
            "Multilingual content detected but no hreflang tags found",
            "Add hreflang tags for language targeting in search engines",
        );
    }

    if let Some(ratio) = text_ratio(doc) {
        if ratio < MIN_TEXT_RATIO {
            flags.push(
                "seo-low-text-ratio",
                Seo,
                Info,
                "Low Text-to-HTML Ratio",
                format!("Text content is only {ratio:.1}% of page size"),
                "Add more meaningful text content for better SEO",
            );
        }
    }
}

/// Body text length as a percentage of the serialized document length.
fn text_ratio(doc: &Document<'_>) -> Option<f64> {
    let snapshot = doc.snapshot();
    if snapshot.html_length == 0 {
        return None;
    }
    let text_len = snapshot.body_text_length.unwrap_or_else(|| {
        doc.body()
            .map(|b| char_len(&doc.text_content(b)))
            .unwrap_or(0)
    });
    Some(text_len as f64 / snapshot.html_length as f64 * 100.0)
}

/// Concatenated inline script source.
fn inline_script_text(doc: &Document<'_>) -> String {
    doc.by_tag("script")
        .map(|s| s.text.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ux_rules(doc: &Document<'_>, flags: &mut Flags) {
    let scripts = inline_script_text(doc);
    if scripts.contains("alert(") || scripts.contains("confirm(") || scripts.contains("prompt(") {
        flags.push(
            "ux-native-dialogs",
            Ux,
            Warning,
            "Native Browser Dialogs",
            "Using alert(), confirm(), or prompt()",
            "Use custom modal dialogs for better UX",
        );
    }

    let unlabeled = doc
        .elements()
        .filter(|n| {
            (n.is("input") && n.attr("type") != Some("hidden")) || n.is("textarea") || n.is("select")
        })
        .filter(|field| match field.element_id() {
            None => true,
            Some(id) => {
                let labelled = doc
                    .by_tag("label")
                    .any(|l| l.attr("for") == Some(id));
                !labelled && !doc.has_ancestor(field, "label")
            }
        })
        .count();
    flags.counted(
        unlabeled,
        0,
        "ux-missing-labels",
        Ux,
        Warning,
        "Form Fields Without Labels",
        format!("{unlabeled} form fields missing labels"),
        "Add labels to all form inputs for better UX",
    );

    let link_like = doc
        .by_tag("button")
        .filter(|b| b.style("text-decoration") == "underline" || b.style("border") == "none")
        .count();
    flags.counted(
        link_like,
        5,
        "ux-button-link-confusion",
        Ux,
        Info,
        "Buttons Styled as Links",
        format!("{link_like} buttons may look like links"),
        "Make buttons look like buttons for clarity",
    );
}

fn accessibility_rules(doc: &Document<'_>, flags: &mut Flags) {
    let unlabeled = doc
        .by_tags(&INTERACTIVE)
        .filter(|el| {
            !el.has_attr("aria-label")
                && !el.has_attr("aria-labelledby")
                && !el.has_attr("alt")
                && doc.text_content(el).trim().is_empty()
        })
        .count();
    flags.counted(
        unlabeled,
        0,
        "a11y-missing-aria",
        Accessibility,
        Warning,
        "Interactive Elements Without Labels",
        format!("{unlabeled} interactive elements have no accessible labels"),
        "Add aria-label or visible text to all interactive elements",
    );

    let suspicious = doc
        .elements()
        .filter(|n| {
            let color = n.style("color");
            let background = n.style("background-color");
            color.contains("rgb")
                && background.contains("rgb")
                && css::digit_sum(color).abs_diff(css::digit_sum(background)) < MIN_CONTRAST_DELTA
        })
        .count();
    if suspicious > 10 {
        flags.push(
            "a11y-low-contrast",
            Accessibility,
            Info,
            "Potential Contrast Issues",
            "Some text may have insufficient contrast",
            "Ensure text contrast ratio is at least 4.5:1",
        );
    }
}

fn mobile_rules(doc: &Document<'_>, flags: &mut Flags) {
    if doc.meta("name", "viewport").is_none() {
        flags.push(
            "mobile-missing-viewport",
            Mobile,
            Critical,
            "Missing Viewport Meta Tag",
            "No viewport meta tag found",
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
        );
    }

    let small_text = doc
        .by_tags(&SMALL_TEXT_TAGS)
        .filter(|n| css::parse_float(n.style("font-size")).is_some_and(|size| size < MIN_FONT_SIZE))
        .count();
    flags.counted(
        small_text,
        10,
        "mobile-small-text",
        Mobile,
        Warning,
        "Text Too Small",
        format!("{small_text} elements have font size < 12px"),
        "Use minimum 14px font size for mobile readability",
    );

    let small_targets = doc
        .elements()
        .filter(|n| {
            n.is("button")
                || n.is("a")
                || (n.is("input") && matches!(n.attr("type"), Some("button") | Some("submit")))
        })
        .filter(|n| {
            n.bounding_box.width < MIN_TOUCH_TARGET || n.bounding_box.height < MIN_TOUCH_TARGET
        })
        .count();
    flags.counted(
        small_targets,
        5,
        "mobile-small-targets",
        Mobile,
        Warning,
        "Touch Targets Too Small",
        format!("{small_targets} interactive elements smaller than 44x44px"),
        "Make touch targets at least 44x44px for mobile",
    );
}

fn performance_rules(doc: &Document<'_>, flags: &mut Flags) {
    let images: Vec<&DomNode> = doc.by_tag("img").collect();
    let src = |img: &DomNode| img.attr("src").unwrap_or("").to_string();

    let large_inline = images
        .iter()
        .filter(|i| {
            let s = src(i);
            s.starts_with("data:") && s.len() > LARGE_DATA_URL
        })
        .count();
    flags.counted(
        large_inline,
        0,
        "perf-large-images",
        Performance,
        Info,
        "Large Inline Images",
        format!("{large_inline} images embedded as large data URLs"),
        "Use external image files and optimize with modern formats (WebP, AVIF)",
    );

    let dom_size = doc.len();
    flags.counted(
        dom_size,
        MAX_DOM_NODES,
        "perf-large-dom",
        Performance,
        Warning,
        "Large DOM Size",
        format!("Page has {dom_size} DOM nodes"),
        "Reduce DOM size to < 1500 nodes for better performance",
    );

    let blocking = doc
        .by_tag("script")
        .filter(|s| doc.in_head(s) && !s.has_attr("async") && !s.has_attr("defer"))
        .count();
    flags.counted(
        blocking,
        0,
        "perf-blocking-scripts",
        Performance,
        Warning,
        "Render-Blocking Scripts",
        format!("{blocking} scripts in <head> without async/defer"),
        "Add async or defer attributes to non-critical scripts",
    );

    let old_formats = images
        .iter()
        .filter(|i| {
            let s = src(i).to_lowercase();
            OLD_IMAGE_EXTENSIONS.iter().any(|ext| s.ends_with(ext))
        })
        .count();
    flags.counted(
        old_formats,
        5,
        "perf-old-image-formats",
        Performance,
        Info,
        "Images Using Old Formats",
        format!("{old_formats} images use JPG/PNG/GIF instead of WebP/AVIF"),
        "Convert images to WebP or AVIF for 25-50% smaller file sizes",
    );

    let eager = images
        .iter()
        .filter(|i| {
            let s = src(i);
            i.attr("loading").map_or(true, str::is_empty) && !s.is_empty() && !s.starts_with("data:")
        })
        .count();
    flags.counted(
        eager,
        5,
        "perf-no-lazy-loading",
        Performance,
        Warning,
        "Images Without Lazy Loading",
        format!("{eager} images missing loading=\"lazy\" attribute"),
        "Add loading=\"lazy\" to images below the fold to improve initial load time",
    );

    let third_party = third_party_scripts(doc);
    flags.counted(
        third_party,
        5,
        "perf-many-third-party-scripts",
        Performance,
        Warning,
        "Many Third-Party Scripts",
        format!("{third_party} external scripts from other domains"),
        "Reduce third-party scripts or load them asynchronously to improve performance",
    );

    let iframes = doc.by_tag("iframe").count();
    flags.counted(
        iframes,
        3,
        "perf-many-iframes",
        Performance,
        Info,
        "Multiple Iframes",
        format!("Page has {iframes} iframes which can slow loading"),
        "Consider lazy-loading iframes or replacing with native implementations",
    );

    let stylesheets = doc.links_with_rel("stylesheet").count();
    flags.counted(
        stylesheets,
        10,
        "perf-many-stylesheets",
        Performance,
        Warning,
        "Many CSS Stylesheets",
        format!("{stylesheets} separate stylesheet files"),
        "Bundle stylesheets to reduce HTTP requests",
    );

    let inline_styles = doc.elements().filter(|n| n.has_attr("style")).count();
    flags.counted(
        inline_styles,
        50,
        "perf-excessive-inline-styles",
        Performance,
        Info,
        "Many Inline Styles",
        format!("{inline_styles} elements have inline styles"),
        "Move inline styles to CSS classes for better caching",
    );

    let font_hrefs: Vec<&str> = doc
        .by_tag("link")
        .filter_map(|l| l.attr("href"))
        .filter(|h| h.contains("fonts.googleapis.com") || h.contains("fonts.gstatic.com"))
        .collect();
    if !font_hrefs.is_empty() && !font_hrefs.iter().any(|h| h.contains("display=")) {
        flags.push(
            "perf-fonts-no-display",
            Performance,
            Warning,
            "Web Fonts Without font-display",
            "Google Fonts loaded without display parameter",
            "Add &display=swap to Google Fonts URLs to prevent FOIT",
        );
    }

    let eager_videos = doc
        .by_tag("video")
        .filter(|v| matches!(v.attr("preload"), None | Some("") | Some("auto")))
        .count();
    flags.counted(
        eager_videos,
        0,
        "perf-video-preload",
        Performance,
        Info,
        "Videos Without Optimal Preload",
        format!("{eager_videos} videos may be loading unnecessarily"),
        "Add preload=\"none\" or preload=\"metadata\" to videos not immediately visible",
    );

    let handlers = doc
        .elements()
        .filter(|n| INLINE_HANDLERS.iter().any(|h| n.has_attr(h)))
        .count();
    flags.counted(
        handlers,
        20,
        "perf-inline-handlers",
        Performance,
        Info,
        "Many Inline Event Handlers",
        format!("{handlers} elements have inline event handlers"),
        "Use addEventListener instead of inline handlers for better performance",
    );

    if inline_script_text(doc).contains("document.write(") {
        flags.push(
            "perf-document-write",
            Performance,
            Warning,
            "Using document.write()",
            "Scripts using document.write() can block page parsing",
            "Replace document.write() with DOM manipulation methods",
        );
    }
}

/// Scripts served from a host unrelated to the page's host.
fn third_party_scripts(doc: &Document<'_>) -> usize {
    let Ok(page) = Url::parse(doc.url()) else {
        return 0;
    };
    let current = page.host_str().unwrap_or("").to_string();
    let Ok(origin) = Url::parse(&page.origin().ascii_serialization()) else {
        return 0;
    };

    doc.by_tag("script")
        .filter_map(|s| s.attr("src"))
        .filter_map(|src| origin.join(src).ok())
        .filter(|url| {
            let host = url.host_str().unwrap_or("");
            host != current && !host.contains(current.as_str()) && !current.contains(host)
        })
        .count()
}
