//! Technology fingerprinting from markup, stylesheets and script sources.
//!
//! Rules run in a fixed order and each technology is reported once, at the
//! position of the first rule that matched it.

use url::Url;

use super::{Extractor, ExtractorKind};
use crate::types::{Document, InspectionData};
use crate::Result;

/// Number of leading elements sampled for utility-class markers.
const TAILWIND_SAMPLE: usize = 100;
/// Sampled elements that must carry utility classes to report Tailwind.
const TAILWIND_MIN_MATCHES: usize = 10;

const TAILWIND_MARKERS: [&str; 4] = ["flex ", "text-", "bg-", "p-"];

/// `(any of these substrings, technology)`, matched against resolved URLs.
type SubstringRule = (&'static [&'static str], &'static str);

const STYLESHEET_RULES: &[SubstringRule] = &[
    (&["bootstrap"], "Bootstrap"),
    (&["tailwind"], "Tailwind CSS"),
    (&["bulma"], "Bulma"),
    (&["foundation"], "Foundation"),
    (&["materialize"], "Materialize"),
    (&["font-awesome"], "Font Awesome"),
    (&["animate.css"], "Animate.css"),
];

const SCRIPT_LIBRARY_AND_ANALYTICS_RULES: &[SubstringRule] = &[
    (&["jquery"], "jQuery"),
    (&["lodash", "underscore"], "Lodash"),
    (&["moment"], "Moment.js"),
    (&["axios"], "Axios"),
    (&["alpine"], "Alpine.js"),
    (&["gsap"], "GSAP"),
    (&["three"], "Three.js"),
    (&["d3"], "D3.js"),
    (&["chart.js"], "Chart.js"),
    (&["google-analytics", "gtag"], "Google Analytics"),
    (&["googletagmanager"], "Google Tag Manager"),
    (&["fbevents", "facebook"], "Facebook Pixel"),
    (&["hotjar"], "Hotjar"),
    (&["segment"], "Segment"),
];

const HOSTING_AND_MARKETING_RULES: &[SubstringRule] = &[
    (&["cloudflareinsights", "cdn-cgi"], "Cloudflare"),
    (&["cdnjs.cloudflare.com"], "cdnjs"),
    (&["unpkg.com"], "unpkg"),
    (&["jsdelivr.net"], "jsDelivr"),
    (&["vercel-analytics", "/_vercel/"], "Vercel"),
    (&["netlify"], "Netlify"),
    (&["optimizely"], "Optimizely"),
    (&["visualwebsiteoptimizer", "vwo.com"], "VWO"),
    (&["hubspot", "hs-scripts"], "HubSpot"),
    (&["marketo"], "Marketo"),
    (&["mailchimp", "chimpstatic"], "Mailchimp"),
    (&["mixpanel"], "Mixpanel"),
    (&["newrelic"], "New Relic"),
    (&["doubleclick", "googlesyndication"], "Google Ads"),
    (&["ads-twitter"], "Twitter Ads"),
];

const WIDGET_AND_PAYMENT_RULES: &[SubstringRule] = &[
    (&["taboola"], "Taboola"),
    (&["outbrain"], "Outbrain"),
    (&["disqus"], "Disqus"),
    (&["intercom"], "Intercom"),
    (&["drift"], "Drift"),
    (&["zendesk"], "Zendesk"),
    (&["chat in", "tidio"], "Live Chat"),
    (&["stripe"], "Stripe"),
    (&["paypal"], "PayPal"),
    (&["braintree"], "Braintree"),
    (&["klarna"], "Klarna"),
];

const COMMERCE_PLATFORM_RULES: &[SubstringRule] = &[(&["bigcommerce"], "BigCommerce")];

const SECURITY_AND_CONSENT_RULES: &[SubstringRule] = &[
    (&["recaptcha", "g-recaptcha"], "reCAPTCHA"),
    (&["hcaptcha"], "hCaptcha"),
    (&["onetrust"], "OneTrust"),
];

pub struct TechExtractor;

impl Extractor for TechExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Technologies
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.technologies = extract_technologies(doc);
        Ok(())
    }
}

/// Ordered, duplicate-free technology list.
#[derive(Default)]
struct TechSet(Vec<String>);

impl TechSet {
    fn add(&mut self, name: &str) {
        if !self.0.iter().any(|t| t == name) {
            self.0.push(name.to_string());
        }
    }

    fn add_if(&mut self, condition: bool, name: &str) {
        if condition {
            self.add(name);
        }
    }
}

struct Sources {
    stylesheets: Vec<String>,
    scripts: Vec<String>,
}

/// Adds each rule's technology when any URL in `urls` contains one of its substrings.
fn apply(urls: &[String], rules: &[SubstringRule], techs: &mut TechSet) {
    for (needles, name) in rules {
        techs.add_if(urls.iter().any(|u| needles.iter().any(|n| u.contains(n))), name);
    }
}

pub fn extract_technologies(doc: &Document<'_>) -> Vec<String> {
    let mut techs = TechSet::default();
    let snapshot = doc.snapshot();
    let base = Url::parse(snapshot.base()).ok();
    let resolve = |raw: &str| -> String {
        base.as_ref()
            .and_then(|b| b.join(raw).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| raw.to_string())
            .to_lowercase()
    };

    let generator = doc
        .meta_content("name", "generator")
        .unwrap_or("")
        .to_lowercase();
    let host = Url::parse(&snapshot.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();

    techs.add_if(generator.contains("wordpress"), "WordPress");
    techs.add_if(generator.contains("webflow"), "Webflow");
    techs.add_if(generator.contains("wix"), "Wix");
    techs.add_if(
        generator.contains("shopify") || host.contains("myshopify"),
        "Shopify",
    );
    techs.add_if(generator.contains("gatsby"), "Gatsby");
    techs.add_if(generator.contains("joomla"), "Joomla");
    techs.add_if(generator.contains("drupal"), "Drupal");
    techs.add_if(doc.element_by_id("squarespace-headers").is_some(), "Squarespace");

    let has_attr = |name: &str| doc.elements().any(|n| n.has_attr(name));
    let has_id = |id: &str| doc.element_by_id(id).is_some();

    techs.add_if(has_attr("data-reactroot") || has_id("react-root"), "React");
    if has_id("__next") {
        techs.add("Next.js");
        techs.add("React");
    }
    techs.add_if(has_attr("data-v-app") || has_id("app"), "Vue.js");
    if has_id("__nuxt") {
        techs.add("Nuxt.js");
        techs.add("Vue.js");
    }
    techs.add_if(has_attr("ng-version") || has_attr("ng-app"), "Angular");
    let script_of_type = |t: &str| doc.by_tag("script").any(|s| s.attr("type") == Some(t));
    techs.add_if(script_of_type("text/x-handlebars-template"), "Handlebars");

    let sources = Sources {
        stylesheets: doc
            .links_with_rel("stylesheet")
            .filter_map(|l| l.attr("href"))
            .map(&resolve)
            .collect(),
        scripts: doc
            .by_tag("script")
            .filter_map(|s| s.attr("src"))
            .map(&resolve)
            .collect(),
    };

    apply(&sources.stylesheets, STYLESHEET_RULES, &mut techs);
    apply(&sources.scripts, SCRIPT_LIBRARY_AND_ANALYTICS_RULES, &mut techs);

    let body_class = doc.body().and_then(|b| b.attr("class")).unwrap_or("");
    techs.add_if(body_class.contains("wp-"), "WordPress");

    let utility_heavy = doc
        .elements()
        .take(TAILWIND_SAMPLE)
        .filter(|n| {
            let class = n.attr("class").unwrap_or("");
            TAILWIND_MARKERS.iter().any(|m| class.contains(m))
        })
        .count();
    techs.add_if(utility_heavy > TAILWIND_MIN_MATCHES, "Tailwind CSS");

    techs.add_if(
        doc.by_tag("meta")
            .any(|m| m.attr("property").is_some_and(|p| p.starts_with("og:"))),
        "Open Graph",
    );
    techs.add_if(
        doc.by_tag("link")
            .any(|l| l.attr("type") == Some("application/rss+xml")),
        "RSS",
    );

    apply(&sources.scripts, HOSTING_AND_MARKETING_RULES, &mut techs);
    techs.add_if(
        sources
            .scripts
            .iter()
            .any(|s| s.contains("linkedin") && s.contains("insight")),
        "LinkedIn Insight Tag",
    );
    apply(&sources.scripts, WIDGET_AND_PAYMENT_RULES, &mut techs);
    techs.add_if(script_of_type("text/x-magento-init"), "Magento");
    techs.add_if(
        doc.by_tag("link")
            .any(|l| l.attr("href").is_some_and(|h| h.contains("woocommerce"))),
        "WooCommerce",
    );
    apply(&sources.scripts, COMMERCE_PLATFORM_RULES, &mut techs);
    apply(&sources.scripts, SECURITY_AND_CONSENT_RULES, &mut techs);

    techs.0
}
