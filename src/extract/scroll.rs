//! Scroll-driven animation detection.
//!
//! Seven detectors run in a fixed order, each looking for a different
//! library's signature. GSAP ScrollTrigger state lives on page globals, so
//! its raw facts arrive pre-collected in [`PageSnapshot::gsap_triggers`]
//! (see [`crate::bridge`]); every other detector reads the DOM.
//!
//! [`PageSnapshot::gsap_triggers`]: crate::types::PageSnapshot::gsap_triggers

use tracing::{debug, info, warn};

use super::{Extractor, ExtractorKind};
use crate::css;
use crate::error::InspectError;
use crate::types::{
    AnimationInfo, AnimationKind, Document, DomNode, GsapTrigger, InspectionData, Scrub,
    ScrollAnimationRecord, ScrollLibrary, TriggerInfo,
};
use crate::Result;

/// Tween callbacks that are not animated properties.
const GSAP_CALLBACK_KEYS: [&str; 4] = ["onComplete", "onUpdate", "onStart", "onReverseComplete"];

const OBSERVER_CLASSES: [&str; 3] = ["fade-in", "slide-in", "animate-on-scroll"];

type DetectorFn = fn(&Document<'_>) -> Result<Vec<ScrollAnimationRecord>>;

/// Detectors in reporting order.
const DETECTORS: [(&str, DetectorFn); 7] = [
    ("GSAP ScrollTrigger", detect_gsap),
    ("Framer Motion", detect_framer_motion),
    ("Locomotive Scroll", detect_locomotive),
    ("AOS", detect_aos),
    ("Intersection Observer", detect_intersection_observer),
    ("ScrollMagic", detect_scroll_magic),
    ("CSS Scroll Timeline", detect_css_scroll_timeline),
];

pub struct ScrollAnimationDetector;

impl Extractor for ScrollAnimationDetector {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::ScrollAnimations
    }

    fn extract(&self, doc: &Document<'_>, out: &mut InspectionData) -> Result<()> {
        out.scroll_animations = detect_scroll_animations(doc);
        Ok(())
    }
}

/// Runs every detector; a failing detector is logged and contributes nothing.
pub fn detect_scroll_animations(doc: &Document<'_>) -> Vec<ScrollAnimationRecord> {
    let mut all = Vec::new();
    for (name, detect) in DETECTORS {
        match detect(doc) {
            Ok(found) => {
                if !found.is_empty() {
                    debug!(detector = name, count = found.len(), "scroll animations found");
                }
                all.extend(found);
            }
            Err(err) => warn!(detector = name, error = %err, "scroll detector failed"),
        }
    }
    debug!(total = all.len(), "scroll animation detection finished");
    all
}

/// Normalizes raw ScrollTrigger facts into records (`gsap-st-N`).
/// A negative tween duration or delay is rejected.
pub fn gsap_records(triggers: &[GsapTrigger]) -> Result<Vec<ScrollAnimationRecord>> {
    triggers
        .iter()
        .enumerate()
        .map(|(index, t)| {
            for (what, value) in [("duration", t.duration), ("delay", t.delay)] {
                if let Some(v) = value.filter(|v| *v < 0.0) {
                    return Err(InspectError::extraction(format!(
                        "ScrollTrigger {index} has a negative tween {what}: {v}"
                    )));
                }
            }
            let element = t.element.clone().unwrap_or_else(|| "unknown".to_string());
            let mut properties: Vec<String> = t
                .tween_vars
                .iter()
                .filter(|k| !GSAP_CALLBACK_KEYS.contains(&k.as_str()))
                .cloned()
                .collect();
            if properties.is_empty() {
                properties = vec!["transform".into(), "opacity".into()];
            }

            Ok(ScrollAnimationRecord {
                id: format!("gsap-st-{index}"),
                library: ScrollLibrary::GsapScrolltrigger,
                element: element.clone(),
                trigger: TriggerInfo {
                    element,
                    start: t.start.clone().unwrap_or_else(|| "top bottom".into()),
                    end: t.end.clone().unwrap_or_else(|| "bottom top".into()),
                    scrub: t.scrub.unwrap_or_default(),
                    pin: t.pin,
                    toggle_actions: t.toggle_actions.clone(),
                    once: None,
                    repeat: None,
                    threshold: None,
                },
                animation: AnimationInfo {
                    kind: AnimationKind::Js,
                    properties,
                    duration: t.duration.filter(|d| *d != 0.0),
                    easing: t.ease.clone().unwrap_or_else(|| "none".into()),
                    delay: t.delay.unwrap_or(0.0),
                    speed: None,
                },
                markers: t.markers,
                class_name: None,
                animation_name: None,
            })
        })
        .collect()
}

/// Leading number of an attribute or style value. A value that does not
/// start with a number is an error, not a default.
fn number(value: &str, what: &str, element: &str) -> Result<f64> {
    css::parse_float(value).ok_or_else(|| {
        InspectError::extraction(format!("{what} on {element} is not a number: {value:?}"))
    })
}

/// A CSS `<time>` in milliseconds; empty and `auto` are unset. Only the
/// first entry of a comma-separated list is read.
fn css_time_ms(value: &str, what: &str, element: &str) -> Result<Option<f64>> {
    let first = value.split(',').next().unwrap_or("").trim();
    if first.is_empty() || first == "auto" {
        return Ok(None);
    }
    let amount = number(first, what, element)?;
    Ok(Some(if first.ends_with("ms") { amount } else { amount * 1000.0 }))
}

fn detect_gsap(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    let snapshot = doc.snapshot();
    if snapshot.gsap_triggers.is_empty() {
        if !snapshot.has_global("ScrollTrigger") && !snapshot.has_global("gsap.ScrollTrigger") {
            debug!("ScrollTrigger not found on window or gsap object");
        }
        return Ok(Vec::new());
    }
    gsap_records(&snapshot.gsap_triggers)
}

fn trigger(element: &str, start: &str, end: &str, scrub: bool) -> TriggerInfo {
    TriggerInfo {
        element: element.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        scrub: Scrub::Flag(scrub),
        pin: false,
        toggle_actions: None,
        once: None,
        repeat: None,
        threshold: None,
    }
}

fn detect_framer_motion(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    let candidates = doc
        .elements()
        .filter(|n| n.has_attr("data-framer-appear-id") || n.has_attr("data-framer-name"));

    let mut records = Vec::new();
    for (index, node) in candidates.enumerate() {
        if !node.has_attr("data-framer-appear-id") {
            continue;
        }
        let selector = doc.element_selector(node);
        records.push(ScrollAnimationRecord {
            id: format!("framer-{index}"),
            library: ScrollLibrary::FramerMotion,
            element: selector.clone(),
            trigger: TriggerInfo {
                once: Some(true),
                ..trigger(&selector, "0px", "auto", false)
            },
            animation: AnimationInfo {
                kind: AnimationKind::Js,
                properties: vec!["opacity".into(), "transform".into()],
                duration: None,
                easing: "ease".into(),
                delay: 0.0,
                speed: None,
            },
            markers: false,
            class_name: None,
            animation_name: None,
        });
    }
    Ok(records)
}

fn detect_locomotive(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    doc
        .elements()
        .filter(|n| n.has_attr("data-scroll"))
        .enumerate()
        .map(|(index, node)| -> Result<ScrollAnimationRecord> {
            let attr = |name: &str| node.attr(name).filter(|v| !v.is_empty());
            let direction = attr("data-scroll-direction").unwrap_or("vertical");
            let selector = doc.element_selector(node);
            let speed = attr("data-scroll-speed")
                .map(|v| number(v, "data-scroll-speed", &selector))
                .transpose()?;
            let delay = attr("data-scroll-delay")
                .map(|v| number(v, "data-scroll-delay", &selector))
                .transpose()?
                .unwrap_or(0.0);
            let axis = if direction == "horizontal" {
                "translateX"
            } else {
                "translateY"
            };

            Ok(ScrollAnimationRecord {
                id: format!("locomotive-{index}"),
                library: ScrollLibrary::Locomotive,
                element: selector.clone(),
                trigger: TriggerInfo {
                    repeat: Some(node.attr("data-scroll-repeat") == Some("true")),
                    ..trigger(&selector, "enter viewport", "leave viewport", true)
                },
                animation: AnimationInfo {
                    kind: AnimationKind::Transform,
                    properties: vec![axis.into()],
                    duration: None,
                    easing: "linear".into(),
                    delay,
                    speed,
                },
                markers: false,
                class_name: attr("data-scroll-class").map(str::to_string),
                animation_name: None,
            })
        })
        .collect()
}

fn detect_aos(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    let integer = |node: &DomNode, name: &str, default: &str, element: &str| -> Result<f64> {
        let value = node.attr(name).filter(|v| !v.is_empty()).unwrap_or(default);
        css::parse_int(value).map(|v| v as f64).ok_or_else(|| {
            InspectError::extraction(format!("{name} on {element} is not a number: {value:?}"))
        })
    };
    let attr_or = |node: &DomNode, name: &str, default: &str| -> String {
        node.attr(name)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    doc.elements()
        .filter(|n| n.has_attr("data-aos"))
        .enumerate()
        .map(|(index, node)| -> Result<ScrollAnimationRecord> {
            let name = attr_or(node, "data-aos", "fade");
            let easing = attr_or(node, "data-aos-easing", "ease");
            let selector = doc.element_selector(node);
            let duration = integer(node, "data-aos-duration", "400", &selector)?;
            let delay = integer(node, "data-aos-delay", "0", &selector)?;
            let offset = integer(node, "data-aos-offset", "120", &selector)?;

            Ok(ScrollAnimationRecord {
                id: format!("aos-{index}"),
                library: ScrollLibrary::Aos,
                element: selector.clone(),
                trigger: TriggerInfo {
                    once: Some(node.attr("data-aos-once") == Some("true")),
                    ..trigger(&selector, &format!("top bottom-{offset}px"), "auto", false)
                },
                animation: AnimationInfo {
                    kind: AnimationKind::Css,
                    properties: vec![name.clone()],
                    duration: Some(duration),
                    easing,
                    delay,
                    speed: None,
                },
                markers: false,
                class_name: None,
                animation_name: Some(name),
            })
        })
        .collect()
}

fn detect_intersection_observer(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    let candidates = doc.elements().filter(|n| {
        n.has_attr("data-observe") || OBSERVER_CLASSES.iter().any(|c| n.has_class(c))
    });

    let mut records = Vec::new();
    for (index, node) in candidates.enumerate() {
        let classes: Vec<String> = node
            .classes()
            .filter(|c| c.contains("fade") || c.contains("slide") || c.contains("animate"))
            .map(str::to_string)
            .collect();
        if classes.is_empty() {
            continue;
        }
        let selector = doc.element_selector(node);
        records.push(ScrollAnimationRecord {
            id: format!("io-{index}"),
            library: ScrollLibrary::IntersectionObserver,
            element: selector.clone(),
            trigger: TriggerInfo {
                threshold: Some(0.1),
                ..trigger(&selector, "enter viewport", "auto", false)
            },
            animation: AnimationInfo {
                kind: AnimationKind::Css,
                properties: classes,
                duration: None,
                easing: "ease".into(),
                delay: 0.0,
                speed: None,
            },
            markers: false,
            class_name: None,
            animation_name: None,
        });
    }
    Ok(records)
}

fn detect_scroll_magic(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    if doc.snapshot().has_global("ScrollMagic") {
        info!("ScrollMagic detected; its scenes are not inspectable, no records produced");
    }
    Ok(Vec::new())
}

fn detect_css_scroll_timeline(doc: &Document<'_>) -> Result<Vec<ScrollAnimationRecord>> {
    let mut records = Vec::new();
    for (index, node) in doc.elements().enumerate() {
        let timeline = node.style("animation-timeline");
        if timeline.is_empty() || timeline == "auto" || timeline == "none" {
            continue;
        }
        let name = node.style("animation-name").to_string();
        let selector = doc.element_selector(node);
        let time = |property: &str| css_time_ms(node.style(property), property, &selector);
        let duration = time("animation-duration")?.filter(|ms| *ms != 0.0);
        let delay = time("animation-delay")?.unwrap_or(0.0);

        records.push(ScrollAnimationRecord {
            id: format!("css-scroll-{index}"),
            library: ScrollLibrary::CssScrollTimeline,
            element: selector.clone(),
            trigger: trigger(&selector, "auto", "auto", true),
            animation: AnimationInfo {
                kind: AnimationKind::Css,
                properties: vec![name.clone()],
                duration,
                easing: node.style("animation-timing-function").to_string(),
                delay,
                speed: None,
            },
            markers: false,
            class_name: None,
            animation_name: Some(name),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dom::fixtures::SnapshotBuilder;

    #[test]
    fn gsap_records_apply_defaults_and_drop_callbacks() {
        let triggers = vec![
            GsapTrigger {
                element: Some("#hero".into()),
                scrub: Some(Scrub::Smoothing(1.0)),
                pin: true,
                tween_vars: vec!["x".into(), "onComplete".into(), "opacity".into()],
                duration: Some(2.0),
                ease: Some("power2.out".into()),
                ..GsapTrigger::default()
            },
            GsapTrigger {
                tween_vars: vec!["onUpdate".into()],
                ..GsapTrigger::default()
            },
        ];

        let records = gsap_records(&triggers).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id, "gsap-st-0");
        assert_eq!(first.element, "#hero");
        assert_eq!(first.trigger.start, "top bottom");
        assert_eq!(first.trigger.end, "bottom top");
        assert_eq!(first.trigger.scrub, Scrub::Smoothing(1.0));
        assert!(first.trigger.pin);
        assert_eq!(first.animation.properties, vec!["x", "opacity"]);
        assert_eq!(first.animation.duration, Some(2.0));
        assert_eq!(first.animation.easing, "power2.out");

        let second = &records[1];
        assert_eq!(second.element, "unknown");
        assert_eq!(second.trigger.scrub, Scrub::Flag(false));
        assert_eq!(second.animation.properties, vec!["transform", "opacity"]);
        assert_eq!(second.animation.duration, None);
        assert_eq!(second.animation.easing, "none");
    }

    #[test]
    fn detectors_report_in_fixed_order() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(Some(SnapshotBuilder::BODY), "div", &[("data-aos", "fade-up")]);
        b.push(Some(SnapshotBuilder::BODY), "div", &[("data-scroll", "")]);
        b.snapshot_mut().gsap_triggers.push(GsapTrigger::default());
        let snapshot = b.build();

        let libraries: Vec<ScrollLibrary> = detect_scroll_animations(&snapshot.document())
            .into_iter()
            .map(|r| r.library)
            .collect();
        assert_eq!(
            libraries,
            vec![
                ScrollLibrary::GsapScrolltrigger,
                ScrollLibrary::Locomotive,
                ScrollLibrary::Aos
            ]
        );
    }

    #[test]
    fn framer_ids_count_every_candidate() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(Some(SnapshotBuilder::BODY), "div", &[("data-framer-name", "Nav")]);
        b.push(
            Some(SnapshotBuilder::BODY),
            "div",
            &[("data-framer-appear-id", "abc"), ("id", "card")],
        );
        let snapshot = b.build();

        let records = detect_framer_motion(&snapshot.document()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "framer-1");
        assert_eq!(records[0].element, "#card");
        assert_eq!(records[0].trigger.once, Some(true));
    }

    #[test]
    fn locomotive_reads_data_attributes() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(
            Some(SnapshotBuilder::BODY),
            "section",
            &[
                ("data-scroll", ""),
                ("data-scroll-speed", "2.5"),
                ("data-scroll-direction", "horizontal"),
                ("data-scroll-repeat", "true"),
                ("data-scroll-class", "is-inview"),
            ],
        );
        let snapshot = b.build();

        let record = &detect_locomotive(&snapshot.document()).unwrap()[0];
        assert_eq!(record.animation.kind, AnimationKind::Transform);
        assert_eq!(record.animation.properties, vec!["translateX"]);
        assert_eq!(record.animation.speed, Some(2.5));
        assert_eq!(record.animation.delay, 0.0);
        assert_eq!(record.trigger.repeat, Some(true));
        assert_eq!(record.trigger.scrub, Scrub::Flag(true));
        assert_eq!(record.class_name.as_deref(), Some("is-inview"));
        assert_eq!(record.element, "section:nth-of-type(1)");
    }

    #[test]
    fn aos_defaults_and_offset() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(
            Some(SnapshotBuilder::BODY),
            "div",
            &[("data-aos", "zoom-in"), ("data-aos-offset", "200"), ("data-aos-once", "true")],
        );
        let snapshot = b.build();

        let record = &detect_aos(&snapshot.document()).unwrap()[0];
        assert_eq!(record.id, "aos-0");
        assert_eq!(record.trigger.start, "top bottom-200px");
        assert_eq!(record.trigger.once, Some(true));
        assert_eq!(record.animation.duration, Some(400.0));
        assert_eq!(record.animation.easing, "ease");
        assert_eq!(record.animation_name.as_deref(), Some("zoom-in"));
    }

    #[test]
    fn observer_patterns_need_animation_classes() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(Some(SnapshotBuilder::BODY), "div", &[("data-observe", "")]);
        b.push(
            Some(SnapshotBuilder::BODY),
            "div",
            &[("class", "card fade-in delay-2")],
        );
        let snapshot = b.build();

        let records = detect_intersection_observer(&snapshot.document()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "io-1");
        assert_eq!(records[0].animation.properties, vec!["fade-in"]);
        assert_eq!(records[0].trigger.threshold, Some(0.1));
    }

    #[test]
    fn css_scroll_timeline_converts_seconds() {
        let mut b = SnapshotBuilder::new("https://example.com");
        let bar = b.push(Some(SnapshotBuilder::BODY), "div", &[("class", "progress")]);
        b.style(
            &bar,
            &[
                ("animation-timeline", "scroll()"),
                ("animation-name", "grow"),
                ("animation-duration", "0.5s"),
                ("animation-delay", "0s"),
                ("animation-timing-function", "linear"),
            ],
        );
        let idle = b.push(Some(SnapshotBuilder::BODY), "div", &[]);
        b.style(&idle, &[("animation-timeline", "auto")]);
        let snapshot = b.build();

        let records = detect_css_scroll_timeline(&snapshot.document()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "css-scroll-3");
        assert_eq!(records[0].animation.duration, Some(500.0));
        assert_eq!(records[0].animation.delay, 0.0);
        assert_eq!(records[0].element, ".progress");
    }

    #[test]
    fn css_scroll_timeline_reads_milliseconds_and_rejects_garbage() {
        let mut b = SnapshotBuilder::new("https://example.com");
        let bar = b.push(Some(SnapshotBuilder::BODY), "div", &[("id", "bar")]);
        b.style(
            &bar,
            &[
                ("animation-timeline", "view()"),
                ("animation-name", "reveal"),
                ("animation-duration", "250ms, 1s"),
                ("animation-delay", "auto"),
            ],
        );
        let records = detect_css_scroll_timeline(&b.build().document()).unwrap();
        assert_eq!(records[0].animation.duration, Some(250.0));
        assert_eq!(records[0].animation.delay, 0.0);

        b.style(&bar, &[("animation-duration", "slow")]);
        let err = detect_css_scroll_timeline(&b.build().document()).unwrap_err();
        assert!(matches!(err, InspectError::Extraction(_)));
        assert!(err.to_string().contains("animation-duration on #bar"), "got: {err}");
    }

    #[test]
    fn malformed_values_fail_only_their_detector() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(
            Some(SnapshotBuilder::BODY),
            "div",
            &[("data-scroll", ""), ("data-scroll-speed", "fast")],
        );
        b.push(Some(SnapshotBuilder::BODY), "div", &[("data-aos", "fade-up")]);
        b.snapshot_mut().gsap_triggers.push(GsapTrigger {
            duration: Some(-1.0),
            ..GsapTrigger::default()
        });
        let snapshot = b.build();
        let doc = snapshot.document();

        assert!(matches!(detect_locomotive(&doc), Err(InspectError::Extraction(_))));
        assert!(matches!(detect_gsap(&doc), Err(InspectError::Extraction(_))));

        let libraries: Vec<ScrollLibrary> = detect_scroll_animations(&doc)
            .into_iter()
            .map(|r| r.library)
            .collect();
        assert_eq!(libraries, vec![ScrollLibrary::Aos]);
    }

    #[test]
    fn aos_rejects_non_numeric_duration() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.push(
            Some(SnapshotBuilder::BODY),
            "div",
            &[("data-aos", "fade"), ("data-aos-duration", "long")],
        );
        let err = detect_aos(&b.build().document()).unwrap_err();
        assert!(err.to_string().contains("data-aos-duration"), "got: {err}");
    }

    #[test]
    fn scroll_magic_is_probe_only() {
        let mut b = SnapshotBuilder::new("https://example.com");
        b.snapshot_mut().page_globals.push("ScrollMagic".into());
        let snapshot = b.build();
        assert!(detect_scroll_magic(&snapshot.document()).unwrap().is_empty());
    }
}
