use std::path::Path;
use std::process::ExitCode;

use dinspect_lib::extract::spacing_summary;
use dinspect_lib::inspector::{element_prompt, tooltip};
use dinspect_lib::output::ElementOutput;
use dinspect_lib::protocol::ExtensionMessage;
use dinspect_lib::types::{Document, DomNode, PageSnapshot};
use dinspect_lib::{
    Config, DinspectOutput, InspectError, Inspector, InspectorEvent, PointerTarget, ResourceDescriptor,
    OUTPUT_VERSION,
};
use tracing::warn;

use crate::cli::{BrowserArgs, OutputArgs, SourceArgs};
use crate::pipeline::{open_source, OpenOptions};

use super::{config_or_exit, finish};

/// Run the element command.
pub async fn run_element(
    config_path: Option<&Path>,
    source: SourceArgs,
    selector: String,
    compare: Option<String>,
    highlight: bool,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    let result = element(&config, &source, &selector, compare.as_deref(), highlight, &browser).await;
    finish(result, output, config.preferences, ExitCode::SUCCESS)
}

async fn element(
    config: &Config,
    source: &SourceArgs,
    selector: &str,
    compare: Option<&str>,
    highlight: bool,
    browser: &BrowserArgs,
) -> Result<DinspectOutput, InspectError> {
    let mut page = open_source(source, OpenOptions::new(config, browser, config.preferences)).await?;
    let snapshot = page.snapshot().await;

    if highlight {
        match page.live_mut() {
            Some(service) => {
                let reply = service
                    .handle(ExtensionMessage::HighlightElement {
                        selector: selector.to_string(),
                    })
                    .await;
                if let Err(err) = reply.into_result() {
                    warn!(error = %err, "highlight failed");
                }
            }
            None => warn!("--highlight needs a live page; ignoring"),
        }
    }

    let descriptor = page.descriptor.clone();
    page.close().await;
    describe(&snapshot?, descriptor, selector, compare)
}

/// Drives the inspector to select `selector`, hovering `compare` for guides.
fn describe(
    snapshot: &PageSnapshot,
    source: ResourceDescriptor,
    selector: &str,
    compare: Option<&str>,
) -> Result<DinspectOutput, InspectError> {
    let doc = snapshot.document();
    let node = find(&doc, selector)?;

    let mut inspector = Inspector::new();
    inspector.handle(InspectorEvent::Enable);
    inspector.handle(InspectorEvent::PointerMove(PointerTarget::Element(node.id.clone())));
    inspector.handle(InspectorEvent::Click(PointerTarget::Element(node.id.clone())));
    if let Some(other) = compare {
        let other = find(&doc, other)?;
        inspector.handle(InspectorEvent::PointerMove(PointerTarget::Element(other.id.clone())));
    }

    let view = inspector.view(&doc);
    let card = view
        .card
        .ok_or_else(|| InspectError::inspector("Inspector did not select the element"))?;

    Ok(DinspectOutput::Element(ElementOutput {
        version: OUTPUT_VERSION.to_string(),
        source,
        selector: selector.to_string(),
        tooltip: tooltip(node),
        card,
        spacing: spacing_summary(node),
        guides: view.guides,
        prompt: element_prompt(&doc, node),
    }))
}

fn find<'a>(doc: &Document<'a>, selector: &str) -> Result<&'a DomNode, InspectError> {
    doc.select(selector)
        .ok_or_else(|| InspectError::inspector(format!("No element matches selector {selector}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinspect_lib::types::{BoundingBox, DomNode, ResourceKind};

    fn snapshot() -> PageSnapshot {
        let mut snapshot = PageSnapshot::new("https://example.com");
        let mut html = DomNode::new("n0", "html");
        html.children = vec!["n1".into()];
        let mut body = DomNode::new("n1", "body");
        body.parent = Some("n0".into());
        body.children = vec!["n2".into(), "n3".into()];
        let mut hero = DomNode::new("n2", "section");
        hero.parent = Some("n1".into());
        hero.attributes.insert("class".into(), "hero".into());
        hero.bounding_box = BoundingBox::new(0.0, 0.0, 200.0, 100.0);
        let mut cta = DomNode::new("n3", "button");
        cta.parent = Some("n1".into());
        cta.attributes.insert("id".into(), "cta".into());
        cta.text = Some("Start".into());
        cta.bounding_box = BoundingBox::new(0.0, 140.0, 80.0, 30.0);
        snapshot.nodes = vec![html, body, hero, cta];
        snapshot
    }

    fn source() -> ResourceDescriptor {
        ResourceDescriptor {
            kind: ResourceKind::Snapshot,
            value: "page.json".into(),
        }
    }

    #[test]
    fn test_describe_selects_element() {
        let out = describe(&snapshot(), source(), ".hero", None).unwrap();
        let DinspectOutput::Element(out) = out else {
            panic!("expected element output");
        };
        assert_eq!(out.card.tag, "section");
        assert!(out.tooltip.starts_with("section"));
        assert!(out.guides.is_empty());
        assert!(out.prompt.contains("section"));
    }

    #[test]
    fn test_describe_measures_to_compare_element() {
        let out = describe(&snapshot(), source(), ".hero", Some("#cta")).unwrap();
        let DinspectOutput::Element(out) = out else {
            panic!("expected element output");
        };
        assert!(!out.guides.is_empty());
    }

    #[test]
    fn test_describe_unknown_selector() {
        let err = describe(&snapshot(), source(), ".missing", None).unwrap_err();
        assert!(matches!(err, InspectError::Inspector(_)));
    }
}
