//! Serializes an element subtree with its computed styles inlined, and wraps
//! it in the component-recreation prompt.

use crate::types::{Document, DomNode};

/// Nodes deeper than this are replaced by [`DEPTH_LIMIT_MARKER`].
pub const MAX_DEPTH: usize = 10;

pub const DEPTH_LIMIT_MARKER: &str = "<!-- depth limit -->";

const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "iframe"];

/// Properties inlined into each serialized element, in output order.
pub(crate) const STYLE_PROPERTIES: [&str; 27] = [
    "display",
    "flex-direction",
    "justify-content",
    "align-items",
    "flex-wrap",
    "gap",
    "grid-template-columns",
    "grid-template-rows",
    "position",
    "width",
    "height",
    "max-width",
    "padding",
    "margin",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "text-align",
    "color",
    "background-color",
    "background-image",
    "border",
    "border-radius",
    "box-shadow",
    "opacity",
    "z-index",
];

/// Values that carry no information for a recreation prompt.
const DEFAULT_VALUES: [&str; 5] = ["none", "0px", "auto", "normal", "rgba(0, 0, 0, 0)"];

/// Children shorter than this with no markup stay inline.
const INLINE_CHILDREN_LIMIT: usize = 50;

/// HTML for `node` and its subtree with filtered computed styles as `style`
/// attributes. Direct text precedes child elements.
pub fn serialize_with_styles(doc: &Document<'_>, node: &DomNode) -> String {
    serialize(doc, node, 0)
}

fn serialize(doc: &Document<'_>, node: &DomNode, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return DEPTH_LIMIT_MARKER.to_string();
    }
    let tag = node.tag.to_ascii_lowercase();

    if node.style("display") == "none"
        || node.style("opacity") == "0"
        || node.style("visibility") == "hidden"
        || SKIPPED_TAGS.contains(&tag.as_str())
    {
        return String::new();
    }

    match tag.as_str() {
        "svg" => {
            return format!(
                "<svg width=\"{}\" height=\"{}\" fill=\"{}\"><!-- icon path --></svg>",
                node.style("width"),
                node.style("height"),
                node.style("fill")
            )
        }
        "img" => {
            return format!(
                "<img src=\"{}\" alt=\"{}\" style=\"width:{}; height:{}; object-fit:{}; border-radius:{}\" />",
                node.attr("src").unwrap_or_default(),
                node.attr("alt").unwrap_or_default(),
                node.style("width"),
                node.style("height"),
                node.style("object-fit"),
                node.style("border-radius")
            )
        }
        _ => {}
    }

    let declarations = style_declarations(node);

    let mut children = String::new();
    if let Some(text) = node.text.as_deref().map(str::trim) {
        children.push_str(text);
    }
    for child in doc.children(node) {
        children.push_str(&serialize(doc, child, depth + 1));
    }
    if children.len() >= INLINE_CHILDREN_LIMIT || children.contains('<') {
        children = format!("\n{children}\n");
    }

    format!("<{tag} style=\"{}\">{children}</{tag}>", declarations.join("; "))
}

fn style_declarations(node: &DomNode) -> Vec<String> {
    let display = node.style("display");
    let is_flex = display.contains("flex");
    let is_grid = display.contains("grid");

    STYLE_PROPERTIES
        .iter()
        .filter_map(|&property| {
            let value = node.style(property);
            if value.is_empty() || DEFAULT_VALUES.contains(&value) {
                return None;
            }
            let flex_only = property.starts_with("flex")
                || property == "justify-content"
                || property == "align-items";
            if !is_flex && flex_only {
                return None;
            }
            if !is_grid && property.starts_with("grid") {
                return None;
            }
            let redundant = matches!(
                (property, value),
                ("position", "static") | ("font-weight", "400") | ("opacity", "1")
            );
            (!redundant).then(|| format!("{property}: {value}"))
        })
        .collect()
}

/// Prompt asking a model to recreate the serialized component in React and Tailwind CSS.
pub fn component_prompt(rich_html: &str) -> String {
    format!(
        r#"You are an expert Frontend Developer. Recreate this specific UI component using React and Tailwind CSS.
I have explicitly inlined the **Computed Styles** for every element in the HTML below.

## Source HTML (with Computed Styles)
```html
{rich_html}
```

## Instruction
1. **Analyze the Inline Styles**: Look at the `style` attributes for every node. They contain the *exact* computed layout (flex/grid), spacing (padding/margin), colors, and typography you must match.
2. **Map to Tailwind**: Convert these raw CSS values into the closest Tailwind utility classes.
   - e.g., `display: flex; gap: 16px` -> `flex gap-4`
   - e.g., `background-color: rgb(30, 41, 59)` -> `bg-slate-800` (or custom hex)
   - e.g., `font-size: 14px; font-weight: 600` -> `text-sm font-semibold`
3. **Structure**: Maintain the exact hierarchy shown in the HTML.
4. **Icons/Images**: Use placeholders where you see `<img>` or `<svg>` tags.

**Output**: Provide the full, responsive React component code."#
    )
}

/// Serializes `node` and wraps it in [`component_prompt`].
pub fn element_prompt(doc: &Document<'_>, node: &DomNode) -> String {
    component_prompt(&serialize_with_styles(doc, node))
}
