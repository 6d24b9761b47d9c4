//! Prompts and code snippets generated from inspection results.

use crate::extract::fonts::group_fonts_by_family;
use crate::types::{ColorRole, InspectionData, ScrollAnimationRecord, ScrollLibrary};

const PALETTE_LIMIT: usize = 15;

fn hexes_with_role(data: &InspectionData, role: ColorRole) -> String {
    data.colors
        .iter()
        .filter(|c| c.role == Some(role))
        .map(|c| c.hex.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_see_list(value: &str) -> &str {
    if value.is_empty() {
        "See list"
    } else {
        value
    }
}

/// Design-system specification for recreating the whole page as a React clone.
pub fn clone_prompt(data: &InspectionData) -> String {
    let primary = hexes_with_role(data, ColorRole::Primary);
    let secondary = hexes_with_role(data, ColorRole::Secondary);
    let backgrounds = hexes_with_role(data, ColorRole::Background);
    let text = hexes_with_role(data, ColorRole::Text);

    let palette = data
        .colors
        .iter()
        .take(PALETTE_LIMIT)
        .map(|c| {
            let role = c.role.map_or_else(|| "auto".to_string(), |r| r.to_string());
            format!("- {} ({role})", c.hex)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let fonts = group_fonts_by_family(&data.fonts)
        .iter()
        .map(|g| format!("- Family: \"{}\" (Weights: {})", g.family, g.variants.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let spacing = format!(
        "Base Unit: {}. Found {} unique spacing tokens.",
        if data.spacing.is_empty() { "Unknown" } else { "Detected" },
        data.spacing.len()
    );

    format!(
        r#"You are an expert Senior Frontend Engineer and UI/UX Designer.
Your task is to recreate a website's landing page as a reusable React clone, **pixel-perfectly matching the design system** provided below.

## 1. Project Context
- **Title**: {title}
- **Description**: {description}
- **Tech Stack**: {tech}
- **Framework**: React + Tailwind CSS (Use generic CSS variables if Tailwind config is restricted).

## 2. Design Tokens (STRICT ENFORCEMENT)
Use ONLY these tokens. Do not invent new colors or fonts.

### 🎨 Color Palette
**Primary**: {primary}
**Secondary**: {secondary}
**Backgrounds**: {backgrounds}
**Text**: {text}

**Full Palette:**
{palette}

### 🔤 Typography
{fonts}
*Instruction: Use Google Fonts to load these families.*

### 📐 Spacing & Layout
{spacing}
*Instruction: Use a consistent 4px or 8px grid system for margins and paddings.*

## 3. Implementation Instructions
1.  **Setup**: Create a `Layout` component that wraps the page with the main background color and font family.
2.  **Variables**: Define a `tailwind.config.js` (or CSS variables) mapping the "Primary" and "Secondary" colors above to semantic names (e.g., `primary`, `secondary`, `accent`).
3.  **Components**: Build the page sections (Hero, Features, Footer) based on standard modern web patterns, BUT applying the *exact* colors and fonts listed above.
4.  **Responsiveness**: Ensure mobile-first responsive design.

**Output**: Provide the full code for the main landing page component and the Tailwind configuration."#,
        title = data.meta.title,
        description = data.meta.description,
        tech = data.technologies.join(", "),
        primary = or_see_list(&primary),
        secondary = or_see_list(&secondary),
        backgrounds = or_see_list(&backgrounds),
        text = or_see_list(&text),
    )
}

/// One-line prompt for image-generation models.
pub fn visual_prompt(data: &InspectionData) -> String {
    format!(
        "/imagine prompt: Website UI design for \"{}\", {}. Style: Modern, Professional. Colors: {} (Primary), {} (Background). Typography: Clean Sans-Serif. High fidelity, Dribbble, Behance --v 6.0",
        data.meta.title,
        data.meta.description,
        hexes_with_role(data, ColorRole::Primary),
        hexes_with_role(data, ColorRole::Background)
    )
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Starter code that reproduces a detected scroll animation with its library.
pub fn animation_snippet(record: &ScrollAnimationRecord) -> String {
    let trigger = &record.trigger;
    let animation = &record.animation;

    match record.library {
        ScrollLibrary::GsapScrolltrigger => {
            let properties = animation
                .properties
                .iter()
                .map(|p| format!("{p}: /* value */"))
                .collect::<Vec<_>>()
                .join(",\n  ");
            format!(
                "gsap.to(\"{}\", {{\n  scrollTrigger: {{\n    trigger: \"{}\",\n    start: \"{}\",\n    end: \"{}\",\n    scrub: {},\n    pin: {},\n    markers: {}\n  }},\n  {},\n  duration: {},\n  ease: \"{}\"\n}});",
                record.element,
                trigger.element,
                trigger.start,
                trigger.end,
                trigger.scrub,
                trigger.pin,
                record.markers,
                properties,
                nonzero(animation.duration).unwrap_or(1.0),
                animation.easing
            )
        }
        ScrollLibrary::FramerMotion => format!(
            "<motion.div\n  initial={{{{ opacity: 0 }}}}\n  whileInView={{{{ opacity: 1 }}}}\n  viewport={{{{ \n    once: {},\n    margin: \"{}\"\n  }}}}\n  transition={{{{\n    duration: {},\n    ease: \"{}\"\n  }}}}\n/>",
            trigger.once.unwrap_or(false),
            trigger.start,
            nonzero(animation.duration).unwrap_or(0.5),
            animation.easing
        ),
        ScrollLibrary::Locomotive => {
            let delay = nonzero(Some(animation.delay))
                .map(|d| format!("data-scroll-delay=\"{d}\""))
                .unwrap_or_default();
            let class = record
                .class_name
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(|c| format!("data-scroll-class=\"{c}\""))
                .unwrap_or_default();
            let repeat = if trigger.repeat.unwrap_or(false) {
                "data-scroll-repeat=\"true\""
            } else {
                ""
            };
            format!(
                "<div \n  data-scroll\n  data-scroll-speed=\"{}\"\n  {delay}\n  {class}\n  {repeat}\n>\n  <!-- Content -->\n</div>",
                nonzero(animation.speed).unwrap_or(0.0)
            )
        }
        ScrollLibrary::Aos => {
            let once = if trigger.once.unwrap_or(false) {
                "data-aos-once=\"true\""
            } else {
                ""
            };
            format!(
                "<div \n  data-aos=\"{}\"\n  data-aos-duration=\"{}\"\n  data-aos-easing=\"{}\"\n  data-aos-delay=\"{}\"\n  {once}\n>\n  <!-- Content -->\n</div>",
                record
                    .animation_name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("fade"),
                nonzero(animation.duration).unwrap_or(400.0),
                animation.easing,
                nonzero(Some(animation.delay)).unwrap_or(0.0)
            )
        }
        ScrollLibrary::IntersectionObserver => format!(
            "const observer = new IntersectionObserver((entries) => {{\n  entries.forEach(entry => {{\n    if (entry.isIntersecting) {{\n      entry.target.classList.add('{}');\n    }}\n  }});\n}}, {{\n  threshold: {}\n}});\n\nobserver.observe(document.querySelector('{}'));",
            animation.properties.join("', '"),
            trigger.threshold.filter(|t| *t != 0.0).unwrap_or(0.1),
            record.element
        ),
        ScrollLibrary::CssScrollTimeline => format!(
            "// {} animation\n// Element: {}\n// Properties: {}",
            record.library,
            record.element,
            animation.properties.join(", ")
        ),
    }
}
