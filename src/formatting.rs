use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dinspect_lib::extract::group_fonts_by_family;
use dinspect_lib::output::OUTPUT_VERSION;
use dinspect_lib::types::{ColorRecord, RedFlag, Severity};
use dinspect_lib::{DinspectOutput, ErrorOutput, InspectError, Preferences};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &DinspectOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
    prefs: Preferences,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref(), prefs)?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: InspectError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = DinspectOutput::Error(ErrorOutput {
        version: OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) =
                write_pretty_output(&payload, output.as_deref(), Preferences::default())
            {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Reserve exit code 2 for fatal/errors; failing flag checks use 1.
    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(body: &DinspectOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &DinspectOutput, output: Option<&Path>, prefs: Preferences) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true, prefs);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &DinspectOutput, colorize: bool, prefs: Preferences) -> String {
    let mut buf = String::new();
    match body {
        DinspectOutput::Inspect(out) => {
            let data = &out.data;
            let header = color("[INSPECT]", "36", colorize);
            writeln!(buf, "{header} {}", title_or_url(&data.meta.title, &data.meta.url)).ok();
            if !data.meta.description.is_empty() {
                writeln!(buf, "{}", data.meta.description).ok();
            }

            if !data.fonts.is_empty() {
                writeln!(buf, "Typography:").ok();
                for group in group_fonts_by_family(&data.fonts) {
                    writeln!(
                        buf,
                        "- {} ({:?}): {} | sizes {}",
                        group.family,
                        group.source,
                        group.variants.join(", "),
                        group.sizes.join(", ")
                    )
                    .ok();
                }
            }
            if !data.colors.is_empty() {
                writeln!(buf, "Colors:").ok();
                for c in &data.colors {
                    writeln!(buf, "- {}", color_line(c, prefs)).ok();
                }
            }
            if !data.spacing.is_empty() {
                let tokens: Vec<String> = data
                    .spacing
                    .iter()
                    .map(|px| prefs.unit_format.display(*px))
                    .collect();
                writeln!(buf, "Spacing: {}", tokens.join(", ")).ok();
            }
            if !data.technologies.is_empty() {
                writeln!(buf, "Technologies: {}", data.technologies.join(", ")).ok();
            }
            if !data.assets.is_empty() {
                writeln!(buf, "Assets: {}", data.assets.len()).ok();
                for asset in data.assets.iter().take(10) {
                    let dims = asset.dimensions.as_deref().unwrap_or("-");
                    writeln!(buf, "- {:10} {:>11} {}", format!("{:?}", asset.kind), dims, truncate(&asset.url, 80)).ok();
                }
            }
            if !data.scroll_animations.is_empty() {
                writeln!(buf, "Scroll animations: {}", data.scroll_animations.len()).ok();
                for anim in &data.scroll_animations {
                    writeln!(buf, "- {} {} on {}", anim.id, anim.library.display_name(), anim.element).ok();
                }
            }
            if !data.red_flags.is_empty() {
                writeln!(buf, "Red flags: {}", data.red_flags.len()).ok();
                for flag in &data.red_flags {
                    writeln!(buf, "- {}", flag_line(flag, colorize)).ok();
                }
            }
            if let Some(css) = &out.palette_css {
                writeln!(buf, "{css}").ok();
            }
        }
        DinspectOutput::Flags(out) => {
            let status = if out.passed { "PASS" } else { "FAIL" };
            let status_colored = color(status, if out.passed { "32" } else { "31" }, colorize);
            writeln!(buf, "{status_colored} Red flags for {}", out.source.value).ok();
            if let Some(fail_on) = out.fail_on {
                writeln!(buf, "Failing severity: {fail_on}").ok();
            }
            if out.red_flags.is_empty() {
                writeln!(buf, "No red flags found.").ok();
            }
            for flag in &out.red_flags {
                writeln!(buf, "- {}", flag_line(flag, colorize)).ok();
                writeln!(buf, "  {}", flag.description).ok();
                writeln!(buf, "  Fix: {}", flag.recommendation).ok();
            }
        }
        DinspectOutput::Scroll(out) => {
            let header = color("[SCROLL]", "35", colorize);
            writeln!(buf, "{header} {} animation(s) on {}", out.scroll_animations.len(), out.source.value).ok();
            for anim in &out.scroll_animations {
                writeln!(
                    buf,
                    "- {} {} on {} (start {}, end {}, scrub {})",
                    anim.id,
                    anim.library.display_name(),
                    anim.element,
                    anim.trigger.start,
                    anim.trigger.end,
                    anim.trigger.scrub
                )
                .ok();
            }
            for snippet in &out.snippets {
                writeln!(buf, "\n// {}\n{}", snippet.id, snippet.code).ok();
            }
            if let Some(controlled) = &out.controlled {
                writeln!(buf, "Sent {controlled}").ok();
            }
        }
        DinspectOutput::Element(out) => {
            let header = color("[ELEMENT]", "36", colorize);
            writeln!(buf, "{header} {} ({})", out.tooltip, out.selector).ok();
            let b = &out.card.box_model;
            writeln!(
                buf,
                "Box: {}x{} | margin {} {} {} {} | border {} {} {} {} | padding {} {} {} {}",
                b.width,
                b.height,
                b.margin.top,
                b.margin.right,
                b.margin.bottom,
                b.margin.left,
                b.border.top,
                b.border.right,
                b.border.bottom,
                b.border.left,
                b.padding.top,
                b.padding.right,
                b.padding.bottom,
                b.padding.left
            )
            .ok();
            let t = &out.card.typography;
            writeln!(buf, "Type: {} {} {}px / {}", t.family, t.weight, t.size, t.line_height).ok();
            writeln!(buf, "Colors: text {} | background {}", out.card.colors.text, out.card.colors.background).ok();
            for guide in &out.guides {
                writeln!(buf, "Guide: {:?} {}", guide.axis, guide.label).ok();
            }
            writeln!(buf, "\n{}", out.card.css).ok();
        }
        DinspectOutput::Enhance(out) => {
            let label = if out.copied { "✅ COPIED!" } else { "✅ DONE" };
            writeln!(buf, "{} {}", color(label, "32", colorize), out.selector).ok();
            if !out.copied {
                writeln!(buf, "Prompt not copied to the clipboard; it is printed below.").ok();
            }
            writeln!(buf, "{}", out.prompt).ok();
        }
        DinspectOutput::Capture(out) => {
            let header = color("[CAPTURE]", "34", colorize);
            writeln!(
                buf,
                "{header} {} -> {} ({} nodes, {}x{})",
                out.url,
                out.output_path.display(),
                out.nodes,
                out.viewport.width,
                out.viewport.height
            )
            .ok();
        }
        DinspectOutput::Prompt(out) => {
            writeln!(buf, "{}", out.text).ok();
        }
        DinspectOutput::Error(out) => {
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
        }
    }
    buf
}

fn title_or_url<'a>(title: &'a str, url: &'a str) -> &'a str {
    if title.is_empty() {
        url
    } else {
        title
    }
}

fn color_line(c: &ColorRecord, prefs: Preferences) -> String {
    let role = c.role.map(|r| format!(" [{r}]")).unwrap_or_default();
    format!(
        "{:24} {:10} x{}{}",
        prefs.color_format.display(c),
        c.color_type.to_string(),
        c.usage_count,
        role
    )
}

fn flag_line(flag: &RedFlag, colorize: bool) -> String {
    let code = match flag.severity {
        Severity::Critical => "31",
        Severity::Warning => "33",
        Severity::Info => "34",
    };
    let severity = color(&format!("[{}]", flag.severity), code, colorize);
    match flag.count {
        Some(count) => format!("{severity} {} ({count})", flag.title),
        None => format!("{severity} {}", flag.title),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Determine exit code for the flags command.
pub fn exit_code_for_flags(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinspect_lib::output::{EnhanceOutput, FlagsOutput, InspectOutput, ResourceDescriptor};
    use dinspect_lib::types::{ColorType, Hsl, InspectionData, RedFlagCategory, ResourceKind};
    use dinspect_lib::{ColorFormat, UnitFormat};

    fn source() -> ResourceDescriptor {
        ResourceDescriptor {
            kind: ResourceKind::Snapshot,
            value: "page.json".into(),
        }
    }

    #[test]
    fn pretty_inspect_follows_preferences() {
        let body = DinspectOutput::Inspect(InspectOutput {
            version: OUTPUT_VERSION.into(),
            source: source(),
            data: InspectionData {
                colors: vec![ColorRecord {
                    hex: "#3B82F6".into(),
                    rgba: "rgb(59, 130, 246)".into(),
                    usage_count: 4,
                    color_type: ColorType::Background,
                    role: None,
                    hsl: Hsl {
                        h: 217.2,
                        s: 91.2,
                        l: 59.8,
                    },
                }],
                spacing: vec![8, 24],
                ..InspectionData::default()
            },
            palette_css: None,
        });
        let prefs = Preferences {
            color_format: ColorFormat::Hsl,
            unit_format: UnitFormat::Rem,
        };
        let text = format_pretty(&body, false, prefs);
        assert!(text.contains("hsl(217, 91%, 60%)"), "got: {text}");
        assert!(text.contains("Spacing: 0.5rem, 1.5rem"), "got: {text}");
    }

    #[test]
    fn pretty_flags_show_status_and_fix() {
        let body = DinspectOutput::Flags(FlagsOutput {
            version: OUTPUT_VERSION.into(),
            source: source(),
            red_flags: vec![RedFlag {
                id: "perf-no-lazy-loading".into(),
                category: RedFlagCategory::Performance,
                severity: Severity::Warning,
                title: "Images without lazy loading".into(),
                description: "6 images load eagerly".into(),
                element: None,
                count: Some(6),
                recommendation: "Add loading=\"lazy\"".into(),
            }],
            worst: Some(Severity::Warning),
            fail_on: Some(Severity::Warning),
            passed: false,
        });
        let text = format_pretty(&body, false, Preferences::default());
        assert!(text.starts_with("FAIL Red flags for page.json"));
        assert!(text.contains("[warning] Images without lazy loading (6)"));
        assert!(text.contains("Fix: Add loading=\"lazy\""));
    }

    #[test]
    fn pretty_enhance_says_where_the_prompt_went() {
        let enhance = |copied| {
            DinspectOutput::Enhance(EnhanceOutput {
                version: OUTPUT_VERSION.into(),
                source: ResourceDescriptor {
                    kind: ResourceKind::Url,
                    value: "https://example.com".into(),
                },
                selector: "#cta".into(),
                prompt: "A rounded blue button".into(),
                copied,
                image_path: None,
            })
        };

        let printed = format_pretty(&enhance(false), false, Preferences::default());
        assert!(printed.starts_with("✅ DONE #cta"), "got: {printed}");
        assert!(printed.contains("not copied to the clipboard"));
        assert!(printed.contains("A rounded blue button"));

        let copied = format_pretty(&enhance(true), false, Preferences::default());
        assert!(copied.starts_with("✅ COPIED! #cta"), "got: {copied}");
        assert!(!copied.contains("not copied"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), "héll…");
        assert_eq!(truncate("short", 10), "short");
    }
}
