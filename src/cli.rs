use clap::{Args, Parser, Subcommand, ValueEnum};
use dinspect_lib::output::PromptKind;
use dinspect_lib::protocol::AnimationAction;
use dinspect_lib::types::{ResourceKind, Severity};
use dinspect_lib::{ColorFormat, ExtractorKind, UnitFormat, Viewport};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dinspect")]
#[command(
    version,
    about = "Design Inspector - Extract the design system of a live page",
    long_about = "Design Inspector (dinspect)\n\nModes:\n- inspect: fonts, colors with roles, spacing, technologies, assets, scroll animations and red flags.\n- flags: SEO/UX/accessibility/mobile/performance red flags, with an optional failing severity.\n- scroll: scroll-driven animations, starter code and playback control.\n- element: inspector card, guides and component prompt for one element.\n- enhance: screenshot one element and refine its prompt through the backend.\n- capture: save a page snapshot for offline inspection.\n- prompt: design-system clone prompt, image prompt or palette CSS.\n- serve: run the Gemini prompt backend.\n\nSOURCE is an http(s) URL or a snapshot JSON written by `dinspect capture`."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML); defaults to ~/.config/dinspect/config.toml; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every extractor over a page
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            long,
            value_delimiter = ',',
            help = "Extractors to run (fonts,colors,spacing,technologies,assets,scroll-animations,red-flags)"
        )]
        only: Option<Vec<ExtractorKind>>,

        #[arg(long, help = "Include the palette as CSS custom properties")]
        palette_css: bool,

        #[command(flatten)]
        display: DisplayArgs,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List red flags; exits 1 when one reaches --fail-on
    Flags {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, help = "Fail (exit 1) when a flag of this severity or worse is found")]
        fail_on: Option<Severity>,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Detect scroll animations and optionally control one
    Scroll {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, help = "Include starter code for each animation")]
        code: bool,

        #[arg(long, value_name = "ID", help = "Animation id to control (live pages only)")]
        control: Option<String>,

        #[arg(
            long,
            requires = "control",
            help = "Playback action: restart, play, set-progress or scroll-to"
        )]
        action: Option<AnimationAction>,

        #[arg(long, requires = "control", help = "Progress in 0..=1 for set-progress")]
        value: Option<f64>,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inspect one element: detail card, guides and component prompt
    Element {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, help = "Selector of the element to select (#id, .class, tag or tag.class)")]
        selector: String,

        #[arg(long, value_name = "SELECTOR", help = "Measure guides to this element")]
        compare: Option<String>,

        #[arg(long, help = "Outline the element in the live page")]
        highlight: bool,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Screenshot an element and refine its prompt through the backend
    Enhance {
        #[arg(help = "Page URL")]
        url: String,

        #[arg(long, help = "Selector of the element to enhance")]
        selector: String,

        #[arg(long, help = "Backend base URL (default from config or http://localhost:3000)")]
        backend_url: Option<String>,

        #[arg(long, help = "Print the prompt without copying it to the clipboard")]
        no_copy: bool,

        #[arg(long, value_name = "PATH", help = "Save the cropped element screenshot (PNG)")]
        save_image: Option<PathBuf>,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Capture a page snapshot to JSON for offline inspection
    Capture {
        #[arg(help = "Page URL")]
        url: String,

        #[arg(help = "Snapshot file to write")]
        snapshot: PathBuf,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Build a design-system prompt from a page
    Prompt {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, value_enum, default_value = "clone", help = "Prompt to build")]
        kind: PromptKindArg,

        #[command(flatten)]
        display: DisplayArgs,

        #[command(flatten)]
        browser: BrowserArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the prompt backend (requires GEMINI_API_KEY)
    Serve {
        #[arg(long, help = "Listen address (default from config or 127.0.0.1)")]
        host: Option<String>,

        #[arg(long, help = "Listen port (default from PORT, config, or 3000)")]
        port: Option<u16>,

        #[arg(long, help = "Gemini model (default gemini-2.5-flash)")]
        model: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(help = "Page URL or snapshot JSON path")]
    pub source: String,

    #[arg(long, value_enum, help = "Override type detection for SOURCE")]
    pub source_type: Option<SourceType>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BrowserArgs {
    #[arg(long, help = "Viewport dimensions (WIDTHxHEIGHT), default 1440x900")]
    pub viewport: Option<Viewport>,

    #[arg(long, value_name = "SECS", help = "Navigation timeout (seconds), default 30")]
    pub nav_timeout: Option<u64>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Network idle timeout (seconds), default 10"
    )]
    pub network_idle_timeout: Option<u64>,

    #[arg(long, help = "Show the browser window")]
    pub headed: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    #[arg(long, help = "Color format for pretty output (hex, rgb, hsl)")]
    pub color_format: Option<ColorFormat>,

    #[arg(long, help = "Unit format for spacing in pretty output (px, rem)")]
    pub unit_format: Option<UnitFormat>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, short, help = "Output file path (stdout if omitted)")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceType {
    Url,
    Snapshot,
}

impl From<SourceType> for ResourceKind {
    fn from(value: SourceType) -> Self {
        match value {
            SourceType::Url => ResourceKind::Url,
            SourceType::Snapshot => ResourceKind::Snapshot,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PromptKindArg {
    Clone,
    Visual,
    Palette,
}

impl From<PromptKindArg> for PromptKind {
    fn from(value: PromptKindArg) -> Self {
        match value {
            PromptKindArg::Clone => PromptKind::Clone,
            PromptKindArg::Visual => PromptKind::Visual,
            PromptKindArg::Palette => PromptKind::Palette,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat, PromptKindArg, SourceType};
    use clap::Parser;
    use dinspect_lib::protocol::AnimationAction;
    use dinspect_lib::types::Severity;
    use dinspect_lib::ExtractorKind;

    #[test]
    fn inspect_command_uses_defaults() {
        let cli = Cli::parse_from(["dinspect", "inspect", "https://example.com"]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Inspect {
                source,
                only,
                palette_css,
                display,
                browser,
                output,
            } => {
                assert_eq!(source.source, "https://example.com");
                assert!(source.source_type.is_none());
                assert!(only.is_none());
                assert!(!palette_css);
                assert!(display.color_format.is_none());
                assert!(browser.viewport.is_none());
                assert!(browser.nav_timeout.is_none());
                assert!(!browser.headed);
                assert!(matches!(output.format, OutputFormat::Json));
                assert!(output.output.is_none());
            }
            _ => panic!("expected inspect command"),
        }
    }

    #[test]
    fn inspect_command_respects_overrides() {
        let cli = Cli::parse_from([
            "dinspect",
            "--verbose",
            "inspect",
            "page.json",
            "--source-type",
            "snapshot",
            "--only",
            "colors,spacing",
            "--color-format",
            "hsl",
            "--viewport",
            "1280x720",
            "--nav-timeout",
            "20",
            "--format",
            "pretty",
            "--output",
            "report.json",
            "--config",
            "dinspect.toml",
        ]);

        assert!(cli.verbose);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("dinspect.toml"))
        );
        match cli.command {
            Commands::Inspect {
                source,
                only,
                display,
                browser,
                output,
                ..
            } => {
                assert!(matches!(source.source_type, Some(SourceType::Snapshot)));
                assert_eq!(only, Some(vec![ExtractorKind::Colors, ExtractorKind::Spacing]));
                assert_eq!(display.color_format.map(|f| f.to_string()).as_deref(), Some("hsl"));
                assert_eq!(browser.viewport.map(|v| v.width), Some(1280));
                assert_eq!(browser.nav_timeout, Some(20));
                assert!(matches!(output.format, OutputFormat::Pretty));
                assert_eq!(
                    output.output.as_deref(),
                    Some(std::path::Path::new("report.json"))
                );
            }
            _ => panic!("expected inspect command with overrides"),
        }
    }

    #[test]
    fn flags_command_parses_severity() {
        let cli = Cli::parse_from(["dinspect", "flags", "page.json", "--fail-on", "warning"]);
        match cli.command {
            Commands::Flags { fail_on, .. } => assert_eq!(fail_on, Some(Severity::Warning)),
            _ => panic!("expected flags command"),
        }
    }

    #[test]
    fn scroll_control_requires_an_id() {
        assert!(Cli::try_parse_from(["dinspect", "scroll", "https://a.test", "--action", "play"]).is_err());

        let cli = Cli::parse_from([
            "dinspect",
            "scroll",
            "https://a.test",
            "--control",
            "gsap-st-0",
            "--action",
            "set-progress",
            "--value",
            "0.5",
        ]);
        match cli.command {
            Commands::Scroll {
                control,
                action,
                value,
                ..
            } => {
                assert_eq!(control.as_deref(), Some("gsap-st-0"));
                assert_eq!(action, Some(AnimationAction::SetProgress));
                assert_eq!(value, Some(0.5));
            }
            _ => panic!("expected scroll command"),
        }
    }

    #[test]
    fn prompt_defaults_to_clone() {
        let cli = Cli::parse_from(["dinspect", "prompt", "page.json"]);
        match cli.command {
            Commands::Prompt { kind, .. } => assert!(matches!(kind, PromptKindArg::Clone)),
            _ => panic!("expected prompt command"),
        }
    }

    #[test]
    fn serve_overrides_are_optional() {
        let cli = Cli::parse_from(["dinspect", "serve", "--port", "8080"]);
        match cli.command {
            Commands::Serve { host, port, model } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
                assert!(model.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }
}
