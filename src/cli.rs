use crate::config::load_config;
use crate::data::load_data;
use crate::designs::{compose, render_template};
use crate::padding::Padding;
use crate::render::{Document, InfographicOptions, to_svg_with, write_output_svg};
use crate::text_metrics::FontMetrics;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "infog", version, about = "Infographic renderer in Rust")]
pub struct Args {
    /// Data file (JSON or JSON5) or '-' for stdin
    #[arg(short = 'd', long = "data")]
    pub data: Option<PathBuf>,

    /// Structure design, e.g. list-row or hierarchy-tree
    #[arg(short = 's', long = "structure", default_value = "list-row")]
    pub structure: String,

    /// Item design, e.g. simple or icon-badge
    #[arg(long = "item", default_value = "simple")]
    pub item: String,

    /// Render a stored template (JSON5) instead of composing one
    #[arg(short = 't', long = "template")]
    pub template: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Padding around the content, CSS shorthand: "20" or "10,20,10,20"
    #[arg(short = 'p', long = "padding")]
    pub padding: Option<Padding>,

    /// Write the composed template as JSON and stop
    #[arg(long = "dumpTemplate")]
    pub dump_template: bool,

    /// Keep the add/remove editing buttons
    #[arg(long = "showButtons")]
    pub show_buttons: bool,

    /// Measure text with built-in character widths instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(padding) = args.padding.clone() {
        config.render.padding = padding;
    }
    if args.show_buttons {
        config.render.show_buttons = true;
    }

    let data = load_data(args.data.as_deref())?;
    let options = InfographicOptions::new(data, config);
    let measure = FontMetrics {
        fast: args.fast_text,
    };

    let template = match &args.template {
        Some(path) => Document::from_json5(&std::fs::read_to_string(path)?)?,
        None => compose(&args.structure, &args.item, &options, &measure)?,
    };
    if args.dump_template {
        let json = template.to_json()?;
        return write_output_svg(&json, args.output.as_deref());
    }

    let document = render_template(template, &options, &measure)?;
    info!(resources = document.resources.len(), "rendered");
    let svg = to_svg_with(&document, &measure);
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &options, document.background.as_deref())
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, options: &InfographicOptions, background: Option<&str>) -> Result<()> {
    crate::render::write_output_png(svg, output, &options.render, background)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _options: &InfographicOptions, _background: Option<&str>) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
