mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{default_output, Cli, Command};
use logo_smart::{
    analyze_and_process_with, enhance_postprocess_with, mime_from_path, prepare_for_enhancement_with,
    LogoConfig, SizeTable,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn load_config(cli: &Cli) -> Result<LogoConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            LogoConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => LogoConfig::default(),
    };
    if cli.compact {
        config.sizes = SizeTable::compact();
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "logo_smart=warn".into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Process { input, output, mime } => {
            let output = output.unwrap_or_else(|| default_output(&input, "processed"));
            let bytes = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let mime = mime.as_deref().or_else(|| mime_from_path(&input));

            let result = analyze_and_process_with(&bytes, mime, &config)?;
            std::fs::write(&output, result.to_png()?)
                .with_context(|| format!("writing {}", output.display()))?;

            let mut summary = serde_json::to_value(result.summary())?;
            summary["output"] = json!(output.display().to_string());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Prepare { input, output } => {
            let output = output.unwrap_or_else(|| default_output(&input, "prepared"));
            let bytes = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;

            let png = prepare_for_enhancement_with(&bytes, &config)?;
            std::fs::write(&output, png).with_context(|| format!("writing {}", output.display()))?;
            println!("{}", json!({ "output": output.display().to_string() }));
        }
        Command::Enhance { input, output, stroke, pure } => {
            let output = output.unwrap_or_else(|| default_output(&input, "enhanced"));
            let bytes = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let mut config = config;
            if let Some(stroke) = stroke {
                config.outline.stroke_px = stroke;
            }
            if pure {
                config.outline.prefer_native = false;
            }

            let enhanced = enhance_postprocess_with(&bytes, &config)?;
            std::fs::write(&output, enhanced.to_png()?)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "trimmed_ar": enhanced.trimmed_aspect_ratio,
                    "width": enhanced.logo_box.w,
                    "height": enhanced.logo_box.h,
                    "output": output.display().to_string(),
                }))?
            );
        }
        Command::Box { ratio } => {
            let logo_box = config.sizes.box_for(ratio);
            println!("{}", serde_json::to_string(&logo_box)?);
        }
    }

    Ok(())
}
