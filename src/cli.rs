use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde_json::{Value, json};

use crate::commands::edit::PhotoEditNode;
use crate::config::NodeConfig;
use crate::constants::OUTPUT_BINARY_PROPERTY;
use crate::fs_utils::{resolve_mime_type, write_output_file};
use crate::models::{BinaryData, InputItem, NodeParameters, OpenAiCredentials, OutputItem};

/// Restyle photos with the OpenAI image generation tool.
///
/// Every image file becomes one item. Generated images are written to
/// `--out-dir`; per-item metadata is printed to stdout as JSON.
#[derive(Debug, Parser)]
#[command(name = "photo-edit", version)]
pub struct Cli {
    /// Image files to restyle, one item each
    pub images: Vec<PathBuf>,

    /// chibi, pixelart or cartoon
    #[arg(long, default_value = "chibi")]
    pub style: String,

    /// Process a single `data:image/...;base64,...` string instead of files
    #[arg(long, conflicts_with = "images")]
    pub base64_image: Option<String>,

    /// Attachment name the files are stored under
    #[arg(long, default_value = "data")]
    pub binary_property_name: String,

    #[arg(long, default_value = "./output")]
    pub out_dir: PathBuf,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Requests in flight at once; output order is unaffected
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Abort the run on the first item whose image cannot be read
    #[arg(long)]
    pub stop_on_fail: bool,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = NodeConfig::from_env()?;
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = base_url;
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.log_dir = log_dir;
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if cli.stop_on_fail {
        config.continue_on_fail = false;
    }

    let (items, params) = build_items(&cli).await?;
    let node = PhotoEditNode::new(config, &OpenAiCredentials::new(cli.api_key.as_str()))?;
    let outputs = node.execute(&items, &params).await?;

    let mut report: Vec<Value> = Vec::with_capacity(outputs.len());
    for output in outputs {
        report.push(report_entry(&cli.out_dir, output).await);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn build_items(cli: &Cli) -> anyhow::Result<(Vec<InputItem>, NodeParameters)> {
    if let Some(base64_image) = &cli.base64_image {
        return Ok((
            vec![InputItem::default()],
            NodeParameters::base64(cli.style.as_str(), base64_image.as_str()),
        ));
    }

    if cli.images.is_empty() {
        bail!("Provide at least one image file or --base64-image");
    }

    let mut items = Vec::with_capacity(cli.images.len());
    for path in &cli.images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Unable to read image '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        let mime_type = resolve_mime_type(None, path);
        items.push(InputItem::with_binary(
            cli.binary_property_name.as_str(),
            BinaryData::from_bytes(&bytes, file_name, mime_type),
        ));
    }

    Ok((
        items,
        NodeParameters::binary(cli.style.as_str(), cli.binary_property_name.as_str()),
    ))
}

/// Saves the item's generated image, if any. A save failure is recorded on
/// the item's entry and does not affect the other items.
async fn report_entry(out_dir: &Path, output: OutputItem) -> Value {
    let item = output.paired_item.item;
    let mut entry = json!({ "item": item, "json": output.json, "savedTo": null });

    if let Some(binary) = output.binary.get(OUTPUT_BINARY_PROPERTY) {
        match save_binary(out_dir, binary).await {
            Ok(path) => entry["savedTo"] = Value::String(path),
            Err(err) => {
                tracing::warn!(item, error = %format!("{err:#}"), "unable to save generated image");
                entry["saveError"] = Value::String(format!("{err:#}"));
            }
        }
    }
    entry
}

async fn save_binary(out_dir: &Path, binary: &BinaryData) -> anyhow::Result<String> {
    let bytes = binary.to_bytes()?;
    let file_name = binary.file_name.as_deref().unwrap_or("edited_image.png");
    let path = write_output_file(out_dir, file_name, &bytes)
        .await
        .map_err(anyhow::Error::msg)?;
    tracing::info!(path = %path.display(), "generated image saved");
    Ok(path.display().to_string())
}
