/*!
encodable Command Line Interface

Completes channel definitions and encodes JSON datasets.
*/

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encodable::{
    complete_channel_def_with, ChannelDef, ChannelEncoders, ChannelType, CompletionOptions, Datum,
    Encoder, Encoding, ScaleContext, VERSION,
};

#[derive(Parser)]
#[command(name = "encodable")]
#[command(about = "Channel encoding and scale resolution for declarative visualization")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Use local time instead of UTC for temporal fields
    #[arg(long, global = true)]
    pub local_time: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the completed form of a channel definition
    Complete {
        /// Channel role (X, Y, XBand, YBand, Color, Size, Numeric, Category, Text)
        #[arg(long)]
        channel_type: ChannelType,

        /// Channel definition as JSON
        #[arg(long)]
        def: String,
    },

    /// Encode every row of a dataset
    Encode {
        /// JSON file with the declared channels: `[{"name": "x", "type": "X"}, ...]`
        #[arg(long)]
        channels: PathBuf,

        /// JSON file with the encoding (channel name to definition)
        #[arg(long)]
        encoding: PathBuf,

        /// JSON file with the dataset (array of records)
        #[arg(long)]
        data: PathBuf,

        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
struct ChannelDeclaration {
    name: String,
    #[serde(rename = "type")]
    channel_type: ChannelType,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn encode(
    channels: &Path,
    encoding: &Path,
    data: &Path,
    options: &CompletionOptions,
) -> anyhow::Result<serde_json::Value> {
    let declarations: Vec<ChannelDeclaration> = read_json(channels)?;
    let encoding: Encoding = read_json(encoding)?;
    let dataset: Vec<Datum> = read_json(data)?;

    let channel_types: Vec<(&str, ChannelType)> = declarations
        .iter()
        .map(|d| (d.name.as_str(), d.channel_type))
        .collect();
    let encoder = Encoder::with_options(&channel_types, encoding, &ScaleContext::default(), options)?
        .with_domains_from_dataset(&dataset)?;
    info!("Encoding {} rows over {} channels", dataset.len(), channel_types.len());

    let rows: Vec<serde_json::Value> = dataset
        .iter()
        .map(|datum| {
            let row: serde_json::Map<String, serde_json::Value> = encoder
                .get_channel_names()
                .into_iter()
                .filter_map(|name| {
                    let encoded = match encoder.channel(name)? {
                        ChannelEncoders::Single(e) => json!(e.encode_datum(datum, None)),
                        ChannelEncoders::Multiple(es) => json!(es
                            .iter()
                            .map(|e| e.encode_datum(datum, None))
                            .collect::<Vec<_>>()),
                    };
                    Some((name.to_string(), encoded))
                })
                .collect();
            serde_json::Value::Object(row)
        })
        .collect();

    Ok(json!({
        "rows": rows,
        "groupBys": encoder.get_group_bys(),
        "legends": encoder.legends(),
    }))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encodable=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = CompletionOptions {
        use_local_time: cli.local_time,
    };

    let output = match cli.command {
        Commands::Complete { channel_type, def } => {
            let def: ChannelDef =
                serde_json::from_str(&def).context("Failed to parse channel definition")?;
            let complete = complete_channel_def_with(channel_type, &def, &options);
            (serde_json::to_string_pretty(&complete)?, None)
        }
        Commands::Encode {
            channels,
            encoding,
            data,
            output,
        } => {
            let result = encode(&channels, &encoding, &data, &options)?;
            (serde_json::to_string_pretty(&result)?, output)
        }
    };

    match output {
        (text, Some(path)) => {
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        (text, None) => println!("{}", text),
    }
    Ok(())
}
