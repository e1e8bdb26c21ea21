//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::json;

use crate::config::ProcessorConfig;
use crate::effects::{resolve_parameters, EffectType};
use crate::engine::{AudioBuffer, AudioInput};
use crate::error::{RemixError, Result};
use crate::graph::build_graph;
use crate::pipeline::Processor;

/// Options for the `process` command
#[derive(Debug, Clone)]
pub struct ProcessOptions<'a> {
    pub input: &'a Path,
    pub effect: EffectType,
    pub output: Option<&'a Path>,
    pub output_dir: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub max_size_mb: Option<u64>,
}

/// Load the configuration file (if any) and apply command-line overrides
pub fn load_config(path: Option<&Path>, max_size_mb: Option<u64>) -> Result<ProcessorConfig> {
    let mut config = match path {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            ProcessorConfig::from_json_file(path)?
        }
        None => ProcessorConfig::default(),
    };
    if let Some(mb) = max_size_mb {
        config = config.with_max_input_mb(mb);
    }
    Ok(config)
}

/// Where the processed file is written
fn output_path(options: &ProcessOptions<'_>, processor: &Processor) -> PathBuf {
    if let Some(output) = options.output {
        return output.to_path_buf();
    }

    let file_name = options
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let name = processor.output_file_name(&file_name);

    match options.output_dir {
        Some(dir) => dir.join(name),
        None => options
            .input
            .parent()
            .map(|p| p.join(&name))
            .unwrap_or_else(|| PathBuf::from(&name)),
    }
}

/// Apply an effect to a file and write the WAV result.
pub fn process(options: &ProcessOptions<'_>) -> Result<PathBuf> {
    let config = load_config(options.config, options.max_size_mb)?;
    let processor = Processor::new(config);

    info!(
        "Processing {} with {}",
        options.input.display(),
        options.effect
    );

    let size = fs::metadata(options.input)?.len();
    let limit = processor.config().max_input_bytes;
    if size > limit {
        return Err(RemixError::Oversize { size, limit });
    }

    let bytes = fs::read(options.input)?;
    let mut input = AudioInput::new(bytes);
    if let Some(name) = options.input.file_name() {
        input = input.with_name(name.to_string_lossy());
    }

    let blob = processor.process(&input, options.effect, &mut |percent: u8| {
        info!("Progress: {}%", percent)
    })?;

    let path = output_path(options, &processor);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    blob.write_to(&path)?;

    println!("Wrote: {}", path.display());
    println!("Size: {} bytes", blob.len());
    println!("SHA-256: {}", blob.sha256_hex());

    Ok(path)
}

/// Print every available effect.
pub fn list_effects() -> Result<()> {
    println!("{:<14} {:<14} {}", "SLUG", "NAME", "DESCRIPTION");
    for effect in EffectType::ALL {
        println!(
            "{:<14} {:<14} {}",
            effect.slug(),
            effect.display_name(),
            effect.summary()
        );
    }
    Ok(())
}

/// Resolved parameters and graph topology of an effect as JSON
///
/// The graph is built over one second of mono silence at 44.1 kHz.
pub fn describe_effect(effect: EffectType) -> serde_json::Value {
    let params = resolve_parameters(effect);
    let graph = build_graph(AudioBuffer::new(1, 44100, 44100), &params);
    debug!("Describing {} ({} nodes)", effect, graph.nodes().len());

    json!({
        "effect": effect,
        "slug": effect.slug(),
        "parameters": params,
        "graph": graph.describe(),
    })
}

/// Print the description of an effect.
pub fn describe(effect: EffectType) -> Result<()> {
    let description = describe_effect(effect);
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::encode_wav;
    use tempfile::TempDir;

    #[test]
    fn test_describe_effect() {
        let json = describe_effect(EffectType::Echo);
        assert_eq!(json["effect"], "Echo / Delay");
        assert_eq!(json["slug"], "echo");
        assert_eq!(json["parameters"]["type"], "echo");
        assert_eq!(json["graph"]["nodes"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_load_config_override() {
        let config = load_config(None, Some(15)).unwrap();
        assert_eq!(config.max_input_bytes, 15 * 1024 * 1024);
    }

    #[test]
    fn test_process_writes_prefixed_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("tone.wav");
        let audio = AudioBuffer::new(1, 1000, 8000);
        fs::write(&input, encode_wav(&audio).unwrap().as_bytes()).unwrap();

        let out_dir = dir.path().join("out");
        let options = ProcessOptions {
            input: &input,
            effect: EffectType::Slow050,
            output: None,
            output_dir: Some(&out_dir),
            config: None,
            max_size_mb: None,
        };

        let path = process(&options).unwrap();
        assert_eq!(path, out_dir.join("GOH_REMIX_tone.wav"));
        assert_eq!(fs::metadata(&path).unwrap().len(), 44 + 2 * 2000);
    }

    #[test]
    fn test_process_rejects_oversize_before_reading() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("big.wav");
        let file = fs::File::create(&input).unwrap();
        file.set_len(1024 * 1024 + 1).unwrap();

        let out_dir = dir.path().join("out");
        let options = ProcessOptions {
            input: &input,
            effect: EffectType::Reverse,
            output: None,
            output_dir: Some(&out_dir),
            config: None,
            max_size_mb: Some(1),
        };

        let err = process(&options).unwrap_err();
        assert!(matches!(
            err,
            RemixError::Oversize {
                size: 1_048_577,
                limit: 1_048_576
            }
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_process_missing_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("missing.wav");
        let options = ProcessOptions {
            input: &input,
            effect: EffectType::Reverse,
            output: None,
            output_dir: None,
            config: None,
            max_size_mb: None,
        };
        let err = process(&options).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
