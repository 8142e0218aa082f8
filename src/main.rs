use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use testnetgen::config::{ManifestFormat, RunConfig};
use testnetgen::version::GitTagResolver;
use testnetgen::{config_loader, generator, output};

/// Generates randomized end-to-end testnet manifests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for the generated manifests
    #[arg(short, long)]
    dir: PathBuf,

    /// Number of groups to split the manifests into (0 for no grouping)
    #[arg(short, long)]
    groups: Option<usize>,

    /// Weighted node versions, e.g. "v0.34.21:1,latest:1,local:2"
    #[arg(short, long)]
    multi_version: Option<String>,

    /// Seed of the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Base version used to resolve "latest" to a release tag
    #[arg(long)]
    base_version: Option<String>,

    /// Optional YAML run configuration; flags take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Manifest file format
    #[arg(long, value_enum)]
    format: Option<ManifestFormat>,
}

impl Args {
    fn overrides(&self) -> RunConfig {
        RunConfig {
            seed: self.seed,
            groups: self.groups,
            multi_version: self.multi_version.clone(),
            base_version: self.base_version.clone(),
            format: self.format,
            combinations: None,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Output directory: {:?}", args.dir);

    // Layer flags over the optional configuration file
    let file_config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => RunConfig::default(),
    };
    let config = file_config.overridden_by(args.overrides());
    config.validate()?;
    info!("Using seed {}", config.seed());

    // The directory must exist before the repository can be discovered from it
    fs::create_dir_all(&args.dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", args.dir.display()))?;

    // Generate every testnet of the option matrix
    let resolver = GitTagResolver::new(config.base_version());
    let manifests = generator::generate(&config.generate_request(&args.dir), &resolver)
        .wrap_err("Failed to generate testnets")?;

    // Write manifests, grouped if requested
    output::write_manifests(&args.dir, &manifests, config.groups(), config.format())?;

    info!("Generation completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["testnetgen", "--dir", "networks/generated"]);

        assert_eq!(args.dir, PathBuf::from("networks/generated"));
        assert_eq!(args.groups, None);
        assert_eq!(args.overrides(), RunConfig::default());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "testnetgen",
            "-d", "out",
            "-g", "4",
            "-m", "v0.34.21:1,local:2",
            "--seed", "7",
            "--base-version", "0.34.21",
            "-c", "generator.yaml",
            "--format", "json",
        ]);

        let overrides = args.overrides();
        assert_eq!(overrides.groups, Some(4));
        assert_eq!(overrides.seed, Some(7));
        assert_eq!(overrides.multi_version.as_deref(), Some("v0.34.21:1,local:2"));
        assert_eq!(overrides.base_version.as_deref(), Some("0.34.21"));
        assert_eq!(overrides.format, Some(ManifestFormat::Json));
        assert_eq!(args.config, Some(PathBuf::from("generator.yaml")));
    }

    #[test]
    fn test_dir_is_required() {
        assert!(Args::try_parse_from(["testnetgen"]).is_err());
    }
}
