use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tcsv_translator::config::{find_default_config, init_default_config, load_config};
use tcsv_translator::container::{decrypt_to_plaintext, encrypt_file};
use tcsv_translator::key::ContainerKey;
use tcsv_translator::merge::merge_lines;
use tcsv_translator::{FsStorage, Storage, Translator, TranslatorConfig};

#[derive(Parser, Debug)]
#[command(name = "tcsv-translator")]
#[command(about = "Dictionary translation tools: build, encrypt and query translation.csv", long_about = None)]
struct Args {
    /// Config file path (default: search for tcsv-translator.toml upwards)
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a plaintext dictionary into a TCSV1 container
    Encrypt {
        #[arg(short, long, default_value = "translation.csv")]
        input: PathBuf,
        #[arg(short, long, default_value = "translation.csv.enc")]
        output: PathBuf,
        /// Base64 AES-256 key (overrides the config file)
        #[arg(long)]
        key: Option<String>,
    },
    /// Decrypt a TCSV1 container back into a plaintext dictionary
    Decrypt {
        #[arg(short, long, default_value = "translation.csv.enc")]
        input: PathBuf,
        #[arg(short, long, default_value = "translation.csv")]
        output: PathBuf,
        /// Base64 AES-256 key (overrides the config file)
        #[arg(long)]
        key: Option<String>,
    },
    /// Merge line-aligned original and translated text files into a dictionary
    Merge {
        #[arg(value_name = "ORIGINAL")]
        original: PathBuf,
        #[arg(value_name = "TRANSLATED")]
        translated: PathBuf,
        #[arg(short, long, default_value = "translation.csv")]
        output: PathBuf,
    },
    /// Translate text with the configured dictionary
    Lookup {
        #[arg(long, value_enum, default_value_t = Mode::Smart)]
        mode: Mode,
        /// Asset directory (overrides the config file)
        #[arg(long, value_name = "DIR")]
        assets: Option<PathBuf>,
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },
    /// Write a default config file, then exit
    InitConfig {
        /// Directory to write the config into (default: current directory)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Exact,
    Substring,
    Smart,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<TranslatorConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("current dir")?;
            find_default_config(&cwd)
        }
    };
    match path {
        Some(p) => {
            tracing::debug!(config = %p.display(), "using config file");
            load_config(&p)
        }
        None => Ok(TranslatorConfig::default()),
    }
}

fn resolve_key(flag: Option<&str>, cfg: &TranslatorConfig) -> anyhow::Result<ContainerKey> {
    match flag.or(cfg.key.as_deref()) {
        Some(encoded) => ContainerKey::from_base64(encoded).context("parse key"),
        None => {
            tracing::warn!("no key configured; using the development key");
            Ok(ContainerKey::default())
        }
    }
}

fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    FsStorage
        .read_all_lines_utf8(path)
        .with_context(|| format!("read text: {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Command::InitConfig { dir, force } = &args.command {
        let dir = dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, *force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let cfg = resolve_config(args.config.as_deref())?;

    match args.command {
        Command::Encrypt { input, output, key } => {
            let key = resolve_key(key.as_deref(), &cfg)?;
            let iv = encrypt_file(&FsStorage, &input, &output, &key)
                .with_context(|| format!("encrypt {}", input.display()))?;
            eprintln!(
                "[OK] wrote {} (IV={}, key={})",
                output.display(),
                hex::encode(iv),
                key.fingerprint()
            );
        }
        Command::Decrypt { input, output, key } => {
            let key = resolve_key(key.as_deref(), &cfg)?;
            if !decrypt_to_plaintext(&FsStorage, &input, &output, &key) {
                return Err(anyhow::anyhow!(
                    "could not decrypt {} (wrong key or damaged file)",
                    input.display()
                ));
            }
            eprintln!("[OK] wrote {}", output.display());
        }
        Command::Merge {
            original,
            translated,
            output,
        } => {
            let original = read_lines(&original)?;
            let translated = read_lines(&translated)?;
            let merged = merge_lines(&original, &translated);
            if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("create dir: {}", dir.display()))?;
            }
            std::fs::write(&output, &merged.csv)
                .with_context(|| format!("write dictionary: {}", output.display()))?;
            eprintln!("[OK] merged {} lines -> {}", merged.rows, output.display());
        }
        Command::Lookup {
            mode,
            assets,
            texts,
        } => {
            let cfg = match assets {
                Some(dir) => TranslatorConfig {
                    assets_dir: dir,
                    ..cfg
                },
                None => cfg,
            };
            let translator = Translator::new(cfg);
            for text in &texts {
                let out = match mode {
                    Mode::Exact => translator.translate(text),
                    Mode::Substring => translator.translate_with_substring(text),
                    Mode::Smart => translator.translate_smart(text),
                };
                println!("{out}");
            }
        }
        Command::InitConfig { .. } => {}
    }
    Ok(())
}
