//! memfs - mount an in-memory filesystem through libfuse3.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use fusebridge::{Fuse, LoggingOps, MountConfig, OptionValue};
use fusebridge_memfs::MemFs;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "memfs", version, about = "Mount an in-memory filesystem")]
struct Args {
    /// Where to mount
    mountpoint: Option<PathBuf>,

    /// TOML mount configuration; flags given here override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stay in the foreground
    #[arg(short, long)]
    foreground: bool,

    /// libfuse debug output (implies --foreground)
    #[arg(short, long)]
    debug: bool,

    /// Serve requests on a single thread
    #[arg(short, long)]
    single_thread: bool,

    /// Let other users access the mount
    #[arg(long)]
    allow_other: bool,

    /// Log every operation at debug level
    #[arg(long)]
    trace_ops: bool,

    /// Extra mount options, `key` or `key=value`
    #[arg(short = 'o', value_name = "OPTION")]
    options: Vec<String>,
}

impl Args {
    fn mount_config(&self) -> anyhow::Result<MountConfig> {
        let mut config = match (&self.config, &self.mountpoint) {
            (Some(path), _) => MountConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            (None, Some(mountpoint)) => MountConfig::new(mountpoint),
            (None, None) => bail!("a mountpoint or --config is required"),
        };
        if let Some(mountpoint) = &self.mountpoint {
            config.mountpoint = mountpoint.clone();
        }
        config.foreground |= self.foreground || self.debug;
        config.debug |= self.debug;
        config.nothreads |= self.single_thread;
        if self.allow_other {
            config.options.insert("allow_other".into(), OptionValue::Flag(true));
        }
        for option in self.options.iter().flat_map(|o| o.split(',')).filter(|o| !o.is_empty()) {
            let (key, value) = match option.split_once('=') {
                Some((key, value)) => (key, OptionValue::Text(value.to_string())),
                None => (option, OptionValue::Flag(true)),
            };
            config.options.insert(key.to_string(), value);
        }
        Ok(config)
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.mount_config()?;
    tracing::info!(
        mountpoint = %config.mountpoint.display(),
        encoding = %config.encoding,
        "starting memfs"
    );
    if args.trace_ops {
        Fuse::mount(LoggingOps::new(MemFs::new()), &config)?;
    } else {
        Fuse::mount(MemFs::new(), &config)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_onto_config() {
        let args = Args::parse_from(["memfs", "/mnt/m", "-d", "-s", "--allow-other", "-o", "ro,max_read=4096"]);
        let config = args.mount_config().unwrap();
        assert!(config.foreground && config.debug && config.nothreads);
        assert_eq!(config.option_string("MemFs"), "fsname=MemFs,allow_other,ro,max_read=4096");
    }

    #[test]
    fn test_config_file_with_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memfs.toml");
        std::fs::write(&path, "mountpoint = \"/mnt/a\"\n[options]\nsubtype = \"mem\"\n").unwrap();

        let args = Args::parse_from(["memfs", "/mnt/b", "--config", path.to_str().unwrap(), "-f"]);
        let config = args.mount_config().unwrap();
        assert_eq!(config.mountpoint, PathBuf::from("/mnt/b"));
        assert!(config.foreground);
        assert_eq!(config.options["subtype"], OptionValue::Text("mem".into()));
    }

    #[test]
    fn test_mountpoint_required() {
        let args = Args::parse_from(["memfs"]);
        assert!(args.mount_config().is_err());
    }
}
