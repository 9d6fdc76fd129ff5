use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use serde::Deserialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::distribution::Distribution;

#[derive(Debug)]
pub enum ResolveError {
    /// The invocation could not be parsed; the caller shows usage and exits cleanly.
    /// Carries the values applied before the rejected token.
    Usage(Config),
    /// Bad distribution discriminator. Fatal.
    InvalidDistribution(String),
    ConfigFile { path: PathBuf, reason: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Usage(_) => write!(f, "usage requested"),
            ResolveError::InvalidDistribution(s) => write!(f, "invalid distribution {}", s),
            ResolveError::ConfigFile { path, reason } => {
                write!(f, "config file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

fn parse_distribution(s: &str) -> Result<Distribution, String> {
    Distribution::from_discriminator(s).ok_or_else(|| format!("invalid distribution {}", s))
}

/// Multipole run parameters.
#[derive(Debug, Parser)]
#[command(name = "fmm-args")]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(args_override_self = true, infer_long_args = true)]
pub struct Cli {
    /// Number of bodies per leaf node
    #[arg(short = 'c', long = "ncrit", value_name = "N", allow_negative_numbers = true)]
    pub ncrit: Option<i64>,

    /// Body distribution: c (cube), s (sphere), p (plummer)
    #[arg(
        short = 'd',
        long = "distribution",
        value_name = "c|s|p",
        value_parser = parse_distribution,
        allow_hyphen_values = true
    )]
    pub distribution: Option<Distribution>,

    /// Wavenumber of the Helmholtz kernel
    #[arg(short = 'k', long = "wavenumber", value_name = "K", allow_negative_numbers = true)]
    pub wavenumber: Option<f64>,

    /// Max level of the tree (non-adaptive trees only)
    #[arg(short = 'l', long = "maxlevel", value_name = "LEVEL", allow_negative_numbers = true)]
    pub maxlevel: Option<i64>,

    /// Number of bodies
    #[arg(short = 'n', long = "numBodies", value_name = "N", allow_negative_numbers = true)]
    pub num_bodies: Option<i64>,

    /// Order of expansion
    #[arg(short = 'P', long = "P", value_name = "P", allow_negative_numbers = true)]
    pub order: Option<i64>,

    /// Number of threads
    #[arg(short = 'T', long = "threads", value_name = "N", allow_negative_numbers = true)]
    pub threads: Option<i64>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Non-option words are skipped.
    #[arg(hide = true, num_args = 0..)]
    _rest: Vec<String>,
}

impl Cli {
    fn parse_tokens(program: &str, args: &[OsString]) -> Result<Self, clap::Error> {
        Self::try_parse_from(std::iter::once(OsString::from(program)).chain(args.iter().cloned()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub bodies: BodiesConfig,

    #[serde(default)]
    pub tree: TreeConfig,

    #[serde(default)]
    pub kernel: KernelConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BodiesConfig {
    pub count: Option<i64>,
    pub distribution: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub ncrit: Option<i64>,
    pub maxlevel: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub order: Option<i64>,
    pub wavenumber: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub threads: Option<i64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ResolveError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ResolveError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Resolved run parameters. Built once by [`Config::resolve`], read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    ncrit: i64,
    distribution: Distribution,
    wavenumber: f64,
    maxlevel: i64,
    num_bodies: i64,
    order: i64,
    threads: i64,
}

/// Threads the host reports it can run in parallel, or 1 if it cannot say.
pub fn host_parallelism() -> i64 {
    std::thread::available_parallelism()
        .map(|n| n.get() as i64)
        .unwrap_or(1)
}

impl Default for Config {
    fn default() -> Self {
        Self::with_threads(host_parallelism())
    }
}

impl Config {
    fn with_threads(threads: i64) -> Self {
        Self {
            ncrit: 64,
            distribution: Distribution::default(),
            wavenumber: 20.0,
            maxlevel: 5,
            num_bodies: 1_000_000,
            order: 4,
            threads,
        }
    }

    /// Build the final config: defaults -> file values -> CLI overrides.
    ///
    /// `args` excludes the program name. Tokens are taken in order, so a bad
    /// distribution is reported before any later unknown option.
    pub fn resolve<I, T>(program: &str, args: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let threads = host_parallelism();
        debug!(threads, "host parallelism");

        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match Cli::parse_tokens(program, &args) {
            Ok(cli) => Self::with_threads(threads).layered(cli),
            Err(e) => Err(rejected(e, || Self::in_effect(program, &args, threads))),
        }
    }

    fn layered(mut self, cli: Cli) -> Result<Self, ResolveError> {
        if let Some(path) = &cli.config {
            debug!(path = %path.display(), "loading config file");
            let file = FileConfig::load(path)?;
            self.apply(Overrides::from_file(file)?);
        }
        self.apply(Overrides::from_cli(cli));
        Ok(self)
    }

    /// Values set by the longest leading run of tokens that parses on its own.
    fn in_effect(program: &str, args: &[OsString], threads: i64) -> Self {
        (0..args.len())
            .rev()
            .find_map(|n| Cli::parse_tokens(program, &args[..n]).ok())
            .and_then(|cli| Self::with_threads(threads).layered(cli).ok())
            .unwrap_or_else(|| Self::with_threads(threads))
    }

    fn apply(&mut self, o: Overrides) {
        if let Some(v) = o.ncrit {
            self.ncrit = v;
        }
        if let Some(d) = o.distribution {
            self.distribution = d;
        }
        if let Some(v) = o.wavenumber {
            self.wavenumber = v;
        }
        if let Some(v) = o.maxlevel {
            self.maxlevel = v;
        }
        if let Some(v) = o.num_bodies {
            self.num_bodies = v;
        }
        if let Some(v) = o.order {
            self.order = v;
        }
        if let Some(v) = o.threads {
            self.threads = v;
        }
    }

    pub fn ncrit(&self) -> i64 {
        self.ncrit
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn wavenumber(&self) -> f64 {
        self.wavenumber
    }

    /// Only meaningful for non-adaptive trees.
    pub fn maxlevel(&self) -> i64 {
        self.maxlevel
    }

    pub fn num_bodies(&self) -> i64 {
        self.num_bodies
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn threads(&self) -> i64 {
        self.threads
    }
}

/// A rejected distribution value is fatal; anything else clap refuses is a usage request.
fn rejected(e: clap::Error, in_effect: impl FnOnce() -> Config) -> ResolveError {
    debug!(kind = ?e.kind(), "command line rejected");
    if e.kind() == ErrorKind::ValueValidation {
        let on_distribution = matches!(
            e.get(ContextKind::InvalidArg),
            Some(ContextValue::String(arg)) if arg.starts_with("--distribution")
        );
        if let (true, Some(ContextValue::String(value))) =
            (on_distribution, e.get(ContextKind::InvalidValue))
        {
            return ResolveError::InvalidDistribution(value.clone());
        }
    }
    ResolveError::Usage(in_effect())
}

/// One layer of optional values, from either the file or the command line.
struct Overrides {
    ncrit: Option<i64>,
    distribution: Option<Distribution>,
    wavenumber: Option<f64>,
    maxlevel: Option<i64>,
    num_bodies: Option<i64>,
    order: Option<i64>,
    threads: Option<i64>,
}

impl Overrides {
    fn from_file(f: FileConfig) -> Result<Self, ResolveError> {
        let distribution = match f.bodies.distribution {
            Some(s) => Some(
                Distribution::from_discriminator(&s).ok_or(ResolveError::InvalidDistribution(s))?,
            ),
            None => None,
        };
        Ok(Self {
            ncrit: f.tree.ncrit,
            distribution,
            wavenumber: f.kernel.wavenumber,
            maxlevel: f.tree.maxlevel,
            num_bodies: f.bodies.count,
            order: f.kernel.order,
            threads: f.runtime.threads,
        })
    }

    fn from_cli(c: Cli) -> Self {
        Self {
            ncrit: c.ncrit,
            distribution: c.distribution,
            wavenumber: c.wavenumber,
            maxlevel: c.maxlevel,
            num_bodies: c.num_bodies,
            order: c.order,
            threads: c.threads,
        }
    }
}
