use std::path::PathBuf;

use clap::{AppSettings, Parser, Subcommand};
use clap_complete::Shell;
use log::LevelFilter;
use reqwest::Url;

use crate::{
    block::BlockSize,
    config::{encoding_option::EncodingOption, request_timeout::RequestTimeout, thread_delay::ThreadDelay},
};

/// CBC padding-oracle attack engine with a live terminal visualization.
#[derive(Parser, Debug)]
#[clap(
    about,
    long_about = None,
    version,
    setting =
    AppSettings::SubcommandRequired |
    AppSettings::PropagateVersion |
    AppSettings::DisableHelpSubcommand |
    AppSettings::InferSubcommands
)]
pub struct Cli {
    #[clap(
        help = "Increase verbosity",
        long_help = "Increase verbosity of logging",
        short = 'v',
        long = "verbose",
        aliases = &["verbose", "verbosity"],
        global = true,
        parse(from_occurrences)
    )]
    pub verbosity: u8,
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    #[clap(
        about = "Solve scenario A: a single target block",
        display_order = 1
    )]
    Demo1,
    #[clap(
        about = "Solve scenario B: several identical-character blocks, exercising a full-width pad",
        display_order = 2
    )]
    Demo2,
    #[clap(
        about = "Solve scenario C: a longer multi-paragraph message",
        display_order = 3
    )]
    Demo3,
    #[clap(about = "Attack a user-supplied oracle", display_order = 4)]
    Solve(SolveCli),
    #[clap(
        about = "Launch the reference demo oracle service",
        display_order = 5
    )]
    DemoApi(DemoApiCli),
    #[clap(
        about = "Generate a shell auto-completion script",
        display_order = 6
    )]
    Setup(SetupCli),
}

#[derive(clap::Args, Debug)]
pub struct SolveCli {
    #[clap(help = "Cyphertext to decrypt, as `iv ‖ body` unless --no-iv", short = 'c', long = "ciphertext")]
    pub ciphertext: String,
    #[clap(
        help = "Text encoding of --ciphertext",
        long_help = "Text encoding of --ciphertext\n\n[options: b64, b64_urlsafe, hex, raw]",
        short = 'f',
        long = "format",
        default_value_t = EncodingOption::Base64
    )]
    pub format: EncodingOption,
    #[clap(help = "Cyphertext does not include an IV as its first block", long = "no-iv")]
    pub no_iv: bool,
    #[clap(help = "Block size used by the cypher", long = "block-size", default_value_t = BlockSize::Sixteen)]
    pub block_size: BlockSize,

    #[clap(help = "Web oracle URL", short = 'w', long = "web", conflicts_with = "guess-fn")]
    pub web: Option<Url>,
    #[clap(help = "Path to an executable oracle plugin", short = 'g', long = "guess-fn")]
    pub guess_fn: Option<PathBuf>,

    #[clap(
        help = "Web request timeout, in seconds",
        long = "timeout",
        default_value_t = RequestTimeout::default()
    )]
    pub request_timeout: RequestTimeout,
    #[clap(
        help = "Delay between web requests, in milliseconds",
        long = "delay",
        default_value_t = ThreadDelay::default()
    )]
    pub thread_delay: ThreadDelay,

    #[clap(
        help = "Write the recovered plaintext to PATH.plaintext instead of stdout",
        short = 'O',
        long = "output-plaintext"
    )]
    pub output_plaintext: Option<PathBuf>,
    #[clap(help = "Disable the terminal visualization", long = "no-tui")]
    pub no_tui: bool,
}

#[derive(clap::Args, Debug)]
pub struct DemoApiCli {
    #[clap(help = "Address to listen on", long = "bind", default_value = "127.0.0.1:8000")]
    pub bind: String,
}

#[derive(clap::Args, Debug)]
pub struct SetupCli {
    pub shell: Shell,
}
