pub mod encoding_option;
pub mod request_timeout;
pub mod thread_delay;

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::PathBuf;

use crate::{
    block::{self, Block, BlockSize},
    cli::SolveCli,
};

use self::{encoding_option::EncodingOption, request_timeout::RequestTimeout, thread_delay::ThreadDelay};

/// Where the `solve` subcommand gets its yes/no answers from.
pub enum OracleLocation {
    Web {
        url: Url,
        timeout: RequestTimeout,
        delay: ThreadDelay,
    },
    Script(PathBuf),
}

/// Fully resolved configuration for a `solve` run: the raw CLI strings
/// turned into the typed values the rest of the program needs.
pub struct SolveConfig {
    pub blocks: Vec<Block>,
    pub block_size: BlockSize,
    pub oracle_location: OracleLocation,
    pub output_plaintext: Option<PathBuf>,
    pub no_tui: bool,
}

impl TryFrom<SolveCli> for SolveConfig {
    type Error = anyhow::Error;

    fn try_from(cli: SolveCli) -> Result<Self> {
        let raw = cli
            .format
            .decode(&cli.ciphertext)
            .context("Failed to decode --ciphertext")?;

        let mut blocks = block::chunk_into_blocks(&raw, cli.block_size)
            .context("--ciphertext is not block-aligned for --block-size")?;
        if cli.no_iv {
            // Synthesize an all-zero IV block so the solver's "block 0 is
            // the IV, never decrypted" invariant holds uniformly.
            blocks.insert(0, Block::zeroed(cli.block_size));
        }

        let oracle_location = match (cli.web, cli.guess_fn) {
            (Some(url), None) => OracleLocation::Web {
                url,
                timeout: cli.request_timeout,
                delay: cli.thread_delay,
            },
            (None, Some(path)) => OracleLocation::Script(path),
            (Some(_), Some(_)) => {
                anyhow::bail!("--web and --guess-fn are mutually exclusive")
            }
            (None, None) => anyhow::bail!("One of --web or --guess-fn is required"),
        };

        Ok(Self {
            blocks,
            block_size: cli.block_size,
            oracle_location,
            output_plaintext: cli.output_plaintext,
            no_tui: cli.no_tui,
        })
    }
}
