mod block;
mod channel;
mod cli;
mod config;
mod demo_api;
mod logging;
mod oracle;
mod plain_text;
mod solver;
mod tui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::thread;
use log::{error, info};

use crate::{
    block::BlockSize,
    cli::{Cli, SolveCli, SubCommand},
    config::{OracleLocation, SolveConfig},
    logging::{init_logging, LOG_TARGET},
    oracle::{demo::AesCbcOracle, script::ScriptOracle, web::WebOracle, Oracle},
    solver::{SolveError, StateSnapshot},
    tui::Tui,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let SubCommand::Setup(setup_cli) = cli.sub_command {
        generate_shell_autocomplete(setup_cli.shell);
        return ExitCode::SUCCESS;
    }

    if let Err(e) = init_logging(cli.log_level()) {
        eprintln!("Failed to initialize logging: {:?}", e);
        return ExitCode::from(2);
    }

    match run(cli.sub_command) {
        Ok(code) => code,
        Err(e) => {
            error!(target: LOG_TARGET, "{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn run(sub_command: SubCommand) -> Result<ExitCode> {
    match sub_command {
        SubCommand::Demo1 => run_demo(demo_plaintext_a()),
        SubCommand::Demo2 => run_demo(demo_plaintext_b()),
        SubCommand::Demo3 => run_demo(demo_plaintext_c()),
        SubCommand::Solve(solve_cli) => run_solve(solve_cli),
        SubCommand::DemoApi(demo_api_cli) => {
            demo_api::run(&demo_api_cli.bind)?;
            Ok(ExitCode::SUCCESS)
        }
        SubCommand::Setup(_) => unreachable!("handled before logging was initialized"),
    }
}

/// A single target block.
fn demo_plaintext_a() -> &'static [u8] {
    b"Hello, world!"
}

/// Scenario B: five blocks of a single repeated character each, exercising
/// the `k == block_size` unconditional-confirmation path.
fn demo_plaintext_b() -> &'static [u8] {
    b"aaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbccccccccccccccccddddddddddddddddeeeeeeeeeeeeeeee"
}

/// Scenario C: a longer multi-line message.
fn demo_plaintext_c() -> &'static [u8] {
    b"Bad stuff happens in the bathroom\nwhen the padding is wrong.\nThis message runs a few blocks long\nto give the table something to scroll through."
}

fn run_demo(plaintext: &[u8]) -> Result<ExitCode> {
    let oracle = AesCbcOracle::random();
    let padded = plain_text::pad(plaintext, BlockSize::Sixteen.as_usize());
    let ciphertext_body = oracle.encrypt(&padded);

    let mut blocks = block::chunk_into_blocks(&ciphertext_body[..16], BlockSize::Sixteen)?;
    blocks.extend(block::chunk_into_blocks(&ciphertext_body[16..], BlockSize::Sixteen)?);

    solve_and_render(&oracle, &blocks, None, false)
}

fn run_solve(solve_cli: SolveCli) -> Result<ExitCode> {
    let config = SolveConfig::try_from(solve_cli)?;

    match config.oracle_location {
        OracleLocation::Web { url, timeout, delay } => {
            let oracle = WebOracle::new(url, timeout, delay)?;
            solve_and_render(&oracle, &config.blocks, config.output_plaintext, config.no_tui)
        }
        OracleLocation::Script(path) => {
            let oracle = ScriptOracle::load(path)?;
            solve_and_render(&oracle, &config.blocks, config.output_plaintext, config.no_tui)
        }
    }
}

/// Runs the solver and (unless `no_tui`) the renderer concurrently, one
/// thread per concern, joined via `crossbeam::thread::scope`. The renderer
/// never outlives the solver thread and vice versa: `scope` blocks until
/// both finish.
fn solve_and_render(
    oracle: &(impl Oracle + Sync),
    blocks: &[block::Block],
    output_plaintext: Option<std::path::PathBuf>,
    no_tui: bool,
) -> Result<ExitCode> {
    let channel = channel::StateChannel::<StateSnapshot>::new();
    let started = std::time::Instant::now();

    let solved = thread::scope(|scope| -> Result<Result<Vec<block::Block>, SolveError>> {
        let render_handle = if no_tui {
            None
        } else {
            Some(scope.spawn(|_| -> Result<()> {
                let mut tui = Tui::new().context("Failed to initialize terminal")?;
                tui.run(&channel)
            }))
        };

        let solve_result = solver::solve_message(oracle, &channel, blocks);

        if let Some(handle) = render_handle {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("Renderer thread panicked"))??;
        }

        Ok(solve_result)
    })
    .map_err(|_| anyhow::anyhow!("Solver thread panicked"))??;

    let solved = match solved {
        Ok(blocks) => blocks,
        Err(SolveError::Cancelled) => {
            info!(target: LOG_TARGET, "Solve cancelled by user");
            return Ok(ExitCode::from(130));
        }
        Err(e) => {
            error!(target: LOG_TARGET, "{}", e);
            return Ok(ExitCode::from(1));
        }
    };

    info!(
        target: LOG_TARGET,
        "Recovered {} block(s) in {}",
        solved.len(),
        humantime::format_duration(started.elapsed()),
    );

    let plaintext = plain_text::strip_padding(&solved, BlockSize::Sixteen.as_usize())
        .context("Recovered plaintext failed PKCS#7 validation")?;

    match output_plaintext {
        Some(path) => {
            let path = path.with_extension("plaintext");
            std::fs::write(&path, &plaintext)
                .with_context(|| format!("Failed to write `{}`", path.display()))?;
            info!(target: LOG_TARGET, "Wrote recovered plaintext to `{}`", path.display());
        }
        None => {
            println!("{}", String::from_utf8_lossy(&plaintext));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn generate_shell_autocomplete(shell: clap_complete::Shell) {
    let mut cmd = <Cli as clap::CommandFactory>::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
