// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stressbot: turn `go test` stress output into issues, and queue stress builds

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use stressbot::commands::{run_parse, run_post, run_trigger};
use stressbot::config::{Command, Config};
use stressbot::poster::Repository;
use stressbot_parser::ParseOptions;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the JSON records
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    config.validate()?;
    debug!(command = ?config.command, "Starting stressbot");

    let stdout = io::stdout().lock();
    match config.command {
        Command::Parse {
            input,
            flush_unterminated,
        } => {
            let options = ParseOptions { flush_unterminated };
            run_parse(open_input(input.as_deref())?, stdout, &options)
                .context("failed to parse test output")?;
        }
        Command::Post {
            package,
            sha,
            owner,
            repo,
            input,
        } => {
            run_post(
                open_input(input.as_deref())?,
                stdout,
                Repository::new(owner, repo),
                &package,
                &sha,
            )
            .context("failed to post stress failures")?;
        }
        Command::Trigger {
            build,
            branch,
            goflags,
            packages,
        } => {
            run_trigger(
                io::stdin().lock(),
                stdout,
                &build,
                &branch,
                &goflags,
                &packages,
            )
            .with_context(|| format!("failed to queue stress builds for {build}"))?;
        }
    }

    Ok(())
}

/// Open the input file, or stdin when none is given
fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}
