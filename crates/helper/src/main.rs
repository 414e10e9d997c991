// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test helper binary entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use test_helper::cli::Cli;
use test_helper::env::TEST_HELPER_LOG;

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(TEST_HELPER_LOG).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli.run(&mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
