// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use futures::{
    future::{select, Either},
    FutureExt,
};
use lvmsnapshot_agent::{action_plugins::create_registry, agent_error::Result, reader};
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() -> Result<()> {
    lvmsnapshot_tracing::init();

    tracing::info!("Starting lvmsnapshot agent");

    let registry = create_registry();

    let mut sigterm = signal(SignalKind::terminate()).expect("Could not listen to SIGTERM");
    let mut sigint = signal(SignalKind::interrupt()).expect("Could not listen to SIGINT");

    let reader = reader::create_reader(&registry, tokio::io::stdin(), tokio::io::stdout()).boxed();
    let signals = select(sigterm.recv().boxed(), sigint.recv().boxed());

    match select(reader, signals).await {
        Either::Left((r, _)) => {
            r?;

            tracing::info!("Input closed, exiting");
        }
        Either::Right(_) => {
            // Dropping the reader kills any child still running.
            tracing::info!("Terminating on signal...");
        }
    }

    Ok(())
}
