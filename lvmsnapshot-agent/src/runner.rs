// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use crate::lvm::{Invocation, Plan};
use async_trait::async_trait;
use lvmsnapshot_cmd::{chomp, CaptureCommandExt, CmdError, Command, OutputExt};
use lvmsnapshot_wire_types::snapshot::Reply;

/// What a single process left behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capture {
    pub status: i32,
    pub out: String,
    pub err: String,
}

/// Launches an `Invocation` and collects its exit status and output.
///
/// A non-zero status must be returned as a `Capture`, not an error.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, x: &Invocation) -> Result<Capture, CmdError>;
}

/// Runs invocations on this host, without a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl Runner for SystemRunner {
    async fn run(&self, x: &Invocation) -> Result<Capture, CmdError> {
        let output = Command::new(&x.program)
            .args(&x.args)
            .kill_on_drop(true)
            .captured_output(x.program.clone())
            .await?;

        Ok(Capture {
            status: output.exit_code(),
            out: output.stdout_string_lossy(),
            err: output.stderr_string_lossy(),
        })
    }
}

/// Runs every step of `plan` in order, like a `;` separated shell line.
///
/// The reply carries the last step's status. Output from all steps is
/// joined with newlines, with trailing newlines removed.
pub async fn execute<R: Runner + ?Sized>(runner: &R, plan: &Plan) -> Result<Reply, CmdError> {
    let mut status = 0;
    let mut outs = vec![];
    let mut errs = vec![];

    for x in &plan.0 {
        tracing::debug!("Running {}", x);

        let c = runner.run(x).await?;

        tracing::debug!(status = c.status, "{} finished", x.program);

        status = c.status;

        let out = chomp(&c.out);
        if !out.is_empty() {
            outs.push(out.to_string());
        }

        let err = chomp(&c.err);
        if !err.is_empty() {
            errs.push(err.to_string());
        }
    }

    Ok(Reply {
        status,
        out: outs.join("\n"),
        err: errs.join("\n"),
    })
}
