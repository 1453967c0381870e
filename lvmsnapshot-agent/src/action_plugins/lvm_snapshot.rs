// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use crate::{
    agent_error::LvmSnapshotAgentError,
    env::{Config, CONFIG},
    lvm::LvmAction,
    runner::{execute, Runner, SystemRunner},
};
use lvmsnapshot_wire_types::snapshot::{Reply, Request};

/// Validates `r`, runs the resulting plan with `runner` and returns
/// whatever status and output the processes produced.
pub async fn run_action<R: Runner + ?Sized>(
    runner: &R,
    cfg: &Config,
    action: LvmAction,
    r: Request,
) -> Result<Reply, LvmSnapshotAgentError> {
    let plan = action.plan(&r, cfg)?;

    tracing::info!(%action, "{}", plan);

    let reply = execute(runner, &plan).await?;

    if reply.status != 0 {
        tracing::warn!(%action, status = reply.status, "{}", reply.err);
    }

    Ok(reply)
}

async fn run_on_host(action: LvmAction, r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_action(&SystemRunner, &CONFIG, action, r).await
}

pub async fn create_percentage_snapshot(r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_on_host(LvmAction::CreatePercentageSnapshot, r).await
}

pub async fn create_mb_snapshot(r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_on_host(LvmAction::CreateMbSnapshot, r).await
}

pub async fn merge_snapshot(r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_on_host(LvmAction::MergeSnapshot, r).await
}

pub async fn remove_snapshot(r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_on_host(LvmAction::RemoveSnapshot, r).await
}

pub async fn mount_snapshot(r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_on_host(LvmAction::MountSnapshot, r).await
}

pub async fn umount_snapshot(r: Request) -> Result<Reply, LvmSnapshotAgentError> {
    run_on_host(LvmAction::UmountSnapshot, r).await
}
