// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use console::style;
use lvmsnapshot_agent::{
    action_plugins::lvm_snapshot::run_action,
    agent_error::LvmSnapshotAgentError,
    env::{Config, CONFIG},
    lvm::LvmAction,
    runner::SystemRunner,
};
use lvmsnapshot_wire_types::snapshot::Request;
use prettytable::{cell, row, Table};
use std::process::exit;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct ActionOpts {
    /// Print the commands that would run and exit
    #[structopt(long = "dry-run")]
    dry_run: bool,

    #[structopt(flatten)]
    request: Request,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "lvmsnapshot-cli")]
/// LVM snapshot agent command line
pub enum App {
    #[structopt(name = "list")]
    /// List the available actions
    List,
    #[structopt(name = "create_percentage_snapshot")]
    /// Create a snapshot sized as a percentage of free space
    CreatePercentageSnapshot(ActionOpts),
    #[structopt(name = "create_mb_snapshot")]
    /// Create a snapshot sized in MiB
    CreateMbSnapshot(ActionOpts),
    #[structopt(name = "merge_snapshot")]
    /// Merge a snapshot into its origin
    MergeSnapshot(ActionOpts),
    #[structopt(name = "remove_snapshot")]
    /// Remove a snapshot
    RemoveSnapshot(ActionOpts),
    #[structopt(name = "mount_snapshot")]
    /// Mount a snapshot
    MountSnapshot(ActionOpts),
    #[structopt(name = "umount_snapshot")]
    /// Unmount the snapshot mount path
    UmountSnapshot(ActionOpts),
}

impl App {
    fn into_action(self) -> Option<(LvmAction, ActionOpts)> {
        let x = match self {
            App::List => return None,
            App::CreatePercentageSnapshot(x) => (LvmAction::CreatePercentageSnapshot, x),
            App::CreateMbSnapshot(x) => (LvmAction::CreateMbSnapshot, x),
            App::MergeSnapshot(x) => (LvmAction::MergeSnapshot, x),
            App::RemoveSnapshot(x) => (LvmAction::RemoveSnapshot, x),
            App::MountSnapshot(x) => (LvmAction::MountSnapshot, x),
            App::UmountSnapshot(x) => (LvmAction::UmountSnapshot, x),
        };

        Some(x)
    }
}

/// The commands `action` would run, as one `;` separated line.
fn render_plan(
    action: LvmAction,
    r: &Request,
    cfg: &Config,
) -> Result<String, LvmSnapshotAgentError> {
    action.plan(r, cfg).map(|x| x.to_string())
}

fn error_exit_code(e: &LvmSnapshotAgentError) -> i32 {
    if e.is_usage() {
        exitcode::USAGE
    } else {
        exitcode::OSERR
    }
}

fn fail(e: &LvmSnapshotAgentError) -> ! {
    eprintln!("{} {}", style("✗").red(), e);
    exit(error_exit_code(e));
}

fn list_actions() {
    let mut table = Table::new();
    table.add_row(row!["Action", "Inputs", "Description"]);

    for x in LvmAction::ALL.iter() {
        let inputs = x.inputs().join(", ");

        table.add_row(row![x.name(), inputs, x.description()]);
    }

    table.printstd();
}

#[tokio::main]
async fn main() {
    lvmsnapshot_tracing::init();

    let (action, opts) = match App::from_args().into_action() {
        Some(x) => x,
        None => {
            list_actions();
            return;
        }
    };

    if opts.dry_run {
        match render_plan(action, &opts.request, &CONFIG) {
            Ok(plan) => println!("{}", plan),
            Err(e) => fail(&e),
        }

        return;
    }

    match run_action(&SystemRunner, &CONFIG, action, opts.request).await {
        Ok(reply) => {
            if !reply.out.is_empty() {
                println!("{}", reply.out);
            }
            if !reply.err.is_empty() {
                eprintln!("{}", reply.err);
            }

            exit(reply.status);
        }
        Err(e) => fail(&e),
    }
}
