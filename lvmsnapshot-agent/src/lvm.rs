// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

//! Translates snapshot requests into argument vectors for the LVM tools.
//!
//! Nothing here goes through a shell. Every parameter becomes exactly one
//! argument, so a value can never be reinterpreted as a second command.

use crate::{
    agent_error::{LvmSnapshotAgentError, Result},
    env::Config,
};
use lvmsnapshot_wire_types::snapshot::Request;
use std::{fmt, str::FromStr};

/// LVM refuses names longer than this.
const MAX_LVM_NAME_LEN: usize = 127;

/// A single program launch.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.program)?;

        for x in &self.args {
            write!(f, " {}", x)?;
        }

        Ok(())
    }
}

/// The ordered steps making up one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan(pub Vec<Invocation>);

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let xs: Vec<String> = self.0.iter().map(|x| x.to_string()).collect();

        write!(f, "{}", xs.join("; "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LvmAction {
    CreatePercentageSnapshot,
    CreateMbSnapshot,
    MergeSnapshot,
    RemoveSnapshot,
    MountSnapshot,
    UmountSnapshot,
}

impl LvmAction {
    pub const ALL: [LvmAction; 6] = [
        LvmAction::CreatePercentageSnapshot,
        LvmAction::CreateMbSnapshot,
        LvmAction::MergeSnapshot,
        LvmAction::RemoveSnapshot,
        LvmAction::MountSnapshot,
        LvmAction::UmountSnapshot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CreatePercentageSnapshot => "create_percentage_snapshot",
            Self::CreateMbSnapshot => "create_mb_snapshot",
            Self::MergeSnapshot => "merge_snapshot",
            Self::RemoveSnapshot => "remove_snapshot",
            Self::MountSnapshot => "mount_snapshot",
            Self::UmountSnapshot => "umount_snapshot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CreatePercentageSnapshot => {
                "Create a snapshot sized as a percentage of the volume group's free space"
            }
            Self::CreateMbSnapshot => "Create a snapshot sized in MiB",
            Self::MergeSnapshot => "Merge a snapshot back into its origin volume",
            Self::RemoveSnapshot => "Forcibly remove a snapshot volume",
            Self::MountSnapshot => "Mount a snapshot at the snapshot mount path",
            Self::UmountSnapshot => "Unmount the snapshot mount path",
        }
    }

    /// The request fields this action needs.
    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Self::CreatePercentageSnapshot => &["snap_size", "snap_name", "vg_name", "lv_name"],
            Self::CreateMbSnapshot => &["snap_size", "name", "vg_name", "lv_name"],
            Self::MergeSnapshot | Self::RemoveSnapshot => &["vg_name", "lv_name"],
            Self::MountSnapshot => &["vg_name", "name"],
            Self::UmountSnapshot => &[],
        }
    }

    /// Validates `r` and builds the steps to run.
    ///
    /// Fails before anything is executed if a required field is missing
    /// or malformed.
    pub fn plan(self, r: &Request, cfg: &Config) -> Result<Plan> {
        let steps = match self {
            Self::CreatePercentageSnapshot => {
                let size = percent(r.snap_size())?;
                let snap_name = lvm_name("snap_name", r.snap_name())?;
                let vg_name = lvm_name("vg_name", r.vg_name())?;
                let lv_name = lvm_name("lv_name", r.lv_name())?;

                vec![Invocation::new(
                    "lvcreate",
                    vec![
                        format!("-l{}%FREE", size),
                        "-s".into(),
                        "-n".into(),
                        snap_name.into(),
                        cfg.device_path(vg_name, lv_name),
                    ],
                )]
            }
            Self::CreateMbSnapshot => {
                let size = megabytes(r.snap_size())?;
                let name = lvm_name("name", r.name())?;
                let vg_name = lvm_name("vg_name", r.vg_name())?;
                let lv_name = lvm_name("lv_name", r.lv_name())?;

                vec![Invocation::new(
                    "lvcreate",
                    vec![
                        format!("-L{}M", size),
                        "-s".into(),
                        "-n".into(),
                        name.into(),
                        cfg.device_path(vg_name, lv_name),
                    ],
                )]
            }
            Self::MergeSnapshot => {
                let vg_name = lvm_name("vg_name", r.vg_name())?;
                let lv_name = lvm_name("lv_name", r.lv_name())?;

                vec![Invocation::new(
                    "lvconvert",
                    vec!["--merge".into(), format!("{}/{}", vg_name, lv_name)],
                )]
            }
            Self::RemoveSnapshot => {
                let vg_name = lvm_name("vg_name", r.vg_name())?;
                let lv_name = lvm_name("lv_name", r.lv_name())?;

                vec![Invocation::new(
                    "lvremove",
                    vec![cfg.device_path(vg_name, lv_name), "-f".into()],
                )]
            }
            Self::MountSnapshot => {
                let vg_name = lvm_name("vg_name", r.vg_name())?;
                let name = lvm_name("name", r.name())?;

                vec![
                    Invocation::new("mkdir", vec!["-p", cfg.mount_path.as_str()]),
                    Invocation::new(
                        "mount",
                        vec![cfg.device_path(vg_name, name), cfg.mount_path.clone()],
                    ),
                ]
            }
            Self::UmountSnapshot => vec![Invocation::new("umount", vec![cfg.mount_path.as_str()])],
        };

        Ok(Plan(steps))
    }
}

impl fmt::Display for LvmAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LvmAction {
    type Err = LvmSnapshotAgentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|x| x.name() == s)
            .ok_or_else(|| LvmSnapshotAgentError::UnknownAction(s.to_string()))
    }
}

fn required<'a>(name: &str, x: Option<&'a str>) -> Result<&'a str> {
    x.ok_or_else(|| LvmSnapshotAgentError::MissingArgument(name.to_string()))
}

/// Checks a volume group or logical volume name against LVM's naming rules.
fn lvm_name<'a>(name: &str, x: Option<&'a str>) -> Result<&'a str> {
    let x = required(name, x)?;

    if x.len() > MAX_LVM_NAME_LEN {
        return Err(LvmSnapshotAgentError::invalid(
            name,
            format!("too long (max length {})", MAX_LVM_NAME_LEN),
        ));
    }

    if x.starts_with('-') {
        return Err(LvmSnapshotAgentError::invalid(
            name,
            "must not start with '-'",
        ));
    }

    if x == "." || x == ".." {
        return Err(LvmSnapshotAgentError::invalid(
            name,
            format!("'{}' is reserved", x),
        ));
    }

    if let Some(c) = x
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !"+_.-".contains(*c))
    {
        return Err(LvmSnapshotAgentError::invalid(
            name,
            format!("invalid character ({:?})", c),
        ));
    }

    Ok(x)
}

fn percent(x: Option<&str>) -> Result<u8> {
    let x = required("snap_size", x)?;

    match x.parse::<u8>() {
        Ok(n) if (1..=100).contains(&n) => Ok(n),
        _ => Err(LvmSnapshotAgentError::invalid(
            "snap_size",
            format!("'{}' is not a percentage between 1 and 100", x),
        )),
    }
}

fn megabytes(x: Option<&str>) -> Result<u64> {
    let x = required("snap_size", x)?;

    match x.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LvmSnapshotAgentError::invalid(
            "snap_size",
            format!("'{}' is not a positive number of MiB", x),
        )),
    }
}
