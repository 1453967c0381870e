// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use lazy_static::lazy_static;
use std::env;

pub const DEFAULT_MOUNT_PATH: &str = "/mnt/snapshot";
pub const DEFAULT_DEV_DIR: &str = "/dev";

/// Reads `name`, treating an unset or empty variable as `default`.
pub fn get_var_else(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|x| !x.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Host paths the snapshot actions operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where `mount_snapshot` mounts and `umount_snapshot` unmounts
    pub mount_path: String,
    /// Directory holding `<vg>/<lv>` device nodes
    pub dev_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            dev_dir: DEFAULT_DEV_DIR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            mount_path: get_var_else("LVMSNAPSHOT_MOUNT_PATH", DEFAULT_MOUNT_PATH),
            dev_dir: get_var_else("LVMSNAPSHOT_DEV_DIR", DEFAULT_DEV_DIR),
        }
    }
    /// `/dev/<vg>/<lv>`
    pub fn device_path(&self, vg_name: &str, lv_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.dev_dir.trim_end_matches('/'),
            vg_name,
            lv_name
        )
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::from_env();
}
