// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

//! Data structures for communicating with the agent regarding LVM snapshots.

#[cfg(feature = "cli")]
use structopt::StructOpt;

#[derive(serde::Deserialize, serde::Serialize, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "cli", derive(StructOpt))]
#[serde(default)]
/// Parameters for a snapshot action.
///
/// Each action only reads the subset it needs.
pub struct Request {
    /// Snapshot size; percent of free space or MiB depending on the action
    #[cfg_attr(feature = "cli", structopt(long = "snap_size"))]
    #[serde(deserialize_with = "string_or_number")]
    pub snap_size: Option<String>,
    /// Snapshot volume name
    #[cfg_attr(feature = "cli", structopt(long = "snap_name"))]
    pub snap_name: Option<String>,
    /// Snapshot volume name (create_mb_snapshot, mount_snapshot)
    #[cfg_attr(feature = "cli", structopt(long = "name"))]
    pub name: Option<String>,
    /// Volume group name
    #[cfg_attr(feature = "cli", structopt(long = "vg_name"))]
    pub vg_name: Option<String>,
    /// Logical volume name
    #[cfg_attr(feature = "cli", structopt(long = "lv_name"))]
    pub lv_name: Option<String>,
}

/// Accepts `"10"` as well as `10` for numeric parameters.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(x) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            x
        ))),
    }
}

impl Request {
    fn field<'a>(x: &'a Option<String>) -> Option<&'a str> {
        x.as_deref().filter(|x| !x.is_empty())
    }
    pub fn snap_size(&self) -> Option<&str> {
        Self::field(&self.snap_size)
    }
    pub fn snap_name(&self) -> Option<&str> {
        Self::field(&self.snap_name)
    }
    /// `name`, falling back to `snap_name`.
    pub fn name(&self) -> Option<&str> {
        Self::field(&self.name).or_else(|| self.snap_name())
    }
    pub fn vg_name(&self) -> Option<&str> {
        Self::field(&self.vg_name)
    }
    pub fn lv_name(&self) -> Option<&str> {
        Self::field(&self.lv_name)
    }
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Default, PartialEq, Eq, Debug)]
/// What an action hands back to the host.
pub struct Reply {
    /// Exit status of the (last) process run
    pub status: i32,
    /// Captured stdout, trailing newlines removed
    pub out: String,
    /// Captured stderr, trailing newlines removed
    pub err: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_ignores_unknown_keys() {
        let x: Request = serde_json::from_value(json!({
            "vg_name": "vg_ms1",
            "lv_name": "lv_root",
            "process_results": true
        }))
        .unwrap();

        assert_eq!(x.vg_name(), Some("vg_ms1"));
        assert_eq!(x.lv_name(), Some("lv_root"));
        assert_eq!(x.snap_size(), None);
    }

    #[test]
    fn test_numeric_snap_size() {
        let x: Request = serde_json::from_value(json!({ "snap_size": 10 })).unwrap();
        assert_eq!(x.snap_size(), Some("10"));

        let x: Request = serde_json::from_value(json!({ "snap_size": "25" })).unwrap();
        assert_eq!(x.snap_size(), Some("25"));

        let x: Result<Request, _> = serde_json::from_value(json!({ "snap_size": [1] }));
        assert!(x.is_err());
    }

    #[test]
    fn test_empty_fields_are_missing() {
        let x: Request = serde_json::from_value(json!({ "vg_name": "", "snap_name": "" })).unwrap();

        assert_eq!(x.vg_name(), None);
        assert_eq!(x.name(), None);
    }

    #[test]
    fn test_name_falls_back_to_snap_name() {
        let x = Request {
            snap_name: Some("root_snap".into()),
            ..Request::default()
        };
        assert_eq!(x.name(), Some("root_snap"));

        let x = Request {
            name: Some("other".into()),
            snap_name: Some("root_snap".into()),
            ..Request::default()
        };
        assert_eq!(x.name(), Some("other"));
    }

    #[test]
    fn test_reply_keys() {
        let x = Reply {
            status: 5,
            out: "".into(),
            err: "Volume group \"vg\" not found".into(),
        };

        assert_eq!(
            serde_json::to_value(&x).unwrap(),
            json!({ "status": 5, "out": "", "err": "Volume group \"vg\" not found" })
        );
    }
}
