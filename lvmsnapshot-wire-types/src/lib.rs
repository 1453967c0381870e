// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

pub mod snapshot;

use std::{fmt, ops::Deref};

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Deserialize, serde::Serialize,
)]
pub struct ActionName(pub String);

impl From<&str> for ActionName {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<&String> for ActionName {
    fn from(name: &String) -> Self {
        Self(name.as_str().into())
    }
}

impl Deref for ActionName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl From<String> for ActionName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Things the host can ask the agent to do
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    ActionStart {
        action: ActionName,
        #[serde(default = "empty_args")]
        args: serde_json::value::Value,
        id: ActionId,
    },
    ActionCancel {
        id: ActionId,
    },
}

/// Hosts may omit `args` for actions that take no parameters.
fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Action {
    pub fn get_id(&self) -> &ActionId {
        match self {
            Self::ActionStart { id, .. } | Self::ActionCancel { id, .. } => id,
        }
    }
}

/// The result of running the action on an agent.
#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq)]
pub struct ActionResult {
    pub id: ActionId,
    pub result: AgentResult,
}

pub type AgentResult = std::result::Result<serde_json::Value, String>;

pub trait ToJsonValue {
    fn to_json_value(&self) -> Result<serde_json::Value, String>;
}

impl<T: serde::Serialize> ToJsonValue for T {
    fn to_json_value(&self) -> Result<serde_json::Value, String> {
        serde_json::to_value(self).map_err(|e| format!("{:?}", e))
    }
}

pub trait ToBytes {
    fn to_bytes(&self) -> Result<Vec<u8>, serde_json::error::Error>;
}

impl<T: serde::Serialize> ToBytes for T {
    fn to_bytes(&self) -> Result<Vec<u8>, serde_json::error::Error> {
        serde_json::to_vec(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_action_start_deserialize() {
        let x: Action = serde_json::from_value(json!({
            "type": "ACTION_START",
            "action": "merge_snapshot",
            "args": { "vg_name": "vg_ms1", "lv_name": "lv_root" },
            "id": "42"
        }))
        .unwrap();

        assert_eq!(
            x,
            Action::ActionStart {
                action: "merge_snapshot".into(),
                args: json!({ "vg_name": "vg_ms1", "lv_name": "lv_root" }),
                id: ActionId("42".into()),
            }
        );
        assert_eq!(x.get_id(), &ActionId("42".into()));
    }

    #[test]
    fn test_action_start_without_args() {
        let x: Action = serde_json::from_str(
            r#"{"type":"ACTION_START","action":"umount_snapshot","id":"1"}"#,
        )
        .unwrap();

        match x {
            Action::ActionStart { args, .. } => assert_eq!(args, json!({})),
            _ => panic!("expected ActionStart"),
        }
    }

    #[test]
    fn test_action_result_serialize() {
        let x = ActionResult {
            id: ActionId("7".into()),
            result: Err("boom".into()),
        };

        assert_eq!(
            String::from_utf8(x.to_bytes().unwrap()).unwrap(),
            r#"{"id":"7","result":{"Err":"boom"}}"#
        );
    }
}
