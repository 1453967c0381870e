// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use lvmsnapshot_cmd::CmdError;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

pub type Result<T> = std::result::Result<T, LvmSnapshotAgentError>;

#[derive(Debug, Error)]
pub enum LvmSnapshotAgentError {
    #[error(transparent)]
    CmdError(#[from] CmdError),
    #[error("Argument '{name}' Invalid: {reason}")]
    InvalidArgument { name: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    LinesCodecError(#[from] LinesCodecError),
    #[error("Argument '{0}' Missing")]
    MissingArgument(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

impl LvmSnapshotAgentError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
    /// Did the caller hand us bad input, as opposed to the host failing us?
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::MissingArgument(_) | Self::UnknownAction(_)
        )
    }
}
