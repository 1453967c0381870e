// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use futures::{future::BoxFuture, FutureExt, TryFutureExt};
use std::{
    error, fmt, io,
    process::{ExitStatus, Output},
};
pub use tokio::process::Command;

#[derive(Debug)]
pub enum CmdError {
    Spawn { program: String, source: io::Error },
}

impl fmt::Display for CmdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CmdError::Spawn {
                ref program,
                ref source,
            } => write!(f, "Could not run {}: {}", program, source),
        }
    }
}

impl std::error::Error for CmdError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            CmdError::Spawn { ref source, .. } => Some(source),
        }
    }
}

/// Converts an `ExitStatus` to the integer a POSIX shell would report.
///
/// A process terminated by signal `n` maps to `128 + n`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

/// Removes any trailing line terminators.
pub fn chomp(s: &str) -> &str {
    s.trim_end_matches(|c: char| c == '\n' || c == '\r')
}

pub trait OutputExt {
    fn stdout_string_lossy(&self) -> String;
    fn stderr_string_lossy(&self) -> String;
    fn exit_code(&self) -> i32;
}

impl OutputExt for Output {
    fn stdout_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
    fn stderr_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
    fn exit_code(&self) -> i32 {
        exit_code(self.status)
    }
}

pub trait CaptureCommandExt {
    fn captured_output(&mut self, program: String) -> BoxFuture<Result<Output, CmdError>>;
}

impl CaptureCommandExt for Command {
    /// Similar to `output`, but tags spawn failures with the program name.
    ///
    /// A non-zero exit code is *not* an error here; callers inspect the
    /// returned `Output` themselves.
    #[tracing::instrument(skip(self))]
    fn captured_output(&mut self, program: String) -> BoxFuture<Result<Output, CmdError>> {
        self.output()
            .map_err(move |source| CmdError::Spawn { program, source })
            .and_then(|x| async {
                tracing::debug!(result=?x);

                Ok(x)
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chomp() {
        assert_eq!(chomp("foo\n"), "foo");
        assert_eq!(chomp("foo\r\n\n"), "foo");
        assert_eq!(chomp("foo  \n"), "foo  ");
        assert_eq!(chomp("\n"), "");
        assert_eq!(chomp("a\nb"), "a\nb");
    }

    #[tokio::test]
    async fn test_captured_output_nonzero_is_ok() {
        let out = Command::new("false")
            .captured_output("false".into())
            .await
            .expect("false should spawn");

        assert_eq!(out.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_captured_output_missing_program() {
        let err = Command::new("/nonexistent/lvmsnapshot-test-bin")
            .captured_output("/nonexistent/lvmsnapshot-test-bin".into())
            .await
            .unwrap_err();

        assert!(matches!(err, CmdError::Spawn { .. }));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err
            .to_string()
            .starts_with("Could not run /nonexistent/lvmsnapshot-test-bin"));
    }
}
