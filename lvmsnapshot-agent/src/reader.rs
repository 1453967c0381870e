// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use crate::agent_error::Result;
use bytes::BytesMut;
use futures::StreamExt;
use lvmsnapshot_util::action_plugins::Actions;
use lvmsnapshot_wire_types::{Action, ActionResult, ToBytes, ToJsonValue};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};

/// Longest action line accepted from the host.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

#[derive(Debug)]
enum Line {
    Text(String),
    Skipped(LinesCodecError),
}

/// `LinesCodec` that reports bad lines as frames.
///
/// `FramedRead` ends the stream after any decoder error, so overlong
/// and non UTF-8 lines are handed back as `Line::Skipped` instead.
/// `LinesCodec` has already consumed the offending bytes at that point.
struct ActionLines(LinesCodec);

impl ActionLines {
    fn new() -> Self {
        ActionLines(LinesCodec::new_with_max_length(MAX_LINE_LENGTH))
    }
}

fn recover(
    x: std::result::Result<Option<String>, LinesCodecError>,
) -> std::result::Result<Option<Line>, LinesCodecError> {
    match x {
        Ok(x) => Ok(x.map(Line::Text)),
        Err(e @ LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Line::Skipped(e))),
        Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
            Ok(Some(Line::Skipped(LinesCodecError::Io(e))))
        }
        Err(e) => Err(e),
    }
}

impl Decoder for ActionLines {
    type Item = Line;
    type Error = LinesCodecError;

    fn decode(
        &mut self,
        buf: &mut BytesMut,
    ) -> std::result::Result<Option<Line>, LinesCodecError> {
        recover(self.0.decode(buf))
    }

    fn decode_eof(
        &mut self,
        buf: &mut BytesMut,
    ) -> std::result::Result<Option<Line>, LinesCodecError> {
        recover(self.0.decode_eof(buf))
    }
}

/// Runs a single `Action` against the registry.
pub async fn handle_action(registry: &Actions, action: Action) -> ActionResult {
    match action {
        Action::ActionStart { action, args, id } => {
            tracing::debug!(%id, "Starting action {}", action);

            let result = registry.run(&action, args).await;

            if let Err(e) = &result {
                tracing::warn!(%id, "Action {} failed: {}", action, e);
            }

            ActionResult { id, result }
        }
        // Actions run to completion before the next line is read,
        // so there is never anything in flight to cancel.
        Action::ActionCancel { id } => ActionResult {
            id,
            result: ().to_json_value(),
        },
    }
}

/// Reads newline delimited `Action`s from `input` and writes one
/// `ActionResult` line per action to `output`.
///
/// Lines that are not UTF-8 or exceed `MAX_LINE_LENGTH` are logged and
/// skipped. Returns when `input` reaches EOF.
pub async fn create_reader<R, W>(registry: &Actions, input: R, mut output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = FramedRead::new(input, ActionLines::new());

    while let Some(line) = lines.next().await {
        let line = match line? {
            Line::Text(x) => x,
            Line::Skipped(LinesCodecError::MaxLineLengthExceeded) => {
                tracing::warn!("Skipping action longer than {} bytes", MAX_LINE_LENGTH);
                continue;
            }
            Line::Skipped(e) => {
                tracing::warn!("Skipping undecodable action: {}", e);
                continue;
            }
        };

        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        let action: Action = match serde_json::from_str(line) {
            Ok(x) => x,
            Err(e) => {
                tracing::warn!("Could not parse action {:?}: {}", line, e);
                continue;
            }
        };

        let result = handle_action(registry, action).await;

        let mut bytes = result.to_bytes()?;
        bytes.push(b'\n');

        output.write_all(&bytes).await?;
        output.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_plugins::create_registry;
    use lvmsnapshot_wire_types::{
        snapshot::{Reply, Request},
        ActionId,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn fake_umount(_: Request) -> std::result::Result<Reply, String> {
        Ok(Reply {
            status: 32,
            out: "".into(),
            err: "umount: /mnt/snapshot: not mounted.".into(),
        })
    }

    async fn run_lines(registry: &Actions, input: &str) -> Vec<serde_json::Value> {
        run_bytes(registry, input.as_bytes()).await
    }

    async fn run_bytes(registry: &Actions, input: &[u8]) -> Vec<serde_json::Value> {
        let mut output: Vec<u8> = vec![];

        create_reader(registry, input, &mut output).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|x| serde_json::from_str(x).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_reply_is_wrapped_in_result() {
        let registry = Actions::default().add_plugin("umount_snapshot", fake_umount);

        let xs = run_lines(
            &registry,
            "{\"type\":\"ACTION_START\",\"action\":\"umount_snapshot\",\"id\":\"1\"}\n",
        )
        .await;

        assert_eq!(
            xs,
            vec![json!({
                "id": "1",
                "result": {
                    "Ok": {
                        "status": 32,
                        "out": "",
                        "err": "umount: /mnt/snapshot: not mounted."
                    }
                }
            })]
        );
    }

    #[tokio::test]
    async fn test_errors_and_garbage() {
        let registry = create_registry();

        let input = [
            r#"{"type":"ACTION_START","action":"reboot","args":{},"id":"a"}"#,
            "not json",
            "",
            r#"{"type":"ACTION_START","action":"merge_snapshot","args":{"vg_name":"vg_ms1"},"id":"b"}"#,
            r#"{"type":"ACTION_START","action":"create_mb_snapshot","args":{"snap_size":"big"},"id":"c"}"#,
            r#"{"type":"ACTION_CANCEL","id":"d"}"#,
        ]
        .join("\n");

        let xs = run_lines(&registry, &input).await;

        assert_eq!(
            xs,
            vec![
                json!({ "id": "a", "result": { "Err": "Could not find action reboot in registry" } }),
                json!({ "id": "b", "result": { "Err": "Argument 'lv_name' Missing" } }),
                json!({
                    "id": "c",
                    "result": {
                        "Err": "Argument 'snap_size' Invalid: 'big' is not a positive number of MiB"
                    }
                }),
                json!({ "id": "d", "result": { "Ok": null } }),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let registry = Actions::default().add_plugin("umount_snapshot", fake_umount);

        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(
            b"{\"type\":\"ACTION_START\",\"action\":\"umount_snapshot\",\"id\":\"2\"}\n",
        );

        let xs = run_bytes(&registry, &input).await;

        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0]["id"], json!("2"));
        assert_eq!(xs[0]["result"]["Ok"]["status"], json!(32));
    }

    #[tokio::test]
    async fn test_invalid_utf8_without_newline_at_eof() {
        let registry = Actions::default().add_plugin("umount_snapshot", fake_umount);

        let mut input =
            b"{\"type\":\"ACTION_START\",\"action\":\"umount_snapshot\",\"id\":\"4\"}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe");

        let xs = run_bytes(&registry, &input).await;

        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0]["id"], json!("4"));
    }

    #[tokio::test]
    async fn test_overlong_line_is_skipped() {
        let registry = Actions::default().add_plugin("umount_snapshot", fake_umount);

        let mut input = vec![b'x'; MAX_LINE_LENGTH + 10];
        input.push(b'\n');
        input.extend_from_slice(
            b"{\"type\":\"ACTION_START\",\"action\":\"umount_snapshot\",\"id\":\"3\"}\n",
        );

        let xs = run_bytes(&registry, &input).await;

        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0]["id"], json!("3"));
    }

    #[tokio::test]
    async fn test_handle_cancel() {
        let registry = Actions::default();

        let r = handle_action(
            &registry,
            Action::ActionCancel {
                id: ActionId("x".into()),
            },
        )
        .await;

        assert_eq!(
            r,
            ActionResult {
                id: ActionId("x".into()),
                result: Ok(serde_json::Value::Null),
            }
        );
    }
}
