// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

use crate::action_plugins::lvm_snapshot;
use lvmsnapshot_util::action_plugins;
use lvmsnapshot_wire_types::ActionName;
use tracing::info;

/// The registry of available actions to the agent.
/// Add new Actions to the fn body as they are created.
pub fn create_registry() -> action_plugins::Actions {
    let map = action_plugins::Actions::default()
        .add_plugin(
            "create_percentage_snapshot",
            lvm_snapshot::create_percentage_snapshot,
        )
        .add_plugin("create_mb_snapshot", lvm_snapshot::create_mb_snapshot)
        .add_plugin("merge_snapshot", lvm_snapshot::merge_snapshot)
        .add_plugin("remove_snapshot", lvm_snapshot::remove_snapshot)
        .add_plugin("mount_snapshot", lvm_snapshot::mount_snapshot)
        .add_plugin("umount_snapshot", lvm_snapshot::umount_snapshot);

    info!("Loaded the following ActionPlugins:");

    for ActionName(key) in map.keys() {
        info!("{}", key)
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lvm::LvmAction;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_registry_has_every_action() {
        let registry = create_registry();

        let mut xs: Vec<&str> = registry.keys().map(|x| &**x).collect();
        xs.sort_unstable();

        let mut expected: Vec<&str> = LvmAction::ALL.iter().map(|x| x.name()).collect();
        expected.sort_unstable();

        assert_eq!(xs, expected);
    }

    #[tokio::test]
    async fn test_validation_errors_surface_as_strings() {
        let registry = create_registry();

        let r = registry
            .run(&"remove_snapshot".into(), json!({ "vg_name": "vg_ms1" }))
            .await;

        assert_eq!(r, Err("Argument 'lv_name' Missing".to_string()));
    }
}
