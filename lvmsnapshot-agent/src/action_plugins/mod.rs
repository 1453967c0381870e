// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

pub mod action_plugin;
pub mod lvm_snapshot;
pub use action_plugin::create_registry;
