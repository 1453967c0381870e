// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

pub mod action_plugins;
pub mod agent_error;
pub mod env;
pub mod lvm;
pub mod reader;
pub mod runner;
