// Copyright (c) 2021 DDN. All rights reserved.
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file.

pub mod action_plugins {
    use futures::{Future, FutureExt};
    use lvmsnapshot_wire_types::{ActionName, AgentResult, ToJsonValue};
    use std::{collections::BTreeMap, fmt::Display, pin::Pin};

    type BoxedFuture = Pin<Box<dyn Future<Output = AgentResult> + Send>>;

    /// Wrapper for an action plugin to be used as a trait object for different actions.
    /// The incoming `Value` is the data to be sent to the plugin. It will be deserialized to the parameter
    /// type needed by the specific plugin.
    type Callback = Box<dyn Fn(serde_json::value::Value) -> BoxedFuture + Send + Sync>;

    /// Runs a given plugin. First deserializes data to the required type,
    /// then runs the plugin and serializes the result.
    async fn run_plugin<T, R, E: Display, Fut>(
        v: serde_json::value::Value,
        f: fn(T) -> Fut,
    ) -> AgentResult
    where
        T: serde::de::DeserializeOwned + Send,
        R: serde::Serialize + Send,
        Fut: Future<Output = Result<R, E>> + Send,
    {
        let x = serde_json::from_value(v).map_err(|e| format!("{}", e))?;

        let x = f(x).await.map_err(|e| format!("{}", e))?;

        x.to_json_value()
    }

    fn mk_callback<Fut, T, R, E>(f: fn(T) -> Fut) -> Callback
    where
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        T: serde::de::DeserializeOwned + Send + 'static,
        R: serde::Serialize + Send + 'static,
        E: Display + 'static,
    {
        Box::new(move |v| run_plugin(v, f).boxed())
    }

    /// The registry of available plugins.
    /// This is modeled internally as a `BTreeMap` so plugins are listed
    /// in a stable order.
    #[derive(Default)]
    pub struct Actions(BTreeMap<ActionName, Callback>);

    impl Actions {
        pub fn add_plugin<Fut, T, R, E>(mut self, s: impl Into<ActionName>, f: fn(T) -> Fut) -> Self
        where
            Fut: Future<Output = Result<R, E>> + Send + 'static,
            T: serde::de::DeserializeOwned + Send + 'static,
            R: serde::Serialize + Send + 'static,
            E: Display + 'static,
        {
            self.0.insert(s.into(), mk_callback(f));

            self
        }
        pub fn keys(&self) -> impl Iterator<Item = &ActionName> {
            self.0.keys()
        }
        pub fn get(&self, name: &ActionName) -> Option<&Callback> {
            self.0.get(name)
        }
        /// Looks up and runs the named plugin.
        ///
        /// An unknown name is reported as an `Err` result rather than a panic.
        pub async fn run(&self, name: &ActionName, v: serde_json::Value) -> AgentResult {
            match self.get(name) {
                Some(f) => f(v).await,
                None => Err(format!("Could not find action {} in registry", name)),
            }
        }
    }
}
