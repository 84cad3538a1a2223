// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fil_actors_runtime::runtime::ActorCode;
use fil_actors_runtime::{actor_dispatch, method_names};

method_names! {
    /// Accounts only hold value; every call other than a plain send is unhandled.
    pub enum Method {}
}

/// Account Actor
pub struct Actor;

impl ActorCode for Actor {
    type Methods = Method;

    fn name() -> &'static str {
        "Account"
    }

    actor_dispatch! {}
}
