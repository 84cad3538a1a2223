// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use self::actor_error::*;
pub use self::builtin::*;
pub use self::dispatch::*;
pub use self::runtime::*;
pub use self::util::*;

pub mod actor_error;
pub mod builtin;
pub mod runtime;
pub mod util;

mod dispatch;

/// Hasher for the HAMTs held in actor state.
pub type Hasher = fvm_ipld_hamt::Sha256;
