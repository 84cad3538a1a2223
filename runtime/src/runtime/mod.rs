// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::multihash::Code;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::{CborStore, RawBytes};
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::actor_code::*;
pub use self::policy::*;
use crate::runtime::builtins::Type;
use crate::{actor_error, ActorError};

mod actor_code;
pub mod builtins;
pub mod policy;

pub(crate) mod empty;

pub use empty::EMPTY_ARR_CID;

/// Runtime is the VM's internal runtime object.
/// this is everything that is accessible to actors, beyond parameters.
pub trait Runtime: RuntimePolicy {
    type Blockstore: Blockstore;

    /// Information related to the current message being executed.
    fn message(&self) -> &dyn MessageInfo;

    /// Validates the caller against some predicate.
    /// Exported actor methods must invoke exactly one caller validation before returning.
    fn validate_immediate_caller_accept_any(&self) -> Result<(), ActorError>;
    fn validate_immediate_caller_is<'a, I>(&self, addresses: I) -> Result<(), ActorError>
    where
        I: IntoIterator<Item = &'a Address>;
    fn validate_immediate_caller_type<'a, I>(&self, types: I) -> Result<(), ActorError>
    where
        I: IntoIterator<Item = &'a Type>;

    /// The built-in type of the actor at an address, if it exists.
    /// Fails only if the state tree cannot be read.
    fn get_actor_type(&self, address: &Address) -> Result<Option<Type>, ActorError>;

    /// Initializes the state object.
    /// This is only valid when the state has not yet been initialized.
    fn create<T: Serialize>(&self, obj: &T) -> Result<(), ActorError> {
        let root = self.get_state_root()?;
        if root != *EMPTY_ARR_CID {
            return Err(actor_error!(
                illegal_state;
                "failed to create state; expected empty array CID, got: {}", root
            ));
        }
        let new_root = self
            .store()
            .put_cbor(obj, Code::Blake2b256)
            .map_err(|e| actor_error!(illegal_argument; "failed to write actor state: {}", e))?;
        self.set_state_root(&new_root)?;
        Ok(())
    }

    /// Loads a readonly copy of the state of the receiver into the argument.
    fn state<T: DeserializeOwned>(&self) -> Result<T, ActorError> {
        let root = self.get_state_root()?;
        self.store()
            .get_cbor(&root)
            .map_err(|e| actor_error!(illegal_state; "failed to load actor state {}: {}", root, e))?
            .ok_or_else(|| actor_error!(illegal_state; "actor state {} not found", root))
    }

    /// Gets the state-root.
    fn get_state_root(&self) -> Result<Cid, ActorError>;

    /// Sets the state-root.
    fn set_state_root(&self, root: &Cid) -> Result<(), ActorError>;

    /// Loads a mutable copy of the state of the receiver, passes it to `f`,
    /// and after `f` completes puts the state object back to the store and sets it as
    /// the receiver's state root.
    ///
    /// During the call to `f`, execution is protected from side-effects, (including message send).
    ///
    /// Returns the result of `f`.
    fn transaction<S, RT, F>(&self, f: F) -> Result<RT, ActorError>
    where
        S: Serialize + DeserializeOwned,
        F: FnOnce(&mut S, &Self) -> Result<RT, ActorError>;

    /// Returns reference to blockstore
    fn store(&self) -> &Self::Blockstore;

    /// Sends a message to another actor, returning its return values.
    /// If the invoked method does not return successfully, its state changes
    /// (and that of any messages it sent in turn) will be rolled back and the
    /// callee's error is returned unchanged.
    fn send(
        &self,
        to: &Address,
        method: &str,
        params: RawBytes,
        value: TokenAmount,
    ) -> Result<Vec<RawBytes>, ActorError>;

    /// Computes the address of an actor created by the current message: a hash of
    /// the message origin and the nonce it was sent with.
    fn new_actor_address(&self) -> Result<Address, ActorError>;

    /// Creates an actor of the given type at `address` with an empty state.
    /// A plain account already at the address is upgraded in place, keeping its
    /// balance and nonce. Any other existing actor is an error.
    fn create_actor(&self, typ: Type, address: &Address) -> Result<(), ActorError>;
}

/// Message information available to the actor about executing message.
pub trait MessageInfo {
    /// The address of the immediate calling actor.
    fn caller(&self) -> Address;

    /// The address of the origin of the current invocation.
    fn origin(&self) -> Address;

    /// The address of the actor receiving the message.
    fn receiver(&self) -> Address;

    /// The value attached to the message being processed, already
    /// credited to the receiver when the method runs.
    fn value_received(&self) -> TokenAmount;
}
