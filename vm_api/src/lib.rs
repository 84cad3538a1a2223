use std::collections::BTreeMap;

use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;

use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::Policy;
use fil_actors_runtime::{ActorError, ErrorKind};

pub use error::*;
use trace::*;

mod error;
pub mod trace;
#[cfg(feature = "testing")]
pub mod util;

/// An abstract VM that is injected into integration tests
pub trait VM {
    /// Returns the underlying blockstore of the VM
    fn blockstore(&self) -> &dyn Blockstore;

    /// Get information about an actor
    fn actor(&self, address: &Address) -> Result<Option<ActorState>, VMError>;

    /// Upsert an actor into the state tree
    fn set_actor(&self, key: &Address, a: ActorState) -> Result<(), VMError>;

    /// Get the balance of the specified actor, zero if it does not exist
    fn balance(&self, address: &Address) -> Result<TokenAmount, VMError>;

    /// Apply a signed message, producing its receipt.
    /// An `Err` means the VM itself failed; actor failures are reported in the receipt.
    fn execute_message(&self, msg: &Message) -> Result<Receipt, VMError>;

    /// Root of the state tree as of the last applied message
    fn state_root(&self) -> Cid;

    /// Take the invocations made by the last applied message
    fn take_invocations(&self) -> Vec<InvocationTrace>;

    /// Return a map of actor code CIDs to their corresponding types
    fn actor_manifest(&self) -> BTreeMap<Cid, Type>;

    /// Returns a map of all actor addresses to their corresponding states
    fn actor_states(&self) -> Result<BTreeMap<Address, ActorState>, VMError>;

    /// The policy actors are executed under
    fn policy(&self) -> &Policy;
}

/// A ledger entry: the code, state and funds held at an address.
#[derive(Serialize_tuple, Deserialize_tuple, Clone, PartialEq, Eq, Debug)]
pub struct ActorState {
    /// Link to code for the actor.
    pub code: Cid,
    /// Link to the state of the actor.
    pub head: Cid,
    /// Nonce of the next message this actor may send.
    pub call_seq_num: u64,
    /// Tokens available to the actor.
    pub balance: TokenAmount,
}

pub fn new_actor(code: Cid, head: Cid, call_seq_num: u64, balance: TokenAmount) -> ActorState {
    ActorState { code, head, call_seq_num, balance }
}

/// A message as submitted to the chain. Signatures are checked before the
/// message reaches the VM.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub value: TokenAmount,
    /// Exported method name; empty for a plain transfer.
    pub method: String,
    pub params: RawBytes,
}

/// The outcome of applying a message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Receipt {
    pub exit_code: ExitCode,
    pub return_values: Vec<RawBytes>,
    /// Present exactly when `exit_code` is not OK.
    pub execution_error: Option<ExecutionError>,
}

impl Receipt {
    pub fn ok(return_values: Vec<RawBytes>) -> Self {
        Self { exit_code: ExitCode::OK, return_values, execution_error: None }
    }

    pub fn failed(exit_code: ExitCode, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            return_values: Vec::new(),
            execution_error: Some(ExecutionError {
                kind: ErrorKind::from_exit_code(exit_code),
                message: message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code.is_success()
    }
}

impl From<ActorError> for Receipt {
    fn from(e: ActorError) -> Self {
        Receipt::failed(e.exit_code(), e.msg())
    }
}
