use anyhow::anyhow;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_hamt::{BytesKey, Hamt, Sha256};
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use num_traits::Zero;
use vm_api::{new_actor, ActorState};

use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::EMPTY_ARR_CID;
use fil_actors_runtime::{actor_error, ActorError, AsActorError, HAMT_BIT_WIDTH};

/// The balance ledger: every actor record, keyed by address bytes.
///
/// All writes go through the HAMT, so any root returned by `flush` stays
/// readable after later writes.
pub struct StateTree<BS: Blockstore> {
    actors: Hamt<BS, ActorState, BytesKey, Sha256>,
}

impl<BS: Blockstore> StateTree<BS> {
    pub fn new(store: BS) -> Self {
        Self { actors: Hamt::new_with_bit_width(store, HAMT_BIT_WIDTH) }
    }

    pub fn load(store: BS, root: &Cid) -> anyhow::Result<Self> {
        let actors = Hamt::load_with_bit_width(root, store, HAMT_BIT_WIDTH)
            .map_err(|e| anyhow!("failed to load state tree {}: {}", root, e))?;
        Ok(Self { actors })
    }

    pub fn get(&self, addr: &Address) -> anyhow::Result<Option<ActorState>> {
        Ok(self.actors.get(&addr.to_bytes())?.cloned())
    }

    /// Replaces the record at `addr`, inserting it if absent.
    pub fn set(&mut self, addr: &Address, actor: ActorState) -> anyhow::Result<()> {
        self.actors.set(addr.to_bytes().into(), actor)?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<Cid> {
        Ok(self.actors.flush()?)
    }

    /// Visits every record, in key-hash order.
    pub fn for_each<F>(&self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(Address, &ActorState) -> anyhow::Result<()>,
    {
        self.actors.for_each(|k, v| {
            let addr = Address::from_bytes(&k.0)?;
            f(addr, v)
        })?;
        Ok(())
    }

    /// Moves `amount` from `from` to `to`, creating `to` as an empty account if
    /// it does not exist. Both sides are validated before either is written.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: &TokenAmount,
    ) -> Result<(), ActorError> {
        if amount.is_negative() {
            return Err(ActorError::unchecked(
                ExitCode::SYS_ASSERTION_FAILED,
                format!("attempt to transfer negative value {}", amount),
            ));
        }
        let mut sender = self
            .get(from)
            .exit_code(ExitCode::SYS_ASSERTION_FAILED)?
            .with_context_code(ExitCode::SYS_SENDER_INVALID, || {
                format!("sender {} not found", from)
            })?;
        if &sender.balance < amount {
            return Err(ActorError::unchecked(
                ExitCode::SYS_INSUFFICIENT_FUNDS,
                format!("{} has balance {}, cannot send {}", from, sender.balance, amount),
            ));
        }
        if from == to {
            return Ok(());
        }

        let mut receiver = self
            .get(to)
            .exit_code(ExitCode::SYS_ASSERTION_FAILED)?
            .unwrap_or_else(empty_account);
        sender.balance -= amount;
        receiver.balance += amount;

        self.set(from, sender).exit_code(ExitCode::SYS_ASSERTION_FAILED)?;
        self.set(to, receiver).exit_code(ExitCode::SYS_ASSERTION_FAILED)?;
        Ok(())
    }

    /// Installs `code` at `addr` with state `head`. A plain account already at
    /// the address is upgraded in place and keeps its balance and nonce.
    pub fn create_or_upgrade(
        &mut self,
        addr: &Address,
        code: Cid,
        head: Cid,
    ) -> Result<(), ActorError> {
        let actor = match self.get(addr).exit_code(ExitCode::SYS_ASSERTION_FAILED)? {
            None => new_actor(code, head, 0, TokenAmount::zero()),
            Some(mut existing) if existing.code == Type::Account.code_cid() => {
                existing.code = code;
                existing.head = head;
                existing
            }
            Some(_) => {
                return Err(actor_error!(forbidden;
                    "attempt to create new actor at existing address {}", addr));
            }
        };
        self.set(addr, actor).exit_code(ExitCode::SYS_ASSERTION_FAILED)
    }
}

/// A zero-balance account with no state.
pub fn empty_account() -> ActorState {
    new_actor(Type::Account.code_cid(), *EMPTY_ARR_CID, 0, TokenAmount::zero())
}
