use std::cell::RefCell;

use cid::multihash::Code;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::{CborStore, RawBytes};
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vm_api::trace::InvocationTrace;

use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::{MessageInfo, Policy, Runtime, RuntimePolicy};
use fil_actors_runtime::{actor_error, derive_actor_address, ActorError, AsActorError, METHOD_SEND};

use crate::VM;

/// Context shared by every invocation made on behalf of one top-level message.
#[derive(Clone, Debug)]
pub struct TopCtx {
    pub originator: Address,
    pub originator_nonce: u64,
}

#[derive(Clone, Debug)]
pub struct InternalMessage {
    pub from: Address,
    pub to: Address,
    pub value: TokenAmount,
    pub method: String,
    pub params: RawBytes,
}

impl<BS: Blockstore> MessageInfo for InvocationCtx<'_, '_, BS> {
    fn caller(&self) -> Address {
        self.msg.from
    }
    fn origin(&self) -> Address {
        self.top.originator
    }
    fn receiver(&self) -> Address {
        self.msg.to
    }
    fn value_received(&self) -> TokenAmount {
        self.msg.value.clone()
    }
}

/// The runtime handed to an actor for a single method invocation.
pub struct InvocationCtx<'invocation, 'bs, BS: Blockstore> {
    pub v: &'invocation VM<'bs, BS>,
    pub top: TopCtx,
    pub msg: InternalMessage,
    pub allow_side_effects: RefCell<bool>,
    pub caller_validated: RefCell<bool>,
    pub subinvocations: RefCell<Vec<InvocationTrace>>,
}

impl<'invocation, 'bs, BS: Blockstore> InvocationCtx<'invocation, 'bs, BS> {
    pub fn new(v: &'invocation VM<'bs, BS>, top: TopCtx, msg: InternalMessage) -> Self {
        Self {
            v,
            top,
            msg,
            allow_side_effects: RefCell::new(true),
            caller_validated: RefCell::new(false),
            subinvocations: RefCell::new(vec![]),
        }
    }

    pub fn gather_trace(
        &mut self,
        invoke_result: &Result<Vec<RawBytes>, ActorError>,
    ) -> InvocationTrace {
        let (return_values, exit_code) = match invoke_result {
            Ok(ret) => (ret.clone(), ExitCode::OK),
            Err(ae) => (vec![], ae.exit_code()),
        };
        let msg = self.msg.clone();
        InvocationTrace {
            from: msg.from,
            to: msg.to,
            value: msg.value,
            method: msg.method,
            params: msg.params,
            exit_code,
            return_values,
            subinvocations: self.subinvocations.take(),
        }
    }

    /// Transfers the attached value and runs the target method. On failure every
    /// state change made by this invocation, and by the sends it made, is undone.
    pub fn invoke(&mut self) -> Result<Vec<RawBytes>, ActorError> {
        let prior_root = self.v.checkpoint().exit_code(ExitCode::SYS_ASSERTION_FAILED)?;

        let res = self.invoke_inner();
        if res.is_err() {
            self.v.rollback(&prior_root).exit_code(ExitCode::SYS_ASSERTION_FAILED)?;
        }
        res
    }

    fn invoke_inner(&self) -> Result<Vec<RawBytes>, ActorError> {
        self.v.transfer(&self.msg.from, &self.msg.to, &self.msg.value)?;

        // Exit early on send
        if self.msg.method == METHOD_SEND {
            return Ok(vec![]);
        }

        let to_actor = self
            .v
            .get_actor(&self.msg.to)
            .exit_code(ExitCode::SYS_ASSERTION_FAILED)?
            .with_context_code(ExitCode::SYS_INVALID_RECEIVER, || {
                format!("receiver {} not found", self.msg.to)
            })?;
        let typ = self.v.builtins.type_of(&to_actor.code).with_context_code(
            ExitCode::SYS_ASSERTION_FAILED,
            || format!("actor {} has unknown code {}", self.msg.to, to_actor.code),
        )?;

        trace!(
            "invoking {}::{} on {} from {}",
            typ.name(),
            self.msg.method,
            self.msg.to,
            self.msg.from
        );
        let mut res = self.v.builtins.invoke(typ, self, &self.msg.method, &self.msg.params);
        if res.is_ok() && !*self.caller_validated.borrow() {
            res = Err(actor_error!(assertion_failed, "failed to validate caller"));
        }
        res
    }

    fn mark_caller_validated(&self) -> Result<(), ActorError> {
        if self.caller_validated.replace(true) {
            return Err(actor_error!(assertion_failed, "caller double validated"));
        }
        Ok(())
    }

    fn receiver_state(&self) -> Result<vm_api::ActorState, ActorError> {
        self.v
            .get_actor(&self.msg.to)
            .exit_code(ExitCode::SYS_ASSERTION_FAILED)?
            .with_context_code(ExitCode::SYS_ASSERTION_FAILED, || {
                format!("actor {} does not exist", self.msg.to)
            })
    }
}

impl<'invocation, 'bs, BS: Blockstore> Runtime for InvocationCtx<'invocation, 'bs, BS> {
    type Blockstore = &'bs BS;

    fn message(&self) -> &dyn MessageInfo {
        self
    }

    fn validate_immediate_caller_accept_any(&self) -> Result<(), ActorError> {
        self.mark_caller_validated()
    }

    fn validate_immediate_caller_is<'a, I>(&self, addresses: I) -> Result<(), ActorError>
    where
        I: IntoIterator<Item = &'a Address>,
    {
        self.mark_caller_validated()?;
        if addresses.into_iter().any(|a| *a == self.msg.from) {
            return Ok(());
        }
        Err(actor_error!(forbidden; "immediate caller {} address forbidden", self.msg.from))
    }

    fn validate_immediate_caller_type<'a, I>(&self, types: I) -> Result<(), ActorError>
    where
        I: IntoIterator<Item = &'a Type>,
    {
        self.mark_caller_validated()?;
        if let Some(caller_type) = self.get_actor_type(&self.msg.from)? {
            if types.into_iter().any(|t| *t == caller_type) {
                return Ok(());
            }
        }
        Err(actor_error!(forbidden; "immediate caller {} actor type forbidden", self.msg.from))
    }

    fn get_actor_type(&self, address: &Address) -> Result<Option<Type>, ActorError> {
        let actor = self.v.get_actor(address).exit_code(ExitCode::SYS_ASSERTION_FAILED)?;
        Ok(actor.and_then(|a| self.v.builtins.type_of(&a.code)))
    }

    fn get_state_root(&self) -> Result<Cid, ActorError> {
        Ok(self.receiver_state()?.head)
    }

    fn set_state_root(&self, root: &Cid) -> Result<(), ActorError> {
        let mut act = self.receiver_state()?;
        act.head = *root;
        self.v.put_actor(&self.msg.to, act).exit_code(ExitCode::SYS_ASSERTION_FAILED)
    }

    fn transaction<S, RT, F>(&self, f: F) -> Result<RT, ActorError>
    where
        S: Serialize + DeserializeOwned,
        F: FnOnce(&mut S, &Self) -> Result<RT, ActorError>,
    {
        let mut st = self.state::<S>()?;
        self.allow_side_effects.replace(false);
        let result = f(&mut st, self);
        self.allow_side_effects.replace(true);
        let ret = result?;
        let root = self
            .v
            .store
            .put_cbor(&st, Code::Blake2b256)
            .context_code(ExitCode::USR_ILLEGAL_STATE, "failed to write actor state")?;
        self.set_state_root(&root)?;
        Ok(ret)
    }

    fn store(&self) -> &&'bs BS {
        &self.v.store
    }

    fn send(
        &self,
        to: &Address,
        method: &str,
        params: RawBytes,
        value: TokenAmount,
    ) -> Result<Vec<RawBytes>, ActorError> {
        if !*self.allow_side_effects.borrow() {
            return Err(ActorError::unchecked(
                ExitCode::SYS_ASSERTION_FAILED,
                "side-effect within transaction".to_string(),
            ));
        }

        let new_actor_msg = InternalMessage {
            from: self.msg.to,
            to: *to,
            value,
            method: method.to_string(),
            params,
        };
        let mut new_ctx = InvocationCtx::new(self.v, self.top.clone(), new_actor_msg);
        let res = new_ctx.invoke();
        let invoc = new_ctx.gather_trace(&res);
        self.subinvocations.borrow_mut().push(invoc);
        res
    }

    fn new_actor_address(&self) -> Result<Address, ActorError> {
        Ok(derive_actor_address(&self.top.originator, self.top.originator_nonce))
    }

    fn create_actor(&self, typ: Type, address: &Address) -> Result<(), ActorError> {
        self.v.create_actor(address, self.v.builtins.code_for(typ))
    }
}

impl<BS: Blockstore> RuntimePolicy for InvocationCtx<'_, '_, BS> {
    fn policy(&self) -> &Policy {
        &self.v.policy
    }
}
