use std::collections::BTreeMap;

use cid::Cid;
use fvm_ipld_encoding::RawBytes;

use fil_actor_account::Actor as AccountActor;
use fil_actor_market::Actor as MarketActor;
use fil_actor_miner::Actor as MinerActor;
use fil_actors_runtime::runtime::builtins::Type;
use fil_actors_runtime::runtime::{ActorCode, Runtime};
use fil_actors_runtime::ActorError;

/// The built-in actors a VM can execute, keyed by code CID.
///
/// Built once and handed to the VM; there is no process-wide table.
#[derive(Clone, Debug)]
pub struct BuiltinActors {
    types: BTreeMap<Cid, Type>,
}

impl BuiltinActors {
    pub fn new() -> Self {
        Self { types: Type::ALL.iter().map(|t| (t.code_cid(), *t)).collect() }
    }

    pub fn code_for(&self, typ: Type) -> Cid {
        typ.code_cid()
    }

    pub fn type_of(&self, code: &Cid) -> Option<Type> {
        self.types.get(code).copied()
    }

    pub fn has_method(&self, typ: Type, method: &str) -> bool {
        match typ {
            Type::Account => AccountActor::has_method(method),
            Type::StorageMarket => MarketActor::has_method(method),
            Type::Miner => MinerActor::has_method(method),
        }
    }

    pub fn invoke<RT: Runtime>(
        &self,
        typ: Type,
        rt: &RT,
        method: &str,
        params: &RawBytes,
    ) -> Result<Vec<RawBytes>, ActorError> {
        match typ {
            Type::Account => AccountActor::invoke_method(rt, method, params),
            Type::StorageMarket => MarketActor::invoke_method(rt, method, params),
            Type::Miner => MinerActor::invoke_method(rt, method, params),
        }
    }

    pub fn manifest(&self) -> BTreeMap<Cid, Type> {
        self.types.clone()
    }
}

impl Default for BuiltinActors {
    fn default() -> Self {
        Self::new()
    }
}
