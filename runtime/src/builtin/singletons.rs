use fvm_shared::address::Address;
use fvm_shared::ActorID;

/// Account holding the genesis token supply.
pub const NETWORK_ACTOR_ID: ActorID = 1;
pub const NETWORK_ACTOR_ADDR: Address = Address::new_id(NETWORK_ACTOR_ID);

pub const STORAGE_MARKET_ACTOR_ID: ActorID = 2;
pub const STORAGE_MARKET_ACTOR_ADDR: Address = Address::new_id(STORAGE_MARKET_ACTOR_ID);
