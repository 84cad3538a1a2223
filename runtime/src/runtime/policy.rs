use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;

pub trait RuntimePolicy {
    fn policy(&self) -> &Policy;
}

/// Protocol constants consulted by the built-in actors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    /// Smallest storage capacity, in bytes, a miner may pledge.
    pub minimum_pledge_bytes: BigInt,
    /// Collateral a miner must lock per pledged byte.
    pub minimum_collateral_per_byte: TokenAmount,
    /// Longest accepted miner public key, in bytes.
    pub max_public_key_size: usize,
}

impl Policy {
    /// Collateral required to back `pledge_bytes` of storage.
    pub fn minimum_collateral(&self, pledge_bytes: &BigInt) -> TokenAmount {
        TokenAmount::from_atto(self.minimum_collateral_per_byte.atto() * pledge_bytes)
    }
}

impl Default for Policy {
    fn default() -> Policy {
        Policy {
            minimum_pledge_bytes: BigInt::from(policy_constants::MINIMUM_PLEDGE_BYTES),
            minimum_collateral_per_byte: TokenAmount::from_atto(
                policy_constants::MINIMUM_COLLATERAL_PER_BYTE,
            ),
            max_public_key_size: policy_constants::MAX_PUBLIC_KEY_SIZE,
        }
    }
}

pub mod policy_constants {
    #[cfg(not(feature = "small-pledge"))]
    pub const MINIMUM_PLEDGE_BYTES: u64 = 10_000;
    #[cfg(feature = "small-pledge")]
    pub const MINIMUM_PLEDGE_BYTES: u64 = 1;

    /// 0.001 FIL per byte.
    pub const MINIMUM_COLLATERAL_PER_BYTE: u64 = 1_000_000_000_000_000;

    pub const MAX_PUBLIC_KEY_SIZE: usize = 100;
}
