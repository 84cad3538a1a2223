use cid::multihash::{Code, MultihashDigest};
use cid::Cid;
use fvm_shared::IPLD_RAW;
use num_derive::FromPrimitive;

/// Identifies the built-in actor types.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, FromPrimitive, Debug, Hash)]
#[repr(i32)]
pub enum Type {
    Account = 1,
    StorageMarket = 2,
    Miner = 3,
}

impl Type {
    pub const ALL: [Type; 3] = [Type::Account, Type::StorageMarket, Type::Miner];

    pub fn name(&self) -> &'static str {
        match *self {
            Type::Account => "account",
            Type::StorageMarket => "storagemarket",
            Type::Miner => "miner",
        }
    }

    /// The code CID actors of this type carry: an identity hash of `fil/1/<name>`.
    pub fn code_cid(&self) -> Cid {
        let name = format!("fil/1/{}", self.name());
        Cid::new_v1(IPLD_RAW, Code::Identity.digest(name.as_bytes()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn codes_are_distinct_and_stable() {
        let codes: Vec<Cid> = Type::ALL.iter().map(Type::code_cid).collect();
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_eq!(Type::Miner.code_cid(), Type::Miner.code_cid());
        assert_eq!(Some(Type::Miner), Type::from_i32(3));
        assert_eq!(None, Type::from_i32(4));
    }
}
