pub mod miner {
    use fvm_ipld_encoding::serde_bytes;
    use fvm_ipld_encoding::tuple::*;
    use fvm_shared::address::Address;
    use fvm_shared::bigint::{bigint_ser, BigInt};

    pub const CONSTRUCTOR_METHOD: &str = fil_actors_runtime::METHOD_CONSTRUCTOR;

    #[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
    pub struct MinerConstructorParams {
        pub owner: Address,
        #[serde(with = "serde_bytes")]
        pub public_key: Vec<u8>,
        #[serde(with = "bigint_ser")]
        pub pledge_bytes: BigInt,
        #[serde(with = "serde_bytes")]
        pub peer_id: Vec<u8>,
    }
}
