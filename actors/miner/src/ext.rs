pub mod market {
    use fvm_ipld_encoding::tuple::*;
    use fvm_shared::bigint::{bigint_ser, BigInt};
    use fvm_shared::econ::TokenAmount;

    pub const ADD_ASK_METHOD: &str = "addAsk";

    #[derive(Serialize_tuple, Deserialize_tuple, Debug, Clone, Eq, PartialEq)]
    pub struct AddAskParams {
        pub price: TokenAmount,
        #[serde(with = "bigint_ser")]
        pub size: BigInt,
    }
}
