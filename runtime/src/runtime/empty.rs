use cid::multihash::{Code, MultihashDigest};
use cid::Cid;
use fvm_ipld_encoding::DAG_CBOR;
use lazy_static::lazy_static;

lazy_static! {
    /// Head of an actor whose state has not been created: the CID of an empty CBOR array.
    pub static ref EMPTY_ARR_CID: Cid = Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(&[0x80]));
}
