// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use byteorder::{BigEndian, WriteBytesExt};
use fvm_shared::address::Address;

/// Computes the address of an actor created by `creator` at `nonce`.
///
/// The creator's byte form is followed by the nonce as a big-endian u64 and
/// hashed into an actor-protocol address. The result depends on nothing else,
/// so the address of a future actor can be predicted (and pre-funded) before
/// the creating message lands.
pub fn derive_actor_address(creator: &Address, nonce: u64) -> Address {
    let mut seed = creator.to_bytes();
    // Writing into a Vec cannot fail.
    let _ = seed.write_u64::<BigEndian>(nonce);
    Address::new_actor(&seed)
}
