use fvm_ipld_encoding::RawBytes;

use crate::{ActorError, MethodTable, Runtime};

/// Interface for invoking methods on an Actor
pub trait ActorCode {
    type Methods: MethodTable;

    /// A name for the actor type, used in debugging.
    fn name() -> &'static str;

    /// Invokes method with runtime on the actor's code. Method number will match one
    /// defined by the Actor, and parameters will be serialized and used in execution
    fn invoke_method<RT>(
        rt: &RT,
        method: &str,
        params: &RawBytes,
    ) -> Result<Vec<RawBytes>, ActorError>
    where
        RT: Runtime;

    /// Whether this actor exports a method with the given name.
    fn has_method(method: &str) -> bool {
        Self::Methods::from_name(method).is_some()
    }
}
