use std::marker::PhantomData;

use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::bigint::BigInt;
use fvm_shared::econ::TokenAmount;
use serde::Deserialize;

use crate::builtin::shared::encode_index;
use crate::{actor_error, ActorError};

/// A closed table of the method names an actor exports.
pub trait MethodTable: Sized + Copy + 'static {
    /// Resolves a method by exact name.
    fn from_name(name: &str) -> Option<Self>;
    /// The exported name of this method.
    fn name(self) -> &'static str;
    /// Every method in the table, in declaration order.
    fn all() -> &'static [Self];
}

/// Declare an actor's method table:
///
/// ```ignore
/// method_names! {
///     pub enum Method {
///         CreateMiner = "createMiner",
///     }
/// }
/// ```
#[macro_export]
macro_rules! method_names {
    ($(#[$m:meta])* $vis:vis enum $name:ident { $($variant:ident = $str:literal,)* }) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $vis enum $name {
            $($variant,)*
        }

        impl $crate::MethodTable for $name {
            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($str => Some(Self::$variant),)*
                    _ => None,
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)*
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant,)*]
            }
        }
    };
}

/// Implement actor method dispatch:
///
/// ```ignore
/// type Actor;
/// method_names! {
///     pub enum Method {
///         Constructor = "constructor",
///     }
/// }
/// impl ActorCode for Actor {
///     type Methods = Method;
///     actor_dispatch! {
///         Constructor => constructor,
///     }
/// }
/// ```
#[macro_export]
macro_rules! actor_dispatch {
    ($($(#[$m:meta])* $method:ident => $func:ident,)*) => {
        #[allow(unused_variables)]
        fn invoke_method<RT>(
            rt: &RT,
            method: &str,
            args: &fvm_ipld_encoding::RawBytes,
        ) -> Result<Vec<fvm_ipld_encoding::RawBytes>, $crate::ActorError>
        where
            RT: $crate::runtime::Runtime,
        {
            match <Self::Methods as $crate::MethodTable>::from_name(method) {
                $($(#[$m])*
                  Some(Self::Methods::$method) => $crate::dispatch(rt, Self::$func, args),)*
                _ => Err($crate::actor_error!(unhandled_message; "invalid method: {}", method)),
            }
        }
    };
}

/// Conversion of a method's result into receipt return values.
pub trait IntoReturn {
    fn into_return(self) -> Vec<RawBytes>;
}

impl IntoReturn for () {
    fn into_return(self) -> Vec<RawBytes> {
        Vec::new()
    }
}

impl IntoReturn for Address {
    fn into_return(self) -> Vec<RawBytes> {
        vec![RawBytes::new(self.to_bytes())]
    }
}

/// Order book indices are returned as minimal big-endian integers.
impl IntoReturn for u64 {
    fn into_return(self) -> Vec<RawBytes> {
        vec![RawBytes::new(encode_index(self))]
    }
}

impl IntoReturn for Vec<u8> {
    fn into_return(self) -> Vec<RawBytes> {
        vec![RawBytes::new(self)]
    }
}

/// Big integers are returned as their big-endian magnitude.
impl IntoReturn for BigInt {
    fn into_return(self) -> Vec<RawBytes> {
        vec![RawBytes::new(self.to_bytes_be().1)]
    }
}

impl IntoReturn for TokenAmount {
    fn into_return(self) -> Vec<RawBytes> {
        self.atto().clone().into_return()
    }
}

pub trait Dispatch<'de, RT> {
    fn call(self, rt: &RT, args: &'de RawBytes) -> Result<Vec<RawBytes>, ActorError>;
}

pub struct Dispatcher<F, A> {
    func: F,
    _marker: PhantomData<fn(A)>,
}

impl<F, A> Dispatcher<F, A> {
    const fn new(f: F) -> Self {
        Dispatcher { func: f, _marker: PhantomData }
    }
}

/// Dispatch an actor method, deserializing the input and converting the output.
///
/// Methods taking no parameters must be called with empty params; methods
/// taking one parameter decode it from the CBOR params.
#[doc(hidden)]
pub fn dispatch<'de, F, A, RT>(
    rt: &RT,
    func: F,
    arg: &'de RawBytes,
) -> Result<Vec<RawBytes>, ActorError>
where
    Dispatcher<F, A>: Dispatch<'de, RT>,
{
    Dispatcher::new(func).call(rt, arg)
}

impl<'de, F, R, RT> Dispatch<'de, RT> for Dispatcher<F, ()>
where
    F: FnOnce(&RT) -> Result<R, ActorError>,
    R: IntoReturn,
{
    fn call(self, rt: &RT, args: &'de RawBytes) -> Result<Vec<RawBytes>, ActorError> {
        if !args.is_empty() {
            return Err(actor_error!(illegal_argument; "method expects no arguments"));
        }
        Ok((self.func)(rt)?.into_return())
    }
}

impl<'de, F, A, R, RT> Dispatch<'de, RT> for Dispatcher<F, (A,)>
where
    F: FnOnce(&RT, A) -> Result<R, ActorError>,
    A: Deserialize<'de>,
    R: IntoReturn,
{
    fn call(self, rt: &RT, args: &'de RawBytes) -> Result<Vec<RawBytes>, ActorError> {
        if args.is_empty() {
            return Err(actor_error!(illegal_argument; "method expects arguments"));
        }
        let arg = fvm_ipld_encoding::from_slice(args.bytes())
            .map_err(|e| actor_error!(serialization; "failed to decode params: {}", e))?;
        Ok((self.func)(rt, arg)?.into_return())
    }
}

#[test]
fn test_dispatch() {
    use crate::ActorError;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Serialize_tuple, Deserialize_tuple)]
    struct SomeArgs {
        foo: String,
    }

    trait Runtime {}
    struct MockRuntime;
    impl Runtime for MockRuntime {}

    fn with_arg(_: &impl Runtime, foo: SomeArgs) -> Result<(), ActorError> {
        assert_eq!(foo.foo, "foo");
        Ok(())
    }

    fn with_arg_ret(_: &impl Runtime, _: SomeArgs) -> Result<u64, ActorError> {
        Ok(258)
    }

    fn without_arg(_: &impl Runtime) -> Result<(), ActorError> {
        Ok(())
    }

    let rt = MockRuntime;
    let arg = RawBytes::serialize(SomeArgs { foo: "foo".into() })
        .expect("failed to serialize arguments");
    let empty = RawBytes::default();

    // Correct dispatch
    assert!(dispatch(&rt, with_arg, &arg).expect("failed to dispatch").is_empty());
    assert!(dispatch(&rt, without_arg, &empty).expect("failed to dispatch").is_empty());
    assert_eq!(
        dispatch(&rt, with_arg_ret, &arg).expect("failed to dispatch"),
        vec![RawBytes::new(vec![1, 2])]
    );

    // Incorrect dispatch
    let _ = dispatch(&rt, with_arg, &empty).expect_err("should have required an argument");
    let _ = dispatch(&rt, without_arg, &arg).expect_err("should have rejected an argument");
}
