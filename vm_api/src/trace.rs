use fvm_ipld_encoding::RawBytes;
use fvm_shared::address::Address;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;

/// A trace of an actor method invocation.
#[derive(Clone, Debug)]
pub struct InvocationTrace {
    pub from: Address,
    pub to: Address,
    pub value: TokenAmount,
    pub method: String,
    pub params: RawBytes,
    pub exit_code: ExitCode,
    pub return_values: Vec<RawBytes>,
    pub subinvocations: Vec<InvocationTrace>,
}

/// An expectation for a method invocation trace.
/// Non-optional fields must always be specified, and are always checked against any trace.
/// Optional fields are ignored when checking the expectation against a trace.
#[derive(Clone, Debug)]
pub struct ExpectInvocation {
    pub from: Address,
    pub to: Address,
    pub method: String,
    pub value: Option<TokenAmount>,
    pub params: Option<RawBytes>,
    pub exit_code: ExitCode,
    pub return_values: Option<Vec<RawBytes>>,
    pub subinvocs: Option<Vec<ExpectInvocation>>,
}

impl ExpectInvocation {
    /// Asserts that a trace matches this expectation, including subinvocations.
    pub fn matches(&self, invoc: &InvocationTrace) {
        let id = format!("[{}→{}:{}]", invoc.from, invoc.to, invoc.method);
        self.quick_match(invoc, String::new());

        assert_eq!(
            self.exit_code, invoc.exit_code,
            "{} unexpected exit_code: expected: {}, was: {}",
            id, self.exit_code, invoc.exit_code
        );
        if let Some(v) = &self.return_values {
            assert_eq!(
                v, &invoc.return_values,
                "{} unexpected return_values: expected: {:?}, was: {:?}",
                id, v, invoc.return_values
            );
        }
        if let Some(v) = &self.value {
            assert_eq!(
                v, &invoc.value,
                "{} unexpected value: expected: {}, was: {} ",
                id, v, invoc.value
            );
        }
        if let Some(p) = &self.params {
            assert_eq!(
                p, &invoc.params,
                "{} unexpected params: expected: {:x?}, was: {:x?}",
                id, p, invoc.params
            );
        }

        if let Some(expect_subinvocs) = &self.subinvocs {
            let subinvocs = &invoc.subinvocations;

            let panic_str = format!(
                "unexpected subinvocs:\n expected: \n[\n{}]\n was:\n[\n{}]\n",
                self.fmt_expect_invocs(expect_subinvocs),
                self.fmt_invocs(subinvocs)
            );
            assert_eq!(subinvocs.len(), expect_subinvocs.len(), "{} {}", id, panic_str);

            for (expect_invoc, invoc) in expect_subinvocs.iter().zip(subinvocs) {
                // only try to match if required fields match
                expect_invoc.quick_match(invoc, panic_str.clone());
                expect_invoc.matches(invoc);
            }
        }
    }

    pub fn fmt_invocs(&self, invocs: &[InvocationTrace]) -> String {
        invocs.iter().enumerate().fold(String::new(), |mut s, (i, invoc)| {
            use std::fmt::Write;
            let _ = writeln!(s, "{}: [{}:{}],", i, invoc.to, invoc.method);
            s
        })
    }

    pub fn fmt_expect_invocs(&self, exs: &[ExpectInvocation]) -> String {
        exs.iter().enumerate().fold(String::new(), |mut s, (i, ex)| {
            use std::fmt::Write;
            let _ = writeln!(s, "{}: [{}:{}],", i, ex.to, ex.method);
            s
        })
    }

    pub fn quick_match(&self, invoc: &InvocationTrace, extra_msg: String) {
        let id = format!("[{}→{}:{}]", invoc.from, invoc.to, invoc.method);
        assert_eq!(
            self.from, invoc.from,
            "{} unexpected from addr: expected: {}, was: {} \n{}",
            id, self.from, invoc.from, extra_msg
        );
        assert_eq!(
            self.to, invoc.to,
            "{} unexpected to addr: expected: {}, was: {} \n{}",
            id, self.to, invoc.to, extra_msg
        );
        assert_eq!(
            self.method, invoc.method,
            "{} unexpected method: expected: {}, was: {} \n{}",
            id, self.method, invoc.method, extra_msg
        );
    }
}

impl Default for ExpectInvocation {
    // Defaults are mainly useful for ignoring optional fields with a ..Default::default() clause.
    // The addresses must generally be provided explicitly.
    // Defaults include successful exit code.
    fn default() -> Self {
        Self {
            from: Address::new_id(0),
            to: Address::new_id(0),
            method: String::new(),
            value: None,
            params: None,
            exit_code: ExitCode::OK,
            return_values: None,
            subinvocs: None,
        }
    }
}
