//! Internal testing utilities for the tensorgate crates.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Runs table-driven tests.
///
/// Describe each case with a `Debug` struct, conventionally named `Case`,
/// collect the cases into an array or `Vec` named `cases` and call
/// `cases.test_each(|case| { ... })`.
///
/// Every case is run even if earlier ones fail. Panics are caught, and once
/// all cases have run the test fails with the number of failing cases and
/// their debug representations.
///
/// ```
/// use tensorgate_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case<'a> {
///     text: &'a str,
///     expected: Option<u8>,
/// }
///
/// let cases = [
///     Case { text: "12", expected: Some(12) },
///     Case { text: "-1", expected: None },
/// ];
///
/// cases.test_each(|case| {
///     assert_eq!(case.text.parse::<u8>().ok(), case.expected);
/// });
/// ```
///
/// Cases and the values captured by the test closure must be unwind safe.
/// Values with interior mutability should be created inside the closure, or
/// wrapped in [`AssertUnwindSafe`](std::panic::AssertUnwindSafe).
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Call `test` with each case by value.
    ///
    /// The debug representation of each case is captured before the call,
    /// so that it can be reported if the case fails.
    fn test_each_value(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe;
}

fn report_failures<F: Debug>(failures: &[F]) {
    assert!(
        failures.is_empty(),
        "{} test cases failed: {:?}",
        failures.len(),
        failures
    );
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<I::Item> = self
            .into_iter()
            .filter(|case| std::panic::catch_unwind(|| test(case)).is_err())
            .collect();
        report_failures(&failures);
    }

    fn test_each_value(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<String> = self
            .into_iter()
            .filter_map(|case| {
                let case_str = format!("{:?}", case);
                std::panic::catch_unwind(move || test(case))
                    .is_err()
                    .then_some(case_str)
            })
            .collect();
        report_failures(&failures);
    }
}
