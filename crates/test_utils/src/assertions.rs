//! Custom Test Assertions
//!
//! Assertion helpers for domain types with more useful failure messages
//! than a bare `assert_eq!`.

use core_kernel::Money;
use domain_billing::{DerivedStatus, InstallmentView};

/// Asserts that money values sum exactly to a total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = Money::sum(total.currency(), parts.iter()).expect("Currency mismatch in sum");
    assert_eq!(
        sum, *total,
        "Sum of parts ({}) doesn't equal total ({})",
        sum, total
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts that views are in display order: atrasado, then pendente, then
/// pago, each group by ascending due date
pub fn assert_display_order(views: &[InstallmentView]) {
    for pair in views.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let rank_a = a.derived_status.sort_rank();
        let rank_b = b.derived_status.sort_rank();
        assert!(
            rank_a < rank_b || (rank_a == rank_b && a.installment.due_date <= b.installment.due_date),
            "Out of order: {} due {} before {} due {}",
            a.derived_status.as_str(),
            a.installment.due_date,
            b.derived_status.as_str(),
            b.installment.due_date
        );
    }
}

/// Asserts a view's derived status and days late
pub fn assert_derived(view: &InstallmentView, status: DerivedStatus, days_late: Option<i64>) {
    assert_eq!(
        (view.derived_status, view.days_late),
        (status, days_late),
        "Unexpected derivation for installment due {}",
        view.installment.due_date
    );
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err matching a pattern
#[macro_export]
macro_rules! assert_err_matches {
    ($result:expr, $pattern:pat) => {
        match $result {
            Err(ref e) if matches!(e, $pattern) => {}
            Err(e) => panic!("Error did not match {}: {:?}", stringify!($pattern), e),
            Ok(v) => panic!("Expected Err matching {}, got Ok: {:?}", stringify!($pattern), v),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_sum_equals() {
        let parts = [Money::brl(dec!(33.34)), Money::brl(dec!(33.33)), Money::brl(dec!(33.33))];
        assert_money_sum_equals(&parts, &Money::brl(dec!(100)));
    }

    #[test]
    #[should_panic(expected = "doesn't equal total")]
    fn test_money_sum_mismatch_panics() {
        assert_money_sum_equals(&[Money::brl(dec!(1))], &Money::brl(dec!(2)));
    }
}
