//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities. Fixtures are fixed and
//! predictable; use the builders when a test needs to vary a field.

use chrono::NaiveDate;
use core_kernel::{Actor, ClientId, Currency, Money, Rate, ReferenceMonth, Role, UserId};
use rust_decimal_macros::dec;

use domain_billing::{BoletoTerms, FiscalDocument};
use domain_subscription::User;

/// Builds a date, panicking on an invalid one
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn brl_100() -> Money {
        Money::brl(dec!(100.00))
    }

    /// A monthly subscription fee
    pub fn mensalidade() -> Money {
        Money::brl(dec!(89.90))
    }

    /// A sale total that does not split evenly in three
    pub fn uneven_sale_total() -> Money {
        Money::brl(dec!(1000.00))
    }

    pub fn brl_zero() -> Money {
        Money::zero(Currency::BRL)
    }

    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for calendar test data
pub struct CalendarFixtures;

impl CalendarFixtures {
    /// The worked example: an installment due on Mar 1 seen on Mar 10
    pub fn example_due_date() -> NaiveDate {
        date(2024, 3, 1)
    }

    pub fn example_today() -> NaiveDate {
        date(2024, 3, 10)
    }

    /// Inside the grace period, three days left
    pub fn grace_day() -> NaiveDate {
        date(2024, 3, 3)
    }

    /// First day past the grace period
    pub fn overdue_day() -> NaiveDate {
        date(2024, 3, 6)
    }

    /// Within four days of the end of March
    pub fn approaching_day() -> NaiveDate {
        date(2024, 3, 28)
    }

    pub fn march_2024() -> ReferenceMonth {
        ReferenceMonth::of(date(2024, 3, 1))
    }
}

/// Fixture for actors and users
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn admin() -> Actor {
        Actor::admin(UserId::new_v7())
    }

    pub fn regular_user() -> Actor {
        Actor::new(UserId::new_v7(), Role::User)
    }

    pub fn company_user() -> User {
        User::new("financeiro@padariaestrela.com.br", "Padaria Estrela")
    }

    pub fn admin_user() -> User {
        User::new("admin@sistema.com.br", "Sistema").with_role(Role::Admin)
    }
}

/// Fixture for fiscal documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    pub fn nota_servico() -> FiscalDocument {
        FiscalDocument::nota_servico("NFS-0001", ClientId::new_v7(), "Oficina Silva", MoneyFixtures::brl_100(), date(2024, 3, 1))
    }

    pub fn recibo() -> FiscalDocument {
        FiscalDocument::recibo("REC-0001", ClientId::new_v7(), "Oficina Silva", MoneyFixtures::brl_100(), date(2024, 3, 1))
    }

    /// A R$ 1000 boleto due Mar 10 with 2% penalty and 1% monthly interest
    pub fn boleto() -> FiscalDocument {
        let terms = BoletoTerms::new(date(2024, 3, 10))
            .with_charges(Rate::from_percentage(dec!(2)), Rate::from_percentage(dec!(1)));
        FiscalDocument::boleto(
            "BOL-0001",
            ClientId::new_v7(),
            "Mercado Central",
            Money::brl(dec!(1000)),
            date(2024, 3, 1),
            terms,
        )
    }
}
