//! Test Data Builders
//!
//! Builders with sensible defaults so tests set only the fields they care
//! about.

use chrono::NaiveDate;
use core_kernel::{ClientId, CompanyId, Money, ReferenceMonth, Role, SaleId};
use rust_decimal_macros::dec;

use domain_billing::{Installment, InstallmentStatus, Sale};
use domain_subscription::{PaymentStatus, SubscriptionPayment, User, UserStatus};

use crate::fixtures::{date, MoneyFixtures};

/// Builder for installments in any stored state
pub struct InstallmentBuilder {
    sale_id: SaleId,
    client_id: ClientId,
    client_name: String,
    number: u32,
    amount: Money,
    due_date: NaiveDate,
    paid_date: Option<NaiveDate>,
}

impl Default for InstallmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallmentBuilder {
    pub fn new() -> Self {
        Self {
            sale_id: SaleId::new_v7(),
            client_id: ClientId::new_v7(),
            client_name: "Maria Souza".to_string(),
            number: 1,
            amount: MoneyFixtures::brl_100(),
            due_date: date(2024, 3, 1),
            paid_date: None,
        }
    }

    pub fn for_client(mut self, client_id: ClientId, name: impl Into<String>) -> Self {
        self.client_id = client_id;
        self.client_name = name.into();
        self
    }

    pub fn for_sale(mut self, sale_id: SaleId) -> Self {
        self.sale_id = sale_id;
        self
    }

    pub fn number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Marks the installment paid on the given date
    pub fn paid_on(mut self, paid_date: NaiveDate) -> Self {
        self.paid_date = Some(paid_date);
        self
    }

    pub fn build(self) -> Installment {
        let mut installment = Installment::new(
            self.sale_id,
            self.client_id,
            self.client_name,
            self.number,
            self.amount,
            self.due_date,
        );
        if let Some(paid) = self.paid_date {
            installment.status = InstallmentStatus::Pago;
            installment.paid_date = Some(paid);
        }
        installment
    }
}

/// Builder for sales on credit terms
pub struct SaleBuilder {
    sale: Sale,
}

impl Default for SaleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleBuilder {
    pub fn new() -> Self {
        Self {
            sale: Sale {
                id: SaleId::new_v7(),
                client_id: ClientId::new_v7(),
                client_name: "Padaria Estrela".to_string(),
                total: Money::brl(dec!(300)),
                installment_count: 3,
                first_due_date: date(2024, 4, 10),
            },
        }
    }

    pub fn client(mut self, client_id: ClientId, name: impl Into<String>) -> Self {
        self.sale.client_id = client_id;
        self.sale.client_name = name.into();
        self
    }

    pub fn total(mut self, total: Money) -> Self {
        self.sale.total = total;
        self
    }

    pub fn installments(mut self, count: u32) -> Self {
        self.sale.installment_count = count;
        self
    }

    pub fn first_due(mut self, first_due_date: NaiveDate) -> Self {
        self.sale.first_due_date = first_due_date;
        self
    }

    pub fn build(self) -> Sale {
        self.sale
    }
}

/// Builder for company users
pub struct UserBuilder {
    user: User,
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UserBuilder {
    pub fn new() -> Self {
        Self {
            user: User::new("contato@empresa.com.br", "Empresa Teste"),
        }
    }

    pub fn company(mut self, company_id: CompanyId, name: impl Into<String>) -> Self {
        self.user.company_id = company_id;
        self.user.company_name = name.into();
        self
    }

    pub fn admin(mut self) -> Self {
        self.user.role = Role::Admin;
        self
    }

    pub fn blocked(mut self) -> Self {
        self.user.status = UserStatus::Inativo;
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}

/// Builder for subscription payments
pub struct PaymentBuilder {
    company_id: CompanyId,
    company_name: String,
    amount: Money,
    reference_month: ReferenceMonth,
    status: PaymentStatus,
}

impl PaymentBuilder {
    /// A payment for the user's company
    pub fn for_user(user: &User) -> Self {
        Self {
            company_id: user.company_id,
            company_name: user.company_name.clone(),
            amount: MoneyFixtures::mensalidade(),
            reference_month: ReferenceMonth::of(date(2024, 3, 1)),
            status: PaymentStatus::AguardandoVerificacao,
        }
    }

    pub fn month(mut self, reference_month: ReferenceMonth) -> Self {
        self.reference_month = reference_month;
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> SubscriptionPayment {
        let due = self
            .reference_month
            .first_day()
            .expect("valid reference month");
        let mut payment = SubscriptionPayment::submit(
            self.company_id,
            self.company_name,
            self.amount,
            self.reference_month,
            "https://files.example/comprovante.pdf",
            due,
        )
        .expect("valid payment");
        payment.status = self.status;
        payment
    }
}
