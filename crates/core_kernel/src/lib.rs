//! Core Kernel - Foundational types shared by every domain crate
//!
//! - Money with precise decimal arithmetic
//! - Business calendar: local-date normalization and reference months
//! - Strongly-typed identifiers and the acting user
//! - The `Repository<T>` port all entity access goes through
//! - Fixed-interval background tasks with cancellation

pub mod money;
pub mod calendar;
pub mod identifiers;
pub mod actor;
pub mod ports;
pub mod schedule;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use calendar::{Timezone, Clock, ReferenceMonth, CalendarError, days_between, last_day_of_month, add_months};
pub use identifiers::{
    ClientId, SaleId, InstallmentId, DocumentId, CompanyId, UserId, PaymentId,
};
pub use actor::{Actor, Role};
pub use ports::{
    PortError, DomainPort, Entity, EntityFilter, Repository,
    AdapterHealth, HealthCheckResult, HealthCheckable,
};
pub use schedule::{PeriodicTask, CancellationHandle};
pub use error::CoreError;
