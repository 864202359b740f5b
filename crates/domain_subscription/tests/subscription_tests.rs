//! Tests for domain_subscription services and the access gate

use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::{Money, PaymentId, ReferenceMonth};
use domain_subscription::{
    AccessDecision, Banner, GatePolicy, PaymentStatus, PaymentSubmission, SubscriptionError,
    SubscriptionService, User, UserStatus,
};
use test_utils::{
    assert_err_matches, date, ActorFixtures, CalendarFixtures, PaymentBuilder, TestStores,
    UserBuilder,
};

fn service(stores: &TestStores) -> SubscriptionService {
    SubscriptionService::new(stores.users.clone(), stores.payments.clone(), GatePolicy::default())
}

fn march_submission() -> PaymentSubmission {
    PaymentSubmission {
        amount: Money::brl(dec!(89.90)),
        reference_month: CalendarFixtures::march_2024(),
        receipt_url: "https://files.example/comprovante-03.pdf".to_string(),
        due_date: date(2024, 3, 5),
    }
}

// ============================================================================
// Access Gate
// ============================================================================

mod gate_tests {
    use super::*;

    #[test]
    fn test_overdue_on_day_six() {
        let user = UserBuilder::new().build();
        let decision = AccessDecision::evaluate(&GatePolicy::default(), &user, &[], CalendarFixtures::overdue_day());
        assert_eq!(decision.banner, Some(Banner::Overdue));
        assert!(!decision.blocked);
    }

    #[test]
    fn test_grace_on_day_three() {
        let user = UserBuilder::new().build();
        let decision = AccessDecision::evaluate(&GatePolicy::default(), &user, &[], CalendarFixtures::grace_day());
        assert_eq!(decision.banner, Some(Banner::Grace { days_remaining: 3 }));
    }

    #[test]
    fn test_pending_or_approved_payment_opens_gate() {
        let user = UserBuilder::new().build();
        for status in [PaymentStatus::AguardandoVerificacao, PaymentStatus::Aprovado] {
            let payment = PaymentBuilder::for_user(&user).status(status).build();
            let decision =
                AccessDecision::evaluate(&GatePolicy::default(), &user, &[payment], CalendarFixtures::overdue_day());
            assert_eq!(decision.banner, None);
        }
    }

    #[test]
    fn test_rejected_or_other_month_payment_does_not_count() {
        let user = UserBuilder::new().build();
        let rejected = PaymentBuilder::for_user(&user).status(PaymentStatus::Recusado).build();
        let february = PaymentBuilder::for_user(&user)
            .month(ReferenceMonth::new(2, 2024).unwrap())
            .status(PaymentStatus::Aprovado)
            .build();
        let decision = AccessDecision::evaluate(
            &GatePolicy::default(),
            &user,
            &[rejected, february],
            CalendarFixtures::overdue_day(),
        );
        assert_eq!(decision.banner, Some(Banner::Overdue));
    }

    #[test]
    fn test_block_is_independent_of_banner() {
        let user = UserBuilder::new().blocked().build();
        let paid = PaymentBuilder::for_user(&user).status(PaymentStatus::Aprovado).build();
        let decision =
            AccessDecision::evaluate(&GatePolicy::default(), &user, &[paid], CalendarFixtures::grace_day());
        assert_eq!(decision.banner, None);
        assert!(decision.blocked);
    }

    #[test]
    fn test_admin_never_sees_banner_or_block() {
        let admin = UserBuilder::new().admin().blocked().build();
        let decision =
            AccessDecision::evaluate(&GatePolicy::default(), &admin, &[], CalendarFixtures::overdue_day());
        assert_eq!(decision.banner, None);
        assert!(!decision.blocked);
    }

    #[test]
    fn test_custom_policy_windows() {
        let policy = GatePolicy {
            grace_days: 10,
            approaching_window: 2,
        };
        assert_eq!(policy.banner(date(2024, 3, 8), false), Some(Banner::Grace { days_remaining: 3 }));
        assert_eq!(policy.banner(date(2024, 3, 28), false), Some(Banner::Overdue));
        assert_eq!(
            policy.banner(date(2024, 3, 29), false),
            Some(Banner::Approaching { days_until_month_end: 2 })
        );
    }

    proptest! {
        #[test]
        fn settled_month_never_shows_banner(day in 1u32..=31) {
            if let Some(today) = chrono::NaiveDate::from_ymd_opt(2024, 1, day) {
                prop_assert_eq!(GatePolicy::default().banner(today, true), None);
            }
        }

        #[test]
        fn unsettled_month_always_shows_banner(today in test_utils::date_strategy()) {
            prop_assert!(GatePolicy::default().banner(today, false).is_some());
        }
    }
}

// ============================================================================
// Subscription Service
// ============================================================================

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_then_duplicate_is_refused() {
        let user = UserBuilder::new().build();
        let stores = TestStores::with_users([user.clone()]);
        let service = service(&stores);

        let payment = service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::AguardandoVerificacao);
        assert_eq!(payment.company_id, user.company_id);

        let again = service.submit_payment(&user.actor(), march_submission()).await;
        assert_err_matches!(again, SubscriptionError::DuplicatePayment { .. });
        assert_eq!(service.pending_verification_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_allowed_after_rejection() {
        let user = UserBuilder::new().build();
        let stores = TestStores::with_users([user.clone()]);
        let service = service(&stores);
        let admin = ActorFixtures::admin();

        let first = service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        service
            .reject_payment(first.id, &admin, "valor incorreto", date(2024, 3, 7))
            .await
            .unwrap();

        let second = service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_approval_activates_blocked_user() {
        let user = UserBuilder::new().blocked().build();
        let stores = TestStores::with_users([user.clone()]);
        let service = service(&stores);
        let admin = ActorFixtures::admin();

        let payment = service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        let approved = service.approve_payment(payment.id, &admin, date(2024, 3, 8)).await.unwrap();

        assert_eq!(approved.status, PaymentStatus::Aprovado);
        assert_eq!(approved.verified_by, Some(admin.user_id));
        assert_eq!(stores.users.get(user.id).await.unwrap().status, UserStatus::Ativo);
        assert_eq!(service.pending_verification_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejection_leaves_user_status() {
        let user = UserBuilder::new().blocked().build();
        let stores = TestStores::with_users([user.clone()]);
        let service = service(&stores);

        let payment = service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        let rejected = service
            .reject_payment(payment.id, &ActorFixtures::admin(), "comprovante ilegível", date(2024, 3, 8))
            .await
            .unwrap();

        assert_eq!(rejected.status, PaymentStatus::Recusado);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("comprovante ilegível"));
        assert_eq!(stores.users.get(user.id).await.unwrap().status, UserStatus::Inativo);
    }

    #[tokio::test]
    async fn test_verification_requires_admin() {
        let user = UserBuilder::new().build();
        let stores = TestStores::with_users([user.clone()]);
        let service = service(&stores);

        let payment = service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        let result = service.approve_payment(payment.id, &user.actor(), date(2024, 3, 8)).await;
        assert_err_matches!(result, SubscriptionError::Forbidden(_));
    }

    #[tokio::test]
    async fn test_unknown_payment_is_not_found() {
        let stores = TestStores::in_memory();
        let result = service(&stores)
            .approve_payment(PaymentId::new(), &ActorFixtures::admin(), date(2024, 3, 8))
            .await;
        match result {
            Err(SubscriptionError::Port(e)) => assert!(e.is_not_found()),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_block_and_unblock() {
        let user = UserBuilder::new().build();
        let stores = TestStores::with_users([user.clone()]);
        let service = service(&stores);
        let admin = ActorFixtures::admin();

        let blocked = service.block_user(user.id, &admin).await.unwrap();
        assert!(blocked.is_blocked());
        let gate = service.evaluate_gate(&user.actor(), CalendarFixtures::grace_day()).await.unwrap();
        assert!(gate.blocked);

        let unblocked = service.unblock_user(user.id, &admin).await.unwrap();
        assert_eq!(unblocked.status, UserStatus::Ativo);

        let denied = service.block_user(user.id, &user.actor()).await;
        assert_err_matches!(denied, SubscriptionError::Forbidden(_));
    }

    #[tokio::test]
    async fn test_admin_gate_needs_no_user_record() {
        let stores = TestStores::in_memory();
        let gate = service(&stores)
            .evaluate_gate(&ActorFixtures::admin(), CalendarFixtures::overdue_day())
            .await
            .unwrap();
        assert_eq!(gate.banner, None);
        assert!(!gate.blocked);
    }

    #[tokio::test]
    async fn test_register_user_requires_admin() {
        let stores = TestStores::in_memory();
        let service = service(&stores);
        let user = UserBuilder::new().build();

        let denied = service.register_user(&user.actor(), user.clone()).await;
        assert_err_matches!(denied, SubscriptionError::Forbidden(_));

        let created = service.register_user(&ActorFixtures::admin(), user.clone()).await.unwrap();
        assert_eq!(service.user(user.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_evaluate_gate_reads_current_month() {
        let user = UserBuilder::new().build();
        let other_company = User::new("outra@empresa.com", "Outra");
        let stores = TestStores::with_users([user.clone(), other_company.clone()]);
        let service = service(&stores);

        service.submit_payment(&other_company.actor(), march_submission()).await.unwrap();
        let gate = service.evaluate_gate(&user.actor(), CalendarFixtures::overdue_day()).await.unwrap();
        assert_eq!(gate.banner, Some(Banner::Overdue));
        assert_eq!(gate.reference_month, CalendarFixtures::march_2024());

        service.submit_payment(&user.actor(), march_submission()).await.unwrap();
        let gate = service.evaluate_gate(&user.actor(), CalendarFixtures::overdue_day()).await.unwrap();
        assert_eq!(gate.banner, None);
    }
}
