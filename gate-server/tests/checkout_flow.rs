//! Checkout flow integration tests
//!
//! Runs the verify → hold → settle pipeline against an in-memory database.

use std::sync::Arc;

use gate_server::checkout::{BuyerIdentity, CheckoutOutcome, CheckoutService};
use gate_server::core::{AvailabilityVersions, Config};
use gate_server::db;
use gate_server::db::repository::{
    AttendeeRepository, CouponRepository, EventRepository, ReservationRepository,
    TicketTypeRepository,
};
use gate_server::gateway::GatewayRegistry;
use gate_server::settlement::{CountingDispatcher, SalesCounters, SettlementService};
use shared::models::{
    AttendeeStatus, CouponCreate, Event, EventCreate, Reservation, ReservationCreate, TicketType,
    TicketTypeCreate,
};
use shared::order::{GatewayResult, ProposedLine, ProposedOrder, SettlementOutcome, VerifyFlag};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

struct TestEnv {
    db: Surreal<Db>,
    checkout: CheckoutService,
    settlement: SettlementService,
    notifier: Arc<CountingDispatcher>,
    counters: Arc<SalesCounters>,
}

async fn setup() -> TestEnv {
    let db = Surreal::new::<Mem>(()).await.expect("open mem db");
    db::select_ns(&db).await.expect("select ns");
    db::define_schema(&db).await.expect("define schema");

    let mut config = Config::with_overrides("/tmp/gate-test", 0);
    config.currency = "EUR".into();
    config.payment_providers = vec!["dummy".into(), "hosted".into()];

    let gateways = Arc::new(GatewayRegistry::from_config(&config).expect("registry"));
    let notifier = Arc::new(CountingDispatcher::new());
    let counters = Arc::new(SalesCounters::new());
    let availability = Arc::new(AvailabilityVersions::new());
    let settlement = SettlementService::new(
        db.clone(),
        notifier.clone(),
        counters.clone(),
        availability,
    );
    let checkout = CheckoutService::new(db.clone(), gateways, settlement.clone(), &config);

    TestEnv {
        db,
        checkout,
        settlement,
        notifier,
        counters,
    }
}

async fn seed_event(env: &TestEnv) -> Event {
    EventRepository::new(env.db.clone())
        .create(EventCreate {
            name: "RustConf".into(),
            slug: shared::util::new_token(),
            published: true,
        })
        .await
        .expect("create event")
}

async fn seed_ticket(env: &TestEnv, event_id: i64, price: i64, capacity: i64) -> TicketType {
    TicketTypeRepository::new(env.db.clone())
        .create(TicketTypeCreate {
            event_id,
            name: "General".into(),
            price,
            capacity,
            sale_starts_at: None,
            sale_ends_at: None,
            sort_order: 0,
        })
        .await
        .expect("create ticket type")
}

async fn seed_reservation(env: &TestEnv, ticket_type_id: i64, quantity: i64) -> Reservation {
    ReservationRepository::new(env.db.clone())
        .create(ReservationCreate {
            ticket_type_id,
            quantity,
            label: "Press".into(),
        })
        .await
        .expect("create reservation")
}

fn buyer() -> BuyerIdentity {
    BuyerIdentity {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
    }
}

fn order_of(ticket_type_id: i64, unit_price: i64, quantity: i64) -> ProposedOrder {
    ProposedOrder {
        lines: vec![ProposedLine {
            ticket_type_id,
            unit_price,
            quantity,
        }],
        coupon_code: None,
        reservation_token: None,
    }
}

#[tokio::test]
async fn clean_checkout_settles_immediately_with_dummy() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 1000, 10).await;

    let outcome = env
        .checkout
        .checkout(&order_of(ticket.id, 1000, 2), &buyer(), "dummy")
        .await
        .expect("checkout");

    let token = match outcome {
        CheckoutOutcome::Settled {
            payment_token,
            outcome,
        } => {
            assert_eq!(
                outcome,
                SettlementOutcome::Transitioned {
                    from: AttendeeStatus::Draft,
                    to: AttendeeStatus::Publish,
                    records: 2,
                }
            );
            payment_token
        }
        other => panic!("expected settled outcome, got {:?}", other),
    };

    let records = AttendeeRepository::new(env.db.clone())
        .find_by_payment_token(&token)
        .await
        .expect("load records");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == AttendeeStatus::Publish));
    assert!(records.iter().all(|r| r.transaction_id.is_some()));

    assert_eq!(env.notifier.fired(), 1);
    let tally = env.counters.get(ticket.id);
    assert_eq!(tally.sold, 2);
    assert_eq!(tally.revenue, 2000);
}

#[tokio::test]
async fn last_unit_loser_is_corrected_not_oversold() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 1000, 1).await;

    // First buyer takes the last unit
    let outcome = env
        .checkout
        .checkout(&order_of(ticket.id, 1000, 1), &buyer(), "dummy")
        .await
        .expect("first checkout");
    assert!(matches!(outcome, CheckoutOutcome::Settled { .. }));

    // The loser's re-verification comes back empty with tickets_excess
    let corrected = env
        .checkout
        .verify_order(&order_of(ticket.id, 1000, 1))
        .await
        .expect("verify");
    assert!(corrected.flags.contains(&VerifyFlag::TicketsExcess));
    assert!(corrected.flags.contains(&VerifyFlag::NoTicketsSelected));
    assert!(corrected.lines.is_empty());

    // A full checkout attempt is rejected the same way, nothing held
    let outcome = env
        .checkout
        .checkout(&order_of(ticket.id, 1000, 1), &buyer(), "dummy")
        .await
        .expect("second checkout");
    assert!(matches!(outcome, CheckoutOutcome::Reverify { .. }));

    let held = AttendeeRepository::new(env.db.clone())
        .count_holding(ticket.id)
        .await
        .expect("count");
    assert_eq!(held, 1);
}

#[tokio::test]
async fn coupon_covers_first_unit_only() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 1000, 10).await;

    CouponRepository::new(env.db.clone())
        .create(CouponCreate {
            code: "SAVE5".into(),
            amount_off: Some(500),
            percent_off: None,
            capacity: 1,
            valid_from: None,
            valid_until: None,
            ticket_type_ids: vec![ticket.id],
        })
        .await
        .expect("create coupon");

    // Case-insensitive code; buyer saw the discounted price
    let proposed = ProposedOrder {
        lines: vec![ProposedLine {
            ticket_type_id: ticket.id,
            unit_price: 500,
            quantity: 2,
        }],
        coupon_code: Some("save5".into()),
        reservation_token: None,
    };

    let corrected = env.checkout.verify_order(&proposed).await.expect("verify");

    assert!(corrected.flags.contains(&VerifyFlag::CouponExcess));
    assert_eq!(corrected.lines.len(), 2);
    assert_eq!(corrected.lines[0].unit_price, 500);
    assert_eq!(corrected.lines[0].quantity, 1);
    assert!(corrected.lines[0].coupon_applied);
    assert_eq!(corrected.lines[1].unit_price, 1000);
    assert_eq!(corrected.lines[1].quantity, 1);
    assert_eq!(corrected.total, 1500);
}

#[tokio::test]
async fn coupon_capacity_survives_across_checkouts() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 1000, 10).await;

    let coupon = CouponRepository::new(env.db.clone())
        .create(CouponCreate {
            code: "ONEUSE".into(),
            amount_off: Some(500),
            percent_off: None,
            capacity: 1,
            valid_from: None,
            valid_until: None,
            ticket_type_ids: vec![ticket.id],
        })
        .await
        .expect("create coupon");

    // First buyer settles with the discount
    let proposed = ProposedOrder {
        lines: vec![ProposedLine {
            ticket_type_id: ticket.id,
            unit_price: 500,
            quantity: 1,
        }],
        coupon_code: Some("ONEUSE".into()),
        reservation_token: None,
    };
    let outcome = env
        .checkout
        .checkout(&proposed, &buyer(), "dummy")
        .await
        .expect("checkout");
    assert!(matches!(outcome, CheckoutOutcome::Settled { .. }));

    let used = AttendeeRepository::new(env.db.clone())
        .count_holding_with_coupon(coupon.id)
        .await
        .expect("count coupon use");
    assert_eq!(used, 1);

    // Second buyer: coupon exhausted, line survives at full price
    let corrected = env.checkout.verify_order(&proposed).await.expect("verify");
    assert!(corrected.flags.contains(&VerifyFlag::CouponExcess));
    assert_eq!(corrected.lines.len(), 1);
    assert_eq!(corrected.lines[0].unit_price, 1000);
    assert!(!corrected.lines[0].coupon_applied);
}

#[tokio::test]
async fn reservation_carves_capacity_out_of_general_sale() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 1000, 10).await;
    let reservation = seed_reservation(&env, ticket.id, 3).await;

    // General buyer requesting 10 is clamped to 7
    let corrected = env
        .checkout
        .verify_order(&order_of(ticket.id, 1000, 10))
        .await
        .expect("verify general");
    assert!(corrected.flags.contains(&VerifyFlag::TicketsExcess));
    assert_eq!(corrected.unit_count(), 7);

    // The token holder gets their 3 with no flags
    let proposed = ProposedOrder {
        lines: vec![ProposedLine {
            ticket_type_id: ticket.id,
            unit_price: 1000,
            quantity: 3,
        }],
        coupon_code: None,
        reservation_token: Some(reservation.token.clone()),
    };
    let corrected = env.checkout.verify_order(&proposed).await.expect("verify holder");
    assert!(corrected.is_clean());
    assert_eq!(corrected.unit_count(), 3);

    // Holder checkout stamps the reservation token onto the records
    let outcome = env
        .checkout
        .checkout(&proposed, &buyer(), "dummy")
        .await
        .expect("holder checkout");
    let token = match outcome {
        CheckoutOutcome::Settled { payment_token, .. } => payment_token,
        other => panic!("expected settled, got {:?}", other),
    };
    let records = AttendeeRepository::new(env.db.clone())
        .find_by_payment_token(&token)
        .await
        .expect("records");
    assert!(
        records
            .iter()
            .all(|r| r.reservation_token.as_deref() == Some(reservation.token.as_str()))
    );

    // Pool fully drawn: general buyers now see the other 7 units
    let drawn = AttendeeRepository::new(env.db.clone())
        .count_holding_via_reservation(ticket.id, &reservation.token)
        .await
        .expect("drawn");
    assert_eq!(drawn, 3);
}

#[tokio::test]
async fn hosted_checkout_redirects_and_settles_on_callback() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 2000, 5).await;

    let outcome = env
        .checkout
        .checkout(&order_of(ticket.id, 2000, 2), &buyer(), "hosted")
        .await
        .expect("checkout");

    let (token, url) = match outcome {
        CheckoutOutcome::Redirect { payment_token, url } => (payment_token, url),
        other => panic!("expected redirect, got {:?}", other),
    };
    assert!(url.contains(&token));

    // Holds wait in draft until the provider reports back
    let records = AttendeeRepository::new(env.db.clone())
        .find_by_payment_token(&token)
        .await
        .expect("records");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == AttendeeStatus::Draft));
    assert_eq!(env.notifier.fired(), 0);

    // Webhook settles the group
    let outcome = env
        .settlement
        .apply_result(
            &token,
            GatewayResult::Completed,
            shared::order::TransactionData {
                transaction_id: Some("tx-hosted-1".into()),
                details: None,
            },
        )
        .await
        .expect("apply result");
    assert_eq!(
        outcome,
        SettlementOutcome::Transitioned {
            from: AttendeeStatus::Draft,
            to: AttendeeStatus::Publish,
            records: 2,
        }
    );
    assert_eq!(env.notifier.fired(), 1);
}

#[tokio::test]
async fn closed_sale_window_and_unpublished_event_reject_items() {
    let env = setup().await;

    // Published event, but the window closed an hour ago
    let event = seed_event(&env).await;
    let now = shared::util::now_millis();
    let closed = TicketTypeRepository::new(env.db.clone())
        .create(TicketTypeCreate {
            event_id: event.id,
            name: "Early bird".into(),
            price: 800,
            capacity: 10,
            sale_starts_at: None,
            sale_ends_at: Some(now - 3_600_000),
            sort_order: 0,
        })
        .await
        .expect("create ticket");

    let corrected = env
        .checkout
        .verify_order(&order_of(closed.id, 800, 1))
        .await
        .expect("verify closed window");
    assert!(corrected.flags.contains(&VerifyFlag::InvalidTicketId));

    // Unpublished event
    let dark_event = EventRepository::new(env.db.clone())
        .create(EventCreate {
            name: "Secret".into(),
            slug: shared::util::new_token(),
            published: false,
        })
        .await
        .expect("create event");
    let dark = seed_ticket(&env, dark_event.id, 800, 10).await;

    let corrected = env
        .checkout
        .verify_order(&order_of(dark.id, 800, 1))
        .await
        .expect("verify unpublished");
    assert!(corrected.flags.contains(&VerifyFlag::InvalidTicketId));
}

#[tokio::test]
async fn tampered_price_is_dropped() {
    let env = setup().await;
    let event = seed_event(&env).await;
    let ticket = seed_ticket(&env, event.id, 1000, 10).await;

    let corrected = env
        .checkout
        .verify_order(&order_of(ticket.id, 1, 2))
        .await
        .expect("verify");
    assert!(corrected.flags.contains(&VerifyFlag::TicketsPriceError));
    assert!(corrected.lines.is_empty());

    // Nothing may be charged on a flagged order
    let outcome = env
        .checkout
        .checkout(&order_of(ticket.id, 1, 2), &buyer(), "dummy")
        .await
        .expect("checkout");
    assert!(matches!(outcome, CheckoutOutcome::Reverify { .. }));
}
