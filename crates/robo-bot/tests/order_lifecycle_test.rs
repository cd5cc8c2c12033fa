//! Order lifecycle integration tests.
//!
//! Drives full simulated days through the controller with mock clients:
//! - exactly one create + fetch + pay sequence at the first open-hour wake-up
//! - exactly one cancel at the first close-hour wake-up
//! - no marketplace mutations on any other wake-up

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use robo_bot::{BondPolicy, MakerController, TickOutcome};
use robo_core::{OrderAmount, OrderId, OrderSide, OrderSpec, ScheduleWindow};
use robo_market::{MarketCall, MockMarketApi};
use robo_wallet::{MockWalletApi, WalletCall};
use rust_decimal_macros::dec;

fn spec() -> OrderSpec {
    OrderSpec {
        side: OrderSide::Sell,
        currency: 2,
        amount: OrderAmount::Fixed(dec!(100)),
        payment_method: "Instant SEPA".to_string(),
        premium: dec!(3.5),
        public_duration_secs: 54_000,
        escrow_duration_secs: 10_800,
        bond_size: dec!(3.0),
    }
}

fn controller(
    market: Arc<MockMarketApi>,
    wallet: Arc<MockWalletApi>,
) -> MakerController<Arc<MockMarketApi>, Arc<MockWalletApi>> {
    let window = ScheduleWindow::new(6, 23, chrono_tz::UTC).unwrap();
    MakerController::new(
        market,
        wallet,
        spec(),
        window,
        MockWalletApi::DEFAULT_WALLET_ID,
        BondPolicy {
            attempts: 3,
            retry_delay_secs: 0,
        },
    )
}

fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap()
}

#[tokio::test]
async fn test_full_day_issues_one_open_and_one_close() {
    let market = Arc::new(MockMarketApi::new());
    let wallet = Arc::new(MockWalletApi::new());
    let mut controller = controller(market.clone(), wallet.clone());

    // Two wake-ups per hour from 05:00 through 23:30, mimicking the poll
    // interval landing repeatedly inside each hour window.
    let mut opened = 0;
    let mut closed = 0;
    for hour in 5..=23 {
        for min in [0, 30] {
            match controller.tick(at(2, hour, min)).await {
                TickOutcome::Opened { bond_settled, .. } => {
                    opened += 1;
                    assert!(bond_settled);
                    assert_eq!((hour, min), (6, 0));
                }
                TickOutcome::Closed(_) => {
                    closed += 1;
                    assert_eq!((hour, min), (23, 0));
                }
                TickOutcome::OpenFailed => panic!("unexpected open failure"),
                TickOutcome::Idle => {}
            }
        }
    }

    assert_eq!(opened, 1);
    assert_eq!(closed, 1);
    assert_eq!(controller.current_order(), None);

    let id = OrderId::new(MockMarketApi::DEFAULT_ORDER_ID);
    assert_eq!(
        market.calls(),
        vec![
            MarketCall::Create,
            MarketCall::Fetch(id),
            MarketCall::Cancel(id),
        ]
    );
    assert_eq!(
        wallet.calls(),
        vec![WalletCall::Pay {
            invoice: MockMarketApi::DEFAULT_BOND_INVOICE.to_string(),
            wallet_id: MockWalletApi::DEFAULT_WALLET_ID.to_string(),
        }]
    );
}

#[tokio::test]
async fn test_next_day_opens_again() {
    let market = Arc::new(MockMarketApi::new());
    let wallet = Arc::new(MockWalletApi::new());
    let mut controller = controller(market.clone(), wallet.clone());

    assert!(matches!(
        controller.tick(at(2, 6, 0)).await,
        TickOutcome::Opened { .. }
    ));
    assert!(matches!(
        controller.tick(at(2, 23, 0)).await,
        TickOutcome::Closed(_)
    ));

    // The daily cycle repeats: the state guard is clear again.
    assert!(matches!(
        controller.tick(at(3, 6, 0)).await,
        TickOutcome::Opened { .. }
    ));
    assert_eq!(market.create_calls(), 2);
    assert_eq!(market.cancel_calls(), 1);
}

#[tokio::test]
async fn test_failed_open_retries_on_later_wakeup() {
    let market = Arc::new(MockMarketApi::new());
    let wallet = Arc::new(MockWalletApi::new());
    market.push_create(Err(robo_market::MarketError::Transport(
        "proxy refused".to_string(),
    )));
    let mut controller = controller(market.clone(), wallet.clone());

    assert_eq!(controller.tick(at(2, 6, 0)).await, TickOutcome::OpenFailed);
    assert_eq!(controller.current_order(), None);

    // The next wake-up inside the open hour tries again and succeeds.
    assert!(matches!(
        controller.tick(at(2, 6, 1)).await,
        TickOutcome::Opened { .. }
    ));
    assert_eq!(market.create_calls(), 2);
    assert_eq!(wallet.pay_calls(), 1);
}
