//! Property tests over generated trade sequences
//!
//! Sizes are multiples of 0.25 so every split is exact in f64 and sums can be compared
//! with `==`.

use chrono::{Duration, TimeZone, Utc};
use lotmatch::inventory::Side;
use lotmatch::{reconcile, LotMatch, ReconcileError, TradeRecord};
use proptest::prelude::*;

fn build(ops: &[(bool, u32, u32)]) -> Vec<TradeRecord> {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let mut held = 0.0;
    let mut trades = Vec::new();
    for (i, (is_buy, quarters, price)) in ops.iter().enumerate() {
        let mut size = *quarters as f64 * 0.25;
        let side = if *is_buy {
            held += size;
            Side::Buy
        } else {
            size = size.min(held);
            if size == 0.0 {
                continue;
            }
            held -= size;
            Side::Sell
        };
        let price = *price as f64;
        trades.push(
            TradeRecord::new(
                format!("t{}", i),
                "XRP-USD",
                side,
                start + Duration::seconds(i as i64),
                size,
                price,
                0.5,
                size * price + 0.5,
            )
            .unwrap(),
        );
    }
    trades
}

fn ops() -> impl Strategy<Value = Vec<(bool, u32, u32)>> {
    prop::collection::vec((any::<bool>(), 1u32..=40, 1u32..=500), 1..60)
}

fn input_size(trades: &[TradeRecord], side: Side) -> f64 {
    trades.iter().filter(|t| t.side() == side).map(|t| t.size()).sum()
}

fn lot_sizes(lots: &[LotMatch]) -> (f64, f64) {
    let buys = lots.iter().map(|l| l.buy().size()).sum();
    let sells = lots.iter().filter_map(|l| l.sell()).map(|s| s.size()).sum();
    (buys, sells)
}

proptest! {
    #[test]
    fn sizes_are_conserved(ops in ops()) {
        let trades = build(&ops);
        let lots = reconcile(&trades).unwrap();
        let (buys, sells) = lot_sizes(&lots);
        prop_assert_eq!(buys, input_size(&trades, Side::Buy));
        prop_assert_eq!(sells, input_size(&trades, Side::Sell));
    }

    #[test]
    fn closed_lots_are_fully_matched(ops in ops()) {
        let trades = build(&ops);
        for lot in reconcile(&trades).unwrap() {
            prop_assert!(lot.buy().size() > 0.0);
            if let Some(sell) = lot.sell() {
                prop_assert_eq!(lot.buy().size(), sell.size());
            }
        }
    }

    #[test]
    fn every_fee_is_kept_once(ops in ops()) {
        let trades = build(&ops);
        let lots = reconcile(&trades).unwrap();
        let buy_fees: f64 = lots.iter().map(|l| l.buy().fee()).sum();
        let sell_fees: f64 = lots.iter().filter_map(|l| l.sell()).map(|s| s.fee()).sum();
        prop_assert_eq!(buy_fees, input_fees(&trades, Side::Buy));
        prop_assert_eq!(sell_fees, input_fees(&trades, Side::Sell));
    }

    #[test]
    fn reconcile_is_deterministic(ops in ops()) {
        let trades = build(&ops);
        prop_assert_eq!(reconcile(&trades).unwrap(), reconcile(&trades).unwrap());
    }

    #[test]
    fn oversized_sell_is_rejected(ops in ops(), extra in 1u32..=8) {
        let mut trades = build(&ops);
        let held = input_size(&trades, Side::Buy) - input_size(&trades, Side::Sell);
        trades.push(
            TradeRecord::new(
                "oversized",
                "XRP-USD",
                Side::Sell,
                Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
                held + extra as f64 * 0.25,
                1.0,
                0.0,
                0.0,
            )
            .unwrap(),
        );
        let err = reconcile(&trades).unwrap_err();
        let out_of_lots = matches!(err, ReconcileError::InvalidSequence { .. });
        prop_assert!(out_of_lots);
        prop_assert_eq!(err.trade_id(), "oversized");
    }
}

fn input_fees(trades: &[TradeRecord], side: Side) -> f64 {
    trades.iter().filter(|t| t.side() == side).map(|t| t.fee()).sum()
}
