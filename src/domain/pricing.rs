// 価格計算エンジン
// 明細（単価 × 数量）の集合から小計・配送料・税額・合計を純粋関数で導出する。
// カートのプレビューと注文確定では意図的に異なる定数セットを使う。
// 統一してよいかは未確定のため、呼び出し箇所ごとに定数を分けて保持する。

use crate::domain::model::Money;

/// カートプレビュー: この小計を超えると配送料無料
pub const CART_FREE_SHIPPING_THRESHOLD: i64 = 2_000_000;
/// カートプレビュー: 配送料（固定額）
pub const CART_SHIPPING_FLAT_FEE: i64 = 30_000;
/// カートプレビュー: 税率（%）
pub const CART_TAX_RATE_PERCENT: i64 = 8;

/// 注文確定: この小計を超えると配送料無料
pub const ORDER_FREE_SHIPPING_THRESHOLD: i64 = 500_000;
/// 注文確定: 配送料（固定額）
pub const ORDER_SHIPPING_FLAT_FEE: i64 = 30_000;
/// 注文確定: 税率（%）
pub const ORDER_TAX_RATE_PERCENT: i64 = 10;

/// 価格の内訳
/// 不変条件: total = subtotal + shipping + tax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// 小計を計算（Σ 単価 × 数量）
pub fn compute_subtotal(lines: &[(Money, u32)]) -> Money {
    lines
        .iter()
        .map(|(unit_price, quantity)| unit_price.multiply(*quantity))
        .fold(Money::vnd(0), |acc, amount| acc.add(&amount).unwrap_or(acc))
}

/// 配送料を計算
/// 小計が閾値を超えると無料、0より大きければ固定額、0なら0
pub fn compute_shipping(subtotal: Money, free_threshold: i64, flat_fee: i64) -> Money {
    if subtotal.amount() > free_threshold {
        Money::vnd(0)
    } else if subtotal.amount() > 0 {
        Money::vnd(flat_fee)
    } else {
        Money::vnd(0)
    }
}

/// 税額を計算（小計 × 税率、四捨五入で整数ドンに丸める）
pub fn compute_tax(subtotal: Money, rate_percent: i64) -> Money {
    Money::vnd((subtotal.amount() * rate_percent + 50) / 100)
}

/// 合計を計算（小計 + 配送料 + 税額）
pub fn compute_total(subtotal: Money, shipping: Money, tax: Money) -> Money {
    subtotal
        .add(&shipping)
        .and_then(|s| s.add(&tax))
        .unwrap_or(subtotal)
}

/// カートプレビュー用の内訳を計算
/// 閾値 2,000,000 / 配送料 30,000 / 税率 8%
pub fn cart_preview_breakdown(lines: &[(Money, u32)]) -> PriceBreakdown {
    breakdown(
        lines,
        CART_FREE_SHIPPING_THRESHOLD,
        CART_SHIPPING_FLAT_FEE,
        CART_TAX_RATE_PERCENT,
    )
}

/// 注文確定用の内訳を計算
/// 閾値 500,000 / 配送料 30,000 / 税率 10%
pub fn order_breakdown(lines: &[(Money, u32)]) -> PriceBreakdown {
    breakdown(
        lines,
        ORDER_FREE_SHIPPING_THRESHOLD,
        ORDER_SHIPPING_FLAT_FEE,
        ORDER_TAX_RATE_PERCENT,
    )
}

fn breakdown(
    lines: &[(Money, u32)],
    free_threshold: i64,
    flat_fee: i64,
    rate_percent: i64,
) -> PriceBreakdown {
    let subtotal = compute_subtotal(lines);
    let shipping = compute_shipping(subtotal, free_threshold, flat_fee);
    let tax = compute_tax(subtotal, rate_percent);
    let total = compute_total(subtotal, shipping, tax);
    PriceBreakdown {
        subtotal,
        shipping,
        tax,
        total,
    }
}
