//! Notification copy in every supported language.
//!
//! Each message is a [`MessageKey`] carrying the numbers it interpolates. Titles
//! and bodies come from exhaustive matches over `(Language, key)`, so adding a
//! key without translating it fails to compile.

use crate::engine::ValidationError;
use crate::estimate::MarginAdjustment;
use crate::types::{Price, Quote, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::ZhCn => "zh-CN",
            Language::ZhTw => "zh-TW",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageKey {
    Welcome,
    MarketOrderFilled {
        symbol: String,
        side: Side,
        size: Decimal,
        price: Price,
        fee: Quote,
    },
    OrderCreated {
        symbol: String,
        side: Side,
        price: Price,
        amount: Decimal,
        leverage: u32,
    },
    OrderCanceled {
        symbol: String,
    },
    OrdersCanceled {
        count: usize,
    },
    PositionClosed {
        symbol: String,
        side: Side,
        amount: Decimal,
        realized_pnl: Quote,
    },
    PositionsClosed {
        count: usize,
    },
    MarginAdjusted {
        kind: MarginAdjustment,
        amount: Quote,
    },
    DepositSuccess {
        amount: Quote,
    },
    WithdrawSuccess {
        amount: Quote,
    },
    Liquidated {
        symbol: String,
        side: Side,
        price: Price,
        margin_lost: Quote,
    },
    ConnectRequired,
    Rejected {
        reason: ValidationError,
    },
}

// "XAUUSDC" -> "XAU"
fn base_asset(symbol: &str) -> &str {
    symbol.strip_suffix("USDC").unwrap_or(symbol)
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn signed_money(value: Quote) -> String {
    if value.is_negative() {
        format!("-${}", money(-value.value()))
    } else {
        format!("+${}", money(value.value()))
    }
}

fn trade_word(lang: Language, side: Side) -> &'static str {
    match (lang, side) {
        (Language::En, Side::Buy) => "Buy",
        (Language::En, Side::Sell) => "Sell",
        (Language::ZhCn, Side::Buy) => "买入",
        (Language::ZhCn, Side::Sell) => "卖出",
        (Language::ZhTw, Side::Buy) => "買入",
        (Language::ZhTw, Side::Sell) => "賣出",
    }
}

fn direction_word(lang: Language, side: Side) -> &'static str {
    match (lang, side) {
        (Language::En, Side::Buy) => "Long",
        (Language::En, Side::Sell) => "Short",
        (Language::ZhCn, Side::Buy) => "多头",
        (Language::ZhCn, Side::Sell) => "空头",
        (Language::ZhTw, Side::Buy) => "多頭",
        (Language::ZhTw, Side::Sell) => "空頭",
    }
}

impl MessageKey {
    pub fn title(&self, lang: Language) -> &'static str {
        use Language::*;
        match (self, lang) {
            (MessageKey::Welcome, En) => "Welcome Back",
            (MessageKey::Welcome, ZhCn) => "欢迎回来",
            (MessageKey::Welcome, ZhTw) => "歡迎回來",
            (MessageKey::MarketOrderFilled { .. }, En) => "Market Order Filled",
            (MessageKey::MarketOrderFilled { .. }, ZhCn) => "市价单已完全成交",
            (MessageKey::MarketOrderFilled { .. }, ZhTw) => "市價單已完全成交",
            (MessageKey::OrderCreated { .. }, En) => "Order Created",
            (MessageKey::OrderCreated { .. }, ZhCn) => "下单成功",
            (MessageKey::OrderCreated { .. }, ZhTw) => "下單成功",
            (MessageKey::OrderCanceled { .. }, En) => "Order Canceled",
            (MessageKey::OrderCanceled { .. }, ZhCn) => "订单已撤销",
            (MessageKey::OrderCanceled { .. }, ZhTw) => "訂單已撤銷",
            (MessageKey::OrdersCanceled { .. }, En) => "All Orders Canceled",
            (MessageKey::OrdersCanceled { .. }, ZhCn) => "已全部撤单",
            (MessageKey::OrdersCanceled { .. }, ZhTw) => "已全部撤單",
            (MessageKey::PositionClosed { .. }, En) => "Position Closed",
            (MessageKey::PositionClosed { .. }, ZhCn) => "仓位已平仓",
            (MessageKey::PositionClosed { .. }, ZhTw) => "倉位已平倉",
            (MessageKey::PositionsClosed { .. }, En) => "All Positions Closed",
            (MessageKey::PositionsClosed { .. }, ZhCn) => "已全部平仓",
            (MessageKey::PositionsClosed { .. }, ZhTw) => "已全部平倉",
            (MessageKey::MarginAdjusted { .. }, En) => "Margin Adjusted",
            (MessageKey::MarginAdjusted { .. }, ZhCn) => "保证金调整成功",
            (MessageKey::MarginAdjusted { .. }, ZhTw) => "保證金調整成功",
            (MessageKey::DepositSuccess { .. }, En) => "Deposit Success",
            (MessageKey::DepositSuccess { .. }, ZhCn | ZhTw) => "充值成功",
            (MessageKey::WithdrawSuccess { .. }, En) => "Withdrawal Success",
            (MessageKey::WithdrawSuccess { .. }, ZhCn) => "提现成功",
            (MessageKey::WithdrawSuccess { .. }, ZhTw) => "提現成功",
            (MessageKey::Liquidated { .. }, En) => "Position Liquidated",
            (MessageKey::Liquidated { .. }, ZhCn) => "仓位已强平",
            (MessageKey::Liquidated { .. }, ZhTw) => "倉位已強平",
            (MessageKey::ConnectRequired, En) => "Connect Wallet",
            (MessageKey::ConnectRequired, ZhCn) => "请连接钱包",
            (MessageKey::ConnectRequired, ZhTw) => "請連接錢包",
            (MessageKey::Rejected { .. }, En) => "Request Rejected",
            (MessageKey::Rejected { .. }, ZhCn) => "操作失败",
            (MessageKey::Rejected { .. }, ZhTw) => "操作失敗",
        }
    }

    pub fn body(&self, lang: Language) -> String {
        use Language::*;
        match (self, lang) {
            (MessageKey::Welcome, En) => "Wallet connected and signed successfully.".to_string(),
            (MessageKey::Welcome, ZhCn) => "钱包连接并签名成功。".to_string(),
            (MessageKey::Welcome, ZhTw) => "錢包連接並簽名成功。".to_string(),

            (MessageKey::MarketOrderFilled { symbol, side, size, price, fee }, _) => {
                let (word, asset) = (trade_word(lang, *side), base_asset(symbol));
                let (price, fee) = (money(price.value()), money(fee.value()));
                match lang {
                    En => format!("Market {word} {size:.2} {asset} fully filled.\nAvg Price ${price} | Fee ${fee}"),
                    ZhCn => format!("市价{word} {size:.2} {asset} 已完全成交\n平均成交价 ${price} | 手续费 ${fee}"),
                    ZhTw => format!("市價{word} {size:.2} {asset} 已完全成交\n平均成交價 ${price} | 手續費 ${fee}"),
                }
            }

            (MessageKey::OrderCreated { symbol, side, price, amount, leverage }, _) => {
                let (word, asset, price) = (trade_word(lang, *side), base_asset(symbol), money(price.value()));
                match lang {
                    En => format!(
                        "You have successfully submitted {symbol} {word} Limit Order.\nPrice ${price} | Amount {amount} {asset} | Leverage {leverage}x"
                    ),
                    ZhCn => format!("您已成功提交{symbol} {word} 限价单\n价格 ${price} | 数量 {amount} {asset} | 杠杆 {leverage}x"),
                    ZhTw => format!("您已成功提交{symbol} {word} 限價單\n價格 ${price} | 數量 {amount} {asset} | 槓桿 {leverage}x"),
                }
            }

            (MessageKey::OrderCanceled { symbol }, En) => format!("Your {symbol} limit order has been canceled."),
            (MessageKey::OrderCanceled { symbol }, ZhCn) => format!("您的 {symbol} 限价单已撤销"),
            (MessageKey::OrderCanceled { symbol }, ZhTw) => format!("您的 {symbol} 限價單已撤銷"),

            (MessageKey::OrdersCanceled { count }, En) => format!("{count} open orders canceled."),
            (MessageKey::OrdersCanceled { count }, ZhCn) => format!("已撤销 {count} 个挂单"),
            (MessageKey::OrdersCanceled { count }, ZhTw) => format!("已撤銷 {count} 個掛單"),

            (MessageKey::PositionClosed { symbol, side, amount, realized_pnl }, _) => {
                let (dir, asset, pnl) = (direction_word(lang, *side), base_asset(symbol), signed_money(*realized_pnl));
                match lang {
                    En => format!("Successfully closed {symbol} {dir}.\nClosed Amount {amount} {asset} | Realized PnL {pnl}"),
                    ZhCn => format!("您已成功平仓 {symbol} {dir}\n平仓数量 {amount} {asset} | 实现盈亏 {pnl}"),
                    ZhTw => format!("您已成功平倉 {symbol} {dir}\n平倉數量 {amount} {asset} | 實現盈虧 {pnl}"),
                }
            }

            (MessageKey::PositionsClosed { count }, En) => format!("{count} positions closed at market."),
            (MessageKey::PositionsClosed { count }, ZhCn) => format!("已市价平仓 {count} 个仓位"),
            (MessageKey::PositionsClosed { count }, ZhTw) => format!("已市價平倉 {count} 個倉位"),

            (MessageKey::MarginAdjusted { kind, amount }, _) => {
                let amount = money(amount.value());
                match (kind, lang) {
                    (MarginAdjustment::Add, En) => format!("Added {amount} USDC margin."),
                    (MarginAdjustment::Extract, En) => format!("Removed {amount} USDC margin."),
                    (MarginAdjustment::Add, ZhCn) => format!("已增加 {amount} USDC 保证金"),
                    (MarginAdjustment::Extract, ZhCn) => format!("已减少 {amount} USDC 保证金"),
                    (MarginAdjustment::Add, ZhTw) => format!("已增加 {amount} USDC 保證金"),
                    (MarginAdjustment::Extract, ZhTw) => format!("已減少 {amount} USDC 保證金"),
                }
            }

            (MessageKey::DepositSuccess { amount }, _) => {
                let amount = money(amount.value());
                match lang {
                    En => format!("You have successfully deposited {amount} USDC, please check."),
                    ZhCn => format!("您已成功充值 {amount} USDC，请查看"),
                    ZhTw => format!("您已成功充值 {amount} USDC，請查看"),
                }
            }

            (MessageKey::WithdrawSuccess { amount }, _) => {
                let amount = money(amount.value());
                match lang {
                    En => format!("You have successfully withdrawn {amount} USDC, estimated arrival in 1 minute."),
                    ZhCn => format!("您已成功提现 {amount} USDC，预计 1 分钟到账。"),
                    ZhTw => format!("您已成功提現 {amount} USDC，預計 1 分鐘到賬。"),
                }
            }

            (MessageKey::Liquidated { symbol, side, price, margin_lost }, _) => {
                let dir = direction_word(lang, *side);
                let (price, lost) = (money(price.value()), money(margin_lost.value()));
                match lang {
                    En => format!("Your {symbol} {dir} position triggered liquidation at ${price}. ${lost} margin forfeited."),
                    ZhCn => format!("您的 {symbol} {dir}仓位已触发强平，强平价格 ${price}，保证金 ${lost} 已扣除。"),
                    ZhTw => format!("您的 {symbol} {dir}倉位已觸發強平，強平價格 ${price}，保證金 ${lost} 已扣除。"),
                }
            }

            (MessageKey::ConnectRequired, En) => "Connect and sign with your wallet to trade.".to_string(),
            (MessageKey::ConnectRequired, ZhCn) => "请先连接钱包并签名后再交易。".to_string(),
            (MessageKey::ConnectRequired, ZhTw) => "請先連接錢包並簽名後再交易。".to_string(),

            (MessageKey::Rejected { reason }, _) => rejection_body(reason, lang),
        }
    }
}

// 7.1: why a command was refused, in the user's language
fn rejection_body(reason: &ValidationError, lang: Language) -> String {
    use Language::*;
    match (reason, lang) {
        (ValidationError::NonPositiveAmount(v), En) => format!("Amount must be greater than 0 (got {v})."),
        (ValidationError::NonPositiveAmount(v), ZhCn) => format!("数量必须大于 0（当前 {v}）"),
        (ValidationError::NonPositiveAmount(v), ZhTw) => format!("數量必須大於 0（當前 {v}）"),
        (ValidationError::NonPositivePrice(v), En) => format!("Price must be greater than 0 (got {v})."),
        (ValidationError::NonPositivePrice(v), ZhCn) => format!("价格必须大于 0（当前 {v}）"),
        (ValidationError::NonPositivePrice(v), ZhTw) => format!("價格必須大於 0（當前 {v}）"),
        (ValidationError::OutOfRange(v), En) => format!("{v} is beyond the accepted range."),
        (ValidationError::OutOfRange(v), ZhCn) => format!("{v} 超出允许范围"),
        (ValidationError::OutOfRange(v), ZhTw) => format!("{v} 超出允許範圍"),
        (ValidationError::InvalidLeverage { requested, max }, En) => {
            format!("Leverage {requested}x is not allowed, choose 1x to {max}x.")
        }
        (ValidationError::InvalidLeverage { requested, max }, ZhCn) => format!("杠杆 {requested}x 无效，可选 1x 至 {max}x"),
        (ValidationError::InvalidLeverage { requested, max }, ZhTw) => format!("槓桿 {requested}x 無效，可選 1x 至 {max}x"),
        (ValidationError::InsufficientBalance { requested, available }, _) => {
            let (requested, available) = (money(requested.value()), money(available.value()));
            match lang {
                En => format!("Insufficient balance: needs {requested} USDC, available {available} USDC."),
                ZhCn => format!("余额不足：需要 {requested} USDC，可用 {available} USDC"),
                ZhTw => format!("餘額不足：需要 {requested} USDC，可用 {available} USDC"),
            }
        }
        (ValidationError::ExceedsWithdrawableMargin { requested, available }, _) => {
            let (requested, available) = (money(requested.value()), money(available.value()));
            match lang {
                En => format!("Cannot remove {requested} USDC, at most {available} USDC is withdrawable."),
                ZhCn => format!("无法减少 {requested} USDC，最多可减少 {available} USDC"),
                ZhTw => format!("無法減少 {requested} USDC，最多可減少 {available} USDC"),
            }
        }
        (ValidationError::UnknownMarket(symbol), En) => format!("Market {symbol} is not listed."),
        (ValidationError::UnknownMarket(symbol), ZhCn) => format!("市场 {symbol} 不存在"),
        (ValidationError::UnknownMarket(symbol), ZhTw) => format!("市場 {symbol} 不存在"),
        (ValidationError::NoActiveMarket, En) => "Select a market first.".to_string(),
        (ValidationError::NoActiveMarket, ZhCn) => "请先选择市场".to_string(),
        (ValidationError::NoActiveMarket, ZhTw) => "請先選擇市場".to_string(),
    }
}
