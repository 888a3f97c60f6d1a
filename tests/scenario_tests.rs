//! End-to-end command flows through the terminal.

use perps_terminal::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn terminal_with_balance(balance: Decimal) -> Terminal {
    let mut config = TerminalConfig::default();
    config.initial_wallet_balance = Quote::new(balance);
    config.transfer_delays = PhaseDelays::instant();
    Terminal::starting_at(config, Timestamp::from_millis(1_700_000_000_000))
}

fn signed(balance: Decimal) -> Terminal {
    let mut terminal = terminal_with_balance(balance);
    terminal.connect_wallet(WalletProvider::Metamask);
    terminal.sign_message().unwrap();
    terminal
}

fn quote(symbol: &str, mark: Decimal, time: Timestamp) -> PriceQuote {
    let price = Price::new_unchecked(mark);
    PriceQuote {
        symbol: symbol.to_string(),
        last: price,
        mark: price,
        index: price,
        time,
    }
}

#[test]
fn market_buy_gold_at_twenty_x() {
    let mut terminal = signed(dec!(1000));
    let placement = terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap();

    let position = placement.position().unwrap();
    assert_eq!(position.symbol, "XAUUSDC");
    assert_eq!(position.margin.value(), dec!(140));
    assert_eq!(position.liquidation_price.value(), dec!(2240));
    assert_eq!(position.pnl.value(), dec!(0));
    assert_eq!(position.entry_price, position.mark_price);
}

#[test]
fn withdraw_review_threshold() {
    let mut terminal = signed(dec!(1000));
    let statuses: Vec<TransferStatus> = [dec!(150), dec!(50), dec!(100)]
        .into_iter()
        .map(|amount| terminal.withdraw(amount).unwrap().status)
        .collect();

    assert_eq!(
        statuses,
        vec![
            TransferStatus::Reviewing,
            TransferStatus::Completed,
            TransferStatus::Reviewing
        ]
    );
    assert_eq!(terminal.ledger().pending_withdrawals(), dec!(250));
}

#[test]
fn deposit_creates_one_completed_record() {
    let mut terminal = signed(dec!(0));
    terminal.deposit(dec!(500)).unwrap();

    let records = terminal.ledger().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, TransferKind::Deposit);
    assert_eq!(records[0].status, TransferStatus::Completed);
    assert_eq!(records[0].fee, None);
    assert_eq!(records[0].asset, "USDC");
    assert_eq!(terminal.wallet().balance.value(), dec!(500));
}

#[test]
fn unsigned_commands_raise_connect_prompt() {
    let mut terminal = terminal_with_balance(dec!(1000));

    let err = terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap_err();
    assert_eq!(err, TerminalError::NotAuthenticated);
    assert_eq!(terminal.session().pending_prompt(), Some(ConnectPrompt::SelectWallet));
    assert_eq!(terminal.notifications().latest().unwrap().kind, NotificationKind::Warning);
    assert!(terminal.positions().is_empty());

    terminal.connect_wallet(WalletProvider::OkxWallet);
    assert_eq!(terminal.cancel_all().unwrap_err(), TerminalError::NotAuthenticated);
    assert_eq!(terminal.session().pending_prompt(), Some(ConnectPrompt::Sign));

    terminal.sign_message().unwrap();
    assert!(terminal.session().is_signed());
    assert!(terminal.cancel_all().unwrap().is_empty());
}

#[test]
fn read_only_commands_work_unsigned() {
    let mut terminal = terminal_with_balance(dec!(1000));

    let estimate = terminal
        .estimate_order(OrderAmount::Base(dec!(1)), Some(dec!(2800)), 20)
        .unwrap();
    assert_eq!(estimate.margin_required.value(), dec!(140));

    let market = terminal.select_market("XAGUSDC").unwrap();
    assert_eq!(market.symbol(), "XAGUSDC");

    let outcome = terminal
        .apply_quote(&quote("XAGUSDC", dec!(33), terminal.time()))
        .unwrap();
    assert_eq!(outcome.revalued, 0);
    assert_eq!(terminal.session().pending_prompt(), None);
}

#[test]
fn limit_order_rests_then_cancels() {
    let mut terminal = signed(dec!(1000));
    let order = terminal
        .place_order(OrderRequest::limit(Side::Sell, dec!(0.5), dec!(2850), 10))
        .unwrap()
        .order()
        .cloned()
        .unwrap();

    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.filled, dec!(0));
    // resting orders reserve nothing
    assert_eq!(terminal.wallet().balance.value(), dec!(1000));

    let canceled = terminal.cancel_order(order.id).unwrap().unwrap();
    assert_eq!(canceled.id, order.id);
    assert!(terminal.orders().is_empty());
    assert!(terminal.cancel_order(order.id).unwrap().is_none());
}

#[test]
fn newest_first_ordering() {
    let mut terminal = signed(dec!(100000));
    let first = terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap()
        .position()
        .unwrap()
        .id;
    let second = terminal
        .place_order(OrderRequest::market(Side::Sell, dec!(1), dec!(2800), 20))
        .unwrap()
        .position()
        .unwrap()
        .id;

    let ids: Vec<PositionId> = terminal.positions().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn mark_crossing_liquidates_and_forfeits_margin() {
    let mut terminal = signed(dec!(1000));
    let id = terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap()
        .position()
        .unwrap()
        .id;
    let now = terminal.time();

    let outcome = terminal.apply_quote(&quote("XAUUSDC", dec!(2500), now)).unwrap();
    assert!(outcome.liquidations.is_empty());
    assert_eq!(terminal.position(id).unwrap().pnl.value(), dec!(-300));

    let outcome = terminal.apply_quote(&quote("XAUUSDC", dec!(2240), now)).unwrap();
    assert_eq!(outcome.liquidations.len(), 1);
    assert_eq!(outcome.liquidations[0].margin_lost.value(), dec!(140));
    assert!(terminal.position(id).is_none());
    assert_eq!(terminal.notifications().latest().unwrap().kind, NotificationKind::Liquidation);
    // 1000 - 140 - 1.4, margin never comes back
    assert_eq!(terminal.wallet().balance.value(), dec!(858.6));
}

#[test]
fn disconnect_settles_and_clears() {
    let mut terminal = signed(dec!(1000));
    terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap();
    terminal
        .place_order(OrderRequest::limit(Side::Buy, dec!(1), dec!(2700), 20))
        .unwrap();

    terminal.disconnect();

    assert!(terminal.positions().is_empty());
    assert!(terminal.orders().is_empty());
    assert!(!terminal.session().is_signed());
    assert_eq!(terminal.wallet().balance.value(), dec!(998.6));
}

#[test]
fn account_views() {
    let mut terminal = signed(dec!(1000));
    let id = terminal
        .place_order(
            OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20)
                .with_margin_mode(MarginMode::Isolated),
        )
        .unwrap()
        .position()
        .unwrap()
        .id;

    let isolated = terminal.isolated_account_info(id).unwrap();
    assert_eq!(isolated.maintenance_margin.value(), dec!(14));
    assert_eq!(isolated.margin_balance.value(), dec!(140));
    // 14 / 2800 * 100
    assert_eq!(isolated.margin_ratio, dec!(0.5));

    let cross = terminal.account_info();
    assert_eq!(cross.wallet_balance.value(), dec!(858.6));
}

#[test]
fn notifications_expire_after_visible_and_exit() {
    let mut terminal = signed(dec!(1000));
    assert_eq!(terminal.notifications().len(), 1);

    terminal.advance_time(3_000);
    assert!(terminal.notifications().latest().unwrap().is_exiting());

    terminal.advance_time(300);
    assert!(terminal.notifications().is_empty());
}

#[test]
fn localized_notification() {
    let mut terminal = terminal_with_balance(dec!(1000));
    terminal.set_language(Language::ZhCn);
    terminal.connect_wallet(WalletProvider::BinanceWallet);
    terminal.sign_message().unwrap();

    let welcome = terminal.notifications().latest().unwrap();
    assert_eq!(welcome.title, MessageKey::Welcome.title(Language::ZhCn));
    assert_ne!(welcome.title, MessageKey::Welcome.title(Language::En));
}

#[test]
fn unknown_market_rejected() {
    let mut terminal = signed(dec!(1000));
    let err = terminal.select_market("BTCUSDC").unwrap_err();
    assert_eq!(
        err,
        TerminalError::Validation(ValidationError::UnknownMarket("BTCUSDC".to_string()))
    );
    assert_eq!(terminal.active_market().unwrap().symbol(), "XAUUSDC");
}

#[test]
fn event_log_records_transitions() {
    let mut terminal = signed(dec!(1000));
    terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap();
    terminal.deposit(dec!(10)).unwrap();

    let events = terminal.recent_events(2);
    assert!(matches!(events[0].payload, EventPayload::PositionOpened(_)));
    assert!(matches!(events[1].payload, EventPayload::Deposit(_)));
    assert!(events[0].id < events[1].id);
}

#[tokio::test]
async fn ticker_feeds_terminal() {
    let mut terminal = signed(dec!(1000));
    terminal
        .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
        .unwrap();

    let source = RandomWalkSource::new("XAUUSDC", Price::new_unchecked(dec!(2800)), 7);
    let (ticker, mut ticks) = FeedTicker::spawn(source, std::time::Duration::from_millis(5), 8);

    for _ in 0..3 {
        let tick = ticks.recv().await.unwrap();
        let outcome = terminal.apply_quote(&tick).unwrap();
        assert_eq!(outcome.revalued, 1);
        assert_eq!(terminal.positions()[0].mark_price, tick.mark);
    }

    assert!(ticker.stop().await.is_some());
}

#[tokio::test]
async fn book_ticker_fills_depth_and_tape() {
    let mut terminal = signed(dec!(1000));
    let feed = &terminal.config().feed;
    let (depth, backlog) = (feed.book_depth, feed.backlog_trades);

    let start = Price::new_unchecked(dec!(2800));
    let mut source = MockOrderBookSource::new("XAUUSDC", start, depth, 11).with_trade_chance(100);
    terminal.load_trade_backlog(source.backlog(backlog, terminal.time()));
    assert_eq!(terminal.recent_trades().len(), 15);

    let (ticker, mut books) = FeedTicker::spawn(source, std::time::Duration::from_millis(5), 8);
    for _ in 0..8 {
        let book = books.recv().await.unwrap();
        assert!(terminal.apply_book(book).unwrap());
    }
    assert!(ticker.stop().await.is_some());

    let book = terminal.order_book().unwrap();
    assert_eq!(book.asks.len(), 12);
    assert!(book.best_ask().unwrap().price > book.best_bid().unwrap().price);
    assert_eq!(terminal.recent_trades().len(), 20);
}

#[test]
fn demo_account_starts_with_sample_transfers() {
    let now = Timestamp::from_millis(1_700_000_000_000);
    let mut terminal = Terminal::starting_at(TerminalConfig::demo(), now);
    let statuses: Vec<TransferStatus> =
        terminal.ledger().records().iter().map(|r| r.status).collect();
    assert_eq!(statuses.len(), 6);
    assert!(statuses.contains(&TransferStatus::Rejected));
    assert!(statuses.contains(&TransferStatus::Failed));
    assert!(statuses.contains(&TransferStatus::Confirming));
    assert_eq!(terminal.ledger().records()[0].status, TransferStatus::Processing);
    // samples do not move the wallet
    assert_eq!(terminal.wallet().balance.value(), dec!(10000));

    terminal.connect_wallet(WalletProvider::Metamask);
    terminal.sign_message().unwrap();
    let record = terminal.deposit(dec!(25)).unwrap();
    assert_eq!(terminal.ledger().records()[0].id, record.id);
    assert!(terminal.ledger().records()[1..].iter().all(|r| r.id < record.id));
}

#[test]
fn rejected_withdraw_shows_error_in_active_language() {
    let mut terminal = signed(dec!(50));
    terminal.set_language(Language::ZhTw);

    let err = terminal.withdraw(dec!(80)).unwrap_err();
    assert!(matches!(
        err,
        TerminalError::Validation(ValidationError::InsufficientBalance { .. })
    ));

    let latest = terminal.notifications().latest().unwrap();
    assert_eq!(latest.kind, NotificationKind::Error);
    assert_eq!(latest.title, "操作失敗");
    assert!(terminal.ledger().is_empty());
}

#[test]
fn round_trip_fills_every_history_tab() {
    let mut terminal = signed(dec!(1000));
    let order = terminal
        .place_order(OrderRequest::limit(Side::Buy, dec!(0.5), dec!(2790), 5))
        .unwrap();
    terminal.cancel_order(order.order().unwrap().id).unwrap();

    let id = terminal
        .place_order(OrderRequest::market(Side::Sell, dec!(1), dec!(2800), 10))
        .unwrap()
        .position()
        .unwrap()
        .id;
    terminal.apply_quote(&quote("XAUUSDC", dec!(2780), terminal.time())).unwrap();
    terminal.close_position(id, OrderType::Market, None, None).unwrap();

    let statuses: Vec<OrderStatus> = terminal.order_history().iter().map(|o| o.status).collect();
    assert_eq!(statuses, vec![OrderStatus::Filled, OrderStatus::Canceled]);

    let trades = terminal.trade_history();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].side, Side::Buy);
    assert_eq!(trades[0].realized_pnl.value(), dec!(20));

    assert_eq!(terminal.transactions(None).len(), 2);
    assert_eq!(
        terminal.history().total(TransactionKind::RealizedPnl).value(),
        dec!(20)
    );
}
