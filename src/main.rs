//! Trading terminal simulation.
//!
//! Walks the terminal through a session: connect and sign, fund the wallet,
//! trade, adjust margin, close, withdraw, ride a live mock quote feed, then push
//! the mark through a liquidation. Set `TERMINAL_CONFIG` to a JSON file to override settings and
//! `RUST_LOG` to control log output.

use perps_terminal::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = load_config()?;
    println!("Perps Terminal Simulation");

    scenario_1_connect_and_fund(&config)?;
    scenario_2_trade_and_close(&config)?;
    scenario_3_margin_management(&config)?;
    scenario_4_withdrawals(&config)?;
    scenario_5_phased_deposit(&config).await?;
    scenario_6_live_feed(&config).await?;
    scenario_7_liquidation(&config)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer())
        .init();
}

fn load_config() -> Result<TerminalConfig, ConfigError> {
    match std::env::var("TERMINAL_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "Loading terminal config");
            TerminalConfig::from_file(path)
        }
        Err(_) => {
            let config = Environment::Demo.config();
            config.validate()?;
            Ok(config)
        }
    }
}

fn signed_terminal(config: &TerminalConfig) -> Result<Terminal, TerminalError> {
    let mut terminal = Terminal::starting_at(config.clone(), Timestamp::now());
    terminal.connect_wallet(WalletProvider::Metamask);
    terminal.sign_message()?;
    Ok(terminal)
}

fn print_account(terminal: &Terminal) {
    let info = terminal.account_info();
    println!(
        "    wallet ${} | margin balance ${} | uPnL ${} | margin ratio {:.2}%",
        info.wallet_balance, info.margin_balance, info.unrealized_pnl, info.margin_ratio
    );
}

fn print_latest_notification(terminal: &Terminal) {
    if let Some(n) = terminal.notifications().latest() {
        println!("    [{:?}] {}: {}", n.kind, n.title, n.body.replace('\n', " / "));
    }
}

/// Connect flow and a first deposit.
fn scenario_1_connect_and_fund(config: &TerminalConfig) -> Result<(), TerminalError> {
    println!("Scenario 1: Connect and Fund\n");

    let mut terminal = Terminal::starting_at(config.clone(), Timestamp::now());
    println!("  Markets: {}", terminal.markets().symbols().collect::<Vec<_>>().join(", "));

    let refused = terminal.place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20));
    println!("  Order before connecting: {:?}", refused.err());
    println!("  Prompt shown: {:?}", terminal.session().pending_prompt());
    println!("  Modal closed: {:?}", terminal.dismiss_connect_prompt());

    terminal.connect_wallet(WalletProvider::OkxWallet);
    println!("  Wallet picked, prompt now: {:?}", terminal.session().pending_prompt());
    terminal.sign_message()?;
    print_latest_notification(&terminal);

    let record = terminal.deposit(dec!(500))?;
    println!("  Deposit {} USDC -> {:?}, hash {}", record.amount, record.status, record.hash);
    print_account(&terminal);
    println!();
    Ok(())
}

/// Market fill, resting limit, partial then full close.
fn scenario_2_trade_and_close(config: &TerminalConfig) -> Result<(), TerminalError> {
    println!("Scenario 2: Trade and Close\n");

    let mut terminal = signed_terminal(config)?;

    let estimate = terminal.estimate_order(OrderAmount::Base(dec!(1)), None, 20)?;
    println!(
        "  Estimate 1 XAU @ 20x: margin ${}, fee ${}, liq long ${} / short ${}",
        estimate.margin_required,
        estimate.estimated_fee,
        estimate.long_liquidation_price,
        estimate.short_liquidation_price
    );

    let placement = terminal.place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))?;
    let Some(position) = placement.position().cloned() else {
        return Ok(());
    };
    println!(
        "  Filled: {} {} @ ${}, margin ${}, liq ${}",
        position.size, position.symbol, position.entry_price, position.margin, position.liquidation_price
    );
    print_latest_notification(&terminal);

    terminal.place_order(OrderRequest::limit(Side::Sell, dec!(0.5), dec!(2850), 10))?;
    println!("  Resting orders: {}", terminal.orders().len());

    terminal.apply_quote(&PriceQuote {
        symbol: position.symbol.clone(),
        last: Price::new_unchecked(dec!(2830)),
        mark: Price::new_unchecked(dec!(2830)),
        index: Price::new_unchecked(dec!(2829.5)),
        time: terminal.time(),
    })?;
    println!("  Mark moves to $2830, pnl ${}", terminal.positions()[0].pnl);

    let partial = terminal.close_position(position.id, OrderType::Limit, Some(dec!(2840)), Some(dec!(0.4)))?;
    println!(
        "  Partial close 0.4 @ ${}: realized ${}, remaining size {}",
        partial.exit_price,
        partial.realized_pnl,
        partial.remaining.as_ref().map(|p| p.size).unwrap_or(Decimal::ZERO)
    );

    let full = terminal.close_position(position.id, OrderType::Market, None, None)?;
    println!("  Full close at mark: realized ${}, paid out ${}", full.realized_pnl, full.payout);
    print_latest_notification(&terminal);

    let canceled = terminal.cancel_all()?;
    println!("  Canceled {} resting orders", canceled.len());

    let rejected = terminal.place_order(OrderRequest::market(Side::Buy, dec!(100), dec!(2800), 1));
    println!("  Oversized order: {:?}", rejected.err());
    print_latest_notification(&terminal);

    for trade in terminal.trade_history() {
        println!(
            "    trade {:?} {} @ ${} fee ${} realized ${}",
            trade.side, trade.amount, trade.price, trade.fee, trade.realized_pnl
        );
    }
    println!(
        "  Orders in history: {} | fees ${} | realized ${}",
        terminal.order_history().len(),
        terminal.history().total(TransactionKind::TradingFee),
        terminal.history().total(TransactionKind::RealizedPnl)
    );
    print_account(&terminal);
    println!();
    Ok(())
}

/// Add and extract margin on an isolated position.
fn scenario_3_margin_management(config: &TerminalConfig) -> Result<(), TerminalError> {
    println!("Scenario 3: Margin Management\n");

    let mut terminal = signed_terminal(config)?;
    let request = OrderRequest::market(Side::Sell, dec!(2), dec!(2800), 10)
        .with_margin_mode(MarginMode::Isolated);
    let placement = terminal.place_order(request)?;
    let Some(id) = placement.position().map(|p| p.id) else {
        return Ok(());
    };

    let preview = terminal.preview_margin(id, MarginAdjustment::Add, dec!(280))?;
    println!(
        "  Preview add $280: margin ${} -> ${}, leverage {}x -> {}x, liq ${} -> ${}",
        preview.old_margin,
        preview.new_margin,
        preview.old_leverage.round_dp(2),
        preview.new_leverage.round_dp(2),
        preview.old_liquidation_price,
        preview.projected_liquidation_price
    );

    terminal.adjust_margin(id, MarginAdjustment::Add, dec!(280))?;
    println!("  Withdrawable after add: ${}", terminal.withdrawable_margin(id)?);

    match terminal.adjust_margin(id, MarginAdjustment::Extract, dec!(10000)) {
        Ok(_) => println!("  Oversized extract went through"),
        Err(e) => println!("  Oversized extract refused: {}", e),
    }

    terminal.adjust_margin(id, MarginAdjustment::Extract, dec!(280))?;
    let info = terminal.isolated_account_info(id)?;
    println!(
        "  Isolated view: margin balance ${}, maintenance ${}, ratio {:.2}%",
        info.margin_balance, info.maintenance_margin, info.margin_ratio
    );
    println!();
    Ok(())
}

/// Withdraw fees and review threshold.
fn scenario_4_withdrawals(config: &TerminalConfig) -> Result<(), TerminalError> {
    println!("Scenario 4: Withdrawals\n");

    let mut terminal = signed_terminal(config)?;
    for amount in [dec!(150), dec!(50), dec!(100)] {
        let record = terminal.withdraw(amount)?;
        println!(
            "  Withdraw {}: {:?}, fee {:?}, arrives {} at {}",
            amount,
            record.status,
            record.fee.map(|f| f.value()),
            record.transferred_amount(),
            record.time.format_utc()
        );
    }
    println!("  Pending (reviewing, processing, confirming): ${}", terminal.ledger().pending_withdrawals());
    for record in terminal.ledger().records().iter().skip(3) {
        println!("    earlier {:?} {} {:?} {}", record.kind, record.amount, record.status, record.hash);
    }
    print_account(&terminal);
    println!();
    Ok(())
}

/// Deposit that walks approve/swap/deposit before committing, and one that is cancelled.
async fn scenario_5_phased_deposit(config: &TerminalConfig) -> Result<(), TerminalError> {
    println!("Scenario 5: Phased Deposit\n");

    let mut terminal = signed_terminal(config)?;

    let (_keep, signal) = cancel_pair();
    let record = terminal
        .deposit_with_progress(dec!(250), signal, |phase| println!("    phase: {:?}", phase))
        .await?;
    println!("  Committed deposit of {} ({:?})", record.amount, record.status);

    let (handle, signal) = cancel_pair();
    handle.cancel();
    match terminal.deposit_with_progress(dec!(75), signal, |_| {}).await {
        Ok(_) => println!("  Cancelled deposit committed anyway"),
        Err(e) => println!("  Second deposit: {}", e),
    }
    println!("  Ledger entries: {}\n", terminal.ledger().len());
    Ok(())
}

/// Mock feed drives marks until the position liquidates or ticks run out.
async fn scenario_6_live_feed(config: &TerminalConfig) -> Result<(), Box<dyn Error>> {
    println!("Scenario 6: Live Feed\n");

    let mut terminal = signed_terminal(config)?;
    let Some(market) = terminal.active_market() else {
        return Ok(());
    };
    let symbol = market.symbol().to_string();
    let start = market.last_price;

    terminal.place_order(OrderRequest::market(Side::Buy, dec!(1), start.value(), 20))?;

    let feed = &config.feed;
    let period = Duration::from_millis(feed.tick_interval_ms.min(50));
    let source = RandomWalkSource::new(symbol.clone(), start, config.rng_seed).with_step_cents(feed.step_cents);
    let (ticker, mut ticks) = FeedTicker::spawn(source, period, feed.channel_buffer);

    let mut book_source = MockOrderBookSource::new(symbol, start, feed.book_depth, config.rng_seed);
    terminal.load_trade_backlog(book_source.backlog(feed.backlog_trades, terminal.time()));
    let (book_ticker, mut books) = FeedTicker::spawn(book_source, period, feed.channel_buffer);

    let mut received = 0;
    while received < 20 {
        tokio::select! {
            Some(quote) = ticks.recv() => {
                received += 1;
                let outcome = terminal.apply_quote(&quote)?;
                if !outcome.liquidations.is_empty() {
                    println!("  Liquidated at mark ${}", quote.mark);
                    break;
                }
            }
            Some(book) = books.recv() => {
                terminal.apply_book(book)?;
            }
            else => break,
        }
    }

    if let Some(source) = ticker.stop().await {
        println!("  Ticker stopped after {} ticks, last ${}", received, source.last());
    }
    if let Some(source) = book_ticker.stop().await {
        println!("  Book ticker stopped, mid ${}", source.mid());
    }
    if let Some(book) = terminal.order_book() {
        if let (Some(ask), Some(bid)) = (book.best_ask(), book.best_bid()) {
            println!("  Book: best bid {} @ ${} | best ask {} @ ${}", bid.amount, bid.price, ask.amount, ask.price);
        }
    }
    println!("  Tape: {} prints", terminal.recent_trades().len());
    for trade in terminal.recent_trades().iter().take(3) {
        println!("    {:?} {} @ ${} {}", trade.side, trade.amount, trade.price, trade.time.format_utc());
    }

    if let Some(market) = terminal.active_market() {
        println!(
            "  {} 24h: high ${} low ${} change {:.4}% | funding {}% (APR {}%) next in {}",
            market.symbol(),
            market.high_24h,
            market.low_24h,
            market.change_24h_percent(),
            market.funding_rate,
            market.estimated_apr(),
            market.funding_countdown(terminal.time())
        );
    }
    for position in terminal.positions() {
        println!("  Open: {} {} pnl ${} ({:.2}%)", position.size, position.symbol, position.pnl, position.pnl_percent);
    }
    print_account(&terminal);
    Ok(())
}

/// Mark crosses the liquidation price; notifications in Simplified Chinese.
fn scenario_7_liquidation(config: &TerminalConfig) -> Result<(), TerminalError> {
    println!("\nScenario 7: Liquidation\n");

    let mut terminal = signed_terminal(config)?;
    terminal.set_language(Language::ZhCn);

    let placement = terminal.place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))?;
    let Some(position) = placement.position().cloned() else {
        return Ok(());
    };
    println!("  Long 1 {} @ ${}, liq ${}", position.symbol, position.entry_price, position.liquidation_price);

    for mark in [dec!(2600), dec!(2400), dec!(2239)] {
        let outcome = terminal.apply_quote(&PriceQuote {
            symbol: position.symbol.clone(),
            last: Price::new_unchecked(mark),
            mark: Price::new_unchecked(mark),
            index: Price::new_unchecked(mark),
            time: terminal.time(),
        })?;
        println!("  Mark ${}: revalued {}, liquidated {}", mark, outcome.revalued, outcome.liquidations.len());
        for liq in &outcome.liquidations {
            println!("    lost margin ${} at ${}", liq.margin_lost, liq.mark_price);
        }
    }
    print_latest_notification(&terminal);

    terminal.advance_time(config.notifications.visible_ms + config.notifications.exit_ms);
    println!("  Notifications after timeout: {}", terminal.notifications().len());
    print_account(&terminal);
    Ok(())
}
