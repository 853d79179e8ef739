//! Integration tests for the crawler
//!
//! These tests drive the coordinator against a scripted in-memory browser
//! and check the records, the run outcome and which page elements were used.

use crate::support::{config_with_data_dir, session, test_config, MockDriver, LOGIN_URL};
use fnguide_harvest::config::TimingConfig;
use fnguide_harvest::crawler::{
    run_crawl, run_with_driver, Authenticator, Coordinator, SearchFlow, StopFlag,
};
use fnguide_harvest::output::{CsvSink, RunOutcome};
use fnguide_harvest::{CrawlState, HarvestError, Period, StepError, TickerRecord};
use tempfile::TempDir;

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

fn figures(name: &str, sales: &str, profit: &str) -> (String, String, String) {
    (name.to_string(), sales.to_string(), profit.to_string())
}

#[tokio::test]
async fn test_two_tickers_end_to_end() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("20250101_2024093.csv");

    let (driver, state) = MockDriver::new(1);
    {
        let mut state = state.lock().unwrap();
        state
            .figures
            .insert("005930".to_string(), figures("Samsung", "100", "10"));
        state
            .figures
            .insert("000660".to_string(), figures("SK hynix", "100", "10"));
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let sink = CsvSink::create(&csv_path).unwrap();
    let mut coordinator =
        Coordinator::new(session(driver), sink, test_config(), period, StopFlag::new());

    let summary = coordinator.run(&codes(&["005930", "000660"])).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(coordinator.state(), CrawlState::Done);

    coordinator.close().await;
    assert!(state.lock().unwrap().closed);
    assert!(state
        .lock()
        .unwrap()
        .looked_up("css=#selTerm > option[value='2024093']"));

    let content = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("stock_code,stock_name,sales,operating_profit")
    );

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<TickerRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].stock_code, "005930");
    assert_eq!(rows[0].stock_name.as_deref(), Some("Samsung"));
    assert_eq!(rows[1].stock_code, "000660");
    for row in &rows {
        assert_eq!(row.sales, Some(100.0));
        assert_eq!(row.operating_profit, Some(10.0));
    }
}

#[tokio::test]
async fn test_failed_ticker_does_not_affect_neighbors() {
    let (driver, state) = MockDriver::new(1);
    let list = codes(&["000001", "000002", "000003", "000004"]);
    {
        let mut state = state.lock().unwrap();
        for code in &list {
            state
                .figures
                .insert(code.clone(), figures("Name", "1,000", "-50"));
        }
        state.failing_codes.insert("000002".to_string());
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&list).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.degraded, 1);

    let (_, records) = coordinator.into_parts();
    assert_eq!(records.len(), 4);
    assert_eq!(records[1], TickerRecord::unresolved("000002"));
    for idx in [0, 2, 3] {
        assert_eq!(records[idx].stock_code, list[idx]);
        assert_eq!(records[idx].sales, Some(1000.0));
        assert_eq!(records[idx].operating_profit, Some(-50.0));
    }
}

#[tokio::test]
async fn test_missing_id_field_skips_password_lookup() {
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .missing
        .insert("css=#txtID".to_string());

    let config = test_config();
    let timing = TimingConfig::immediate();
    let auth = Authenticator::new(
        &config.site,
        &config.selectors.login,
        &config.credentials,
        &timing,
    );

    let mut browser = session(driver);
    let result = auth.login(&mut browser).await;

    assert!(matches!(result, Err(StepError::ElementNotFound { .. })));
    assert!(!browser.state().authenticated);

    let state = state.lock().unwrap();
    assert!(state.looked_up("css=#txtID"));
    assert!(!state.looked_up("css=#txtPW"));
}

#[tokio::test]
async fn test_login_failure_processes_no_tickers() {
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .missing
        .insert("css=#txtID".to_string());

    let period = Period::annual(2024).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&codes(&["005930"])).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::LoginFailed);
    assert_eq!(summary.processed(), 0);
    assert_eq!(coordinator.state(), CrawlState::Done);
    assert!(coordinator.sink().is_empty());
}

#[tokio::test]
async fn test_rejected_credentials() {
    // The site accepts no login at all
    let (driver, state) = MockDriver::new(0);

    let period = Period::annual(2024).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&codes(&["005930"])).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::LoginFailed);
    assert!(coordinator.sink().is_empty());
    assert!(state.lock().unwrap().current_url.starts_with(LOGIN_URL));
    assert!(!state.lock().unwrap().looked_up("id=txtSearchWd"));
}

#[tokio::test]
async fn test_expired_session_logs_in_again() {
    let (driver, state) = MockDriver::new(2);
    let list = codes(&["000001", "000002", "000003"]);
    {
        let mut state = state.lock().unwrap();
        for code in &list {
            state.figures.insert(code.clone(), figures("Name", "7", "3"));
        }
        // Visit 1 follows login, visit 2 is the first ticker
        state.expire_at_visit = Some(3);
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&list).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(state.lock().unwrap().login_count, 2);
    assert_eq!(coordinator.session().state().logins, 2);
    assert!(coordinator.session().state().authenticated);
}

#[tokio::test]
async fn test_failed_relogin_aborts_remaining_tickers() {
    let (driver, state) = MockDriver::new(1);
    let list = codes(&["000001", "000002", "000003"]);
    {
        let mut state = state.lock().unwrap();
        for code in &list {
            state.figures.insert(code.clone(), figures("Name", "7", "3"));
        }
        state.expire_at_visit = Some(3);
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&list).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::SessionLost);
    assert_eq!(summary.processed(), 1);
    assert_eq!(coordinator.state(), CrawlState::Done);

    let (_, records) = coordinator.into_parts();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stock_code, "000001");
}

#[tokio::test]
async fn test_stop_flag_halts_between_tickers() {
    let stop = StopFlag::new();
    let (driver, state) = MockDriver::new(1);
    let list = codes(&["000001", "000002", "000003"]);
    {
        let mut state = state.lock().unwrap();
        for code in &list {
            state.figures.insert(code.clone(), figures("Name", "7", "3"));
        }
        state.stop_on_search = Some(("000001".to_string(), stop.clone()));
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        stop,
    );

    let summary = coordinator.run(&list).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Stopped);

    // The ticker in flight still completes
    let (_, records) = coordinator.into_parts();
    assert_eq!(records.len(), 1);
    assert!(records[0].has_financials());
}

#[tokio::test]
async fn test_annual_period_uses_annual_options() {
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .figures
        .insert("005930".to_string(), figures("Samsung", "300", "30"));

    let period = Period::annual(2024).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&codes(&["005930"])).await.unwrap();
    assert_eq!(summary.succeeded, 1);

    let state = state.lock().unwrap();
    assert!(state.looked_up("css=#selAccType > option[value='Y']"));
    assert!(!state.looked_up("css=#selAccType > option[value='Q']"));
    assert!(state.looked_up("css=#selTerm > option[value='202412D']"));
}

#[tokio::test]
async fn test_missing_figures_yield_partial_record() {
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .figures
        .insert("005930".to_string(), figures("Samsung", "N/A", "30"));

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&codes(&["005930"])).await.unwrap();
    assert_eq!(summary.partial, 1);

    let (_, records) = coordinator.into_parts();
    assert_eq!(records[0].stock_name.as_deref(), Some("Samsung"));
    assert_eq!(records[0].sales, None);
    assert_eq!(records[0].operating_profit, Some(30.0));
}

#[tokio::test]
async fn test_unreadable_url_after_login_is_a_failure() {
    let (driver, state) = MockDriver::new(1);
    state.lock().unwrap().fail_current_url = true;

    let config = test_config();
    let timing = TimingConfig::immediate();
    let auth = Authenticator::new(
        &config.site,
        &config.selectors.login,
        &config.credentials,
        &timing,
    );

    let mut browser = session(driver);
    let result = auth.login(&mut browser).await;

    match result {
        Err(StepError::AuthenticationRejected { url }) => assert_eq!(url, LOGIN_URL),
        other => panic!("expected rejected login, got {:?}", other),
    }
    assert!(!browser.state().authenticated);
    assert_eq!(browser.state().logins, 0);
}

#[tokio::test]
async fn test_login_page_unreachable() {
    let (driver, state) = MockDriver::new(1);
    state.lock().unwrap().fail_goto.insert(LOGIN_URL.to_string());

    let config = test_config();
    let timing = TimingConfig::immediate();
    let auth = Authenticator::new(
        &config.site,
        &config.selectors.login,
        &config.credentials,
        &timing,
    );

    let mut browser = session(driver);
    let result = auth.login(&mut browser).await;

    match result {
        Err(StepError::Navigation { url }) => assert_eq!(url, LOGIN_URL),
        other => panic!("expected navigation failure, got {:?}", other),
    }
    assert!(!state.lock().unwrap().looked_up("css=#txtID"));
}

#[tokio::test]
async fn test_locate_and_filter_submits_query() {
    let (driver, state) = MockDriver::new(1);
    let config = test_config();
    let timing = TimingConfig::immediate();
    let flow = SearchFlow::new(&config.selectors.search, &timing);
    let period = Period::quarterly(2024, 3).unwrap();

    let mut browser = session(driver);
    flow.locate_and_filter(&mut browser, "005930", &period)
        .await
        .unwrap();

    let state = state.lock().unwrap();
    assert_eq!(state.current_code.as_deref(), Some("005930"));
    assert!(state.looked_up("css=#selAccType > option[value='Q']"));
    assert!(state.looked_up("css=#selTerm > option[value='2024093']"));
    assert!(state.query_submitted);
}

#[tokio::test]
async fn test_locate_and_filter_stops_at_missing_search_input() {
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .missing
        .insert("id=txtSearchWd".to_string());

    let config = test_config();
    let timing = TimingConfig::immediate();
    let flow = SearchFlow::new(&config.selectors.search, &timing);
    let period = Period::quarterly(2024, 3).unwrap();

    let mut browser = session(driver);
    let result = flow.locate_and_filter(&mut browser, "005930", &period).await;

    assert!(matches!(result, Err(StepError::ElementNotFound { .. })));
    let state = state.lock().unwrap();
    assert!(!state.looked_up("css=#selAccType"));
    assert!(!state.query_submitted);
}

#[tokio::test]
async fn test_missing_period_option_lists_available_values() {
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .missing
        .insert("css=#selTerm > option[value='2024093']".to_string());

    let config = test_config();
    let timing = TimingConfig::immediate();
    let flow = SearchFlow::new(&config.selectors.search, &timing);
    let period = Period::quarterly(2024, 3).unwrap();

    let mut browser = session(driver);
    let result = flow.locate_and_filter(&mut browser, "005930", &period).await;

    match result {
        Err(StepError::PeriodUnavailable { code, available }) => {
            assert_eq!(code, "2024093");
            assert_eq!(available, vec!["2024063".to_string()]);
        }
        other => panic!("expected unavailable period, got {:?}", other),
    }
    assert!(!state.lock().unwrap().query_submitted);
}

#[tokio::test]
async fn test_failed_reload_keeps_processing() {
    let (driver, state) = MockDriver::new(1);
    {
        let mut state = state.lock().unwrap();
        state
            .figures
            .insert("005930".to_string(), figures("Samsung", "5", "1"));
        // Visit 1 follows login, visit 2 is the reload before the ticker
        state.fail_item_visit = Some(2);
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&codes(&["005930"])).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(state.lock().unwrap().login_count, 1);
}

#[tokio::test]
async fn test_missing_search_input_records_unresolved() {
    let (driver, state) = MockDriver::new(1);
    {
        let mut state = state.lock().unwrap();
        state
            .figures
            .insert("005930".to_string(), figures("Samsung", "5", "1"));
        state.missing.insert("id=txtSearchWd".to_string());
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator.run(&codes(&["005930"])).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.degraded, 1);
    assert_eq!(coordinator.state(), CrawlState::Done);
    assert!(!state.lock().unwrap().looked_up("css=#selAccType"));

    let (_, records) = coordinator.into_parts();
    assert_eq!(records, vec![TickerRecord::unresolved("005930")]);
}

#[tokio::test]
async fn test_result_page_timeout_records_unresolved() {
    let (driver, state) = MockDriver::new(1);
    {
        let mut state = state.lock().unwrap();
        state
            .figures
            .insert("005930".to_string(), figures("Samsung", "5", "1"));
        state
            .figures
            .insert("000660".to_string(), figures("SK hynix", "8", "2"));
        state.hide_input_after_query = true;
    }

    let period = Period::quarterly(2024, 3).unwrap();
    let mut coordinator = Coordinator::new(
        session(driver),
        Vec::<TickerRecord>::new(),
        test_config(),
        period,
        StopFlag::new(),
    );

    let summary = coordinator
        .run(&codes(&["005930", "000660"]))
        .await
        .unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.degraded, 2);

    // Reloading restores the input, so every ticker reaches the content wait
    let (_, records) = coordinator.into_parts();
    assert_eq!(
        records,
        vec![
            TickerRecord::unresolved("005930"),
            TickerRecord::unresolved("000660")
        ]
    );
}

#[tokio::test]
async fn test_run_with_driver_writes_dated_file_and_closes_browser() {
    let dir = TempDir::new().unwrap();
    let (driver, state) = MockDriver::new(1);
    state
        .lock()
        .unwrap()
        .figures
        .insert("005930".to_string(), figures("Samsung", "100", "10"));

    let config = config_with_data_dir(dir.path(), "http://localhost:9515");
    let period = Period::annual(2024).unwrap();
    let summary = run_with_driver(driver, config, period, &codes(&["005930"]), StopFlag::new())
        .await
        .unwrap();

    assert!(state.lock().unwrap().closed);
    let path = summary.output_path.expect("output path should be set");
    assert!(path.starts_with(dir.path()));
    assert!(path.to_string_lossy().ends_with("_year.csv"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[tokio::test]
async fn test_unwritable_output_still_closes_browser() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();

    let (driver, state) = MockDriver::new(1);
    let config = config_with_data_dir(&blocker, "http://localhost:9515");
    let period = Period::annual(2024).unwrap();
    let result =
        run_with_driver(driver, config, period, &codes(&["005930"]), StopFlag::new()).await;

    assert!(matches!(result, Err(HarvestError::Output(_))));
    let state = state.lock().unwrap();
    assert!(state.closed);
    assert!(state.lookups.is_empty());
}

#[tokio::test]
async fn test_unreachable_webdriver_leaves_no_result_file() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");

    // Nothing listens on the discard port
    let config = config_with_data_dir(&data_dir, "http://127.0.0.1:9");
    let period = Period::annual(2024).unwrap();
    let result = run_crawl(config, period, &codes(&["005930"]), StopFlag::new()).await;

    assert!(matches!(result, Err(HarvestError::Browser(_))));
    assert!(!data_dir.exists());
}
