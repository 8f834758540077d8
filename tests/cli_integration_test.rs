//! CLI orchestration tests: config building, the backtest pipeline with
//! mock and file-backed ports, and report outputs written to disk.

mod common;

use common::*;
use crypto_trader::adapters::file_config_adapter::FileConfigAdapter;
use crypto_trader::adapters::file_store::FileStore;
use crypto_trader::cli;
use crypto_trader::domain::backtest::DEFAULT_CAPITAL;
use crypto_trader::domain::error::TraderError;
use crypto_trader::domain::signal::SignalGenerator;
use crypto_trader::domain::strategy::StrategyConfig;
use crypto_trader::domain::trade::Trade;
use crypto_trader::ports::storage_port::{StoragePort, get_records, price_key};
use std::fs;
use std::path::Path;

fn config_for(data_dir: &Path, store_dir: &Path, extra: &str) -> String {
    format!(
        "[data]\nsource = csv\npath = {}\nsymbol = ethusdt\ninterval = 1d\nstart_date = 2024-01-01\nend_date = 2024-12-31\n\n[store]\nbackend = file\npath = {}\n\n[strategy]\nname = sma_crossover\nshort_window = 5\nlong_window = 20\n\n[backtest]\ncapital = 10000\n{}",
        data_dir.display(),
        store_dir.display(),
        extra
    )
}

fn seeded_dirs() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let data = dir.path().join("data");
    let store = dir.path().join("store");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("ETHUSDT_1d.csv"),
        price_csv(&make_points(&rise_then_fall_closes())),
    )
    .unwrap();
    (dir, data, store)
}

mod config_building {
    use super::*;

    #[test]
    fn price_request_uppercases_symbol() {
        let (_dir, data, store) = seeded_dirs();
        let config = FileConfigAdapter::from_string(&config_for(&data, &store, "")).unwrap();
        let request = cli::build_price_request(&config).unwrap();
        assert_eq!(request.symbol, "ETHUSDT");
        assert_eq!(request.interval, "1d");
        assert_eq!(request.start_date, date(2024, 1, 1));
        assert_eq!(request.end_date, date(2024, 12, 31));
    }

    #[test]
    fn strategy_config_from_ini() {
        let (_dir, data, store) = seeded_dirs();
        let config = FileConfigAdapter::from_string(&config_for(&data, &store, "")).unwrap();
        assert_eq!(
            cli::build_strategy_config(&config).unwrap(),
            StrategyConfig::SmaCrossover {
                short_window: 5,
                long_window: 20
            }
        );
    }

    #[test]
    fn capital_override_wins() {
        let config = FileConfigAdapter::from_string("[backtest]\ncapital = 500\n").unwrap();
        assert_eq!(cli::build_capital(&config, None).unwrap(), 500.0);
        assert_eq!(cli::build_capital(&config, Some(250.0)).unwrap(), 250.0);
        assert!(matches!(
            cli::build_capital(&config, Some(-1.0)),
            Err(TraderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn capital_defaults_without_backtest_section() {
        let config = FileConfigAdapter::from_string("[data]\nsymbol = X\n").unwrap();
        assert_eq!(cli::build_capital(&config, None).unwrap(), DEFAULT_CAPITAL);
    }

    #[test]
    fn unknown_source_is_config_invalid() {
        let config = FileConfigAdapter::from_string("[data]\nsource = ftp\npath = x\n").unwrap();
        assert!(matches!(
            cli::build_data_port(&config).map(|_| ()),
            Err(TraderError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn param_grid_from_flags_or_config() {
        let config = FileConfigAdapter::from_string(
            "[sweep]\nshort_windows = 5,10\nlong_windows = 20, 50, 100\n",
        )
        .unwrap();

        let grid = cli::build_param_grid(&config, vec![], vec![]).unwrap();
        assert_eq!(grid.short_windows, vec![5, 10]);
        assert_eq!(grid.long_windows, vec![20, 50, 100]);

        let grid = cli::build_param_grid(&config, vec![3], vec![]).unwrap();
        assert_eq!(grid.short_windows, vec![3]);
    }

    #[test]
    fn param_grid_missing_is_config_missing() {
        let config = FileConfigAdapter::from_string("[sweep]\n").unwrap();
        let err = cli::build_param_grid(&config, vec![5], vec![]).unwrap_err();
        assert!(matches!(err, TraderError::ConfigMissing { key, .. } if key == "long_windows"));
    }

    #[test]
    fn param_grid_bad_item_is_config_invalid() {
        let config =
            FileConfigAdapter::from_string("[sweep]\nshort_windows = 5,abc\nlong_windows = 20\n")
                .unwrap();
        let err = cli::build_param_grid(&config, vec![], vec![]).unwrap_err();
        assert!(matches!(
            &err,
            TraderError::ConfigInvalid { key, reason, .. }
                if key == "short_windows" && reason.contains("'abc'")
        ));
        assert!(!err.to_string().contains("missing"));
    }
}

mod backtest_pipeline {
    use super::*;

    #[test]
    fn pipeline_with_mock_data_port() {
        let (_dir, data, store) = seeded_dirs();
        let config = FileConfigAdapter::from_string(&config_for(&data, &store, "")).unwrap();
        let port = MockDataPort::new().with_points("ETHUSDT", make_points(&rise_then_fall_closes()));

        let run = cli::run_backtest_pipeline(&port, &config, None).unwrap();
        assert_eq!(run.strategy, "sma_crossover(5,20)");
        assert_eq!(run.prices.len(), 101);
        assert_eq!(run.ledger.len(), 2);
        assert_eq!(run.summary.trades_won, 1);

        let text = cli::format_summary(&run);
        assert!(text.contains("=== Backtest Results ==="));
        assert!(text.contains("Total Trades:     2 (0 flat)"));
    }

    #[test]
    fn pipeline_reports_data_errors() {
        let (_dir, data, store) = seeded_dirs();
        let config = FileConfigAdapter::from_string(&config_for(&data, &store, "")).unwrap();
        let port = MockDataPort::new().with_error("ETHUSDT", "timeout");
        assert!(matches!(
            cli::run_backtest_pipeline(&port, &config, None),
            Err(TraderError::Data { .. })
        ));
    }

    #[test]
    fn outputs_written_to_disk_and_store() {
        let (dir, data, store) = seeded_dirs();
        let ledger_csv = dir.path().join("out/trades.csv");
        let chart_svg = dir.path().join("out/trades.svg");
        fs::create_dir_all(dir.path().join("out")).unwrap();
        let extra = format!(
            "\n[report]\nledger_csv = {}\nchart_svg = {}\nledger_key = ledgers/ETHUSDT\n",
            ledger_csv.display(),
            chart_svg.display()
        );
        let config = FileConfigAdapter::from_string(&config_for(&data, &store, &extra)).unwrap();

        let port = cli::build_data_port(&config).unwrap();
        let run = cli::run_backtest_pipeline(port.as_ref(), &config, None).unwrap();
        let written = cli::write_outputs(&config, &run).unwrap();
        assert_eq!(written.len(), 3);

        let csv_text = fs::read_to_string(&ledger_csv).unwrap();
        assert_eq!(csv_text.lines().count(), 1 + run.ledger.len());
        assert!(fs::read_to_string(&chart_svg).unwrap().contains("<polyline"));

        let trades: Vec<Trade> = get_records(&FileStore::new(store), "ledgers/ETHUSDT")
            .unwrap()
            .unwrap();
        assert_eq!(trades, run.ledger.trades);
    }

    #[test]
    fn no_report_section_writes_nothing() {
        let (_dir, data, store) = seeded_dirs();
        let config = FileConfigAdapter::from_string(&config_for(&data, &store, "")).unwrap();
        let port = cli::build_data_port(&config).unwrap();
        let run = cli::run_backtest_pipeline(port.as_ref(), &config, None).unwrap();
        assert!(cli::write_outputs(&config, &run).unwrap().is_empty());
    }

    #[test]
    fn store_source_reads_imported_prices() {
        let (_dir, data, store) = seeded_dirs();
        let csv_config = FileConfigAdapter::from_string(&config_for(&data, &store, "")).unwrap();

        let request = cli::build_price_request(&csv_config).unwrap();
        let prices = cli::load_prices(cli::build_data_port(&csv_config).unwrap().as_ref(), &request)
            .unwrap();
        let record_store = cli::build_store(&csv_config).unwrap();
        crypto_trader::ports::storage_port::put_records(
            record_store.as_ref(),
            &price_key(&request.symbol, request.start_date, request.end_date),
            prices.points(),
        )
        .unwrap();

        let store_ini = config_for(&data, &store, "").replace("source = csv", "source = store");
        let store_config = FileConfigAdapter::from_string(&store_ini).unwrap();
        let port = cli::build_data_port(&store_config).unwrap();
        let run = cli::run_backtest_pipeline(port.as_ref(), &store_config, None).unwrap();
        assert_eq!(run.prices, prices);
        assert_eq!(run.ledger.len(), 2);
    }

    #[test]
    fn signals_are_tab_separated() {
        let prices = series(&rise_then_fall_closes());
        let generator = StrategyConfig::SmaCrossover {
            short_window: 5,
            long_window: 20,
        }
        .build()
        .unwrap();
        let text = cli::format_signals(&generator.generate(&prices).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2024-01-30T00:00:00+00:00\t1\tlong");
        assert!(lines[1].ends_with("\t-1\tshort"));
    }
}

mod dry_run {
    use super::*;

    #[test]
    fn dry_run_succeeds_with_valid_files() {
        let (_dir, data, store) = seeded_dirs();
        let ini = write_temp_ini(&config_for(&data, &store, ""));
        assert!(cli::run_dry_run(ini.path(), None).is_ok());
    }

    #[test]
    fn dry_run_writes_no_outputs() {
        let (dir, data, store) = seeded_dirs();
        let ledger_csv = dir.path().join("trades.csv");
        let extra = format!("\n[report]\nledger_csv = {}\n", ledger_csv.display());
        let ini = write_temp_ini(&config_for(&data, &store, &extra));
        cli::run_dry_run(ini.path(), None).unwrap();
        assert!(!ledger_csv.exists());
    }

    #[test]
    fn dry_run_rejects_invalid_strategy() {
        let (_dir, data, store) = seeded_dirs();
        let ini = config_for(&data, &store, "").replace("long_window = 20", "long_window = 3");
        let file = write_temp_ini(&ini);
        let err = cli::run_dry_run(file.path(), None).unwrap_err();
        assert!(matches!(err, TraderError::ConfigInvalid { key, .. } if key == "short_window"));
    }

    #[test]
    fn dry_run_missing_config_file() {
        let err = cli::run_dry_run(Path::new("/nonexistent/crypto_trader.ini"), None).unwrap_err();
        assert!(matches!(err, TraderError::ConfigParse { .. }));
    }

    #[test]
    fn store_path_is_rejected_as_escape() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(matches!(store.get("../etc"), Err(TraderError::Storage { .. })));
    }
}
