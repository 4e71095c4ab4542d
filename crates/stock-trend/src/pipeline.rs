//! End-to-end trend run
//!
//! Stages run strictly one after another. Only the fetch stage can abort a
//! run; every later failure is printed, logged and recorded, and the next
//! stage still runs.

use crate::api::{NewsProvider, PriceProvider, TheNewsApiClient, YahooFinanceClient};
use crate::chart::{ChartRenderer, SvgChartRenderer};
use crate::companies::company_name;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::export::CsvExporter;
use crate::extrema::{locate_max_high, locate_min_low};
use crate::fetcher::SeriesFetcher;
use crate::news::{NewsCorrelator, NewsOptions, NewsResult};
use crate::report::digest::rows_table;
use crate::report::{AnalysisReport, ReportGenerator, SeriesDigest};
use crate::series::{PriceBar, PriceSeries};
use comfy_table::Table;
use comfy_table::presets::NOTHING;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Rows printed as a preview after the extrema
const PREVIEW_ROWS: usize = 5;

/// Pipeline stages after symbol resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    HighestPrice,
    HighestNews,
    LowestPrice,
    LowestNews,
    Export,
    Report,
    Chart,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::HighestPrice => "highest price",
            Self::HighestNews => "highest price news",
            Self::LowestPrice => "lowest price",
            Self::LowestNews => "lowest price news",
            Self::Export => "export",
            Self::Report => "report",
            Self::Chart => "chart",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    /// Failure class and message
    Failed { kind: &'static str, message: String },
}

impl StageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Why a run stopped before the extrema stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Blank ticker input
    NoSymbol,
    /// The fetch stage failed
    FetchFailed { kind: &'static str, message: String },
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub symbol: String,
    pub company: String,
    pub bars: usize,
    pub highest: Option<PriceBar>,
    pub highest_news: NewsResult,
    pub lowest: Option<PriceBar>,
    pub lowest_news: NewsResult,
    pub export_path: Option<PathBuf>,
    pub report: Option<AnalysisReport>,
    pub chart_path: Option<PathBuf>,
    pub stages: Vec<StageRecord>,
}

impl RunReport {
    /// Outcome recorded for `stage`, if it ran
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|r| r.stage == stage).map(|r| &r.outcome)
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Every stage was attempted
    Completed(Box<RunReport>),
    Aborted(AbortReason),
}

#[derive(Clone, Copy)]
enum Extreme {
    Highest,
    Lowest,
}

impl Extreme {
    fn label(self) -> &'static str {
        match self {
            Self::Highest => "highest",
            Self::Lowest => "lowest",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Self::Highest => "\nHighest price details:",
            Self::Lowest => "\n\nLowest price details:",
        }
    }

    fn stages(self) -> (Stage, Stage) {
        match self {
            Self::Highest => (Stage::HighestPrice, Stage::HighestNews),
            Self::Lowest => (Stage::LowestPrice, Stage::LowestNews),
        }
    }

    fn locate(self, series: &PriceSeries) -> Result<&PriceBar> {
        match self {
            Self::Highest => locate_max_high(series),
            Self::Lowest => locate_min_low(series),
        }
    }
}

/// Fetch, correlate, export, report and chart one symbol
pub struct TrendPipeline {
    fetcher: SeriesFetcher,
    correlator: NewsCorrelator,
    reporter: ReportGenerator,
    exporter: CsvExporter,
    chart: Arc<dyn ChartRenderer>,
}

impl TrendPipeline {
    pub fn new(
        fetcher: SeriesFetcher,
        correlator: NewsCorrelator,
        reporter: ReportGenerator,
        exporter: CsvExporter,
        chart: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            fetcher,
            correlator,
            reporter,
            exporter,
            chart,
        }
    }

    /// Wire the production providers: Yahoo prices, thenewsapi headlines,
    /// an OpenAI-compatible text generator and SVG charts
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        config.validate()?;

        let prices: Arc<dyn PriceProvider> = Arc::new(YahooFinanceClient::new());
        let news: Arc<dyn NewsProvider> = Arc::new(TheNewsApiClient::new(
            config.news_api_key.clone(),
            config.news_api_base.clone(),
            config.news_rate_limit,
            config.request_timeout,
        )?);

        Ok(Self::new(
            SeriesFetcher::new(prices, config.lookback_days),
            NewsCorrelator::new(news, NewsOptions::from_config(config)),
            ReportGenerator::from_config(config)?,
            CsvExporter::new(config.output_dir.clone()),
            Arc::new(SvgChartRenderer::new(config.output_dir.clone())),
        ))
    }

    /// Run every stage for the ticker typed by the user, writing the
    /// transcript to `out`
    ///
    /// Only write errors on `out` are returned as `Err`.
    #[instrument(skip(self, out))]
    pub async fn run(&self, input: &str, out: &mut dyn Write) -> io::Result<RunOutcome> {
        let symbol = input.trim().to_uppercase();
        if symbol.is_empty() {
            writeln!(out, "No ticker entered. Exiting.")?;
            return Ok(RunOutcome::Aborted(AbortReason::NoSymbol));
        }
        let company = company_name(&symbol);
        info!(%symbol, %company, "Starting trend run");

        let mut stages = Vec::new();

        let series = match self.fetcher.fetch(&symbol, None, None).await {
            Ok(series) => {
                stages.push(succeeded(Stage::Fetch));
                series
            }
            Err(err) => {
                warn!(%symbol, stage = %Stage::Fetch, kind = err.kind(), error = %err, "Run aborted");
                writeln!(out, "Could not retrieve stock data for {symbol}: {err}")?;
                return Ok(RunOutcome::Aborted(AbortReason::FetchFailed {
                    kind: err.kind(),
                    message: err.to_string(),
                }));
            }
        };

        let (highest, highest_news) = self
            .examine(Extreme::Highest, &series, &company, out, &mut stages)
            .await?;
        let (lowest, lowest_news) = self
            .examine(Extreme::Lowest, &series, &company, out, &mut stages)
            .await?;

        writeln!(out, "\n\nStock data for {symbol}:")?;
        writeln!(out, "{}", rows_table(series.head(PREVIEW_ROWS), 0))?;

        let export_path = match self.exporter.export(&series) {
            Ok(path) => {
                writeln!(out, "Data saved to {}\n", path.display())?;
                stages.push(succeeded(Stage::Export));
                Some(path)
            }
            Err(err) => {
                fail(out, &mut stages, Stage::Export, format!("Error saving CSV for {symbol}"), &err)?;
                None
            }
        };

        let digest = SeriesDigest::from_series(&series);
        let report = match self.reporter.generate(&digest, &company).await {
            Ok(report) => {
                writeln!(out, "\n{report}")?;
                stages.push(succeeded(Stage::Report));
                Some(report)
            }
            Err(err) => {
                fail(out, &mut stages, Stage::Report, format!("Analysis step failed for {symbol}"), &err)?;
                writeln!(out, "No analysis available.")?;
                None
            }
        };

        let chart_path = match self.chart.render(&series, &company) {
            Ok(path) => {
                writeln!(out, "Chart saved to {}", path.display())?;
                stages.push(succeeded(Stage::Chart));
                Some(path)
            }
            Err(err) => {
                let message = format!("Error displaying the stock performance graph for {symbol}");
                fail(out, &mut stages, Stage::Chart, message, &err)?;
                None
            }
        };

        info!(%symbol, "Trend run completed");
        Ok(RunOutcome::Completed(Box::new(RunReport {
            symbol,
            company,
            bars: series.len(),
            highest,
            highest_news,
            lowest,
            lowest_news,
            export_path,
            report,
            chart_path,
            stages,
        })))
    }

    /// Locate one extremum, print it and correlate news for its date
    async fn examine(
        &self,
        extreme: Extreme,
        series: &PriceSeries,
        company: &str,
        out: &mut dyn Write,
        stages: &mut Vec<StageRecord>,
    ) -> io::Result<(Option<PriceBar>, NewsResult)> {
        let (locate_stage, news_stage) = extreme.stages();
        let label = extreme.label();
        let symbol = series.symbol();

        let bar = match extreme.locate(series) {
            Ok(bar) => bar.clone(),
            Err(err) => {
                let message = format!("Error processing {label} price details for {symbol}");
                fail(out, stages, locate_stage, message, &err)?;
                return Ok((None, NewsResult::Empty));
            }
        };
        stages.push(succeeded(locate_stage));
        writeln!(out, "{}", extreme.heading())?;
        writeln!(out, "{}", bar_details(&bar))?;

        let news = match self.correlator.correlate(&bar.date.to_string(), company).await {
            Ok(news) => {
                writeln!(out, "\nNews for {}", bar.date)?;
                writeln!(out, "{news}")?;
                stages.push(succeeded(news_stage));
                news
            }
            Err(err) => {
                let message = format!("Error fetching news for {label} price of {symbol}");
                fail(out, stages, news_stage, message, &err)?;
                NewsResult::Empty
            }
        };

        Ok((Some(bar), news))
    }
}

fn succeeded(stage: Stage) -> StageRecord {
    StageRecord {
        stage,
        outcome: StageOutcome::Succeeded,
    }
}

/// Print, log and record a failed stage
fn fail(
    out: &mut dyn Write,
    stages: &mut Vec<StageRecord>,
    stage: Stage,
    message: String,
    err: &StockError,
) -> io::Result<()> {
    warn!(stage = %stage, kind = err.kind(), error = %err, "{message}");
    writeln!(out, "{message}: {err}")?;
    stages.push(StageRecord {
        stage,
        outcome: StageOutcome::Failed {
            kind: err.kind(),
            message: err.to_string(),
        },
    });
    Ok(())
}

/// One bar as a two-column field/value listing
fn bar_details(bar: &PriceBar) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.add_row(vec!["Date".to_string(), bar.date.to_string()]);
    for (name, value) in [("Open", bar.open), ("High", bar.high), ("Low", bar.low), ("Close", bar.close)] {
        table.add_row(vec![name.to_string(), format!("{value:.2}")]);
    }
    table.add_row(vec!["Volume".to_string(), bar.volume.to_string()]);
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::provider::{MockNewsProvider, MockPriceProvider};
    use crate::api::{NewsArticle, RawBar};
    use crate::chart::MockChartRenderer;
    use crate::series::fixtures::bars_with_highs;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::path::Path;

    const HIGHS: [f64; 5] = [10.0, 12.0, 15.0, 11.0, 9.0];

    fn raw_rows(highs: &[f64]) -> Vec<RawBar> {
        bars_with_highs(highs)
            .into_iter()
            .map(|b| RawBar {
                timestamp: Some(b.date.and_hms_opt(14, 30, 0).unwrap().and_utc().timestamp()),
                open: Some(b.open),
                high: Some(b.high),
                low: Some(b.low),
                close: Some(b.close),
                volume: Some(b.volume),
                utc_offset: 0,
            })
            .collect()
    }

    fn prices_returning(highs: &[f64]) -> MockPriceProvider {
        let rows = raw_rows(highs);
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_history()
            .times(1)
            .returning(move |_, _, _| Ok(rows.clone()));
        mock
    }

    fn headline(title: &str) -> NewsArticle {
        NewsArticle {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn chart_called_once() -> MockChartRenderer {
        let mut chart = MockChartRenderer::new();
        chart
            .expect_render()
            .times(1)
            .returning(|series, _| Ok(PathBuf::from(format!("{}_chart.svg", series.symbol()))));
        chart
    }

    async fn llm_server(status: u16, body: serde_json::Value) -> MockServer {
        let server = MockServer::start_async().await;
        server
            .mock_async(move |when, then| {
                when.method(POST).path("/chat/completions");
                then.status(status).json_body(body);
            })
            .await;
        server
    }

    fn llm_ok() -> serde_json::Value {
        json!({
            "choices": [{
                "message": { "role": "assistant", "content": "Stock Performance Analysis\nUp.\n\nSummary\nGood year." },
                "finish_reason": "stop"
            }]
        })
    }

    fn pipeline(
        prices: MockPriceProvider,
        news: MockNewsProvider,
        chart: MockChartRenderer,
        llm_base: &str,
        dir: &Path,
    ) -> TrendPipeline {
        let config = StockConfig::builder()
            .llm_api_key("gsk-test")
            .llm_api_base(llm_base)
            .output_dir(dir)
            .build()
            .unwrap();

        TrendPipeline::new(
            SeriesFetcher::new(Arc::new(prices), config.lookback_days),
            NewsCorrelator::new(Arc::new(news), NewsOptions::from_config(&config)),
            ReportGenerator::from_config(&config).unwrap(),
            CsvExporter::new(dir),
            Arc::new(chart),
        )
    }

    async fn run(pipeline: &TrendPipeline, input: &str) -> (RunOutcome, String) {
        let mut out = Vec::new();
        let outcome = pipeline.run(input, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    fn completed(outcome: RunOutcome) -> RunReport {
        match outcome {
            RunOutcome::Completed(report) => *report,
            RunOutcome::Aborted(reason) => panic!("Expected completed run, got {reason:?}"),
        }
    }

    #[test]
    fn test_bar_details_lists_fields() {
        let bar = &bars_with_highs(&[15.0])[0];
        let details = bar_details(bar);
        for field in ["Date", "Open", "High", "Low", "Close", "Volume"] {
            assert!(details.contains(field), "{field}");
        }
        assert!(details.contains("2024-01-02"));
        assert!(details.contains("15.00"));
    }

    #[tokio::test]
    async fn test_full_run_for_aapl() {
        let dir = tempfile::tempdir().unwrap();
        let server = llm_server(200, llm_ok()).await;

        let mut news = MockNewsProvider::new();
        news.expect_name().return_const("mock");
        news.expect_search()
            .times(2)
            .returning(|q| Ok(vec![headline(&format!("Apple on {}", q.published_on))]));

        let pipeline = pipeline(prices_returning(&HIGHS), news, chart_called_once(), &server.base_url(), dir.path());
        let (outcome, transcript) = run(&pipeline, " aapl ").await;
        let report = completed(outcome);

        assert_eq!(report.symbol, "AAPL");
        assert_eq!(report.company, "Apple Inc.");
        assert_eq!(report.bars, 5);

        let highest = report.highest.unwrap();
        assert_eq!(highest.high, 15.0);
        assert_eq!(highest.date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        let lowest = report.lowest.unwrap();
        assert_eq!(lowest.low, 7.0);
        assert_eq!(report.highest_news.headlines(), ["Apple on 2024-01-04".to_string()]);
        assert_eq!(report.lowest_news.headlines(), ["Apple on 2024-01-06".to_string()]);

        let csv_path = report.export_path.unwrap();
        assert_eq!(csv_path, dir.path().join("AAPL_stock_data.csv"));
        let csv = std::fs::read_to_string(csv_path).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");

        assert_eq!(report.report.unwrap().as_str(), "Stock Performance Analysis\nUp.\n\nSummary\nGood year.");
        assert_eq!(report.chart_path, Some(PathBuf::from("AAPL_chart.svg")));
        assert!(report.stages.iter().all(|r| r.outcome.is_success()));
        assert_eq!(report.stages.len(), 8);

        assert!(transcript.contains("\nHighest price details:\n"));
        assert!(transcript.contains("\n\nLowest price details:\n"));
        assert!(transcript.contains("News for 2024-01-04\nApple on 2024-01-04"));
        assert!(transcript.contains("Stock data for AAPL:"));
        assert!(transcript.contains("Data saved to "));
        assert!(transcript.contains("Good year."));
        assert!(transcript.contains("Chart saved to AAPL_chart.svg"));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();

        let mut prices = MockPriceProvider::new();
        prices.expect_history().never();
        let mut news = MockNewsProvider::new();
        news.expect_search().never();
        let mut chart = MockChartRenderer::new();
        chart.expect_render().never();

        let pipeline = pipeline(prices, news, chart, "http://127.0.0.1:9", dir.path());
        for input in ["", "   \n"] {
            let (outcome, transcript) = run(&pipeline, input).await;
            assert!(matches!(outcome, RunOutcome::Aborted(AbortReason::NoSymbol)));
            assert_eq!(transcript, "No ticker entered. Exiting.\n");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();

        let mut prices = MockPriceProvider::new();
        prices.expect_name().return_const("mock");
        prices.expect_history().returning(|_, _, _| Ok(Vec::new()));
        let mut news = MockNewsProvider::new();
        news.expect_search().never();
        let mut chart = MockChartRenderer::new();
        chart.expect_render().never();

        let pipeline = pipeline(prices, news, chart, "http://127.0.0.1:9", dir.path());
        let (outcome, transcript) = run(&pipeline, "ZZZZ").await;

        match outcome {
            RunOutcome::Aborted(AbortReason::FetchFailed { kind, .. }) => {
                assert_eq!(kind, "EmptySeriesFailure");
            }
            other => panic!("Expected fetch abort, got {other:?}"),
        }
        assert!(transcript.starts_with("Could not retrieve stock data for ZZZZ: "));
    }

    #[tokio::test]
    async fn test_high_news_failure_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let server = llm_server(200, llm_ok()).await;
        let high_day = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();

        let mut news = MockNewsProvider::new();
        news.expect_name().return_const("mock");
        news.expect_search().times(2).returning(move |q| {
            if q.published_on == high_day {
                Err(StockError::upstream("thenewsapi", "HTTP 500 Internal Server Error: boom"))
            } else {
                Ok(vec![headline("Shares slide")])
            }
        });

        let pipeline = pipeline(prices_returning(&HIGHS), news, chart_called_once(), &server.base_url(), dir.path());
        let (outcome, transcript) = run(&pipeline, "AAPL").await;
        let report = completed(outcome);

        assert_eq!(report.highest_news, NewsResult::Empty);
        assert_eq!(report.lowest_news.headlines(), ["Shares slide".to_string()]);
        assert!(matches!(
            report.outcome(Stage::HighestNews),
            Some(StageOutcome::Failed { kind: "UpstreamFailure", .. })
        ));
        assert_eq!(report.outcome(Stage::LowestNews), Some(&StageOutcome::Succeeded));
        assert_eq!(report.outcome(Stage::Report), Some(&StageOutcome::Succeeded));
        assert!(report.report.is_some());

        assert!(transcript.contains("Error fetching news for highest price of AAPL: thenewsapi request failed: HTTP 500"));
        assert!(transcript.contains("News for 2024-01-06\nShares slide"));
    }

    #[tokio::test]
    async fn test_report_failure_still_charts() {
        let dir = tempfile::tempdir().unwrap();
        let server = llm_server(500, json!({ "error": { "message": "upstream down" } })).await;

        let mut news = MockNewsProvider::new();
        news.expect_name().return_const("mock");
        news.expect_search().returning(|_| Ok(Vec::new()));

        let pipeline = pipeline(prices_returning(&HIGHS), news, chart_called_once(), &server.base_url(), dir.path());
        let (outcome, transcript) = run(&pipeline, "AAPL").await;
        let report = completed(outcome);

        assert!(report.report.is_none());
        assert!(matches!(
            report.outcome(Stage::Report),
            Some(StageOutcome::Failed { kind: "UpstreamFailure", .. })
        ));
        assert_eq!(report.outcome(Stage::Chart), Some(&StageOutcome::Succeeded));
        assert!(transcript.contains("Analysis step failed for AAPL: "));
        assert!(transcript.contains("No analysis available."));
        assert!(transcript.contains("No news found for this date."));
        assert!(transcript.contains("Chart saved to AAPL_chart.svg"));
    }

    #[tokio::test]
    async fn test_export_and_chart_failures_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let server = llm_server(200, llm_ok()).await;

        let mut news = MockNewsProvider::new();
        news.expect_name().return_const("mock");
        news.expect_search().returning(|_| Ok(Vec::new()));
        let mut chart = MockChartRenderer::new();
        chart
            .expect_render()
            .times(1)
            .returning(|_, _| Err(StockError::Chart("no backend".to_string())));

        let missing = dir.path().join("missing");
        let pipeline = pipeline(prices_returning(&HIGHS), news, chart, &server.base_url(), &missing);
        let (outcome, transcript) = run(&pipeline, "AAPL").await;
        let report = completed(outcome);

        assert!(report.export_path.is_none());
        assert!(report.chart_path.is_none());
        assert!(matches!(
            report.outcome(Stage::Export),
            Some(StageOutcome::Failed { kind: "IOFailure", .. })
        ));
        assert_eq!(report.outcome(Stage::Report), Some(&StageOutcome::Succeeded));
        assert!(transcript.contains("Error saving CSV for AAPL: "));
        assert!(transcript.contains("Error displaying the stock performance graph for AAPL: Chart rendering failed: no backend"));
    }
}
