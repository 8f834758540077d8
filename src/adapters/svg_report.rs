//! SVG trade chart: close prices as a polyline with buy and sell markers.

use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;
use crate::domain::trade::{TradeLedger, TradeType};
use crate::ports::report_port::ReportPort;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 40.0;
const MARKER: f64 = 6.0;

pub struct SvgReportAdapter;

/// Maps timestamps and prices into plot coordinates.
struct Frame {
    t0: i64,
    t_span: f64,
    min_close: f64,
    scale_y: f64,
}

impl Frame {
    fn new(prices: &PriceSeries) -> Option<Self> {
        let first = prices.first()?.timestamp.timestamp();
        let last = prices.last()?.timestamp.timestamp();

        let min_close = prices.closes().into_iter().fold(f64::INFINITY, f64::min);
        let max_close = prices.closes().into_iter().fold(f64::NEG_INFINITY, f64::max);
        let range = max_close - min_close;
        let plot_height = HEIGHT - 2.0 * PADDING;

        Some(Self {
            t0: first,
            t_span: (last - first) as f64,
            min_close,
            scale_y: if range > 0.0 { plot_height / range } else { 1.0 },
        })
    }

    fn x(&self, timestamp: DateTime<Utc>) -> f64 {
        let plot_width = WIDTH - 2.0 * PADDING;
        if self.t_span > 0.0 {
            PADDING + (timestamp.timestamp() - self.t0) as f64 / self.t_span * plot_width
        } else {
            PADDING
        }
    }

    fn y(&self, price: f64) -> f64 {
        HEIGHT - PADDING - (price - self.min_close) * self.scale_y
    }
}

fn marker(trade_type: TradeType, x: f64, y: f64) -> String {
    match trade_type {
        TradeType::Buy => format!(
            r##"<polygon class="buy" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="#2e7d32"/>"##,
            x,
            y - MARKER,
            x - MARKER,
            y + MARKER,
            x + MARKER,
            y + MARKER
        ),
        TradeType::Sell => format!(
            r##"<polygon class="sell" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="#c62828"/>"##,
            x,
            y + MARKER,
            x - MARKER,
            y - MARKER,
            x + MARKER,
            y - MARKER
        ),
    }
}

/// Render a standalone SVG document. Each trade gets a marker at its entry.
pub fn format_trade_chart(prices: &PriceSeries, ledger: &TradeLedger) -> String {
    let Some(frame) = Frame::new(prices) else {
        return format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}"><text x="{PADDING:.0}" y="{PADDING:.0}">No price data available.</text></svg>"#
        );
    };

    let line: Vec<String> = prices
        .into_iter()
        .map(|p| format!("{:.1},{:.1}", frame.x(p.timestamp), frame.y(p.close)))
        .collect();

    let mut lines = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
        ),
        r#"<rect width="100%" height="100%" fill="white"/>"#.to_string(),
        format!(
            r#"<line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{b:.0}" stroke="black"/>"#,
            p = PADDING,
            b = HEIGHT - PADDING
        ),
        format!(
            r#"<line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="black"/>"#,
            p = PADDING,
            b = HEIGHT - PADDING,
            r = WIDTH - PADDING
        ),
        format!(
            r#"<polyline fill="none" stroke="steelblue" stroke-width="1" points="{}"/>"#,
            line.join(" ")
        ),
    ];
    lines.extend(
        ledger
            .iter()
            .map(|trade| marker(trade.trade_type, frame.x(trade.timestamp), frame.y(trade.entry_price))),
    );
    lines.push(format!(
        r#"<text x="{PADDING:.0}" y="20">Trades ({}), final PnL {:.2}</text>"#,
        ledger.len(),
        ledger.final_pnl()
    ));
    lines.push("</svg>".to_string());

    let mut svg = lines.join("\n");
    svg.push('\n');
    svg
}

impl ReportPort for SvgReportAdapter {
    fn write(
        &self,
        prices: &PriceSeries,
        ledger: &TradeLedger,
        output_path: &str,
    ) -> Result<(), TraderError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TraderError::Report {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }
        fs::write(path, format_trade_chart(prices, ledger)).map_err(|e| TraderError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })
    }
}
