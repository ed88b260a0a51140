//! Terminal presentation of each cycle.

use std::io::{self, Write};
use tracing::warn;

use crate::domain::decision_loop::CycleReport;
use crate::ports::report_port::ReportPort;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

pub struct ConsoleReporter<W: Write> {
    out: W,
    clear_screen: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(clear_screen: bool) -> Self {
        Self::new(io::stdout(), clear_screen)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, clear_screen: bool) -> Self {
        Self { out, clear_screen }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_report(&mut self, r: &CycleReport) -> io::Result<()> {
        let out = &mut self.out;
        if self.clear_screen {
            write!(out, "\x1B[2J\x1B[H")?;
        }

        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "{} | {} : {:.2}",
            r.timestamp.format("%H:%M:%S"),
            r.symbol,
            r.price
        )?;
        writeln!(out, "News sentiment: {}", r.decision.news_sentiment)?;
        if r.news_degraded {
            writeln!(out, "(news feed unavailable, placeholder used)")?;
        }
        writeln!(out, "{THIN_RULE}")?;
        writeln!(
            out,
            "Decision: {} | Strategy score: {}",
            r.decision.action, r.ledger.strategy_score
        )?;
        writeln!(out, "Reason: {}", r.decision.reason)?;
        writeln!(out, "Result: {}", r.execution.message)?;
        writeln!(out, "{THIN_RULE}")?;

        writeln!(out, "Position: {}", r.ledger.position)?;
        if let Some(entry) = r.ledger.position.entry_price() {
            let marker = if r.floating_pnl > 0.0 {
                "[+]"
            } else if r.floating_pnl < 0.0 {
                "[-]"
            } else {
                "[=]"
            };
            writeln!(
                out,
                " Floating PnL: {marker} {:+.2}% (entry: {entry})",
                r.floating_pnl
            )?;
        }
        writeln!(out, "Balance: {:.2} U", r.ledger.balance)?;
        if let Some(rate) = r.ledger.win_rate() {
            writeln!(
                out,
                "Trades: {} ({}W/{}L, {:.0}% win rate)",
                r.ledger.trade_history.len(),
                r.ledger.win_count(),
                r.ledger.loss_count(),
                rate * 100.0
            )?;
        }

        if let Some(lesson) = &r.latest_lesson {
            writeln!(out, "{THIN_RULE}")?;
            writeln!(out, "Latest lesson:")?;
            writeln!(out, "{lesson}")?;
        }
        writeln!(out, "{RULE}")?;
        out.flush()
    }
}

impl<W: Write> ReportPort for ConsoleReporter<W> {
    fn report(&mut self, report: &CycleReport) {
        if let Err(e) = self.write_report(report) {
            warn!(error = %e, "failed to write cycle report");
        }
    }
}
