//! `swaptrace replay`

use std::io::Write;

use amm::{SwapKind, TradeRecord};
use anyhow::Result;
use serde::Serialize;

use crate::scenario::Scenario;

/// One output line per replayed call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayLine<'a> {
    index: usize,
    kind: SwapKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a TradeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Replay every call in order, writing one JSON line per call to `out`
pub fn run<W: Write>(scenario: &Scenario, out: &mut W) -> Result<ReplaySummary> {
    let router = scenario.router()?;
    let mut ledger = scenario.build_ledger()?;
    let mut summary = ReplaySummary::default();

    for (index, entry) in scenario.calls.iter().enumerate() {
        let result = router.dispatch(&mut ledger, &entry.caller, &entry.call);
        let line = match &result {
            Ok(outcome) => {
                summary.succeeded += 1;
                ReplayLine {
                    index,
                    kind: entry.call.kind,
                    record: Some(&outcome.record),
                    error: None,
                    message: None,
                }
            }
            Err(e) => {
                summary.failed += 1;
                ReplayLine {
                    index,
                    kind: entry.call.kind,
                    record: None,
                    error: Some(e.error_code()),
                    message: Some(e.to_string()),
                }
            }
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }

    tracing::info!(
        "Replayed {} calls: {} succeeded, {} failed",
        scenario.calls.len(),
        summary.succeeded,
        summary.failed
    );
    Ok(summary)
}
