//! Resampling of daily bars into weekly and monthly bars.

use chrono::Datelike;

use super::bar::{with_change_percent, Bar};
use crate::types::PivotTimeframe;

/// Bucket key for a bar under `timeframe`: ISO (year, week) for weekly,
/// (year, month) for monthly, calendar day for daily.
fn bucket_key(bar: &Bar, timeframe: PivotTimeframe) -> (i32, u32, u32) {
    let date = bar.timestamp.date_naive();
    match timeframe {
        PivotTimeframe::Daily => (date.year(), date.month(), date.day()),
        PivotTimeframe::Weekly => {
            let week = date.iso_week();
            (week.year(), week.week(), 0)
        }
        PivotTimeframe::Monthly => (date.year(), date.month(), 0),
    }
}

/// Aggregate `bars` (oldest first) into bars of `timeframe`.
///
/// Each output bar takes the first constituent's timestamp and open, the
/// highest high, the lowest low, the last close and the summed volume.
///
/// The vwap is set only when every constituent carries one: a single-bar
/// bucket keeps its bar's vwap, otherwise it is the volume-weighted mean, or
/// the plain mean when the bucket's total volume is zero.  Change percent is
/// re-derived on the aggregated sequence.
pub fn resample(bars: &[Bar], timeframe: PivotTimeframe) -> Vec<Bar> {
    let mut aggregated: Vec<Bar> = Vec::new();
    let mut current: Option<(Bucket, (i32, u32, u32))> = None;

    for bar in bars {
        let key = bucket_key(bar, timeframe);

        current = match current.take() {
            Some((bucket, open_key)) if open_key == key => Some((bucket.push(bar), open_key)),
            previous => {
                if let Some((bucket, _)) = previous {
                    aggregated.push(bucket.finish());
                }
                Some((Bucket::open(bar), key))
            }
        };
    }

    if let Some((bucket, _)) = current {
        aggregated.push(bucket.finish());
    }

    with_change_percent(aggregated)
}

/// A bar under construction plus the running vwap sums.
struct Bucket {
    bar: Bar,
    count: usize,
    /// Sum of vwap * volume and sum of vwap; `None` once a bar lacks a vwap.
    vwap_sums: Option<(f64, f64)>,
}

impl Bucket {
    fn open(bar: &Bar) -> Self {
        Self {
            bar: bar.clone(),
            count: 1,
            vwap_sums: bar.vwap.map(|v| (v * bar.volume, v)),
        }
    }

    fn push(self, bar: &Bar) -> Self {
        let vwap_sums = match (self.vwap_sums, bar.vwap) {
            (Some((pv, sum)), Some(v)) => Some((pv + v * bar.volume, sum + v)),
            _ => None,
        };
        Self {
            bar: Bar {
                high: self.bar.high.max(bar.high),
                low: self.bar.low.min(bar.low),
                close: bar.close,
                volume: self.bar.volume + bar.volume,
                ..self.bar
            },
            count: self.count + 1,
            vwap_sums,
        }
    }

    fn finish(self) -> Bar {
        if self.count == 1 {
            return self.bar;
        }
        let vwap = self.vwap_sums.map(|(pv, sum)| {
            if self.bar.volume > 0.0 {
                pv / self.bar.volume
            } else {
                sum / self.count as f64
            }
        });
        Bar { vwap, ..self.bar }
    }
}
