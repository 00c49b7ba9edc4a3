use signal_core::{
    Bar, BarSeries, FairValueGap, GapKind, LiquiditySweep, StructureConfig, StructureSnapshot,
    SwingRange,
};

/// Swing range from raw extremes of the slice. No smoothing, no outlier
/// rejection: a single wick defines the boundary, the way a discretionary
/// trader would draw it. None when the slice is empty or the extremes are
/// unusable.
pub fn swing_range(bars: &[Bar]) -> Option<SwingRange> {
    if bars.is_empty() {
        return None;
    }
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    if !high.is_finite() || !low.is_finite() || high < low {
        return None;
    }
    Some(SwingRange::new(high, low))
}

/// All three-bar imbalances in the slice, oldest first.
///
/// Bullish: a bar whose low clears the high two bars back leaves untraded
/// space between them. Bearish is the mirror image.
pub fn detect_gaps(bars: &[Bar]) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();
    for i in 2..bars.len() {
        if bars[i].low > bars[i - 2].high {
            gaps.push(FairValueGap {
                kind: GapKind::Bullish,
                top: bars[i].low,
                bottom: bars[i - 2].high,
                anchor: i,
            });
        } else if bars[i].high < bars[i - 2].low {
            gaps.push(FairValueGap {
                kind: GapKind::Bearish,
                top: bars[i - 2].low,
                bottom: bars[i].high,
                anchor: i,
            });
        }
    }
    gaps
}

/// Picks the entry candidate among bullish gaps: newest first, top strictly
/// below equilibrium. A gap sitting exactly at equilibrium does not qualify.
pub fn entry_gap(gaps: &[FairValueGap], equilibrium: f64) -> Option<FairValueGap> {
    gaps.iter()
        .rev()
        .find(|g| g.kind == GapKind::Bullish && g.top < equilibrium)
        .copied()
}

/// Breach-and-reclaim detection over the last `recent` bars.
///
/// Reference = lowest low of up to `depth` bars immediately before the
/// recent set. A recent bar that trades below the reference but closes back
/// above it swept the liquidity resting there. Bars are checked oldest to
/// newest and the first hit wins.
pub fn detect_sweep(bars: &[Bar], recent: usize, depth: usize) -> Option<LiquiditySweep> {
    if recent == 0 || bars.len() < recent + 1 {
        return None;
    }
    let split = bars.len() - recent;
    let reference = bars[split.saturating_sub(depth)..split]
        .iter()
        .map(|b| b.low)
        .fold(f64::INFINITY, f64::min);
    if !reference.is_finite() {
        return None;
    }
    for (i, bar) in bars[split..].iter().enumerate() {
        if bar.low < reference && bar.close > reference {
            return Some(LiquiditySweep {
                level: reference,
                bar_offset: recent - 1 - i,
            });
        }
    }
    None
}

/// Indices of candles whose body dwarfs the rolling average body. The
/// average window includes the candle itself.
pub fn displacement_bars(bars: &[Bar], period: usize, factor: f64) -> Vec<usize> {
    if period == 0 || bars.len() < period {
        return vec![];
    }
    let bodies: Vec<f64> = bars.iter().map(|b| b.body()).collect();
    let mut out = Vec::new();
    for i in period - 1..bodies.len() {
        let avg = bodies[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        if bodies[i] > avg * factor {
            out.push(i);
        }
    }
    out
}

/// Equal highs and equal lows: pivot extremes (center of a 2w+1 window)
/// whose prices match another pivot within the relative tolerance. Each
/// cluster is reported once, as the midpoint of the first matching pair.
pub fn equal_levels(bars: &[Bar], pivot_window: usize, tolerance: f64) -> (Vec<f64>, Vec<f64>) {
    let w = pivot_window;
    if w == 0 || bars.len() < 2 * w + 1 {
        return (vec![], vec![]);
    }
    let mut pivot_highs = Vec::new();
    let mut pivot_lows = Vec::new();
    for i in w..bars.len() - w {
        let window = &bars[i - w..=i + w];
        if window.iter().all(|b| b.high <= bars[i].high) {
            pivot_highs.push(bars[i].high);
        }
        if window.iter().all(|b| b.low >= bars[i].low) {
            pivot_lows.push(bars[i].low);
        }
    }
    (
        near_equal_levels(&pivot_highs, tolerance),
        near_equal_levels(&pivot_lows, tolerance),
    )
}

fn near_equal_levels(levels: &[f64], tolerance: f64) -> Vec<f64> {
    let mut marked: Vec<f64> = Vec::new();
    let mut out = Vec::new();
    for (i, &a) in levels.iter().enumerate() {
        for (j, &b) in levels.iter().enumerate() {
            if i == j {
                continue;
            }
            if (a - b).abs() / a < tolerance
                && !marked.iter().any(|&m| (m - a).abs() / a < tolerance)
            {
                out.push((a + b) / 2.0);
                marked.push(a);
            }
        }
    }
    out
}

/// Runs every structure detector over the trailing swing window and bundles
/// the findings. Falls back to a ±5% band around the last close if the
/// window cannot produce a range, so later stages always have levels to
/// work with.
pub fn analyze_structure(series: &BarSeries, config: &StructureConfig) -> StructureSnapshot {
    let bars = series.bars();
    let start = bars.len().saturating_sub(config.swing_window);
    let window = &bars[start..];

    let (range, fallback_range) = match swing_range(window) {
        Some(range) => (range, false),
        None => (SwingRange::degenerate(series.last_close()), true),
    };

    let gaps = detect_gaps(window);
    let entry = entry_gap(&gaps, range.equilibrium);
    let sweep = detect_sweep(window, config.sweep_recent_bars, config.sweep_reference_depth);
    let displacement =
        displacement_bars(window, config.displacement_period, config.displacement_factor);
    let (equal_highs, equal_lows) =
        equal_levels(window, config.pivot_window, config.equal_level_tolerance);

    StructureSnapshot {
        range,
        fallback_range,
        gaps,
        entry_gap: entry,
        sweep,
        displacement_bars: displacement,
        equal_highs,
        equal_lows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(i as i64 * 86_400, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1_000_000.0,
        }
    }

    fn flat_bars(count: usize, price: f64) -> Vec<Bar> {
        (0..count)
            .map(|i| bar(i, price, price + 1.0, price - 1.0, price))
            .collect()
    }

    #[test]
    fn test_swing_range_uses_raw_extremes() {
        let mut bars = flat_bars(10, 100.0);
        bars[3].high = 120.0; // single wick defines the top
        bars[7].low = 80.0;
        let range = swing_range(&bars).unwrap();
        assert_eq!(range.high, 120.0);
        assert_eq!(range.low, 80.0);
        assert_eq!(range.equilibrium, 100.0);
    }

    #[test]
    fn test_swing_range_empty_slice_is_none() {
        assert!(swing_range(&[]).is_none());
    }

    #[test]
    fn test_detects_bullish_gap_geometry() {
        let mut bars = flat_bars(5, 100.0);
        // bar 2 high = 101, bar 4 low must clear it
        bars[4] = bar(4, 103.0, 105.0, 102.0, 104.0);
        let gaps = detect_gaps(&bars);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, GapKind::Bullish);
        assert_eq!(gaps[0].top, 102.0);
        assert_eq!(gaps[0].bottom, 101.0);
        assert_eq!(gaps[0].anchor, 4);
    }

    #[test]
    fn test_detects_bearish_gap_geometry() {
        let mut bars = flat_bars(5, 100.0);
        // bar 2 low = 99, bar 4 high must stay under it
        bars[4] = bar(4, 97.0, 98.0, 95.0, 96.0);
        let gaps = detect_gaps(&bars);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, GapKind::Bearish);
        assert_eq!(gaps[0].top, 99.0);
        assert_eq!(gaps[0].bottom, 98.0);
    }

    #[test]
    fn test_entry_gap_prefers_newest_below_equilibrium() {
        let gaps = vec![
            FairValueGap {
                kind: GapKind::Bullish,
                top: 90.0,
                bottom: 88.0,
                anchor: 10,
            },
            FairValueGap {
                kind: GapKind::Bullish,
                top: 95.0,
                bottom: 93.0,
                anchor: 20,
            },
            FairValueGap {
                kind: GapKind::Bullish,
                top: 104.0,
                bottom: 102.0,
                anchor: 30,
            },
        ];
        // the newest gap sits above equilibrium and is ignored
        let selected = entry_gap(&gaps, 100.0).unwrap();
        assert_eq!(selected.anchor, 20);
        assert_eq!(selected.top, 95.0);
    }

    #[test]
    fn test_entry_gap_at_equilibrium_is_excluded() {
        let gaps = vec![FairValueGap {
            kind: GapKind::Bullish,
            top: 100.0,
            bottom: 98.0,
            anchor: 5,
        }];
        assert!(entry_gap(&gaps, 100.0).is_none());
    }

    #[test]
    fn test_entry_gap_ignores_bearish_gaps() {
        let gaps = vec![FairValueGap {
            kind: GapKind::Bearish,
            top: 95.0,
            bottom: 93.0,
            anchor: 5,
        }];
        assert!(entry_gap(&gaps, 100.0).is_none());
    }

    #[test]
    fn test_sweep_requires_breach_and_reclaim() {
        // 10 reference bars with a 95 floor, then 3 recent bars
        let mut bars = flat_bars(13, 100.0);
        for b in bars.iter_mut().take(10) {
            b.low = 95.0;
        }
        // last bar dips under the floor and closes back above it
        bars[12] = bar(12, 96.0, 101.0, 93.0, 99.0);
        let sweep = detect_sweep(&bars, 3, 10).unwrap();
        assert_eq!(sweep.level, 95.0);
        assert_eq!(sweep.bar_offset, 0);
    }

    #[test]
    fn test_breach_without_reclaim_is_not_a_sweep() {
        let mut bars = flat_bars(13, 100.0);
        for b in bars.iter_mut().take(10) {
            b.low = 95.0;
        }
        // dips under and stays under
        bars[12] = bar(12, 96.0, 96.5, 93.0, 94.0);
        assert!(detect_sweep(&bars, 3, 10).is_none());
    }

    #[test]
    fn test_sweep_first_qualifying_bar_wins() {
        let mut bars = flat_bars(13, 100.0);
        for b in bars.iter_mut().take(10) {
            b.low = 95.0;
        }
        // both of the last two bars qualify; the older one is reported
        bars[11] = bar(11, 96.0, 101.0, 94.0, 99.0);
        bars[12] = bar(12, 96.0, 101.0, 93.0, 99.0);
        let sweep = detect_sweep(&bars, 3, 10).unwrap();
        assert_eq!(sweep.bar_offset, 1);
    }

    #[test]
    fn test_sweep_needs_reference_bars() {
        let bars = flat_bars(3, 100.0);
        assert!(detect_sweep(&bars, 3, 10).is_none());
    }

    #[test]
    fn test_sweep_detection_is_idempotent() {
        let mut bars = flat_bars(13, 100.0);
        for b in bars.iter_mut().take(10) {
            b.low = 95.0;
        }
        bars[12] = bar(12, 96.0, 101.0, 93.0, 99.0);
        let first = detect_sweep(&bars, 3, 10);
        let second = detect_sweep(&bars, 3, 10);
        assert_eq!(first.map(|s| (s.level, s.bar_offset)), second.map(|s| (s.level, s.bar_offset)));
    }

    #[test]
    fn test_displacement_flags_oversized_bodies() {
        // steady 1-point bodies, then one 10-point candle
        let mut bars: Vec<Bar> = (0..25)
            .map(|i| bar(i, 100.0, 101.5, 99.5, 101.0))
            .collect();
        bars[24] = bar(24, 100.0, 111.0, 99.5, 110.0);
        let hits = displacement_bars(&bars, 20, 2.5);
        assert_eq!(hits, vec![24]);
    }

    #[test]
    fn test_equal_highs_cluster_within_tolerance() {
        // two pivot highs 0.05% apart, well inside the 0.2% tolerance
        let mut bars = flat_bars(30, 100.0);
        bars[8].high = 110.0;
        bars[20].high = 110.05;
        let (eqh, eql) = equal_levels(&bars, 5, 0.002);
        assert_eq!(eqh.len(), 1);
        assert!((eqh[0] - 110.025).abs() < 1e-9);
        // every flat low ties at 99, forming one equal-low cluster
        assert!(!eql.is_empty());
    }

    #[test]
    fn test_distant_pivots_are_not_equal() {
        let mut bars = flat_bars(30, 100.0);
        bars[8].high = 110.0;
        bars[20].high = 115.0;
        let (eqh, _) = equal_levels(&bars, 5, 0.002);
        assert!(eqh.is_empty());
    }

    #[test]
    fn test_structure_snapshot_on_minimal_series() {
        // single bar still produces a usable range from the real extremes
        let series = BarSeries::new("TEST", signal_core::Timeframe::Day1, flat_bars(1, 100.0))
            .unwrap();
        let snapshot = analyze_structure(&series, &StructureConfig::default());
        assert!(!snapshot.fallback_range);
        assert_eq!(snapshot.range.high, 101.0);
        assert_eq!(snapshot.range.low, 99.0);
        assert!(snapshot.sweep.is_none());
        assert!(snapshot.entry_gap.is_none());
    }
}
