//! Tick generation and domain "nicing" for numeric scales
//!
//! Step sizes are 1, 2 or 5 times a power of ten. Steps below 1 are carried as
//! their negated reciprocal (`-10` for 0.1) so that tick values are produced by
//! division and land on exact decimals.

/// Tick count used when `nice: true` or `ticks()` is asked without a count
pub const DEFAULT_TICK_COUNT: usize = 10;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

fn step_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

/// `(first index, last index, increment)` of the ticks covering `[start, stop]`
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = step_factor(error);

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scale = 10f64.powf(-power) / factor;
        i1 = (start * scale).round();
        i2 = (stop * scale).round();
        if i1 / scale < start {
            i1 += 1.0;
        }
        if i2 / scale > stop {
            i2 -= 1.0;
        }
        inc = -scale;
    } else {
        let scale = 10f64.powf(power) * factor;
        i1 = (start / scale).round();
        i2 = (stop / scale).round();
        if i1 * scale < start {
            i1 += 1.0;
        }
        if i2 * scale > stop {
            i2 -= 1.0;
        }
        inc = scale;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Step between ticks; negative values are negated reciprocals
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_spec(start, stop, count as f64).2
}

/// Signed step between ticks, as a plain number
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let reverse = stop < start;
    let inc = if reverse {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let step = if inc < 0.0 { 1.0 / -inc } else { inc };
    if reverse {
        -step
    } else {
        step
    }
}

/// Roughly `count` evenly spaced round values within `[start, stop]`
///
/// Ticks follow the orientation of the arguments.
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count as f64)
    } else {
        tick_spec(start, stop, count as f64)
    };
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1) as usize + 1;
    let value = |i: f64| if inc < 0.0 { i / -inc } else { i * inc };
    if reverse {
        (0..n).map(|k| value(i2 - k as f64)).collect()
    } else {
        (0..n).map(|k| value(i1 + k as f64)).collect()
    }
}

/// Extend `[start, stop]` outward to tick boundaries, preserving orientation
pub fn linear_nice(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let reverse = stop < start;
    let (mut lo, mut hi) = if reverse { (stop, start) } else { (start, stop) };
    if !lo.is_finite() || !hi.is_finite() || lo == hi {
        return (start, stop);
    }

    // bounds are only committed once the step stops changing
    let mut previous = None;
    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if !step.is_finite() || step == 0.0 {
            break;
        }
        if previous == Some(step) {
            return if reverse { (hi, lo) } else { (lo, hi) };
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        }
        previous = Some(step);
    }
    (start, stop)
}

fn log_with_base(x: f64, base: f64) -> f64 {
    if base == 10.0 {
        x.log10()
    } else if base == 2.0 {
        x.log2()
    } else if base == std::f64::consts::E {
        x.ln()
    } else {
        x.ln() / base.ln()
    }
}

fn pow_with_base(x: f64, base: f64) -> f64 {
    if x.fract() == 0.0 && x.abs() <= 22.0 {
        base.powi(x as i32)
    } else {
        base.powf(x)
    }
}

/// Logarithm for a log scale; negative domains are reflected
pub fn log_transform(x: f64, base: f64, reflect: bool) -> f64 {
    if reflect {
        -log_with_base(-x, base)
    } else {
        log_with_base(x, base)
    }
}

/// Inverse of [`log_transform`]
pub fn log_inverse(y: f64, base: f64, reflect: bool) -> f64 {
    if reflect {
        -pow_with_base(-y, base)
    } else {
        pow_with_base(y, base)
    }
}

/// Extend a log domain outward to whole powers of `base`
pub fn log_nice(start: f64, stop: f64, base: f64) -> (f64, f64) {
    let reflect = start.min(stop) < 0.0;
    let floor = |x: f64| log_inverse(log_transform(x, base, reflect).floor(), base, reflect);
    let ceil = |x: f64| log_inverse(log_transform(x, base, reflect).ceil(), base, reflect);
    if stop < start {
        (ceil(start), floor(stop))
    } else {
        (floor(start), ceil(stop))
    }
}

/// Ticks for a log domain: every integer multiple of each power of `base` when
/// the domain spans few powers, otherwise the powers themselves
pub fn log_ticks(start: f64, stop: f64, base: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    let reverse = stop < start;
    let (u, v) = if reverse { (stop, start) } else { (start, stop) };
    let reflect = u < 0.0;
    let i = log_transform(u, base, reflect);
    let j = log_transform(v, base, reflect);
    if !i.is_finite() || !j.is_finite() {
        return Vec::new();
    }
    let n = count as f64;
    let pow = |e: f64| pow_with_base(e, base);

    let mut ticks = Vec::new();
    if base.fract() == 0.0 && j - i < n {
        let (lo, hi) = (i.floor() as i32, j.ceil() as i32);
        let multiples = base as i32;
        if u > 0.0 {
            'outer: for e in lo..=hi {
                for k in 1..multiples {
                    let t = if e < 0 {
                        k as f64 / pow(-e as f64)
                    } else {
                        k as f64 * pow(e as f64)
                    };
                    if t < u {
                        continue;
                    }
                    if t > v {
                        break 'outer;
                    }
                    ticks.push(t);
                }
            }
        } else {
            'outer_neg: for e in lo..=hi {
                for k in (1..multiples).rev() {
                    let t = if e > 0 {
                        -(k as f64) / pow(e as f64)
                    } else {
                        -(k as f64) * pow(-e as f64)
                    };
                    if t < u {
                        continue;
                    }
                    if t > v {
                        break 'outer_neg;
                    }
                    ticks.push(t);
                }
            }
        }
        if ticks.len() * 2 < count {
            ticks = linear_ticks(u, v, count);
        }
    } else {
        let exponent_count = ((j - i).floor() as usize).clamp(1, count);
        ticks = linear_ticks(i, j, exponent_count)
            .into_iter()
            .map(|e| if reflect { -pow(-e) } else { pow(e) })
            .collect();
    }

    if reverse {
        ticks.reverse();
    }
    ticks
}

/// Index of the first element of `sorted` greater than `x`
pub fn bisect_right(sorted: &[f64], x: f64) -> usize {
    sorted.partition_point(|v| *v <= x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_increment() {
        assert_eq!(tick_increment(0.0, 10.0, 10), 1.0);
        assert_eq!(tick_increment(0.0, 100.0, 10), 10.0);
        assert_eq!(tick_increment(0.0, 1.0, 10), -10.0);
        assert_eq!(tick_increment(0.0, 1.0, 5), -5.0);
        assert_eq!(tick_step(10.0, 0.0, 5), -2.0);
    }

    #[test]
    fn test_linear_ticks() {
        assert_eq!(linear_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(linear_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(linear_ticks(10.0, 0.0, 5), vec![10.0, 8.0, 6.0, 4.0, 2.0, 0.0]);
        assert_eq!(linear_ticks(1.0, 1.0, 5), vec![1.0]);
        assert!(linear_ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_linear_nice() {
        assert_eq!(linear_nice(0.5, 9.5, 10), (0.0, 10.0));
        assert_eq!(linear_nice(3.0, 97.0, 10), (0.0, 100.0));
        assert_eq!(linear_nice(97.0, 3.0, 10), (100.0, 0.0));
        assert_eq!(linear_nice(0.12, 0.87, 10), (0.1, 0.9));
        assert_eq!(linear_nice(0.0, 10.0, 10), (0.0, 10.0));
    }

    #[test]
    fn test_linear_nice_degenerate_domain() {
        assert_eq!(linear_nice(5.0, 5.0, 10), (5.0, 5.0));
        assert_eq!(linear_nice(0.0, 0.0, 10), (0.0, 0.0));
        assert_eq!(linear_nice(1.0, 9.0, 0), (1.0, 9.0));
        let (lo, hi) = linear_nice(f64::NAN, 1.0, 10);
        assert!(lo.is_nan());
        assert_eq!(hi, 1.0);
    }

    #[test]
    fn test_log_transform_round_trip() {
        assert_eq!(log_transform(100.0, 10.0, false), 2.0);
        assert_eq!(log_inverse(2.0, 10.0, false), 100.0);
        assert_eq!(log_transform(-100.0, 10.0, true), -2.0);
        assert_eq!(log_inverse(-2.0, 10.0, true), -100.0);
        assert_eq!(log_transform(8.0, 2.0, false), 3.0);
    }

    #[test]
    fn test_log_nice() {
        assert_eq!(log_nice(2.0, 80.0, 10.0), (1.0, 100.0));
        assert_eq!(log_nice(80.0, 2.0, 10.0), (100.0, 1.0));
        assert_eq!(log_nice(-80.0, -2.0, 10.0), (-100.0, -1.0));
        assert_eq!(log_nice(3.0, 9.0, 2.0), (2.0, 16.0));
    }

    #[test]
    fn test_log_ticks() {
        let ticks = log_ticks(1.0, 100.0, 10.0, 10);
        assert_eq!(ticks.first(), Some(&1.0));
        assert_eq!(ticks.last(), Some(&100.0));
        assert!(ticks.contains(&20.0));
        assert_eq!(ticks.len(), 19);

        let wide = log_ticks(1.0, 1e12, 10.0, 5);
        assert_eq!(wide.len(), 7);
        assert_eq!(wide[1], 100.0);
        assert_eq!(wide.first(), Some(&1.0));
        assert_eq!(wide.last(), Some(&1e12));
    }

    #[test]
    fn test_log_ticks_negative_domain() {
        let ticks = log_ticks(-100.0, -1.0, 10.0, 10);
        assert_eq!(ticks.first(), Some(&-100.0));
        assert_eq!(ticks.last(), Some(&-1.0));
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bisect_right() {
        let sorted = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(bisect_right(&sorted, 0.0), 0);
        assert_eq!(bisect_right(&sorted, 2.0), 3);
        assert_eq!(bisect_right(&sorted, 5.0), 4);
    }
}
