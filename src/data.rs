//! Example numbers behind every figure.
//!
//! Everything here is literal: three providers, their equilibrium allocation,
//! utilities and cost breakdown, plus the utility and price curves.

/// Provider labels, in plotting order
pub const PROVIDERS: [&str; 3] = ["P1", "P2", "P3"];

/// VMs allocated per provider at equilibrium
pub const VM_ALLOCATION: [u32; 3] = [20, 20, 20];

/// Provider utility at equilibrium
pub const UTILITIES: [u32; 3] = [280, 250, 220];

pub const REVENUE: [f64; 3] = [120.0, 150.0, 180.0];
pub const USAGE_COST: [f64; 3] = [200.0, 180.0, 150.0];
pub const FIXED_COST: [f64; 3] = [50.0, 50.0, 50.0];

/// Shift (in VMs) applied to the utility curve of each provider
pub const UTILITY_SHIFTS: [f64; 3] = [0.0, 2.0, 4.0];

/// Sampling of the utility curves: `UTILITY_SAMPLES` points over `UTILITY_RANGE`
pub const UTILITY_RANGE: (f64, f64) = (0.0, 20.0);
pub const UTILITY_SAMPLES: usize = 100;

/// Total VM counts the price function is plotted over (inclusive)
pub const PRICE_VMS: std::ops::RangeInclusive<u32> = 0..=60;

/// Allocation above which the price stays flat
pub const PRICE_KNEE: f64 = 50.0;
pub const PRICE_FLOOR: f64 = 20.0;

/// Logarithmic utility of holding `vms` VMs.
///
/// Returns `None` where the logarithm is undefined (`vms <= -1`).
pub fn utility(vms: f64) -> Option<f64> {
    let arg = vms + 1.0;
    if arg > 0.0 {
        Some(100.0 * arg.ln())
    } else {
        None
    }
}

/// Price per VM given the total number of VMs allocated
pub fn price(vms: f64) -> f64 {
    if vms < PRICE_KNEE {
        100.0 - vms * 1.6
    } else {
        PRICE_FLOOR
    }
}

/// `n` evenly spaced samples from `start` to `end`, both included
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Utility curve of one provider as `(vms, utility)` points.
///
/// Samples where the shifted utility is undefined are dropped.
pub fn utility_curve(shift: f64) -> Vec<(f64, f64)> {
    let (start, end) = UTILITY_RANGE;
    linspace(start, end, UTILITY_SAMPLES)
        .into_iter()
        .filter_map(|x| utility(x - shift).map(|u| (x, u)))
        .filter(|(_, u)| u.is_finite())
        .collect()
}

/// Price curve as `(total_vms, price)` points
pub fn price_curve() -> Vec<(f64, f64)> {
    PRICE_VMS
        .map(|v| {
            let v = v as f64;
            (v, price(v))
        })
        .collect()
}

/// Bottom of each stacked layer, per provider.
///
/// The first layer sits on zero, every following layer on the running total
/// of the layers below it.
pub fn stack_offsets<const N: usize>(layers: &[[f64; N]]) -> Vec<[f64; N]> {
    let mut offsets = Vec::with_capacity(layers.len());
    let mut running = [0.0; N];
    for layer in layers {
        offsets.push(running);
        for (acc, v) in running.iter_mut().zip(layer.iter()) {
            *acc += v;
        }
    }
    offsets
}
