//! ASCII heatmap of expected information gain over the stimulus grid.
//!
//! Rows are contrast levels (lowest contrast, i.e. highest sensitivity, on top),
//! columns are spatial frequencies (increasing to the right). Each cell is two
//! characters wide and shaded relative to the largest gain in the map.

/// Shades from no gain to the maximum.
const RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Render a flat gain vector (contrast index fastest) as a shaded grid.
pub fn render_gain_map(gains: &[f64], contrasts: &[f64], frequencies: &[f64]) -> String {
    let (nc, nf) = (contrasts.len(), frequencies.len());
    let mut out = String::new();
    if nc == 0 || nf == 0 || gains.len() != nc * nf {
        out.push_str("Expected gain: no data\n");
        return out;
    }

    let (best, max) = gains
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, g)| {
            if g > acc.1 { (i, g) } else { acc }
        });

    out.push_str(&format!(
        "Expected gain (nats): max={:.4} at c={:.5}, f={:.3} cpd\n",
        max,
        contrasts[best % nc],
        frequencies[best / nc],
    ));

    for (ci, contrast) in contrasts.iter().enumerate() {
        out.push_str(&format!("{:>8.1} |", 1.0 / contrast));
        for fi in 0..nf {
            let ch = shade(gains[ci + nc * fi], max);
            out.push(ch);
            out.push(ch);
        }
        out.push('\n');
    }

    out.push_str(&format!("{:>8} +{}\n", "", "-".repeat(2 * nf)));
    out.push_str(&format!(
        "{:>8}  frequency {:.2} .. {:.2} cpd (rows: sensitivity)\n",
        "",
        frequencies[0],
        frequencies[nf - 1],
    ));
    out
}

fn shade(gain: f64, max: f64) -> char {
    if max.is_nan() || max <= 0.0 || !gain.is_finite() {
        return RAMP[0];
    }
    let top = (RAMP.len() - 1) as f64;
    let level = ((gain / max) * top).round().clamp(0.0, top);
    RAMP[level as usize]
}
