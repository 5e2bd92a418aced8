//! ASCII plotting of CSF curves for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a simulated session
//! - deterministic output
//!
//! Both axes are logarithmic (frequency in cpd, sensitivity in 1/contrast).
//!
//! Plot elements:
//! - estimated CSF: `-` line
//! - true CSF (simulations): `=` line
//! - responses: `o` (correct), `x` (incorrect)

use crate::domain::TrialRecord;
use crate::models::csf_curve;

/// Axis ranges of a CSF plot (linear units; drawn on log axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRange {
    pub frequency_min: f64,
    pub frequency_max: f64,
    pub sensitivity_min: f64,
    pub sensitivity_max: f64,
}

impl Default for PlotRange {
    fn default() -> Self {
        Self {
            frequency_min: 0.25,
            frequency_max: 64.0,
            sensitivity_min: 1.0,
            sensitivity_max: 400.0,
        }
    }
}

/// Render estimated (and optionally true) CSF with response markers.
///
/// `estimate` and `truth` are parameter-grid indices.
pub fn render_csf_plot(
    estimate: [f64; 4],
    truth: Option<[f64; 4]>,
    history: &[TrialRecord],
    range: PlotRange,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let x_min = range.frequency_min.log10();
    let x_max = range.frequency_max.log10();
    let y_min = range.sensitivity_min.log10();
    let y_max = range.sensitivity_max.log10();

    let frequencies = sample_frequencies(range.frequency_min, range.frequency_max, width * 2);

    let mut grid = vec![vec![' '; width]; height];

    // Estimate first so it stays visible where the curves overlap.
    let estimated = to_points(&frequencies, &csf_curve(estimate, &frequencies));
    draw_curve(&mut grid, &estimated, (x_min, x_max), (y_min, y_max), '-');
    if let Some(truth) = truth {
        let actual = to_points(&frequencies, &csf_curve(truth, &frequencies));
        draw_curve(&mut grid, &actual, (x_min, x_max), (y_min, y_max), '=');
    }

    for record in history {
        let x = map_x(record.stimulus.frequency.log10(), x_min, x_max, width);
        let y = map_y(record.stimulus.sensitivity().log10(), y_min, y_max, height);
        grid[y][x] = if record.correct { 'o' } else { 'x' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: frequency=[{:.2}, {:.2}] cpd | sensitivity=[{:.1}, {:.1}] (log-log)\n",
        range.frequency_min,
        range.frequency_max,
        range.sensitivity_min,
        range.sensitivity_max
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn sample_frequencies(min: f64, max: f64, n: usize) -> Vec<f64> {
    let n = n.max(2);
    let (lo, hi) = (min.log10(), max.log10());
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            10f64.powf(lo + u * (hi - lo))
        })
        .collect()
}

fn to_points(frequencies: &[f64], sensitivities: &[f64]) -> Vec<(f64, f64)> {
    frequencies
        .iter()
        .zip(sensitivities.iter())
        .map(|(f, s)| (f.log10(), s.log10()))
        .collect()
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x: (f64, f64),
    y: (f64, f64),
    ch: char,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(cx, cy) in curve {
        let px = map_x(cx, x.0, x.1, width);
        let py = map_y(cy, y.0, y.1, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, px, py, ch);
        } else if grid[py][px] == ' ' {
            grid[py][px] = ch;
        }
        prev = Some((px, py));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stimulus;

    #[test]
    fn plot_has_fixed_geometry() {
        let estimate = [18.0, 11.0, 12.0, 11.0];
        let txt = render_csf_plot(estimate, None, &[], PlotRange::default(), 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Plot: frequency=[0.25, 64.00] cpd"));
        let rows = &lines[1..];
        for row in rows {
            assert_eq!(row.chars().count(), 40);
        }
        assert!(rows.iter().any(|r| r.contains('-')));
        // No truth given, so no truth curve in the grid (the header has its own '=').
        assert!(rows.iter().all(|r| !r.contains('=')));
    }

    #[test]
    fn responses_are_marked_at_their_stimulus() {
        let history = vec![
            TrialRecord {
                stimulus: Stimulus {
                    contrast: 1.0,
                    frequency: 0.25,
                },
                correct: true,
            },
            TrialRecord {
                stimulus: Stimulus {
                    contrast: 1.0 / 400.0,
                    frequency: 64.0,
                },
                correct: false,
            },
        ];
        let txt = render_csf_plot(
            [18.0, 11.0, 12.0, 11.0],
            Some([10.0, 8.0, 8.0, 8.0]),
            &history,
            PlotRange::default(),
            30,
            10,
        );
        let rows: Vec<Vec<char>> = txt
            .lines()
            .skip(1)
            .map(|l| l.chars().collect())
            .collect();
        // Sensitivity 1 at the lowest frequency: bottom-left corner.
        assert_eq!(rows[9][0], 'o');
        // Sensitivity 400 at the highest frequency: top-right corner.
        assert_eq!(rows[0][29], 'x');
        assert!(rows.iter().any(|r| r.contains(&'=')));
    }
}
