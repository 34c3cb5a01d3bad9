//! PNG figures drawn with `plotters`.
//!
//! Amplitudes are drawn in µV and densities in dB re 1 µV²/Hz.
use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use super::topomap::{head_radius, interpolate_idw, projected, rdbu, spatial_color, symmetric_limit};
use crate::evoked::Evoked;
use crate::ica::IcaModel;
use crate::psd::Spectrum;

type DrawResult = std::result::Result<(), Box<dyn Error>>;

const UV: f64 = 1e6;
const TOPO_RES: usize = 48;

/// `(lo, hi)` covering every finite value, padded by 5 %; `(-1, 1)` if empty.
pub fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad, hi + pad)
}

/// Per-channel PSD curves in dB.
pub fn draw_psd(path: &Path, spectrum: &Spectrum, title: &str) -> DrawResult {
    let db: Vec<Vec<f64>> = spectrum
        .psd
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&p| 10.0 * (p * UV * UV).max(1e-30).log10()).collect())
        .collect();
    let (y_lo, y_hi) = padded_range(db.iter().flatten().copied());
    let f_lo = spectrum.freqs.first().copied().unwrap_or(0.0);
    let f_hi = spectrum.freqs.last().copied().unwrap_or(1.0).max(f_lo + 1e-9);

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(f_lo..f_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Frequency (Hz)")
        .y_desc("µV²/Hz (dB)")
        .draw()?;

    for row in &db {
        chart.draw_series(LineSeries::new(
            spectrum.freqs.iter().copied().zip(row.iter().copied()),
            BLACK.mix(0.35),
        ))?;
    }
    root.present()?;
    Ok(())
}

/// All channels overlaid in black, sample index on x.
pub fn draw_traces(path: &Path, data: ndarray::ArrayView2<f64>, title: &str) -> DrawResult {
    let n_t = data.ncols();
    let (y_lo, y_hi) = padded_range(data.iter().map(|v| v * UV));

    let root = BitMapBackend::new(path, (1500, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0..n_t.max(1), y_lo..y_hi)?;
    chart.configure_mesh().x_desc("Sample").y_desc("µV").draw()?;

    for row in data.rows() {
        chart.draw_series(LineSeries::new(
            row.iter().enumerate().map(|(i, &v)| (i, v * UV)),
            BLACK.stroke_width(1),
        ))?;
    }
    root.present()?;
    Ok(())
}

/// Evoked waveform with one colour per electrode position.
pub fn draw_erp(path: &Path, evoked: &Evoked, title: &str) -> DrawResult {
    draw_waveforms(path, evoked, title, |c| spatial_color(evoked.positions[c]).to_rgba())
}

/// Evoked butterfly plot with a dashed line at stimulus onset.
pub fn draw_butterfly(path: &Path, evoked: &Evoked, title: &str) -> DrawResult {
    draw_waveforms(path, evoked, title, |c| Palette99::pick(c).to_rgba())
}

fn draw_waveforms<F>(path: &Path, evoked: &Evoked, title: &str, color: F) -> DrawResult
where
    F: Fn(usize) -> RGBAColor,
{
    let t_lo = evoked.times.first().copied().unwrap_or(0.0);
    let t_hi = evoked.times.last().copied().unwrap_or(1.0).max(t_lo + 1e-9);
    let (y_lo, y_hi) = padded_range(evoked.data.iter().map(|v| v * UV));

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{title} (N={})", evoked.nave), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(t_lo..t_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Amplitude (µV)")
        .draw()?;

    // Dashed onset marker.
    let n_dash = 40;
    let dash = (y_hi - y_lo) / (2 * n_dash) as f64;
    chart.draw_series((0..n_dash).map(|i| {
        let y0 = y_lo + (2 * i) as f64 * dash;
        PathElement::new(vec![(0.0, y0), (0.0, y0 + dash)], BLACK)
    }))?;

    for (c, row) in evoked.data.rows().into_iter().enumerate() {
        chart.draw_series(LineSeries::new(
            evoked.times.iter().copied().zip(row.iter().map(|v| v * UV)),
            color(c),
        ))?;
    }
    root.present()?;
    Ok(())
}

/// Grid of component scalp maps; excluded components get a red title.
pub fn draw_topographies(path: &Path, model: &IcaModel, excluded: &[usize]) -> DrawResult {
    let k = model.n_components();
    let cols = (k as f64).sqrt().ceil().max(1.0) as usize;
    let rows = k.div_ceil(cols).max(1);
    let mixing = model.mixing_matrix();
    let channels = projected(&model.positions);
    let points: Vec<[f64; 2]> = channels.iter().map(|(_, p)| *p).collect();
    let radius = head_radius(&points);

    let root = BitMapBackend::new(path, (220 * cols as u32, 240 * rows as u32)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((rows, cols));

    for (comp, panel) in panels.iter().enumerate().take(k) {
        let title = format!("ICA{comp:03}");
        let style = if excluded.contains(&comp) {
            ("sans-serif", 16).into_font().color(&RED)
        } else {
            ("sans-serif", 16).into_font().color(&BLACK)
        };
        let mut chart = ChartBuilder::on(panel)
            .caption(title, style)
            .margin(8)
            .build_cartesian_2d(-radius..radius, -radius..radius)?;

        if points.len() < 3 {
            chart.draw_series(std::iter::once(Text::new(
                "no positions",
                (-radius * 0.6, 0.0),
                ("sans-serif", 14),
            )))?;
            continue;
        }

        let values: Vec<f64> = channels.iter().map(|(ch, _)| mixing[[*ch, comp]]).collect();
        let lim = symmetric_limit(&values);
        let grid = interpolate_idw(&points, &values, TOPO_RES, radius);
        let step = 2.0 * radius / (TOPO_RES - 1) as f64;
        chart.draw_series(grid.iter().enumerate().flat_map(|(iy, row)| {
            row.iter().enumerate().filter_map(move |(ix, v)| {
                v.map(|v| {
                    let x = -radius + ix as f64 * step;
                    let y = -radius + iy as f64 * step;
                    Rectangle::new(
                        [(x - step / 2.0, y - step / 2.0), (x + step / 2.0, y + step / 2.0)],
                        rdbu(v / lim).filled(),
                    )
                })
            })
        }))?;

        // Head outline and nose.
        let outline: Vec<(f64, f64)> = (0..=100)
            .map(|i| {
                let a = i as f64 / 100.0 * std::f64::consts::TAU;
                (radius * 0.98 * a.cos(), radius * 0.98 * a.sin())
            })
            .collect();
        chart.draw_series(std::iter::once(PathElement::new(outline, BLACK)))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(-0.1 * radius, 0.97 * radius), (0.0, 1.0 * radius), (0.1 * radius, 0.97 * radius)],
            BLACK,
        )))?;
        chart.draw_series(points.iter().map(|p| Circle::new((p[0], p[1]), 1, BLACK.filled())))?;
    }
    root.present()?;
    Ok(())
}
