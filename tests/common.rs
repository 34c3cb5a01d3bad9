/// Shared helpers: synthetic recordings and on-disk BrainVision triplets.
use casinos_erp::{Annotation, RawRecording};
use ndarray::{Array2, ArrayView1};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

pub const SFREQ: f64 = 1000.0;
pub const N_TIMES: usize = 10_000;
/// `Stimulus/S 11` onsets in seconds.
pub const EVENT_SECS: [usize; 5] = [1, 3, 5, 7, 9];

#[allow(unused)]
/// Ocular-like artifact: 2 Hz, phase-locked to every event (events sit on whole seconds).
pub fn artifact(t: f64) -> f64 {
    (2.0 * PI * 2.0 * t).sin()
}

#[allow(unused)]
/// Neural response: Gaussian bump 250 ms after each event, where the artifact crosses zero.
pub fn neural(t: f64) -> f64 {
    EVENT_SECS
        .iter()
        .map(|&e| {
            let d = t - e as f64 - 0.25;
            (-d * d / (2.0 * 0.05 * 0.05)).exp()
        })
        .sum()
}

#[allow(unused)]
/// Two channels (`Fp1`, `Cz`) at 1000 Hz for 10 s, in volts.
///
/// `Fp1` is dominated by the 2 Hz artifact, `Cz` by the neural bumps.
pub fn erp_recording() -> RawRecording {
    let data = Array2::from_shape_fn((2, N_TIMES), |(c, i)| {
        let t = i as f64 / SFREQ;
        let (a, n) = (artifact(t), neural(t));
        1e-6 * match c {
            0 => 100.0 * a + 2.0 * n,
            _ => 10.0 * a + 10.0 * n,
        }
    });
    let mut annotations: Vec<Annotation> = vec![Annotation::new(0, "New Segment/")];
    for &s in &EVENT_SECS {
        annotations.push(Annotation::new(s * SFREQ as usize, "Stimulus/S 11"));
        annotations.push(Annotation::new(s * SFREQ as usize + 600, "Response/R  1"));
    }
    annotations.sort_by_key(|a| a.onset);
    RawRecording::new(data, SFREQ, vec!["Fp1".into(), "Cz".into()], annotations).unwrap()
}

#[allow(unused)]
/// Amplitude of the `freq` component of `x` sampled at `sfreq` (single-bin DFT).
pub fn tone_amplitude(x: ArrayView1<f64>, freq: f64, sfreq: f64) -> f64 {
    let (re, im) = x.iter().enumerate().fold((0.0, 0.0), |(re, im), (i, &v)| {
        let w = 2.0 * PI * freq * i as f64 / sfreq;
        (re + v * w.cos(), im - v * w.sin())
    });
    2.0 * re.hypot(im) / x.len() as f64
}

#[allow(unused)]
/// Write `raw` as a multiplexed float32 BrainVision triplet `<dir>/<stem>.{vhdr,eeg,vmrk}`.
///
/// Samples are stored in µV with resolution 1. Annotation descriptions must
/// look like `Type/Description`.
pub fn write_brainvision(dir: &Path, stem: &str, raw: &RawRecording) -> PathBuf {
    let vhdr = dir.join(format!("{stem}.vhdr"));
    let mut header = format!(
        "Brain Vision Data Exchange Header File Version 1.0\r\n\
         ; written by tests/common.rs\r\n\
         \r\n\
         [Common Infos]\r\n\
         Codepage=UTF-8\r\n\
         DataFile={stem}.eeg\r\n\
         MarkerFile={stem}.vmrk\r\n\
         DataFormat=BINARY\r\n\
         DataOrientation=MULTIPLEXED\r\n\
         NumberOfChannels={}\r\n\
         SamplingInterval={}\r\n\
         \r\n\
         [Binary Infos]\r\n\
         BinaryFormat=IEEE_FLOAT_32\r\n\
         \r\n\
         [Channel Infos]\r\n",
        raw.n_channels(),
        1e6 / raw.sfreq
    );
    for (i, name) in raw.ch_names.iter().enumerate() {
        header.push_str(&format!("Ch{}={},,1,µV\r\n", i + 1, name.replace(',', "\\1")));
    }
    std::fs::write(&vhdr, header).unwrap();

    let mut bytes = Vec::with_capacity(raw.n_channels() * raw.n_times() * 4);
    for t in 0..raw.n_times() {
        for c in 0..raw.n_channels() {
            bytes.extend_from_slice(&((raw.data[[c, t]] * 1e6) as f32).to_le_bytes());
        }
    }
    std::fs::write(dir.join(format!("{stem}.eeg")), bytes).unwrap();

    let mut vmrk = format!(
        "Brain Vision Data Exchange Marker File, Version 1.0\r\n\
         \r\n\
         [Common Infos]\r\n\
         Codepage=UTF-8\r\n\
         DataFile={stem}.eeg\r\n\
         \r\n\
         [Marker Infos]\r\n"
    );
    for (i, a) in raw.annotations.iter().enumerate() {
        let (kind, desc) = a.description.split_once('/').unwrap_or((a.description.as_str(), ""));
        vmrk.push_str(&format!("Mk{}={},{},{},{},0\r\n", i + 1, kind, desc, a.onset + 1, a.duration));
    }
    std::fs::write(dir.join(format!("{stem}.vmrk")), vmrk).unwrap();
    vhdr
}
