//! Electrode layout (montage).
//!
//! A built-in `standard_1020` table covering the 10-20 positions plus the
//! common 10-10 intermediates. Positions live on the unit sphere with
//! `+x` right, `+y` nasion, `+z` vertex. They are derived from the
//! 10 %-arc construction (18° per step along the nasion-inion and
//! preauricular arcs), which is accurate enough for topographic display.
use std::f64::consts::PI;

/// Named electrode positions.
#[derive(Debug, Clone)]
pub struct Montage {
    pub name: String,
    positions: Vec<(String, [f64; 3])>,
}

// (label, inclination from vertex in degrees, azimuth from +x in degrees)
const STANDARD_1020: &[(&str, f64, f64)] = &[
    ("Fpz", 72.0, 90.0), ("AFz", 54.0, 90.0), ("Fz", 36.0, 90.0), ("FCz", 18.0, 90.0),
    ("Cz", 0.0, 0.0),
    ("CPz", 18.0, 270.0), ("Pz", 36.0, 270.0), ("POz", 54.0, 270.0), ("Oz", 72.0, 270.0),
    ("Iz", 90.0, 270.0),
    // outer ring, left
    ("Fp1", 72.0, 108.0), ("AF7", 72.0, 126.0), ("F7", 72.0, 144.0), ("FT7", 72.0, 162.0),
    ("T7", 72.0, 180.0), ("TP7", 72.0, 198.0), ("P7", 72.0, 216.0), ("PO7", 72.0, 234.0),
    ("O1", 72.0, 252.0),
    // outer ring, right
    ("Fp2", 72.0, 72.0), ("AF8", 72.0, 54.0), ("F8", 72.0, 36.0), ("FT8", 72.0, 18.0),
    ("T8", 72.0, 0.0), ("TP8", 72.0, 342.0), ("P8", 72.0, 324.0), ("PO8", 72.0, 306.0),
    ("O2", 72.0, 288.0),
    // central row
    ("C5", 54.0, 180.0), ("C3", 36.0, 180.0), ("C1", 18.0, 180.0),
    ("C2", 18.0, 0.0), ("C4", 36.0, 0.0), ("C6", 54.0, 0.0),
    // frontal
    ("AF3", 58.0, 112.0), ("AF4", 58.0, 68.0),
    ("F5", 60.0, 138.0), ("F3", 50.0, 129.0), ("F1", 40.0, 113.0),
    ("F2", 40.0, 67.0), ("F4", 50.0, 51.0), ("F6", 60.0, 42.0),
    ("FC5", 57.0, 160.0), ("FC3", 40.0, 152.0), ("FC1", 25.0, 135.0),
    ("FC2", 25.0, 45.0), ("FC4", 40.0, 28.0), ("FC6", 57.0, 20.0),
    // parietal
    ("CP5", 57.0, 200.0), ("CP3", 40.0, 208.0), ("CP1", 25.0, 225.0),
    ("CP2", 25.0, 315.0), ("CP4", 40.0, 332.0), ("CP6", 57.0, 340.0),
    ("P5", 60.0, 222.0), ("P3", 50.0, 231.0), ("P1", 40.0, 247.0),
    ("P2", 40.0, 293.0), ("P4", 50.0, 309.0), ("P6", 60.0, 318.0),
    ("PO3", 58.0, 248.0), ("PO4", 58.0, 292.0),
    // legacy 10-20 names
    ("T3", 72.0, 180.0), ("T4", 72.0, 0.0), ("T5", 72.0, 216.0), ("T6", 72.0, 324.0),
];

fn spherical_to_cartesian(incl_deg: f64, az_deg: f64) -> [f64; 3] {
    let incl = incl_deg * PI / 180.0;
    let az = az_deg * PI / 180.0;
    [incl.sin() * az.cos(), incl.sin() * az.sin(), incl.cos()]
}

/// The built-in 10-20 / 10-10 montage.
pub fn standard_1020() -> Montage {
    Montage {
        name: "standard_1020".into(),
        positions: STANDARD_1020
            .iter()
            .map(|&(n, incl, az)| (n.to_string(), spherical_to_cartesian(incl, az)))
            .collect(),
    }
}

impl Montage {
    pub fn from_positions(name: impl Into<String>, positions: Vec<(String, [f64; 3])>) -> Self {
        Self { name: name.into(), positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Case-insensitive lookup.
    pub fn get(&self, ch_name: &str) -> Option<[f64; 3]> {
        let key = ch_name.trim().to_lowercase();
        self.positions
            .iter()
            .find(|(n, _)| n.to_lowercase() == key)
            .map(|(_, p)| *p)
    }
}

/// Azimuthal-equidistant projection used by topographic maps.
///
/// The vertex maps to the origin and the equator (inclination 90°) to the
/// unit circle; `+y` points to the nose.
pub fn project_2d(pos: &[f64; 3]) -> [f64; 2] {
    let [x, y, z] = *pos;
    let norm = (x * x + y * y + z * z).sqrt();
    if norm == 0.0 {
        return [0.0, 0.0];
    }
    let incl = (z / norm).clamp(-1.0, 1.0).acos();
    let az = y.atan2(x);
    let r = incl / (PI / 2.0);
    [r * az.cos(), r * az.sin()]
}
