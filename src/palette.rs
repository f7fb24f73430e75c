use glam::Vec3;

/// A named color scheme: background clear color plus the four
/// coefficient vectors of a cosine palette and a scalar phase offset.
/// Fixed at startup (or swapped wholesale from the overlay); the
/// rendering core never mutates one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: Vec3,
    /// Cosine palette coefficients (bias, amplitude, frequency, phase).
    /// Frequencies are integer-valued so the palette cycles with period
    /// 1 in its scalar parameter.
    pub coeffs: [Vec3; 4],
    pub offset: f32,
}

/// Keys accepted by [`Palette::get`], in overlay display order.
pub const PALETTE_KEYS: &[&str] = &["blue", "pink", "green", "dusk"];

/// Fallback when the settings file or CLI names an unknown palette.
pub const DEFAULT_PALETTE: &str = "blue";

impl Palette {
    /// Look up a palette by key. `None` for unrecognized keys; the
    /// caller decides whether to warn and fall back.
    pub fn get(key: &str) -> Option<Self> {
        match key {
            "blue" => Some(Self {
                background: Vec3::new(0.082, 0.122, 0.188),
                coeffs: [
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(0.0, 0.1, 0.2),
                ],
                offset: 0.0,
            }),
            "pink" => Some(Self {
                background: Vec3::new(0.161, 0.051, 0.149),
                coeffs: [
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(0.8, 0.9, 0.3),
                ],
                offset: 0.25,
            }),
            "green" => Some(Self {
                background: Vec3::new(0.039, 0.118, 0.078),
                coeffs: [
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(2.0, 1.0, 1.0),
                    Vec3::new(0.3, 0.2, 0.2),
                ],
                offset: 0.5,
            }),
            "dusk" => Some(Self {
                background: Vec3::new(0.098, 0.069, 0.129),
                coeffs: [
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(0.5, 0.5, 0.5),
                    Vec3::new(1.0, 1.0, 2.0),
                    Vec3::new(0.5, 0.2, 0.25),
                ],
                offset: 0.1,
            }),
            _ => None,
        }
    }

    /// Resolve a key the way the app shell does: warn and fall back to
    /// [`DEFAULT_PALETTE`] when the key is unknown.
    pub fn resolve(key: &str) -> Self {
        Self::get(key).unwrap_or_else(|| {
            log::warn!("unknown palette {key:?}, falling back to {DEFAULT_PALETTE:?}");
            Self::get(DEFAULT_PALETTE).expect("default palette present")
        })
    }
}
