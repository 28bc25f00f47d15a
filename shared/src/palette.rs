use rand::Rng;
use uuid::Uuid;

/// Fallback sector colors for items without one, cycled by position.
pub const CASINO_COLORS: [&str; 8] = [
    "#c0392b", // red
    "#1e1e1e", // black
    "#27ae60", // green
    "#d4ac0d", // gold
    "#2e86c1", // blue
    "#8e44ad", // purple
    "#d35400", // orange
    "#16a085", // teal
];

/// Random light, low-saturation color as `#rrggbb`.
pub fn pastel_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let hue = rng.gen_range(0..360) as f64 / 360.0;
    let saturation = rng.gen_range(20..50) as f64 / 100.0;
    let lightness = rng.gen_range(70..90) as f64 / 100.0;

    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((hue * 6.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match (hue * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
