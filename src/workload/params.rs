use rand::Rng;
use rand::thread_rng;
use serde::Serialize;

/// Longest seed whose value range still fits in a `u64`.
const MAX_SEED_DIGITS: usize = 18;
const DEFAULT_COORDINATE_DECIMALS: usize = 6;
const MAX_COORDINATE_DECIMALS: usize = 9;
const LAT_BOUND_DEGREES: u64 = 90;
const LNG_BOUND_DEGREES: u64 = 180;

/// Values substituted into every request of one pass. An empty field is
/// never substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunParameters {
    pub seed: String,
    pub lat: String,
    pub lng: String,
}

/// The literal values recorded in the request log, replaced on every pass.
pub type Placeholders = RunParameters;

impl RunParameters {
    pub(crate) fn fields(&self) -> [&str; 3] {
        [&self.seed, &self.lat, &self.lng]
    }
}

/// Draws a fresh set of parameters shaped like `placeholders`.
///
/// Each call uses the thread-local RNG, so hammers never share generator
/// state. Two hammers can still draw the same values.
#[must_use]
pub fn generate_parameters(placeholders: &Placeholders) -> RunParameters {
    let mut rng = thread_rng();
    RunParameters {
        seed: fresh_seed(&mut rng, &placeholders.seed),
        lat: fresh_coordinate(&mut rng, &placeholders.lat, LAT_BOUND_DEGREES),
        lng: fresh_coordinate(&mut rng, &placeholders.lng, LNG_BOUND_DEGREES),
    }
}

/// Uniform in `[0, 10^len(seed))`, not zero-padded.
fn fresh_seed<R: Rng>(rng: &mut R, seed: &str) -> String {
    if seed.is_empty() {
        return String::new();
    }
    let digits = u32::try_from(seed.len().min(MAX_SEED_DIGITS)).unwrap_or(0);
    let upper = 10_u64.checked_pow(digits).unwrap_or(u64::MAX);
    rng.gen_range(0..upper).to_string()
}

fn fresh_coordinate<R: Rng>(rng: &mut R, placeholder: &str, bound_degrees: u64) -> String {
    if placeholder.is_empty() {
        return String::new();
    }
    let decimals = placeholder
        .split_once('.')
        .map_or(DEFAULT_COORDINATE_DECIMALS, |(_, fraction)| fraction.len())
        .min(MAX_COORDINATE_DECIMALS);
    let scale = 10_u64
        .checked_pow(u32::try_from(decimals).unwrap_or(0))
        .unwrap_or(1);
    let bound = i64::try_from(bound_degrees.saturating_mul(scale)).unwrap_or(i64::MAX);
    let value = rng.gen_range(0_i64.saturating_sub(bound)..=bound);
    format_fixed(value, decimals, scale)
}

fn format_fixed(value: i64, decimals: usize, scale: u64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    let whole = magnitude.checked_div(scale).unwrap_or(magnitude);
    if decimals == 0 {
        return format!("{}{}", sign, whole);
    }
    let fraction = magnitude.checked_rem(scale).unwrap_or(0);
    format!("{}{}.{:0width$}", sign, whole, fraction, width = decimals)
}
