const MAX_ITERATIONS: usize = 10;
const TOLERANCE_RAD: f64 = 1e-6;

/// Eccentric anomaly for mean anomaly `m` (radians) and eccentricity `e`.
///
/// Newton–Raphson from the second-order seed. Gives up after ten steps and
/// returns the last iterate; the eccentricities in use (< 0.3) settle well
/// before that.
pub fn solve_kepler(m: f64, e: f64) -> f64 {
    let mut e_anom = m + e * m.sin() * (1.0 + e * m.cos());
    for _ in 0..MAX_ITERATIONS {
        let f = e_anom - e * e_anom.sin() - m;
        let fp = 1.0 - e * e_anom.cos();
        let step = f / fp;
        e_anom -= step;
        if step.abs() < TOLERANCE_RAD {
            break;
        }
    }
    e_anom
}
