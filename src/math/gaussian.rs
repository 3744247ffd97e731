use rand::Rng;

/// Draws two independent samples from N(0, 1) with the Marsaglia polar method.
///
/// Points are drawn uniformly from the square (-1, 1) x (-1, 1) and rejected
/// until one lands strictly inside the unit disk (excluding the origin, so
/// `ln(s)` is finite).
pub fn standard_normal_pair<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    loop {
        let u: f32 = rng.gen_range(-1.0..1.0);
        let v: f32 = rng.gen_range(-1.0..1.0);
        let s = u * u + v * v;
        if s > 0.0 && s < 1.0 {
            let factor = (-2.0 * s.ln() / s).sqrt();
            return (u * factor, v * factor);
        }
    }
}

/// Fills `out` with samples from N(mean, std_dev), consuming both values of
/// every polar-method pair.
pub fn fill_normal<R: Rng + ?Sized>(out: &mut [f32], mean: f32, std_dev: f32, rng: &mut R) {
    for chunk in out.chunks_mut(2) {
        let (a, b) = standard_normal_pair(rng);
        chunk[0] = a * std_dev + mean;
        if let Some(second) = chunk.get_mut(1) {
            *second = b * std_dev + mean;
        }
    }
}
