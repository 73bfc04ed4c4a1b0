/// Rebuild monotonic 64-bit cumulative offsets from a 32-bit counter that
/// wrapped at 2^32.
///
/// Whenever a raw value drops below the running corrected value, another
/// 2^32 is added to every value from there on. Repeated offsets (empty
/// spectra) do not count as a wrap.
pub fn correct_offsets(raw: &[u32]) -> Vec<u64> {
    let mut correction = 0u64;
    let mut previous = 0u64;
    raw.iter()
        .map(|value| {
            let mut corrected = u64::from(*value) + correction;
            if corrected < previous {
                correction += 1 << 32;
                corrected += 1 << 32;
            }
            previous = corrected;
            corrected
        })
        .collect()
}
