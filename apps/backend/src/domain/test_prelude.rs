use proptest::prelude::ProptestConfig;

/// Shared proptest configuration for domain property tests.
///
/// Honours `PROPTEST_CASES`, defaulting to 64 for these in-memory checks.
pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}
