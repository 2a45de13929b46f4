use nullscape::core::ks::ks_two_sample;

#[test]
fn identical_samples() {
    let ks = ks_two_sample(&[1, 2, 2, 3], &[1, 2, 2, 3]).unwrap();
    assert_eq!(ks.statistic, 0.0);
    assert_eq!(ks.p_value, 1.0);
}

#[test]
fn disjoint_supports_are_maximally_divergent() {
    let ks = ks_two_sample(&[0, 0, 0, 0], &[5, 5, 5, 5]).unwrap();
    assert_eq!(ks.statistic, 1.0);
}

#[test]
fn symmetric_in_magnitude() {
    let a = [0u32, 1, 2, 2, 3, 5, 8, 8];
    let b = [1u32, 1, 2, 4, 4, 9];
    let ab = ks_two_sample(&a, &b).unwrap();
    let ba = ks_two_sample(&b, &a).unwrap();
    assert_eq!(ab.statistic, ba.statistic);
    assert_eq!(ab.p_value, ba.p_value);
}

#[test]
fn unequal_lengths_are_fine_empty_is_flagged() {
    assert!(ks_two_sample(&[1, 2, 3], &[2]).is_some());
    assert!(ks_two_sample(&[], &[2]).is_none());
    assert!(ks_two_sample(&[2], &[]).is_none());
}

#[test]
fn shifted_distributions_are_detected() {
    // 400 draws each from counts centered at 3 vs centered at 9: the CDF gap
    // is large and the asymptotic p-value collapses.
    let a: Vec<u32> = (0..400).map(|i| 3 + (i % 3)).collect();
    let b: Vec<u32> = (0..400).map(|i| 9 + (i % 3)).collect();
    let ks = ks_two_sample(&a, &b).unwrap();
    assert_eq!(ks.statistic, 1.0);
    assert!(ks.p_value < 1e-6);
}

#[test]
fn statistic_is_scale_free_in_sample_size() {
    // The same step distributions at different sample sizes give the same
    // supremum gap; only the p-value sharpens.
    let small_a = [0u32, 0, 1, 1];
    let small_b = [0u32, 1, 1, 1];
    let big_a: Vec<u32> = small_a.iter().copied().cycle().take(400).collect();
    let big_b: Vec<u32> = small_b.iter().copied().cycle().take(400).collect();
    let small = ks_two_sample(&small_a, &small_b).unwrap();
    let big = ks_two_sample(&big_a, &big_b).unwrap();
    assert!((small.statistic - big.statistic).abs() < 1e-12);
    assert!(big.p_value < small.p_value);
}
