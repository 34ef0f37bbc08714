use sorter_config::{Material, SamplingMode, load_toml};

#[test]
fn shipped_sample_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../etc/sorter_config.toml");
    let text = std::fs::read_to_string(path).unwrap();
    let cfg = load_toml(&text).unwrap();
    cfg.validate().unwrap();

    assert_eq!(cfg.capture.trigger_threshold, 527);
    assert_eq!(cfg.capture.cooldown_ms, 3000);
    assert_eq!(cfg.classifier.ranges[0].category, Material::Metal);
    assert_eq!(cfg.actuator.positions.get(Material::Metal), Some(125));
    assert_eq!(cfg.sampling.mode, SamplingMode::Direct);
    assert_eq!(cfg.pins.servo, 5);
}
