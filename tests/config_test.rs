use neon_city::{
    SceneConfig,
    config::{SEED_ENV, parse_seed},
    render::Lifecycle,
};

#[test]
fn defaults_describe_the_neon_city() {
    let config = SceneConfig::default();
    assert_eq!(config.seed, None);
    assert_eq!(config.city.extent, 120);
    assert_eq!(config.city.spacing, 10);
    assert_eq!((config.city.max_height, config.city.max_rings), (25.0, 15));
    assert_eq!(config.city.sky_radius, 200.0);
    assert_eq!(config.city.ground_size, 400.0);

    assert_eq!(config.camera.position, [50.0, 80.0, 50.0]);
    assert_eq!(config.camera.fovy, 75.0);
    assert_eq!((config.camera.znear, config.camera.zfar), (0.1, 1000.0));
    assert_eq!(config.camera.damping_factor, 0.05);

    assert_eq!(config.bloom.strength, 1.5);
    assert_eq!(config.bloom.radius, 0.4);
    assert_eq!(config.bloom.threshold, 0.85);
}

#[test]
fn seeds_parse_as_u64() {
    assert_eq!(parse_seed("42").unwrap(), 42);
    assert_eq!(parse_seed(" 7\n").unwrap(), 7);
    assert_eq!(parse_seed("18446744073709551615").unwrap(), u64::MAX);
    assert!(parse_seed("").is_err());
    assert!(parse_seed("-1").is_err());
    assert!(parse_seed("neon").is_err());
}

#[test]
fn seed_is_read_from_the_environment() {
    // SAFETY: no other test in this binary touches the environment
    unsafe { std::env::set_var(SEED_ENV, "1234") };
    assert_eq!(SceneConfig::from_env().seed, Some(1234));

    unsafe { std::env::set_var(SEED_ENV, "not a number") };
    assert_eq!(SceneConfig::from_env().seed, None);

    unsafe { std::env::remove_var(SEED_ENV) };
    assert_eq!(SceneConfig::from_env().seed, None);
}

#[test]
fn lifecycle_only_moves_forward() {
    let idle = Lifecycle::default();
    assert_eq!(idle, Lifecycle::Idle);

    let running = idle.frame();
    assert_eq!(running, Lifecycle::Running);
    assert_eq!(running.frame(), Lifecycle::Running);

    let stopped = running.stop();
    assert!(stopped.is_stopped());
    assert_eq!(stopped.frame(), Lifecycle::Stopped);
    assert!(Lifecycle::Idle.stop().is_stopped());
}

#[test]
fn redraws_need_a_configured_surface() {
    assert!(Lifecycle::Idle.wants_redraw(true));
    assert!(Lifecycle::Running.wants_redraw(true));
    assert!(!Lifecycle::Running.wants_redraw(false));
    assert!(!Lifecycle::Stopped.wants_redraw(true));
}
