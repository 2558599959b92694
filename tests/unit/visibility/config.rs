use super::*;

#[test]
fn threshold_comparison_is_inclusive() {
    for t in [0.0, 0.2, 0.3, 0.5, 1.0] {
        let cfg = VisibilityConfig::retriggering(t).unwrap();
        for r in [0.0, 0.1, 0.2, 0.25, 0.3, 0.5, 0.99, 1.0] {
            assert_eq!(cfg.is_visible_at(r), r >= t, "t={t} r={r}");
        }
    }
}

#[test]
fn nan_ratio_counts_as_nothing_visible() {
    let cfg = VisibilityConfig::retriggering(0.0).unwrap();
    assert!(cfg.is_visible_at(f64::NAN));
    let cfg = VisibilityConfig::retriggering(0.1).unwrap();
    assert!(!cfg.is_visible_at(f64::NAN));
}

#[test]
fn out_of_range_thresholds_are_rejected() {
    assert!(VisibilityConfig::latched(-0.01).is_err());
    assert!(VisibilityConfig::latched(1.01).is_err());
    assert!(VisibilityConfig::latched(f64::NAN).is_err());
}

#[test]
fn json_accepts_mode_or_trigger_once() {
    let c: VisibilityConfig =
        serde_json::from_str(r#"{"threshold":0.3,"trigger_once":true}"#).unwrap();
    assert_eq!(c.mode, ObserveMode::Latched);

    let c: VisibilityConfig =
        serde_json::from_str(r#"{"threshold":0.2,"mode":"retriggering"}"#).unwrap();
    assert_eq!(c.mode, ObserveMode::Retriggering);
    assert_eq!(c.threshold, 0.2);

    let c: VisibilityConfig = serde_json::from_str(r#"{}"#).unwrap();
    assert_eq!(c, VisibilityConfig::default());

    assert!(
        serde_json::from_str::<VisibilityConfig>(
            r#"{"threshold":0.2,"mode":"latched","trigger_once":true}"#
        )
        .is_err()
    );
    assert!(serde_json::from_str::<VisibilityConfig>(r#"{"threshold":2.0}"#).is_err());
}

#[test]
fn serialized_form_round_trips_through_mode() {
    let c = VisibilityConfig::latched(0.25).unwrap();
    let s = serde_json::to_string(&c).unwrap();
    assert_eq!(s, r#"{"threshold":0.25,"mode":"latched"}"#);
}
