use driftcorr_core::error::DriftError;
use driftcorr_core::kernel::Kernel;
use driftcorr_core::pipeline::{DriftConfig, PipelineStage, RegistrationConfig, SmoothingConfig};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_registration_defaults() {
    let c = RegistrationConfig::default();
    assert_eq!(c.offset_bound, 10);
    assert_eq!(c.kernel, Kernel::C4Hexic);
    assert_eq!(c.derivative, Kernel::C4HexicD);
    assert_eq!(c.max_iters, 100);
    assert!(c.validate().is_ok());
}

#[test]
fn test_smoothing_defaults() {
    let c = SmoothingConfig::default();
    assert_eq!(c.median_window, 3);
    assert_eq!(c.blur_sigma, 2.0);
    assert_eq!(c.blur_cut, 3.0);
    assert_eq!(c.mask_sigma, 1.5);
    assert!(c.validate().is_ok());
}

#[test]
fn test_nearest_config_uses_box_pair() {
    let params = RegistrationConfig::nearest().refine_params().unwrap();
    assert!(params.kernels.is_nearest());
}

#[test]
fn test_pipeline_stage_display() {
    assert_eq!(
        format!("{}", PipelineStage::Registration),
        "Registering frame pairs"
    );
    assert_eq!(format!("{}", PipelineStage::Smoothing), "Smoothing offsets");
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_mismatched_kernel_pair_is_rejected() {
    let c = RegistrationConfig {
        kernel: Kernel::CatmullRom,
        derivative: Kernel::BSpline3D,
        ..RegistrationConfig::default()
    };
    assert!(matches!(c.validate(), Err(DriftError::InvalidConfig(_))));
}

#[test]
fn test_non_positive_epsilon_is_rejected() {
    for epsilon in [0.0, -1e-3, f64::NAN] {
        let c = RegistrationConfig {
            epsilon,
            ..RegistrationConfig::default()
        };
        assert!(c.refine_params().is_err(), "epsilon {} accepted", epsilon);
    }
}

#[test]
fn test_zero_sigma_is_rejected() {
    let c = SmoothingConfig {
        mask_sigma: 0.0,
        ..SmoothingConfig::default()
    };
    assert!(matches!(c.validate(), Err(DriftError::InvalidConfig(_))));
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_kernels_serialize_by_name() {
    let json = serde_json::to_value(RegistrationConfig::default()).unwrap();
    assert_eq!(json["kernel"], "c4hexic");
    assert_eq!(json["derivative"], "c4hexicd");
}

#[test]
fn test_partial_config_fills_defaults() {
    let c: DriftConfig =
        serde_json::from_str(r#"{"registration": {"kernel": "ctmr", "derivative": "ctmrd"}}"#)
            .unwrap();
    assert_eq!(c.registration.kernel, Kernel::CatmullRom);
    assert_eq!(c.registration.offset_bound, 10);
    assert_eq!(c.smoothing, SmoothingConfig::default());
    assert!(c.validate().is_ok());
}

#[test]
fn test_unknown_kernel_name_fails_to_parse() {
    let result: Result<RegistrationConfig, _> = serde_json::from_str(r#"{"kernel": "lanczos"}"#);
    assert!(result.is_err());
}
