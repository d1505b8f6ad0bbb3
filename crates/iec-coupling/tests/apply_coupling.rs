use iec_core::{FieldShape, IecError, LoadSpec, Parameters};
use iec_coupling::{apply_coupling, BaselineCurvature};
use iec_field::InformationField;
use proptest::prelude::*;

fn gaussian_params() -> Parameters {
    Parameters::builder()
        .chi_kappa(0.04)
        .chi_e(0.2)
        .chi_f(0.1)
        .field_shape(FieldShape::Gaussian {
            amplitude: 1.0,
            center: 0.2,
            width: 0.04,
        })
        .build()
        .unwrap()
}

#[test]
fn bias_fields_share_the_field_grid() {
    let params = gaussian_params();
    let field = InformationField::from_params(&params).unwrap();
    let bias = apply_coupling(&field, &params, &BaselineCurvature::Zero).unwrap();
    assert_eq!(bias.len(), params.n_nodes());
    assert_eq!(bias.target_curvature.len(), bias.s.len());
    assert_eq!(bias.active_moment.len(), bias.s.len());
    assert_eq!(bias.field, field);
    let peak = bias
        .stiffness
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(peak > params.youngs_modulus());
}

#[test]
fn baseline_profile_is_added_to_bias() {
    let params = gaussian_params();
    let field = InformationField::from_params(&params).unwrap();
    let plain = apply_coupling(&field, &params, &BaselineCurvature::Zero).unwrap();
    let offset = BaselineCurvature::profile(vec![0.5; params.n_nodes()]);
    let shifted = apply_coupling(&field, &params, &offset).unwrap();
    for (a, b) in plain.target_curvature.iter().zip(&shifted.target_curvature) {
        assert!((b - a - 0.5).abs() < 1e-12);
    }
}

#[test]
fn wrong_baseline_length_is_a_shape_mismatch() {
    let params = gaussian_params();
    let field = InformationField::from_params(&params).unwrap();
    let err = apply_coupling(&field, &params, &BaselineCurvature::profile(vec![0.0; 3]))
        .unwrap_err();
    assert!(matches!(err, IecError::ShapeMismatch(_)));
}

#[test]
fn environment_shifts_target_curvature() {
    let loads = LoadSpec {
        gravity_info_weight: 2.0,
        fluid_density: 1000.0,
        ..LoadSpec::default()
    };
    let params = gaussian_params().to_builder().loads(loads).build().unwrap();
    let field = InformationField::from_params(&params).unwrap();
    let bias = apply_coupling(&field, &params, &BaselineCurvature::Zero).unwrap();
    let plain = apply_coupling(&field, &gaussian_params(), &BaselineCurvature::Zero).unwrap();
    let slope = -2.0 * 100.0 * 9.81 / 1.0e4;
    let expected = 0.04 * params.length_scale() * slope;
    for (a, b) in plain.target_curvature.iter().zip(&bias.target_curvature) {
        assert!((b - a - expected).abs() < 1e-9);
    }
}

proptest! {
    #[test]
    fn zero_couplings_leave_material_untouched(amplitude in -5.0f64..5.0) {
        let params = Parameters::builder()
            .field_shape(FieldShape::Constant { amplitude })
            .build()
            .unwrap();
        let field = InformationField::from_params(&params).unwrap();
        let bias = apply_coupling(&field, &params, &BaselineCurvature::Zero).unwrap();
        prop_assert!(bias.stiffness.iter().all(|e| *e == params.youngs_modulus()));
        prop_assert!(bias.target_curvature.iter().all(|k| *k == 0.0));
        prop_assert!(bias.active_moment.iter().all(|m| *m == 0.0));
    }
}
