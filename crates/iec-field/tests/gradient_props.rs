use iec_core::{FieldShape, Grid, IecError, ShapeArgs};
use iec_field::InformationField;
use proptest::prelude::*;

fn stretched_grid(steps: &[f64]) -> Grid {
    let mut s = vec![0.0];
    for step in steps {
        let next = s[s.len() - 1] + step;
        s.push(next);
    }
    Grid::new(s).unwrap()
}

proptest! {
    #[test]
    fn identity_field_has_unit_gradient(steps in prop::collection::vec(1e-3f64..0.5, 1..128)) {
        let grid = stretched_grid(&steps);
        let field = InformationField::from_fn(&grid, |s| s).unwrap();
        for (idx, g) in field.gradient().iter().enumerate() {
            prop_assert!((g - 1.0).abs() < 1e-9, "node {} has gradient {}", idx, g);
        }
    }

    #[test]
    fn linear_shape_gradient_matches_slope(
        offset in -5.0f64..5.0,
        slope in -10.0f64..10.0,
        n in 2usize..400,
    ) {
        let grid = Grid::uniform(0.4, n).unwrap();
        let shape = FieldShape::Linear { offset, gradient: slope };
        let field = InformationField::sample(&grid, &shape).unwrap();
        for g in field.gradient() {
            prop_assert!((g - slope).abs() <= 1e-8 * (1.0 + slope.abs()));
        }
    }
}

#[test]
fn unknown_selector_is_rejected_before_sampling() {
    let err = FieldShape::from_selector("sawtooth", &ShapeArgs::default(), 0.4).unwrap_err();
    assert!(matches!(err, IecError::UnrecognizedMode(_)));
}

#[test]
fn field_survives_json_round_trip() {
    let grid = Grid::uniform(0.4, 9).unwrap();
    let field = InformationField::from_fn(&grid, |s| s * s).unwrap();
    let text = serde_json::to_string(&field).unwrap();
    let back: InformationField = serde_json::from_str(&text).unwrap();
    assert_eq!(back, field);
}

#[test]
fn tampered_json_is_rejected() {
    let text = r#"{"s":[0.0,0.5,1.0],"values":[0.0,1.0],"gradient":[1.0,1.0,1.0]}"#;
    assert!(serde_json::from_str::<InformationField>(text).is_err());
}
