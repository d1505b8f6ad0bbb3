use iec_core::{FieldShape, IecError, ParameterSpec, Parameters, StiffnessModel};

#[test]
fn partial_yaml_takes_defaults() {
    let yaml = r#"
chi_kappa: 0.04
length: 0.4
n_nodes: 150
field:
  mode: step
  amplitude: 1.0
loads:
  tip_load: 2.0
"#;
    let params = Parameters::from_yaml_str(yaml).expect("valid config");
    assert_eq!(params.chi_kappa(), 0.04);
    assert_eq!(params.n_nodes(), 150);
    assert_eq!(params.loads().tip_load, 2.0);
    assert_eq!(params.loads().gravity, 9.81);
    assert_eq!(params.stiffness_model(), StiffnessModel::Linear);
    match params.field_shape() {
        FieldShape::Step { amplitude, center } => {
            assert_eq!(*amplitude, 1.0);
            assert!((center - 0.2).abs() < 1e-12);
        }
        other => panic!("unexpected shape {other:?}"),
    }
}

#[test]
fn out_of_range_coupling_produces_no_object() {
    let yaml = "chi_kappa: 0.5\n";
    let result = Parameters::from_yaml_str(yaml);
    let Err(IecError::ParameterRange(info)) = result else {
        panic!("expected ParameterRange, got {result:?}");
    };
    assert_eq!(info.context["name"], "chi_kappa");
    assert_eq!(info.context["min"], "0");
    assert_eq!(info.context["max"], "0.1");
}

#[test]
fn unknown_field_mode_is_unrecognized() {
    let json = r#"{"field": {"mode": "sawtooth"}}"#;
    assert!(matches!(
        Parameters::from_json_str(json),
        Err(IecError::UnrecognizedMode(_))
    ));
}

#[test]
fn unknown_stiffness_model_is_unrecognized() {
    let json = r#"{"stiffness_model": "hyperelastic"}"#;
    assert!(matches!(
        Parameters::from_json_str(json),
        Err(IecError::UnrecognizedMode(_))
    ));
}

#[test]
fn malformed_text_is_a_serde_error() {
    assert!(matches!(
        ParameterSpec::from_yaml_str("chi_kappa: [oops"),
        Err(IecError::Serde(_))
    ));
}

#[test]
fn parameters_deserialize_through_validation() {
    let params = Parameters::builder().chi_e(-0.25).build().unwrap();
    let json = serde_json::to_string(&params).unwrap();
    let decoded: Parameters = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, params);

    let tampered = json.replace("-0.25", "-0.75");
    assert!(serde_json::from_str::<Parameters>(&tampered).is_err());
}

#[test]
fn content_hash_tracks_values() {
    let a = Parameters::builder().build().unwrap();
    let b = Parameters::builder().chi_f(0.1).build().unwrap();
    assert_eq!(a.content_hash().unwrap(), a.clone().content_hash().unwrap());
    assert_ne!(a.content_hash().unwrap(), b.content_hash().unwrap());
}
