use iec_core::{Grid, IecError, Parameters};
use iec_field::InformationField;

/// Information component from the net tissue weight carried above `s`.
///
/// `I_g(s) = w_g · (ρ − ρ_f) · g · (L − s + d) / p_ref`, where `d` is the
/// immersion depth of the base. Linear in `s`, so the derivative is exact.
pub fn gravity_information(grid: &Grid, params: &Parameters) -> Result<InformationField, IecError> {
    let loads = params.loads();
    let scale = loads.gravity_info_weight
        * (params.density() - loads.fluid_density)
        * loads.gravity
        / loads.reference_pressure;
    depth_profile(grid, params, scale)
}

/// Information component from the hydrostatic pressure of the surrounding
/// fluid: `I_b(s) = w_b · ρ_f · g · (L − s + d) / p_ref`.
pub fn buoyancy_information(
    grid: &Grid,
    params: &Parameters,
) -> Result<InformationField, IecError> {
    let loads = params.loads();
    let scale =
        loads.buoyancy_info_weight * loads.fluid_density * loads.gravity / loads.reference_pressure;
    depth_profile(grid, params, scale)
}

fn depth_profile(grid: &Grid, params: &Parameters, scale: f64) -> Result<InformationField, IecError> {
    let top = params.length() + params.loads().immersion_depth;
    InformationField::from_fn_with_derivative(grid, |s| scale * (top - s), |_| -scale)
}

/// Adds the enabled environmental components to `field`. Returns a copy of
/// `field` when both weights are zero.
pub fn augment_with_environment(
    field: &InformationField,
    params: &Parameters,
) -> Result<InformationField, IecError> {
    let loads = params.loads();
    let mut out = field.clone();
    if loads.gravity_info_weight != 0.0 {
        out = out.superpose(&gravity_information(field.grid(), params)?)?;
    }
    if loads.buoyancy_info_weight != 0.0 {
        out = out.superpose(&buoyancy_information(field.grid(), params)?)?;
    }
    Ok(out)
}
