//! Nominal equilibrium state.

use sk_mechanism::MechanismState;

use crate::config::NominalConfig;
use crate::error::RobotResult;
use crate::model::RobotModel;

/// Standing pose used both for contact geometry and as the LQR operating
/// point. Velocities are zero; coordinates not covered by `nominal` stay zero.
///
/// Depends only on its arguments, so repeated calls return equal states.
pub fn nominal_state(model: &RobotModel, nominal: &NominalConfig) -> RobotResult<MechanismState> {
    let mechanism = model.mechanism();
    let mut state = MechanismState::zero(mechanism);

    state.set_configuration(mechanism, model.floating_base(), &nominal.base)?;
    for (_, joint) in model.leg_extension().iter() {
        state.set_configuration(mechanism, *joint, &[nominal.leg_extension])?;
    }
    for (_, joint) in model.hand_rotation().iter() {
        state.set_configuration(mechanism, *joint, &[nominal.hand_rotation])?;
    }
    for (_, joint) in model.hand_extension().iter() {
        state.set_configuration(mechanism, *joint, &[nominal.hand_extension])?;
    }

    Ok(state)
}
