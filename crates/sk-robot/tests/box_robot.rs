//! End-to-end construction of the box robot bundle.

use std::path::PathBuf;

use proptest::prelude::*;
use sk_core::{Bounds, Side};
use sk_lqr::{DoubleIntegratorProxy, Linearizer, solve_discrete_riccati};
use sk_robot::{
    ControlModel, CostMatrices, ModelBuilder, MpcBundle, RobotConfig, RobotModel, nominal_state,
};

fn description_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // go to crates
    path.pop(); // go to repo root
    path.push("descriptions");
    path.push("box_robot.yaml");
    path
}

fn model(config: &RobotConfig) -> RobotModel {
    ModelBuilder::new(config).build(&description_path()).unwrap()
}

fn bundle(config: &RobotConfig) -> MpcBundle {
    let model = model(config);
    let proxy = DoubleIntegratorProxy {
        positions: model.mechanism().num_velocities(),
    };
    MpcBundle::build(model, config, &proxy).unwrap()
}

#[test]
fn floating_base_effort_is_zero() {
    let bundle = bundle(&RobotConfig::default());
    let base = bundle
        .mechanism()
        .joint(bundle.model().floating_base())
        .unwrap();

    assert_eq!(base.effort_bounds(), &[Bounds::zero(); 3]);
    assert!(base.velocity_bounds().iter().all(|b| b.upper == 1e3 && b.lower == -1e3));
}

#[test]
fn allow_list_scenario_yields_four_pairs() {
    let bundle = bundle(&RobotConfig::default());
    let env = bundle.environment();

    assert_eq!(env.surfaces().len(), 2);
    assert_eq!(env.pairs().len(), 4);
    for (body, obstacle) in [
        ("l_hand", "wall"),
        ("r_foot", "floor"),
        ("l_foot", "floor"),
        ("l_foot", "wall"),
    ] {
        assert!(env.has_pair(body, obstacle), "missing ({body}, {obstacle})");
    }
    let r_hand = bundle.model().hands().right;
    assert_eq!(env.pairs_for_body(r_hand).count(), 0);
    assert_eq!(bundle.mechanism().environment_primitives().len(), 2);
}

#[test]
fn four_contact_points_with_configured_law() {
    let config = RobotConfig::default();
    let model = model(&config);
    let points = model.contact_points();
    let expected = config.contact.soft_contact_model().unwrap();

    assert_eq!(points.len(), 4);
    for side in Side::BOTH {
        for body in [*model.feet().get(side), *model.hands().get(side)] {
            let on_body: Vec<_> = points.for_body(body).collect();
            assert_eq!(on_body.len(), 1);
            assert_eq!(on_body[0].model, expected);
        }
    }
    assert_eq!(expected.normal.n, 1.5);
    assert_eq!(expected.tangential.mu, 0.8);
}

#[test]
fn no_contacts_flag_skips_points() {
    let config = RobotConfig::default();
    let model = ModelBuilder::new(&config)
        .with_contacts(false)
        .build(&description_path())
        .unwrap();
    assert!(model.contact_points().is_empty());
}

#[test]
fn nominal_state_is_deterministic() {
    let config = RobotConfig::default();
    let model = model(&config);

    let first = nominal_state(&model, &config.nominal).unwrap();
    let second = nominal_state(&model, &config.nominal).unwrap();
    assert_eq!(first, second);

    let base = first
        .configuration(model.mechanism(), model.floating_base())
        .unwrap();
    assert_eq!(base, &[0.0, 0.8, 0.0]);
    assert!(first.v().iter().all(|v| *v == 0.0));

    // Two separately built bundles agree too
    assert_eq!(
        bundle(&config).nominal_state(),
        bundle(&config).nominal_state()
    );
}

#[test]
fn cost_weights_follow_layout() {
    let config = RobotConfig::default();
    let bundle = bundle(&config);
    let mechanism = bundle.mechanism();
    let cost = bundle.cost();
    let nq = mechanism.num_positions();

    assert!(cost.is_positive_diagonal());
    assert_eq!(cost.q.shape(), (18, 18));
    assert_eq!(cost.r.shape(), (9, 9));

    let base = mechanism.configuration_range(bundle.model().floating_base()).unwrap();
    assert_eq!(cost.q[(base.start, base.start)], 100.0);
    assert_eq!(cost.q[(base.start + 1, base.start + 1)], 1000.0);
    assert_eq!(cost.q[(base.start + 2, base.start + 2)], 1000.0);

    let base_v = mechanism.velocity_range(bundle.model().floating_base()).unwrap();
    assert_eq!(cost.q[(nq + base_v.start + 1, nq + base_v.start + 1)], 100.0);

    let rh_rotation = bundle.model().hand_rotation().right;
    let idx = mechanism.configuration_range(rh_rotation).unwrap().start;
    assert_eq!(cost.q[(idx, idx)], 10.0);
    let idx = mechanism.velocity_range(rh_rotation).unwrap().start;
    assert_eq!(cost.q[(nq + idx, nq + idx)], 1.0);

    assert!(cost.r.diagonal().iter().all(|r| *r == 1e-3));
}

#[test]
fn unlisted_joints_get_default_weight() {
    let mut config = RobotConfig::default();
    config.cost.position.remove("core_to_lf_extension");
    let model = model(&config);
    let cost = CostMatrices::build(model.mechanism(), &config.cost).unwrap();

    let idx = model
        .mechanism()
        .configuration_range(model.leg_extension().left)
        .unwrap()
        .start;
    assert_eq!(cost.q[(idx, idx)], 0.1);
}

#[test]
fn unknown_weight_joint_is_fatal() {
    let mut config = RobotConfig::default();
    config.cost.velocity.insert("tail".into(), vec![1.0]);
    let model = model(&config);
    let err = CostMatrices::build(model.mechanism(), &config.cost).unwrap_err();
    assert!(matches!(err, sk_robot::RobotError::MissingJoint(name) if name == "tail"));

    let mut config = RobotConfig::default();
    config.cost.position.insert("floating_base".into(), vec![1.0]);
    let err = CostMatrices::build(model.mechanism(), &config.cost).unwrap_err();
    assert!(matches!(
        err,
        sk_robot::RobotError::WeightCount { expected: 3, actual: 1, .. }
    ));
}

#[test]
fn contact_location_must_match_description_points() {
    let mut config = RobotConfig::default();
    config.contact.location = [0.0, 0.0, -0.05];
    let model = model(&config);
    let proxy = DoubleIntegratorProxy {
        positions: model.mechanism().num_velocities(),
    };

    let err = MpcBundle::build(model, &config, &proxy).unwrap_err();
    let sk_robot::RobotError::ContactLocationMismatch { body, assigned, .. } = err else {
        panic!("expected a contact location mismatch");
    };
    assert!(["l_hand", "r_foot", "l_foot"].contains(&body.as_str()));
    assert_eq!(assigned, [0.0, 0.0, -0.05]);

    // Without assigned points there is nothing to disagree with
    let bare = ModelBuilder::new(&config)
        .with_contacts(false)
        .build(&description_path())
        .unwrap();
    assert!(MpcBundle::build(bare, &config, &proxy).is_ok());
}

#[test]
fn horizontal_invariance_zeroes_base_x() {
    let bundle = bundle(&RobotConfig::default());
    let lqr = bundle.lqr();
    let x = bundle
        .mechanism()
        .configuration_range(bundle.model().floating_base())
        .unwrap()
        .start;

    assert_eq!(lqr.invariant_coordinate, Some(x));
    assert!(lqr.s.row(x).iter().all(|v| *v == 0.0));
    assert!(lqr.s.column(x).iter().all(|v| *v == 0.0));
    assert!(lqr.k.column(x).iter().all(|v| *v == 0.0));
    assert!(lqr.s[(x + 1, x + 1)] > 0.0);
    assert_eq!(lqr.dt, bundle.mpc_params().dt);
}

#[test]
fn without_invariance_lqr_is_raw_output() {
    let mut config = RobotConfig::default();
    config.lqr.horizontal_invariance = false;
    let bundle = bundle(&config);
    let lqr = bundle.lqr();

    let nv = bundle.mechanism().num_velocities();
    let proxy = DoubleIntegratorProxy { positions: nv };
    let lin = proxy.linearize(&lqr.x0, &lqr.u0, config.mpc.dt).unwrap();
    let raw = solve_discrete_riccati(&lin.a, &lin.b, &bundle.cost().q, &bundle.cost().r, &config.lqr.riccati)
        .unwrap();

    assert_eq!(lqr.invariant_coordinate, None);
    assert_eq!(lqr.s, raw.s);
    assert_eq!(lqr.k, raw.k);
}

#[test]
fn reference_points_are_the_feet_on_the_floor() {
    let bundle = bundle(&RobotConfig::default());
    let refs = &bundle.lqr().reference_points;

    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].side, Side::Left);
    assert_eq!(refs[0].body, bundle.model().feet().left);
    assert!((refs[0].position.x + 0.1).abs() < 1e-9);
    assert!((refs[1].position.x - 0.1).abs() < 1e-9);
    assert!(refs.iter().all(|p| p.position.z.abs() < 1e-9));
}

#[test]
fn summary_serializes() {
    let bundle = bundle(&RobotConfig::default());
    let summary = bundle.summary().unwrap();

    assert_eq!(summary.pairs.len(), 4);
    assert_eq!(summary.contact_points.len(), 4);
    assert_eq!(summary.feet.left, "l_foot");
    assert_eq!(summary.floating_base.effort_bounds, vec![Bounds::zero(); 3]);
    assert_eq!(summary.description_path, description_path());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["mpc"]["horizon"], 10);
    assert_eq!(json["surfaces"].as_array().unwrap().len(), 2);
}

#[test]
fn missing_description_reports_path() {
    let config = RobotConfig::default();
    let err = ModelBuilder::new(&config)
        .build(&PathBuf::from("no/such/robot.yaml"))
        .unwrap_err();
    assert!(err.to_string().contains("no/such/robot.yaml"), "{err}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn weights_stay_positive_diagonal(
        r in 1e-9f64..1e3,
        default_position in 1e-6f64..1e2,
        default_velocity in 1e-6f64..1e2,
        base_z in 1e-3f64..1e4,
    ) {
        let mut config = RobotConfig::default();
        config.cost.r = r;
        config.cost.default_position = default_position;
        config.cost.default_velocity = default_velocity;
        config.cost.position.insert("floating_base".into(), vec![100.0, base_z, 1000.0]);
        let model = model(&config);

        let cost = CostMatrices::build(model.mechanism(), &config.cost).unwrap();
        prop_assert!(cost.is_positive_diagonal());
        prop_assert_eq!(cost.r.nrows(), model.mechanism().num_velocities());
    }
}
