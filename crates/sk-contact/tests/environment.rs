//! Integration tests for contact environment construction and assignment.

use std::path::PathBuf;

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use sk_contact::{
    AllowList, ContactEnvironmentBuilder, ContactError, ContactForceModelAssigner, ContactPlane,
    ContactPoints, HuntCrossley, SoftContactModel, ViscoelasticCoulomb,
};
use sk_mechanism::{ContactDef, Description, Mechanism, MechanismState, ObstacleDef};

const BODIES: [&str; 4] = ["r_hand", "l_hand", "r_foot", "l_foot"];
const OBSTACLES: [&str; 2] = ["floor", "wall"];

fn description() -> Description {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // go to crates
    path.pop(); // go to repo root
    path.push("descriptions");
    path.push("box_robot.yaml");
    Description::load_yaml(&path).unwrap()
}

fn standing(mechanism: &Mechanism) -> MechanismState {
    let mut state = MechanismState::zero(mechanism);
    let set = |state: &mut MechanismState, joint: &str, q: &[f64]| {
        let id = mechanism.find_joint(joint).unwrap().id;
        state.set_configuration(mechanism, id, q).unwrap();
    };
    set(&mut state, "floating_base", &[0.0, 0.8, 0.0]);
    set(&mut state, "core_to_lf_extension", &[0.8]);
    set(&mut state, "core_to_rf_extension", &[0.8]);
    set(&mut state, "core_to_lh_extension", &[0.5]);
    set(&mut state, "core_to_rh_extension", &[0.5]);
    state
}

fn scenario_allow_list() -> AllowList {
    AllowList::new()
        .allow("r_hand", Vec::<String>::new())
        .allow("l_hand", ["wall"])
        .allow("r_foot", ["floor"])
        .allow("l_foot", ["floor", "wall"])
}

fn soft_model() -> SoftContactModel {
    SoftContactModel::new(
        HuntCrossley::hertz(500e3, 0.2).unwrap(),
        ViscoelasticCoulomb::new(0.8, 20e3, 100.0).unwrap(),
    )
}

#[test]
fn scenario_floor_and_wall() {
    let description = description();
    let mut mechanism = description.build_mechanism().unwrap();
    let nominal = standing(&mechanism);

    let env = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &nominal, &scenario_allow_list())
        .unwrap();

    assert_eq!(env.pairs().len(), 4);
    assert!(env.has_pair("l_hand", "wall"));
    assert!(env.has_pair("r_foot", "floor"));
    assert!(env.has_pair("l_foot", "floor"));
    assert!(env.has_pair("l_foot", "wall"));

    let right_hand = mechanism.find_body("r_hand").unwrap().id;
    assert_eq!(env.pairs_for_body(right_hand).count(), 0);
}

#[test]
fn shared_obstacles_are_registered_once() {
    let description = description();
    let mut mechanism = description.build_mechanism().unwrap();
    let nominal = standing(&mechanism);

    let env = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &nominal, &scenario_allow_list())
        .unwrap();

    // 8 raw entries reference 2 obstacles
    assert_eq!(env.surfaces().len(), 2);
    assert_eq!(mechanism.environment_primitives().len(), 2);

    let wall = env.surface_named("wall").unwrap();
    assert_eq!(mechanism.environment_primitives()[wall.primitive], wall.half_space);
    assert!((wall.half_space.point.x + 0.6).abs() < 1e-12);
    assert!((wall.half_space.outward_normal.x - 1.0).abs() < 1e-12);
    assert_eq!(wall.friction, 0.5);
}

#[test]
fn scale_applies_to_obstacle_faces_and_contact_points() {
    let mut description = description();
    for contact in description.contacts.iter_mut().filter(|c| c.body == "l_foot") {
        contact.point = [0.1, 0.0, 0.0];
    }
    let mut mechanism = description.build_mechanism().unwrap();
    let nominal = standing(&mechanism);

    let env = ContactEnvironmentBuilder::new(&description)
        .with_scale(2.0)
        .build(&mut mechanism, &nominal, &scenario_allow_list())
        .unwrap();

    // World-attached faces are scaled in their own frame
    let wall = env.surface_named("wall").unwrap();
    assert!((wall.half_space.point.x + 1.2).abs() < 1e-12);

    let foot_points: Vec<_> = env
        .pairs()
        .iter()
        .filter(|p| p.body_name == "l_foot")
        .map(|p| p.point)
        .collect();
    assert_eq!(foot_points.len(), 2);
    for point in foot_points {
        assert!((point - Point3::new(0.2, 0.0, 0.0)).norm() < 1e-12);
    }
}

fn with_core_pad(mut description: Description) -> Description {
    description.obstacles.push(ObstacleDef {
        name: "pad".to_string(),
        body: "core".to_string(),
        point: [0.2, 0.0, 0.0],
        normal: [1.0, 0.0, 0.0],
        friction: 0.5,
    });
    description.contacts.push(ContactDef {
        body: "l_foot".to_string(),
        point: [0.0; 3],
        obstacle: "pad".to_string(),
    });
    description
}

#[test]
fn obstacles_on_moving_bodies_use_reference_pose() {
    let description = with_core_pad(description());
    let allow = AllowList::new().allow("l_foot", ["pad"]);

    let mut mechanism = description.build_mechanism().unwrap();
    let mut pitched = standing(&mechanism);
    let base = mechanism.find_joint("floating_base").unwrap().id;
    pitched
        .set_configuration(&mechanism, base, &[1.0, 0.5, std::f64::consts::FRAC_PI_2])
        .unwrap();

    let env = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &pitched, &allow)
        .unwrap();
    let pad = env.surface_named("pad").unwrap();
    assert!((pad.half_space.point - Point3::new(1.0, 0.0, 0.3)).norm() < 1e-9);
    let down = Vector3::new(0.0, 0.0, -1.0);
    assert!((pad.half_space.outward_normal.into_inner() - down).norm() < 1e-9);
    assert!(env.has_pair("l_foot", "pad"));

    // Same description, different reference: geometry follows the reference
    let mut mechanism = description.build_mechanism().unwrap();
    let zero = MechanismState::zero(&mechanism);
    let env = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &zero, &allow)
        .unwrap();
    let pad = env.surface_named("pad").unwrap();
    assert!((pad.half_space.point - Point3::new(0.2, 0.0, 0.0)).norm() < 1e-9);
    assert!((pad.half_space.outward_normal.into_inner() - Vector3::x()).norm() < 1e-9);
}

#[test]
fn duplicate_contact_entries_yield_one_pair() {
    let mut description = description();
    let repeated = description.contacts[0].clone();
    description.contacts.push(repeated);
    let mut mechanism = description.build_mechanism().unwrap();
    let nominal = standing(&mechanism);

    let env = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &nominal, &scenario_allow_list())
        .unwrap();

    assert_eq!(env.pairs().len(), 4);
    let floor_pairs = env
        .pairs()
        .iter()
        .filter(|p| p.body_name == "l_foot" && p.obstacle_name == "floor")
        .count();
    assert_eq!(floor_pairs, 1);
}

#[test]
fn out_of_plane_obstacles_are_skipped() {
    let mut description = description();
    description.obstacles[1].normal = [0.0, 1.0, 0.0];
    let mut mechanism = description.build_mechanism().unwrap();
    let nominal = standing(&mechanism);

    let env = ContactEnvironmentBuilder::new(&description)
        .with_plane(ContactPlane::Xz)
        .build(&mut mechanism, &nominal, &scenario_allow_list())
        .unwrap();

    assert_eq!(env.surfaces().len(), 1);
    assert!(!env.pairs().iter().any(|p| p.obstacle_name == "wall"));
}

#[test]
fn allow_list_with_unknown_names_fails() {
    let description = description();
    let mut mechanism = description.build_mechanism().unwrap();
    let nominal = standing(&mechanism);

    let bad_body = AllowList::new().allow("tail", ["floor"]);
    let err = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &nominal, &bad_body)
        .unwrap_err();
    assert!(matches!(err, ContactError::UnknownAllowedBody(name) if name == "tail"));

    let bad_obstacle = AllowList::new().allow("l_foot", ["ceiling"]);
    let err = ContactEnvironmentBuilder::new(&description)
        .build(&mut mechanism, &nominal, &bad_obstacle)
        .unwrap_err();
    assert!(matches!(err, ContactError::ObstacleNotFound(name) if name == "ceiling"));
}

#[test]
fn one_contact_point_per_end_effector() {
    let description = description();
    let mechanism = description.build_mechanism().unwrap();
    let model = soft_model();

    let mut points = ContactPoints::new();
    let added = ContactForceModelAssigner::new(model)
        .assign(&mechanism, &mut points, &BODIES)
        .unwrap();

    assert_eq!(added, 4);
    assert_eq!(points.len(), 4);
    for name in BODIES {
        let body = mechanism.find_body(name).unwrap().id;
        let on_body: Vec<_> = points.for_body(body).collect();
        assert_eq!(on_body.len(), 1, "{name}");
        assert_eq!(on_body[0].model, model);
        assert_eq!(on_body[0].location, Point3::origin());
    }
}

#[test]
fn repeated_assignment_does_not_duplicate() {
    let description = description();
    let mechanism = description.build_mechanism().unwrap();
    let assigner = ContactForceModelAssigner::new(soft_model());

    let mut points = ContactPoints::new();
    assigner.assign(&mechanism, &mut points, &BODIES).unwrap();
    let added = assigner.assign(&mechanism, &mut points, &BODIES).unwrap();

    assert_eq!(added, 0);
    assert_eq!(points.len(), 4);
}

#[test]
fn unknown_end_effector_leaves_points_untouched() {
    let description = description();
    let mechanism = description.build_mechanism().unwrap();

    let mut points = ContactPoints::new();
    let res = ContactForceModelAssigner::new(soft_model()).assign(
        &mechanism,
        &mut points,
        &["l_foot", "tail"],
    );
    assert!(res.is_err());
    assert!(points.is_empty());
}

fn allow_list_strategy() -> impl Strategy<Value = AllowList> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), OBSTACLES.len()), BODIES.len())
        .prop_map(|masks| {
            BODIES
                .iter()
                .zip(masks)
                .fold(AllowList::new(), |allow, (body, mask)| {
                    let obstacles: Vec<&str> = OBSTACLES
                        .iter()
                        .zip(mask)
                        .filter_map(|(o, keep)| keep.then_some(*o))
                        .collect();
                    allow.allow(*body, obstacles)
                })
        })
}

proptest! {
    #[test]
    fn surviving_pairs_are_always_allowed(allow in allow_list_strategy()) {
        let description = description();
        let mut mechanism = description.build_mechanism().unwrap();
        let nominal = standing(&mechanism);

        let env = ContactEnvironmentBuilder::new(&description)
            .build(&mut mechanism, &nominal, &allow)
            .unwrap();

        for pair in env.pairs() {
            prop_assert!(allow.permits(&pair.body_name, &pair.obstacle_name));
        }
        let expected: usize = BODIES.iter().map(|b| allow.obstacles_for(b).len()).sum();
        prop_assert_eq!(env.pairs().len(), expected);
    }
}
