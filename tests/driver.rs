use approx::assert_abs_diff_eq;
use fmgc_vnav::physics::SimplifiedPerformanceModel;
use fmgc_vnav::pseudo_waypoints::{AutoflightAction, SequencingAction};
use fmgc_vnav::scenario::Scenario;
use fmgc_vnav::scheduler::TickScheduler;
use fmgc_vnav::vnav::VerticalCheckpointReason;
use fmgc_vnav::{VnavConfig, VnavDriver};
use std::rc::Rc;

/// Eight one-degree legs along the equator, departing on the ground.
fn equator_scenario() -> Scenario {
    let legs = (0..8)
        .map(|i| {
            let segment = match i {
                0 => "Departure",
                7 => "Approach",
                _ => "Enroute",
            };
            format!(
                r#"{{"ident": "WPT{}", "from": {{"lat": 0.0, "long": {}.0}}, "to": {{"lat": 0.0, "long": {}.0}}, "segment": "{}"}}"#,
                i + 1,
                i,
                i + 1,
                segment
            )
        })
        .collect::<Vec<_>>()
        .join(",");

    let json = format!(
        r#"{{
            "legs": [{}],
            "parameters": {{
                "cruise_altitude": 10000.0,
                "thrust_reduction_altitude": 1500.0,
                "acceleration_altitude": 1500.0,
                "v2_speed": 140.0,
                "zero_fuel_weight": 60.0,
                "fuel_on_board": 10.0,
                "managed_climb_speed": 290.0
            }},
            "environment": {{"on_ground": true, "toga_thrust_limit": 95.0}}
        }}"#,
        legs
    );
    Scenario::from_json_str(&json).unwrap()
}

fn driver_for(scenario: &Scenario) -> VnavDriver {
    let mut driver = VnavDriver::new(
        VnavConfig::default(),
        Rc::new(SimplifiedPerformanceModel::default()),
    );
    let geometry = Rc::new(scenario.build_geometry().unwrap());
    driver.accept_multiple_leg_geometry(geometry, &scenario.snapshot());
    driver
}

#[test]
fn test_preflight_profile_is_complete() {
    let scenario = equator_scenario();
    let driver = driver_for(&scenario);
    let profile = driver.current_geometry_profile().unwrap();

    assert!(profile.is_ready_to_display());
    let checkpoints = profile.checkpoints();
    assert_eq!(checkpoints[0].reason, VerticalCheckpointReason::Liftoff);
    assert!(checkpoints
        .windows(2)
        .all(|pair| pair[0].distance_from_start <= pair[1].distance_from_start));

    let toc = profile
        .find_vertical_checkpoint(VerticalCheckpointReason::TopOfClimb)
        .unwrap();
    assert_abs_diff_eq!(toc.altitude, 10000.);

    let total = profile.total_flight_plan_distance();
    assert!(total > 470. && total < 490.);
    assert_abs_diff_eq!(
        driver.current_approach_profile().decel.unwrap(),
        total - 16.,
        epsilon = 1e-6
    );
    let tod = driver.current_descent_profile().tod.unwrap();
    assert!(toc.distance_from_start < tod && tod < total - 16.);

    assert_eq!(profile.compute_predictions_at_waypoints().len(), 8);
}

#[test]
fn test_decel_is_placed_on_the_last_leg() {
    let scenario = equator_scenario();
    let driver = driver_for(&scenario);

    let decel = driver
        .pseudo_waypoints()
        .pseudo_waypoints()
        .iter()
        .find(|pseudo_waypoint| pseudo_waypoint.ident == "(DECEL)")
        .unwrap();
    assert_eq!(decel.along_leg_index, 7);
    assert_abs_diff_eq!(decel.distance_from_leg_termination, 16., epsilon = 1e-6);
    assert_eq!(
        decel.sequencing_action,
        Some(SequencingAction::ApproachPhaseAutoEngage)
    );

    let idents = driver
        .pseudo_waypoints()
        .pseudo_waypoints()
        .iter()
        .map(|pseudo_waypoint| pseudo_waypoint.ident.as_str())
        .collect::<Vec<_>>();
    assert!(idents.contains(&"(T/C)"));
    assert!(idents.contains(&"(T/D)"));
}

#[test]
fn test_sequencing_top_of_descent() {
    let scenario = equator_scenario();
    let mut driver = driver_for(&scenario);
    let mut scheduler = TickScheduler::<AutoflightAction>::new();
    let mut snapshot = scenario.snapshot();

    let tod_leg = driver
        .pseudo_waypoints()
        .pseudo_waypoints()
        .iter()
        .find(|pseudo_waypoint| pseudo_waypoint.ident == "(T/D)")
        .unwrap()
        .along_leg_index;

    // Well before the top of descent.
    snapshot.guidance.active_leg_index = 0;
    snapshot.guidance.active_leg_complete_leg_path_dtg = 60.;
    assert!(driver.update(&snapshot, &mut scheduler).is_empty());
    assert!(driver
        .pseudo_waypoints()
        .current_pseudo_waypoints()
        .iter()
        .any(|pseudo_waypoint| pseudo_waypoint.ident == "(T/D)"));

    // Sequence the leg holding the top of descent.
    snapshot.guidance.active_leg_index = tod_leg + 1;
    let actions = driver.update(&snapshot, &mut scheduler);
    assert!(actions.contains(&AutoflightAction::TopOfDescentReached));
}
