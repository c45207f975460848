//! Tests for the time loop, trigger cascade, interception coordinator, alien
//! missions and craft upkeep.

use geoscape_campaign::MissionRequest;
use geoscape_core::commands::PlayerCommand;
use geoscape_core::components::{AlienBase, Craft, MissionSite, PlayerBase, Ufo};
use geoscape_core::enums::*;
use geoscape_core::error::GeoscapeError;
use geoscape_core::events::Notification;
use geoscape_core::geo::{GeoArea, LandPolygon};
use geoscape_core::ruleset::*;
use geoscape_core::types::*;
use geoscape_core::weights::{MonthlyWeights, WeightedOptions};
use geoscape_core::Target;

use crate::dogfight::{Admission, InterceptionCoordinator};
use crate::engine::{GeoscapeEngine, SimConfig};
use crate::systems::clock::cascade;

fn one(id: &str) -> MonthlyWeights {
    MonthlyWeights::always(WeightedOptions::new().with(id, 1))
}

fn test_ruleset() -> Ruleset {
    Ruleset {
        ufos: vec![
            UfoRule {
                id: "scout".into(),
                hull: 100,
                ..UfoRule::default()
            },
            UfoRule {
                id: "hk".into(),
                max_speed: 5000.0,
                shield_capacity: 50,
                hunter_killer: true,
                hunt_radius_nm: 500.0,
                ..UfoRule::default()
            },
        ],
        crafts: vec![CraftRule {
            id: "interceptor".into(),
            weapons: vec![CraftWeaponRule {
                id: "cannon".into(),
                damage: 100,
                accuracy: 100,
                clip_item: Some("cannon_clip".into()),
                ..CraftWeaponRule::default()
            }],
            ..CraftRule::default()
        }],
        trajectories: vec![
            TrajectoryRule {
                id: "flyby".into(),
                ground_timer_secs: 600,
                points: vec![
                    TrajectoryPoint {
                        zone: 0,
                        ..TrajectoryPoint::default()
                    },
                    TrajectoryPoint {
                        zone: 1,
                        altitude: Altitude::Ground,
                        ..TrajectoryPoint::default()
                    },
                    TrajectoryPoint {
                        zone: 0,
                        altitude: Altitude::High,
                        ..TrajectoryPoint::default()
                    },
                ],
            },
            TrajectoryRule {
                id: "drop".into(),
                ground_timer_secs: 0,
                points: vec![
                    TrajectoryPoint::default(),
                    TrajectoryPoint {
                        zone: 1,
                        altitude: Altitude::Ground,
                        ..TrajectoryPoint::default()
                    },
                ],
            },
        ],
        missions: vec![
            MissionRule {
                id: "research".into(),
                objective: MissionObjective::Score,
                waves: vec![MissionWave {
                    ufo: "scout".into(),
                    count: 1,
                    trajectory: "flyby".into(),
                    ..MissionWave::default()
                }],
                race_weights: one("sectoid"),
                ..MissionRule::default()
            },
            MissionRule {
                id: "terror".into(),
                objective: MissionObjective::Site,
                waves: vec![MissionWave {
                    ufo: "scout".into(),
                    count: 1,
                    trajectory: "drop".into(),
                    ..MissionWave::default()
                }],
                race_weights: one("sectoid"),
                ..MissionRule::default()
            },
        ],
        regions: vec![RegionRule {
            id: "north".into(),
            weight: 1,
            mission_weights: WeightedOptions::new().with("research", 1),
            areas: vec![GeoArea::new(-10.0, 10.0, 40.0, 50.0)],
            zones: vec![
                MissionZone {
                    areas: vec![GeoArea::new(-10.0, -5.0, 40.0, 45.0)],
                },
                MissionZone {
                    areas: vec![GeoArea::new(5.0, 10.0, 45.0, 50.0)],
                },
            ],
        }],
        races: vec![RaceRule {
            id: "sectoid".into(),
            supply_mission: None,
        }],
        mission_script: vec![MissionScriptCommand {
            name: "opening".into(),
            region_weights: one("north"),
            mission_weights: one("research"),
            max_runs: 1,
            ..MissionScriptCommand::default()
        }],
        ..Ruleset::default()
    }
}

fn engine_at(start_time: GameTime) -> GeoscapeEngine {
    GeoscapeEngine::new(
        SimConfig {
            start_time,
            ..Default::default()
        },
        test_ruleset(),
    )
}

fn request(mission: &str) -> MissionRequest {
    MissionRequest {
        command: "test".into(),
        mission: mission.into(),
        region: "north".into(),
        race: "sectoid".into(),
        objective: MissionObjective::Score,
        delay_minutes: 0,
        site: None,
    }
}

fn ufo_mut(engine: &mut GeoscapeEngine, ufo: UfoId) -> hecs::RefMut<'_, Ufo> {
    let ctx = engine.context_mut();
    let entity = ctx.registry.ufo(ufo).unwrap();
    ctx.world.get::<&mut Ufo>(entity).unwrap()
}

/// Launch `craft` at `ufo` and step until the session is on the active list.
fn engage(engine: &mut GeoscapeEngine, craft: CraftId, ufo: UfoId) {
    engine.queue_command(PlayerCommand::LaunchCraft {
        craft,
        target: Target::Ufo(ufo),
    });
    for _ in 0..50 {
        engine.advance(TimeSpeed::FiveSeconds).unwrap();
        if !engine.dogfights().active().is_empty() {
            return;
        }
    }
    panic!("craft {craft} never engaged ufo {ufo}");
}

/// Base at the origin, one interceptor and a scout 0.3 degrees east flying
/// higher than the interceptor can reach.
fn out_of_reach_engine() -> (GeoscapeEngine, CraftId, UfoId) {
    let mut ruleset = test_ruleset();
    ruleset.crafts[0].max_altitude = Altitude::Low;
    let mut engine = GeoscapeEngine::new(SimConfig::default(), ruleset);
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let craft = engine.add_craft("interceptor", base).unwrap();
    let ufo = engine
        .spawn_ufo("scout", Position::from_degrees(0.3, 0.0))
        .unwrap();
    ufo_mut(&mut engine, ufo).altitude = Altitude::High;
    (engine, craft, ufo)
}

// ---- Clock and cascade ----

#[test]
fn test_cascade_runs_coarsest_first() {
    let levels: Vec<TimeTrigger> = cascade(TimeTrigger::OneHour).collect();
    assert_eq!(
        levels,
        vec![
            TimeTrigger::OneHour,
            TimeTrigger::ThirtyMinutes,
            TimeTrigger::TenMinutes,
            TimeTrigger::FiveSeconds,
        ]
    );
    let levels: Vec<TimeTrigger> = cascade(TimeTrigger::FiveSeconds).collect();
    assert_eq!(levels, vec![TimeTrigger::FiveSeconds]);
}

#[test]
fn test_month_boundary_fires_every_handler_once() {
    let mut engine = engine_at(GameTime::new(1999, 1, 31, 23, 59, 55));
    let report = engine.advance(TimeSpeed::FiveSeconds).unwrap();

    assert_eq!(report.steps, 1);
    assert_eq!(report.triggers, [1; 6], "Each level should fire exactly once");
    assert_eq!(
        engine.context().last_cascade,
        TimeTrigger::DESCENDING.to_vec(),
        "Handlers should run month, day, hour, 30m, 10m, 5s"
    );
    assert_eq!(engine.time(), GameTime::new(1999, 2, 1, 0, 0, 0));
    assert_eq!(engine.context().campaign.months_passed, 1);
}

#[test]
fn test_one_day_at_hour_speed() {
    let mut engine = engine_at(GameTime::new(1999, 1, 9, 0, 0, 0));
    for _ in 0..24 {
        let report = engine.advance(TimeSpeed::OneHour).unwrap();
        assert_eq!(report.steps, 720);
    }
    let counts = engine.trigger_counts();
    assert_eq!(counts[TimeTrigger::OneMonth.index()], 0);
    assert_eq!(counts[TimeTrigger::OneDay.index()], 1);
    assert_eq!(counts[TimeTrigger::OneHour.index()], 24);
    assert_eq!(counts[TimeTrigger::ThirtyMinutes.index()], 48);
    assert_eq!(counts[TimeTrigger::TenMinutes.index()], 144);
    assert_eq!(counts[TimeTrigger::FiveSeconds.index()], 17_280);
    assert_eq!(engine.time(), GameTime::new(1999, 1, 10, 0, 0, 0));
}

#[test]
fn test_failed_handler_does_not_skip_lower_levels() {
    let mut engine = engine_at(GameTime::new(1999, 1, 1, 23, 59, 55));
    {
        let ctx = engine.context_mut();
        let base = ctx.spawn_alien_base("north", "ghost", Position::default());
        let entity = ctx.registry.entity(Target::AlienBase(base)).unwrap();
        ctx.world
            .get::<&mut AlienBase>(entity)
            .unwrap()
            .supply_days_remaining = 1;
    }
    let ufo = engine.spawn_ufo("scout", Position::default()).unwrap();
    {
        let mut u = ufo_mut(&mut engine, ufo);
        u.status = UfoStatus::Crashed;
        u.seconds_remaining = 1800;
    }

    let result = engine.advance(TimeSpeed::FiveSeconds);
    assert!(matches!(result, Err(GeoscapeError::UnknownRace(_))));
    assert_eq!(engine.time(), GameTime::new(1999, 1, 2, 0, 0, 0));
    assert_eq!(
        engine.context().last_cascade,
        vec![
            TimeTrigger::OneDay,
            TimeTrigger::OneHour,
            TimeTrigger::ThirtyMinutes,
            TimeTrigger::TenMinutes,
            TimeTrigger::FiveSeconds,
        ]
    );
    assert!(
        engine.snapshot().ufos.is_empty(),
        "Crash expiry and cleanup still ran after the daily handler failed"
    );
}

// ---- Notifications ----

#[test]
fn test_notification_blocks_time() {
    let mut engine = engine_at(GameTime::default());
    engine.notify(Notification::ResearchComplete {
        topic: "laser".into(),
    });
    assert_eq!(engine.suspension(), Suspension::AwaitingNotification);

    let report = engine.advance(TimeSpeed::OneHour).unwrap();
    assert_eq!(report.steps, 0, "No step may run while a notification waits");
    assert_eq!(engine.time(), GameTime::default());

    let popped = engine.dismiss_notification().unwrap();
    assert_eq!(popped.seq, 0);
    assert_eq!(engine.suspension(), Suspension::Running);
    let report = engine.advance(TimeSpeed::OneHour).unwrap();
    assert_eq!(report.steps, 720);
}

#[test]
fn test_notifications_pop_in_order() {
    let mut engine = engine_at(GameTime::default());
    engine.notify(Notification::ResearchComplete { topic: "a".into() });
    engine.notify(Notification::ResearchComplete { topic: "b".into() });
    let first = engine.dismiss_notification().unwrap();
    let second = engine.dismiss_notification().unwrap();
    assert!(first.seq < second.seq);
    assert_eq!(
        second.notification,
        Notification::ResearchComplete { topic: "b".into() }
    );
    assert!(engine.dismiss_notification().is_none());
}

#[test]
fn test_hyper_detection_raises_notification() {
    let mut engine = engine_at(GameTime::new(1999, 1, 1, 12, 29, 55));
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    {
        let ctx = engine.context_mut();
        let entity = ctx.registry.base(base).unwrap();
        ctx.world.get::<&mut PlayerBase>(entity).unwrap().hyper_detection = true;
    }
    let ufo = engine
        .spawn_ufo("scout", Position::from_degrees(1.0, 1.0))
        .unwrap();

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.suspension, Suspension::AwaitingNotification);
    assert_eq!(
        snapshot.pending_notifications[0].notification,
        Notification::UfoDetected { ufo, hyper: true }
    );
    assert!(snapshot.ufos[0].hyper_detected);

    let report = engine.advance(TimeSpeed::OneMinute).unwrap();
    assert_eq!(report.steps, 0);
}

// ---- Interception coordinator ----

#[test]
fn test_ordinary_sessions_capped_at_four() {
    let mut coordinator = InterceptionCoordinator::new(3);
    for i in 1..=4 {
        assert_eq!(coordinator.request(CraftId(i), UfoId(100 + i)), Admission::Admitted);
    }
    assert_eq!(
        coordinator.request(CraftId(5), UfoId(105)),
        Admission::AtCapacity,
        "Fifth ordinary session must be refused"
    );
    assert_eq!(
        coordinator.request(CraftId(1), UfoId(105)),
        Admission::AlreadyEngaged
    );
    assert_eq!(coordinator.non_hunter_killer_count(), 4);
}

#[test]
fn test_hunter_killer_overrides_ordinary_sessions() {
    let mut coordinator = InterceptionCoordinator::new(3);
    for i in 1..=3 {
        coordinator.request(CraftId(i), UfoId(100 + i));
    }
    let (admission, cancelled) = coordinator.request_hunter_killer(CraftId(9), UfoId(200), &[]);
    assert_eq!(admission, Admission::Admitted);
    assert_eq!(cancelled.len(), 3);
    assert_eq!(coordinator.non_hunter_killer_count(), 0);
    assert_eq!(coordinator.hunter_killer_count(), 1);

    let (second, _) = coordinator.request_hunter_killer(CraftId(8), UfoId(201), &[]);
    assert_eq!(second, Admission::HunterKillerActive);
    assert_eq!(
        coordinator.request(CraftId(7), UfoId(202)),
        Admission::HunterKillerActive
    );
}

#[test]
fn test_promotion_waits_for_zoom_and_assigns_slots() {
    let mut coordinator = InterceptionCoordinator::new(3);
    for i in 1..=4 {
        coordinator.request(CraftId(i), UfoId(100 + i));
    }
    assert!(coordinator.update_transitions().is_empty());
    assert!(coordinator.update_transitions().is_empty());
    let promoted = coordinator.update_transitions();
    assert_eq!(promoted.len(), 4, "All pending sessions start together");
    assert!(!coordinator.has_pending());

    // Newest request is serviced first.
    let slot_of = |c: &InterceptionCoordinator, craft: u32| {
        c.session_for_craft(CraftId(craft)).map(|s| s.slot)
    };
    assert_eq!(slot_of(&coordinator, 4), Some(1));
    assert_eq!(slot_of(&coordinator, 1), Some(4));
    assert!(coordinator
        .active()
        .iter()
        .all(|s| s.interception_count == 4));

    coordinator.end_sessions_for_craft(CraftId(4));
    coordinator.request(CraftId(5), UfoId(105));
    for _ in 0..3 {
        coordinator.update_transitions();
    }
    assert_eq!(slot_of(&coordinator, 5), Some(1), "Lowest free slot is reused");
}

#[test]
fn test_hunter_killer_main_session_promoted_before_escorts() {
    let mut coordinator = InterceptionCoordinator::new(1);
    let escorts = [CraftId(2), CraftId(3), CraftId(4), CraftId(5)];
    let (admission, _) = coordinator.request_hunter_killer(CraftId(1), UfoId(50), &escorts);
    assert_eq!(admission, Admission::Admitted);
    assert_eq!(coordinator.pending().count(), 4, "At most three escorts join");

    coordinator.update_transitions();
    let main = coordinator.session_for_craft(CraftId(1)).unwrap();
    assert!(main.hunter_killer);
    assert_eq!(main.slot, 1);
    let joined = coordinator.session_for_craft(CraftId(2)).unwrap();
    assert!(joined.joined);
    assert!(coordinator.session_for_craft(CraftId(5)).is_none());
}

#[test]
fn test_restore_refused_while_waiting() {
    let mut coordinator = InterceptionCoordinator::new(0);
    coordinator.request(CraftId(1), UfoId(2));
    coordinator.update_transitions();
    coordinator.active_mut()[0].waiting = Some(DogfightWait::Altitude);
    assert!(coordinator.minimize(CraftId(1)));
    assert!(!coordinator.restore(CraftId(1)));
    coordinator.active_mut()[0].waiting = None;
    assert!(coordinator.restore(CraftId(1)));
}

// ---- Engine interceptions ----

#[test]
fn test_interception_destroys_ufo_and_craft_returns() {
    let mut engine = engine_at(GameTime::default());
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let craft = engine.add_craft("interceptor", base).unwrap();
    let ufo = engine
        .spawn_ufo("scout", Position::from_degrees(0.3, 0.0))
        .unwrap();
    engine.queue_command(PlayerCommand::LaunchCraft {
        craft,
        target: Target::Ufo(ufo),
    });

    let mut rounds = 0;
    let mut saw_transition = false;
    for _ in 0..100 {
        let report = engine.advance(TimeSpeed::FiveSeconds).unwrap();
        rounds += report.rounds;
        saw_transition |= report.suspension == Suspension::AwaitingTransition;
        if engine.snapshot().ufos.is_empty() {
            break;
        }
    }

    let snapshot = engine.snapshot();
    assert!(saw_transition, "Interception should wait for the zoom");
    assert_eq!(rounds, 1, "One volley destroys the scout");
    assert!(snapshot.ufos.is_empty(), "Destroyed UFO is removed");
    assert!(snapshot.dogfights.is_empty());
    let craft_view = &snapshot.crafts[0];
    assert!(craft_view.returning);
    assert!(!craft_view.in_dogfight);
}

#[test]
fn test_hunter_killer_shield_initialised_on_first_step() {
    let mut engine = engine_at(GameTime::default());
    let ufo = engine.spawn_ufo("hk", Position::from_degrees(0.0, 0.0)).unwrap();
    assert_eq!(engine.snapshot().ufos[0].shield, -1);

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let snapshot = engine.snapshot();
    let view = snapshot.ufos.iter().find(|u| u.id == ufo).unwrap();
    assert_eq!(view.shield, 50, "Uninitialised shield starts full");
}

#[test]
fn test_hunter_killer_attacks_craft_with_escort() {
    let mut engine = GeoscapeEngine::new(
        SimConfig {
            start_time: GameTime::new(1999, 1, 1, 12, 9, 55),
            escorts_join_fight: true,
            ..Default::default()
        },
        test_ruleset(),
    );
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let first = engine.add_craft("interceptor", base).unwrap();
    let second = engine.add_craft("interceptor", base).unwrap();
    let waypoint = engine.add_waypoint(Position::from_degrees(20.0, 0.0));
    engine.spawn_ufo("hk", Position::from_degrees(0.05, 0.0)).unwrap();
    for craft in [first, second] {
        engine.queue_command(PlayerCommand::LaunchCraft {
            craft,
            target: Target::Waypoint(waypoint),
        });
    }

    let report = engine.advance(TimeSpeed::OneMinute).unwrap();
    assert_eq!(report.steps, 1, "The attack stops the clock");
    assert_eq!(report.suspension, Suspension::AwaitingTransition);

    let pending: Vec<_> = engine.dogfights().pending().cloned().collect();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending.iter().filter(|s| s.hunter_killer).count(), 1);
    assert_eq!(pending.iter().filter(|s| s.joined).count(), 1);

    let mut rounds = 0;
    for _ in 0..20 {
        rounds += engine.advance(TimeSpeed::FiveSeconds).unwrap().rounds;
        if engine.snapshot().ufos.is_empty() {
            break;
        }
    }
    assert!(rounds >= 1);
    let snapshot = engine.snapshot();
    assert!(snapshot.ufos.is_empty(), "Hunter-killer downed over water");
    // The fight happened right over the base, so both craft dock at once.
    assert!(snapshot
        .crafts
        .iter()
        .all(|c| c.status == CraftStatus::Repairs && !c.in_dogfight));
}

#[test]
fn test_altitude_gate_waits_then_fights() {
    let (mut engine, craft, ufo) = out_of_reach_engine();
    engage(&mut engine, craft, ufo);

    let session = &engine.dogfights().active()[0];
    assert_eq!(session.waiting, Some(DogfightWait::Altitude));
    assert!(session.minimized, "Out-of-reach sessions start minimized");
    assert_eq!(engine.suspension(), Suspension::Running);

    let report = engine.advance(TimeSpeed::OneHour).unwrap();
    assert_eq!(report.steps, 1, "A minimized fight keeps the clock at 5 seconds");
    assert_eq!(report.rounds, 0);
    assert_eq!(
        engine.dogfights().active()[0].waiting,
        Some(DogfightWait::Altitude)
    );

    engine.queue_command(PlayerCommand::RestoreDogfight { craft });
    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    assert!(
        engine.dogfights().active()[0].minimized,
        "Manual restore is refused while waiting"
    );

    ufo_mut(&mut engine, ufo).altitude = Altitude::Low;
    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let session = &engine.dogfights().active()[0];
    assert_eq!(session.waiting, None);
    assert!(!session.minimized, "Restored once the UFO comes down");
    assert_eq!(engine.suspension(), Suspension::Intercepting);

    let mut rounds = 0;
    for _ in 0..20 {
        rounds += engine.advance(TimeSpeed::FiveSeconds).unwrap().rounds;
        if engine.snapshot().ufos.is_empty() {
            break;
        }
    }
    assert_eq!(rounds, 1);
    assert!(engine.snapshot().ufos.is_empty());
}

#[test]
fn test_terrain_gate_and_landing_cancels() {
    let mut ruleset = test_ruleset();
    ruleset.crafts[0].terrain = CraftTerrain::WaterOnly;
    ruleset.land = vec![LandPolygon {
        points: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
    }];
    let mut engine = GeoscapeEngine::new(SimConfig::default(), ruleset);
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let craft = engine.add_craft("interceptor", base).unwrap();
    let ufo = engine
        .spawn_ufo("scout", Position::from_degrees(0.3, 0.0))
        .unwrap();
    engage(&mut engine, craft, ufo);

    let session = &engine.dogfights().active()[0];
    assert_eq!(session.waiting, Some(DogfightWait::Terrain));
    assert!(session.minimized);

    {
        let mut u = ufo_mut(&mut engine, ufo);
        u.status = UfoStatus::Landed;
        u.seconds_remaining = 3600;
    }
    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    assert!(engine.dogfights().is_empty(), "A landed UFO ends the wait");
    let craft_view = &engine.snapshot().crafts[0];
    assert!(!craft_view.in_dogfight);
    assert!(!craft_view.returning, "Cancelled sessions leave the craft on station");
}

#[test]
fn test_ufo_leaving_earth_ends_session() {
    let (mut engine, craft, ufo) = out_of_reach_engine();
    engage(&mut engine, craft, ufo);
    {
        // Past the last point of its trajectory: the next arrival leaves Earth.
        let mut u = ufo_mut(&mut engine, ufo);
        u.mission = Some(MissionId(999));
        u.trajectory = "flyby".into();
        u.trajectory_point = 3;
    }

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let snapshot = engine.snapshot();
    assert!(snapshot.ufos.is_empty());
    assert!(engine.dogfights().is_empty());
    let craft_view = &snapshot.crafts[0];
    assert!(!craft_view.in_dogfight);
    assert!(craft_view.returning, "Craft heads home once its UFO is gone");
}

#[test]
fn test_crash_site_expires() {
    let mut engine = engine_at(GameTime::new(1999, 1, 1, 12, 29, 55));
    let ufo = engine.spawn_ufo("scout", Position::default()).unwrap();
    {
        let mut u = ufo_mut(&mut engine, ufo);
        u.status = UfoStatus::Crashed;
        u.seconds_remaining = 3600;
    }

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.ufos.len(), 1, "Half the timer is left");
    assert_eq!(snapshot.ufos[0].status, UfoStatus::Crashed);

    let report = engine.advance(TimeSpeed::ThirtyMinutes).unwrap();
    assert_eq!(report.steps, 360);
    assert_eq!(engine.time(), GameTime::new(1999, 1, 1, 13, 0, 0));
    assert!(engine.snapshot().ufos.is_empty(), "Expired crash site is removed");
}

#[test]
fn test_hunter_killer_ignores_docked_craft() {
    let mut engine = engine_at(GameTime::default());
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let craft = engine.add_craft("interceptor", base).unwrap();
    let hk = engine.spawn_ufo("hk", Position::from_degrees(0.05, 0.0)).unwrap();
    {
        let mut u = ufo_mut(&mut engine, hk);
        u.hunting = Some(craft);
        u.destination = Some(Target::Craft(craft));
    }

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    assert!(engine.dogfights().is_empty(), "No attack on a craft in its hangar");
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.ufos[0].hunting, None);
    let craft_view = &snapshot.crafts[0];
    assert_eq!(craft_view.status, CraftStatus::Ready);
    assert!(!craft_view.in_dogfight);
    assert!(!craft_view.returning);
}

#[test]
fn test_hunter_killer_switches_then_disengages() {
    let mut engine = engine_at(GameTime::new(1999, 1, 1, 12, 9, 55));
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let craft = engine.add_craft("interceptor", base).unwrap();
    let waypoint = engine.add_waypoint(Position::from_degrees(90.0, 0.0));
    let hk = engine.spawn_ufo("hk", Position::from_degrees(5.0, 0.0)).unwrap();
    ufo_mut(&mut engine, hk).detected = true;
    engine.queue_command(PlayerCommand::LaunchCraft {
        craft,
        target: Target::Waypoint(waypoint),
    });

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let queued = engine.dismiss_notification().unwrap();
    assert_eq!(
        queued.notification,
        Notification::HunterKillerTarget { ufo: hk, craft }
    );
    assert_eq!(engine.snapshot().ufos[0].hunting, Some(craft));

    // Put the craft far outside the hunt radius before the next re-score.
    {
        let ctx = engine.context_mut();
        let entity = ctx.registry.craft(craft).unwrap();
        *ctx.world.get::<&mut Position>(entity).unwrap() = Position::from_degrees(60.0, 0.0);
    }
    for _ in 0..50 {
        if engine.time().minute >= 20 {
            break;
        }
        engine.advance(TimeSpeed::OneMinute).unwrap();
        while engine.dismiss_notification().is_some() {}
    }
    assert_eq!(engine.time().minute, 20);

    assert_eq!(engine.snapshot().ufos[0].hunting, None, "Lost quarry is dropped");
    assert_eq!(ufo_mut(&mut engine, hk).destination, None);
    assert!(engine.dogfights().is_empty());
}

// ---- Missions ----

#[test]
fn test_campaign_start_creates_mission_and_wave() {
    let mut engine = engine_at(GameTime::default());
    assert_eq!(engine.start_campaign().unwrap(), 1);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.missions.len(), 1);
    assert_eq!(snapshot.missions[0].rule_id, "research");
    assert_eq!(snapshot.missions[0].region, "north");

    // First think at 12:30 launches the wave.
    engine.advance(TimeSpeed::ThirtyMinutes).unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.ufos.len(), 1);
    assert_eq!(snapshot.ufos[0].mission, Some(snapshot.missions[0].id));
    assert_eq!(snapshot.missions[0].waves_spawned, 1);

    // The scout lands, lifts off, leaves; the mission then retires.
    for _ in 0..48 {
        engine.advance(TimeSpeed::OneHour).unwrap();
        if engine.snapshot().missions.is_empty() {
            break;
        }
    }
    let snapshot = engine.snapshot();
    assert!(snapshot.missions.is_empty(), "Finished mission is retired");
    assert!(snapshot.ufos.is_empty());
}

#[test]
fn test_site_mission_leaves_mission_site() {
    let mut engine = engine_at(GameTime::default());
    engine.create_mission(&request("terror")).unwrap();
    for _ in 0..24 {
        engine.advance(TimeSpeed::OneHour).unwrap();
    }
    let sites = engine.world().query::<&MissionSite>().iter().count();
    assert_eq!(sites, 1, "Landing a site mission creates a site");
    assert!(engine.snapshot().ufos.is_empty());
}

#[test]
fn test_unknown_ids_are_configuration_errors() {
    let mut engine = engine_at(GameTime::default());
    let base = engine.add_base("Alpha", Position::default());
    assert!(matches!(
        engine.add_craft("zeppelin", base),
        Err(GeoscapeError::UnknownCraft(_))
    ));
    assert!(matches!(
        engine.create_mission(&request("abduction")),
        Err(GeoscapeError::UnknownMission(_))
    ));
    let err = engine
        .spawn_ufo("saucer", Position::default())
        .unwrap_err();
    assert!(err.is_configuration());

    let mut ruleset = test_ruleset();
    ruleset.mission_script[0].mission_weights = one("abduction");
    let mut engine = GeoscapeEngine::new(SimConfig::default(), ruleset);
    assert!(matches!(
        engine.start_campaign(),
        Err(GeoscapeError::UnknownMission(_))
    ));
    assert!(engine.snapshot().missions.is_empty());
}

#[test]
fn test_determinism_same_seed() {
    let run = |seed: u64| {
        let mut engine = GeoscapeEngine::new(
            SimConfig {
                seed,
                ..Default::default()
            },
            test_ruleset(),
        );
        engine.add_base("Alpha", Position::from_degrees(0.0, 45.0));
        engine.start_campaign().unwrap();
        let mut snapshots = Vec::new();
        for _ in 0..48 {
            engine.advance(TimeSpeed::ThirtyMinutes).unwrap();
            while engine.dismiss_notification().is_some() {}
            snapshots.push(serde_json::to_string(&engine.snapshot()).unwrap());
        }
        snapshots
    };
    assert_eq!(run(7), run(7), "Snapshots diverged with same seed");
}

// ---- Craft upkeep ----

#[test]
fn test_low_fuel_turns_craft_home() {
    let mut ruleset = test_ruleset();
    ruleset.crafts[0].fuel_max = 10;
    ruleset.crafts[0].fuel_use = 5;
    let mut engine = GeoscapeEngine::new(SimConfig::default(), ruleset);
    let base = engine.add_base("Alpha", Position::from_degrees(0.0, 0.0));
    let craft = engine.add_craft("interceptor", base).unwrap();
    let waypoint = engine.add_waypoint(Position::from_degrees(40.0, 0.0));
    engine.queue_command(PlayerCommand::LaunchCraft {
        craft,
        target: Target::Waypoint(waypoint),
    });

    engine.advance(TimeSpeed::OneHour).unwrap();
    assert_eq!(engine.time(), GameTime::new(1999, 1, 1, 12, 10, 0));
    let snapshot = engine.snapshot();
    assert_eq!(
        snapshot.pending_notifications[0].notification,
        Notification::LowFuel { craft }
    );
    assert!(snapshot.crafts[0].returning);
    assert_eq!(snapshot.crafts[0].fuel, 5);
}

#[test]
fn test_rearm_shortage_warns_once() {
    let mut engine = engine_at(GameTime::new(1999, 1, 1, 12, 59, 55));
    let base = engine.add_base("Alpha", Position::default());
    let craft = engine.add_craft("interceptor", base).unwrap();
    {
        let ctx = engine.context_mut();
        let entity = ctx.registry.craft(craft).unwrap();
        let mut c = ctx.world.get::<&mut Craft>(entity).unwrap();
        c.status = CraftStatus::Rearming;
        c.weapons[0].ammo = 0;
    }

    engine.advance(TimeSpeed::FiveSeconds).unwrap();
    let queued = engine.dismiss_notification().unwrap();
    assert!(matches!(
        queued.notification,
        Notification::NotEnoughItem { status: CraftStatus::Rearming, .. }
    ));

    let report = engine.advance(TimeSpeed::OneHour).unwrap();
    assert_eq!(report.steps, 720, "Shortage is reported only once");

    {
        let ctx = engine.context_mut();
        let entity = ctx.registry.base(base).unwrap();
        ctx.world
            .get::<&mut PlayerBase>(entity)
            .unwrap()
            .storage
            .insert("cannon_clip".into(), 10);
    }
    engine.advance(TimeSpeed::OneHour).unwrap();
    let ctx = engine.context();
    let entity = ctx.registry.craft(craft).unwrap();
    let c = ctx.world.get::<&Craft>(entity).unwrap();
    assert_eq!(c.weapons[0].ammo, 1);
    assert_eq!(c.status, CraftStatus::Rearming);
}
