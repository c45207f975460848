#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::components::{Craft, Ufo};
    use crate::constants::SHIELD_UNINITIALIZED;
    use crate::dice::Dice;
    use crate::enums::*;
    use crate::error::GeoscapeError;
    use crate::geo::{GeoArea, LandPolygon};
    use crate::ruleset::*;
    use crate::target::Target;
    use crate::types::*;
    use crate::weights::{MonthlyWeights, WeightedOptions};

    /// Die that replays a fixed sequence.
    struct LoadedDice(Vec<u32>, usize);

    impl Dice for LoadedDice {
        fn roll(&mut self, upper: u32) -> u32 {
            let value = self.0[self.1 % self.0.len()];
            self.1 += 1;
            if upper <= 1 {
                0
            } else {
                value % upper
            }
        }
    }

    #[test]
    fn test_clock_five_second_step() {
        let mut t = GameTime::new(1999, 1, 1, 12, 0, 0);
        assert_eq!(t.advance(), TimeTrigger::FiveSeconds);
        assert_eq!(t.second, 5);
    }

    #[test]
    fn test_clock_minute_boundaries() {
        let mut t = GameTime::new(1999, 1, 1, 12, 9, 55);
        assert_eq!(t.advance(), TimeTrigger::TenMinutes);

        let mut t = GameTime::new(1999, 1, 1, 12, 29, 55);
        assert_eq!(t.advance(), TimeTrigger::ThirtyMinutes);

        let mut t = GameTime::new(1999, 1, 1, 12, 3, 55);
        assert_eq!(
            t.advance(),
            TimeTrigger::FiveSeconds,
            "plain minute rollover is not a trigger"
        );
    }

    #[test]
    fn test_clock_hour_and_day() {
        let mut t = GameTime::new(1999, 1, 1, 12, 59, 55);
        assert_eq!(t.advance(), TimeTrigger::OneHour);
        assert_eq!((t.hour, t.minute), (13, 0));

        let mut t = GameTime::new(1999, 1, 9, 23, 59, 55);
        assert_eq!(t.advance(), TimeTrigger::OneDay);
        assert_eq!((t.day, t.hour), (10, 0));
    }

    #[test]
    fn test_clock_month_and_year_rollover() {
        let mut t = GameTime::new(1999, 1, 31, 23, 59, 55);
        assert_eq!(t.advance(), TimeTrigger::OneMonth);
        assert_eq!((t.month, t.day), (2, 1));

        let mut t = GameTime::new(1999, 12, 31, 23, 59, 55);
        assert_eq!(t.advance(), TimeTrigger::OneMonth);
        assert_eq!((t.year, t.month, t.day), (2000, 1, 1));
    }

    #[test]
    fn test_clock_leap_february() {
        let mut t = GameTime::new(2000, 2, 28, 23, 59, 55);
        assert_eq!(t.advance(), TimeTrigger::OneDay, "2000 is a leap year");
        assert_eq!(t.day, 29);

        let mut t = GameTime::new(1999, 2, 28, 23, 59, 55);
        assert_eq!(t.advance(), TimeTrigger::OneMonth);
        assert_eq!(t.month, 3);
    }

    #[test]
    fn test_clock_display() {
        let t = GameTime::new(1999, 3, 7, 4, 5, 10);
        assert_eq!(t.to_string(), "1999-03-07 04:05:10");
    }

    #[test]
    fn test_speed_steps() {
        assert_eq!(TimeSpeed::FiveSeconds.steps(), 1);
        assert_eq!(TimeSpeed::OneMinute.steps(), 12);
        assert_eq!(TimeSpeed::FiveMinutes.steps(), 60);
        assert_eq!(TimeSpeed::ThirtyMinutes.steps(), 360);
        assert_eq!(TimeSpeed::OneHour.steps(), 720);
        assert_eq!(TimeSpeed::OneDay.steps(), 17_280);
    }

    #[test]
    fn test_trigger_descending_order() {
        let order = TimeTrigger::DESCENDING;
        assert!(order.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(order[0], TimeTrigger::OneMonth);
        assert_eq!(order[5], TimeTrigger::FiveSeconds);
    }

    #[test]
    fn test_distance_quarter_circle() {
        let a = Position::from_degrees(0.0, 0.0);
        let b = Position::from_degrees(90.0, 0.0);
        let expected = std::f64::consts::FRAC_PI_2 * crate::constants::EARTH_RADIUS_NM;
        assert!((a.distance_nm(&b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward_reaches_destination() {
        let a = Position::from_degrees(0.0, 0.0);
        let b = Position::from_degrees(10.0, 0.0);
        let total = a.angle_to(&b);

        let (mid, arrived) = a.step_toward(&b, total / 2.0);
        assert!(!arrived);
        assert!((mid.to_degrees().0 - 5.0).abs() < 1e-6, "halfway along the equator");

        let (end, arrived) = mid.step_toward(&b, total);
        assert!(arrived);
        assert_eq!(end, b);
    }

    #[test]
    fn test_target_serde_shape() {
        let json = serde_json::to_string(&Target::Ufo(UfoId(3))).unwrap();
        assert_eq!(json, r#"{"kind":"Ufo","id":3}"#);
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), TargetKind::Ufo);
        assert_eq!(back.as_ufo(), Some(UfoId(3)));
        assert_eq!(back.as_craft(), None);
    }

    #[test]
    fn test_weighted_choice_with_loaded_dice() {
        let options = WeightedOptions::new().with("alpha", 1).with("beta", 3);
        assert_eq!(options.total(), 4);
        assert_eq!(options.choose(&mut LoadedDice(vec![0], 0)), Some("alpha"));
        assert_eq!(options.choose(&mut LoadedDice(vec![1], 0)), Some("beta"));
        assert_eq!(options.choose(&mut LoadedDice(vec![3], 0)), Some("beta"));
    }

    #[test]
    fn test_weighted_zero_removes() {
        let mut options = WeightedOptions::new().with("alpha", 2);
        options.set("alpha", 0);
        assert!(options.is_empty());
        assert_eq!(options.choose(&mut LoadedDice(vec![0], 0)), None);
    }

    #[test]
    fn test_monthly_weights_pick_latest_month() {
        let weights = MonthlyWeights::new()
            .with_month(0, WeightedOptions::new().with("early", 1))
            .with_month(3, WeightedOptions::new().with("late", 1));
        let mut dice = LoadedDice(vec![0], 0);
        assert_eq!(weights.choose(0, &mut dice).as_deref(), Some("early"));
        assert_eq!(weights.choose(2, &mut dice).as_deref(), Some("early"));
        assert_eq!(weights.choose(3, &mut dice).as_deref(), Some("late"));
        assert_eq!(weights.choose(10, &mut dice).as_deref(), Some("late"));
    }

    #[test]
    fn test_dice_percent_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(!rng.percent(0));
            assert!(rng.percent(100));
            let v = rng.between(3, 5);
            assert!((3..=5).contains(&v));
        }
    }

    #[test]
    fn test_geo_area_wraps_antimeridian() {
        let area = GeoArea::new(170.0, -170.0, -10.0, 10.0);
        assert!(area.contains(&Position::from_degrees(175.0, 0.0)));
        assert!(area.contains(&Position::from_degrees(-175.0, 0.0)));
        assert!(!area.contains(&Position::from_degrees(0.0, 0.0)));
        let center = area.center().to_degrees();
        assert!((center.0.abs() - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_land_polygon_contains() {
        let square = LandPolygon {
            points: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
        };
        assert!(square.contains(&Position::from_degrees(5.0, 5.0)));
        assert!(!square.contains(&Position::from_degrees(15.0, 5.0)));
    }

    #[test]
    fn test_ruleset_parses_defaults() {
        let json = r#"{
            "ufos": [{ "id": "small_scout", "hull": 40 }],
            "crafts": [{ "id": "interceptor", "weapons": [{ "id": "cannon" }] }],
            "missions": [{ "id": "alien_research" }],
            "mission_script": [
                { "name": "first", "mission_weights": { "0": { "alien_research": 1 } } }
            ]
        }"#;
        let ruleset = Ruleset::from_json_str(json).unwrap();
        let ufo = ruleset.ufo("small_scout").unwrap();
        assert_eq!(ufo.hull, 40);
        assert_eq!(ufo.escape_rounds, crate::constants::UFO_ESCAPE_ROUNDS);
        let cmd = &ruleset.mission_script[0];
        assert_eq!(cmd.last_month, -1, "last month defaults to unbounded");
        assert_eq!(cmd.max_runs, -1);
        assert_eq!(cmd.run_key(), "first");
        assert!(!cmd.mission_weights.is_empty());
    }

    #[test]
    fn test_ruleset_rejects_duplicate_labels() {
        let json = r#"{
            "mission_script": [
                { "name": "a", "label": 4 },
                { "name": "b", "label": 0 },
                { "name": "c", "label": 0 },
                { "name": "d", "label": 4 }
            ]
        }"#;
        match Ruleset::from_json_str(json) {
            Err(GeoscapeError::DuplicateLabel { label, first, second }) => {
                assert_eq!(label, 4);
                assert_eq!(first, "a");
                assert_eq!(second, "d");
            }
            other => panic!("expected duplicate label error, got {other:?}"),
        }
    }

    #[test]
    fn test_ruleset_rejects_dangling_weight_ids() {
        let json = r#"{
            "missions": [{ "id": "alien_research", "race_weights": { "0": { "sectoid": 1 } } }],
            "races": [{ "id": "sectoid" }],
            "mission_script": [
                { "name": "first", "mission_weights": { "0": { "ghost": 1 } } }
            ]
        }"#;
        match Ruleset::from_json_str(json) {
            Err(GeoscapeError::UnknownMission(id)) => assert_eq!(id, "ghost"),
            other => panic!("expected unknown mission, got {other:?}"),
        }

        let json = r#"{
            "missions": [{ "id": "alien_research", "race_weights": { "0": { "floater": 1 } } }],
            "races": [{ "id": "sectoid" }]
        }"#;
        assert!(matches!(
            Ruleset::from_json_str(json),
            Err(GeoscapeError::UnknownRace(_))
        ));

        let json = r#"{
            "regions": [{ "id": "europe", "mission_weights": { "alien_terror": 5 } }]
        }"#;
        assert!(matches!(
            Ruleset::from_json_str(json),
            Err(GeoscapeError::UnknownMission(_))
        ));
    }

    #[test]
    fn test_ruleset_unknown_ids() {
        let ruleset = Ruleset::default();
        assert!(matches!(
            ruleset.mission("nope"),
            Err(GeoscapeError::UnknownMission(_))
        ));
        assert!(matches!(
            ruleset.region("nope"),
            Err(GeoscapeError::UnknownRegion(_))
        ));
        assert!(matches!(
            ruleset.race("nope"),
            Err(GeoscapeError::UnknownRace(_))
        ));
        assert!(ruleset.mission("nope").unwrap_err().is_configuration());
    }

    #[test]
    fn test_ruleset_parse_error() {
        let err = Ruleset::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, GeoscapeError::RulesetParse(_)));
    }

    #[test]
    fn test_components_from_rules() {
        let ufo_rule = UfoRule {
            id: "hk".into(),
            shield_capacity: 50,
            hunter_killer: true,
            ..UfoRule::default()
        };
        let ufo = Ufo::from_rule(UfoId(1), &ufo_rule);
        assert_eq!(ufo.shield, SHIELD_UNINITIALIZED);
        assert_eq!(ufo.status, UfoStatus::Flying);
        assert!(ufo.stats.hunter_killer);

        let craft_rule = CraftRule {
            id: "interceptor".into(),
            weapons: vec![CraftWeaponRule {
                ammo_max: 4,
                ..CraftWeaponRule::default()
            }],
            ..CraftRule::default()
        };
        let craft = Craft::from_rule(CraftId(1), BaseId(1), &craft_rule);
        assert_eq!(craft.status, CraftStatus::Ready);
        assert_eq!(craft.fuel, craft.fuel_max);
        assert!(craft.has_loaded_weapon());
    }

    #[test]
    fn test_status_terminal() {
        assert!(UfoStatus::Destroyed.is_terminal());
        assert!(!UfoStatus::Crashed.is_terminal());
    }
}
