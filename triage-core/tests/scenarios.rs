use triage_core::score::{resource_component, ScoreBreakdown};
use triage_core::{
    deviation, Engine, Level, Params, Preset, ReferenceRanges, Thresholds, VitalSign, VitalWeights,
    Vitals,
};

fn scenario_vitals() -> Vitals {
    Vitals {
        hr: 120,
        rr: 24,
        sbp: 90,
        spo2: 92,
        ..Vitals::default()
    }
}

#[test]
fn tachycardic_hypoxic_patient_is_emergent() {
    let engine = Engine::new(Params::default());
    let (score, level) = engine.score_and_level(&scenario_vitals(), 3);
    assert!(score > 0.60 && score < 0.85, "score {score}");
    assert_eq!(level, Level::Emergent);
    assert_eq!(level.label(), "Emergent");
    assert!((score - 0.7622).abs() < 1e-3, "score {score}");
}

#[test]
fn score_in_emergent_band_maps_to_level_two() {
    assert_eq!(Level::from_score(0.72, &Params::default().thresholds), Level::Emergent);
    assert_eq!(Params::default().level_for(0.72), Level::Emergent);
}

#[test]
fn empty_vitals_without_resources_is_non_urgent() {
    let b = ScoreBreakdown::compute(
        &Vitals::default(),
        0,
        &Params::default(),
        &ReferenceRanges::adult(),
    );
    assert_eq!(b.vital, 0.0);
    assert_eq!(b.resource, 0.0);
    assert_eq!(b.score, 0.0);
    assert_eq!(Engine::default().level(&Vitals::default(), 0), Level::NonUrgent);
}

#[test]
fn resource_term_saturates_at_max_resources() {
    let params = Params::default();
    let at_max = resource_component(6, params.max_resources, params.resource_weight);
    let far_over = resource_component(100, params.max_resources, params.resource_weight);
    assert_eq!(far_over, params.resource_weight);
    assert_eq!(at_max, far_over);

    let engine = Engine::default();
    assert_eq!(
        engine.acuity(&scenario_vitals(), 6),
        engine.acuity(&scenario_vitals(), 100)
    );
}

#[test]
fn non_decreasing_thresholds_fail_validation() {
    let mut params = Params::default();
    params.set_thresholds(0.5, 0.6, 0.35, 0.15);
    assert!(!params.validate());
    assert!(!params.validate_external());
    assert!(params.validated().is_err());
}

#[test]
fn batch_is_index_aligned_and_checks_lengths() {
    let engine = Engine::from_preset(Preset::Strict);
    let vitals: Vec<Vitals> = (0..32)
        .map(|i| Vitals {
            hr: 50 + i * 4,
            rr: 10 + i % 12,
            sbp: 80 + i * 3,
            spo2: 85 + i % 15,
            temp: if i % 3 == 0 { 36.0 + f64::from(i) * 0.1 } else { 0.0 },
            ..Vitals::default()
        })
        .collect();
    let counts: Vec<i32> = (0..32).map(|i| i % 8).collect();

    let batch = engine.batch_evaluate(&vitals, &counts).unwrap();
    assert_eq!(batch.len(), 32);
    for (i, evaluation) in batch.iter().enumerate() {
        let (score, level) = engine.score_and_level(&vitals[i], counts[i]);
        assert_eq!(evaluation.acuity, score);
        assert_eq!(evaluation.level, level);
    }
    assert_eq!(engine.par_batch_evaluate(&vitals, &counts).unwrap(), batch);

    assert!(engine.batch_evaluate(&vitals, &counts[..31]).is_err());
    assert!(engine.batch_acuity(&vitals[..3], &counts).is_err());
}

#[test]
fn midpoint_and_edge_deviations() {
    let ranges = ReferenceRanges::adult();
    for sign in VitalSign::ALL {
        let r = ranges.get(sign);
        assert_eq!(deviation(r.mid, r.mid, r.half_width), 0.0);
        assert_eq!(deviation(r.mid + r.half_width, r.mid, r.half_width), 1.0);
        assert_eq!(deviation(r.mid - r.half_width, r.mid, r.half_width), 1.0);
        assert_eq!(deviation(r.mid + 3.0 * r.half_width, r.mid, r.half_width), 1.0);
    }
}

#[test]
fn score_stays_in_unit_interval_for_odd_inputs() {
    let odd_vitals = [
        Vitals::default(),
        scenario_vitals(),
        Vitals {
            hr: i32::MAX,
            rr: -5,
            sbp: 1,
            dbp: -100,
            temp: -40.0,
            spo2: 500,
            gcs: 1,
        },
        Vitals {
            temp: 1e300,
            ..Vitals::default()
        },
    ];
    let mut zero_weights = Params::default();
    zero_weights.vital_weights = VitalWeights([0.0; VitalSign::COUNT]);
    let mut zero_resources = Params::default();
    zero_resources.max_resources = 0;
    let mut all_zero = zero_weights;
    all_zero.resource_weight = 0.0;

    for params in [Params::default(), zero_weights, zero_resources, all_zero] {
        let engine = Engine::new(params);
        for vitals in &odd_vitals {
            for count in [i32::MIN, -3, 0, 2, 6, i32::MAX] {
                let score = engine.acuity(vitals, count);
                assert!(score.is_finite(), "{params:?} {vitals:?} {count}");
                assert!((0.0..=1.0).contains(&score), "{score}");
            }
        }
    }
    assert_eq!(Engine::new(all_zero).acuity(&scenario_vitals(), 3), 0.0);
}

#[test]
fn levels_partition_the_unit_interval_monotonically() {
    for preset in Preset::ALL {
        let thresholds: Thresholds = preset.params().thresholds;
        let mut previous = Level::Resuscitation;
        for step in (0..=1000).rev() {
            let score = f64::from(step) / 1000.0;
            let level = Level::from_score(score, &thresholds);
            assert!(level >= previous, "{preset}: {score} gave {level}");
            previous = level;
        }
        assert_eq!(Level::from_score(1.0, &thresholds), Level::Resuscitation);
        assert_eq!(Level::from_score(0.0, &thresholds), Level::NonUrgent);
    }
}

#[test]
fn exact_thresholds_go_to_the_more_urgent_level() {
    let t = Thresholds::default();
    let expected = [
        (t.t1, Level::Resuscitation),
        (t.t2, Level::Emergent),
        (t.t3, Level::Urgent),
        (t.t4, Level::LessUrgent),
    ];
    for (score, level) in expected {
        assert_eq!(Level::from_score(score, &t), level);
    }
}

#[test]
fn pediatric_ranges_soften_adult_tachycardia() {
    let vitals = Vitals {
        hr: 130,
        rr: 30,
        ..Vitals::default()
    };
    let adult = Engine::default();
    let pediatric = Engine::with_ranges(Params::default(), ReferenceRanges::pediatric());
    assert!(pediatric.acuity(&vitals, 0) < adult.acuity(&vitals, 0));
}
