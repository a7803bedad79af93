use nested_cv::parameter::{CategoricalParam, FloatParam, Parameter};
use nested_cv::sampler::tpe::{HyperoptGamma, TpeSampler};
use nested_cv::sampler::RandomSampler;
use nested_cv::{Error, FailurePolicy, Study, Trial};

#[test]
fn best_loss_never_increases() {
    let sampler = TpeSampler::builder().seed(42).n_startup_trials(5).build().unwrap();
    let study = Study::new(sampler);
    let x = FloatParam::new(-5.0, 5.0).name("x");
    let y = FloatParam::new(-5.0, 5.0).name("y");

    study
        .optimize(40, FailurePolicy::Propagate, |trial: &mut Trial| {
            let (a, b) = (x.suggest(trial)?, y.suggest(trial)?);
            Ok::<_, Error>(a * a + (b - 1.0).powi(2))
        })
        .unwrap();

    let history = study.best_value_history();
    assert_eq!(history.len(), 40);
    assert!(history.windows(2).all(|w| w[1] <= w[0]));
    assert!((history[39] - study.best_value().unwrap()).abs() < f64::EPSILON);
}

#[test]
fn tpe_finds_the_good_category() {
    let sampler = TpeSampler::builder().seed(7).n_startup_trials(8).build().unwrap();
    let study = Study::new(sampler);
    let kind = CategoricalParam::new(vec!["bad", "good", "worse"]).name("kind");
    let x = FloatParam::new(0.0, 1.0).name("x");

    study
        .optimize(50, FailurePolicy::Propagate, |trial: &mut Trial| {
            let k = kind.suggest(trial)?;
            let v = x.suggest(trial)?;
            let offset = match k {
                "good" => 0.0,
                "bad" => 1.0,
                _ => 2.0,
            };
            Ok::<_, Error>(offset + (v - 0.3).abs())
        })
        .unwrap();

    let best = study.best_trial().unwrap();
    assert_eq!(best.get(&kind), Some("good"));
    assert!(best.value < 0.2);
}

#[test]
fn hyperopt_gamma_search_converges() {
    let sampler = TpeSampler::builder()
        .gamma_strategy(HyperoptGamma::default())
        .seed(3)
        .build()
        .unwrap();
    let study = Study::new(sampler);
    let lr = FloatParam::new(1e-4, 1.0).log_scale().name("lr");

    study
        .optimize(40, FailurePolicy::Propagate, |trial: &mut Trial| {
            let v = lr.suggest(trial)?;
            Ok::<_, Error>((v.log10() + 2.0).powi(2))
        })
        .unwrap();
    assert!(study.best_value().unwrap() < 0.25);
}

#[test]
fn seeded_samplers_propose_identical_sequences() {
    let run = || {
        let study = Study::new(TpeSampler::builder().seed(99).n_startup_trials(3).build().unwrap());
        let x = FloatParam::new(-1.0, 1.0).name("x");
        study
            .optimize(15, FailurePolicy::Propagate, |trial: &mut Trial| {
                Ok::<_, Error>(x.suggest(trial)?.powi(2))
            })
            .unwrap();
        study.trials().iter().map(|t| t.value).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn random_sampler_respects_bounds() {
    let study = Study::new(RandomSampler::with_seed(1));
    let x = FloatParam::new(2.0, 3.0).name("x");
    study
        .optimize(30, FailurePolicy::Propagate, |trial: &mut Trial| {
            let v = x.suggest(trial)?;
            assert!((2.0..=3.0).contains(&v));
            Ok::<_, Error>(v)
        })
        .unwrap();
    assert_eq!(study.n_trials(), 30);
}
