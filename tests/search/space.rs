use std::collections::BTreeMap;

use nested_cv::model::{ExtraTrees, Svc};
use nested_cv::space::{Domain, HyperValue, SearchSpace};
use nested_cv::{Error, ParamValue, Trial};

#[test]
fn decoded_choices_come_from_the_list() {
    for space in [Svc::default_space(), ExtraTrees::default_space()] {
        let params = space.params().unwrap();
        for id in 0..30 {
            let mut trial = Trial::new(id);
            let encoded = params.suggest(&mut trial).unwrap();
            let config = space.decode(&encoded).unwrap();

            for (name, domain) in space.iter() {
                let value = config.get(name).unwrap();
                match domain {
                    Domain::Choice { values } => assert!(values.contains(value)),
                    Domain::Continuous { low, high, .. } => {
                        let HyperValue::Float(x) = value else {
                            panic!("{name} decoded to {value}");
                        };
                        assert!((*low..=*high).contains(x));
                    }
                }
            }
        }
    }
}

#[test]
fn out_of_range_index_is_rejected() {
    let space = SearchSpace::new().choice("kernel", ["linear", "rbf"]);
    let encoded = BTreeMap::from([("kernel".to_string(), ParamValue::Categorical(2))]);
    assert!(matches!(
        space.decode(&encoded),
        Err(Error::ChoiceOutOfRange { index: 2, n_choices: 2, .. })
    ));
}

#[test]
fn unknown_and_missing_names_are_rejected() {
    let space = SearchSpace::new().continuous("C", 0.1, 1.0);
    let unknown = BTreeMap::from([
        ("C".to_string(), ParamValue::Float(0.5)),
        ("gamma".to_string(), ParamValue::Float(0.5)),
    ]);
    assert!(matches!(
        space.decode(&unknown),
        Err(Error::UnknownParameter(name)) if name == "gamma"
    ));
    assert!(space.decode(&BTreeMap::new()).is_err());
}

#[test]
fn default_spaces_build_estimators() {
    let space = Svc::default_space();
    let params = space.params().unwrap();
    let mut trial = Trial::new(0);
    let config = space.decode(&params.suggest(&mut trial).unwrap()).unwrap();
    assert!(Svc::from_config(&config, 0).is_ok());

    let space = ExtraTrees::default_space();
    let params = space.params().unwrap();
    let mut trial = Trial::new(0);
    let config = space.decode(&params.suggest(&mut trial).unwrap()).unwrap();
    assert!(ExtraTrees::from_config(&config, 0).is_ok());
}
