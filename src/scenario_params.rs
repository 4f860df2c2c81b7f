use spikecore::params::CoreParams;

pub fn get_scenario_params() -> CoreParams {
    let params_yaml_str = r#"
model: !Izhikevich
  a_raw: 5
  b_raw: 51
  c_raw: 65
  d_raw: 16
"#;

    serde_yaml::from_str(params_yaml_str).unwrap()
}
