use serde::Deserialize;

use super::{Ack, impl_status};

/// The `count_down` module.
///
/// The module itself carries no status; each action reports its own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Countdown {
    pub err_code: i64,
    pub err_msg: Option<String>,
    pub get_rules: Option<CountdownRules>,
    pub delete_all_rules: Option<Ack>,
    pub add_rule: Option<AddRuleResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CountdownRules {
    pub rule_list: Vec<Rule>,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

/// A countdown timer. `act` is the relay state applied when it fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub enable: u8,
    pub delay: u32,
    #[serde(rename = "act")]
    pub action: u8,
    #[serde(rename = "remain")]
    pub remaining: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddRuleResult {
    pub id: String,
    pub err_code: i64,
    pub err_msg: Option<String>,
}

impl_status!(Countdown, CountdownRules, AddRuleResult);
