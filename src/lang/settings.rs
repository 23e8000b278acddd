//! Parse settings string sent by a host or the CLI.
//!
//! The compiler checks for specific keys that bound its cooperative budget.
//! Unknown keys are ignored so hosts can carry their own settings alongside.

use serde_json;
use crate::DYNERR;

#[derive(Clone)]
pub struct Settings {
    /// per-block bound on fixed-point expansion passes
    pub max_expansion_passes: usize,
    /// bound on total parse passes across the whole compilation
    pub parse_budget: usize
}

impl Settings {
    pub fn new() -> Self {
        Self {
            max_expansion_passes: 64,
            parse_budget: 4096
        }
    }
}

fn update_usize(val: &serde_json::Value,key: &str,curr: &mut usize) {
    if let Some(n) = val[key].as_u64() {
        *curr = n as usize;
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    if let Ok(root) = serde_json::from_str::<serde_json::Value>(json) {
        if let Some(obj) = root.as_object() {
            for (key,val) in obj {
                match key.as_str() {
                    "expansion" => {
                        update_usize(val,"maxPasses",&mut ans.max_expansion_passes);
                    },
                    "budget" => {
                        update_usize(val,"parsePasses",&mut ans.parse_budget);
                    },
                    _ => {}
                }
            }
        }
    }
    Ok(ans)
}
