//! # Compilation driver
//!
//! Owns the definition tables and the block map, and runs the passes in
//! order: preprocess (which may trigger imports), expand every block to its
//! fixed point, then for each block build the label map and emit.  Pass-local
//! state never crosses a block boundary; definitions are frozen once the
//! preprocessor returns.
//!
//! The driver is also where the cooperative budget lives: every parse pass
//! over a block charges the budget, so a pathological program fails with
//! `BudgetExceeded` instead of spinning.

use std::collections::{HashMap,BTreeMap};
use log::{info,debug};
use super::{address,emitter,expander,preprocessor,settings};
use super::Error;
use crate::DYNERR;

pub struct Compiler {
    settings: settings::Settings,
    passes: usize
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            settings: settings::Settings::new(),
            passes: 0
        }
    }
    pub fn set_config(&mut self,settings: settings::Settings) {
        self.settings = settings;
    }
    /// count parse passes against the budget
    fn charge(&mut self,n: usize) -> Result<(),DYNERR> {
        self.passes += n;
        if self.passes > self.settings.parse_budget {
            return Err(Box::new(Error::BudgetExceeded));
        }
        Ok(())
    }
    /// Run the whole pipeline.  The answer maps each block name to its
    /// uppercase hex string.
    pub fn compile(&mut self,source: &str,libraries: &HashMap<String,String>) -> Result<BTreeMap<String,String>,DYNERR> {
        self.passes = 0;
        let pre = preprocessor::Preprocessor::new();
        self.charge(1)?;
        let parts = pre.parse_program(source,libraries)?;
        info!("preprocessed {} definitions, {} blocks",parts.defs.len(),parts.blocks.len());

        let mut expander = expander::Expander::new(&parts.defs);
        let mut expanded: Vec<(String,String)> = Vec::new();
        for (name,body) in &parts.blocks {
            let mut curr = body.clone();
            let mut settled = false;
            for pass in 0..self.settings.max_expansion_passes {
                self.charge(1)?;
                let next = expander.expand_once(&curr)?;
                if next == curr {
                    debug!("block '{}' settled after {} expansion passes",name,pass+1);
                    settled = true;
                    break;
                }
                curr = next;
            }
            if !settled {
                return Err(Box::new(Error::ExpansionDiverged(name.clone())));
            }
            expanded.push((name.clone(),curr));
        }

        let mut ans = BTreeMap::new();
        for (name,body) in &expanded {
            self.charge(1)?;
            let stream = address::flatten(body)?;
            self.charge(1)?;
            let labels = address::scan_labels(&stream)?;
            self.charge(1)?;
            let em = emitter::Emitter::new(&labels);
            let hex = em.emit(body)?;
            debug!("block '{}' emitted {} bytes",name,hex.len()/2);
            ans.insert(name.clone(),hex.to_uppercase());
        }
        Ok(ans)
    }
}
